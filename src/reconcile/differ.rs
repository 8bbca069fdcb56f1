//! Structural comparison of step trees
//!
//! A fail-fast diff: the walk is depth-first, left to right, and only the
//! first divergence is reported.

use std::fmt;

use crate::model::StepNode;

use super::normalize::strip_bracketed;

/// First structural difference between a reference and a current step tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepDivergence {
    /// Sibling sequences have different lengths
    CountMismatch {
        test: String,
        parent: String,
        reference_len: usize,
        current_len: usize,
    },
    /// Step names differ once `{...}` parameters are removed
    NameMismatch {
        test: String,
        parent: String,
        reference_step: String,
        current_step: String,
        position: u32,
    },
    /// The reference step has nested steps and the current one does not
    MissingChildren {
        test: String,
        parent: String,
        reference_step: String,
        current_step: String,
        position: u32,
    },
}

impl StepDivergence {
    /// Name of the test the divergence was found in
    pub fn test(&self) -> &str {
        match self {
            StepDivergence::CountMismatch { test, .. }
            | StepDivergence::NameMismatch { test, .. }
            | StepDivergence::MissingChildren { test, .. } => test,
        }
    }
}

impl fmt::Display for StepDivergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepDivergence::CountMismatch {
                test,
                parent,
                reference_len,
                current_len,
            } => write!(
                f,
                "step count mismatch for '{}' under '{}': reference has {}, current has {}",
                test, parent, reference_len, current_len
            ),
            StepDivergence::NameMismatch {
                test,
                parent,
                reference_step,
                current_step,
                position,
            } => write!(
                f,
                "step name mismatch for '{}' under '{}' at pos {}: reference has '{}', current has '{}'",
                test, parent, position, reference_step, current_step
            ),
            StepDivergence::MissingChildren {
                test,
                parent,
                reference_step,
                current_step,
                position,
            } => write!(
                f,
                "inner steps exist in reference but not in current run for '{}' under '{}' at pos {}: \
                 reference step '{}', current step '{}'",
                test, parent, position, reference_step, current_step
            ),
        }
    }
}

/// Compare two sibling sequences, recursing into nested steps
pub fn diff_steps(reference: &[StepNode], current: &[StepNode], parent: &str, test: &str) -> Option<StepDivergence> {
    if reference.len() != current.len() {
        return Some(StepDivergence::CountMismatch {
            test: test.to_string(),
            parent: parent.to_string(),
            reference_len: reference.len(),
            current_len: current.len(),
        });
    }

    for (expected, actual) in reference.iter().zip(current) {
        if strip_bracketed(&expected.name) != strip_bracketed(&actual.name) {
            return Some(StepDivergence::NameMismatch {
                test: test.to_string(),
                parent: parent.to_string(),
                reference_step: expected.name.clone(),
                current_step: actual.name.clone(),
                position: expected.position,
            });
        }

        if expected.has_children() {
            if !actual.has_children() {
                return Some(StepDivergence::MissingChildren {
                    test: test.to_string(),
                    parent: parent.to_string(),
                    reference_step: expected.name.clone(),
                    current_step: actual.name.clone(),
                    position: expected.position,
                });
            }
            if let Some(divergence) = diff_steps(&expected.children, &actual.children, &expected.name, test) {
                return Some(divergence);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, pos: u32) -> StepNode {
        StepNode::leaf(name, "passed", pos)
    }

    fn node(name: &str, pos: u32, children: Vec<StepNode>) -> StepNode {
        leaf(name, pos).with_children(children)
    }

    #[test]
    fn test_identical_trees() {
        let tree = vec![node("Login", 0, vec![leaf("Fill", 0), leaf("Submit", 1)]), leaf("Logout", 1)];
        assert_eq!(diff_steps(&tree, &tree.clone(), "T", "T"), None);
    }

    #[test]
    fn test_bracketed_parameters_ignored() {
        let reference = vec![leaf("Open {url=a}", 0)];
        let current = vec![leaf("Open {url=b}", 0)];
        assert_eq!(diff_steps(&reference, &current, "T", "T"), None);
    }

    #[test]
    fn test_count_mismatch_top_level() {
        let reference = vec![leaf("Fill {user}", 0)];
        let current = vec![leaf("Fill {other}", 0), leaf("Submit", 1)];
        let divergence = diff_steps(&reference, &current, "Signup Test", "Signup Test").unwrap();
        assert_eq!(
            divergence,
            StepDivergence::CountMismatch {
                test: "Signup Test".to_string(),
                parent: "Signup Test".to_string(),
                reference_len: 1,
                current_len: 2,
            }
        );
    }

    #[test]
    fn test_count_mismatch_nested_names_parent() {
        let reference = vec![node("Login", 0, vec![leaf("Fill", 0)])];
        let current = vec![node("Login", 0, vec![leaf("Fill", 0), leaf("Submit", 1)])];
        match diff_steps(&reference, &current, "T", "T").unwrap() {
            StepDivergence::CountMismatch { parent, reference_len, current_len, .. } => {
                assert_eq!(parent, "Login");
                assert_eq!((reference_len, current_len), (1, 2));
            }
            other => panic!("Expected CountMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_count_mismatch_stops_recursion() {
        // differing lengths at the top must be reported even if a nested
        // mismatch would come first in sibling order
        let reference = vec![node("A", 0, vec![leaf("x", 0)])];
        let current = vec![node("A", 0, vec![leaf("y", 0)]), leaf("B", 1)];
        assert!(matches!(
            diff_steps(&reference, &current, "T", "T"),
            Some(StepDivergence::CountMismatch { .. })
        ));
    }

    #[test]
    fn test_name_mismatch_reports_position() {
        let reference = vec![leaf("Open", 0), leaf("Click save", 1)];
        let current = vec![leaf("Open", 0), leaf("Click cancel", 1)];
        match diff_steps(&reference, &current, "T", "T").unwrap() {
            StepDivergence::NameMismatch { reference_step, current_step, position, .. } => {
                assert_eq!(reference_step, "Click save");
                assert_eq!(current_step, "Click cancel");
                assert_eq!(position, 1);
            }
            other => panic!("Expected NameMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_children() {
        let reference = vec![node("Login", 0, vec![leaf("Fill", 0)])];
        let current = vec![leaf("Login", 0)];
        assert!(matches!(
            diff_steps(&reference, &current, "T", "T"),
            Some(StepDivergence::MissingChildren { position: 0, .. })
        ));
    }

    #[test]
    fn test_extra_children_in_current_are_ignored() {
        let reference = vec![leaf("Login", 0)];
        let current = vec![node("Login", 0, vec![leaf("Fill", 0)])];
        assert_eq!(diff_steps(&reference, &current, "T", "T"), None);
    }

    #[test]
    fn test_first_divergence_in_traversal_order() {
        let reference = vec![
            node("A", 0, vec![leaf("a1", 0)]),
            node("B", 1, vec![leaf("b1", 0)]),
        ];
        let current = vec![leaf("A", 0), node("B", 1, vec![leaf("changed", 0)])];
        match diff_steps(&reference, &current, "T", "T").unwrap() {
            StepDivergence::MissingChildren { reference_step, .. } => assert_eq!(reference_step, "A"),
            other => panic!("Expected MissingChildren, got {:?}", other),
        }
    }

    #[test]
    fn test_display_mentions_test_and_parent() {
        let divergence = StepDivergence::CountMismatch {
            test: "Signup Test".to_string(),
            parent: "Fill form".to_string(),
            reference_len: 1,
            current_len: 2,
        };
        let text = divergence.to_string();
        assert!(text.contains("Signup Test"));
        assert!(text.contains("Fill form"));
        assert!(text.contains("reference has 1, current has 2"));
        assert_eq!(divergence.test(), "Signup Test");
    }
}
