//! Name canonicalization for identity comparisons
//!
//! Different frameworks spell the same test differently ("Login Test",
//! "login_test", "TestLogin"). Normalizing removes whitespace, underscores,
//! case and every "test" fragment before names are compared.

use once_cell::sync::Lazy;
use regex::Regex;

const TEST_FRAGMENT: &str = "test";

/// A greedy `{...}` span, used for runtime parameters inside step names
static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{.*\}").expect("valid regex"));

/// Canonicalize a test or suite name
///
/// "test" is removed until none is left, so that removing one occurrence
/// cannot reveal another (`"tetestst"` becomes `""`) and the function is
/// idempotent.
pub fn normalize(text: &str) -> String {
    let mut normalized: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect::<String>()
        .to_lowercase();

    while normalized.contains(TEST_FRAGMENT) {
        normalized = normalized.replace(TEST_FRAGMENT, "");
    }
    normalized
}

/// Remove `{...}` spans from a step name
pub fn strip_bracketed(name: &str) -> std::borrow::Cow<'_, str> {
    BRACKETED.replace_all(name, "")
}
