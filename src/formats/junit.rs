//! JUnit XML reader
//!
//! Accepts a single XML file or a directory tree of them. The root element
//! may be `<testsuites>` or a lone `<testsuite>`, and suites may nest:
//!
//! ```text
//! <testsuites>
//!   <testsuite name="Auth" package="com.example.web">
//!     <testcase name="login" classname="com.example.web.AuthTest" time="0.42">
//!       <failure message="expected 200"/>
//!     </testcase>
//!   </testsuite>
//! </testsuites>
//! ```
//!
//! JUnit records no step tree, so results carry an empty step payload.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::common::{Error, Result};
use crate::model::{CanonicalResult, CurrentRun, Status};

use super::find_label;

/// Read results from a JUnit file or a directory of `*.xml` files
pub fn read_results(path: &Path) -> Result<CurrentRun> {
    let files = if path.is_file() {
        vec![path.to_path_buf()]
    } else if path.is_dir() {
        xml_files(path)?
    } else {
        return Err(Error::results_read(path, "no such file or directory"));
    };

    let mut results = CurrentRun::new();
    for file in files {
        let content = std::fs::read_to_string(&file).map_err(|e| Error::FileRead {
            path: file.display().to_string(),
            error: e.to_string(),
        })?;
        for result in parse_document(&file, &content)? {
            results.insert(result.identifier, result);
        }
    }
    Ok(results)
}

fn xml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::results_read(dir, e))?;
        let is_xml = entry.path().extension().is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
        if entry.file_type().is_file() && is_xml {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Parse one JUnit document into canonical results
pub fn parse_document(path: &Path, content: &str) -> Result<Vec<CanonicalResult>> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut parser = DocumentParser::new(path);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => parser.open(&e, false)?,
            Ok(Event::Empty(e)) => parser.open(&e, true)?,
            Ok(Event::End(e)) => parser.close(e.name().as_ref()),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(Error::report_parse(
                    path,
                    format!("at position {}: {}", reader.buffer_position(), e),
                ))
            }
        }
    }
    Ok(parser.results)
}

/// A `<testsuite>` currently open
struct SuiteFrame {
    name: String,
    /// Package of a top-level suite, or the name of the enclosing suite
    parent_suite: String,
}

/// A `<testcase>` currently open
struct CaseBuilder {
    name: String,
    classname: String,
    seconds: f64,
    suite: String,
    parent_suite: String,
    status: Status,
    message: Option<String>,
    properties: Vec<(String, String)>,
}

impl CaseBuilder {
    fn build(self) -> CanonicalResult {
        let label = |name: &str| {
            find_label(self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str())), name)
                .unwrap_or_default()
                .to_string()
        };

        CanonicalResult {
            identifier: Uuid::new_v4(),
            sub_suite: label("subSuite"),
            feature: label("feature"),
            full_name: self.classname.clone(),
            duration: (self.seconds * 1000.0).round() as i64,
            description: self.message.clone(),
            launch_id: 0,
            steps: String::new(),
            status: self.status.clone(),
            suite: self.suite.clone(),
            parent_suite: self.parent_suite.clone(),
            name: self.name.clone(),
        }
    }
}

struct DocumentParser<'p> {
    path: &'p Path,
    suites: Vec<SuiteFrame>,
    case: Option<CaseBuilder>,
    results: Vec<CanonicalResult>,
}

impl<'p> DocumentParser<'p> {
    fn new(path: &'p Path) -> Self {
        Self {
            path,
            suites: Vec::new(),
            case: None,
            results: Vec::new(),
        }
    }

    fn open(&mut self, element: &BytesStart<'_>, empty: bool) -> Result<()> {
        let tag = element.name();
        match tag.as_ref() {
            b"testsuite" => {
                let mut attrs = self.attributes(element)?;
                let name = attrs.remove("name").unwrap_or_default();
                let parent_suite = match self.suites.last() {
                    Some(parent) => parent.name.clone(),
                    None => attrs.remove("package").unwrap_or_default(),
                };
                self.suites.push(SuiteFrame { name, parent_suite });
            }
            b"testcase" => {
                let mut attrs = self.attributes(element)?;
                let (suite, parent_suite) = self
                    .suites
                    .last()
                    .map(|s| (s.name.clone(), s.parent_suite.clone()))
                    .unwrap_or_default();
                self.case = Some(CaseBuilder {
                    name: attrs.remove("name").unwrap_or_default(),
                    classname: attrs.remove("classname").unwrap_or_default(),
                    seconds: attrs
                        .get("time")
                        .and_then(|t| t.replace(',', "").parse().ok())
                        .unwrap_or(0.0),
                    suite,
                    parent_suite,
                    status: Status::Passed,
                    message: None,
                    properties: Vec::new(),
                });
            }
            b"failure" | b"error" | b"skipped" => {
                let mut attrs = self.attributes(element)?;
                if let Some(case) = self.case.as_mut() {
                    case.status = match tag.as_ref() {
                        b"failure" => Status::Failed,
                        b"error" => Status::Broken,
                        _ => Status::Skipped,
                    };
                    if let Some(message) = attrs.remove("message") {
                        case.message = Some(message);
                    }
                }
            }
            b"property" if self.case.is_some() => {
                let mut attrs = self.attributes(element)?;
                if let (Some(case), Some(name)) = (self.case.as_mut(), attrs.remove("name")) {
                    case.properties.push((name, attrs.remove("value").unwrap_or_default()));
                }
            }
            _ => {}
        }

        if empty {
            self.close(tag.as_ref());
        }
        Ok(())
    }

    fn close(&mut self, tag: &[u8]) {
        match tag {
            b"testsuite" => {
                self.suites.pop();
            }
            b"testcase" => {
                if let Some(case) = self.case.take() {
                    self.results.push(case.build());
                }
            }
            _ => {}
        }
    }

    fn attributes(&self, element: &BytesStart<'_>) -> Result<HashMap<String, String>> {
        let mut attrs = HashMap::new();
        for attr in element.attributes() {
            let attr = attr.map_err(|e| Error::report_parse(self.path, e))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|e| Error::report_parse(self.path, e))?;
            attrs.insert(key, value.into_owned());
        }
        Ok(attrs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuites>
  <testsuite name="Auth" package="com.example.web" tests="3">
    <properties><property name="env" value="ci"/></properties>
    <testcase name="login" classname="com.example.web.AuthTest" time="0.42">
      <properties>
        <property name="feature" value="Accounts"/>
        <property name="suite" value="Overridden"/>
      </properties>
      <system-out>Opening /login</system-out>
    </testcase>
    <testcase name="logout" classname="com.example.web.AuthTest" time="1.5">
      <failure message="expected 200 but was 500">stack trace</failure>
    </testcase>
    <testsuite name="Tokens">
      <testcase name="refresh &amp; rotate" classname="com.example.web.TokenTest">
        <skipped/>
      </testcase>
    </testsuite>
    <testcase name="signup" classname="com.example.web.AuthTest"><error message="NPE"/></testcase>
  </testsuite>
</testsuites>"#;

    fn by_name(results: &[CanonicalResult], name: &str) -> CanonicalResult {
        results.iter().find(|r| r.name == name).cloned().unwrap()
    }

    #[test]
    fn test_parse_document() {
        let results = parse_document(Path::new("report.xml"), REPORT).unwrap();
        assert_eq!(results.len(), 4);

        let login = by_name(&results, "login");
        assert_eq!(login.suite, "Auth");
        assert_eq!(login.parent_suite, "com.example.web");
        assert_eq!(login.full_name, "com.example.web.AuthTest");
        assert_eq!(login.feature, "Accounts");
        assert_eq!(login.status, Status::Passed);
        assert_eq!(login.duration, 420);
        assert!(login.steps.is_empty());

        let logout = by_name(&results, "logout");
        assert_eq!(logout.status, Status::Failed);
        assert_eq!(logout.description.as_deref(), Some("expected 200 but was 500"));

        let nested = by_name(&results, "refresh & rotate");
        assert_eq!(nested.suite, "Tokens");
        assert_eq!(nested.parent_suite, "Auth");
        assert_eq!(nested.status, Status::Skipped);

        // suite state is restored after the nested suite closes
        let signup = by_name(&results, "signup");
        assert_eq!(signup.suite, "Auth");
        assert_eq!(signup.status, Status::Broken);
    }

    #[test]
    fn test_single_suite_root() {
        let doc = r#"<testsuite name="Smoke" package="pkg"><testcase name="ping"/></testsuite>"#;
        let results = parse_document(Path::new("smoke.xml"), doc).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].suite, "Smoke");
        assert_eq!(results[0].parent_suite, "pkg");
    }

    #[test]
    fn test_malformed_document() {
        let err = parse_document(Path::new("bad.xml"), "<testsuite><testcase></testsuite>").unwrap_err();
        assert!(matches!(err, Error::ReportParse { .. }));
    }

    #[test]
    fn test_read_directory_recursively() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("module-a")).unwrap();
        std::fs::write(dir.path().join("TEST-auth.xml"), REPORT).unwrap();
        std::fs::write(
            dir.path().join("module-a").join("TEST-smoke.xml"),
            r#"<testsuite name="Smoke"><testcase name="ping"/></testsuite>"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a report").unwrap();

        let results = read_results(dir.path()).unwrap();
        assert_eq!(results.len(), 5);
    }

    #[test]
    fn test_read_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("junit.xml");
        std::fs::write(&file, REPORT).unwrap();
        assert_eq!(read_results(&file).unwrap().len(), 4);
    }

    #[test]
    fn test_missing_path() {
        let err = read_results(Path::new("/nonexistent/junit.xml")).unwrap_err();
        assert!(matches!(err, Error::ResultsRead { .. }));
    }
}
