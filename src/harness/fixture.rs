//! Test-case fixtures
//!
//! Fixtures are a JSON array or a YAML sequence of `{id, input, expected}`
//! records. The case category is derived from the id prefix once, here,
//! and carried on the [`TestCase`] from then on.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};

/// What a case asserts, parsed from its id prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseCategory {
    /// `Pos_UI*`: the clear button resets input and output
    UiClear,
    /// `Pos_*`: output must equal the expected text
    Positive,
    /// `Neg_*`: output must differ from the expected (wrong) text
    Negative,
    /// Any other prefix: output must merely be non-empty
    Unclassified,
}

impl CaseCategory {
    pub fn from_id(id: &str) -> Self {
        // Pos_UI is a sub-prefix of Pos_ and must be checked first
        if id.starts_with("Pos_UI") {
            Self::UiClear
        } else if id.starts_with("Pos_") {
            Self::Positive
        } else if id.starts_with("Neg_") {
            Self::Negative
        } else {
            Self::Unclassified
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::UiClear => "ui-clear",
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for CaseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One fixture record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCase {
    pub id: String,
    pub input: String,
    pub expected: String,
    pub category: CaseCategory,
}

impl TestCase {
    pub fn new(id: impl Into<String>, input: impl Into<String>, expected: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            category: CaseCategory::from_id(&id),
            id,
            input: input.into(),
            expected: expected.into(),
        }
    }
}

/// Fixture record as written; fields are checked after parsing so errors can
/// name the record
#[derive(Debug, Deserialize)]
struct RawCase {
    id: Option<String>,
    input: Option<String>,
    expected: Option<String>,
}

/// On-disk fixture encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureFormat {
    Json,
    Yaml,
}

impl FixtureFormat {
    /// Pick the format from the file extension (JSON when unknown)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

/// Load and validate a fixture file
pub fn load_fixture(path: &Path) -> Result<Vec<TestCase>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Fixture(format!("Failed to read fixture '{}': {}", path.display(), e))
    })?;

    parse_fixture(&content, FixtureFormat::from_path(path))
        .map_err(|e| match e {
            Error::Fixture(msg) => Error::Fixture(format!("{}: {}", path.display(), msg)),
            other => other,
        })
}

/// Parse and validate fixture content
pub fn parse_fixture(content: &str, format: FixtureFormat) -> Result<Vec<TestCase>> {
    let raw: Vec<RawCase> = match format {
        FixtureFormat::Json => serde_json::from_str(content)
            .map_err(|e| Error::Fixture(format!("not a JSON array of test cases: {}", e)))?,
        FixtureFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| Error::Fixture(format!("not a YAML sequence of test cases: {}", e)))?,
    };

    if raw.is_empty() {
        return Err(Error::Fixture("fixture contains no test cases".to_string()));
    }

    let mut seen = HashSet::new();
    let mut cases = Vec::with_capacity(raw.len());

    for (index, record) in raw.into_iter().enumerate() {
        let id = match record.id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => {
                return Err(Error::Fixture(format!(
                    "record #{} is missing required field 'id'",
                    index
                )))
            }
        };

        if !seen.insert(id.clone()) {
            return Err(Error::Fixture(format!(
                "record #{} reuses id '{}'",
                index, id
            )));
        }

        let category = CaseCategory::from_id(&id);

        // UI cases drive the page with a stock sample and assert emptiness
        let (input, expected) = match (category, record.input, record.expected) {
            (CaseCategory::UiClear, input, expected) => {
                (input.unwrap_or_default(), expected.unwrap_or_default())
            }
            (_, Some(input), Some(expected)) => (input, expected),
            (_, None, _) => {
                return Err(Error::Fixture(format!(
                    "record #{} ('{}') is missing required field 'input'",
                    index, id
                )))
            }
            (_, _, None) => {
                return Err(Error::Fixture(format!(
                    "record #{} ('{}') is missing required field 'expected'",
                    index, id
                )))
            }
        };

        cases.push(TestCase {
            id,
            input,
            expected,
            category,
        });
    }

    Ok(cases)
}

/// Keep only the cases whose id starts with `prefix`
pub fn filter_cases(cases: Vec<TestCase>, prefix: Option<&str>) -> Result<Vec<TestCase>> {
    let Some(prefix) = prefix else {
        return Ok(cases);
    };

    let filtered: Vec<TestCase> = cases
        .into_iter()
        .filter(|case| case.id.starts_with(prefix))
        .collect();

    if filtered.is_empty() {
        return Err(Error::Fixture(format!("no test case id starts with '{}'", prefix)));
    }
    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_prefix() {
        assert_eq!(CaseCategory::from_id("Pos_UI_clear"), CaseCategory::UiClear);
        assert_eq!(CaseCategory::from_id("Pos_UI"), CaseCategory::UiClear);
        assert_eq!(CaseCategory::from_id("Pos_001"), CaseCategory::Positive);
        assert_eq!(CaseCategory::from_id("Neg_001"), CaseCategory::Negative);
        assert_eq!(CaseCategory::from_id("pos_001"), CaseCategory::Unclassified);
        assert_eq!(CaseCategory::from_id("Smoke_1"), CaseCategory::Unclassified);
    }

    #[test]
    fn test_parse_json_fixture() {
        let cases = parse_fixture(
            r#"[
                {"id": "Pos_001", "input": "mama", "expected": "මම"},
                {"id": "Neg_001", "input": "oya", "expected": "ඔය"},
                {"id": "Pos_UI_clear"}
            ]"#,
            FixtureFormat::Json,
        )
        .unwrap();

        assert_eq!(cases.len(), 3);
        assert_eq!(cases[0], TestCase::new("Pos_001", "mama", "මම"));
        assert_eq!(cases[1].category, CaseCategory::Negative);
        assert_eq!(cases[2].category, CaseCategory::UiClear);
        assert_eq!(cases[2].input, "");
    }

    #[test]
    fn test_parse_yaml_fixture() {
        let cases = parse_fixture(
            "- id: Pos_002\n  input: \"Oyaa kohedha?\"\n  expected: \"ඔයා කොහෙද?\"\n- id: Other\n  input: x\n  expected: y\n",
            FixtureFormat::Yaml,
        )
        .unwrap();

        assert_eq!(cases[0].expected, "ඔයා කොහෙද?");
        assert_eq!(cases[1].category, CaseCategory::Unclassified);
    }

    #[test]
    fn test_missing_fields_fail_fast() {
        let err = parse_fixture(r#"[{"input": "x", "expected": "y"}]"#, FixtureFormat::Json)
            .unwrap_err();
        assert!(matches!(err, Error::Fixture(ref msg) if msg.contains("'id'")));

        let err = parse_fixture(
            r#"[{"id": "Pos_001", "input": "x", "expected": "y"}, {"id": "Neg_002", "input": "x"}]"#,
            FixtureFormat::Json,
        )
        .unwrap_err();
        assert!(
            matches!(err, Error::Fixture(ref msg) if msg.contains("#1") && msg.contains("'expected'"))
        );
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let err = parse_fixture(
            r#"[{"id": "Pos_001", "input": "a", "expected": "b"},
                {"id": "Pos_001", "input": "c", "expected": "d"}]"#,
            FixtureFormat::Json,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Fixture(ref msg) if msg.contains("reuses")));
    }

    #[test]
    fn test_empty_and_malformed_fixtures() {
        assert!(matches!(
            parse_fixture("[]", FixtureFormat::Json),
            Err(Error::Fixture(_))
        ));
        assert!(matches!(
            parse_fixture(r#"{"id": "Pos_001"}"#, FixtureFormat::Json),
            Err(Error::Fixture(_))
        ));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FixtureFormat::from_path(Path::new("cases.yml")), FixtureFormat::Yaml);
        assert_eq!(FixtureFormat::from_path(Path::new("cases.YAML")), FixtureFormat::Yaml);
        assert_eq!(FixtureFormat::from_path(Path::new("testcases.json")), FixtureFormat::Json);
    }

    #[test]
    fn test_filter_by_prefix() {
        let cases = vec![
            TestCase::new("Pos_001", "a", "b"),
            TestCase::new("Neg_001", "a", "c"),
        ];
        let only_neg = filter_cases(cases.clone(), Some("Neg_")).unwrap();
        assert_eq!(only_neg.len(), 1);
        assert_eq!(filter_cases(cases.clone(), None).unwrap().len(), 2);
        assert!(filter_cases(cases, Some("Pos_UI")).is_err());
    }
}
