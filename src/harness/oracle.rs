//! Test-case oracle
//!
//! Maps a case and what was observed on the page to a [`Verdict`].
//! Comparisons are exact on trimmed text: no inner-whitespace
//! normalisation, no case folding.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::Error;

use super::fixture::{CaseCategory, TestCase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Pass,
    Fail,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

/// Input and output after the clear button was pressed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearState {
    pub input: String,
    pub output: String,
}

impl ClearState {
    pub fn is_empty(&self) -> bool {
        self.input.trim().is_empty() && self.output.trim().is_empty()
    }
}

impl fmt::Display for ClearState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "input=\"{}\" output=\"{}\"", self.input, self.output)
    }
}

/// What the runner saw for a case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    /// Output panel text after the input was submitted
    Output(String),
    /// Page state after the clear button
    Cleared(ClearState),
}

impl fmt::Display for Observed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Output(text) => write!(f, "{}", text),
            Self::Cleared(state) => write!(f, "{}", state),
        }
    }
}

/// Outcome of one test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub test_case_id: String,
    pub category: CaseCategory,
    pub outcome: Outcome,
    pub input: String,
    pub expected: String,
    pub actual: String,
    /// Why the case failed before a comparison could be made
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    pub elapsed_ms: u64,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Pass
    }

    /// A case that could not be observed (timeout, hidden panel, ...)
    pub fn errored(case: &TestCase, error: &Error) -> Self {
        let actual = match error {
            Error::PollTimeout { last, .. } => last.clone(),
            _ => String::new(),
        };
        Self {
            test_case_id: case.id.clone(),
            category: case.category,
            outcome: Outcome::Fail,
            input: case.input.clone(),
            expected: case.expected.clone(),
            actual,
            detail: Some(error.to_string()),
            error_code: Some(error.code().to_string()),
            elapsed_ms: 0,
        }
    }

    /// A case never started because the suite budget ran out
    pub fn out_of_time(case: &TestCase) -> Self {
        Self::not_run(case, "suite deadline exceeded", "TIMEOUT")
    }

    /// A case that was never started
    pub fn not_run(case: &TestCase, detail: impl Into<String>, code: &str) -> Self {
        Self {
            test_case_id: case.id.clone(),
            category: case.category,
            outcome: Outcome::Fail,
            input: case.input.clone(),
            expected: case.expected.clone(),
            actual: String::new(),
            detail: Some(detail.into()),
            error_code: Some(code.to_string()),
            elapsed_ms: 0,
        }
    }

    pub fn with_elapsed(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    /// One-line reason for a failed verdict
    pub fn failure_message(&self) -> Option<String> {
        if self.passed() {
            return None;
        }
        if let Some(detail) = &self.detail {
            return Some(detail.clone());
        }
        Some(match self.category {
            CaseCategory::UiClear => format!("page not reset after clear: {}", self.actual),
            CaseCategory::Positive => {
                format!("expected \"{}\", got \"{}\"", self.expected, self.actual)
            }
            CaseCategory::Negative => format!(
                "output reproduced the incorrect text \"{}\"",
                self.expected
            ),
            CaseCategory::Unclassified => "output was empty".to_string(),
        })
    }
}

/// Classify what was observed for `case`
pub fn classify(case: &TestCase, observed: &Observed) -> Verdict {
    let (outcome, detail) = match (case.category, observed) {
        (CaseCategory::UiClear, Observed::Cleared(state)) => (pass_if(state.is_empty()), None),
        (CaseCategory::UiClear, Observed::Output(_)) => (
            Outcome::Fail,
            Some("no observation after pressing clear".to_string()),
        ),
        (_, Observed::Cleared(_)) => (
            Outcome::Fail,
            Some("clear-button observation for a text case".to_string()),
        ),
        (CaseCategory::Positive, Observed::Output(actual)) => {
            (pass_if(actual.trim() == case.expected.trim()), None)
        }
        (CaseCategory::Negative, Observed::Output(actual)) => {
            (pass_if(actual.trim() != case.expected.trim()), None)
        }
        (CaseCategory::Unclassified, Observed::Output(actual)) => {
            tracing::warn!(
                case = %case.id,
                "Unrecognised id prefix; only checking that output is non-empty"
            );
            (pass_if(!actual.trim().is_empty()), None)
        }
    };

    let actual = match observed {
        Observed::Output(text) => text.trim().to_string(),
        Observed::Cleared(state) => state.to_string(),
    };

    Verdict {
        test_case_id: case.id.clone(),
        category: case.category,
        outcome,
        input: case.input.clone(),
        expected: case.expected.clone(),
        actual,
        detail,
        error_code: None,
        elapsed_ms: 0,
    }
}

fn pass_if(condition: bool) -> Outcome {
    if condition {
        Outcome::Pass
    } else {
        Outcome::Fail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(text: &str) -> Observed {
        Observed::Output(text.to_string())
    }

    #[test]
    fn test_positive_requires_exact_match() {
        let case = TestCase::new("Pos_001", "X", "Y");
        assert!(classify(&case, &output("Y")).passed());
        assert!(classify(&case, &output("  Y\n")).passed());
        assert!(!classify(&case, &output("y")).passed());
        assert!(!classify(&case, &output("Y Y")).passed());
    }

    #[test]
    fn test_positive_does_not_normalise_inner_whitespace() {
        let case = TestCase::new("Pos_002", "a b", "ඔයා කොහෙද?");
        assert!(!classify(&case, &output("ඔයා  කොහෙද?")).passed());
    }

    #[test]
    fn test_negative_passes_on_mismatch() {
        let case = TestCase::new("Neg_001", "X", "Z");
        assert!(classify(&case, &output("Y")).passed());

        let verdict = classify(&case, &output(" Z "));
        assert!(!verdict.passed());
        assert_eq!(
            verdict.failure_message().unwrap(),
            "output reproduced the incorrect text \"Z\""
        );
    }

    #[test]
    fn test_ui_clear_requires_both_empty() {
        let case = TestCase::new("Pos_UI_clear", "", "");
        let cleared = Observed::Cleared(ClearState::default());
        assert!(classify(&case, &cleared).passed());

        let residue = Observed::Cleared(ClearState {
            input: String::new(),
            output: "ඔයා".to_string(),
        });
        let verdict = classify(&case, &residue);
        assert_eq!(verdict.outcome, Outcome::Fail);
        assert_eq!(verdict.actual, "input=\"\" output=\"ඔයා\"");

        assert!(!classify(&case, &output("")).passed());
    }

    #[test]
    fn test_failure_messages_keep_sinhala_text_intact() {
        let positive = classify(&TestCase::new("Pos_001", "oyaa", "ඔයා"), &output("මම"));
        assert_eq!(
            positive.failure_message().unwrap(),
            "expected \"ඔයා\", got \"මම\""
        );

        let negative = classify(&TestCase::new("Neg_001", "oyaa", "ඔයා"), &output("ඔයා"));
        assert_eq!(
            negative.failure_message().unwrap(),
            "output reproduced the incorrect text \"ඔයා\""
        );

        let state = ClearState {
            input: "කොහෙද".to_string(),
            output: "ඔයා".to_string(),
        };
        assert_eq!(state.to_string(), "input=\"කොහෙද\" output=\"ඔයා\"");
    }

    #[test]
    fn test_unclassified_falls_back_to_non_empty() {
        let case = TestCase::new("Smoke_1", "X", "anything");
        assert!(classify(&case, &output("Y")).passed());
        assert!(!classify(&case, &output("   ")).passed());
    }

    #[test]
    fn test_errored_verdict_keeps_last_value() {
        let case = TestCase::new("Pos_003", "X", "Y");
        let verdict = Verdict::errored(&case, &Error::poll_timeout("text != \"\"", 30_000, "partial"));
        assert_eq!(verdict.outcome, Outcome::Fail);
        assert_eq!(verdict.actual, "partial");
        assert_eq!(verdict.error_code.as_deref(), Some("TIMEOUT"));
        assert!(verdict.failure_message().unwrap().contains("30000 ms"));
    }

    #[test]
    fn test_verdict_serializes_outcome_uppercase() {
        let verdict = classify(&TestCase::new("Pos_001", "X", "Y"), &output("Y"));
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["outcome"], "PASS");
        assert_eq!(json["category"], "positive");
        assert!(json.get("detail").is_none());
    }
}
