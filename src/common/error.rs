//! Error types for the transliteration harness
//!
//! Per-case errors (timeouts, visibility) are turned into failed verdicts by
//! the scenario runner. Everything else aborts the run: the remaining cases
//! are reported as not run and `main` exits with an error.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Observation Errors ===
    #[error("Timed out after {waited_ms} ms waiting for {condition} (last value: \"{last}\")")]
    PollTimeout {
        condition: String,
        waited_ms: u64,
        last: String,
    },

    #[error("Element '{selector}' (match #{index}) did not become visible within {timeout_ms} ms")]
    NotVisible {
        selector: String,
        index: usize,
        timeout_ms: u64,
    },

    #[error("No element matches '{selector}' at index {index}")]
    ElementNotFound { selector: String, index: usize },

    #[error("Page layout mismatch: {0}")]
    PageLayout(String),

    // === Verdict Errors ===
    #[error("Assertion failed: {0}")]
    Assertion(String),

    // === Fixture Errors ===
    #[error("Invalid test fixture: {0}")]
    Fixture(String),

    // === Browser Errors ===
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Chromium executable not found. Searched: {0}. Set [browser] executable in the config file")]
    BrowserNotFound(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a poll timeout error carrying the last observed value
    pub fn poll_timeout(condition: &str, waited_ms: u64, last: &str) -> Self {
        Self::PollTimeout {
            condition: condition.to_string(),
            waited_ms,
            last: last.to_string(),
        }
    }

    /// Create a visibility error
    pub fn not_visible(selector: &str, index: usize, timeout_ms: u64) -> Self {
        Self::NotVisible {
            selector: selector.to_string(),
            index,
            timeout_ms,
        }
    }

    /// Create an element not found error
    pub fn element_not_found(selector: &str, index: usize) -> Self {
        Self::ElementNotFound {
            selector: selector.to_string(),
            index,
        }
    }

    /// Errors that fail only the current case; the run moves on to the next one
    pub fn is_case_local(&self) -> bool {
        matches!(
            self,
            Self::PollTimeout { .. }
                | Self::NotVisible { .. }
                | Self::ElementNotFound { .. }
                | Self::Assertion(_)
        )
    }

    /// Short machine-readable code used in the JSON report
    pub fn code(&self) -> &'static str {
        match self {
            Self::PollTimeout { .. } => "TIMEOUT",
            Self::NotVisible { .. } => "NOT_VISIBLE",
            Self::ElementNotFound { .. } => "ELEMENT_NOT_FOUND",
            Self::PageLayout(_) => "PAGE_LAYOUT",
            Self::Assertion(_) => "ASSERTION",
            Self::Fixture(_) => "FIXTURE",
            Self::Browser(_) | Self::BrowserNotFound(_) => "BROWSER",
            Self::Config(_) | Self::ConfigParse(_) => "CONFIG",
            _ => "INTERNAL_ERROR",
        }
    }
}

impl From<chromiumoxide::error::CdpError> for Error {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        Self::Browser(e.to_string())
    }
}
