//! translit-check - end-to-end verification harness for web-based
//! transliteration tools
//!
//! The harness submits inputs into a single-page application, waits for its
//! debounced, re-rendering output panel to settle, and classifies each
//! fixture case as PASS or FAIL.

pub mod browser;
pub mod cli;
pub mod commands;
pub mod common;
pub mod harness;

// Re-export commonly used types for tests
pub use browser::{Key, MockPage, MockPageConfig, PageSurface};
pub use common::config::Config;
pub use common::{Error, Result};
pub use harness::{ScenarioRunner, TestCase, Verdict};
