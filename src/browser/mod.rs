//! Page surface abstraction
//!
//! Every DOM action and read the harness performs goes through
//! [`PageSurface`]. The API is addressed by selector and match index only:
//! the page re-renders by replacing nodes, so element handles are never
//! handed out or kept between calls.

pub mod chrome;
pub mod mock;

use async_trait::async_trait;

use crate::common::Result;

pub use chrome::{ChromeBrowser, ChromePage};
pub use mock::{MockPage, MockPageConfig};

/// Keys and chords the input driver sends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Closes suggestion popups
    Escape,
    /// Deletes the current selection
    Backspace,
    /// Ctrl+A inside the focused field
    SelectAll,
}

impl Key {
    /// Key name as understood by the DevTools key definitions
    pub fn name(&self) -> &'static str {
        match self {
            Self::Escape => "Escape",
            Self::Backspace => "Backspace",
            Self::SelectAll => "Control+A",
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The page the harness drives
///
/// Implementations re-resolve `selector` on every call.
#[async_trait]
pub trait PageSurface: Send + Sync {
    /// Number of elements currently matching `selector`
    async fn count(&self, selector: &str) -> Result<usize>;

    /// Focus the first match of `selector`
    async fn focus(&self, selector: &str) -> Result<()>;

    /// Replace the value of the first match of `selector` (fill semantics)
    async fn fill(&self, selector: &str, text: &str) -> Result<()>;

    /// Send a key or chord to the first match of `selector`
    async fn press(&self, selector: &str, key: Key) -> Result<()>;

    /// Pointer click at viewport coordinates
    async fn click_at(&self, x: f64, y: f64) -> Result<()>;

    /// Click the first element with `role` whose accessible name matches
    /// `name_pattern` case-insensitively
    async fn click_by_role(&self, role: &str, name_pattern: &str) -> Result<()>;

    /// Current value of the first match of a form field
    async fn input_value(&self, selector: &str) -> Result<String>;

    /// Whether match `index` of `selector` exists and is rendered visibly
    async fn is_visible(&self, selector: &str, index: usize) -> Result<bool>;

    /// Raw text content of match `index`, `None` when the node has none
    async fn text_content(&self, selector: &str, index: usize) -> Result<Option<String>>;
}
