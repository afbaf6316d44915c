//! In-process simulation of the transliteration page
//!
//! Reproduces the behaviours the harness has to cope with, without a
//! browser:
//! - the output is recomputed on blur, and the output node is replaced
//!   (blank, and optionally hidden) for a few reads before the new text
//!   lands
//! - typing opens a suggestion popup that swallows the next pointer click
//!   until Escape closes it
//! - the clear button empties the input at once and the output a few
//!   reads later
//!
//! Selectors are matched literally against the configured [`Selectors`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use regex::RegexBuilder;

use crate::common::config::Selectors;
use crate::common::{Error, Result};

use super::{Key, PageSurface};

type Translator = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Behaviour knobs for [`MockPage`]
#[derive(Clone)]
pub struct MockPageConfig {
    pub selectors: Selectors,
    /// Maps submitted input to rendered output
    pub translate: Translator,
    /// Output reads that still see the blank node after a recompute
    pub render_gap_reads: usize,
    /// Visibility checks that fail while the output node is being replaced
    pub hidden_checks: usize,
    /// `count` calls on the panel selector that find nothing (slow page load)
    pub panels_ready_after: usize,
    /// Typing opens a suggestion popup
    pub suggestion_popup: bool,
    /// The page has a clear button
    pub clear_button: bool,
    /// The clear button also resets the output panel
    pub clear_resets_output: bool,
    /// Number of result panels rendered
    pub panel_count: usize,
}

impl Default for MockPageConfig {
    fn default() -> Self {
        Self {
            selectors: Selectors::default(),
            translate: Arc::new(|input: &str| input.to_string()),
            render_gap_reads: 2,
            hidden_checks: 0,
            panels_ready_after: 0,
            suggestion_popup: true,
            clear_button: true,
            clear_resets_output: true,
            panel_count: 2,
        }
    }
}

impl MockPageConfig {
    /// Render known inputs from a lookup table; unknown inputs are echoed
    pub fn with_translations(pairs: &[(&str, &str)]) -> Self {
        let table: HashMap<String, String> = pairs
            .iter()
            .map(|(input, output)| (input.to_string(), output.to_string()))
            .collect();
        Self {
            translate: Arc::new(move |input: &str| {
                table
                    .get(input)
                    .cloned()
                    .unwrap_or_else(|| input.to_string())
            }),
            ..Self::default()
        }
    }

    /// Replace the translation function
    pub fn translator<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.translate = Arc::new(f);
        self
    }
}

#[derive(Default)]
struct MockState {
    input: String,
    focused: bool,
    all_selected: bool,
    overlay_open: bool,
    /// Input the current output belongs to
    rendered_for: Option<String>,
    output: String,
    /// Text the output node will show once the remaining reads have elapsed
    pending: Option<(String, usize)>,
    hidden_remaining: usize,
    panel_counts: usize,
    renders: u64,
    events: Vec<String>,
}

/// Simulated page surface
pub struct MockPage {
    config: MockPageConfig,
    state: Mutex<MockState>,
}

impl MockPage {
    pub fn new(config: MockPageConfig) -> Self {
        Self {
            config,
            state: Mutex::new(MockState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_input(&self, selector: &str) -> Result<()> {
        if selector == self.config.selectors.input {
            Ok(())
        } else {
            Err(Error::element_not_found(selector, 0))
        }
    }

    /// Recompute the output after the input lost focus
    fn blur(&self, state: &mut MockState) {
        state.focused = false;
        state.events.push("blur".to_string());

        if state.rendered_for.as_deref() == Some(state.input.as_str()) {
            return;
        }

        let text = if state.input.is_empty() {
            String::new()
        } else {
            (self.config.translate)(&state.input)
        };

        state.rendered_for = Some(state.input.clone());
        state.renders += 1;
        state.output.clear();
        state.hidden_remaining = self.config.hidden_checks;
        if self.config.render_gap_reads == 0 {
            state.output = text;
            state.pending = None;
        } else {
            state.pending = Some((text, self.config.render_gap_reads));
        }
    }

    /// Current input value without going through the surface API
    pub fn input(&self) -> String {
        self.state().input.clone()
    }

    /// Number of times the output node has been rebuilt
    pub fn renders(&self) -> u64 {
        self.state().renders
    }

    /// Whether the suggestion popup is open
    pub fn overlay_open(&self) -> bool {
        self.state().overlay_open
    }

    /// Every action received, in order
    pub fn events(&self) -> Vec<String> {
        self.state().events.clone()
    }
}

#[async_trait]
impl PageSurface for MockPage {
    async fn count(&self, selector: &str) -> Result<usize> {
        let selectors = &self.config.selectors;
        let mut state = self.state();
        if selector == selectors.input {
            Ok(1)
        } else if selector == selectors.panels {
            state.panel_counts += 1;
            if state.panel_counts > self.config.panels_ready_after {
                Ok(self.config.panel_count)
            } else {
                Ok(0)
            }
        } else {
            Ok(0)
        }
    }

    async fn focus(&self, selector: &str) -> Result<()> {
        self.check_input(selector)?;
        let mut state = self.state();
        state.focused = true;
        state.events.push("focus".to_string());
        Ok(())
    }

    async fn fill(&self, selector: &str, text: &str) -> Result<()> {
        self.check_input(selector)?;
        let mut state = self.state();
        state.input = text.to_string();
        state.focused = true;
        state.all_selected = false;
        state.overlay_open = self.config.suggestion_popup && !text.is_empty();
        state.events.push(format!("fill:{}", text));
        Ok(())
    }

    async fn press(&self, selector: &str, key: Key) -> Result<()> {
        self.check_input(selector)?;
        let mut state = self.state();
        state.focused = true;
        match key {
            Key::SelectAll => state.all_selected = true,
            Key::Backspace => {
                if state.all_selected {
                    state.input.clear();
                } else {
                    state.input.pop();
                }
                state.all_selected = false;
            }
            Key::Escape => state.overlay_open = false,
        }
        state.events.push(format!("press:{}", key));
        Ok(())
    }

    async fn click_at(&self, x: f64, y: f64) -> Result<()> {
        let mut state = self.state();
        state.events.push(format!("click_at:{},{}", x, y));
        if state.overlay_open {
            // The popup takes the click and the input keeps focus
            state.overlay_open = false;
            state.events.push("click swallowed by popup".to_string());
            return Ok(());
        }
        if state.focused {
            self.blur(&mut state);
        }
        Ok(())
    }

    async fn click_by_role(&self, role: &str, name_pattern: &str) -> Result<()> {
        let name = RegexBuilder::new(name_pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::Internal(format!("Invalid name pattern: {}", e)))?;

        let is_clear = self.config.clear_button
            && role == self.config.selectors.clear_role
            && name.is_match("Clear");
        if !is_clear {
            return Err(Error::element_not_found(
                &format!("role={}[name=/{}/i]", role, name_pattern),
                0,
            ));
        }

        let mut state = self.state();
        state.events.push("click:clear".to_string());
        state.input.clear();
        state.overlay_open = false;
        state.focused = false;
        state.rendered_for = Some(String::new());
        if self.config.clear_resets_output {
            if self.config.render_gap_reads == 0 {
                state.output.clear();
            } else {
                state.pending = Some((String::new(), self.config.render_gap_reads));
            }
        }
        Ok(())
    }

    async fn input_value(&self, selector: &str) -> Result<String> {
        self.check_input(selector)?;
        Ok(self.state().input.clone())
    }

    async fn is_visible(&self, selector: &str, index: usize) -> Result<bool> {
        if selector != self.config.selectors.panels || index >= self.config.panel_count {
            return Ok(false);
        }
        let mut state = self.state();
        if index == self.config.selectors.output_index && state.hidden_remaining > 0 {
            state.hidden_remaining -= 1;
            return Ok(false);
        }
        Ok(true)
    }

    async fn text_content(&self, selector: &str, index: usize) -> Result<Option<String>> {
        if selector != self.config.selectors.panels || index >= self.config.panel_count {
            return Err(Error::element_not_found(selector, index));
        }
        let mut state = self.state();
        if index != self.config.selectors.output_index {
            return Ok(Some(state.input.clone()));
        }

        if let Some((text, remaining)) = state.pending.take() {
            if remaining <= 1 {
                state.output = text;
            } else {
                state.pending = Some((text, remaining - 1));
            }
        }
        // Rendered panels carry layout whitespace around the text
        Ok(Some(format!("\n  {}  \n", state.output)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panels() -> String {
        Selectors::default().panels
    }

    #[tokio::test]
    async fn test_popup_swallows_click_until_escape() {
        let page = MockPage::new(MockPageConfig::default());
        page.fill("textarea", "abc").await.unwrap();
        assert!(page.overlay_open());

        page.click_at(5.0, 5.0).await.unwrap();
        assert_eq!(page.renders(), 0);

        page.fill("textarea", "abc").await.unwrap();
        page.press("textarea", Key::Escape).await.unwrap();
        page.click_at(5.0, 5.0).await.unwrap();
        assert_eq!(page.renders(), 1);
    }

    #[tokio::test]
    async fn test_render_gap_blanks_output_before_new_text() {
        let page = MockPage::new(MockPageConfig::with_translations(&[("X", "Y")]));
        page.fill("textarea", "X").await.unwrap();
        page.press("textarea", Key::Escape).await.unwrap();
        page.click_at(5.0, 5.0).await.unwrap();

        let sel = panels();
        assert_eq!(page.text_content(&sel, 1).await.unwrap().unwrap().trim(), "");
        assert_eq!(page.text_content(&sel, 1).await.unwrap().unwrap().trim(), "Y");
        assert_eq!(page.text_content(&sel, 0).await.unwrap().unwrap(), "X");
    }

    #[tokio::test]
    async fn test_select_all_backspace_clears_input() {
        let page = MockPage::new(MockPageConfig::default());
        page.fill("textarea", "hello").await.unwrap();
        page.press("textarea", Key::Backspace).await.unwrap();
        assert_eq!(page.input(), "hell");

        page.press("textarea", Key::SelectAll).await.unwrap();
        page.press("textarea", Key::Backspace).await.unwrap();
        assert_eq!(page.input(), "");
    }

    #[tokio::test]
    async fn test_unknown_selectors_are_rejected() {
        let page = MockPage::new(MockPageConfig::default());
        assert!(matches!(
            page.fill("input#other", "x").await,
            Err(Error::ElementNotFound { .. })
        ));
        assert!(matches!(
            page.text_content(&panels(), 2).await,
            Err(Error::ElementNotFound { .. })
        ));
        assert!(page.click_by_role("link", "clear").await.is_err());
    }
}
