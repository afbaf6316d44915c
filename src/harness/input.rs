//! Input driver
//!
//! Applies one test input to the page. The per-case order is always
//! [`InputDriver::clear_input`] → [`InputDriver::set_input`] →
//! [`InputDriver::dismiss_overlays_and_blur`]; [`InputDriver::submit`] runs
//! all three. Without the last step a suggestion popup can swallow the
//! blur, and the output is never recomputed.

use std::time::Duration;

use crate::browser::{Key, PageSurface};
use crate::common::config::{Config, Selectors};
use crate::common::Result;

pub struct InputDriver<'a> {
    page: &'a dyn PageSurface,
    selectors: &'a Selectors,
    settle_after_clear: Duration,
    neutral_point: (f64, f64),
}

impl<'a> InputDriver<'a> {
    pub fn new(page: &'a dyn PageSurface, config: &'a Config) -> Self {
        Self {
            page,
            selectors: &config.selectors,
            settle_after_clear: config.timing.settle_after_clear(),
            neutral_point: config.timing.neutral_point,
        }
    }

    /// Empty the input and let the page's debounced re-render run
    ///
    /// The value is emptied twice: fill, then select-all + Backspace.
    pub async fn clear_input(&self) -> Result<()> {
        let input = self.selectors.input.as_str();
        self.page.focus(input).await?;
        self.page.fill(input, "").await?;
        self.page.press(input, Key::SelectAll).await?;
        self.page.press(input, Key::Backspace).await?;
        tokio::time::sleep(self.settle_after_clear).await;
        Ok(())
    }

    /// Write the literal text into the input
    pub async fn set_input(&self, text: &str) -> Result<()> {
        self.page.fill(&self.selectors.input, text).await
    }

    /// Close suggestion popups, then click away so the output recomputes
    pub async fn dismiss_overlays_and_blur(&self) -> Result<()> {
        self.page.press(&self.selectors.input, Key::Escape).await?;
        let (x, y) = self.neutral_point;
        self.page.click_at(x, y).await
    }

    /// Clear, type and blur, in that order
    pub async fn submit(&self, text: &str) -> Result<()> {
        self.clear_input().await?;
        self.set_input(text).await?;
        self.dismiss_overlays_and_blur().await
    }

    /// Current (trimmed) value of the input
    pub async fn input_value(&self) -> Result<String> {
        let value = self.page.input_value(&self.selectors.input).await?;
        Ok(value.trim().to_string())
    }

    /// Click the page's clear button
    pub async fn press_clear(&self) -> Result<()> {
        self.page
            .click_by_role(&self.selectors.clear_role, &self.selectors.clear_name)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{MockPage, MockPageConfig};

    #[tokio::test(start_paused = true)]
    async fn test_clear_input_is_idempotent() {
        let config = Config::default();
        let page = MockPage::new(MockPageConfig::default());
        let driver = InputDriver::new(&page, &config);

        driver.set_input("kohedha").await.unwrap();
        driver.clear_input().await.unwrap();
        assert_eq!(driver.input_value().await.unwrap(), "");

        driver.clear_input().await.unwrap();
        assert_eq!(driver.input_value().await.unwrap(), "");
        assert_eq!(page.input(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_input_waits_settle_delay() {
        let config = Config::default();
        let page = MockPage::new(MockPageConfig::default());
        let driver = InputDriver::new(&page, &config);

        let start = tokio::time::Instant::now();
        driver.clear_input().await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_runs_steps_in_order() {
        let config = Config::default();
        let page = MockPage::new(MockPageConfig::default());
        let driver = InputDriver::new(&page, &config);

        driver.submit("mama").await.unwrap();

        assert_eq!(
            page.events(),
            vec![
                "focus",
                "fill:",
                "press:Control+A",
                "press:Backspace",
                "fill:mama",
                "press:Escape",
                "click_at:5,5",
                "blur",
            ]
        );
        assert_eq!(page.renders(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blur_without_escape_is_swallowed_by_popup() {
        let config = Config::default();
        let page = MockPage::new(MockPageConfig::default());
        let driver = InputDriver::new(&page, &config);

        driver.clear_input().await.unwrap();
        driver.set_input("mama").await.unwrap();
        page.click_at(5.0, 5.0).await.unwrap();

        assert_eq!(page.renders(), 0);
    }

    #[tokio::test]
    async fn test_press_clear_requires_button() {
        let config = Config::default();
        let page = MockPage::new(MockPageConfig {
            clear_button: false,
            ..MockPageConfig::default()
        });
        let driver = InputDriver::new(&page, &config);
        assert!(driver.press_clear().await.is_err());
    }
}
