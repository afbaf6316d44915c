//! Output observer
//!
//! Reads the output panel. The panel is looked up again on every read: the
//! page replaces the node when it re-renders, so nothing about a previous
//! lookup is reused.
//!
//! The echo panel and the output panel share one style signature; the
//! output is the match at `selectors.output_index` (the second one).

use std::time::Duration;

use crate::browser::PageSurface;
use crate::common::config::{Config, Selectors, Timing};
use crate::common::{Error, Result};

use super::poller::{poll, PollOptions};

pub struct OutputObserver<'a> {
    page: &'a dyn PageSurface,
    selectors: &'a Selectors,
    timing: &'a Timing,
    visibility_timeout: Duration,
}

impl<'a> OutputObserver<'a> {
    pub fn new(page: &'a dyn PageSurface, config: &'a Config) -> Self {
        Self {
            page,
            selectors: &config.selectors,
            timing: &config.timing,
            visibility_timeout: config.timeouts.visibility(),
        }
    }

    /// Trimmed text of the output panel
    ///
    /// Waits for the panel to be visible first; fails with `NotVisible`
    /// if it stays hidden for the visibility timeout.
    pub async fn read(&self) -> Result<String> {
        let page = self.page;
        let selector = self.selectors.panels.as_str();
        let index = self.selectors.output_index;

        let options = PollOptions::from_timing(self.visibility_timeout, self.timing);
        if let Err(unsettled) = poll(
            move || page.is_visible(selector, index),
            |visible: &bool| *visible,
            &options,
        )
        .await
        {
            return Err(match unsettled.last_error {
                Some(error) if !error.is_case_local() => error,
                _ => Error::not_visible(
                    selector,
                    index,
                    self.visibility_timeout.as_millis() as u64,
                ),
            });
        }

        let text = page.text_content(selector, index).await?.unwrap_or_default();
        Ok(text.trim().to_string())
    }

    /// Wait until the page shows the expected number of panels
    pub async fn wait_for_panels(&self, timeout: Duration) -> Result<()> {
        let page = self.page;
        let selector = self.selectors.panels.as_str();
        let expected = self.selectors.panel_count;

        let options = PollOptions::from_timing(timeout, self.timing);
        match poll(
            move || page.count(selector),
            |count: &usize| *count == expected,
            &options,
        )
        .await
        {
            Ok(settled) => {
                tracing::debug!(
                    panels = settled.value,
                    elapsed_ms = settled.elapsed.as_millis() as u64,
                    "Page ready"
                );
                Ok(())
            }
            Err(unsettled) => match unsettled.last_error {
                Some(error) if !error.is_case_local() => Err(error),
                _ => Err(Error::PageLayout(format!(
                    "expected {} elements matching '{}', found {} after {} ms",
                    expected,
                    selector,
                    unsettled.last.unwrap_or(0),
                    timeout.as_millis()
                ))),
            },
        }
    }
}
