//! Golden-path smoke check
//!
//! Submits one known input and waits for the output to contain text in the
//! target script. This is the quickest way to tell whether the page, the
//! selectors and the browser setup work at all before running a fixture.

use serde::Serialize;
use tokio::time::Instant;

use crate::browser::PageSurface;
use crate::common::config::Config;
use crate::common::{Error, Result};

use super::input::InputDriver;
use super::observer::OutputObserver;
use super::poller::{poll_until, Expectation, PollOptions};

#[derive(Debug, Clone, Serialize)]
pub struct GoldenReport {
    pub input: String,
    pub output: String,
    pub pattern: String,
    pub elapsed_ms: u64,
}

/// Run the smoke check within the `timeouts.golden_secs` budget
pub async fn run_golden(page: &dyn PageSurface, config: &Config, input: &str) -> Result<GoldenReport> {
    let budget = config.timeouts.golden();
    match tokio::time::timeout(budget, golden_path(page, config, input)).await {
        Ok(result) => result,
        Err(_) => Err(Error::poll_timeout(
            "golden path to complete",
            budget.as_millis() as u64,
            "",
        )),
    }
}

async fn golden_path(page: &dyn PageSurface, config: &Config, input: &str) -> Result<GoldenReport> {
    let start = Instant::now();
    let observer = &OutputObserver::new(page, config);
    let expectation = Expectation::matches(&config.golden.pattern)?;

    observer.wait_for_panels(config.timeouts.panel_wait()).await?;
    InputDriver::new(page, config).submit(input).await?;

    let options = PollOptions::from_timing(config.timeouts.golden_poll(), &config.timing);
    let settled = poll_until(move || observer.read(), &expectation, &options)
        .await
        .map_err(|unsettled| unsettled.into_error(&format!("output {}", expectation)))?;

    tracing::debug!(
        attempts = settled.attempts,
        elapsed_ms = settled.elapsed.as_millis() as u64,
        "Golden output matched"
    );

    let output = observer.read().await?;
    if output.is_empty() {
        return Err(Error::Assertion(
            "output panel emptied after matching the expected script".to_string(),
        ));
    }

    Ok(GoldenReport {
        input: input.to_string(),
        output,
        pattern: config.golden.pattern.clone(),
        elapsed_ms: start.elapsed().as_millis() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{MockPage, MockPageConfig};

    #[tokio::test(start_paused = true)]
    async fn test_golden_matches_target_script() {
        let config = Config::default();
        let page = MockPage::new(MockPageConfig::with_translations(&[(
            "Oyaa kohedha?",
            "ඔයා කොහෙද?",
        )]));

        let report = run_golden(&page, &config, "Oyaa kohedha?").await.unwrap();
        assert_eq!(report.output, "ඔයා කොහෙද?");
        assert!(report.elapsed_ms < 20_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_golden_times_out_on_latin_output() {
        let config = Config::default();
        // Unknown inputs are echoed back untransliterated
        let page = MockPage::new(MockPageConfig::default());

        let err = run_golden(&page, &config, "Oyaa kohedha?").await.unwrap_err();
        match err {
            Error::PollTimeout { last, waited_ms, .. } => {
                assert_eq!(last, "Oyaa kohedha?");
                assert_eq!(waited_ms, 20_000);
            }
            other => panic!("Expected PollTimeout, got {:?}", other),
        }
    }
}
