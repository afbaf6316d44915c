//! Scenario runner
//!
//! Runs fixture cases one after another against a single page. Cases share
//! the page's only input and output, so nothing here runs concurrently.
//! A case that times out is recorded as a failure and the run moves on.
//! Errors that mean the page itself is gone abort the run: the case that hit
//! the error and every case after it get a failed verdict, and the summary
//! records why the run stopped.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::browser::PageSurface;
use crate::common::config::Config;
use crate::common::{Error, Result};

use super::fixture::{CaseCategory, TestCase};
use super::input::InputDriver;
use super::observer::OutputObserver;
use super::oracle::{classify, ClearState, Observed, Verdict};
use super::poller::{poll, poll_until, Expectation, PollOptions};

/// Verdicts of a run, in fixture order
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub verdicts: Vec<Verdict>,
    /// Set when a fatal error stopped the run early
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted: Option<String>,
}

impl RunSummary {
    fn record(&mut self, verdict: Verdict) {
        if verdict.passed() {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.total += 1;
        self.verdicts.push(verdict);
    }

    /// The run passes only when every case passed
    pub fn run_passed(&self) -> bool {
        self.failed == 0 && self.aborted.is_none()
    }

    pub fn failures(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts.iter().filter(|v| !v.passed())
    }
}

pub struct ScenarioRunner {
    page: Arc<dyn PageSurface>,
    config: Config,
}

impl ScenarioRunner {
    pub fn new(page: Arc<dyn PageSurface>, config: Config) -> Self {
        Self { page, config }
    }

    fn driver(&self) -> InputDriver<'_> {
        InputDriver::new(self.page.as_ref(), &self.config)
    }

    fn observer(&self) -> OutputObserver<'_> {
        OutputObserver::new(self.page.as_ref(), &self.config)
    }

    fn poll_options(&self, timeout: Duration, budget: Duration) -> PollOptions {
        PollOptions::from_timing(timeout, &self.config.timing).capped(budget)
    }

    /// Run all cases
    pub async fn run(&self, cases: &[TestCase]) -> Result<RunSummary> {
        self.run_with(cases, |_| {}).await
    }

    /// Run all cases, reporting each verdict as soon as it is made
    ///
    /// Fails before touching any case if the page never shows its panels.
    /// Once cases have started, every case yields a verdict even if the run
    /// is aborted; see [`RunSummary::aborted`].
    pub async fn run_with<F>(&self, cases: &[TestCase], mut on_verdict: F) -> Result<RunSummary>
    where
        F: FnMut(&Verdict),
    {
        let start = Instant::now();
        let deadline = start + self.config.timeouts.suite();

        self.observer()
            .wait_for_panels(self.config.timeouts.panel_wait())
            .await?;

        tracing::info!(cases = cases.len(), "Starting run");
        let mut summary = RunSummary::default();
        let mut abort: Option<(String, &'static str)> = None;

        for case in cases {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let verdict = if let Some((reason, code)) = &abort {
                Verdict::not_run(case, format!("not run: {}", reason), code)
            } else if remaining.is_zero() {
                tracing::warn!(case = %case.id, "Suite deadline exceeded; not started");
                Verdict::out_of_time(case)
            } else {
                match self.run_case(case, remaining).await {
                    Ok(verdict) => verdict,
                    Err(error) => {
                        tracing::error!(case = %case.id, "Run aborted: {}", error);
                        abort = Some((error.to_string(), error.code()));
                        Verdict::errored(case, &error)
                    }
                }
            };

            if verdict.passed() {
                tracing::info!(case = %verdict.test_case_id, actual = %verdict.actual, "PASS");
            } else {
                tracing::warn!(
                    case = %verdict.test_case_id,
                    expected = %verdict.expected,
                    actual = %verdict.actual,
                    "FAIL: {}",
                    verdict.failure_message().unwrap_or_default()
                );
            }

            on_verdict(&verdict);
            summary.record(verdict);
        }

        summary.aborted = abort.map(|(reason, _)| reason);
        summary.duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            passed = summary.passed,
            failed = summary.failed,
            duration_ms = summary.duration_ms,
            "Run finished"
        );
        Ok(summary)
    }

    /// Run one case, turning case-local errors into a failed verdict
    async fn run_case(&self, case: &TestCase, budget: Duration) -> Result<Verdict> {
        let start = Instant::now();
        tracing::debug!(case = %case.id, category = %case.category, input = %case.input, "Running case");

        let observed = match case.category {
            CaseCategory::UiClear => self.observe_clear(case, budget).await,
            _ => self.observe_output(case, budget).await,
        };

        let verdict = match observed {
            Ok(observed) => classify(case, &observed),
            Err(error) if error.is_case_local() => Verdict::errored(case, &error),
            Err(error) => return Err(error),
        };

        Ok(verdict.with_elapsed(start.elapsed().as_millis() as u64))
    }

    /// Submit the case input and wait for the output to render
    async fn observe_output(&self, case: &TestCase, budget: Duration) -> Result<Observed> {
        let started = Instant::now();
        self.driver().submit(&case.input).await?;
        self.wait_for_output(budget.saturating_sub(started.elapsed()))
            .await?;

        let actual = within(
            budget.saturating_sub(started.elapsed()),
            "final output read",
            self.observer().read(),
        )
        .await?;
        Ok(Observed::Output(actual))
    }

    /// Type a sample, wait for output, press clear, then wait for both to empty
    async fn observe_clear(&self, case: &TestCase, budget: Duration) -> Result<Observed> {
        let started = Instant::now();
        let sample = if case.input.trim().is_empty() {
            self.config.target.ui_sample_input.as_str()
        } else {
            case.input.as_str()
        };

        let driver = self.driver();
        driver.submit(sample).await?;
        self.wait_for_output(budget.saturating_sub(started.elapsed()))
            .await?;
        within(
            budget.saturating_sub(started.elapsed()),
            "clear button click",
            driver.press_clear(),
        )
        .await?;

        let observer = self.observer();
        let (driver, observer) = (&driver, &observer);
        let options = self.poll_options(
            self.config.timeouts.clear_poll(),
            budget.saturating_sub(started.elapsed()),
        );
        let result = poll(
            move || async move {
                Ok::<_, Error>(ClearState {
                    input: driver.input_value().await?,
                    output: observer.read().await?,
                })
            },
            |state: &ClearState| state.is_empty(),
            &options,
        )
        .await;

        match result {
            Ok(settled) => Ok(Observed::Cleared(settled.value)),
            // Residue is a verdict, not an error: let the oracle fail it
            Err(unsettled) => match (unsettled.last_error, unsettled.last) {
                (None, Some(state)) => Ok(Observed::Cleared(state)),
                (Some(error), _) => Err(error),
                (None, None) => Err(Error::Internal("clear poll took no samples".to_string())),
            },
        }
    }

    async fn wait_for_output(&self, budget: Duration) -> Result<String> {
        let observer = &self.observer();
        let expectation = Expectation::non_empty();
        let options = self.poll_options(self.config.timeouts.output_poll(), budget);

        poll_until(move || observer.read(), &expectation, &options)
            .await
            .map(|settled| {
                tracing::debug!(
                    attempts = settled.attempts,
                    elapsed_ms = settled.elapsed.as_millis() as u64,
                    "Output settled"
                );
                settled.value
            })
            .map_err(|unsettled| unsettled.into_error("output panel to render text"))
    }
}

/// Bound a single page step by what is left of the case budget
async fn within<T, F>(budget: Duration, step: &str, action: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(budget, action).await {
        Ok(result) => result,
        Err(_) => Err(Error::poll_timeout(step, budget.as_millis() as u64, "")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_within_cuts_hung_step_at_budget() {
        let start = Instant::now();
        let result: Result<()> = within(Duration::from_secs(2), "slow step", async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(Error::PollTimeout { waited_ms: 2000, .. })));
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_within_zero_budget_still_runs_ready_step() {
        let value = within(Duration::ZERO, "read", async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_aborted_run_does_not_pass() {
        let summary = RunSummary {
            aborted: Some("Browser error: target closed".to_string()),
            ..RunSummary::default()
        };
        assert!(!summary.run_passed());
        assert!(RunSummary::default().run_passed());
    }
}
