//! CLI command handling
//!
//! Dispatches CLI commands to the harness and formats output.

mod session;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::commands::{Commands, TargetArgs};
use crate::common::{Error, Result};
use crate::harness::{self, report, ScenarioRunner};

pub use session::{open_page, resolve_config};

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, verbose: bool) -> Result<()> {
    match command {
        Commands::Run {
            fixture,
            target,
            only,
            json,
        } => run(&fixture, &target, only.as_deref(), json, verbose).await,

        Commands::Smoke { target, input } => smoke(&target, input).await,

        Commands::Check { fixture, json } => check(&fixture, json),
    }
}

async fn run(
    fixture: &Path,
    target: &TargetArgs,
    only: Option<&str>,
    json: bool,
    verbose: bool,
) -> Result<()> {
    // Fixture problems must surface before a browser is started
    let cases = harness::load_fixture(fixture)?;
    let cases = harness::filter_cases(cases, only)?;
    let config = resolve_config(target)?;

    let (browser, page) = open_page(&config).await?;
    let runner = ScenarioRunner::new(Arc::new(page), config);

    let pb = if json || verbose {
        ProgressBar::hidden()
    } else {
        case_progress(cases.len() as u64)
    };
    let result = runner
        .run_with(&cases, |verdict| {
            pb.set_message(verdict.test_case_id.clone());
            pb.inc(1);
        })
        .await;
    pb.finish_and_clear();

    if let Err(e) = browser.close().await {
        tracing::warn!("Failed to close browser: {}", e);
    }

    let summary = result?;
    if json {
        println!("{}", report::summary_json(&summary)?);
    } else {
        report::print_summary(&summary, verbose);
    }

    if let Some(reason) = summary.aborted {
        Err(Error::Assertion(format!("run aborted: {}", reason)))
    } else if summary.run_passed() {
        Ok(())
    } else {
        Err(Error::Assertion(format!(
            "{} of {} cases failed",
            summary.failed, summary.total
        )))
    }
}

async fn smoke(target: &TargetArgs, input: Option<String>) -> Result<()> {
    let config = resolve_config(target)?;
    let input = input.unwrap_or_else(|| config.golden.input.clone());

    let (browser, page) = open_page(&config).await?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("Waiting for \"{}\" to render", input));
    spinner.enable_steady_tick(Duration::from_millis(120));
    let result = harness::run_golden(&page, &config, &input).await;
    spinner.finish_and_clear();

    if let Err(e) = browser.close().await {
        tracing::warn!("Failed to close browser: {}", e);
    }

    let golden = result?;
    report::print_golden(&golden);
    Ok(())
}

fn case_progress(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("  [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map(|style| style.progress_chars("=> "))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

fn check(fixture: &Path, json: bool) -> Result<()> {
    let cases = harness::load_fixture(fixture)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&cases)?);
    } else {
        report::print_cases(&cases);
    }
    Ok(())
}
