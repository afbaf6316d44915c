//! Harness runs against a real browser
//!
//! These use the static page in `tests/fixtures/translator.html`, which
//! rebuilds its result panel on every render like the live site does.
//! Run with `cargo test -- --ignored` on a machine with Chromium installed.

use std::path::PathBuf;
use std::sync::Arc;

use translit::browser::ChromeBrowser;
use translit::harness::{load_fixture, run_golden};
use translit::{Config, ScenarioRunner};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn local_config() -> Config {
    let mut config = Config::default();
    config.target.url = format!("file://{}", fixtures_dir().join("translator.html").display());
    config.browser.no_sandbox = true;
    config
}

#[tokio::test]
#[ignore = "requires chromium"]
async fn test_fixture_passes_against_local_page() {
    let config = local_config();
    let cases = load_fixture(&fixtures_dir().join("testcases.json")).unwrap();

    let browser = ChromeBrowser::launch(&config).await.unwrap();
    let page = browser
        .open(&config.target.url, config.timeouts.navigation())
        .await
        .unwrap();

    let runner = ScenarioRunner::new(Arc::new(page), config);
    let summary = runner.run(&cases).await;
    browser.close().await.unwrap();

    let summary = summary.unwrap();
    assert_eq!(summary.total, 4);
    assert!(summary.run_passed(), "{:#?}", summary.verdicts);
}

#[tokio::test]
#[ignore = "requires chromium"]
async fn test_golden_path_against_local_page() {
    let config = local_config();

    let browser = ChromeBrowser::launch(&config).await.unwrap();
    let page = browser
        .open(&config.target.url, config.timeouts.navigation())
        .await
        .unwrap();

    let report = run_golden(&page, &config, "oyaa kohedha?").await;
    browser.close().await.unwrap();

    let report = report.unwrap();
    assert_eq!(report.output, "ඔයා කොහෙද?");
}
