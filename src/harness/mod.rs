//! Verification harness
//!
//! Drives the page through an input driver, waits for the output with a
//! stabilization poller, and classifies each case with the oracle. The
//! scenario runner strings these together over a fixture.

pub mod fixture;
pub mod golden;
pub mod input;
pub mod observer;
pub mod oracle;
pub mod poller;
pub mod report;
pub mod runner;

pub use fixture::{filter_cases, load_fixture, parse_fixture, CaseCategory, FixtureFormat, TestCase};
pub use golden::{run_golden, GoldenReport};
pub use input::InputDriver;
pub use observer::OutputObserver;
pub use oracle::{classify, ClearState, Observed, Outcome, Verdict};
pub use poller::{poll, poll_until, Expectation, PollOptions, PollResult, Settled, Unsettled};
pub use runner::{RunSummary, ScenarioRunner};
