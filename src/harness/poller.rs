//! Stabilization polling
//!
//! Samples a changing value until a predicate holds or a deadline passes.
//! False samples and failed samples are both treated as "not yet": the page
//! blanks and re-creates its output node while re-rendering, so a single
//! bad read says nothing about the final state.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use regex::Regex;
use tokio::time::Instant;

use crate::common::config::{Timing, DEFAULT_POLL_INTERVALS_MS};
use crate::common::{Error, Result};

/// Deadline and pacing for one poll
#[derive(Debug, Clone)]
pub struct PollOptions {
    pub timeout: Duration,
    /// Pause before each retry; the last entry repeats
    pub intervals: Vec<Duration>,
}

impl PollOptions {
    /// Poll with the default back-off schedule
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            intervals: DEFAULT_POLL_INTERVALS_MS
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect(),
        }
    }

    /// Poll with the schedule from the `[timing]` settings
    pub fn from_timing(timeout: Duration, timing: &Timing) -> Self {
        Self::new(timeout).with_intervals(timing.poll_intervals())
    }

    pub fn with_intervals(mut self, intervals: Vec<Duration>) -> Self {
        if !intervals.is_empty() {
            self.intervals = intervals;
        }
        self
    }

    /// Poll at a fixed pace
    pub fn with_interval(self, interval: Duration) -> Self {
        self.with_intervals(vec![interval])
    }

    /// Clip the timeout to a remaining budget
    pub fn capped(mut self, budget: Duration) -> Self {
        self.timeout = self.timeout.min(budget);
        self
    }

    fn interval(&self, retry: usize) -> Duration {
        self.intervals
            .get(retry)
            .or_else(|| self.intervals.last())
            .copied()
            .unwrap_or(Duration::from_millis(DEFAULT_POLL_INTERVALS_MS[0]))
    }
}

/// A sample that satisfied the predicate
#[derive(Debug)]
pub struct Settled<T> {
    pub value: T,
    pub elapsed: Duration,
    pub attempts: u32,
}

/// The deadline passed before any sample satisfied the predicate
#[derive(Debug)]
pub struct Unsettled<T> {
    /// Most recent successfully sampled value
    pub last: Option<T>,
    /// Set when the most recent attempt failed rather than returned a value
    pub last_error: Option<Error>,
    pub elapsed: Duration,
    pub attempts: u32,
}

impl<T: fmt::Display> Unsettled<T> {
    /// Convert into the error reported for the case
    ///
    /// A failing final sample (e.g. the panel never became visible) is more
    /// specific than a plain timeout, so it wins.
    pub fn into_error(self, condition: &str) -> Error {
        match self.last_error {
            Some(error) => error,
            None => Error::poll_timeout(
                condition,
                self.elapsed.as_millis() as u64,
                &self.last.map(|v| v.to_string()).unwrap_or_default(),
            ),
        }
    }
}

pub type PollResult<T> = std::result::Result<Settled<T>, Unsettled<T>>;

/// Sample until `predicate` holds or `options.timeout` elapses
///
/// At least one sample is always taken, and a final sample is taken at the
/// deadline. Each sample is itself bounded by the deadline.
pub async fn poll<T, S, Fut, P>(mut sample: S, predicate: P, options: &PollOptions) -> PollResult<T>
where
    S: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&T) -> bool,
{
    let start = Instant::now();
    let deadline = start + options.timeout;
    let mut attempts = 0u32;
    let mut last = None;
    let mut last_error = None;

    loop {
        attempts += 1;
        match tokio::time::timeout_at(deadline, sample()).await {
            Ok(Ok(value)) => {
                if predicate(&value) {
                    return Ok(Settled {
                        value,
                        elapsed: start.elapsed(),
                        attempts,
                    });
                }
                last = Some(value);
                last_error = None;
            }
            Ok(Err(error)) => {
                tracing::trace!(attempt = attempts, "Sample failed: {}", error);
                last_error = Some(error);
            }
            Err(_) => break,
        }

        let now = Instant::now();
        if now >= deadline {
            break;
        }
        let pause = options.interval(attempts as usize - 1).min(deadline - now);
        tokio::time::sleep(pause).await;
    }

    Err(Unsettled {
        last,
        last_error,
        elapsed: start.elapsed(),
        attempts,
    })
}

/// Predicates over observed text
#[derive(Debug, Clone)]
pub enum Expectation {
    /// Text contains a match of the pattern (e.g. a script's code point range)
    Matches(Regex),
    /// Text differs from a sentinel (usually "" for "rendered something")
    NotEqual(String),
    /// Text equals a value exactly
    Equals(String),
}

impl Expectation {
    pub fn matches(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Self::Matches)
            .map_err(|e| Error::Config(format!("Invalid pattern '{}': {}", pattern, e)))
    }

    pub fn not_equal(sentinel: impl Into<String>) -> Self {
        Self::NotEqual(sentinel.into())
    }

    pub fn equals(value: impl Into<String>) -> Self {
        Self::Equals(value.into())
    }

    /// The "output rendered something" expectation
    pub fn non_empty() -> Self {
        Self::not_equal("")
    }

    pub fn holds(&self, value: &str) -> bool {
        match self {
            Self::Matches(re) => re.is_match(value),
            Self::NotEqual(sentinel) => value != sentinel,
            Self::Equals(expected) => value == expected,
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Matches(re) => write!(f, "text matching /{}/", re.as_str()),
            Self::NotEqual(sentinel) => write!(f, "text != \"{}\"", sentinel),
            Self::Equals(expected) => write!(f, "text == \"{}\"", expected),
        }
    }
}

/// Poll a text source until `expectation` holds
pub async fn poll_until<S, Fut>(
    sample: S,
    expectation: &Expectation,
    options: &PollOptions,
) -> PollResult<String>
where
    S: FnMut() -> Fut,
    Fut: Future<Output = Result<String>>,
{
    poll(sample, |value: &String| expectation.holds(value), options).await
}
