//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::config_path;
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// System under test
    #[serde(default)]
    pub target: TargetConfig,

    /// DOM selectors for the page surfaces
    #[serde(default)]
    pub selectors: Selectors,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,

    /// Settle delays and poll pacing
    #[serde(default)]
    pub timing: Timing,

    /// Browser launch settings
    #[serde(default)]
    pub browser: BrowserSettings,

    /// Golden-path smoke check
    #[serde(default)]
    pub golden: GoldenConfig,
}

/// Target page settings
#[derive(Debug, Deserialize, Clone)]
pub struct TargetConfig {
    /// URL of the transliteration page
    #[serde(default = "default_url")]
    pub url: String,

    /// Input typed for `Pos_UI` cases that carry no input of their own
    #[serde(default = "default_ui_sample")]
    pub ui_sample_input: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            ui_sample_input: default_ui_sample(),
        }
    }
}

fn default_url() -> String {
    "https://swifttranslator.com/".to_string()
}

fn default_ui_sample() -> String {
    "oyaa kohedha?".to_string()
}

/// Selectors locating the input, the result panels and the clear button
#[derive(Debug, Deserialize, Clone)]
pub struct Selectors {
    /// The single free-text input (first match is used)
    #[serde(default = "default_input")]
    pub input: String,

    /// Shared style signature of the echo and output panels
    #[serde(default = "default_panels")]
    pub panels: String,

    /// Which panel match is the output (0 = echo panel)
    #[serde(default = "default_output_index")]
    pub output_index: usize,

    /// Number of panels the page must expose before a run starts
    #[serde(default = "default_panel_count")]
    pub panel_count: usize,

    /// Accessible role of the clear affordance
    #[serde(default = "default_clear_role")]
    pub clear_role: String,

    /// Case-insensitive pattern matched against the clear affordance's name
    #[serde(default = "default_clear_name")]
    pub clear_name: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            input: default_input(),
            panels: default_panels(),
            output_index: default_output_index(),
            panel_count: default_panel_count(),
            clear_role: default_clear_role(),
            clear_name: default_clear_name(),
        }
    }
}

fn default_input() -> String {
    "textarea".to_string()
}
fn default_panels() -> String {
    ".w-full.h-80.p-3.rounded-lg".to_string()
}
fn default_output_index() -> usize {
    1
}
fn default_panel_count() -> usize {
    2
}
fn default_clear_role() -> String {
    "button".to_string()
}
fn default_clear_name() -> String {
    "clear".to_string()
}

/// Timeout settings in milliseconds (suite budgets in seconds)
#[derive(Debug, Deserialize, Clone)]
pub struct Timeouts {
    /// Budget for a full fixture run
    #[serde(default = "default_suite")]
    pub suite_secs: u64,

    /// Budget for the golden-path check
    #[serde(default = "default_golden")]
    pub golden_secs: u64,

    /// Waiting for the page to expose its panels
    #[serde(default = "default_panel_wait")]
    pub panel_wait_ms: u64,

    /// Waiting for the output panel to become non-empty
    #[serde(default = "default_output_poll")]
    pub output_poll_ms: u64,

    /// Waiting for input and output to empty after the clear button
    #[serde(default = "default_clear_poll")]
    pub clear_poll_ms: u64,

    /// Waiting for the golden-path output to match the script pattern
    #[serde(default = "default_golden_poll")]
    pub golden_poll_ms: u64,

    /// Waiting for the output panel to be visible before each read
    #[serde(default = "default_visibility")]
    pub visibility_ms: u64,

    /// Page navigation
    #[serde(default = "default_navigation")]
    pub navigation_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            suite_secs: default_suite(),
            golden_secs: default_golden(),
            panel_wait_ms: default_panel_wait(),
            output_poll_ms: default_output_poll(),
            clear_poll_ms: default_clear_poll(),
            golden_poll_ms: default_golden_poll(),
            visibility_ms: default_visibility(),
            navigation_secs: default_navigation(),
        }
    }
}

fn default_suite() -> u64 {
    180
}
fn default_golden() -> u64 {
    60
}
fn default_panel_wait() -> u64 {
    15_000
}
fn default_output_poll() -> u64 {
    30_000
}
fn default_clear_poll() -> u64 {
    15_000
}
fn default_golden_poll() -> u64 {
    20_000
}
fn default_visibility() -> u64 {
    5_000
}
fn default_navigation() -> u64 {
    30
}

impl Timeouts {
    pub fn suite(&self) -> Duration {
        Duration::from_secs(self.suite_secs)
    }

    pub fn golden(&self) -> Duration {
        Duration::from_secs(self.golden_secs)
    }

    pub fn panel_wait(&self) -> Duration {
        Duration::from_millis(self.panel_wait_ms)
    }

    pub fn output_poll(&self) -> Duration {
        Duration::from_millis(self.output_poll_ms)
    }

    pub fn clear_poll(&self) -> Duration {
        Duration::from_millis(self.clear_poll_ms)
    }

    pub fn golden_poll(&self) -> Duration {
        Duration::from_millis(self.golden_poll_ms)
    }

    pub fn visibility(&self) -> Duration {
        Duration::from_millis(self.visibility_ms)
    }

    pub fn navigation(&self) -> Duration {
        Duration::from_secs(self.navigation_secs)
    }
}

/// Delay absorbing the page's debounced re-render after the input is cleared
pub const SETTLE_AFTER_CLEAR_MS: u64 = 400;

/// Poll back-off schedule; the last entry repeats
pub const DEFAULT_POLL_INTERVALS_MS: [u64; 4] = [100, 250, 500, 1000];

/// Neutral viewport coordinate clicked to move focus off the input
pub const NEUTRAL_POINT: (f64, f64) = (5.0, 5.0);

/// Settle delays and poll pacing
#[derive(Debug, Deserialize, Clone)]
pub struct Timing {
    #[serde(default = "default_settle")]
    pub settle_after_clear_ms: u64,

    #[serde(default = "default_intervals")]
    pub poll_intervals_ms: Vec<u64>,

    #[serde(default = "default_neutral_point")]
    pub neutral_point: (f64, f64),
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            settle_after_clear_ms: default_settle(),
            poll_intervals_ms: default_intervals(),
            neutral_point: default_neutral_point(),
        }
    }
}

fn default_settle() -> u64 {
    SETTLE_AFTER_CLEAR_MS
}
fn default_intervals() -> Vec<u64> {
    DEFAULT_POLL_INTERVALS_MS.to_vec()
}
fn default_neutral_point() -> (f64, f64) {
    NEUTRAL_POINT
}

impl Timing {
    pub fn settle_after_clear(&self) -> Duration {
        Duration::from_millis(self.settle_after_clear_ms)
    }

    pub fn poll_intervals(&self) -> Vec<Duration> {
        self.poll_intervals_ms
            .iter()
            .map(|ms| Duration::from_millis(*ms))
            .collect()
    }
}

/// Browser launch settings
#[derive(Debug, Deserialize, Clone)]
pub struct BrowserSettings {
    /// Path to a Chromium/Chrome binary; searched on PATH when unset
    pub executable: Option<PathBuf>,

    /// Run without a visible window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Pass --no-sandbox (needed in most containers)
    #[serde(default)]
    pub no_sandbox: bool,

    #[serde(default = "default_window")]
    pub window_size: (u32, u32),
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            executable: None,
            headless: default_headless(),
            no_sandbox: false,
            window_size: default_window(),
        }
    }
}

fn default_headless() -> bool {
    true
}
fn default_window() -> (u32, u32) {
    (1280, 800)
}

/// Golden-path check settings
#[derive(Debug, Deserialize, Clone)]
pub struct GoldenConfig {
    /// Input submitted by the smoke check
    #[serde(default = "default_golden_input")]
    pub input: String,

    /// Pattern the output must eventually contain (Sinhala block by default)
    #[serde(default = "default_golden_pattern")]
    pub pattern: String,
}

impl Default for GoldenConfig {
    fn default() -> Self {
        Self {
            input: default_golden_input(),
            pattern: default_golden_pattern(),
        }
    }
}

fn default_golden_input() -> String {
    "Oyaa kohedha?".to_string()
}
fn default_golden_pattern() -> String {
    r"[\u{0D80}-\u{0DFF}]{2,}".to_string()
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        let config: Self =
            toml::from_str(&content).map_err(|e| Error::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the harness cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.selectors.output_index >= self.selectors.panel_count {
            return Err(Error::Config(format!(
                "selectors.output_index {} is out of range for {} panels",
                self.selectors.output_index, self.selectors.panel_count
            )));
        }
        if self.timing.poll_intervals_ms.is_empty() {
            return Err(Error::Config(
                "timing.poll_intervals_ms must list at least one interval".to_string(),
            ));
        }
        if self.timing.poll_intervals_ms.contains(&0) {
            return Err(Error::Config(
                "timing.poll_intervals_ms entries must be greater than zero".to_string(),
            ));
        }
        regex::Regex::new(&self.golden.pattern)
            .map_err(|e| Error::Config(format!("golden.pattern is not a valid regex: {}", e)))?;
        Ok(())
    }

    /// Locate the browser binary
    ///
    /// Falls back to searching PATH if not explicitly configured
    pub fn browser_executable(&self) -> Result<PathBuf> {
        if let Some(path) = &self.browser.executable {
            return Ok(path.clone());
        }

        const CANDIDATES: [&str; 5] = [
            "chromium",
            "chromium-browser",
            "google-chrome",
            "google-chrome-stable",
            "chrome",
        ];

        CANDIDATES
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or_else(|| Error::BrowserNotFound(CANDIDATES.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_target_page() {
        let config = Config::default();
        assert_eq!(config.selectors.input, "textarea");
        assert_eq!(config.selectors.panels, ".w-full.h-80.p-3.rounded-lg");
        assert_eq!(config.selectors.output_index, 1);
        assert_eq!(config.timeouts.output_poll_ms, 30_000);
        assert_eq!(config.timeouts.visibility_ms, 5_000);
        assert_eq!(config.timing.settle_after_clear_ms, 400);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
[target]
url = "http://localhost:5173/"

[timeouts]
output_poll_ms = 1000
"#,
        )
        .unwrap();

        assert_eq!(config.target.url, "http://localhost:5173/");
        assert_eq!(config.target.ui_sample_input, "oyaa kohedha?");
        assert_eq!(config.timeouts.output_poll_ms, 1000);
        assert_eq!(config.timeouts.suite_secs, 180);
        assert_eq!(config.timing.poll_intervals_ms, vec![100, 250, 500, 1000]);
    }

    #[test]
    fn test_output_index_must_fit_panel_count() {
        let mut config = Config::default();
        config.selectors.output_index = 2;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_golden_pattern_must_compile() {
        let mut config = Config::default();
        config.golden.pattern = "[unclosed".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_default_golden_pattern_matches_sinhala() {
        let re = regex::Regex::new(&Config::default().golden.pattern).unwrap();
        assert!(re.is_match("ඔයා කොහෙද?"));
        assert!(!re.is_match("oyaa kohedha?"));
    }
}
