//! CLI command definitions
//!
//! Defines the clap commands for the harness CLI.

use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run every case in a fixture against the page
    Run {
        /// Path to the JSON or YAML test-case fixture
        fixture: PathBuf,

        #[command(flatten)]
        target: TargetArgs,

        /// Only run cases whose id starts with this prefix (e.g. Neg_)
        #[arg(long)]
        only: Option<String>,

        /// Print the run summary as JSON instead of the coloured report
        #[arg(long)]
        json: bool,
    },

    /// Golden-path check: one known input must render in the target script
    Smoke {
        #[command(flatten)]
        target: TargetArgs,

        /// Input to submit (default from config: "Oyaa kohedha?")
        #[arg(long)]
        input: Option<String>,
    },

    /// Load and validate a fixture without opening a browser
    Check {
        /// Path to the JSON or YAML test-case fixture
        fixture: PathBuf,

        /// Print the parsed cases as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Where and how to open the page
#[derive(Args, Debug, Default)]
pub struct TargetArgs {
    /// Page URL (overrides [target] url)
    #[arg(long)]
    pub url: Option<String>,

    /// Configuration file (default: platform config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Launch the browser with --no-sandbox
    #[arg(long)]
    pub no_sandbox: bool,
}
