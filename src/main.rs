//! translit-check - end-to-end checks for web transliteration tools
//!
//! Drives the page in a browser, submits fixture inputs, waits for the
//! output panel to settle and reports a PASS/FAIL verdict per case.

use clap::Parser;
use translit::commands::Commands;
use translit::{cli, common::logging};

#[derive(Parser)]
#[command(name = "translit-check", about = "End-to-end checks for web transliteration tools")]
#[command(version, long_about = None)]
struct Cli {
    /// Show every case in the report and enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_cli(cli.verbose);

    if let Err(e) = cli::dispatch(cli.command, cli.verbose).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
