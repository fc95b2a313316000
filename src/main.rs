//! rex - Resolve project exporter
//!
//! Main binary entry point for the command-line interface.

use clap::Parser;
use rex::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let code = rex::cli::dispatch(cli).await;
    std::process::exit(code);
}
