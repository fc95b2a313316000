//! Logging setup for the rex binary.

use crate::Result;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins over the configured level
fn filter_for(level: &str, verbose: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    if verbose {
        EnvFilter::new("rex=debug")
    } else {
        EnvFilter::new(format!("rex={}", level))
    }
}

pub fn init_logging(level: &str, verbose: bool) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter_for(level, verbose))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(verbose)
        .with_line_number(verbose)
        .init();

    Ok(())
}

pub fn init_file_logging(log_file: &Path, level: &str, verbose: bool) -> Result<()> {
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter_for(level, verbose))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
