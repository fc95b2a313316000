//! Command-line interface for rex.
//!
//! Thin dispatch into the backup engine: settings are loaded once, logging
//! is initialised from them and each subcommand returns a process exit code.

use crate::config::Settings;
use crate::store::FsProjectStore;
use crate::{logging, Error};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, IsTerminal};
use std::path::PathBuf;

pub mod backup;
pub mod config;
pub mod info;
pub mod up;
pub mod verify;

/// rex - Resolve project exporter
#[derive(Parser)]
#[command(name = "rex")]
#[command(about = "Schedule and manage project backups with checksums and de-duplication")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Settings file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Back up projects to the configured directory now
    Backup(backup::BackupArgs),
    /// Show or edit the settings file
    Config(config::ConfigArgs),
    /// Show information about the connected project store
    Info(info::InfoArgs),
    /// Run the backup scheduler in the foreground
    Up(up::UpArgs),
    /// Check existing backups against their checksum sidecars
    Verify(verify::VerifyArgs),
}

/// Connect to the project store described by the settings
pub fn open_store(settings: &Settings) -> crate::Result<FsProjectStore> {
    let mut store = FsProjectStore::open(&settings.store.root)?;
    if let Some(name) = &settings.store.database_name {
        store = store.with_database_name(name.clone());
    }
    if let Some(active) = &settings.store.active_project {
        store = store.with_active_project(active);
    }
    Ok(store)
}

fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<Error>()
        .map(Error::exit_code)
        .unwrap_or(1)
}

fn pause_before_exit() {
    if io::stdin().is_terminal() {
        eprintln!("Press ENTER to exit");
        let mut line = String::new();
        let _ = io::stdin().lock().read_line(&mut line);
    }
}

/// Load settings, set up logging and run the selected command
pub async fn dispatch(cli: Cli) -> i32 {
    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: failed to load settings: {}", e);
            return e.exit_code();
        }
    };

    let logging = if settings.app.log_to_file {
        logging::init_file_logging(&settings.app.logfile_path, settings.log_filter(), cli.verbose)
    } else {
        logging::init_logging(settings.log_filter(), cli.verbose)
    };
    if let Err(e) = logging {
        eprintln!("Warning: logging unavailable: {}", e);
    }

    let result = match cli.command {
        Commands::Backup(args) => backup::run(args, settings.clone()).await,
        Commands::Config(args) => config::run(args, &settings, cli.config.as_deref()),
        Commands::Info(args) => info::run(args, settings.clone()).await,
        Commands::Up(args) => up::run(args, settings.clone()).await,
        Commands::Verify(args) => verify::run(args, settings.clone()).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            let code = exit_code(&e);
            if code != 130 && settings.app.pause_on_exit {
                pause_before_exit();
            }
            code
        }
    }
}
