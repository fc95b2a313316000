//! Backup command implementation.

use crate::backup::BackupOrchestrator;
use crate::cancel::{self, CancelFlag};
use crate::config::Settings;
use anyhow::Result;
use clap::Args;

/// Arguments for the backup command
#[derive(Args)]
pub struct BackupArgs {
    /// Show what would be exported without writing any files
    #[arg(long)]
    pub dry_run: bool,

    /// Only back up the project currently open in the store
    #[arg(long, conflicts_with = "all")]
    pub active_only: bool,

    /// Back up every project in the store
    #[arg(long)]
    pub all: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the backup command
pub async fn run(args: BackupArgs, settings: Settings) -> Result<i32> {
    settings.validate()?;
    let store = super::open_store(&settings)?;

    let mut options = settings.backup_options();
    options.dry_run = args.dry_run;
    if args.active_only {
        options.active_only = true;
    }
    if args.all {
        options.active_only = false;
    }

    let cancel = CancelFlag::new();
    cancel::install_ctrl_c_handler(cancel.clone());

    println!(
        "Backing up {} to {}",
        if options.active_only { "active project" } else { "all projects" },
        settings.backup.static_dir.display()
    );

    let static_dir = settings.backup.static_dir.clone();
    let summary = tokio::task::spawn_blocking(move || {
        let mut store = store;
        BackupOrchestrator::new(static_dir, options)
            .with_cancel(cancel)
            .backup(&mut store)
    })
    .await??;

    if args.json {
        println!("{}", summary.to_json()?);
    } else {
        println!("{}", summary.render_text());
    }

    if summary.aborted {
        println!("User aborted...");
    } else if summary.is_success() {
        println!("Successfully backed up!");
    } else {
        println!("Back up finished with failures");
    }

    Ok(summary.exit_code())
}
