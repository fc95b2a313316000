//! Up command: run the scheduler until interrupted.

use crate::cancel::{self, CancelFlag};
use crate::config::Settings;
use crate::notify::{DesktopNotifier, LogNotifier, Notifier};
use crate::scheduler::{BackupScheduler, ScheduleTiming, TickOutcome};
use crate::Error;
use anyhow::Result;
use clap::Args;
use std::sync::Arc;

#[derive(Args)]
pub struct UpArgs {
    /// Log notifications instead of showing desktop notifications
    #[arg(long)]
    pub no_notify: bool,
}

pub async fn run(args: UpArgs, settings: Settings) -> Result<i32> {
    settings.validate()?;
    let store = super::open_store(&settings)?;

    let notifier: Arc<dyn Notifier> = if args.no_notify {
        Arc::new(LogNotifier)
    } else {
        Arc::new(DesktopNotifier::default())
    };

    let cancel = CancelFlag::new();
    cancel::install_ctrl_c_handler(cancel.clone());

    println!(
        "Starting rex scheduler: every {} minute(s), press Ctrl-C to stop",
        settings.schedule.frequency_in_minutes
    );

    let scheduler = BackupScheduler::new(
        store,
        &settings.backup.static_dir,
        settings.backup_options(),
        ScheduleTiming::from_settings(&settings),
        notifier,
    )
    .with_cancel(cancel.clone());

    let last = Arc::new(scheduler).run().await?;
    if let Some(TickOutcome::Completed(summary)) = &last {
        println!("{}", summary.render_text());
    }

    let aborted = cancel.is_cancelled() || last.as_ref().is_some_and(TickOutcome::was_aborted);
    if aborted {
        println!("User aborted...");
        Ok(Error::UserAbort.exit_code())
    } else {
        Ok(0)
    }
}
