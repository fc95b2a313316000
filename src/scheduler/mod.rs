//! Periodic backup scheduler.
//!
//! Fires a backup cycle every `frequency`, optionally preceded by a countdown
//! notification. The store sits behind an async mutex that a tick only
//! *tries* to take, so a tick that lands while the previous backup is still
//! running is skipped instead of queued. Stopping the loop waits for the
//! running backup to finish its abort before returning.

use crate::backup::{BackupOptions, BackupOrchestrator, BatchSummary};
use crate::cancel::CancelFlag;
use crate::config::Settings;
use crate::notify::{self, Notifier};
use crate::store::ProjectStore;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// What happened on one scheduler tick
#[derive(Debug)]
pub enum TickOutcome {
    /// A backup was still running
    Skipped,
    /// Cancelled before the backup started
    Cancelled,
    Completed(BatchSummary),
    Failed(String),
}

impl TickOutcome {
    /// True if the user stopped this tick or the backup it ran
    pub fn was_aborted(&self) -> bool {
        match self {
            TickOutcome::Cancelled => true,
            TickOutcome::Completed(summary) => summary.aborted,
            _ => false,
        }
    }
}

/// Countdown warning text, whole seconds rounded up
fn countdown_message(countdown: Duration) -> String {
    let secs = countdown.as_secs() + u64::from(countdown.subsec_nanos() > 0);
    let unit = if secs == 1 { "second" } else { "seconds" };
    format!("Scheduled backup in {} {}", secs, unit)
}

/// Timing of the scheduler loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleTiming {
    pub frequency: Duration,
    pub countdown: Duration,
}

impl ScheduleTiming {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            frequency: Duration::from_secs(settings.schedule.frequency_in_minutes * 60),
            countdown: Duration::from_secs(settings.schedule.countdown_warning),
        }
    }
}

/// Runs backup cycles on a fixed cadence
pub struct BackupScheduler<S: ProjectStore + Send + 'static> {
    store: Arc<Mutex<S>>,
    static_dir: PathBuf,
    options: BackupOptions,
    timing: ScheduleTiming,
    notifier: Arc<dyn Notifier>,
    cancel: CancelFlag,
}

impl<S: ProjectStore + Send + 'static> BackupScheduler<S> {
    pub fn new(
        store: S,
        static_dir: &Path,
        options: BackupOptions,
        timing: ScheduleTiming,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            static_dir: static_dir.to_path_buf(),
            options,
            timing,
            notifier,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run one scheduled backup if no other backup holds the store
    pub async fn tick(&self) -> TickOutcome {
        let Ok(store) = self.store.clone().try_lock_owned() else {
            warn!("Previous backup still running, skipping this one");
            return TickOutcome::Skipped;
        };

        if self.cancel.is_cancelled() {
            return TickOutcome::Cancelled;
        }

        if !self.timing.countdown.is_zero() {
            notify::send(
                self.notifier.as_ref(),
                &countdown_message(self.timing.countdown),
            );
            tokio::select! {
                _ = tokio::time::sleep(self.timing.countdown) => {}
                _ = self.cancel.cancelled() => {
                    info!("Scheduled backup cancelled during countdown");
                    return TickOutcome::Cancelled;
                }
            }
        }

        notify::send(self.notifier.as_ref(), "Backing up! Take a brain-break.");

        let mut orchestrator = BackupOrchestrator::new(&self.static_dir, self.options.clone())
            .with_cancel(self.cancel.clone());
        let result = tokio::task::spawn_blocking(move || {
            let mut store = store;
            orchestrator.backup(&mut *store)
        })
        .await;

        let outcome = match result {
            Ok(Ok(summary)) => TickOutcome::Completed(summary),
            Ok(Err(e)) => TickOutcome::Failed(e.to_string()),
            Err(e) => TickOutcome::Failed(format!("backup task panicked: {}", e)),
        };

        match &outcome {
            TickOutcome::Completed(summary) if summary.is_success() => {
                info!("{}", summary.render_text());
                notify::send(self.notifier.as_ref(), "Successfully backed up");
            }
            TickOutcome::Completed(summary) => {
                warn!("{}", summary.render_text());
                notify::send(
                    self.notifier.as_ref(),
                    &format!(
                        "Backup finished with {} failed project(s). Check the log and retry with 'rex backup'",
                        summary.failed()
                    ),
                );
            }
            TickOutcome::Failed(reason) => {
                error!("Scheduled backup failed: {}", reason);
                notify::send(
                    self.notifier.as_ref(),
                    "Uh-oh! Something went wrong.\n\
                     Please check your project exists, is open, output path exists\n\
                     and try again manually with 'rex backup'",
                );
            }
            TickOutcome::Skipped | TickOutcome::Cancelled => {}
        }

        outcome
    }

    /// Wait for a spawned tick; `None` if it did not run a backup
    async fn join_tick(handle: JoinHandle<TickOutcome>) -> Option<TickOutcome> {
        match handle.await {
            Ok(TickOutcome::Skipped) => None,
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!("Scheduled backup task failed: {}", e);
                Some(TickOutcome::Failed(e.to_string()))
            }
        }
    }

    /// Tick every `frequency` until cancelled. The first backup happens one
    /// full period after start.
    ///
    /// On cancellation the running tick, if any, is awaited so the store is
    /// released and its summary is known before this returns. Returns the
    /// outcome of the last tick that ran a backup.
    pub async fn run(self: Arc<Self>) -> Result<Option<TickOutcome>> {
        if self.timing.frequency.is_zero() {
            return Err(Error::Configuration {
                reason: "schedule frequency must be non-zero".to_string(),
            });
        }

        info!(
            "Scheduler started, backing up every {} minute(s)",
            self.timing.frequency.as_secs() / 60
        );

        let mut interval = tokio::time::interval(self.timing.frequency);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval.tick().await;

        let mut in_flight: Option<JoinHandle<TickOutcome>> = None;
        let mut last = None;

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = self.cancel.cancelled() => break,
            }

            if let Some(handle) = in_flight.take() {
                if !handle.is_finished() {
                    warn!("Previous backup still running, skipping this one");
                    in_flight = Some(handle);
                    continue;
                }
                if let Some(outcome) = Self::join_tick(handle).await {
                    last = Some(outcome);
                }
            }

            let scheduler = Arc::clone(&self);
            in_flight = Some(tokio::spawn(async move { scheduler.tick().await }));
        }

        if let Some(handle) = in_flight.take() {
            info!("Waiting for the running backup to stop");
            if let Some(outcome) = Self::join_tick(handle).await {
                last = Some(outcome);
            }
        }

        info!("Scheduler stopped");
        Ok(last)
    }
}
