//! Cooperative cancellation shared between the interrupt handler and the
//! traversal/export loops.

use crate::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Resolve once cancellation was requested, polling every 250ms
    pub async fn cancelled(&self) {
        while !self.is_cancelled() {
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    }

    /// `Err(UserAbort)` once cancellation was requested
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::UserAbort)
        } else {
            Ok(())
        }
    }
}

/// Trip `flag` on the first Ctrl-C; a second one exits immediately.
///
/// Must be called from within a tokio runtime.
pub fn install_ctrl_c_handler(flag: CancelFlag) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("User aborted, finishing current step...");
        flag.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(Error::UserAbort.exit_code());
        }
    });
}
