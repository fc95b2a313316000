//! Fire-and-forget user notifications.

use crate::Result;
use std::io;
use std::process::{Command, Stdio};
use tracing::{info, warn};

/// Default notification title
pub const TITLE: &str = "Rex Scheduler";

pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str) -> Result<()>;
}

/// Send a notification; failures are logged and otherwise ignored
pub fn send(notifier: &dyn Notifier, message: &str) {
    if let Err(e) = notifier.notify(TITLE, message) {
        warn!("Couldn't send notification: {}", e);
    }
}

/// Writes notifications to the log only
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, message: &str) -> Result<()> {
        info!("{}: {}", title, message);
        Ok(())
    }
}

/// Desktop notifications through `notify-send`
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    program: String,
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self {
            program: "notify-send".to_string(),
        }
    }
}

impl DesktopNotifier {
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, message: &str) -> Result<()> {
        info!("{}: {}", title, message);

        let status = Command::new(&self.program)
            .arg(title)
            .arg(message)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;

        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!("{} exited with {}", self.program, status)).into())
        }
    }
}
