//! Summary of a backup cycle, printable as text or JSON.

use super::{OutcomeStatus, ProjectOutcome};
use crate::Result;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Per-project outcomes of one backup cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
    pub database: Option<String>,
    pub dry_run: bool,
    pub aborted: bool,
    pub outcomes: Vec<ProjectOutcome>,
    /// Folders without projects or subfolders; never deleted automatically
    pub dead_folders: Vec<Vec<String>>,
    /// Folders whose contents could not be listed
    pub unlisted_folders: Vec<String>,
}

impl BatchSummary {
    pub fn new(dry_run: bool) -> Self {
        Self {
            started_at: Local::now(),
            finished_at: None,
            database: None,
            dry_run,
            aborted: false,
            outcomes: Vec::new(),
            dead_folders: Vec::new(),
            unlisted_folders: Vec::new(),
        }
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Local::now());
        self
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn duplicates(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_duplicate()).count()
    }

    pub fn is_success(&self) -> bool {
        !self.aborted && self.failed() == 0
    }

    /// 0 on success, 2 when any project failed, 130 when aborted
    pub fn exit_code(&self) -> i32 {
        if self.aborted {
            130
        } else if self.failed() > 0 {
            2
        } else {
            0
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human readable report, one line per project
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        if let Some(db) = &self.database {
            let _ = writeln!(out, "Database: {}", db);
        }

        for outcome in &self.outcomes {
            let label = match outcome.status {
                OutcomeStatus::Exported => "ok",
                OutcomeStatus::Unverified => "unverified",
                OutcomeStatus::Redundant => "removed",
                OutcomeStatus::Planned => "dry-run",
                OutcomeStatus::Failed => "FAILED",
            };
            let _ = write!(out, "  [{}] {}", label, outcome.project);

            if let Some(artifact) = &outcome.artifact {
                let _ = write!(out, " -> {}", artifact.display());
            }
            if let Some(matched) = outcome
                .verdict
                .as_ref()
                .and_then(|v| v.matched_artifact.as_ref())
            {
                let _ = write!(out, " (duplicate of {})", matched.display());
            }
            if let Some(error) = &outcome.error {
                let _ = write!(out, ": {}", error);
            }
            out.push('\n');
        }

        for folder in &self.dead_folders {
            let _ = writeln!(out, "  Empty folder, consider deleting: {}", folder.join("/"));
        }
        for folder in &self.unlisted_folders {
            let _ = writeln!(out, "  Skipped folder {}", folder);
        }

        let _ = write!(
            out,
            "Total projects: {}, succeeded: {}, failed: {}, duplicates: {}",
            self.outcomes.len(),
            self.succeeded(),
            self.failed(),
            self.duplicates()
        );
        if self.aborted {
            out.push_str(" (aborted by user)");
        }
        out
    }
}
