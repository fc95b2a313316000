//! Backup orchestration.
//!
//! One cycle selects the target projects (the active one, or every project
//! found by a full walk), exports each through the store, writes a checksum
//! sidecar and runs the de-duplication policy against the project's series.
//! Everything runs sequentially on the caller's thread: the store cursor is
//! shared mutable state.

pub mod naming;
pub mod report;

use crate::cancel::CancelFlag;
use crate::checksum::ChecksumRecord;
use crate::dedupe::{DeduplicationPolicy, DeduplicationVerdict};
use crate::fsutil;
use crate::series::BackupSeries;
use crate::store::{self, ProjectRef, ProjectStore, RootGuard};
use crate::walker;
use crate::{Error, Result};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn};

pub use naming::BackupArtifact;
pub use report::BatchSummary;

/// Source of backup timestamps
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

fn system_clock() -> Clock {
    Arc::new(|| Local::now().naive_local())
}

/// Configuration for backup operations
#[derive(Debug, Clone)]
pub struct BackupOptions {
    /// Write a `.md5` sidecar next to each artifact
    pub generate_checksum: bool,
    /// Compare each new artifact with its recent series
    pub de_duplicate: bool,
    /// Delete a new artifact that turns out to be redundant
    pub remove_redundant: bool,
    /// Only back up the project currently open in the store
    pub active_only: bool,
    /// Discover and report targets without exporting anything
    pub dry_run: bool,
    pub policy: DeduplicationPolicy,
}

impl Default for BackupOptions {
    fn default() -> Self {
        Self {
            generate_checksum: true,
            de_duplicate: true,
            remove_redundant: false,
            active_only: false,
            dry_run: false,
            policy: DeduplicationPolicy::default(),
        }
    }
}

/// Where a backup run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Idle,
    Discovering,
    Exporting,
    Checksumming,
    Deduplicating,
    Done,
    Failed,
}

/// How a single project's backup ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeStatus {
    /// Exported, and checksummed when requested
    Exported,
    /// Exported but the checksum sidecar could not be written
    Unverified,
    /// Exported, found redundant and removed again
    Redundant,
    /// Dry run: would have been exported
    Planned,
    Failed,
}

/// Result of backing up one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectOutcome {
    pub project: ProjectRef,
    pub status: OutcomeStatus,
    pub artifact: Option<PathBuf>,
    pub checksum: Option<PathBuf>,
    pub verdict: Option<DeduplicationVerdict>,
    pub error: Option<String>,
}

impl ProjectOutcome {
    fn new(project: &ProjectRef, status: OutcomeStatus) -> Self {
        Self {
            project: project.clone(),
            status,
            artifact: None,
            checksum: None,
            verdict: None,
            error: None,
        }
    }

    pub fn failed(project: &ProjectRef, error: &Error) -> Self {
        let mut outcome = Self::new(project, OutcomeStatus::Failed);
        outcome.error = Some(error.to_string());
        outcome
    }

    pub fn success(&self) -> bool {
        self.status != OutcomeStatus::Failed
    }

    pub fn is_duplicate(&self) -> bool {
        self.verdict.as_ref().is_some_and(|v| v.is_duplicate)
    }
}

/// Drives backup cycles against a project store
pub struct BackupOrchestrator {
    static_dir: PathBuf,
    options: BackupOptions,
    cancel: CancelFlag,
    clock: Clock,
    state: RunState,
    database_name: Option<Option<String>>,
}

impl BackupOrchestrator {
    pub fn new<P: AsRef<Path>>(static_dir: P, options: BackupOptions) -> Self {
        Self {
            static_dir: static_dir.as_ref().to_path_buf(),
            options,
            cancel: CancelFlag::new(),
            clock: system_clock(),
            state: RunState::Idle,
            database_name: None,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn options(&self) -> &BackupOptions {
        &self.options
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, state: RunState) {
        debug!("Backup state {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    fn database_name<S: ProjectStore + ?Sized>(&mut self, store: &S) -> Result<Option<String>> {
        if let Some(name) = &self.database_name {
            return Ok(name.clone());
        }
        let name = store::database_name(store)?;
        self.database_name = Some(name.clone());
        Ok(name)
    }

    /// Run one full backup cycle and summarise every project's outcome.
    ///
    /// Only store unavailability is returned as an error; cancellation ends
    /// the cycle early with `aborted` set on the summary.
    pub fn backup<S: ProjectStore + ?Sized>(&mut self, store: &mut S) -> Result<BatchSummary> {
        let span = info_span!("backup", dry_run = self.options.dry_run);
        let _enter = span.enter();

        self.database_name = None;
        self.transition(RunState::Discovering);

        let info = match store.current_database_info() {
            Ok(info) => info,
            Err(e) => {
                self.transition(RunState::Failed);
                return Err(e);
            }
        };
        info!("DB: {}", store::database_banner(&info));

        let mut summary = BatchSummary::new(self.options.dry_run);
        summary.database = self.database_name(&*store)?;

        let targets = if self.options.active_only {
            match store.current_project()? {
                Some(project) => vec![project],
                None => {
                    self.transition(RunState::Failed);
                    return Err(Error::ExportFailure {
                        project: "<active project>".to_string(),
                        reason: "no project is currently open".to_string(),
                    });
                }
            }
        } else {
            match walker::collect_projects(store, Some(self.cancel.clone())) {
                Ok(walk) => {
                    summary.dead_folders = walk.dead_folders;
                    summary.unlisted_folders = walk
                        .failed_folders
                        .into_iter()
                        .map(|f| format!("{}: {}", f.folder_path.join("/"), f.reason))
                        .collect();
                    walk.projects
                }
                Err(Error::UserAbort) => {
                    summary.aborted = true;
                    self.transition(RunState::Failed);
                    return Ok(summary.finish());
                }
                Err(e) => {
                    self.transition(RunState::Failed);
                    return Err(e);
                }
            }
        };

        info!("Total projects: {}", targets.len());

        for project in &targets {
            if self.cancel.is_cancelled() {
                summary.aborted = true;
                break;
            }

            let result = if self.options.dry_run {
                self.plan(&*store, project)
            } else {
                self.run(store, project)
            };

            match result {
                Ok(outcome) => summary.outcomes.push(outcome),
                Err(Error::UserAbort) => {
                    summary.aborted = true;
                    break;
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!("Backup of '{}' failed: {}", project, e);
                    summary.outcomes.push(ProjectOutcome::failed(project, &e));
                }
            }
        }

        self.transition(if summary.aborted {
            RunState::Failed
        } else {
            RunState::Done
        });
        Ok(summary.finish())
    }

    /// Report the artifact a project would be exported to, touching nothing
    pub fn plan<S: ProjectStore + ?Sized>(
        &mut self,
        store: &S,
        project: &ProjectRef,
    ) -> Result<ProjectOutcome> {
        let database = self.database_name(&*store)?;
        let artifact = BackupArtifact::plan(
            &self.static_dir,
            &project.name,
            database.as_deref(),
            (self.clock)(),
        );

        info!(
            "Dry-run export: '{}', Output Path: {}",
            project,
            artifact.path.display()
        );

        let mut outcome = ProjectOutcome::new(project, OutcomeStatus::Planned);
        outcome.artifact = Some(artifact.path);
        Ok(outcome)
    }

    /// Back up a single project.
    ///
    /// Export failures and naming conflicts are errors; a failed checksum or
    /// de-duplication only downgrades the outcome.
    pub fn run<S: ProjectStore + ?Sized>(
        &mut self,
        store: &mut S,
        project: &ProjectRef,
    ) -> Result<ProjectOutcome> {
        let span = info_span!("backup_project", project = %project);
        let _enter = span.enter();

        let result = self.run_inner(store, project);
        if result.is_err() {
            self.transition(RunState::Failed);
        }
        result
    }

    fn run_inner<S: ProjectStore + ?Sized>(
        &mut self,
        store: &mut S,
        project: &ProjectRef,
    ) -> Result<ProjectOutcome> {
        let database = self.database_name(&*store)?;
        let artifact = BackupArtifact::plan(
            &self.static_dir,
            &project.name,
            database.as_deref(),
            (self.clock)(),
        );
        info!("Backup path: '{}'", artifact.path.display());

        if artifact.path.exists() {
            return Err(Error::NamingConflict {
                path: artifact.path,
            });
        }

        let series = if self.options.de_duplicate {
            debug!("Gathering existing backups");
            BackupSeries::gather(&self.static_dir, &project.name)?
        } else {
            BackupSeries::default()
        };

        self.cancel.check()?;

        self.transition(RunState::Exporting);
        self.export(store, project, &artifact.path)?;

        let mut outcome = ProjectOutcome::new(project, OutcomeStatus::Exported);
        outcome.artifact = Some(artifact.path.clone());

        if self.options.generate_checksum {
            self.transition(RunState::Checksumming);
            match ChecksumRecord::generate(&artifact.path) {
                Ok(record) => outcome.checksum = Some(record.path),
                Err(e) => {
                    warn!("Backup of '{}' is unverified: {}", project, e);
                    outcome.status = OutcomeStatus::Unverified;
                    outcome.error = Some(e.to_string());
                }
            }
        }

        if self.options.de_duplicate {
            self.transition(RunState::Deduplicating);
            let candidates = series.with_member(&artifact.path);
            match self.options.policy.is_redundant(&artifact.path, &candidates.members) {
                Ok(verdict) => self.apply_verdict(&mut outcome, verdict),
                Err(e) => warn!("De-duplication of '{}' skipped: {}", project, e),
            }
        }

        self.transition(RunState::Done);
        info!("Backed up '{}' ({:?})", project, outcome.status);
        Ok(outcome)
    }

    /// Export into a temporary sibling, then move it into place without
    /// replacing anything already there.
    fn export<S: ProjectStore + ?Sized>(
        &self,
        store: &mut S,
        project: &ProjectRef,
        destination: &Path,
    ) -> Result<()> {
        let export_failure = |reason: String| Error::ExportFailure {
            project: project.to_string(),
            reason,
        };

        let tmp = fsutil::temp_sibling(destination);
        let exported = {
            let mut guard = RootGuard::new(store)?;
            if !guard.open_path(&project.folder_path)? {
                return Err(export_failure(format!(
                    "folder '{}' not found",
                    project.folder_path.join("/")
                )));
            }
            guard.export_project(&project.name, &tmp, true)
        };

        let exported = match exported {
            Ok(true) if tmp.is_file() => Ok(()),
            Ok(true) => Err(export_failure("store reported success but wrote no file".to_string())),
            Ok(false) => Err(export_failure("store reported failure".to_string())),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => Err(export_failure(e.to_string())),
        };
        if let Err(e) = exported {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }

        fsutil::persist_no_clobber(&tmp, destination).map_err(|e| {
            if e.kind() == io::ErrorKind::AlreadyExists {
                Error::NamingConflict {
                    path: destination.to_path_buf(),
                }
            } else {
                export_failure(format!("could not move export into place: {}", e))
            }
        })
    }

    /// Attach `verdict` and, when configured, drop a redundant artifact.
    ///
    /// A failed removal leaves the outcome as it was.
    fn apply_verdict(&self, outcome: &mut ProjectOutcome, verdict: DeduplicationVerdict) {
        if verdict.is_duplicate && self.options.remove_redundant {
            if let Some(artifact) = outcome.artifact.clone() {
                match self.remove_redundant(&artifact, outcome.checksum.as_deref()) {
                    Ok(()) => {
                        outcome.checksum = None;
                        outcome.status = OutcomeStatus::Redundant;
                    }
                    Err(e) => warn!(
                        "Could not remove redundant backup {}: {}",
                        artifact.display(),
                        e
                    ),
                }
            }
        }
        outcome.verdict = Some(verdict);
    }

    fn remove_redundant(&self, artifact: &Path, checksum: Option<&Path>) -> Result<()> {
        info!("Removing redundant backup {}", artifact.display());
        fs::remove_file(artifact)?;
        if let Some(checksum) = checksum {
            fs::remove_file(checksum)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{Duration, NaiveDate};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicI64, Ordering};
    use tempfile::TempDir;

    fn fixed_clock() -> Clock {
        Arc::new(|| {
            NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_hms_opt(10, 15, 0)
                .unwrap()
        })
    }

    /// Advances one second per call
    fn ticking_clock() -> Clock {
        let ticks = Arc::new(AtomicI64::new(0));
        Arc::new(move || {
            let n = ticks.fetch_add(1, Ordering::SeqCst);
            NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap()
                + Duration::seconds(n)
        })
    }

    fn scenario_store() -> MemoryStore {
        MemoryStore::new()
            .with_database("Local")
            .with_project(&[], "Alpha", b"alpha project")
            .with_project(&[], "Beta", b"beta project")
            .with_project(&["Old"], "Gamma", b"gamma project")
    }

    fn file_count(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_single_project_run() -> Result<()> {
        let out = TempDir::new()?;
        let mut store = scenario_store();
        let mut orchestrator =
            BackupOrchestrator::new(out.path(), BackupOptions::default()).with_clock(fixed_clock());

        let outcome = orchestrator.run(&mut store, &ProjectRef::new("Gamma", vec!["Old".into()]))?;

        let expected = out.path().join("Local_Gamma_101500.drp");
        assert_eq!(outcome.status, OutcomeStatus::Exported);
        assert_eq!(outcome.artifact.as_ref(), Some(&expected));
        assert_eq!(fs::read(&expected)?, b"gamma project");
        assert_eq!(
            outcome.checksum,
            Some(out.path().join("Local_Gamma_101500.drp.md5"))
        );
        assert_eq!(outcome.verdict, Some(DeduplicationVerdict::unique()));
        assert_eq!(orchestrator.state(), RunState::Done);
        assert!(store.cursor().is_empty());
        Ok(())
    }

    #[test]
    fn test_same_second_is_naming_conflict() -> Result<()> {
        let out = TempDir::new()?;
        let mut store = scenario_store();
        let mut orchestrator =
            BackupOrchestrator::new(out.path(), BackupOptions::default()).with_clock(fixed_clock());
        let alpha = ProjectRef::at_root("Alpha");

        orchestrator.run(&mut store, &alpha)?;
        let before = fs::read(out.path().join("Local_Alpha_101500.drp"))?;

        store.put_project(&[], "Alpha", b"changed alpha");
        let second = orchestrator.run(&mut store, &alpha);
        assert!(matches!(second, Err(Error::NamingConflict { .. })));
        assert_eq!(orchestrator.state(), RunState::Failed);
        assert_eq!(fs::read(out.path().join("Local_Alpha_101500.drp"))?, before);
        Ok(())
    }

    #[test]
    fn test_export_failure_writes_nothing() -> Result<()> {
        let out = TempDir::new()?;
        let mut store = scenario_store().with_failing_export("Alpha");
        let mut orchestrator = BackupOrchestrator::new(out.path(), BackupOptions::default());

        let result = orchestrator.run(&mut store, &ProjectRef::at_root("Alpha"));
        assert!(matches!(result, Err(Error::ExportFailure { .. })));
        assert_eq!(file_count(out.path()), 0);
        assert!(store.cursor().is_empty());
        Ok(())
    }

    #[test]
    fn test_repeat_backup_is_flagged_duplicate() -> Result<()> {
        let out = TempDir::new()?;
        let mut store = scenario_store();
        let mut orchestrator = BackupOrchestrator::new(out.path(), BackupOptions::default())
            .with_clock(ticking_clock());
        let alpha = ProjectRef::at_root("Alpha");

        let first = orchestrator.run(&mut store, &alpha)?;
        let second = orchestrator.run(&mut store, &alpha)?;

        assert!(!first.is_duplicate());
        assert!(second.is_duplicate());
        assert_eq!(
            second.verdict.unwrap().matched_artifact,
            first.artifact.clone()
        );
        // Report only: both backups stay on disk
        assert!(second.artifact.unwrap().exists());
        assert!(first.artifact.unwrap().exists());
        Ok(())
    }

    #[test]
    fn test_remove_redundant_option() -> Result<()> {
        let out = TempDir::new()?;
        let mut store = scenario_store();
        let options = BackupOptions {
            remove_redundant: true,
            ..BackupOptions::default()
        };
        let mut orchestrator =
            BackupOrchestrator::new(out.path(), options).with_clock(ticking_clock());
        let alpha = ProjectRef::at_root("Alpha");

        orchestrator.run(&mut store, &alpha)?;
        let second = orchestrator.run(&mut store, &alpha)?;

        assert_eq!(second.status, OutcomeStatus::Redundant);
        assert!(!second.artifact.unwrap().exists());
        // One artifact plus its sidecar
        assert_eq!(file_count(out.path()), 2);
        Ok(())
    }

    #[test]
    fn test_batch_continues_after_failure() -> Result<()> {
        let out = TempDir::new()?;
        let mut store = scenario_store().with_failing_export("Alpha");
        let mut orchestrator = BackupOrchestrator::new(out.path(), BackupOptions::default())
            .with_clock(ticking_clock());

        let summary = orchestrator.backup(&mut store)?;

        let statuses: Vec<(String, OutcomeStatus)> = summary
            .outcomes
            .iter()
            .map(|o| (o.project.to_string(), o.status))
            .collect();
        assert_eq!(
            statuses,
            vec![
                ("Alpha".to_string(), OutcomeStatus::Failed),
                ("Beta".to_string(), OutcomeStatus::Exported),
                ("Old/Gamma".to_string(), OutcomeStatus::Exported),
            ]
        );
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.succeeded(), 2);
        assert!(!summary.aborted);
        assert!(store.cursor().is_empty());
        Ok(())
    }

    #[test]
    fn test_unopenable_folder_listed_in_summary() -> Result<()> {
        let out = TempDir::new()?;
        let mut store = scenario_store().with_locked_folder("Old");
        let options = BackupOptions {
            dry_run: true,
            ..BackupOptions::default()
        };

        let summary = BackupOrchestrator::new(out.path(), options).backup(&mut store)?;
        assert_eq!(summary.outcomes.len(), 2);
        assert_eq!(summary.unlisted_folders, vec!["Old: could not open folder".to_string()]);
        Ok(())
    }

    #[test]
    fn test_dry_run_writes_nothing() -> Result<()> {
        let out = TempDir::new()?;
        let mut store = scenario_store();
        let options = BackupOptions {
            dry_run: true,
            ..BackupOptions::default()
        };
        let mut orchestrator = BackupOrchestrator::new(out.path(), options).with_clock(fixed_clock());

        let summary = orchestrator.backup(&mut store)?;

        assert_eq!(summary.outcomes.len(), 3);
        assert!(summary
            .outcomes
            .iter()
            .all(|o| o.status == OutcomeStatus::Planned && o.artifact.is_some()));
        assert_eq!(file_count(out.path()), 0);
        assert!(store.exported().is_empty());
        assert!(store.cursor().is_empty());
        Ok(())
    }

    #[test]
    fn test_active_only_backs_up_open_project() -> Result<()> {
        let out = TempDir::new()?;
        let mut store =
            scenario_store().with_active(ProjectRef::new("Gamma", vec!["Old".to_string()]));
        let options = BackupOptions {
            active_only: true,
            ..BackupOptions::default()
        };
        let mut orchestrator = BackupOrchestrator::new(out.path(), options);

        let summary = orchestrator.backup(&mut store)?;
        assert_eq!(summary.outcomes.len(), 1);
        assert_eq!(store.exported(), ["Gamma".to_string()]);
        Ok(())
    }

    #[test]
    fn test_active_only_without_open_project_fails() -> Result<()> {
        let out = TempDir::new()?;
        let mut store = scenario_store();
        let options = BackupOptions {
            active_only: true,
            ..BackupOptions::default()
        };
        let result = BackupOrchestrator::new(out.path(), options).backup(&mut store);
        assert!(matches!(result, Err(Error::ExportFailure { .. })));
        Ok(())
    }

    #[test]
    fn test_cancelled_batch_reports_abort() -> Result<()> {
        let out = TempDir::new()?;
        let mut store = scenario_store();
        let cancel = CancelFlag::new();
        cancel.cancel();
        let mut orchestrator =
            BackupOrchestrator::new(out.path(), BackupOptions::default()).with_cancel(cancel);

        let summary = orchestrator.backup(&mut store)?;
        assert!(summary.aborted);
        assert!(summary.outcomes.is_empty());
        assert_eq!(file_count(out.path()), 0);
        assert!(store.cursor().is_empty());
        Ok(())
    }

    #[test]
    fn test_sidecar_failure_leaves_export_unverified() -> Result<()> {
        let out = TempDir::new()?;
        let mut store = MemoryStore::new()
            .with_database("Local")
            .with_project(&[], "Alpha", b"alpha project");
        fs::create_dir(out.path().join("Local_Alpha_101500.drp.md5"))?;
        let mut orchestrator =
            BackupOrchestrator::new(out.path(), BackupOptions::default()).with_clock(fixed_clock());

        let summary = orchestrator.backup(&mut store)?;

        let outcome = &summary.outcomes[0];
        assert_eq!(outcome.status, OutcomeStatus::Unverified);
        assert_eq!(outcome.checksum, None);
        assert!(outcome.error.as_deref().unwrap().contains("Checksum IO failure"));
        assert_eq!(fs::read(outcome.artifact.as_ref().unwrap())?, b"alpha project");
        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.exit_code(), 0);
        Ok(())
    }

    #[test]
    fn test_failed_removal_keeps_exported_outcome() {
        let out = TempDir::new().unwrap();
        let options = BackupOptions {
            remove_redundant: true,
            ..BackupOptions::default()
        };
        let orchestrator = BackupOrchestrator::new(out.path(), options);

        let missing = out.path().join("Alpha_101500.drp");
        let matched = out.path().join("Alpha_100000.drp");
        let mut outcome = ProjectOutcome::new(&ProjectRef::at_root("Alpha"), OutcomeStatus::Exported);
        outcome.artifact = Some(missing);
        let verdict = DeduplicationVerdict {
            is_duplicate: true,
            matched_artifact: Some(matched.clone()),
            ratio: Some(1.0),
        };

        orchestrator.apply_verdict(&mut outcome, verdict);

        assert_eq!(outcome.status, OutcomeStatus::Exported);
        assert!(outcome.is_duplicate());
        assert_eq!(outcome.verdict.unwrap().matched_artifact, Some(matched));
    }

    #[test]
    fn test_project_name_with_separator_is_deduplicated() -> Result<()> {
        let out = TempDir::new()?;
        let mut store = MemoryStore::new().with_project(&[], "Edit 1/2", b"same cut");
        let mut orchestrator = BackupOrchestrator::new(out.path(), BackupOptions::default())
            .with_clock(ticking_clock());
        let project = ProjectRef::at_root("Edit 1/2");

        let first = orchestrator.run(&mut store, &project)?;
        let second = orchestrator.run(&mut store, &project)?;

        assert_eq!(first.artifact, Some(out.path().join("Edit 1_2_100000.drp")));
        assert!(second.is_duplicate());
        assert_eq!(second.verdict.unwrap().matched_artifact, first.artifact);
        Ok(())
    }

    #[test]
    fn test_unavailable_store_is_fatal() {
        let out = TempDir::new().unwrap();
        let mut store = MemoryStore::new().unavailable();
        let result = BackupOrchestrator::new(out.path(), BackupOptions::default()).backup(&mut store);
        assert!(matches!(result, Err(Error::StoreUnavailable { .. })));
    }
}
