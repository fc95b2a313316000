//! Depth-first enumeration of every project in the store.
//!
//! The walker keeps an explicit stack of folder paths instead of recursing
//! while the store cursor is open. Each folder is visited from the root under
//! a [`RootGuard`], so between any two items the cursor sits at the root,
//! including after a failed listing or a cancellation.

use crate::cancel::CancelFlag;
use crate::store::{ProjectRef, ProjectStore, RootGuard};
use crate::{Error, Result};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// A folder whose contents could not be listed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderFailure {
    pub folder_path: Vec<String>,
    pub reason: String,
}

/// Lazy depth-first walk over a project store
pub struct ProjectWalker<'a, S: ProjectStore + ?Sized> {
    store: &'a mut S,
    pending: Vec<Vec<String>>,
    ready: VecDeque<ProjectRef>,
    dead_folders: Vec<Vec<String>>,
    failed_folders: Vec<FolderFailure>,
    cancel: Option<CancelFlag>,
    finished: bool,
}

impl<'a, S: ProjectStore + ?Sized> ProjectWalker<'a, S> {
    /// Start a fresh walk from the store root
    pub fn new(store: &'a mut S) -> Self {
        Self {
            store,
            pending: vec![Vec::new()],
            ready: VecDeque::new(),
            dead_folders: Vec::new(),
            failed_folders: Vec::new(),
            cancel: None,
            finished: false,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Folders with neither projects nor subfolders seen so far
    pub fn dead_folders(&self) -> &[Vec<String>] {
        &self.dead_folders
    }

    pub fn failed_folders(&self) -> &[FolderFailure] {
        &self.failed_folders
    }

    fn cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled)
    }

    /// List one folder and queue its projects and subfolders
    fn visit(&mut self, path: &[String]) -> Result<()> {
        let mut guard = RootGuard::new(&mut *self.store)?;

        if !guard.open_path(path)? {
            warn!("Skipping folder '{}': could not open it", path.join("/"));
            self.failed_folders.push(FolderFailure {
                folder_path: path.to_vec(),
                reason: "could not open folder".to_string(),
            });
            return Ok(());
        }

        let mut projects = guard.list_projects()?;
        projects.sort();
        let folders = guard.list_folders()?;

        if projects.is_empty() && folders.is_empty() && !path.is_empty() {
            debug!("Folder '{}' is empty and could be deleted", path.join("/"));
            self.dead_folders.push(path.to_vec());
        } else {
            debug!(
                "Folder '{}': {} projects, {} subfolders",
                path.join("/"),
                projects.len(),
                folders.len()
            );
        }

        self.ready
            .extend(projects.into_iter().map(|name| ProjectRef::new(name, path.to_vec())));

        // Reverse so the first listed subfolder is popped first
        for folder in folders.into_iter().rev() {
            let mut child = path.to_vec();
            child.push(folder);
            self.pending.push(child);
        }

        Ok(())
    }

    fn abort(&mut self) -> Error {
        self.finished = true;
        if let Err(e) = self.store.goto_root() {
            warn!("Failed to return to root folder on abort: {}", e);
        }
        Error::UserAbort
    }
}

impl<S: ProjectStore + ?Sized> Iterator for ProjectWalker<'_, S> {
    type Item = Result<ProjectRef>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }
            if self.cancelled() {
                return Some(Err(self.abort()));
            }

            if let Some(project) = self.ready.pop_front() {
                return Some(Ok(project));
            }

            let Some(path) = self.pending.pop() else {
                self.finished = true;
                return None;
            };

            if let Err(e) = self.visit(&path) {
                warn!("Failed to list folder '{}': {}", path.join("/"), e);
                if e.is_fatal() {
                    self.finished = true;
                }
                self.failed_folders.push(FolderFailure {
                    folder_path: path,
                    reason: e.to_string(),
                });
                return Some(Err(e));
            }
        }
    }
}

/// Everything a completed walk found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkReport {
    pub projects: Vec<ProjectRef>,
    pub dead_folders: Vec<Vec<String>>,
    pub failed_folders: Vec<FolderFailure>,
}

/// Walk the whole store, skipping folders that fail to list.
///
/// Store unavailability and cancellation end the walk with an error.
pub fn collect_projects<S: ProjectStore + ?Sized>(
    store: &mut S,
    cancel: Option<CancelFlag>,
) -> Result<WalkReport> {
    let mut walker = ProjectWalker::new(store);
    if let Some(cancel) = cancel {
        walker = walker.with_cancel(cancel);
    }

    let mut projects = Vec::new();
    for item in walker.by_ref() {
        match item {
            Ok(project) => projects.push(project),
            Err(e) if e.is_fatal() => return Err(e),
            Err(_) => {}
        }
    }

    Ok(WalkReport {
        projects,
        dead_folders: walker.dead_folders().to_vec(),
        failed_folders: walker.failed_folders().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn names(projects: &[ProjectRef]) -> Vec<String> {
        projects.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_root_and_one_subfolder() -> Result<()> {
        let mut store = MemoryStore::new()
            .with_project(&[], "Beta", b"b")
            .with_project(&[], "Alpha", b"a")
            .with_project(&["Old"], "Gamma", b"g");

        let report = collect_projects(&mut store, None)?;
        assert_eq!(names(&report.projects), vec!["Alpha", "Beta", "Old/Gamma"]);
        assert!(store.cursor().is_empty());
        Ok(())
    }

    #[test]
    fn test_depth_first_order() -> Result<()> {
        let mut store = MemoryStore::new()
            .with_project(&["A"], "One", b"1")
            .with_project(&["A", "Deep"], "Two", b"2")
            .with_project(&["B"], "Three", b"3");

        let report = collect_projects(&mut store, None)?;
        assert_eq!(names(&report.projects), vec!["A/One", "A/Deep/Two", "B/Three"]);
        Ok(())
    }

    #[test]
    fn test_cursor_at_root_between_items() -> Result<()> {
        let mut store = MemoryStore::new()
            .with_project(&["A", "B"], "Deep", b"d")
            .with_project(&["C"], "Other", b"o");

        let mut walker = ProjectWalker::new(&mut store);
        let first = walker.next().unwrap()?;
        assert_eq!(first.folder_path, vec!["A".to_string(), "B".to_string()]);
        drop(walker);
        assert!(store.cursor().is_empty());
        Ok(())
    }

    #[test]
    fn test_dead_folders_reported() -> Result<()> {
        let mut store = MemoryStore::new()
            .with_project(&[], "Alpha", b"a")
            .with_folder(&["Empty"])
            .with_folder(&["Parent", "AlsoEmpty"]);

        let report = collect_projects(&mut store, None)?;
        assert_eq!(
            report.dead_folders,
            vec![
                vec!["Empty".to_string()],
                vec!["Parent".to_string(), "AlsoEmpty".to_string()],
            ]
        );
        Ok(())
    }

    #[test]
    fn test_failing_subtree_is_skipped_and_cursor_restored() -> Result<()> {
        let mut store = MemoryStore::new()
            .with_project(&["Broken"], "Lost", b"l")
            .with_project(&["Fine"], "Kept", b"k")
            .with_broken_folder("Broken");

        let mut walker = ProjectWalker::new(&mut store);
        assert!(matches!(walker.next(), Some(Err(Error::Store { .. }))));
        let next = walker.next().unwrap()?;
        assert_eq!(next.to_string(), "Fine/Kept");
        assert_eq!(walker.failed_folders().len(), 1);
        drop(walker);
        assert!(store.cursor().is_empty());
        Ok(())
    }

    #[test]
    fn test_unopenable_folder_is_reported() -> Result<()> {
        let mut store = MemoryStore::new()
            .with_project(&[], "Alpha", b"a")
            .with_project(&["Locked"], "Hidden", b"h")
            .with_locked_folder("Locked");

        let report = collect_projects(&mut store, None)?;
        assert_eq!(names(&report.projects), vec!["Alpha"]);
        assert_eq!(
            report.failed_folders,
            vec![FolderFailure {
                folder_path: vec!["Locked".to_string()],
                reason: "could not open folder".to_string(),
            }]
        );
        assert!(report.dead_folders.is_empty());
        assert!(store.cursor().is_empty());
        Ok(())
    }

    #[test]
    fn test_cancel_stops_walk_at_root() -> Result<()> {
        let mut store = MemoryStore::new()
            .with_project(&[], "Alpha", b"a")
            .with_project(&["Old"], "Gamma", b"g");
        let cancel = CancelFlag::new();

        let mut walker = ProjectWalker::new(&mut store).with_cancel(cancel.clone());
        assert_eq!(walker.next().unwrap()?.name, "Alpha");
        cancel.cancel();
        assert!(matches!(walker.next(), Some(Err(Error::UserAbort))));
        assert!(walker.next().is_none());
        drop(walker);
        assert!(store.cursor().is_empty());
        Ok(())
    }

    #[test]
    fn test_unavailable_store_is_fatal() {
        let mut store = MemoryStore::new().unavailable();
        let result = collect_projects(&mut store, None);
        assert!(matches!(result, Err(Error::StoreUnavailable { .. })));
    }
}
