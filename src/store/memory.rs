//! In-memory project store.
//!
//! Holds a folder tree of named projects with their exported bytes. Useful
//! for dry runs against a known layout and for exercising the walker and
//! orchestrator without a real store attached.

use super::{ProjectRef, ProjectStore, DB_NAME_KEY};
use crate::{Error, Result};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

#[derive(Debug, Clone, Default)]
struct Folder {
    projects: BTreeMap<String, Vec<u8>>,
    folders: BTreeMap<String, Folder>,
}

/// Project store backed by an in-memory folder tree
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    root: Folder,
    cursor: Vec<String>,
    database: BTreeMap<String, String>,
    active: Option<ProjectRef>,
    failing_exports: HashSet<String>,
    broken_folders: HashSet<String>,
    locked_folders: HashSet<String>,
    unavailable: bool,
    exported: Vec<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty folder at `path`
    pub fn with_folder(mut self, path: &[&str]) -> Self {
        self.folder_mut(path);
        self
    }

    /// Add a project whose export produces `content`
    pub fn with_project(mut self, path: &[&str], name: &str, content: &[u8]) -> Self {
        self.put_project(path, name, content);
        self
    }

    pub fn with_database(mut self, name: &str) -> Self {
        self.database.insert(DB_NAME_KEY.to_string(), name.to_string());
        self.database.insert("DbType".to_string(), "Memory".to_string());
        self
    }

    pub fn with_active(mut self, project: ProjectRef) -> Self {
        self.active = Some(project);
        self
    }

    /// Make every export of `name` report failure
    pub fn with_failing_export(mut self, name: &str) -> Self {
        self.failing_exports.insert(name.to_string());
        self
    }

    /// Make listing the contents of folder `name` return an error
    pub fn with_broken_folder(mut self, name: &str) -> Self {
        self.broken_folders.insert(name.to_string());
        self
    }

    /// Make opening folder `name` report failure
    pub fn with_locked_folder(mut self, name: &str) -> Self {
        self.locked_folders.insert(name.to_string());
        self
    }

    /// Simulate a store that cannot be reached
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Replace or add a project's exported content
    pub fn put_project(&mut self, path: &[&str], name: &str, content: &[u8]) {
        self.folder_mut(path)
            .projects
            .insert(name.to_string(), content.to_vec());
    }

    /// Current folder path from the root; empty at the root
    pub fn cursor(&self) -> &[String] {
        &self.cursor
    }

    /// Names of projects exported so far, in call order
    pub fn exported(&self) -> &[String] {
        &self.exported
    }

    fn folder_mut(&mut self, path: &[&str]) -> &mut Folder {
        let mut folder = &mut self.root;
        for name in path {
            folder = folder.folders.entry(name.to_string()).or_default();
        }
        folder
    }

    fn current(&self) -> Result<&Folder> {
        if self.unavailable {
            return Err(Error::StoreUnavailable {
                reason: "in-memory store marked unavailable".to_string(),
            });
        }

        if let Some(name) = self.cursor.last() {
            if self.broken_folders.contains(name) {
                return Err(Error::Store {
                    reason: format!("cannot list folder '{}'", name),
                });
            }
        }

        let mut folder = &self.root;
        for name in &self.cursor {
            folder = folder.folders.get(name).ok_or_else(|| Error::Store {
                reason: format!("cursor points at missing folder '{}'", name),
            })?;
        }
        Ok(folder)
    }
}

impl ProjectStore for MemoryStore {
    fn list_folders(&self) -> Result<Vec<String>> {
        Ok(self.current()?.folders.keys().cloned().collect())
    }

    fn list_projects(&self) -> Result<Vec<String>> {
        Ok(self.current()?.projects.keys().cloned().collect())
    }

    fn open_folder(&mut self, name: &str) -> Result<bool> {
        let exists = self.current()?.folders.contains_key(name);
        if exists && self.locked_folders.contains(name) {
            return Ok(false);
        }
        if exists {
            self.cursor.push(name.to_string());
        }
        Ok(exists)
    }

    fn goto_parent(&mut self) -> Result<()> {
        self.cursor.pop();
        Ok(())
    }

    fn goto_root(&mut self) -> Result<()> {
        self.cursor.clear();
        Ok(())
    }

    fn export_project(
        &mut self,
        name: &str,
        output_path: &Path,
        _include_stills_and_luts: bool,
    ) -> Result<bool> {
        if self.failing_exports.contains(name) {
            return Ok(false);
        }

        let Some(content) = self.current()?.projects.get(name).cloned() else {
            return Ok(false);
        };

        std::fs::write(output_path, content)?;
        self.exported.push(name.to_string());
        Ok(true)
    }

    fn current_database_info(&self) -> Result<BTreeMap<String, String>> {
        if self.unavailable {
            return Err(Error::StoreUnavailable {
                reason: "in-memory store marked unavailable".to_string(),
            });
        }
        Ok(self.database.clone())
    }

    fn current_project(&self) -> Result<Option<ProjectRef>> {
        Ok(self.active.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_navigation() -> Result<()> {
        let mut store = MemoryStore::new()
            .with_project(&[], "Alpha", b"a")
            .with_project(&["Old"], "Gamma", b"g");

        assert_eq!(store.list_folders()?, vec!["Old".to_string()]);
        assert!(!store.open_folder("Missing")?);
        assert!(store.open_folder("Old")?);
        assert_eq!(store.list_projects()?, vec!["Gamma".to_string()]);
        store.goto_parent()?;
        assert!(store.cursor().is_empty());
        Ok(())
    }

    #[test]
    fn test_export_only_from_current_folder() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let out = temp_dir.path().join("out.drp");
        let mut store = MemoryStore::new().with_project(&["Old"], "Gamma", b"gamma");

        assert!(!store.export_project("Gamma", &out, true)?);
        assert!(store.open_folder("Old")?);
        assert!(store.export_project("Gamma", &out, true)?);
        assert_eq!(std::fs::read(&out)?, b"gamma");
        assert_eq!(store.exported(), ["Gamma".to_string()]);
        Ok(())
    }

    #[test]
    fn test_unavailable_store() {
        let store = MemoryStore::new().unavailable();
        assert!(matches!(store.list_projects(), Err(Error::StoreUnavailable { .. })));
    }
}
