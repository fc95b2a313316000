//! Directory-backed project store.
//!
//! Folders are subdirectories of the store root and each `<name>.drp` file is
//! a project; exporting copies the project file to the requested path.

use super::{ProjectRef, ProjectStore, DB_NAME_KEY};
use crate::series::ARTIFACT_EXTENSION;
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Project store rooted at a directory on disk
#[derive(Debug)]
pub struct FsProjectStore {
    root: PathBuf,
    cursor: Vec<String>,
    database_name: String,
    active_project: Option<ProjectRef>,
}

impl FsProjectStore {
    /// Connect to the store at `root`
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(Error::StoreUnavailable {
                reason: format!("project library {} is not a directory", root.display()),
            });
        }

        let database_name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Local Database".to_string());

        Ok(Self {
            root,
            cursor: Vec::new(),
            database_name,
            active_project: None,
        })
    }

    pub fn with_database_name(mut self, name: impl Into<String>) -> Self {
        self.database_name = name.into();
        self
    }

    /// Mark a project as the one currently open, given as `Folder/Sub/Name`
    pub fn with_active_project(mut self, path: &str) -> Self {
        let mut parts: Vec<String> = path
            .split('/')
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        self.active_project = parts.pop().map(|name| ProjectRef::new(name, parts));
        self
    }

    fn current_dir(&self) -> PathBuf {
        self.cursor.iter().fold(self.root.clone(), |dir, f| dir.join(f))
    }

    fn entries(&self) -> Result<Vec<fs::DirEntry>> {
        let dir = self.current_dir();
        let entries = fs::read_dir(&dir).map_err(|e| Error::Store {
            reason: format!("cannot list {}: {}", dir.display(), e),
        })?;
        Ok(entries
            .filter_map(|e| e.ok())
            .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
            .collect())
    }
}

impl ProjectStore for FsProjectStore {
    fn list_folders(&self) -> Result<Vec<String>> {
        let mut folders: Vec<String> = self
            .entries()?
            .into_iter()
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        folders.sort();
        Ok(folders)
    }

    fn list_projects(&self) -> Result<Vec<String>> {
        let mut projects: Vec<String> = self
            .entries()?
            .into_iter()
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|e| {
                let path = e.path();
                if path.extension().and_then(|x| x.to_str()) != Some(ARTIFACT_EXTENSION) {
                    return None;
                }
                path.file_stem().map(|s| s.to_string_lossy().into_owned())
            })
            .collect();
        projects.sort();
        Ok(projects)
    }

    fn open_folder(&mut self, name: &str) -> Result<bool> {
        if name.contains('/') || name.contains('\\') || name == ".." {
            return Ok(false);
        }
        if self.current_dir().join(name).is_dir() {
            self.cursor.push(name.to_string());
            Ok(true)
        } else {
            Ok(false)
        }
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
        include_stills_and_luts: bool,
    ) -> Result<bool> {
        let source = self
            .current_dir()
            .join(format!("{}.{}", name, ARTIFACT_EXTENSION));
        debug!(
            "Copying {} -> {} (stills and LUTs: {})",
            source.display(),
            output_path.display(),
            include_stills_and_luts
        );

        match fs::copy(&source, output_path) {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!("Export of '{}' failed: {}", name, e);
                Ok(false)
            }
        }
    }

    fn current_database_info(&self) -> Result<BTreeMap<String, String>> {
        if !self.root.is_dir() {
            return Err(Error::StoreUnavailable {
                reason: format!("project library {} disappeared", self.root.display()),
            });
        }

        let mut info = BTreeMap::new();
        info.insert(DB_NAME_KEY.to_string(), self.database_name.clone());
        info.insert("DbType".to_string(), "Disk".to_string());
        info.insert("Path".to_string(), self.root.display().to_string());
        Ok(info)
    }

    fn current_project(&self) -> Result<Option<ProjectRef>> {
        Ok(self.active_project.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn library() -> Result<TempDir> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::write(root.join("Beta.drp"), b"beta")?;
        fs::write(root.join("Alpha.drp"), b"alpha")?;
        fs::write(root.join("notes.txt"), b"not a project")?;
        fs::create_dir_all(root.join("Old"))?;
        fs::write(root.join("Old").join("Gamma.drp"), b"gamma")?;
        fs::create_dir_all(root.join(".cache"))?;
        Ok(temp_dir)
    }

    #[test]
    fn test_missing_root_is_unavailable() {
        let result = FsProjectStore::open("/no/such/library");
        assert!(matches!(result, Err(Error::StoreUnavailable { .. })));
    }

    #[test]
    fn test_listing() -> Result<()> {
        let lib = library()?;
        let mut store = FsProjectStore::open(lib.path())?;

        assert_eq!(store.list_projects()?, vec!["Alpha".to_string(), "Beta".to_string()]);
        assert_eq!(store.list_folders()?, vec!["Old".to_string()]);

        assert!(store.open_folder("Old")?);
        assert_eq!(store.list_projects()?, vec!["Gamma".to_string()]);
        assert!(!store.open_folder("..")?);
        Ok(())
    }

    #[test]
    fn test_export_copies_project() -> Result<()> {
        let lib = library()?;
        let out_dir = TempDir::new()?;
        let mut store = FsProjectStore::open(lib.path())?;

        let out = out_dir.path().join("Alpha_101500.drp");
        assert!(store.export_project("Alpha", &out, true)?);
        assert_eq!(fs::read(&out)?, b"alpha");

        assert!(!store.export_project("Missing", &out_dir.path().join("x.drp"), true)?);
        Ok(())
    }

    #[test]
    fn test_active_project_and_database() -> Result<()> {
        let lib = library()?;
        let store = FsProjectStore::open(lib.path())?
            .with_database_name("Studio")
            .with_active_project("Old/Gamma");

        assert_eq!(
            store.current_project()?,
            Some(ProjectRef::new("Gamma", vec!["Old".to_string()]))
        );
        assert_eq!(
            store.current_database_info()?.get(DB_NAME_KEY),
            Some(&"Studio".to_string())
        );
        Ok(())
    }
}
