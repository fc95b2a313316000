//! Boundary to the external project store.
//!
//! The store exposes a single shared "current folder" cursor, so every
//! navigation goes through `&mut` and nothing here is meant to be shared
//! between threads without an outer lock.

pub mod fs;
pub mod memory;

use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::Path;
use tracing::warn;

pub use fs::FsProjectStore;
pub use memory::MemoryStore;

/// Key of the database name in [`ProjectStore::current_database_info`]
pub const DB_NAME_KEY: &str = "DbName";

/// A project and the folders leading to it from the store root
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectRef {
    pub name: String,
    pub folder_path: Vec<String>,
}

impl ProjectRef {
    pub fn new(name: impl Into<String>, folder_path: Vec<String>) -> Self {
        Self {
            name: name.into(),
            folder_path,
        }
    }

    /// A project directly in the root folder
    pub fn at_root(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for folder in &self.folder_path {
            write!(f, "{}/", folder)?;
        }
        write!(f, "{}", self.name)
    }
}

/// Navigation and export operations of a hierarchical project store
pub trait ProjectStore {
    /// Subfolders of the current folder
    fn list_folders(&self) -> Result<Vec<String>>;

    /// Projects in the current folder
    fn list_projects(&self) -> Result<Vec<String>>;

    /// Enter a subfolder of the current folder; `false` if that failed
    fn open_folder(&mut self, name: &str) -> Result<bool>;

    fn goto_parent(&mut self) -> Result<()>;

    fn goto_root(&mut self) -> Result<()>;

    /// Export a project of the current folder to `output_path`
    fn export_project(
        &mut self,
        name: &str,
        output_path: &Path,
        include_stills_and_luts: bool,
    ) -> Result<bool>;

    /// Descriptive fields of the connected database
    fn current_database_info(&self) -> Result<BTreeMap<String, String>>;

    /// The project currently open in the store, if any
    fn current_project(&self) -> Result<Option<ProjectRef>>;
}

/// One line summary of the database, `v1 - v2 - ...`
pub fn database_banner(info: &BTreeMap<String, String>) -> String {
    info.values().map(String::as_str).collect::<Vec<_>>().join(" - ")
}

/// Database name used to prefix artifact names, if the store reports one
pub fn database_name<S: ProjectStore + ?Sized>(store: &S) -> Result<Option<String>> {
    Ok(store
        .current_database_info()?
        .remove(DB_NAME_KEY)
        .filter(|name| !name.is_empty()))
}

/// Scoped cursor: starts at the root and, when dropped, walks back up every
/// folder it opened and returns to the root, whatever path the caller left by.
pub struct RootGuard<'a, S: ProjectStore + ?Sized> {
    store: &'a mut S,
    depth: usize,
}

impl<'a, S: ProjectStore + ?Sized> RootGuard<'a, S> {
    pub fn new(store: &'a mut S) -> Result<Self> {
        store.goto_root()?;
        Ok(Self { store, depth: 0 })
    }

    /// Open `path` folder by folder from the current position
    pub fn open_path(&mut self, path: &[String]) -> Result<bool> {
        for folder in path {
            if !self.store.open_folder(folder)? {
                warn!("Could not open folder '{}'", folder);
                return Ok(false);
            }
            self.depth += 1;
        }
        Ok(true)
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl<S: ProjectStore + ?Sized> Deref for RootGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.store
    }
}

impl<S: ProjectStore + ?Sized> DerefMut for RootGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.store
    }
}

impl<S: ProjectStore + ?Sized> Drop for RootGuard<'_, S> {
    fn drop(&mut self) {
        for _ in 0..self.depth {
            if let Err(e) = self.store.goto_parent() {
                warn!("Failed to leave folder: {}", e);
                break;
            }
        }
        if let Err(e) = self.store.goto_root() {
            warn!("Failed to return to root folder: {}", e);
        }
    }
}
