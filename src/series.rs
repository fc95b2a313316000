//! Discovery of the prior backups that belong to one project.

use crate::backup::naming;
use crate::Result;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;
use walkdir::WalkDir;

/// File extension of exported project backups
pub const ARTIFACT_EXTENSION: &str = "drp";

/// Backups of one project in one directory, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupSeries {
    pub members: Vec<PathBuf>,
}

impl BackupSeries {
    /// Scan `directory` for the series of `project_name`
    pub fn gather<P: AsRef<Path>>(directory: P, project_name: &str) -> Result<Self> {
        Ok(Self {
            members: gather_series(directory, project_name)?,
        })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Most recent member, if any
    pub fn latest(&self) -> Option<&Path> {
        self.members.last().map(PathBuf::as_path)
    }

    /// A copy of this series with `artifact` appended as its newest member
    pub fn with_member(&self, artifact: &Path) -> Self {
        let mut members = self.members.clone();
        if !members.iter().any(|m| m == artifact) {
            members.push(artifact.to_path_buf());
        }
        Self { members }
    }
}

/// True if `file_name` looks like a finished backup of `project_name`
pub fn is_series_member(file_name: &str, project_name: &str) -> bool {
    !file_name.starts_with('.')
        && file_name.contains(project_name)
        && Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == ARTIFACT_EXTENSION)
}

/// All backups in `directory` whose name contains `project_name`, ordered by
/// modification time ascending. An empty result is not an error.
///
/// The name is matched the way it is written into artifact names, so
/// projects with path separators in their name still find their backups.
pub fn gather_series<P: AsRef<Path>>(directory: P, project_name: &str) -> Result<Vec<PathBuf>> {
    let directory = directory.as_ref();
    let needle = naming::path_safe(project_name);
    let mut members: Vec<(SystemTime, PathBuf)> = Vec::new();

    for entry in WalkDir::new(directory).min_depth(1).max_depth(1) {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !is_series_member(name, &needle) {
            continue;
        }

        let modified = entry.metadata().map_err(io::Error::from)?.modified()?;
        members.push((modified, entry.into_path()));
    }

    members.sort_by(|(ta, pa), (tb, pb)| ta.cmp(tb).then_with(|| pa.cmp(pb)));

    debug!(
        "Found {} prior backups of '{}' in {}",
        members.len(),
        project_name,
        directory.display()
    );

    Ok(members.into_iter().map(|(_, path)| path).collect())
}
