//! Backup artifact naming: `{db_}{project}_{HHMMSS}.drp`.

use crate::series::ARTIFACT_EXTENSION;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Time format of the artifact name suffix
pub const TIMESTAMP_FORMAT: &str = "%H%M%S";

/// An exported project file on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupArtifact {
    pub path: PathBuf,
    pub project_name: String,
    pub timestamp: NaiveDateTime,
    pub database_name: Option<String>,
}

impl BackupArtifact {
    /// Resolve where a backup of `project_name` taken at `timestamp` goes
    pub fn plan(
        static_dir: &Path,
        project_name: &str,
        database_name: Option<&str>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            path: static_dir.join(file_name(project_name, database_name, timestamp)),
            project_name: project_name.to_string(),
            timestamp,
            database_name: database_name.map(str::to_string),
        }
    }
}

/// `part` with path separators replaced, as it appears in artifact names
pub fn path_safe(part: &str) -> String {
    part.replace(['/', '\\'], "_")
}

/// File name of a backup artifact
pub fn file_name(project_name: &str, database_name: Option<&str>, timestamp: NaiveDateTime) -> String {
    let prefix = database_name
        .filter(|db| !db.is_empty())
        .map(|db| format!("{}_", path_safe(db)))
        .unwrap_or_default();

    format!(
        "{}{}_{}.{}",
        prefix,
        path_safe(project_name),
        timestamp.format(TIMESTAMP_FORMAT),
        ARTIFACT_EXTENSION
    )
}
