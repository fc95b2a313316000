//! User settings, stored as TOML.

use crate::backup::BackupOptions;
use crate::dedupe::{DeduplicationPolicy, DEFAULT_THRESHOLD, DEFAULT_WINDOW};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Recognised values of `app.loglevel`
pub const LOG_LEVELS: [&str; 5] = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub app: AppSettings,
    pub backup: BackupSettings,
    pub schedule: ScheduleSettings,
    pub store: StoreSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub loglevel: String,
    pub log_to_file: bool,
    pub logfile_path: PathBuf,
    /// Wait for ENTER before exiting on a fatal error
    pub pause_on_exit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupSettings {
    pub static_dir: PathBuf,
    pub active_only: bool,
    pub generate_checksum: bool,
    pub de_duplicate: bool,
    pub remove_redundant: bool,
    pub comparison_window: usize,
    pub similarity_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    pub frequency_in_minutes: u64,
    /// Seconds of warning before a scheduled backup; 0 disables it
    pub countdown_warning: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub root: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
    /// Project treated as open, as `Folder/Sub/Name`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_project: Option<String>,
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"))
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            loglevel: "WARNING".to_string(),
            log_to_file: false,
            logfile_path: home_dir().join("rex.log"),
            pause_on_exit: false,
        }
    }
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            static_dir: home_dir().join("RexBackups"),
            active_only: true,
            generate_checksum: true,
            de_duplicate: true,
            remove_redundant: false,
            comparison_window: DEFAULT_WINDOW,
            similarity_threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            frequency_in_minutes: 30,
            countdown_warning: 30,
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            root: home_dir().join("RexProjects"),
            database_name: None,
            active_project: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or the default location when `None`.
    ///
    /// A missing file is created with default values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        if path.exists() {
            let content = fs::read_to_string(&path)?;
            Ok(toml::from_str(&content)?)
        } else {
            let settings = Self::default();
            settings.save(&path)?;
            Ok(settings)
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| Error::Configuration {
            reason: "Could not determine config directory".to_string(),
        })?;
        Ok(config_dir.join("rex").join("settings.toml"))
    }

    /// Check the values a backup run depends on
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Err(Error::Configuration { reason });

        if !LOG_LEVELS.contains(&self.app.loglevel.to_uppercase().as_str()) {
            return invalid(format!(
                "app.loglevel must be one of {:?}, got '{}'",
                LOG_LEVELS, self.app.loglevel
            ));
        }
        if !self.backup.static_dir.is_dir() {
            return invalid(format!(
                "backup.static_dir {} does not exist",
                self.backup.static_dir.display()
            ));
        }
        if self.backup.comparison_window == 0 {
            return invalid("backup.comparison_window must be at least 1".to_string());
        }
        let threshold = self.backup.similarity_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return invalid(format!(
                "backup.similarity_threshold must be in (0, 1], got {}",
                threshold
            ));
        }
        if self.schedule.frequency_in_minutes == 0 {
            return invalid("schedule.frequency_in_minutes must be at least 1".to_string());
        }
        Ok(())
    }

    /// `tracing` filter directive for `app.loglevel`
    pub fn log_filter(&self) -> &'static str {
        match self.app.loglevel.to_uppercase().as_str() {
            "DEBUG" => "debug",
            "INFO" => "info",
            "ERROR" | "CRITICAL" => "error",
            _ => "warn",
        }
    }

    pub fn backup_options(&self) -> BackupOptions {
        BackupOptions {
            generate_checksum: self.backup.generate_checksum,
            de_duplicate: self.backup.de_duplicate,
            remove_redundant: self.backup.remove_redundant,
            active_only: self.backup.active_only,
            dry_run: false,
            policy: DeduplicationPolicy::new(
                self.backup.comparison_window,
                self.backup.similarity_threshold,
            ),
        }
    }
}
