//! Error types for rex

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for rex operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Project store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    #[error("Project store error: {reason}")]
    Store { reason: String },

    #[error("Export of '{project}' failed: {reason}")]
    ExportFailure { project: String, reason: String },

    #[error("Checksum IO failure on {}: {source}", path.display())]
    ChecksumIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Backup already exists, refusing to overwrite: {}", path.display())]
    NamingConflict { path: PathBuf },

    #[error("Invalid configuration: {reason}")]
    Configuration { reason: String },

    #[error("Operation cancelled by user")]
    UserAbort,
}

impl Error {
    /// Process exit status for an error that reaches the top of the binary.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::UserAbort => 130,
            _ => 1,
        }
    }

    /// Errors that end the whole run rather than a single project.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::StoreUnavailable { .. } | Error::UserAbort | Error::Configuration { .. }
        )
    }
}

/// Result type alias for rex operations
pub type Result<T> = std::result::Result<T, Error>;
