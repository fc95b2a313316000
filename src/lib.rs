//! # rex
//!
//! Backup orchestration and de-duplication for video-editing project stores.
//!
//! ## Features
//!
//! - **Project walker**: Lazy depth-first discovery of every project in a store
//! - **Backup series**: Timestamped exports grouped per project
//! - **De-duplication**: Exact and near-identical detection against recent backups
//! - **Checksums**: MD5 sidecar files next to each export
//! - **Scheduling**: Periodic backups with desktop notifications
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rex::{BackupOptions, BackupOrchestrator, FsProjectStore};
//!
//! # fn main() -> rex::Result<()> {
//! let mut store = FsProjectStore::open("./projects")?;
//! let mut orchestrator = BackupOrchestrator::new("./backups", BackupOptions::default());
//!
//! let summary = orchestrator.backup(&mut store)?;
//! println!("{}", summary.render_text());
//! # Ok(())
//! # }
//! ```

pub mod backup;
pub mod cancel;
pub mod checksum;
pub mod cli;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod fsutil;
pub mod logging;
pub mod notify;
pub mod scheduler;
pub mod series;
pub mod store;
pub mod walker;

// Re-export commonly used types
pub use backup::{BackupOptions, BackupOrchestrator, BatchSummary, ProjectOutcome};
pub use cancel::CancelFlag;
pub use dedupe::{DeduplicationPolicy, DeduplicationVerdict};
pub use error::{Error, Result};
pub use store::{FsProjectStore, MemoryStore, ProjectRef, ProjectStore};
pub use walker::ProjectWalker;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
