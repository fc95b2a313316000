//! De-duplication policy for freshly exported backups.
//!
//! A new artifact is compared against the most recent members of its series.
//! Identical content short-circuits on a BLAKE3 fingerprint, everything else
//! falls back to the byte similarity ratio from [`similarity`].

pub mod similarity;

use crate::checksum;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub use similarity::{quick_ratio, real_quick_ratio, ByteHistogram};

/// Number of most recent series members compared against
pub const DEFAULT_WINDOW: usize = 3;

/// Minimum ratio at which two artifacts count as the same backup
pub const DEFAULT_THRESHOLD: f64 = 0.990;

/// Outcome of comparing a new artifact with its series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeduplicationVerdict {
    pub is_duplicate: bool,
    pub matched_artifact: Option<PathBuf>,
    /// Similarity ratio of the match, when there was one
    pub ratio: Option<f64>,
}

impl DeduplicationVerdict {
    pub fn unique() -> Self {
        Self {
            is_duplicate: false,
            matched_artifact: None,
            ratio: None,
        }
    }

    fn matched(path: &Path, ratio: f64) -> Self {
        Self {
            is_duplicate: true,
            matched_artifact: Some(path.to_path_buf()),
            ratio: Some(ratio),
        }
    }
}

/// Decides whether a new backup is redundant with recent ones
#[derive(Debug, Clone)]
pub struct DeduplicationPolicy {
    window: usize,
    threshold: f64,
}

impl Default for DeduplicationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW, DEFAULT_THRESHOLD)
    }
}

impl DeduplicationPolicy {
    pub fn new(window: usize, threshold: f64) -> Self {
        Self { window, threshold }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Compare `new_artifact` against the newest members of `series`.
    ///
    /// `series` is ordered oldest to newest. Candidates are tried newest
    /// first and the first one that passes wins. Unreadable candidates are
    /// skipped; an unreadable new artifact is an error.
    pub fn is_redundant<P: AsRef<Path>>(
        &self,
        new_artifact: P,
        series: &[PathBuf],
    ) -> Result<DeduplicationVerdict> {
        let new_artifact = new_artifact.as_ref();

        let candidates: Vec<&PathBuf> = series
            .iter()
            .rev()
            .filter(|p| p.as_path() != new_artifact)
            .take(self.window)
            .collect();

        if candidates.is_empty() {
            debug!("No prior backups to compare {} against", new_artifact.display());
            return Ok(DeduplicationVerdict::unique());
        }

        let new_histogram = ByteHistogram::from_file(new_artifact)?;
        let mut new_fingerprint = None;

        for candidate in candidates {
            debug!(
                "Comparing '{}' with '{}'",
                file_name(new_artifact),
                file_name(candidate)
            );

            let candidate_len = match fs::metadata(candidate) {
                Ok(meta) => meta.len(),
                Err(e) => {
                    warn!("Skipping unreadable backup {}: {}", candidate.display(), e);
                    continue;
                }
            };

            if candidate_len == new_histogram.len() {
                if new_fingerprint.is_none() {
                    new_fingerprint = Some(checksum::fingerprint(new_artifact)?);
                }
                match checksum::fingerprint(candidate) {
                    Ok(fp) if Some(&fp) == new_fingerprint.as_ref() => {
                        info!("Backup is identical to {}", candidate.display());
                        return Ok(DeduplicationVerdict::matched(candidate, 1.0));
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Skipping unreadable backup {}: {}", candidate.display(), e);
                        continue;
                    }
                }
            }

            if real_quick_ratio(new_histogram.len(), candidate_len) < self.threshold {
                debug!("Size difference alone rules out {}", file_name(candidate));
                continue;
            }

            let candidate_histogram = match ByteHistogram::from_file(candidate) {
                Ok(h) => h,
                Err(e) => {
                    warn!("Skipping unreadable backup {}: {}", candidate.display(), e);
                    continue;
                }
            };

            let ratio = quick_ratio(&new_histogram, &candidate_histogram);
            debug!("Match ratio is: {:.6}", ratio);

            if ratio >= self.threshold {
                info!("Most recent match {} (ratio {:.4})", candidate.display(), ratio);
                return Ok(DeduplicationVerdict::matched(candidate, ratio));
            }
        }

        Ok(DeduplicationVerdict::unique())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
