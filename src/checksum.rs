//! Streaming content digests and checksum sidecar files.
//!
//! The sidecar digest is MD5 so existing `.md5` files stay comparable with
//! older backups. Exact-equality checks between artifacts use BLAKE3.

use crate::fsutil;
use crate::{Error, Result};
use md5::{Digest as _, Md5};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Suffix appended to an artifact path to name its sidecar
pub const DIGEST_EXTENSION: &str = "md5";

/// Read buffer size used when streaming a file through a hasher
pub const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Hex encoded content digest
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest(String);

impl ContentDigest {
    pub fn new(hex: String) -> Self {
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn checksum_io(path: &Path, source: io::Error) -> Error {
    Error::ChecksumIo {
        path: path.to_path_buf(),
        source,
    }
}

/// Feed `path` through `update` in fixed-size chunks.
fn stream_file<P, F>(path: P, mut update: F) -> Result<()>
where
    P: AsRef<Path>,
    F: FnMut(&[u8]),
{
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| checksum_io(path, e))?;
    let mut buffer = vec![0u8; READ_CHUNK_SIZE];

    loop {
        let bytes_read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(checksum_io(path, e)),
        };
        update(&buffer[..bytes_read]);
    }

    Ok(())
}

/// Compute the MD5 digest of a file in streaming fashion
pub fn digest<P: AsRef<Path>>(path: P) -> Result<ContentDigest> {
    let mut hasher = Md5::new();
    stream_file(&path, |chunk| hasher.update(chunk))?;
    Ok(ContentDigest::new(hex::encode(hasher.finalize())))
}

/// Compute the BLAKE3 fingerprint of a file in streaming fashion
pub fn fingerprint<P: AsRef<Path>>(path: P) -> Result<ContentDigest> {
    let mut hasher = blake3::Hasher::new();
    stream_file(&path, |chunk| {
        hasher.update(chunk);
    })?;
    Ok(ContentDigest::new(hasher.finalize().to_hex().to_string()))
}

/// Digest of exactly one backup artifact, persisted next to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumRecord {
    pub path: PathBuf,
    pub digest: ContentDigest,
}

/// State of an artifact's sidecar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SidecarStatus {
    Missing,
    Valid,
    Mismatch,
}

impl ChecksumRecord {
    /// `{artifact_path}.md5`
    pub fn sidecar_path<P: AsRef<Path>>(artifact: P) -> PathBuf {
        let mut path = artifact.as_ref().as_os_str().to_os_string();
        path.push(".");
        path.push(DIGEST_EXTENSION);
        PathBuf::from(path)
    }

    /// Digest `artifact` and write a fresh sidecar for it.
    ///
    /// Fails if a sidecar already exists at that path.
    pub fn generate<P: AsRef<Path>>(artifact: P) -> Result<Self> {
        let artifact = artifact.as_ref();
        let digest = digest(artifact)?;
        let path = Self::sidecar_path(artifact);

        fsutil::write_new(&path, digest.as_str().as_bytes()).map_err(|e| checksum_io(&path, e))?;
        debug!("Wrote checksum {} for {}", digest, artifact.display());

        Ok(Self { path, digest })
    }

    /// Load the sidecar for `artifact`, if one exists
    pub fn load<P: AsRef<Path>>(artifact: P) -> Result<Option<Self>> {
        let path = Self::sidecar_path(artifact);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(Self {
                digest: ContentDigest::new(content.trim().to_lowercase()),
                path,
            })),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(checksum_io(&path, e)),
        }
    }
}

/// Re-digest `artifact` and compare it with its sidecar
pub fn verify_sidecar<P: AsRef<Path>>(artifact: P) -> Result<SidecarStatus> {
    let artifact = artifact.as_ref();
    let Some(record) = ChecksumRecord::load(artifact)? else {
        return Ok(SidecarStatus::Missing);
    };

    let actual = digest(artifact)?;
    if actual == record.digest {
        Ok(SidecarStatus::Valid)
    } else {
        warn!(
            "Checksum mismatch for {}: expected {}, got {}",
            artifact.display(),
            record.digest,
            actual
        );
        Ok(SidecarStatus::Mismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_digest_known_value() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let file = temp_dir.path().join("hello.drp");
        fs::write(&file, b"hello world")?;

        assert_eq!(digest(&file)?.as_str(), "5eb63bbbe01eeed093cb22bb8f5acdc3");
        assert_eq!(
            fingerprint(&file)?.as_str(),
            "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24"
        );
        Ok(())
    }

    #[test]
    fn test_digest_is_deterministic_across_chunks() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let file = temp_dir.path().join("large.drp");
        let data: Vec<u8> = (0..READ_CHUNK_SIZE * 3 + 17).map(|i| (i % 251) as u8).collect();
        fs::write(&file, &data)?;

        let first = digest(&file)?;
        assert_eq!(first, digest(&file)?);

        fs::write(&file, &data[1..])?;
        assert_ne!(first, digest(&file)?);
        Ok(())
    }

    #[test]
    fn test_digest_missing_file_is_checksum_io() {
        let result = digest("/definitely/not/here.drp");
        assert!(matches!(result, Err(Error::ChecksumIo { .. })));
    }

    #[test]
    fn test_sidecar_written_once_without_newline() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let artifact = temp_dir.path().join("DB_Alpha_101500.drp");
        fs::write(&artifact, b"hello world")?;

        let record = ChecksumRecord::generate(&artifact)?;
        assert_eq!(record.path, temp_dir.path().join("DB_Alpha_101500.drp.md5"));
        assert_eq!(fs::read_to_string(&record.path)?, "5eb63bbbe01eeed093cb22bb8f5acdc3");

        let second = ChecksumRecord::generate(&artifact);
        assert!(matches!(second, Err(Error::ChecksumIo { .. })));
        Ok(())
    }

    #[test]
    fn test_verify_sidecar_states() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let artifact = temp_dir.path().join("Alpha_101500.drp");
        fs::write(&artifact, b"project v1")?;

        assert_eq!(verify_sidecar(&artifact)?, SidecarStatus::Missing);

        ChecksumRecord::generate(&artifact)?;
        assert_eq!(verify_sidecar(&artifact)?, SidecarStatus::Valid);

        fs::write(&artifact, b"project v2")?;
        assert_eq!(verify_sidecar(&artifact)?, SidecarStatus::Mismatch);
        Ok(())
    }
}
