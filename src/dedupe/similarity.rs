//! Fuzzy similarity between two byte sequences.
//!
//! The ratio is the multiset overlap of byte values, `2 * M / (len_a + len_b)`
//! where `M` is the number of bytes that can be paired across both inputs
//! irrespective of position. It is an upper bound on any alignment based
//! ratio and only needs one streaming pass per file.

use crate::checksum::READ_CHUNK_SIZE;
use crate::Result;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Occurrence count of each byte value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteHistogram {
    counts: [u64; 256],
    len: u64,
}

impl Default for ByteHistogram {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteHistogram {
    pub fn new() -> Self {
        Self {
            counts: [0; 256],
            len: 0,
        }
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        let mut histogram = Self::new();
        histogram.update(data);
        histogram
    }

    /// Build a histogram by streaming a file in fixed-size chunks
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut histogram = Self::new();
        let mut buffer = vec![0u8; READ_CHUNK_SIZE];

        loop {
            match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => histogram.update(&buffer[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(histogram)
    }

    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.counts[byte as usize] += 1;
        }
        self.len += data.len() as u64;
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of bytes pairable between `self` and `other`
    pub fn overlap(&self, other: &Self) -> u64 {
        self.counts
            .iter()
            .zip(other.counts.iter())
            .map(|(a, b)| (*a).min(*b))
            .sum()
    }
}

fn ratio_of(matches: u64, total: u64) -> f64 {
    if total == 0 {
        1.0
    } else {
        2.0 * matches as f64 / total as f64
    }
}

/// Similarity ratio in `[0, 1]` from byte histograms
pub fn quick_ratio(a: &ByteHistogram, b: &ByteHistogram) -> f64 {
    ratio_of(a.overlap(b), a.len() + b.len())
}

/// Upper bound on [`quick_ratio`] from lengths alone
pub fn real_quick_ratio(len_a: u64, len_b: u64) -> f64 {
    ratio_of(len_a.min(len_b), len_a + len_b)
}

/// Similarity ratio of two in-memory byte sequences
pub fn similarity(a: &[u8], b: &[u8]) -> f64 {
    quick_ratio(&ByteHistogram::from_bytes(a), &ByteHistogram::from_bytes(b))
}
