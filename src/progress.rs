//! Upload progress tracking
//!
//! The ring buffer records how many bytes it has pulled from the request
//! body after every load. The struct is shared through an `Arc` so another
//! thread (a progress endpoint, for example) can poll it mid-upload.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Progress of a single upload
#[derive(Debug, Default)]
pub struct UploadInfo {
    /// Total bytes expected (Content-Length), if known
    sum: Option<u64>,
    /// Bytes consumed from the body so far
    current: AtomicU64,
}

impl UploadInfo {
    /// Create a tracker for a body of `sum` bytes (if known)
    pub fn new(sum: Option<u64>) -> Self {
        Self {
            sum,
            current: AtomicU64::new(0),
        }
    }

    /// Record the cumulative byte count. Never moves backwards.
    pub fn record(&self, bytes_read: u64) {
        self.current.fetch_max(bytes_read, Ordering::Relaxed);
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> Option<u64> {
        self.sum
    }

    /// Get upload progress (0.0 to 1.0), if the total is known
    pub fn ratio(&self) -> Option<f32> {
        match self.sum {
            Some(0) => Some(1.0),
            Some(sum) => Some((self.current() as f64 / sum as f64).min(1.0) as f32),
            None => None,
        }
    }

    /// Serializable view for client-visible progress reporting
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            sum: self.sum,
            current: self.current(),
            ratio: self.ratio(),
        }
    }
}

/// Point-in-time copy of an [`UploadInfo`]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sum: Option<u64>,
    pub current: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratio: Option<f32>,
}
