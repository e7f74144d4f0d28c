//! Upload-progress callbacks.
//!
//! Pass an [`Arc<dyn UploadProgressCallback>`] to any conversion call to be
//! told how much of the request body has been handed to the transport.
//! Plain closures work too:
//!
//! ```rust
//! use docconv_client::{ProgressCallback, UploadProgress};
//! use std::sync::Arc;
//!
//! let cb: ProgressCallback = Arc::new(|p: UploadProgress| {
//!     eprintln!("{}% ({}/{} bytes)", p.percentage, p.loaded, p.total);
//! });
//! # let _ = cb;
//! ```
//!
//! Within a single call, ticks arrive in order with non-decreasing `loaded`,
//! and the last tick is delivered before the call resolves. Callbacks run on
//! the task driving the request, so they should return quickly.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// One snapshot of an in-flight upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadProgress {
    /// Payload bytes handed to the transport so far.
    pub loaded: u64,
    /// Total payload bytes in this request.
    pub total: u64,
    /// `round(loaded * 100 / total)`; 0 when `total` is 0.
    pub percentage: u8,
}

impl UploadProgress {
    pub fn new(loaded: u64, total: u64) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            let loaded = loaded.min(total) as u128;
            let total = total as u128;
            ((loaded * 100 + total / 2) / total) as u8
        };
        Self {
            loaded,
            total,
            percentage,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.loaded >= self.total
    }
}

/// Receives upload ticks for one conversion call.
pub trait UploadProgressCallback: Send + Sync {
    fn on_upload_progress(&self, progress: UploadProgress);
}

impl<F> UploadProgressCallback for F
where
    F: Fn(UploadProgress) + Send + Sync,
{
    fn on_upload_progress(&self, progress: UploadProgress) {
        self(progress)
    }
}

/// Convenience alias for the callback type accepted by the client.
pub type ProgressCallback = Arc<dyn UploadProgressCallback>;

/// Counts bytes across every part of one multipart body and reports ticks.
///
/// Parts are streamed one after another, so a single shared counter yields
/// a monotonically increasing `loaded`.
pub(crate) struct UploadTracker {
    loaded: AtomicU64,
    total: u64,
    callback: ProgressCallback,
}

impl UploadTracker {
    pub(crate) fn new(total: u64, callback: ProgressCallback) -> Arc<Self> {
        Arc::new(Self {
            loaded: AtomicU64::new(0),
            total,
            callback,
        })
    }

    pub(crate) fn advance(&self, bytes: usize) {
        let loaded = self.loaded.fetch_add(bytes as u64, Ordering::SeqCst) + bytes as u64;
        if self.total > 0 {
            self.callback
                .on_upload_progress(UploadProgress::new(loaded, self.total));
        }
    }
}
