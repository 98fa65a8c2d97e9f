//! Caller-owned cancellation for the fetch step.
//!
//! The CLI hands a clone of the token to its Ctrl-C handler; the downloader
//! checks it from curl's write/progress callbacks and the retry loop checks it
//! between backoff slices.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::ReleaseError;

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent; visible to every clone.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// `Err(Cancelled)` once cancellation has been requested.
    pub fn check(&self) -> Result<(), ReleaseError> {
        if self.is_cancelled() {
            Err(ReleaseError::Cancelled)
        } else {
            Ok(())
        }
    }
}
