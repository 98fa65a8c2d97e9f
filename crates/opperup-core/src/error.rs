//! Error taxonomy for resolve / fetch / verify / install.
//!
//! Retryable kinds (`Network`, throttling `HttpStatus`, `TruncatedDownload`) are
//! classified by [`crate::retry::classify`]; everything else aborts the install.

use std::path::PathBuf;

/// Result alias used across the release pipeline.
pub type ReleaseResult<T> = Result<T, ReleaseError>;

#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    /// No artifact is published for this platform (or the key is not a known platform).
    #[error("unsupported platform: {platform}")]
    UnsupportedPlatform { platform: String },

    /// The catalog has no entry for this version.
    #[error("unknown version: {version}")]
    UnknownVersion { version: String },

    /// Transport failure (DNS, connect, reset, timeout). Retryable.
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: curl::Error,
    },

    /// Server answered with a non-2xx status.
    #[error("GET {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u32 },

    /// Body length differs from the expected size. Retryable.
    #[error("truncated download: expected {expected} bytes, got {received}")]
    TruncatedDownload { expected: u64, received: u64 },

    /// Downloaded bytes do not hash to the published digest. Never retried.
    #[error("digest mismatch for {url}: expected {expected}, got {actual}")]
    DigestMismatch {
        url: String,
        expected: String,
        actual: String,
    },

    /// Filesystem failure while placing the binary.
    #[error("install failed at {}: {source}", .path.display())]
    Install {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Installed binary did not answer `--version` with exit status 0.
    #[error("smoke test failed for {}: {detail}", .path.display())]
    SmokeTestFailed { path: PathBuf, detail: String },

    /// Caller requested cancellation (e.g. Ctrl-C).
    #[error("cancelled by user")]
    Cancelled,

    /// Catalog could not be parsed or violates an invariant.
    #[error("invalid catalog: {0}")]
    Catalog(String),
}

impl ReleaseError {
    pub(crate) fn install(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReleaseError::Install {
            path: path.into(),
            source,
        }
    }

    /// True for errors the retry loop may attempt again.
    pub fn is_retryable(&self) -> bool {
        crate::retry::classify(self) != crate::retry::ErrorKind::Other
    }
}
