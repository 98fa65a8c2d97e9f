pub mod config;
pub mod logging;

pub mod cancel;
pub mod catalog;
pub mod checksum;
pub mod error;
pub mod fetch;
pub mod install;
pub mod platform;
pub mod release;
pub mod retry;
pub mod verifier;
pub mod version;

pub use cancel::CancelToken;
pub use catalog::Catalog;
pub use checksum::Sha256Digest;
pub use error::{ReleaseError, ReleaseResult};
pub use fetch::FetchOptions;
pub use platform::PlatformKey;
pub use release::Release;
pub use verifier::{InstallReport, ReleaseVerifier, UpdateOutcome, VersionRequest};
pub use version::Version;
