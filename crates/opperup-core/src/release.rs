//! A resolved (version, platform) artifact.

use serde::Serialize;

use crate::checksum::Sha256Digest;
use crate::platform::PlatformKey;
use crate::version::Version;

/// Immutable once resolved; produced only by [`crate::catalog::Catalog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
    pub version: Version,
    pub platform: PlatformKey,
    pub url: String,
    pub expected_digest: Sha256Digest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_size: Option<u64>,
}

impl Release {
    /// File name of the artifact (last URL path segment), e.g. `opper-darwin-arm64`.
    pub fn artifact_name(&self) -> String {
        url::Url::parse(&self.url)
            .ok()
            .and_then(|u| {
                u.path_segments()
                    .and_then(|mut s| s.next_back().map(str::to_string))
            })
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("opper-{}", self.platform))
    }
}
