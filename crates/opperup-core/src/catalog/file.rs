//! On-disk catalog format (TOML or JSON).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::checksum::Sha256Digest;
use crate::version::Version;

pub const DEFAULT_URL_TEMPLATE: &str =
    "https://github.com/opper-ai/oppercli/releases/download/v{version}/opper-{platform}";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    /// URL with `{version}` and `{platform}` placeholders.
    #[serde(default = "default_url_template")]
    pub url_template: String,
    #[serde(default, rename = "release")]
    pub releases: Vec<ReleaseEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseEntry {
    pub version: Version,
    /// Keyed by platform key string (`darwin-arm64`); validated on load.
    pub artifacts: BTreeMap<String, ArtifactEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactEntry {
    pub sha256: Sha256Digest,
    /// Exact artifact size in bytes, if published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Overrides `url_template` for this artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

fn default_url_template() -> String {
    DEFAULT_URL_TEMPLATE.to_string()
}
