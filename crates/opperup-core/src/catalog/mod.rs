//! Release catalog: immutable map of (version, platform) → artifact.
//!
//! Loaded once (from a TOML/JSON file or the embedded default) and never
//! mutated afterwards. URLs are expanded from a single template so each
//! version needs only its digests.

mod file;

pub use file::{ArtifactEntry, CatalogFile, ReleaseEntry, DEFAULT_URL_TEMPLATE};

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::checksum::Sha256Digest;
use crate::error::{ReleaseError, ReleaseResult};
use crate::platform::PlatformKey;
use crate::release::Release;
use crate::version::Version;

const EMBEDDED_CATALOG: &str = include_str!("default.toml");

#[derive(Debug, Clone, PartialEq, Eq)]
struct Artifact {
    url: String,
    digest: Sha256Digest,
    size: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    releases: BTreeMap<Version, BTreeMap<PlatformKey, Artifact>>,
}

impl Catalog {
    /// Catalog compiled into the binary.
    pub fn embedded() -> ReleaseResult<Self> {
        Self::from_toml_str(EMBEDDED_CATALOG)
    }

    pub fn from_toml_str(src: &str) -> ReleaseResult<Self> {
        let file: CatalogFile =
            toml::from_str(src).map_err(|e| ReleaseError::Catalog(e.to_string()))?;
        Self::from_file(file)
    }

    pub fn from_json_str(src: &str) -> ReleaseResult<Self> {
        let file: CatalogFile =
            serde_json::from_str(src).map_err(|e| ReleaseError::Catalog(e.to_string()))?;
        Self::from_file(file)
    }

    /// Load from disk; `.json` files are parsed as JSON, everything else as TOML.
    pub fn load_from_path(path: &Path) -> ReleaseResult<Self> {
        let data = fs::read_to_string(path)
            .map_err(|e| ReleaseError::Catalog(format!("read {}: {}", path.display(), e)))?;
        let catalog = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_str(&data)?,
            _ => Self::from_toml_str(&data)?,
        };
        tracing::debug!(
            path = %path.display(),
            versions = catalog.releases.len(),
            "loaded release catalog"
        );
        Ok(catalog)
    }

    /// Validate and expand a parsed catalog file.
    pub fn from_file(file: CatalogFile) -> ReleaseResult<Self> {
        if !file.url_template.contains("{version}") {
            return Err(ReleaseError::Catalog(
                "url_template must contain {version}".to_string(),
            ));
        }

        let mut releases = BTreeMap::new();
        for entry in file.releases {
            if entry.artifacts.is_empty() {
                return Err(ReleaseError::Catalog(format!(
                    "release {} lists no artifacts",
                    entry.version
                )));
            }
            let mut artifacts = BTreeMap::new();
            for (key, art) in entry.artifacts {
                let platform: PlatformKey = key.parse().map_err(|_| {
                    ReleaseError::Catalog(format!(
                        "release {}: unknown platform key {:?}",
                        entry.version, key
                    ))
                })?;
                let url = match art.url {
                    Some(u) => u,
                    None => expand_template(&file.url_template, &entry.version, platform),
                };
                validate_url(&url, &entry.version)?;
                let artifact = Artifact {
                    url,
                    digest: art.sha256,
                    size: art.size,
                };
                if artifacts.insert(platform, artifact).is_some() {
                    return Err(ReleaseError::Catalog(format!(
                        "release {} lists {} twice",
                        entry.version, platform
                    )));
                }
            }
            let version = entry.version;
            if releases.contains_key(&version) {
                return Err(ReleaseError::Catalog(format!(
                    "release {version} listed more than once"
                )));
            }
            releases.insert(version, artifacts);
        }
        Ok(Self { releases })
    }

    /// Resolve a (version, platform) pair without touching the network.
    ///
    /// `UnknownVersion` if the version has no entry, `UnsupportedPlatform` if the
    /// version exists but publishes nothing for `platform`.
    pub fn resolve(&self, version: &Version, platform: PlatformKey) -> ReleaseResult<Release> {
        let artifacts = self
            .releases
            .get(version)
            .ok_or_else(|| ReleaseError::UnknownVersion {
                version: version.to_string(),
            })?;
        let artifact = artifacts
            .get(&platform)
            .ok_or_else(|| ReleaseError::UnsupportedPlatform {
                platform: platform.to_string(),
            })?;
        Ok(Release {
            version: version.clone(),
            platform,
            url: artifact.url.clone(),
            expected_digest: artifact.digest,
            expected_size: artifact.size,
        })
    }

    /// Highest stable (non-prerelease) version that publishes an artifact for `platform`.
    pub fn resolve_latest(&self, platform: PlatformKey) -> ReleaseResult<Release> {
        let version = self
            .releases
            .iter()
            .rev()
            .find(|(v, arts)| v.pre.is_none() && arts.contains_key(&platform))
            .map(|(v, _)| v.clone())
            .ok_or_else(|| ReleaseError::UnsupportedPlatform {
                platform: platform.to_string(),
            })?;
        self.resolve(&version, platform)
    }

    /// All versions, ascending.
    pub fn versions(&self) -> impl DoubleEndedIterator<Item = &Version> {
        self.releases.keys()
    }

    /// Platforms published for `version` (empty if unknown).
    pub fn platforms(&self, version: &Version) -> Vec<PlatformKey> {
        self.releases
            .get(version)
            .map(|a| a.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}

fn expand_template(template: &str, version: &Version, platform: PlatformKey) -> String {
    template
        .replace("{version}", &version.to_string())
        .replace("{platform}", platform.as_str())
}

fn validate_url(raw: &str, version: &Version) -> ReleaseResult<()> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| ReleaseError::Catalog(format!("release {version}: bad url {raw:?}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ReleaseError::Catalog(format!(
            "release {version}: unsupported url scheme {:?}",
            parsed.scheme()
        )));
    }
    if !raw.contains(&version.to_string()) {
        return Err(ReleaseError::Catalog(format!(
            "release {version}: url {raw:?} does not contain the version"
        )));
    }
    Ok(())
}
