//! The release verifier: resolve → fetch → verify → install.
//!
//! Every step is blocking and runs in sequence. A digest mismatch aborts before
//! anything is written next to the target; a failed smoke test aborts before
//! the staged binary replaces the target.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::cancel::CancelToken;
use crate::catalog::Catalog;
use crate::checksum::{self, Sha256Digest};
use crate::error::{ReleaseError, ReleaseResult};
use crate::fetch::{self, FetchOptions};
use crate::install;
use crate::platform::PlatformKey;
use crate::release::Release;
use crate::version::{Version, VersionParseError};

/// Which version to resolve: an exact one or the newest stable release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRequest {
    Latest,
    Exact(Version),
}

impl FromStr for VersionRequest {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("latest") {
            Ok(VersionRequest::Latest)
        } else {
            s.parse().map(VersionRequest::Exact)
        }
    }
}

impl fmt::Display for VersionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionRequest::Latest => f.write_str("latest"),
            VersionRequest::Exact(v) => write!(f, "{v}"),
        }
    }
}

/// Outcome of a successful install.
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub release: Release,
    pub path: PathBuf,
    pub bytes: u64,
    /// `--version` output of the new binary, when the smoke test ran.
    pub smoke_output: Option<String>,
}

#[derive(Debug, Clone)]
pub enum UpdateOutcome {
    UpToDate { installed: Version },
    Updated {
        previous: Option<Version>,
        report: InstallReport,
    },
}

#[derive(Debug, Clone)]
pub struct ReleaseVerifier {
    catalog: Catalog,
    fetch_opts: FetchOptions,
    smoke_test: bool,
}

impl ReleaseVerifier {
    pub fn new(catalog: Catalog, fetch_opts: FetchOptions) -> Self {
        Self {
            catalog,
            fetch_opts,
            smoke_test: true,
        }
    }

    /// Run `--version` on the staged binary before it replaces the target.
    pub fn with_smoke_test(mut self, enabled: bool) -> Self {
        self.smoke_test = enabled;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Catalog lookup only; never touches the network.
    pub fn resolve(&self, version: &Version, platform: PlatformKey) -> ReleaseResult<Release> {
        self.catalog.resolve(version, platform)
    }

    pub fn resolve_request(
        &self,
        request: &VersionRequest,
        platform: PlatformKey,
    ) -> ReleaseResult<Release> {
        match request {
            VersionRequest::Latest => self.catalog.resolve_latest(platform),
            VersionRequest::Exact(v) => self.catalog.resolve(v, platform),
        }
    }

    pub fn fetch(&self, release: &Release, cancel: &CancelToken) -> ReleaseResult<Vec<u8>> {
        fetch::fetch(release, &self.fetch_opts, cancel)
    }

    /// Constant-time digest check; `false` on mismatch, never an error.
    pub fn verify(&self, bytes: &[u8], expected: &Sha256Digest) -> bool {
        checksum::verify(bytes, expected)
    }

    pub fn install(&self, bytes: &[u8], target: &Path) -> ReleaseResult<PathBuf> {
        install::install(bytes, target)
    }

    /// Full pipeline for one (version, platform) into `target`.
    pub fn install_release(
        &self,
        request: &VersionRequest,
        platform: PlatformKey,
        target: &Path,
        cancel: &CancelToken,
    ) -> ReleaseResult<InstallReport> {
        let release = self.resolve_request(request, platform)?;
        tracing::info!(
            version = %release.version,
            platform = %release.platform,
            url = %release.url,
            "resolved release"
        );

        let bytes = self.fetch(&release, cancel)?;
        cancel.check()?;

        if !self.verify(&bytes, &release.expected_digest) {
            let actual = Sha256Digest::of(&bytes);
            tracing::error!(
                url = %release.url,
                expected = %release.expected_digest,
                actual = %actual,
                "digest mismatch, aborting install"
            );
            return Err(ReleaseError::DigestMismatch {
                url: release.url.clone(),
                expected: release.expected_digest.to_hex(),
                actual: actual.to_hex(),
            });
        }
        tracing::debug!(digest = %release.expected_digest, "digest verified");

        let staged = install::stage(&bytes, target)?;
        let smoke_output = if self.smoke_test {
            Some(install::smoke_test(staged.path()).map_err(|e| match e {
                ReleaseError::SmokeTestFailed { detail, .. } => ReleaseError::SmokeTestFailed {
                    path: target.to_path_buf(),
                    detail,
                },
                other => other,
            })?)
        } else {
            None
        };
        cancel.check()?;
        let path = staged.commit()?;

        Ok(InstallReport {
            release,
            path,
            bytes: bytes.len() as u64,
            smoke_output,
        })
    }

    /// Install the newest stable release unless `target` already reports it (or newer).
    pub fn update(
        &self,
        platform: PlatformKey,
        target: &Path,
        cancel: &CancelToken,
    ) -> ReleaseResult<UpdateOutcome> {
        let latest = self.catalog.resolve_latest(platform)?;
        let previous = install::installed_version(target);
        if let Some(installed) = &previous {
            if *installed >= latest.version {
                tracing::info!(installed = %installed, latest = %latest.version, "already up to date");
                return Ok(UpdateOutcome::UpToDate {
                    installed: installed.clone(),
                });
            }
        }
        let report = self.install_release(
            &VersionRequest::Exact(latest.version),
            platform,
            target,
            cancel,
        )?;
        Ok(UpdateOutcome::Updated { previous, report })
    }
}
