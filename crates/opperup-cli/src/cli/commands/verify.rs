//! `opperup verify <file> <version>` – check a local binary against the catalog.

use anyhow::{Context, Result};
use opperup_core::config::OpperupConfig;
use opperup_core::{ReleaseError, Sha256Digest, Version};
use std::path::Path;

use super::{build_verifier, platform_or_host};

pub fn run_verify(
    cfg: &OpperupConfig,
    catalog: Option<&Path>,
    path: &Path,
    version: &str,
    platform: Option<&str>,
) -> Result<()> {
    let version: Version = version.parse()?;
    let platform = platform_or_host(platform)?;
    let verifier = build_verifier(cfg, catalog)?;
    let release = verifier.resolve(&version, platform)?;

    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    if !verifier.verify(&bytes, &release.expected_digest) {
        return Err(ReleaseError::DigestMismatch {
            url: path.display().to_string(),
            expected: release.expected_digest.to_hex(),
            actual: Sha256Digest::of(&bytes).to_hex(),
        }
        .into());
    }
    println!(
        "{}: OK (opper {} {})",
        path.display(),
        release.version,
        release.platform
    );
    Ok(())
}
