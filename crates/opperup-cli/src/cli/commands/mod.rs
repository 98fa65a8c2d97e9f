//! CLI command handlers, one file per command, plus shared setup.

mod checksum;
mod completions;
mod install;
mod list;
mod platform;
mod resolve;
mod verify;

pub use checksum::run_checksum;
pub use completions::run_completions;
pub use install::{run_install, run_update, InstallArgs};
pub use list::run_list;
pub use platform::run_platform;
pub use resolve::run_resolve;
pub use verify::run_verify;

use anyhow::{Context, Result};
use opperup_core::config::OpperupConfig;
use opperup_core::{Catalog, FetchOptions, PlatformKey, ReleaseVerifier};
use std::path::Path;

/// Catalog precedence: `--catalog`, then `catalog_path` in config, then the embedded one.
pub(crate) fn load_catalog(cfg: &OpperupConfig, flag: Option<&Path>) -> Result<Catalog> {
    match flag.or(cfg.catalog_path.as_deref()) {
        Some(path) => Catalog::load_from_path(path)
            .with_context(|| format!("load catalog {}", path.display())),
        None => Ok(Catalog::embedded()?),
    }
}

/// Explicit `--platform`, or the host's key.
pub(crate) fn platform_or_host(flag: Option<&str>) -> Result<PlatformKey> {
    let key: PlatformKey = match flag {
        Some(s) => s.parse()?,
        None => PlatformKey::host()?,
    };
    Ok(key)
}

pub(crate) fn build_verifier(cfg: &OpperupConfig, catalog: Option<&Path>) -> Result<ReleaseVerifier> {
    let catalog = load_catalog(cfg, catalog)?;
    Ok(ReleaseVerifier::new(catalog, FetchOptions::from(cfg)).with_smoke_test(cfg.smoke_test))
}
