//! `opperup resolve <version>` – show what would be downloaded.

use anyhow::Result;
use opperup_core::config::OpperupConfig;
use opperup_core::VersionRequest;
use std::path::Path;

use super::{build_verifier, platform_or_host};

pub fn run_resolve(
    cfg: &OpperupConfig,
    catalog: Option<&Path>,
    version: &str,
    platform: Option<&str>,
    json: bool,
) -> Result<()> {
    let request: VersionRequest = version.parse()?;
    let platform = platform_or_host(platform)?;
    let release = build_verifier(cfg, catalog)?.resolve_request(&request, platform)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&release)?);
    } else {
        println!("version   {}", release.version);
        println!("platform  {}", release.platform);
        println!("url       {}", release.url);
        println!("sha256    {}", release.expected_digest);
        if let Some(size) = release.expected_size {
            println!("size      {}", size);
        }
    }
    Ok(())
}
