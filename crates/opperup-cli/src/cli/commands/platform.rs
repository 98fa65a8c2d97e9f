//! `opperup platform` – print the host platform key.

use anyhow::Result;
use opperup_core::PlatformKey;

pub fn run_platform() -> Result<()> {
    println!("{}", PlatformKey::host()?);
    Ok(())
}
