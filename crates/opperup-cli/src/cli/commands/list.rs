//! `opperup list` – versions and platforms in the catalog.

use anyhow::Result;
use opperup_core::config::OpperupConfig;
use serde_json::json;
use std::path::Path;

use super::load_catalog;

pub fn run_list(cfg: &OpperupConfig, catalog: Option<&Path>, json: bool) -> Result<()> {
    let catalog = load_catalog(cfg, catalog)?;

    if json {
        let entries: Vec<_> = catalog
            .versions()
            .rev()
            .map(|v| {
                let platforms: Vec<String> =
                    catalog.platforms(v).iter().map(|p| p.to_string()).collect();
                json!({ "version": v.to_string(), "platforms": platforms })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if catalog.is_empty() {
        println!("No releases in catalog.");
        return Ok(());
    }
    for version in catalog.versions().rev() {
        let platforms: Vec<String> = catalog
            .platforms(version)
            .iter()
            .map(|p| p.to_string())
            .collect();
        println!("{:<12} {}", version.to_string(), platforms.join(", "));
    }
    Ok(())
}
