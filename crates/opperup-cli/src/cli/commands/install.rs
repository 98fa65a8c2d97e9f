//! `opperup install` and `opperup update`.

use anyhow::{Context, Result};
use opperup_core::config::{OpperupConfig, BINARY_NAME};
use opperup_core::{CancelToken, InstallReport, PlatformKey, UpdateOutcome, VersionRequest};
use std::path::{Path, PathBuf};

use super::{build_verifier, platform_or_host};

/// Flags shared by install and update.
#[derive(Debug, Clone, Default)]
pub struct InstallArgs {
    pub platform: Option<String>,
    pub bin_dir: Option<PathBuf>,
    pub no_smoke_test: bool,
}

impl InstallArgs {
    fn target(&self, cfg: &OpperupConfig) -> Result<PathBuf> {
        match &self.bin_dir {
            Some(dir) => Ok(dir.join(BINARY_NAME)),
            None => cfg.target_path(),
        }
    }
}

/// Smoke test only binaries the host can execute.
fn smoke_test_enabled(cfg: &OpperupConfig, args: &InstallArgs, platform: PlatformKey) -> bool {
    if !cfg.smoke_test || args.no_smoke_test {
        return false;
    }
    match PlatformKey::host() {
        Ok(host) if host == platform => true,
        host => {
            let host = host.map(|h| h.to_string()).unwrap_or_else(|_| "unsupported".into());
            tracing::info!(%platform, %host, "skipping smoke test for non-host platform");
            eprintln!("note: skipping smoke test, {platform} binaries do not run on this host ({host})");
            false
        }
    }
}

/// Cancel `token` on Ctrl-C until the returned handle is aborted.
fn cancel_on_ctrl_c(token: CancelToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("interrupt received, cancelling download...");
            tracing::info!("interrupt received, cancelling");
            token.cancel();
        }
    })
}

fn print_report(report: &InstallReport) {
    println!(
        "Installed opper {} ({}) to {}",
        report.release.version,
        report.release.platform,
        report.path.display()
    );
    println!("  sha256 {}", report.release.expected_digest);
    if let Some(out) = &report.smoke_output {
        println!("  {}", out);
    }
}

pub async fn run_install(
    cfg: &OpperupConfig,
    catalog: Option<&Path>,
    version: &str,
    args: InstallArgs,
) -> Result<()> {
    let request: VersionRequest = version.parse()?;
    let platform = platform_or_host(args.platform.as_deref())?;
    let target = args.target(cfg)?;
    let verifier = build_verifier(cfg, catalog)?.with_smoke_test(smoke_test_enabled(cfg, &args, platform));

    let cancel = CancelToken::new();
    let signal = cancel_on_ctrl_c(cancel.clone());
    let result = tokio::task::spawn_blocking(move || {
        verifier.install_release(&request, platform, &target, &cancel)
    })
    .await
    .context("install task panicked");
    signal.abort();

    let report = result??;
    print_report(&report);
    Ok(())
}

pub async fn run_update(cfg: &OpperupConfig, catalog: Option<&Path>, args: InstallArgs) -> Result<()> {
    let platform = platform_or_host(args.platform.as_deref())?;
    let target = args.target(cfg)?;
    let verifier = build_verifier(cfg, catalog)?.with_smoke_test(smoke_test_enabled(cfg, &args, platform));

    let cancel = CancelToken::new();
    let signal = cancel_on_ctrl_c(cancel.clone());
    let result = tokio::task::spawn_blocking(move || verifier.update(platform, &target, &cancel))
        .await
        .context("update task panicked");
    signal.abort();

    match result?? {
        UpdateOutcome::UpToDate { installed } => {
            println!("opper {} is up to date", installed);
        }
        UpdateOutcome::Updated { previous, report } => {
            if let Some(prev) = previous {
                println!("Updating opper {} -> {}", prev, report.release.version);
            }
            print_report(&report);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_test_skipped_for_foreign_platform() {
        let cfg = OpperupConfig::default();
        let args = InstallArgs::default();
        let host = PlatformKey::host().ok();
        for platform in PlatformKey::ALL {
            assert_eq!(
                smoke_test_enabled(&cfg, &args, platform),
                host == Some(platform),
                "{platform}"
            );
        }
    }

    #[test]
    fn smoke_test_flag_and_config_disable_it() {
        let Ok(host) = PlatformKey::host() else {
            return;
        };
        let no_flag = InstallArgs {
            no_smoke_test: true,
            ..InstallArgs::default()
        };
        assert!(!smoke_test_enabled(&OpperupConfig::default(), &no_flag, host));
        let cfg = OpperupConfig {
            smoke_test: false,
            ..OpperupConfig::default()
        };
        assert!(!smoke_test_enabled(&cfg, &InstallArgs::default(), host));
    }
}
