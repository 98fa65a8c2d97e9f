//! CLI for opperup.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use opperup_core::config;
use std::path::PathBuf;

use commands::{
    run_checksum, run_completions, run_install, run_list, run_platform, run_resolve, run_update,
    run_verify, InstallArgs,
};

/// Top-level CLI for opperup.
#[derive(Debug, Parser)]
#[command(name = "opperup", version)]
#[command(about = "Install and update the opper CLI from verified release binaries", long_about = None)]
pub struct Cli {
    /// Release catalog (TOML or JSON) to use instead of the configured or built-in one.
    #[arg(long, global = true, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download, verify and install a release of opper.
    Install {
        /// Version to install, e.g. 0.12.1 or v0.12.1.
        #[arg(default_value = "latest")]
        version: String,
        /// Platform key (darwin-arm64, darwin-amd64, linux-amd64, linux-arm64). Default: this host.
        #[arg(long)]
        platform: Option<String>,
        /// Directory to install `opper` into.
        #[arg(long, value_name = "DIR")]
        bin_dir: Option<PathBuf>,
        /// Skip running `opper --version` before replacing the installed binary.
        #[arg(long)]
        no_smoke_test: bool,
    },

    /// Install the latest release if it is newer than the installed one.
    Update {
        #[arg(long)]
        platform: Option<String>,
        #[arg(long, value_name = "DIR")]
        bin_dir: Option<PathBuf>,
        #[arg(long)]
        no_smoke_test: bool,
    },

    /// Show the artifact URL and digest for a version without downloading.
    Resolve {
        /// Version to resolve, or "latest".
        version: String,
        #[arg(long)]
        platform: Option<String>,
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Check a local file against the published digest for a version.
    Verify {
        /// Path to the downloaded binary.
        path: PathBuf,
        /// Version the file claims to be.
        version: String,
        #[arg(long)]
        platform: Option<String>,
    },

    /// List versions and platforms in the catalog.
    List {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the platform key of this host.
    Platform,

    /// Compute SHA-256 of a file.
    Checksum {
        /// Path to the file.
        path: String,
    },

    /// Print shell completions.
    Completions {
        shell: clap_complete::Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let catalog = cli.catalog.as_deref();

        match cli.command {
            CliCommand::Install {
                version,
                platform,
                bin_dir,
                no_smoke_test,
            } => {
                let args = InstallArgs {
                    platform,
                    bin_dir,
                    no_smoke_test,
                };
                run_install(&cfg, catalog, &version, args).await?
            }
            CliCommand::Update {
                platform,
                bin_dir,
                no_smoke_test,
            } => {
                let args = InstallArgs {
                    platform,
                    bin_dir,
                    no_smoke_test,
                };
                run_update(&cfg, catalog, args).await?
            }
            CliCommand::Resolve {
                version,
                platform,
                json,
            } => run_resolve(&cfg, catalog, &version, platform.as_deref(), json)?,
            CliCommand::Verify {
                path,
                version,
                platform,
            } => run_verify(&cfg, catalog, &path, &version, platform.as_deref())?,
            CliCommand::List { json } => run_list(&cfg, catalog, json)?,
            CliCommand::Platform => run_platform()?,
            CliCommand::Checksum { path } => run_checksum(std::path::Path::new(&path))?,
            CliCommand::Completions { shell } => run_completions(shell),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
