//! User configuration at `$XDG_CONFIG_HOME/opperup/config.toml`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides `bin_dir` when set.
pub const BIN_DIR_ENV: &str = "OPPERUP_BIN_DIR";

/// Name the binary is installed under.
pub const BINARY_NAME: &str = "opper";

/// Retry policy parameters (optional `[retry]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per download (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl RetryConfig {
    /// Reject values that cannot be turned into a backoff delay.
    pub fn validate(&self) -> Result<()> {
        if !self.base_delay_secs.is_finite() || self.base_delay_secs < 0.0 {
            anyhow::bail!(
                "retry.base_delay_secs must be a finite, non-negative number (got {})",
                self.base_delay_secs
            );
        }
        std::time::Duration::try_from_secs_f64(self.base_delay_secs)
            .context("retry.base_delay_secs is out of range")?;
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_secs: 0.25,
            max_delay_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpperupConfig {
    /// Directory the `opper` binary is installed into. Default: `~/.local/bin`.
    #[serde(default)]
    pub bin_dir: Option<PathBuf>,
    /// Release catalog file (TOML or JSON). Default: catalog embedded in the binary.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    /// Connect timeout for artifact downloads.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Optional download rate cap in bytes per second.
    #[serde(default)]
    pub max_bytes_per_sec: Option<u64>,
    /// Run `opper --version` after installing.
    #[serde(default = "default_smoke_test")]
    pub smoke_test: bool,
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_smoke_test() -> bool {
    true
}

impl Default for OpperupConfig {
    fn default() -> Self {
        Self {
            bin_dir: None,
            catalog_path: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            max_bytes_per_sec: None,
            smoke_test: default_smoke_test(),
            retry: None,
        }
    }
}

impl OpperupConfig {
    /// Effective install directory: `$OPPERUP_BIN_DIR`, then `bin_dir`, then `~/.local/bin`.
    pub fn resolve_bin_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(BIN_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        if let Some(dir) = &self.bin_dir {
            return Ok(dir.clone());
        }
        let home = std::env::var_os("HOME")
            .filter(|v| !v.is_empty())
            .context("HOME is not set; set bin_dir in config or OPPERUP_BIN_DIR")?;
        Ok(PathBuf::from(home).join(".local").join("bin"))
    }

    /// Effective install path of the binary.
    pub fn target_path(&self) -> Result<PathBuf> {
        Ok(self.resolve_bin_dir()?.join(BINARY_NAME))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("opperup")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<OpperupConfig> {
    load_or_init_at(&config_path()?)
}

pub fn load_or_init_at(path: &Path) -> Result<OpperupConfig> {
    if !path.exists() {
        let default_cfg = OpperupConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: OpperupConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    if let Some(retry) = &cfg.retry {
        retry
            .validate()
            .with_context(|| format!("invalid [retry] in {}", path.display()))?;
    }
    Ok(cfg)
}
