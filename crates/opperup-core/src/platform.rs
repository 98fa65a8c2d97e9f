//! Platform keys: the OS/architecture pair that selects a release artifact.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ReleaseError;

/// OS/architecture identifier as it appears in artifact names (`opper-darwin-arm64`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformKey {
    DarwinArm64,
    DarwinAmd64,
    LinuxAmd64,
    LinuxArm64,
}

impl PlatformKey {
    pub const ALL: [PlatformKey; 4] = [
        PlatformKey::DarwinArm64,
        PlatformKey::DarwinAmd64,
        PlatformKey::LinuxAmd64,
        PlatformKey::LinuxArm64,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKey::DarwinArm64 => "darwin-arm64",
            PlatformKey::DarwinAmd64 => "darwin-amd64",
            PlatformKey::LinuxAmd64 => "linux-amd64",
            PlatformKey::LinuxArm64 => "linux-arm64",
        }
    }

    /// Map Rust's `std::env::consts::{OS, ARCH}` values to a key.
    pub fn from_os_arch(os: &str, arch: &str) -> Result<Self, ReleaseError> {
        match (os, arch) {
            ("macos", "aarch64") => Ok(PlatformKey::DarwinArm64),
            ("macos", "x86_64") => Ok(PlatformKey::DarwinAmd64),
            ("linux", "x86_64") => Ok(PlatformKey::LinuxAmd64),
            ("linux", "aarch64") => Ok(PlatformKey::LinuxArm64),
            _ => Err(ReleaseError::UnsupportedPlatform {
                platform: format!("{os}-{arch}"),
            }),
        }
    }

    /// Key for the machine we are running on.
    pub fn host() -> Result<Self, ReleaseError> {
        Self::from_os_arch(std::env::consts::OS, std::env::consts::ARCH)
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformKey {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ReleaseError::UnsupportedPlatform {
                platform: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_roundtrip_names() {
        for key in PlatformKey::ALL {
            assert_eq!(key.as_str().parse::<PlatformKey>().unwrap(), key);
        }
        assert_eq!(
            "Darwin-ARM64".parse::<PlatformKey>().unwrap(),
            PlatformKey::DarwinArm64
        );
    }

    #[test]
    fn unknown_key_is_unsupported() {
        let err = "windows-amd64".parse::<PlatformKey>().unwrap_err();
        match err {
            ReleaseError::UnsupportedPlatform { platform } => assert_eq!(platform, "windows-amd64"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn os_arch_mapping() {
        assert_eq!(
            PlatformKey::from_os_arch("macos", "aarch64").unwrap(),
            PlatformKey::DarwinArm64
        );
        assert_eq!(
            PlatformKey::from_os_arch("linux", "x86_64").unwrap(),
            PlatformKey::LinuxAmd64
        );
        assert!(PlatformKey::from_os_arch("windows", "x86_64").is_err());
        assert!(PlatformKey::from_os_arch("linux", "riscv64").is_err());
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&PlatformKey::LinuxAmd64).unwrap();
        assert_eq!(json, "\"linux-amd64\"");
    }
}
