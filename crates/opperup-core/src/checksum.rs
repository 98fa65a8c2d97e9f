//! SHA-256 digests for artifact verification.
//!
//! Digests travel as 64 lowercase hex chars (the form published next to
//! release assets) and are compared in constant time.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

const BUF_SIZE: usize = 64 * 1024;

/// A parsed SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Digest([u8; 32]);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid sha256 digest {0:?}: expected 64 hex characters")]
pub struct DigestParseError(pub String);

impl Sha256Digest {
    pub fn of(bytes: &[u8]) -> Self {
        Self(Sha256::digest(bytes).into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for Sha256Digest {
    type Err = DigestParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut out = [0u8; 32];
        hex::decode_to_slice(trimmed, &mut out).map_err(|_| DigestParseError(s.to_string()))?;
        Ok(Self(out))
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256Digest({})", self.to_hex())
    }
}

impl Serialize for Sha256Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Sha256Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Recompute the digest of `bytes` and compare it against `expected`.
///
/// The comparison touches every byte regardless of where the first difference
/// is. Never fails: a mismatch is `false` so the caller decides how to abort.
pub fn verify(bytes: &[u8], expected: &Sha256Digest) -> bool {
    let actual = Sha256Digest::of(bytes);
    constant_time_eq(actual.as_bytes(), expected.as_bytes())
}

fn constant_time_eq(a: &[u8; 32], b: &[u8; 32]) -> bool {
    let diff = a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    std::hint::black_box(diff) == 0
}

/// Compute SHA-256 of a file and return the digest as lowercase hex.
/// Reads in chunks to keep memory use bounded.
pub fn sha256_path(path: &Path) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HELLO_NL: &str = "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03";

    #[test]
    fn sha256_path_empty_file() {
        let f = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(
            sha256_path(f.path()).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256_path_known_content() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello\n").unwrap();
        f.flush().unwrap();
        assert_eq!(sha256_path(f.path()).unwrap(), HELLO_NL);
    }

    #[test]
    fn parse_accepts_upper_and_lower_hex() {
        let lower: Sha256Digest = HELLO_NL.parse().unwrap();
        let upper: Sha256Digest = HELLO_NL.to_uppercase().parse().unwrap();
        assert_eq!(lower, upper);
        assert_eq!(upper.to_string(), HELLO_NL);
    }

    #[test]
    fn parse_rejects_wrong_length_and_non_hex() {
        assert!("abcd".parse::<Sha256Digest>().is_err());
        assert!(HELLO_NL.replace('5', "z").parse::<Sha256Digest>().is_err());
        assert!(format!("{HELLO_NL}00").parse::<Sha256Digest>().is_err());
    }

    #[test]
    fn verify_matches_known_digest() {
        let expected: Sha256Digest = HELLO_NL.parse().unwrap();
        assert!(verify(b"hello\n", &expected));
    }

    #[test]
    fn verify_rejects_every_single_byte_mutation() {
        let body: Vec<u8> = (0u8..=255).cycle().take(1024).collect();
        let expected = Sha256Digest::of(&body);
        assert!(verify(&body, &expected));
        for i in 0..body.len() {
            let mut mutated = body.clone();
            mutated[i] ^= 0x01;
            assert!(!verify(&mutated, &expected), "mutation at {i} passed");
        }
    }

    #[test]
    fn verify_rejects_truncation_and_extension() {
        let expected = Sha256Digest::of(b"hello\n");
        assert!(!verify(b"hello", &expected));
        assert!(!verify(b"hello\n\n", &expected));
    }
}
