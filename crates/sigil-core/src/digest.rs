//! Content digests for SIGIL.
//!
//! All digests are:
//! - deterministic
//! - domain-separated
//! - fixed-width (32 bytes for every supported algorithm)
//!
//! No implicit defaults are allowed inside the core. Callers (or store
//! backends) choose the algorithm explicitly.

use std::fmt;

use sha2::{Digest as _, Sha256};

use crate::errors::{SigilError, SigilResult};

/// Digest width in bytes. Fixed for every supported algorithm.
pub const DIGEST_LEN: usize = 32;

/// Hash algorithm identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HashAlg {
    Sha256,
    Blake3,
}

impl HashAlg {
    /// Parse an algorithm name (e.g. "sha256").
    pub fn parse(s: &str) -> SigilResult<Self> {
        match s {
            "sha256" => Ok(Self::Sha256),
            "blake3" => Ok(Self::Blake3),
            _ => Err(SigilError::invalid_argument(format!(
                "unsupported hash algorithm: {s}"
            ))),
        }
    }

    /// Canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Blake3 => "blake3",
        }
    }

    /// Stable single-byte wire tag.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Sha256 => 0x01,
            Self::Blake3 => 0x02,
        }
    }

    /// Inverse of [`HashAlg::tag`].
    pub fn from_tag(tag: u8) -> SigilResult<Self> {
        match tag {
            0x01 => Ok(Self::Sha256),
            0x02 => Ok(Self::Blake3),
            _ => Err(SigilError::decode(format!(
                "unknown hash algorithm tag: 0x{tag:02x}"
            ))),
        }
    }
}

/// A fixed-width content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest {
    pub alg: HashAlg,
    pub bytes: [u8; DIGEST_LEN],
}

impl Digest {
    /// Lowercase hex of the digest bytes (no algorithm prefix).
    pub fn hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Build a digest from an algorithm and a 64-char hex string.
    pub fn from_hex(alg: HashAlg, s: &str) -> SigilResult<Self> {
        let raw = hex::decode(s)
            .map_err(|_| SigilError::invalid_argument(format!("invalid digest hex: {s}")))?;
        if raw.len() != DIGEST_LEN {
            return Err(SigilError::invalid_argument(format!(
                "digest must be {DIGEST_LEN} bytes, got {}",
                raw.len()
            )));
        }
        let mut bytes = [0u8; DIGEST_LEN];
        bytes.copy_from_slice(&raw);
        Ok(Self { alg, bytes })
    }

    /// Parse the canonical `<alg>:<hex>` form produced by `Display`.
    pub fn parse(s: &str) -> SigilResult<Self> {
        let (alg, hex) = s
            .split_once(':')
            .ok_or_else(|| SigilError::invalid_argument(format!("invalid digest string: {s}")))?;
        Self::from_hex(HashAlg::parse(alg)?, hex)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.alg.as_str(), self.hex())
    }
}

/// Hash raw bytes with the selected algorithm.
pub fn hash_bytes(alg: HashAlg, bytes: &[u8]) -> [u8; DIGEST_LEN] {
    match alg {
        HashAlg::Sha256 => {
            let mut h = Sha256::new();
            h.update(bytes);
            h.finalize().into()
        }
        HashAlg::Blake3 => *blake3::hash(bytes).as_bytes(),
    }
}

/// Domain-separated hash: `hash(domain || bytes)`.
pub fn hash_with_domain(alg: HashAlg, domain: &str, bytes: &[u8]) -> [u8; DIGEST_LEN] {
    let mut buf = Vec::with_capacity(domain.len() + bytes.len());
    buf.extend_from_slice(domain.as_bytes());
    buf.extend_from_slice(bytes);
    hash_bytes(alg, &buf)
}

/// The content address of a blob payload.
///
/// This is the single source of truth for content addressing: every store
/// backend must key objects by exactly this digest.
pub fn blob_digest(alg: HashAlg, bytes: &[u8]) -> Digest {
    Digest {
        alg,
        bytes: hash_with_domain(alg, crate::domain::BLOB, bytes),
    }
}
