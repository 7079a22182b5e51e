//! The content store interface.
//!
//! The core crate performs no I/O. Blob bytes are routed through this trait
//! during canonicalization and rehydration; concrete backends (filesystem,
//! in-memory) live in the `sigil-store` crate.
//!
//! Contract:
//! - `put` is idempotent: the same bytes always produce the same digest, and
//!   a duplicate put is a no-op. Concurrent puts of identical content race
//!   harmlessly because the stored value is identical by definition of the
//!   digest.
//! - `get` fails with `NotFound` when the store has no object for a digest.

use bytes::Bytes;

use crate::digest::{blob_digest, Digest, HashAlg};
use crate::errors::{SigilError, SigilResult};

pub trait ContentStore: Send + Sync {
    /// Store a blob payload and return its content digest.
    fn put(&self, bytes: &[u8]) -> SigilResult<Digest>;

    /// Fetch a blob payload by digest.
    fn get(&self, digest: &Digest) -> SigilResult<Bytes>;
}

/// A store that computes digests without retaining any bytes.
///
/// Useful for pure sigil computation (e.g. verification) where persisting
/// payloads is unnecessary. Every `get` fails with `NotFound`.
#[derive(Debug, Clone, Copy)]
pub struct DigestOnly {
    alg: HashAlg,
}

impl DigestOnly {
    pub fn new(alg: HashAlg) -> Self {
        Self { alg }
    }
}

impl Default for DigestOnly {
    fn default() -> Self {
        Self::new(HashAlg::Sha256)
    }
}

impl ContentStore for DigestOnly {
    fn put(&self, bytes: &[u8]) -> SigilResult<Digest> {
        Ok(blob_digest(self.alg, bytes))
    }

    fn get(&self, digest: &Digest) -> SigilResult<Bytes> {
        Err(SigilError::not_found(digest.to_string()))
    }
}
