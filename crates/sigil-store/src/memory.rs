//! In-memory content store.
//!
//! Useful for tests and short-lived tools. Semantics match `FsStore`:
//! write-once per digest, `NotFound` on a miss, mark-sweep `gc` under the
//! write lock.

use std::collections::{BTreeMap, BTreeSet};

use bytes::Bytes;
use parking_lot::RwLock;
use sigil_core::digest::{blob_digest, Digest, HashAlg};
use sigil_core::store::ContentStore;
use sigil_core::{SigilError, SigilResult};

use crate::StoreStats;

#[derive(Debug)]
pub struct MemoryStore {
    alg: HashAlg,
    objects: RwLock<BTreeMap<Digest, Bytes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_alg(HashAlg::Sha256)
    }

    pub fn with_alg(alg: HashAlg) -> Self {
        Self {
            alg,
            objects: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    /// Remove every object whose digest is not in `live`. Returns the number
    /// of objects removed. Holds the write lock, excluding concurrent puts.
    pub fn gc(&self, live: &BTreeSet<Digest>) -> u64 {
        let mut objects = self.objects.write();
        let before = objects.len();
        objects.retain(|digest, _| live.contains(digest));
        (before - objects.len()) as u64
    }

    pub fn stats(&self) -> StoreStats {
        let objects = self.objects.read();
        StoreStats {
            objects: objects.len() as u64,
            total_bytes: objects.values().map(|b| b.len() as u64).sum(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStore for MemoryStore {
    fn put(&self, bytes: &[u8]) -> SigilResult<Digest> {
        let digest = blob_digest(self.alg, bytes);
        self.objects
            .write()
            .entry(digest)
            .or_insert_with(|| Bytes::copy_from_slice(bytes));
        Ok(digest)
    }

    fn get(&self, digest: &Digest) -> SigilResult<Bytes> {
        self.objects
            .read()
            .get(digest)
            .cloned()
            .ok_or_else(|| SigilError::not_found(digest.to_string()))
    }
}
