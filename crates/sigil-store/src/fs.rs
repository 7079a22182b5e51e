//! Filesystem content store.
//!
//! Layout (one file per object, keyed by digest):
//!
//! ```text
//! <root>/objects/<alg>/<hh>/<rest-of-hex>
//! ```
//!
//! Writes go to a temp file in the same directory and are renamed into
//! place, so readers never observe partial objects and concurrent writers of
//! identical content race harmlessly. `gc` enumerates the layout with
//! `walkdir` under the write lock, excluding concurrent puts in this
//! process. Cross-process exclusion is the operator's responsibility.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use parking_lot::RwLock;
use sigil_core::digest::{blob_digest, Digest, HashAlg};
use sigil_core::store::ContentStore;
use sigil_core::{SigilError, SigilResult};
use walkdir::WalkDir;

use crate::errors::{StoreError, StoreResult};
use crate::StoreStats;

const OBJECTS_DIR: &str = "objects";

/// Store location and digest algorithm.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub root: PathBuf,
    pub alg: HashAlg,
}

impl StoreConfig {
    /// Local development layout rooted at `root` (e.g. `.sigil`).
    pub fn local_dev(root: PathBuf) -> StoreResult<Self> {
        Ok(Self {
            root,
            alg: HashAlg::Sha256,
        })
    }
}

#[derive(Debug)]
pub struct FsStore {
    root: PathBuf,
    alg: HashAlg,
    /// Puts hold this for read; gc holds it for write.
    guard: RwLock<()>,
    tmp_counter: AtomicU64,
}

impl FsStore {
    /// Open (creating if needed) a store at the configured root.
    pub fn open(cfg: StoreConfig) -> StoreResult<Self> {
        fs::create_dir_all(cfg.root.join(OBJECTS_DIR))?;
        Ok(Self {
            root: cfg.root,
            alg: cfg.alg,
            guard: RwLock::new(()),
            tmp_counter: AtomicU64::new(0),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, digest: &Digest) -> PathBuf {
        let hex = digest.hex();
        self.root
            .join(OBJECTS_DIR)
            .join(digest.alg.as_str())
            .join(&hex[..2])
            .join(&hex[2..])
    }

    /// Reconstruct a digest from an object path, relative to `objects/`.
    fn digest_from_path(rel: &Path) -> StoreResult<Digest> {
        let parts: Vec<&str> = rel
            .iter()
            .map(|c| c.to_str().unwrap_or(""))
            .collect();
        let &[alg, prefix, rest] = parts.as_slice() else {
            return Err(StoreError::Corrupt(format!(
                "unexpected object path: {}",
                rel.display()
            )));
        };
        let alg = HashAlg::parse(alg)
            .map_err(|_| StoreError::Corrupt(format!("unknown algorithm directory: {alg}")))?;
        let hex = format!("{prefix}{rest}");
        Digest::from_hex(alg, &hex)
            .map_err(|_| StoreError::Corrupt(format!("invalid object name: {}", rel.display())))
    }

    /// Remove every object whose digest is not in `live`. Returns the number
    /// of objects removed.
    pub fn gc(&self, live: &BTreeSet<Digest>) -> StoreResult<u64> {
        let _exclusive = self.guard.write();
        let objects_root = self.root.join(OBJECTS_DIR);
        let mut removed = 0u64;

        for entry in WalkDir::new(&objects_root).follow_links(false) {
            let entry = entry.map_err(|e| StoreError::Corrupt(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            // Stale temp files from a crashed writer are swept, not kept.
            let name = entry.file_name().to_string_lossy();
            if name.starts_with(".tmp-") {
                fs::remove_file(entry.path())?;
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&objects_root)
                .map_err(|e| StoreError::Corrupt(e.to_string()))?;
            let digest = Self::digest_from_path(rel)?;
            if !live.contains(&digest) {
                fs::remove_file(entry.path())?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub fn stats(&self) -> StoreResult<StoreStats> {
        let objects_root = self.root.join(OBJECTS_DIR);
        let mut objects = 0u64;
        let mut total_bytes = 0u64;
        for entry in WalkDir::new(&objects_root).follow_links(false) {
            let entry = entry.map_err(|e| StoreError::Corrupt(e.to_string()))?;
            if entry.file_type().is_file()
                && !entry.file_name().to_string_lossy().starts_with(".tmp-")
            {
                objects += 1;
                total_bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
            }
        }
        Ok(StoreStats {
            objects,
            total_bytes,
        })
    }
}

impl ContentStore for FsStore {
    fn put(&self, bytes: &[u8]) -> SigilResult<Digest> {
        let _shared = self.guard.read();
        let digest = blob_digest(self.alg, bytes);
        let path = self.object_path(&digest);

        if path.exists() {
            return Ok(digest);
        }

        let parent = path
            .parent()
            .ok_or_else(|| SigilError::storage("object path has no parent"))?;
        fs::create_dir_all(parent).map_err(|e| SigilError::storage(e.to_string()))?;

        let tmp = parent.join(format!(
            ".tmp-{}-{}",
            std::process::id(),
            self.tmp_counter.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&tmp, bytes).map_err(|e| SigilError::storage(e.to_string()))?;
        match fs::rename(&tmp, &path) {
            Ok(()) => {}
            Err(e) => {
                let _ = fs::remove_file(&tmp);
                // A concurrent writer of the same content may have won the
                // rename; the stored bytes are identical either way.
                if !path.exists() {
                    return Err(SigilError::storage(e.to_string()));
                }
            }
        }
        Ok(digest)
    }

    fn get(&self, digest: &Digest) -> SigilResult<Bytes> {
        match fs::read(self.object_path(digest)) {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(SigilError::not_found(digest.to_string()))
            }
            Err(e) => Err(SigilError::storage(e.to_string())),
        }
    }
}
