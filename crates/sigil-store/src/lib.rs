//! sigil-store
//!
//! Content-addressed object storage for SIGIL:
//! - `MemoryStore`: in-process store for tests and ephemeral runs
//! - `FsStore`: digest-keyed filesystem layout with atomic writes and
//!   mark-sweep garbage collection
//!
//! Both implement `sigil_core::store::ContentStore` and key objects by the
//! core's `blob_digest`, so any backend can serve any sigil.

pub mod errors;
pub mod fs;
pub mod memory;

pub use crate::errors::{StoreError, StoreResult};
pub use crate::fs::{FsStore, StoreConfig};
pub use crate::memory::MemoryStore;

/// Aggregate statistics for a store.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoreStats {
    pub objects: u64,
    pub total_bytes: u64,
}

impl StoreStats {
    /// Human-readable size for console output.
    pub fn human_size(&self) -> String {
        bytesize::ByteSize::b(self.total_bytes).to_string()
    }
}
