use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::output;

#[derive(Debug, Serialize)]
pub struct DoctorOut {
    pub store_root: String,
    pub store_writable: bool,
    pub objects: u64,
    pub total_bytes: u64,
    pub total_size: String,
    pub alphabet_ok: bool,
}

pub fn run(store_root: &str) -> Result<i32> {
    let store_cfg = sigil_store::StoreConfig::local_dev(PathBuf::from(store_root))?;
    let store = sigil_store::FsStore::open(store_cfg)?;
    let stats = store.stats().map_err(sigil_core::SigilError::from)?;

    let store_writable = probe_writable(&store);

    // Self-check the frozen alphabet: 111 distinct symbols, ordinal mapping
    // closed under its own inverse.
    let alphabet_ok = (0..sigil_core::glyph::ALPHABET_LEN as u8).all(|o| {
        sigil_core::glyph::symbol_for(o)
            .and_then(sigil_core::glyph::ordinal_for)
            .map(|back| back == o)
            .unwrap_or(false)
    });

    output::print(&DoctorOut {
        store_root: store_root.to_string(),
        store_writable,
        objects: stats.objects,
        total_bytes: stats.total_bytes,
        total_size: stats.human_size(),
        alphabet_ok,
    })?;
    Ok(if alphabet_ok { 0 } else { 1 })
}

fn probe_writable(store: &sigil_store::FsStore) -> bool {
    use sigil_core::store::ContentStore;
    store.put(b"sigil-doctor-probe").is_ok()
}
