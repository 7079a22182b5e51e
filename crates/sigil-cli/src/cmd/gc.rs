use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cmd::resolve_sigil_arg;
use crate::output;

#[derive(Debug, Serialize)]
pub struct GcOut {
    pub kept_sigils: usize,
    pub live_objects: usize,
    pub removed: u64,
}

pub fn run(store_root: &str, keep: &[String]) -> Result<i32> {
    // Live set: every content ref reachable from a kept sigil. The sigils
    // alone are enough; no payload reads are required to enumerate refs.
    let mut live = BTreeSet::new();
    for arg in keep {
        let sigil = resolve_sigil_arg(arg)?;
        let (_, seq) = sigil_core::sigil::parse(&sigil).context("parse kept sigil")?;
        let form = sigil_core::glyph::decode(&seq).context("decode kept sigil")?;
        for r in form.node().content_refs() {
            live.insert(r.digest);
        }
    }

    let store_cfg = sigil_store::StoreConfig::local_dev(PathBuf::from(store_root))?;
    let store = sigil_store::FsStore::open(store_cfg)?;
    let removed = store.gc(&live).map_err(sigil_core::SigilError::from)?;

    output::print(&GcOut {
        kept_sigils: keep.len(),
        live_objects: live.len(),
        removed,
    })?;
    Ok(0)
}
