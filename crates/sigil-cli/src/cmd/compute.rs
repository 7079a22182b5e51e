use std::path::PathBuf;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::io::ingest::{self, IngestOptions};
use crate::output;

#[derive(Debug, Serialize)]
pub struct ComputeOut {
    pub sigil: String,
    pub glyphs: usize,
    pub files: u64,
    pub bytes: u64,
    pub store_root: String,
}

pub fn run(store_root: &str, input: &str, out: Option<&str>) -> Result<i32> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));

    pb.set_message("reading input");
    let (desc, stats) = ingest::load_input(input, &IngestOptions::default())?;

    pb.set_message("opening store");
    let store_cfg = sigil_store::StoreConfig::local_dev(PathBuf::from(store_root))?;
    let store = sigil_store::FsStore::open(store_cfg)?;

    pb.set_message("computing sigil");
    let opts = sigil_core::config::CanonicalizeOptions::default();
    let sigil = sigil_core::api::compute_sigil(&desc, &store, &opts).context("compute")?;
    let glyphs = sigil_core::sigil::parse(&sigil)?.1.len();

    if let Some(path) = out {
        std::fs::write(path, format!("{sigil}\n"))
            .with_context(|| format!("cannot write {path}"))?;
    }

    pb.finish_and_clear();

    output::print(&ComputeOut {
        sigil,
        glyphs,
        files: stats.files,
        bytes: stats.bytes,
        store_root: store_root.to_string(),
    })?;
    Ok(0)
}
