use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cmd::resolve_sigil_arg;
use crate::io::export;
use crate::output;

#[derive(Debug, Serialize)]
pub struct RehydrateOut {
    pub output: String,
    pub wrote: String,
}

pub fn run(store_root: &str, sigil_arg: &str, output_path: &str) -> Result<i32> {
    let sigil = resolve_sigil_arg(sigil_arg)?;

    let store_cfg = sigil_store::StoreConfig::local_dev(PathBuf::from(store_root))?;
    let store = sigil_store::FsStore::open(store_cfg)?;

    let desc = sigil_core::api::rehydrate(&sigil, &store).context("rehydrate")?;
    let wrote = export::materialize(&desc, Path::new(output_path))?;

    output::print(&RehydrateOut {
        output: output_path.to_string(),
        wrote: wrote.as_str().to_string(),
    })?;
    Ok(0)
}
