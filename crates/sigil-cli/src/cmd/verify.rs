use anyhow::{Context, Result};
use serde::Serialize;

use crate::cmd::resolve_sigil_arg;
use crate::io::ingest::{self, IngestOptions};
use crate::output;

#[derive(Debug, Serialize)]
pub struct VerifyOut {
    pub ok: bool,
}

pub fn run(input: &str, sigil_arg: &str) -> Result<i32> {
    let reference = resolve_sigil_arg(sigil_arg)?;
    let (desc, _stats) = ingest::load_input(input, &IngestOptions::default())?;

    // Verification only needs digests, never stored payloads.
    let store = sigil_core::store::DigestOnly::default();
    let opts = sigil_core::config::CanonicalizeOptions::default();
    let ok = sigil_core::api::verify_identity(&desc, &reference, &store, &opts)
        .context("verify")?;

    output::print(&VerifyOut { ok })?;
    Ok(if ok { 0 } else { 1 })
}
