use anyhow::Result;

use crate::args::{Cli, Command};

mod compute;
mod doctor;
mod gc;
mod rehydrate;
mod verify;

/// Run the selected command, returning the process exit code.
pub fn dispatch(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Compute { input, out } => compute::run(&cli.store_root, &input, out.as_deref()),
        Command::Rehydrate { sigil, output } => rehydrate::run(&cli.store_root, &sigil, &output),
        Command::Verify { input, sigil } => verify::run(&input, &sigil),
        Command::Gc { keep } => gc::run(&cli.store_root, &keep),
        Command::Doctor => doctor::run(&cli.store_root),
    }
}

/// Resolve a sigil argument: a literal string, or `@file` to read one.
pub(crate) fn resolve_sigil_arg(arg: &str) -> Result<String> {
    if let Some(path) = arg.strip_prefix('@') {
        let raw = std::fs::read_to_string(path)?;
        Ok(raw.trim().to_string())
    } else {
        Ok(arg.trim().to_string())
    }
}
