use clap::Parser;
use sigil_core::SigilError;

mod args;
mod cmd;
mod io;
mod output;

fn main() {
    let cli = args::Cli::parse();
    output::init(cli.json);

    match cmd::dispatch(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            output::eprintln_line(&format!("error: {err:#}"));
            std::process::exit(exit_code(&err));
        }
    }
}

/// Distinct exit codes per error kind, so scripts can branch without
/// parsing diagnostics.
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<SigilError>() {
        Some(SigilError::MalformedInput(_)) => 2,
        Some(SigilError::NotFound { .. }) => 3,
        Some(SigilError::Decode(_)) => 4,
        Some(SigilError::ChecksumMismatch { .. }) => 5,
        Some(SigilError::UnsupportedVersion(_)) => 6,
        Some(SigilError::Storage(_)) => 7,
        _ => 1,
    }
}
