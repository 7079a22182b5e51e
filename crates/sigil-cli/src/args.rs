use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "sigil", version, about = "SIGIL CLI")]
pub struct Cli {
    /// Emit JSON output on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    /// Store root directory (default: .sigil)
    #[arg(long, global = true, default_value = ".sigil")]
    pub store_root: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Derive the identity sigil for a directory, file, or JSON description.
    Compute {
        /// Input path: a directory, a `.json` description, or a single file.
        input: String,

        /// Also write the sigil to this file.
        #[arg(long)]
        out: Option<String>,
    },

    /// Reconstruct a system description from a sigil.
    Rehydrate {
        /// Sigil string, or `@file` to read it from a file.
        sigil: String,

        /// Output path. Blob/mapping trees materialize as directories and
        /// files; anything else is written as a JSON description.
        output: String,
    },

    /// Check a path against a reference sigil. Exits 0 on match, 1 on mismatch.
    Verify {
        input: String,
        /// Sigil string, or `@file` to read it from a file.
        sigil: String,
    },

    /// Remove store objects unreachable from the given sigils.
    Gc {
        /// Sigils whose content must survive collection. May be repeated.
        #[arg(long = "keep")]
        keep: Vec<String>,
    },

    /// Run environment and store checks.
    Doctor,
}
