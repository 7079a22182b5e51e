//! sigil-core
//!
//! Core primitives for SIGIL:
//! - System description model (scalar/mapping/sequence/blob/content-ref nodes)
//! - Canonicalization into a unique, order-independent normal form
//! - Content digests with domain separation
//! - Wire serialization and base-111 glyph encoding
//! - Sigil string assembly/parsing with a transcription checksum
//! - Identity entry points: `compute_sigil`, `rehydrate`, `verify_identity`
//!
//! The core crate performs no filesystem or network I/O. Content storage is
//! abstracted behind the `ContentStore` trait; backends live in `sigil-store`.

pub mod api;
pub mod canonical;
pub mod config;
pub mod digest;
pub mod errors;
pub mod glyph;
pub mod model;
pub mod sigil;
pub mod store;
pub mod version;
pub mod wire;

pub use crate::errors::{SigilError, SigilResult};

/// Common version strings.
pub const SIGIL_VERSION_V1: &str = "v1";

/// Default domain separation labels.
/// These must remain stable across versions.
pub mod domain {
    pub const BLOB: &str = "sigil.v1.blob";
    pub const CHECKSUM: &str = "sigil.v1.checksum";
}

/// Convenience re-exports.
pub mod prelude {
    pub use crate::api::{compute_sigil, rehydrate, verify_identity};
    pub use crate::canonical::{canonicalize, CanonicalForm};
    pub use crate::config::CanonicalizeOptions;
    pub use crate::digest::{blob_digest, Digest, HashAlg};
    pub use crate::glyph::{decode, encode, GlyphSequence};
    pub use crate::model::{ContentRef, Node, Scalar};
    pub use crate::sigil::{assemble, parse};
    pub use crate::store::{ContentStore, DigestOnly};
    pub use crate::version::SigilVersion;
    pub use crate::{SigilError, SigilResult};
}
