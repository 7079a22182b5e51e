//! Error types for sigil-core.
//!
//! All fallible core operations return `SigilResult`. The taxonomy is
//! deliberately small and stable:
//! - `MalformedInput`: structurally invalid system description
//! - `NotFound`: content store miss during reconstruction
//! - `Decode`: corrupt or truncated glyph/wire data
//! - `ChecksumMismatch`: transcription error in a sigil string
//! - `UnsupportedVersion`: forward-incompatible sigil
//!
//! Nothing is silently recovered. Canonicalization and encoding are exact or
//! they fail loudly; any tolerance here would break the round-trip guarantee.

use thiserror::Error;

pub type SigilResult<T> = Result<T, SigilError>;

#[derive(Debug, Error)]
pub enum SigilError {
    /// Structurally invalid system description (e.g. duplicate mapping keys).
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The content store has no object for a referenced digest.
    #[error("content not found in store: {digest}")]
    NotFound { digest: String },

    /// Corrupt or truncated glyph sequence or wire stream.
    #[error("decode error: {0}")]
    Decode(String),

    /// Transcription error detected in a sigil string.
    #[error("sigil checksum mismatch: expected {expected}, computed {computed}")]
    ChecksumMismatch { expected: String, computed: String },

    /// Unknown sigil version tag.
    #[error("unsupported sigil version: {0}")]
    UnsupportedVersion(String),

    /// Caller supplied an invalid argument or configuration.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Internal invariant violated.
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// Storage backend failure other than a missing object.
    #[error("storage error: {0}")]
    Storage(String),
}

impl SigilError {
    pub fn malformed_input(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    pub fn not_found(digest: impl Into<String>) -> Self {
        Self::NotFound {
            digest: digest.into(),
        }
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn unsupported_version(tag: impl Into<String>) -> Self {
        Self::UnsupportedVersion(tag.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_error_kind() {
        let e = SigilError::malformed_input("duplicate mapping key: a");
        assert!(e.to_string().contains("malformed input"));

        let e = SigilError::not_found("sha256:00");
        assert!(e.to_string().contains("not found"));

        let e = SigilError::decode("truncated");
        assert!(e.to_string().contains("decode error"));
    }

    #[test]
    fn checksum_mismatch_reports_both_values() {
        let e = SigilError::ChecksumMismatch {
            expected: "aaaaaaaa".to_string(),
            computed: "bbbbbbbb".to_string(),
        };
        let s = e.to_string();
        assert!(s.contains("aaaaaaaa"));
        assert!(s.contains("bbbbbbbb"));
    }
}
