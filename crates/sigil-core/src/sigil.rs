//! Sigil string assembly and parsing.
//!
//! The externally visible form of a glyph sequence is a dash-grouped string:
//!
//! ```text
//! v1-017-042-110-...-3f9a1c20
//! ```
//!
//! - the leading group is the version tag
//! - each glyph is a zero-padded 3-digit decimal ordinal (000..=110)
//! - the trailing group is an 8-hex-char checksum over the glyph ordinals
//!
//! The checksum detects transcription errors; it is not a cryptographic
//! guarantee. Content addressability comes from the digests inside the
//! encoded canonical form, not from this field.

use itertools::Itertools;

use crate::digest::{hash_with_domain, HashAlg};
use crate::errors::{SigilError, SigilResult};
use crate::glyph::{GlyphSequence, MAX_ORDINAL};
use crate::version::SigilVersion;

/// Width of one rendered glyph group.
pub const GLYPH_GROUP_WIDTH: usize = 3;

/// Width of the rendered checksum group.
pub const CHECKSUM_WIDTH: usize = 8;

/// Render a glyph sequence as a sigil string.
pub fn assemble(seq: &GlyphSequence, version: SigilVersion) -> String {
    std::iter::once(version.as_str().to_string())
        .chain(seq.ordinals().iter().map(|o| format!("{o:03}")))
        .chain(std::iter::once(checksum_hex(seq)))
        .join("-")
}

/// Parse a sigil string back into its version and glyph sequence.
///
/// Fails with:
/// - `UnsupportedVersion` for an unknown version tag
/// - `Decode` for malformed groups
/// - `ChecksumMismatch` when the recomputed checksum disagrees
pub fn parse(s: &str) -> SigilResult<(SigilVersion, GlyphSequence)> {
    let parts: Vec<&str> = s.split('-').collect();
    if parts.len() < 2 {
        return Err(SigilError::decode(
            "sigil must contain a version tag and a checksum",
        ));
    }

    let version = SigilVersion::parse(parts[0])?;

    let expected = parts[parts.len() - 1];
    if expected.len() != CHECKSUM_WIDTH
        || !expected.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    {
        return Err(SigilError::decode(format!(
            "malformed checksum group: {expected}"
        )));
    }

    let mut ordinals = Vec::with_capacity(parts.len() - 2);
    for group in &parts[1..parts.len() - 1] {
        if group.len() != GLYPH_GROUP_WIDTH || !group.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SigilError::decode(format!(
                "malformed glyph group: {group}"
            )));
        }
        let value: u16 = group
            .parse()
            .map_err(|_| SigilError::decode(format!("malformed glyph group: {group}")))?;
        if value > u16::from(MAX_ORDINAL) {
            return Err(SigilError::decode(format!(
                "glyph ordinal out of range: {group}"
            )));
        }
        ordinals.push(value as u8);
    }

    let seq = GlyphSequence::from_ordinals(ordinals)?;
    let computed = checksum_hex(&seq);
    if computed != expected {
        return Err(SigilError::ChecksumMismatch {
            expected: expected.to_string(),
            computed,
        });
    }

    Ok((version, seq))
}

/// Lowercase hex checksum over the glyph ordinals.
///
/// First 4 bytes of the domain-separated SHA-256 of the ordinal bytes.
pub fn checksum_hex(seq: &GlyphSequence) -> String {
    let h = hash_with_domain(HashAlg::Sha256, crate::domain::CHECKSUM, seq.ordinals());
    hex::encode(&h[..CHECKSUM_WIDTH / 2])
}
