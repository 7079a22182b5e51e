//! The glyph alphabet and base-111 transport coding.
//!
//! The output alphabet is a frozen enumeration of 111 symbols, fixed for the
//! process lifetime:
//! - ordinals 0..=9: the ASCII digits
//! - ordinals 10..=35: `A`..`Z`
//! - ordinals 36..=61: `a`..`z`
//! - ordinals 62..=110: 49 runic letters, U+16A0..U+16D0
//!
//! Wire bytes are carried as base-111 digit groups:
//! - each 2-byte group (0..=65535) becomes 3 digits
//! - a final odd byte (0..=255) becomes 2 digits
//!
//! The digit count itself frames the byte length: `len % 3 == 0` means an
//! even byte count, `len % 3 == 2` means a trailing odd byte, and
//! `len % 3 == 1` can never be produced, so it is rejected. No escape or
//! continuation ordinal is required. Digit groups above the byte range
//! (triples > 65535, pairs > 255) are likewise rejected, which catches many
//! transcription errors before the checksum does.

use crate::canonical::CanonicalForm;
use crate::errors::{SigilError, SigilResult};
use crate::wire;

/// Number of symbols in the alphabet.
pub const ALPHABET_LEN: usize = 111;

/// Largest valid glyph ordinal.
pub const MAX_ORDINAL: u8 = (ALPHABET_LEN - 1) as u8;

const RADIX: u32 = ALPHABET_LEN as u32;
const RADIX_SQ: u32 = RADIX * RADIX;

/// First code point of the runic tail of the alphabet.
const RUNIC_BASE: u32 = 0x16A0;

/// Symbol for an ordinal, or `None` when the ordinal is out of range.
pub fn symbol_for(ordinal: u8) -> Option<char> {
    match ordinal {
        0..=9 => char::from_u32('0' as u32 + u32::from(ordinal)),
        10..=35 => char::from_u32('A' as u32 + u32::from(ordinal) - 10),
        36..=61 => char::from_u32('a' as u32 + u32::from(ordinal) - 36),
        62..=MAX_ORDINAL => char::from_u32(RUNIC_BASE + u32::from(ordinal) - 62),
        _ => None,
    }
}

/// Ordinal for a symbol, or `None` when the character is not in the alphabet.
pub fn ordinal_for(symbol: char) -> Option<u8> {
    let cp = symbol as u32;
    match symbol {
        '0'..='9' => Some((cp - '0' as u32) as u8),
        'A'..='Z' => Some((cp - 'A' as u32 + 10) as u8),
        'a'..='z' => Some((cp - 'a' as u32 + 36) as u8),
        _ if (RUNIC_BASE..RUNIC_BASE + 49).contains(&cp) => Some((cp - RUNIC_BASE + 62) as u8),
        _ => None,
    }
}

/// An ordered sequence of glyph ordinals.
///
/// Invariant: every ordinal is `<= MAX_ORDINAL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphSequence {
    ordinals: Vec<u8>,
}

impl GlyphSequence {
    /// Build a sequence from raw ordinals, rejecting out-of-range values.
    pub fn from_ordinals(ordinals: Vec<u8>) -> SigilResult<Self> {
        for &o in &ordinals {
            if o > MAX_ORDINAL {
                return Err(SigilError::decode(format!(
                    "glyph ordinal out of range: {o}"
                )));
            }
        }
        Ok(Self { ordinals })
    }

    pub fn ordinals(&self) -> &[u8] {
        &self.ordinals
    }

    pub fn len(&self) -> usize {
        self.ordinals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordinals.is_empty()
    }

    /// Render the sequence with the alphabet symbols (display form).
    pub fn symbols(&self) -> String {
        // Always `Some` by the ordinal invariant.
        self.ordinals.iter().filter_map(|&o| symbol_for(o)).collect()
    }
}

/// Encode a canonical form into a glyph sequence.
pub fn encode(form: &CanonicalForm) -> SigilResult<GlyphSequence> {
    let bytes = wire::encode(form)?;
    Ok(encode_payload(&bytes))
}

/// Decode a glyph sequence back into a canonical form.
pub fn decode(seq: &GlyphSequence) -> SigilResult<CanonicalForm> {
    let bytes = decode_payload(seq)?;
    wire::decode(&bytes)
}

/// Base-111 group coding of raw bytes.
pub fn encode_payload(bytes: &[u8]) -> GlyphSequence {
    let mut ordinals = Vec::with_capacity(bytes.len() / 2 * 3 + 2);
    for chunk in bytes.chunks(2) {
        if chunk.len() == 2 {
            let v = (u32::from(chunk[0]) << 8) | u32::from(chunk[1]);
            ordinals.push((v / RADIX_SQ) as u8);
            ordinals.push(((v / RADIX) % RADIX) as u8);
            ordinals.push((v % RADIX) as u8);
        } else {
            let v = u32::from(chunk[0]);
            ordinals.push((v / RADIX) as u8);
            ordinals.push((v % RADIX) as u8);
        }
    }
    GlyphSequence { ordinals }
}

/// Inverse of [`encode_payload`].
pub fn decode_payload(seq: &GlyphSequence) -> SigilResult<Vec<u8>> {
    let ords = &seq.ordinals;
    if ords.len() % 3 == 1 {
        return Err(SigilError::decode("truncated glyph sequence"));
    }
    let has_tail = ords.len() % 3 == 2;
    let triples = ords.len() - if has_tail { 2 } else { 0 };

    let mut bytes = Vec::with_capacity(triples / 3 * 2 + 1);
    for group in ords[..triples].chunks_exact(3) {
        let v = u32::from(group[0]) * RADIX_SQ
            + u32::from(group[1]) * RADIX
            + u32::from(group[2]);
        if v > 0xFFFF {
            return Err(SigilError::decode(format!(
                "glyph group exceeds byte range: {v}"
            )));
        }
        bytes.push((v >> 8) as u8);
        bytes.push((v & 0xFF) as u8);
    }
    if has_tail {
        let v = u32::from(ords[triples]) * RADIX + u32::from(ords[triples + 1]);
        if v > 0xFF {
            return Err(SigilError::decode(format!(
                "glyph group exceeds byte range: {v}"
            )));
        }
        bytes.push(v as u8);
    }
    Ok(bytes)
}
