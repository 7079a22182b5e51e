//! Wire serialization for canonical forms.
//!
//! A canonical form serializes into a self-describing byte stream:
//! - one tag byte per node kind
//! - LEB128 varints for lengths and counts
//! - length-prefixed UTF-8 for text and mapping keys
//! - canonical decimal ASCII for numbers
//! - a single byte for bools
//! - algorithm tag + 32 digest bytes + varint byte length for content refs
//!
//! Blob nodes never appear on the wire; canonicalization hoists them first.
//!
//! Decoding is strict: truncation, unknown tags, trailing bytes, invalid
//! UTF-8, or a non-canonical number spelling all fail with `Decode`. The
//! decoded tree is then revalidated against the canonical-form invariants,
//! so `decode(encode(f)) == f` holds structurally and every byte stream has
//! at most one canonical form.

use crate::canonical::{canonical_number_text, CanonicalForm};
use crate::digest::{Digest, HashAlg, DIGEST_LEN};
use crate::errors::{SigilError, SigilResult};
use crate::model::{ContentRef, Node, Scalar};

const TAG_TEXT: u8 = 0x01;
const TAG_NUMBER: u8 = 0x02;
const TAG_BOOL: u8 = 0x03;
const TAG_MAPPING: u8 = 0x04;
const TAG_SEQUENCE: u8 = 0x05;
const TAG_CONTENT_REF: u8 = 0x06;

/// Nesting bound while decoding untrusted streams.
const MAX_WIRE_DEPTH: usize = 1024;

/// Serialize a canonical form into its wire bytes.
pub fn encode(form: &CanonicalForm) -> SigilResult<Vec<u8>> {
    let mut out = Vec::new();
    write_node(form.node(), &mut out)?;
    Ok(out)
}

/// Parse wire bytes back into a canonical form.
pub fn decode(bytes: &[u8]) -> SigilResult<CanonicalForm> {
    let mut r = Reader::new(bytes);
    let node = read_node(&mut r, 1)?;
    if r.remaining() != 0 {
        return Err(SigilError::decode(format!(
            "trailing bytes after canonical form ({} left)",
            r.remaining()
        )));
    }
    CanonicalForm::from_node(node)
}

fn write_node(node: &Node, out: &mut Vec<u8>) -> SigilResult<()> {
    match node {
        Node::Scalar(Scalar::Text(s)) => {
            out.push(TAG_TEXT);
            write_varint(s.len() as u64, out);
            out.extend_from_slice(s.as_bytes());
        }
        Node::Scalar(Scalar::Number(n)) => {
            let text = canonical_number_text(*n);
            out.push(TAG_NUMBER);
            write_varint(text.len() as u64, out);
            out.extend_from_slice(text.as_bytes());
        }
        Node::Scalar(Scalar::Bool(b)) => {
            out.push(TAG_BOOL);
            out.push(u8::from(*b));
        }
        Node::Mapping(entries) => {
            out.push(TAG_MAPPING);
            write_varint(entries.len() as u64, out);
            for (k, v) in entries {
                write_varint(k.len() as u64, out);
                out.extend_from_slice(k.as_bytes());
                write_node(v, out)?;
            }
        }
        Node::Sequence(items) => {
            out.push(TAG_SEQUENCE);
            write_varint(items.len() as u64, out);
            for item in items {
                write_node(item, out)?;
            }
        }
        Node::ContentRef(r) => {
            out.push(TAG_CONTENT_REF);
            out.push(r.digest.alg.tag());
            out.extend_from_slice(&r.digest.bytes);
            write_varint(r.length, out);
        }
        Node::Blob(_) => {
            return Err(SigilError::invariant(
                "blob node reached the wire encoder; canonicalize first",
            ));
        }
    }
    Ok(())
}

fn read_node(r: &mut Reader<'_>, depth: usize) -> SigilResult<Node> {
    if depth > MAX_WIRE_DEPTH {
        return Err(SigilError::decode("wire nesting depth exceeds limit"));
    }

    let tag = r.byte()?;
    match tag {
        TAG_TEXT => {
            let s = read_string(r)?;
            Ok(Node::Scalar(Scalar::Text(s)))
        }
        TAG_NUMBER => {
            let text = read_string(r)?;
            let n: f64 = text
                .parse()
                .map_err(|_| SigilError::decode(format!("invalid number spelling: {text}")))?;
            if !n.is_finite() || canonical_number_text(n) != text {
                return Err(SigilError::decode(format!(
                    "non-canonical number spelling: {text}"
                )));
            }
            Ok(Node::Scalar(Scalar::Number(n)))
        }
        TAG_BOOL => match r.byte()? {
            0 => Ok(Node::Scalar(Scalar::Bool(false))),
            1 => Ok(Node::Scalar(Scalar::Bool(true))),
            b => Err(SigilError::decode(format!("invalid bool byte: 0x{b:02x}"))),
        },
        TAG_MAPPING => {
            let count = read_count(r)?;
            let mut entries = Vec::new();
            for _ in 0..count {
                let key = read_string(r)?;
                let value = read_node(r, depth + 1)?;
                entries.push((key, value));
            }
            Ok(Node::Mapping(entries))
        }
        TAG_SEQUENCE => {
            let count = read_count(r)?;
            let mut items = Vec::new();
            for _ in 0..count {
                items.push(read_node(r, depth + 1)?);
            }
            Ok(Node::Sequence(items))
        }
        TAG_CONTENT_REF => {
            let alg = HashAlg::from_tag(r.byte()?)?;
            let raw = r.take(DIGEST_LEN)?;
            let mut bytes = [0u8; DIGEST_LEN];
            bytes.copy_from_slice(raw);
            let length = read_varint(r)?;
            Ok(Node::ContentRef(ContentRef {
                digest: Digest { alg, bytes },
                length,
            }))
        }
        other => Err(SigilError::decode(format!("unknown wire tag: 0x{other:02x}"))),
    }
}

fn read_string(r: &mut Reader<'_>) -> SigilResult<String> {
    let len = read_count(r)?;
    let raw = r.take(len)?;
    String::from_utf8(raw.to_vec())
        .map_err(|_| SigilError::decode("invalid UTF-8 in wire stream"))
}

/// Read a varint that counts items or bytes still to come. Bounding it by
/// the remaining input defeats allocation bombs before they start.
fn read_count(r: &mut Reader<'_>) -> SigilResult<usize> {
    let v = read_varint(r)?;
    let remaining = r.remaining() as u64;
    if v > remaining {
        return Err(SigilError::decode("truncated wire stream"));
    }
    Ok(v as usize)
}

fn write_varint(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let mut b = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            b |= 0x80;
        }
        out.push(b);
        if value == 0 {
            break;
        }
    }
}

fn read_varint(r: &mut Reader<'_>) -> SigilResult<u64> {
    let mut value = 0u64;
    let mut shift = 0u32;
    loop {
        let b = r.byte()?;
        if shift == 63 && (b & 0x7f) > 1 {
            return Err(SigilError::decode("varint overflows 64 bits"));
        }
        value |= u64::from(b & 0x7f) << shift;
        if b & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
        if shift > 63 {
            return Err(SigilError::decode("varint too long"));
        }
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn byte(&mut self) -> SigilResult<u8> {
        if self.pos >= self.buf.len() {
            return Err(SigilError::decode("truncated wire stream"));
        }
        let b = self.buf[self.pos];
        self.pos += 1;
        Ok(b)
    }

    fn take(&mut self, n: usize) -> SigilResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(SigilError::decode("truncated wire stream"));
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }
}
