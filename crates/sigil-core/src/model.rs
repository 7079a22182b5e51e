//! The SIGIL system description model.
//!
//! A system description is an ordered tree of nodes. The node kinds form a
//! closed tagged variant so every stage of the pipeline handles all of them
//! exhaustively:
//! - `Scalar`: text, number, or bool
//! - `Mapping`: named children, names unique
//! - `Sequence`: ordered children
//! - `Blob`: raw bytes of arbitrary size
//! - `ContentRef`: a digest + length standing in for hoisted blob bytes
//!
//! `Blob` appears only in caller-supplied descriptions; canonicalization
//! replaces it with `ContentRef`. Rehydration goes the other way.
//!
//! JSON bridging uses two reserved object spellings:
//! - `{"$blob": "<hex>"}` embeds blob bytes in a JSON description
//! - `{"$ref": {"digest": "<alg>:<hex>", "length": n}}` is a content ref
//!
//! Ordinary mappings may not use `$blob` or `$ref` as keys.

use bytes::Bytes;

use crate::digest::Digest;
use crate::errors::{SigilError, SigilResult};

/// Largest integer magnitude accepted from JSON numbers.
///
/// Numbers are modeled as `f64`; integers beyond 2^53 cannot round-trip and
/// are rejected rather than silently truncated.
pub const MAX_SAFE_INTEGER: i64 = 1 << 53;

/// A scalar leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(f64),
    Bool(bool),
}

/// A reference to blob bytes held by the content store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentRef {
    pub digest: Digest,
    pub length: u64,
}

/// One node of a system description tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    Mapping(Vec<(String, Node)>),
    Sequence(Vec<Node>),
    Blob(Bytes),
    ContentRef(ContentRef),
}

impl Node {
    /// Stable kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Scalar(Scalar::Text(_)) => "text",
            Node::Scalar(Scalar::Number(_)) => "number",
            Node::Scalar(Scalar::Bool(_)) => "bool",
            Node::Mapping(_) => "mapping",
            Node::Sequence(_) => "sequence",
            Node::Blob(_) => "blob",
            Node::ContentRef(_) => "content-ref",
        }
    }

    /// Collect every content ref in the tree, depth-first.
    pub fn content_refs(&self) -> Vec<ContentRef> {
        let mut out = Vec::new();
        collect_refs(self, &mut out);
        out
    }
}

fn collect_refs(node: &Node, out: &mut Vec<ContentRef>) {
    match node {
        Node::Scalar(_) | Node::Blob(_) => {}
        Node::ContentRef(r) => out.push(*r),
        Node::Mapping(entries) => {
            for (_, v) in entries {
                collect_refs(v, out);
            }
        }
        Node::Sequence(items) => {
            for v in items {
                collect_refs(v, out);
            }
        }
    }
}

/// Convert a JSON value into a description tree.
///
/// `null` is rejected: scalars are text, number, or bool only.
pub fn from_json_value(v: &serde_json::Value) -> SigilResult<Node> {
    use serde_json::Value;

    match v {
        Value::Null => Err(SigilError::malformed_input(
            "null is not a supported scalar",
        )),
        Value::Bool(b) => Ok(Node::Scalar(Scalar::Bool(*b))),
        Value::String(s) => Ok(Node::Scalar(Scalar::Text(s.clone()))),
        Value::Number(n) => Ok(Node::Scalar(Scalar::Number(number_from_json(n)?))),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(from_json_value(item)?);
            }
            Ok(Node::Sequence(out))
        }
        Value::Object(map) => {
            if map.contains_key("$blob") {
                return blob_from_json(map);
            }
            if map.contains_key("$ref") {
                return ref_from_json(map);
            }
            let mut entries = Vec::with_capacity(map.len());
            for (k, v) in map {
                entries.push((k.clone(), from_json_value(v)?));
            }
            Ok(Node::Mapping(entries))
        }
    }
}

fn number_from_json(n: &serde_json::Number) -> SigilResult<f64> {
    if let Some(i) = n.as_i64() {
        if !(-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&i) {
            return Err(SigilError::malformed_input(format!(
                "integer {i} cannot be represented exactly"
            )));
        }
        return Ok(i as f64);
    }
    if let Some(u) = n.as_u64() {
        if u > MAX_SAFE_INTEGER as u64 {
            return Err(SigilError::malformed_input(format!(
                "integer {u} cannot be represented exactly"
            )));
        }
        return Ok(u as f64);
    }
    n.as_f64()
        .ok_or_else(|| SigilError::malformed_input(format!("unrepresentable number: {n}")))
}

fn blob_from_json(map: &serde_json::Map<String, serde_json::Value>) -> SigilResult<Node> {
    if map.len() != 1 {
        return Err(SigilError::malformed_input(
            "$blob must be the only key of its object",
        ));
    }
    let hex_str = map
        .get("$blob")
        .and_then(|v| v.as_str())
        .ok_or_else(|| SigilError::malformed_input("$blob value must be a hex string"))?;
    let raw = hex::decode(hex_str)
        .map_err(|_| SigilError::malformed_input(format!("invalid $blob hex: {hex_str}")))?;
    Ok(Node::Blob(Bytes::from(raw)))
}

fn ref_from_json(map: &serde_json::Map<String, serde_json::Value>) -> SigilResult<Node> {
    if map.len() != 1 {
        return Err(SigilError::malformed_input(
            "$ref must be the only key of its object",
        ));
    }
    let obj = map
        .get("$ref")
        .and_then(|v| v.as_object())
        .ok_or_else(|| SigilError::malformed_input("$ref value must be an object"))?;
    let digest_str = obj
        .get("digest")
        .and_then(|v| v.as_str())
        .ok_or_else(|| SigilError::malformed_input("$ref.digest must be a string"))?;
    let digest = Digest::parse(digest_str)
        .map_err(|e| SigilError::malformed_input(format!("invalid $ref.digest: {e}")))?;
    let length = obj
        .get("length")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| SigilError::malformed_input("$ref.length must be a non-negative integer"))?;
    Ok(Node::ContentRef(ContentRef { digest, length }))
}

/// Convert a description tree into a JSON value.
///
/// Inverse of [`from_json_value`] for every tree it can produce.
pub fn to_json_value(node: &Node) -> SigilResult<serde_json::Value> {
    use serde_json::{json, Value};

    match node {
        Node::Scalar(Scalar::Text(s)) => Ok(Value::String(s.clone())),
        Node::Scalar(Scalar::Bool(b)) => Ok(Value::Bool(*b)),
        Node::Scalar(Scalar::Number(n)) => number_to_json(*n),
        Node::Sequence(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(to_json_value(item)?);
            }
            Ok(Value::Array(out))
        }
        Node::Mapping(entries) => {
            let mut map = serde_json::Map::with_capacity(entries.len());
            for (k, v) in entries {
                if k == "$blob" || k == "$ref" {
                    return Err(SigilError::malformed_input(format!(
                        "mapping key {k} is reserved"
                    )));
                }
                map.insert(k.clone(), to_json_value(v)?);
            }
            Ok(Value::Object(map))
        }
        Node::Blob(bytes) => Ok(json!({ "$blob": hex::encode(bytes) })),
        Node::ContentRef(r) => Ok(json!({
            "$ref": { "digest": r.digest.to_string(), "length": r.length }
        })),
    }
}

fn number_to_json(n: f64) -> SigilResult<serde_json::Value> {
    if !n.is_finite() {
        return Err(SigilError::malformed_input(
            "non-finite number in description",
        ));
    }
    // Integral values are emitted as JSON integers so the textual form stays
    // free of a spurious trailing ".0".
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER as f64 {
        return Ok(serde_json::Value::from(n as i64));
    }
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .ok_or_else(|| SigilError::malformed_input("unrepresentable number in description"))
}
