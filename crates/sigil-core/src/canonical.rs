//! Canonicalization of system descriptions.
//!
//! `canonicalize` maps a possibly-redundant description tree into its unique
//! normal form:
//! - mapping entries sorted by byte-wise key order (duplicates rejected)
//! - sequences kept in caller order (they are semantically ordered)
//! - numbers normalized to a single canonical value
//! - blobs hashed, written to the content store, and replaced by content refs
//!
//! Determinism contract:
//! - two structurally-equal descriptions yield identical canonical forms,
//!   independent of the mapping entry order supplied by the caller
//! - canonicalizing a canonical form is the identity: content refs pass
//!   through untouched and sorting/normalization are stable
//!
//! The only side effect is content store population; `put` on an existing
//! digest is a no-op.

use crate::config::CanonicalizeOptions;
use crate::errors::{SigilError, SigilResult};
use crate::model::{ContentRef, Node, Scalar};
use crate::store::ContentStore;

/// A description tree in canonical form.
///
/// Invariants (checked by [`ensure_canonical`]):
/// - no `Blob` nodes
/// - mapping keys strictly ascending in byte order
/// - numbers finite, with `-0.0` folded into `0.0`
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalForm {
    node: Node,
}

impl CanonicalForm {
    /// Validate an already-normalized tree and wrap it.
    pub fn from_node(node: Node) -> SigilResult<Self> {
        ensure_canonical(&node)?;
        Ok(Self { node })
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn into_node(self) -> Node {
        self.node
    }
}

/// Normalize a description tree into canonical form, hoisting blob bytes
/// into the content store.
pub fn canonicalize(
    desc: &Node,
    store: &dyn ContentStore,
    opts: &CanonicalizeOptions,
) -> SigilResult<CanonicalForm> {
    opts.validate()?;
    let mut nodes = 0usize;
    let node = canonicalize_node(desc, store, opts, 1, &mut nodes)?;
    Ok(CanonicalForm { node })
}

fn canonicalize_node(
    node: &Node,
    store: &dyn ContentStore,
    opts: &CanonicalizeOptions,
    depth: usize,
    nodes: &mut usize,
) -> SigilResult<Node> {
    if depth > opts.max_depth {
        return Err(SigilError::malformed_input(format!(
            "nesting depth exceeds limit ({})",
            opts.max_depth
        )));
    }
    *nodes += 1;
    if *nodes > opts.max_nodes {
        return Err(SigilError::malformed_input(format!(
            "node count exceeds limit ({})",
            opts.max_nodes
        )));
    }

    match node {
        Node::Scalar(Scalar::Text(s)) => Ok(Node::Scalar(Scalar::Text(s.clone()))),
        Node::Scalar(Scalar::Bool(b)) => Ok(Node::Scalar(Scalar::Bool(*b))),
        Node::Scalar(Scalar::Number(n)) => {
            Ok(Node::Scalar(Scalar::Number(normalize_number(*n)?)))
        }
        Node::Sequence(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(canonicalize_node(item, store, opts, depth + 1, nodes)?);
            }
            Ok(Node::Sequence(out))
        }
        Node::Mapping(entries) => {
            let mut out = Vec::with_capacity(entries.len());
            for (k, v) in entries {
                out.push((
                    k.clone(),
                    canonicalize_node(v, store, opts, depth + 1, nodes)?,
                ));
            }
            // String ordering is byte-wise, which is the canonical key order.
            out.sort_by(|a, b| a.0.cmp(&b.0));
            for w in out.windows(2) {
                if w[0].0 == w[1].0 {
                    return Err(SigilError::malformed_input(format!(
                        "duplicate mapping key: {}",
                        w[0].0
                    )));
                }
            }
            Ok(Node::Mapping(out))
        }
        Node::Blob(bytes) => {
            let digest = store.put(bytes)?;
            Ok(Node::ContentRef(ContentRef {
                digest,
                length: bytes.len() as u64,
            }))
        }
        Node::ContentRef(r) => Ok(Node::ContentRef(*r)),
    }
}

/// Normalize a numeric scalar: reject NaN and infinities, fold `-0.0` into
/// `0.0` so semantically-equal values share one representation.
pub fn normalize_number(n: f64) -> SigilResult<f64> {
    if !n.is_finite() {
        return Err(SigilError::malformed_input(
            "non-finite number in description",
        ));
    }
    if n == 0.0 {
        return Ok(0.0);
    }
    Ok(n)
}

/// Canonical decimal text for a normalized number.
///
/// Rust's shortest round-trip formatting yields exactly one spelling per
/// value (no leading zeros, no exponent), and `str::parse::<f64>` recovers
/// the value exactly.
pub fn canonical_number_text(n: f64) -> String {
    format!("{n}")
}

/// Validate the canonical-form invariants of a tree.
///
/// Duplicate mapping keys are `MalformedInput`; every other violation
/// (unsorted keys, blob nodes, non-canonical numbers) is `Decode`, since it
/// can only arise from a corrupt or non-canonical stream.
pub fn ensure_canonical(node: &Node) -> SigilResult<()> {
    match node {
        Node::Scalar(Scalar::Text(_)) | Node::Scalar(Scalar::Bool(_)) => Ok(()),
        Node::Scalar(Scalar::Number(n)) => {
            let normalized = normalize_number(*n)
                .map_err(|_| SigilError::decode("non-finite number in canonical form"))?;
            if normalized.to_bits() != n.to_bits() {
                return Err(SigilError::decode("non-canonical number representation"));
            }
            Ok(())
        }
        Node::Sequence(items) => {
            for item in items {
                ensure_canonical(item)?;
            }
            Ok(())
        }
        Node::Mapping(entries) => {
            for w in entries.windows(2) {
                if w[0].0 == w[1].0 {
                    return Err(SigilError::malformed_input(format!(
                        "duplicate mapping key: {}",
                        w[0].0
                    )));
                }
                if w[0].0 > w[1].0 {
                    return Err(SigilError::decode(
                        "mapping keys not in canonical order",
                    ));
                }
            }
            for (_, v) in entries {
                ensure_canonical(v)?;
            }
            Ok(())
        }
        Node::Blob(_) => Err(SigilError::decode("blob node in canonical form")),
        Node::ContentRef(_) => Ok(()),
    }
}
