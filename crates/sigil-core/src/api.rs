//! High-level identity entry points.
//!
//! These are the three operations the CLI (and any other host) calls:
//! - `compute_sigil`: description -> canonical form -> glyphs -> sigil string
//! - `rehydrate`: sigil string -> canonical form -> description, with blob
//!   bytes fetched back out of the content store
//! - `verify_identity`: recompute and compare against a reference sigil
//!
//! All three are deterministic given their inputs; the content store is the
//! only shared state they touch.

use crate::canonical::canonicalize;
use crate::config::CanonicalizeOptions;
use crate::errors::{SigilError, SigilResult};
use crate::glyph;
use crate::model::Node;
use crate::sigil;
use crate::store::ContentStore;
use crate::version::SigilVersion;

/// Derive the identity sigil for a system description.
///
/// Side effect: blob payloads are written into the content store (idempotent
/// per digest).
pub fn compute_sigil(
    desc: &Node,
    store: &dyn ContentStore,
    opts: &CanonicalizeOptions,
) -> SigilResult<String> {
    let form = canonicalize(desc, store, opts)?;
    let seq = glyph::encode(&form)?;
    Ok(sigil::assemble(&seq, SigilVersion::V1))
}

/// Reconstruct a system description from a sigil.
///
/// Structural and scalar content comes from the sigil itself; blob bytes are
/// fetched from the content store by digest. Fails with `NotFound` when the
/// store no longer holds a referenced payload.
pub fn rehydrate(sigil_str: &str, store: &dyn ContentStore) -> SigilResult<Node> {
    let (version, seq) = sigil::parse(sigil_str)?;
    match version {
        SigilVersion::V1 => {}
    }
    let form = glyph::decode(&seq)?;
    resolve(form.into_node(), store)
}

fn resolve(node: Node, store: &dyn ContentStore) -> SigilResult<Node> {
    match node {
        Node::ContentRef(r) => {
            let bytes = store.get(&r.digest)?;
            if bytes.len() as u64 != r.length {
                return Err(SigilError::storage(format!(
                    "stored object length mismatch for {}: expected {}, got {}",
                    r.digest,
                    r.length,
                    bytes.len()
                )));
            }
            Ok(Node::Blob(bytes))
        }
        Node::Mapping(entries) => {
            let mut out = Vec::with_capacity(entries.len());
            for (k, v) in entries {
                out.push((k, resolve(v, store)?));
            }
            Ok(Node::Mapping(out))
        }
        Node::Sequence(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(resolve(item, store)?);
            }
            Ok(Node::Sequence(out))
        }
        other @ (Node::Scalar(_) | Node::Blob(_)) => Ok(other),
    }
}

/// Check a system description against a reference sigil.
///
/// The reference is parsed and checksum-validated first, so corrupt input
/// still raises; a genuine mismatch is an ordinary `Ok(false)`.
pub fn verify_identity(
    desc: &Node,
    reference: &str,
    store: &dyn ContentStore,
    opts: &CanonicalizeOptions,
) -> SigilResult<bool> {
    let (version, _seq) = sigil::parse(reference)?;
    match version {
        SigilVersion::V1 => {}
    }
    let computed = compute_sigil(desc, store, opts)?;
    Ok(computed == reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::{blob_digest, HashAlg};
    use crate::model::Scalar;
    use crate::store::testing::TestStore;
    use crate::store::DigestOnly;
    use assert_matches::assert_matches;
    use bytes::Bytes;

    fn opts() -> CanonicalizeOptions {
        CanonicalizeOptions::default()
    }

    fn num(n: f64) -> Node {
        Node::Scalar(Scalar::Number(n))
    }

    #[test]
    fn key_order_does_not_change_the_sigil() {
        let store = DigestOnly::default();
        let a = Node::Mapping(vec![
            ("a".to_string(), num(1.0)),
            ("b".to_string(), num(2.0)),
        ]);
        let b = Node::Mapping(vec![
            ("b".to_string(), num(2.0)),
            ("a".to_string(), num(1.0)),
        ]);
        assert_eq!(
            compute_sigil(&a, &store, &opts()).unwrap(),
            compute_sigil(&b, &store, &opts()).unwrap()
        );
    }

    #[test]
    fn any_edit_changes_the_sigil() {
        let store = DigestOnly::default();
        let base = Node::Mapping(vec![
            ("a".to_string(), num(1.0)),
            ("b".to_string(), num(2.0)),
        ]);
        let base_sigil = compute_sigil(&base, &store, &opts()).unwrap();

        let edits = [
            Node::Mapping(vec![
                ("a".to_string(), num(1.0)),
                ("b".to_string(), num(3.0)),
            ]),
            Node::Mapping(vec![("a".to_string(), num(1.0))]),
            Node::Mapping(vec![
                ("a".to_string(), num(1.0)),
                ("b".to_string(), num(2.0)),
                ("c".to_string(), num(2.0)),
            ]),
            Node::Mapping(vec![
                ("a".to_string(), Node::Blob(Bytes::from_static(b"hellp"))),
                ("b".to_string(), num(2.0)),
            ]),
        ];
        for edit in &edits {
            assert_ne!(
                compute_sigil(edit, &store, &opts()).unwrap(),
                base_sigil
            );
        }
    }

    #[test]
    fn blob_roundtrip_through_store() {
        let store = TestStore::new();
        let desc = Node::Mapping(vec![(
            "file".to_string(),
            Node::Blob(Bytes::from_static(b"hello")),
        )]);

        let s1 = compute_sigil(&desc, &store, &opts()).unwrap();
        let restored = rehydrate(&s1, &store).unwrap();
        assert_eq!(restored, desc);

        let s2 = compute_sigil(&restored, &store, &opts()).unwrap();
        assert_eq!(s1, s2);

        let d = blob_digest(HashAlg::Sha256, b"hello");
        assert_eq!(&store.get(&d).unwrap()[..], b"hello");
    }

    #[test]
    fn rehydrate_missing_blob_is_not_found() {
        let writer = TestStore::new();
        let desc = Node::Blob(Bytes::from_static(b"hello"));
        let s = compute_sigil(&desc, &writer, &opts()).unwrap();

        // A store that never kept the payload.
        let empty = DigestOnly::default();
        assert_matches!(rehydrate(&s, &empty), Err(SigilError::NotFound { .. }));
    }

    #[test]
    fn verify_matches_and_mismatches() {
        let store = DigestOnly::default();
        let desc = Node::Mapping(vec![(
            "file".to_string(),
            Node::Blob(Bytes::from_static(b"hello")),
        )]);
        let s = compute_sigil(&desc, &store, &opts()).unwrap();
        assert!(verify_identity(&desc, &s, &store, &opts()).unwrap());

        let off_by_one = Node::Mapping(vec![(
            "file".to_string(),
            Node::Blob(Bytes::from_static(b"hellp")),
        )]);
        assert!(!verify_identity(&off_by_one, &s, &store, &opts()).unwrap());
    }

    #[test]
    fn verify_still_raises_on_corrupt_reference() {
        let store = DigestOnly::default();
        let desc = num(1.0);
        let s = compute_sigil(&desc, &store, &opts()).unwrap();
        let (head, _) = s.rsplit_once('-').unwrap();
        let forged = format!("{head}-00000000");
        assert_matches!(
            verify_identity(&desc, &forged, &store, &opts()),
            Err(SigilError::ChecksumMismatch { .. })
        );
    }

    #[test]
    fn scalar_only_description_needs_no_store_reads() {
        let store = DigestOnly::default();
        let desc = Node::Sequence(vec![
            num(1.5),
            Node::Scalar(Scalar::Text("x".into())),
            Node::Scalar(Scalar::Bool(false)),
        ]);
        let s = compute_sigil(&desc, &store, &opts()).unwrap();
        let restored = rehydrate(&s, &store).unwrap();
        assert_eq!(restored, desc);
    }
}
