//! Property tests for the identity laws, run against a real store.
//!
//! - canonicalization is idempotent
//! - glyph decode inverts glyph encode exactly
//! - a rehydrated system recomputes to the same sigil
//! - mapping entry order never changes the sigil

use bytes::Bytes;
use proptest::prelude::*;

use sigil_core::canonical::canonicalize;
use sigil_core::config::CanonicalizeOptions;
use sigil_core::glyph;
use sigil_core::model::{Node, Scalar};
use sigil_core::prelude::{compute_sigil, rehydrate};
use sigil_core::store::ContentStore;
use sigil_store::MemoryStore;

fn scalar_strategy() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        any::<bool>().prop_map(Scalar::Bool),
        "[a-z0-9 ]{0,12}".prop_map(Scalar::Text),
        (-1_000_000i64..1_000_000).prop_map(|i| Scalar::Number(i as f64)),
        (any::<i32>(), 1u32..1000).prop_map(|(n, d)| Scalar::Number(f64::from(n) / f64::from(d))),
    ]
}

fn node_strategy() -> impl Strategy<Value = Node> {
    let leaf = prop_oneof![
        scalar_strategy().prop_map(Node::Scalar),
        prop::collection::vec(any::<u8>(), 0..48).prop_map(|b| Node::Blob(Bytes::from(b))),
    ];
    leaf.prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Node::Sequence),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                .prop_map(|m| Node::Mapping(m.into_iter().collect())),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn canonicalize_is_idempotent(desc in node_strategy()) {
        let store = MemoryStore::new();
        let opts = CanonicalizeOptions::default();
        let once = canonicalize(&desc, &store, &opts).unwrap();
        let twice = canonicalize(once.node(), &store, &opts).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn glyph_decode_inverts_encode(desc in node_strategy()) {
        let store = MemoryStore::new();
        let form = canonicalize(&desc, &store, &CanonicalizeOptions::default()).unwrap();
        let seq = glyph::encode(&form).unwrap();
        prop_assert_eq!(glyph::decode(&seq).unwrap(), form);
    }

    #[test]
    fn rehydration_preserves_identity(desc in node_strategy()) {
        let store = MemoryStore::new();
        let opts = CanonicalizeOptions::default();
        let s1 = compute_sigil(&desc, &store, &opts).unwrap();
        let restored = rehydrate(&s1, &store).unwrap();
        let s2 = compute_sigil(&restored, &store, &opts).unwrap();
        prop_assert_eq!(s1, s2);
    }

    #[test]
    fn mapping_order_is_irrelevant(entries in prop::collection::btree_map(
        "[a-z]{1,6}",
        scalar_strategy().prop_map(Node::Scalar),
        1..8,
    )) {
        let store = MemoryStore::new();
        let opts = CanonicalizeOptions::default();

        let forward: Vec<(String, Node)> = entries.clone().into_iter().collect();
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = compute_sigil(&Node::Mapping(forward), &store, &opts).unwrap();
        let b = compute_sigil(&Node::Mapping(reversed), &store, &opts).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn distinct_payloads_get_distinct_digests(a in prop::collection::vec(any::<u8>(), 0..64),
                                              b in prop::collection::vec(any::<u8>(), 0..64)) {
        prop_assume!(a != b);
        let store = MemoryStore::new();
        let da = store.put(&a).unwrap();
        let db = store.put(&b).unwrap();
        prop_assert_ne!(da, db);
    }
}
