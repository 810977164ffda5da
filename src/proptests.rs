use super::*;

use proptest::prelude::*;
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
enum Op {
    Insert(u8, u32),
    InsertKey(u8),
    Delete(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (any::<u8>(), any::<u32>()).prop_map(|(key, payload)| Op::Insert(key, payload)),
        1 => any::<u8>().prop_map(Op::InsertKey),
        3 => any::<u8>().prop_map(Op::Delete),
    ]
}

/// Multiset model: every key maps to the payloads of its entries.
type Model = BTreeMap<u8, Vec<Option<u32>>>;

fn model_len(model: &Model) -> usize {
    model.values().map(Vec::len).sum()
}

fn apply(tree: &mut AvlTree<u8, u32>, model: &mut Model, op: &Op) {
    match *op {
        Op::Insert(key, payload) => {
            tree.insert(key, payload);
            model.entry(key).or_default().push(Some(payload));
        }
        Op::InsertKey(key) => {
            tree.insert_key(key);
            model.entry(key).or_default().push(None);
        }
        Op::Delete(key) => {
            tree.delete(&key);
            if model_len(model) == 1 {
                model.clear();
                return;
            }
            let Some(entries) = model.get_mut(&key) else {
                return;
            };
            // Which of several equal entries goes is up to the tree
            let after: Vec<_> = tree
                .iter()
                .filter(|(k, _)| **k == key)
                .map(|(_, payload)| payload.copied())
                .collect();
            assert_eq!(after.len() + 1, entries.len());
            let mut expected = entries.clone();
            for payload in &after {
                let pos = expected
                    .iter()
                    .position(|p| p == payload)
                    .expect("payload not in model");
                expected.swap_remove(pos);
            }
            assert_eq!(expected.len(), 1);
            *entries = after;
            if entries.is_empty() {
                model.remove(&key);
            }
        }
    }
}

fn validate(tree: &AvlTree<u8, u32>, model: &Model) {
    tree.check_consistency();
    assert_eq!(tree.len(), model_len(model));
    assert_eq!(tree.is_empty(), model.is_empty());

    let expected_keys: Vec<u8> = model
        .iter()
        .flat_map(|(key, entries)| entries.iter().map(move |_| *key))
        .collect();
    let keys: Vec<u8> = tree.keys().copied().collect();
    assert_eq!(keys, expected_keys);

    for (key, entries) in model {
        assert!(tree.contains_key(key));
        if let [payload] = entries.as_slice() {
            assert_eq!(tree.search(key), payload.as_ref());
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn proptest_matches_model(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let mut tree = AvlTree::new();
        let mut model = Model::new();
        for op in &ops {
            apply(&mut tree, &mut model, op);
            validate(&tree, &model);
        }
    }

    #[test]
    fn proptest_unique_keys_search(keys in prop::collection::btree_set(any::<i32>(), 0..300)) {
        let mut tree = AvlTree::new();
        for key in &keys {
            tree.insert(*key, key.wrapping_mul(3));
        }
        tree.check_consistency();
        prop_assert!(tree.height() <= (1.45 * ((keys.len() + 2) as f64).log2()).ceil() as usize);
        for key in &keys {
            prop_assert_eq!(tree.search(key), Some(&key.wrapping_mul(3)));
            prop_assert_eq!(tree.search(key), tree.search(key));
        }
        prop_assert!(tree.search(&i32::MIN).is_none() || keys.contains(&i32::MIN));
    }

    #[test]
    fn proptest_delete_all(keys in prop::collection::vec(any::<u16>(), 1..200), seed in any::<u64>()) {
        use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

        let mut tree = AvlTree::<u16, ()>::new();
        for key in &keys {
            tree.insert_key(*key);
        }
        let mut order = keys.clone();
        order.shuffle(&mut StdRng::seed_from_u64(seed));
        for key in &order {
            let len = tree.len();
            tree.delete(key);
            prop_assert_eq!(tree.len(), len - 1);
            tree.check_consistency();
        }
        prop_assert!(tree.is_empty());
    }
}
