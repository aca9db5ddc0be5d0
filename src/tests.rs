use std::ops::Range;

use proptest::prelude::*;

use crate::model;

use super::*;

// Every ordering of `0..n`, by Heap's algorithm.
fn permutations(n: u32) -> Vec<Vec<u32>> {
    fn heap(k: usize, keys: &mut Vec<u32>, out: &mut Vec<Vec<u32>>) {
        if k <= 1 {
            out.push(keys.clone());
            return;
        }

        for i in 0..k - 1 {
            heap(k - 1, keys, out);
            let j = if k % 2 == 0 { i } else { 0 };
            keys.swap(j, k - 1);
        }

        heap(k - 1, keys, out);
    }

    let mut keys: Vec<u32> = (0..n).collect();
    let mut out = Vec::new();
    heap(keys.len(), &mut keys, &mut out);
    out
}

fn insert_find_all(keys: &[u32]) {
    let mut tree: WavlTree<u32, u64> = WavlTree::new();

    for &key in keys {
        tree.insert(key, u64::from(key) * 3).expect("keys are distinct");
        tree.assert_invariants();
    }

    for key in keys {
        assert_eq!(tree.get(key), Some(&(u64::from(*key) * 3)), "item not found");
    }

    assert_eq!(tree.len(), keys.len());
}

fn insert_remove_all(keys: &[u32]) {
    let mut tree: WavlTree<u32, ()> = WavlTree::new();

    for &key in keys {
        tree.insert(key, ()).expect("keys are distinct");
        tree.assert_invariants();
    }

    for key in keys {
        tree.remove(key).expect("item not found");
        tree.assert_invariants();
    }

    assert!(tree.is_empty());

    for &key in keys {
        tree.insert(key, ()).expect("keys are distinct");
        tree.assert_invariants();
    }

    for key in keys.iter().rev() {
        tree.remove(key).expect("item not found");
        tree.assert_invariants();
    }

    assert!(tree.is_empty());
}

#[test]
fn zero_elems_find() {
    insert_find_all(&[]);
}

#[test]
fn small_trees_find() {
    for n in 1..=6 {
        for keys in permutations(n) {
            insert_find_all(&keys);
        }
    }
}

#[test]
fn small_trees_remove() {
    for n in 1..=6 {
        for keys in permutations(n) {
            insert_remove_all(&keys);
        }
    }
}

#[test]
fn permutations_are_complete() {
    let perms = permutations(4);
    assert_eq!(perms.len(), 24);

    let mut sorted = perms.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), 24);
}

#[test]
fn mixed_insert_order() {
    let mut tree = WavlTree::new();

    for key in [10, 20, 5, 6] {
        tree.insert(key, format!("info{key}")).unwrap();
        tree.assert_invariants();
    }

    assert_eq!(tree.keys_to_vec(), vec![5, 6, 10, 20]);
    let values: Vec<&str> = tree.values_to_vec().into_iter().map(String::as_str).collect();
    assert_eq!(values, ["info5", "info6", "info10", "info20"]);
}

fn ascending_tree(n: i32) -> WavlTree<i32, i32> {
    let mut tree = WavlTree::new();

    for key in 1..=n {
        tree.insert(key, -key).unwrap();
        tree.assert_invariants();
    }

    tree
}

fn height_bound(n: usize) -> usize {
    (1.44 * ((n + 2) as f64).log2()).ceil() as usize
}

#[test]
fn ascending_inserts_stay_shallow() {
    let tree = ascending_tree(7);

    assert_eq!(tree.len(), 7);
    assert!(tree.height() <= height_bound(7), "height {}", tree.height());
    assert_eq!(tree.keys_to_vec(), (1..=7).collect::<Vec<_>>());
}

#[test]
fn ascending_inserts_stay_shallow_at_scale() {
    for n in [100, 1000, 4096] {
        let tree = ascending_tree(n);
        let len = tree.len();
        assert!(tree.height() <= height_bound(len), "n = {n}: height {}", tree.height());
    }
}

#[test]
fn remove_root_until_empty() {
    let mut tree = ascending_tree(7);

    while let Some(root) = tree.root {
        let key = tree.nodes.get(root).key;
        tree.remove(&key).unwrap();
        tree.assert_invariants();

        let keys = tree.keys_to_vec();
        assert!(!keys.contains(&key));
        assert_eq!(tree.min(), keys.first().map(|k| -k).as_ref());
        assert_eq!(tree.max(), keys.last().map(|k| -k).as_ref());
    }

    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.min(), None);
    assert_eq!(tree.max(), None);
}

#[test]
fn clear_resets_everything() {
    let mut tree = ascending_tree(20);

    tree.clear();
    tree.assert_invariants();
    assert!(tree.is_empty());
    assert_eq!(tree.first_key_value(), None);

    // Slots are reused after a clear.
    tree.insert(3, 3).unwrap();
    tree.assert_invariants();
    assert_eq!(tree.len(), 1);
}

#[test]
fn pop_drains_in_order() {
    let mut tree = ascending_tree(9);

    assert_eq!(tree.pop_first(), Some((1, -1)));
    assert_eq!(tree.pop_last(), Some((9, -9)));
    tree.assert_invariants();

    let mut drained = Vec::new();
    while let Some((key, _)) = tree.pop_first() {
        tree.assert_invariants();
        drained.push(key);
    }

    assert_eq!(drained, (2..=8).collect::<Vec<_>>());
    assert_eq!(tree.pop_last(), None);
}

#[test]
fn get_mut_updates_value() {
    let mut tree = ascending_tree(5);

    *tree.get_mut(&3).unwrap() = 300;
    assert_eq!(tree.select(3), Ok(&300));
    assert_eq!(tree.get_mut(&6), None);
}

#[test]
fn debug_lists_entries_in_order() {
    let mut tree = WavlTree::new();
    for key in [2, 3, 1] {
        tree.insert(key, ()).unwrap();
    }

    assert_eq!(format!("{tree:?}"), "{1: (), 2: (), 3: ()}");
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

fn distinct_keys() -> impl Strategy<Value = Vec<i32>> {
    proptest::collection::btree_set(-10_000i32..10_000, 0..200)
        .prop_map(|keys| keys.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn btree_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_btree_equivalence(ops);
    }

    #[test]
    fn btree_equivalence_uncounted(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_btree_equivalence_with(SuccessorSwap::Uncounted, ops);
    }

    #[test]
    fn len_tracks_inserts_and_removals(keys in distinct_keys(), removed in any::<proptest::sample::Index>()) {
        let mut tree = WavlTree::new();
        for &key in &keys {
            tree.insert(key, ()).unwrap();
        }

        let d = removed.index(keys.len() + 1);
        for key in &keys[..d] {
            tree.remove(key).unwrap();
        }

        tree.assert_invariants();
        prop_assert_eq!(tree.len(), keys.len() - d);

        let mut expected = keys[d..].to_vec();
        expected.sort_unstable();
        prop_assert_eq!(tree.keys_to_vec(), expected);
    }

    #[test]
    fn select_matches_sorted_order(keys in distinct_keys()) {
        let mut tree = WavlTree::new();
        for &key in &keys {
            tree.insert(key, key.wrapping_mul(7)).unwrap();
        }

        let mut sorted = keys.clone();
        sorted.sort_unstable();

        for (i, key) in sorted.iter().enumerate() {
            prop_assert_eq!(tree.select(i + 1), Ok(&key.wrapping_mul(7)));
        }

        let len = sorted.len();
        prop_assert_eq!(tree.select(0), Err(WavlError::OutOfRange { rank: 0, len }));
        prop_assert_eq!(tree.select(len + 1), Err(WavlError::OutOfRange { rank: len + 1, len }));
    }

    #[test]
    fn rejections_leave_tree_unchanged(keys in distinct_keys(), probe in -10_000i32..10_000) {
        let mut tree = WavlTree::new();
        for &key in &keys {
            tree.insert(key, key).unwrap();
        }

        let keys_before = tree.keys_to_vec();
        let values_before: Vec<i32> = tree.values_to_vec().into_iter().copied().collect();

        if keys.contains(&probe) {
            prop_assert_eq!(tree.insert(probe, 0), Err(WavlError::DuplicateKey));
        } else {
            prop_assert_eq!(tree.remove(&probe), Err(WavlError::NotFound));
        }

        tree.assert_invariants();
        prop_assert_eq!(tree.keys_to_vec(), keys_before);
        let values_after: Vec<i32> = tree.values_to_vec().into_iter().copied().collect();
        prop_assert_eq!(values_after, values_before);
    }

    #[test]
    fn uncounted_swaps_report_one_less(keys in distinct_keys()) {
        let mut counted = WavlTree::new();
        let mut uncounted = WavlTree::with_successor_swap(SuccessorSwap::Uncounted);

        for &key in &keys {
            prop_assert_eq!(counted.insert(key, ()), uncounted.insert(key, ()));
        }

        for key in &keys {
            let node = counted.get_raw(key).unwrap();
            // Nodes with a right subtree are replaced by their successor.
            let swapped = counted.links(node).right().is_some();

            let from_counted = counted.remove(key).unwrap();
            let from_uncounted = uncounted.remove(key).unwrap();
            let swaps = usize::from(swapped);
            prop_assert_eq!(from_counted, from_uncounted + swaps);

            let (mut a, mut b) = (String::new(), String::new());
            counted.dotgraph("t", &mut a).unwrap();
            uncounted.dotgraph("t", &mut b).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
