//! Equivalence harness that replays operations against a [`WavlTree`] and a `BTreeMap`.

use std::{
    collections::BTreeMap,
    ops::Bound::{Excluded, Unbounded},
};

use arbitrary::Arbitrary;
use proptest::strategy::{Just, Strategy};

use crate::{SuccessorSwap, WavlError, WavlTree};

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    /// Picks a key already in the tree, so that hits are common.
    Index(usize),
    Random(i32),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in -500i32..500,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue),
    Get(ItemValue),
    Remove(ItemValue),
    Select(usize),
    Neighbours(ItemValue),
    First,
    PopFirst,
    Last,
    PopLast,
}

impl Op {
    fn finalize(self, sorted: &[i32]) -> FinalOp {
        fn get_value(v: &[i32], i: ItemValue) -> i32 {
            match i {
                ItemValue::Index(idx) => {
                    if v.is_empty() {
                        // Same key range as `index_strategy`.
                        i32::try_from(idx % 1000).unwrap_or_default()
                    } else {
                        v[idx % v.len()]
                    }
                }
                ItemValue::Random(v) => v,
            }
        }

        match self {
            Op::Insert(item) => FinalOp::Insert(get_value(sorted, item)),
            Op::Get(item) => FinalOp::Get(get_value(sorted, item)),
            Op::Remove(item) => FinalOp::Remove(get_value(sorted, item)),
            // Ranks 0 and len + 1 are both out of range.
            Op::Select(rank) => FinalOp::Select(rank % (sorted.len() + 2)),
            Op::Neighbours(item) => FinalOp::Neighbours(get_value(sorted, item)),
            Op::First => FinalOp::First,
            Op::PopFirst => FinalOp::PopFirst,
            Op::Last => FinalOp::Last,
            Op::PopLast => FinalOp::PopLast,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(i32),
    Get(i32),
    Remove(i32),
    Select(usize),
    Neighbours(i32),
    First,
    PopFirst,
    Last,
    PopLast,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        value_strategy().prop_map(Op::Insert),
        value_strategy().prop_map(Op::Get),
        value_strategy().prop_map(Op::Remove),
        (0usize..1000).prop_map(Op::Select),
        value_strategy().prop_map(Op::Neighbours),
        Just(Op::First),
        Just(Op::PopFirst),
        Just(Op::Last),
        Just(Op::PopLast),
    ]
}

fn value_of(key: i32) -> String {
    format!("info-{key}")
}

pub fn run_btree_equivalence(ops: Vec<Op>) {
    run_btree_equivalence_with(SuccessorSwap::default(), ops);
}

pub fn run_btree_equivalence_with(policy: SuccessorSwap, ops: Vec<Op>) {
    let mut btree: BTreeMap<i32, String> = BTreeMap::new();
    let mut wavl: WavlTree<i32, String> = WavlTree::with_successor_swap(policy);

    for (op_id, op) in ops.into_iter().enumerate() {
        let sorted: Vec<i32> = btree.keys().copied().collect();
        let final_op = op.finalize(&sorted);

        match final_op {
            FinalOp::Insert(key) => {
                let from_btree = if btree.contains_key(&key) {
                    Err(WavlError::DuplicateKey)
                } else {
                    btree.insert(key, value_of(key));
                    Ok(())
                };
                let from_wavl = wavl.insert(key, value_of(key)).map(|_| ());

                assert_eq!(from_btree, from_wavl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Get(key) => {
                let from_btree = btree.get(&key);
                let from_wavl = wavl.get(&key);

                assert_eq!(from_btree, from_wavl, "FinalOp #{op_id}: {final_op:?}");
                assert_eq!(btree.contains_key(&key), wavl.contains_key(&key));
            }

            FinalOp::Remove(key) => {
                let from_btree = btree.remove(&key).map(|_| ()).ok_or(WavlError::NotFound);
                let from_wavl = wavl.remove(&key).map(|_| ());

                assert_eq!(from_btree, from_wavl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Select(rank) => {
                let from_btree = rank
                    .checked_sub(1)
                    .and_then(|i| btree.values().nth(i))
                    .ok_or(WavlError::OutOfRange {
                        rank,
                        len: btree.len(),
                    });
                let from_wavl = wavl.select(rank);

                assert_eq!(from_btree, from_wavl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Neighbours(key) => {
                let (next, prev) = if btree.contains_key(&key) {
                    (
                        btree.range((Excluded(key), Unbounded)).next(),
                        btree.range(..key).next_back(),
                    )
                } else {
                    (None, None)
                };

                assert_eq!(next, wavl.successor(&key), "FinalOp #{op_id}: {final_op:?}");
                assert_eq!(prev, wavl.predecessor(&key), "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::First => {
                let from_btree = btree.first_key_value();
                let from_wavl = wavl.first_key_value();

                assert_eq!(from_btree, from_wavl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PopFirst => {
                let from_btree = btree.pop_first();
                let from_wavl = wavl.pop_first();

                assert_eq!(from_btree, from_wavl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Last => {
                let from_btree = btree.last_key_value();
                let from_wavl = wavl.last_key_value();

                assert_eq!(from_btree, from_wavl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PopLast => {
                let from_btree = btree.pop_last();
                let from_wavl = wavl.pop_last();

                assert_eq!(from_btree, from_wavl, "FinalOp #{op_id}: {final_op:?}");
            }
        }

        wavl.assert_invariants();
        assert_eq!(btree.len(), wavl.len());
        assert_eq!(btree.is_empty(), wavl.is_empty());
        assert_eq!(btree.values().next(), wavl.min());
        assert_eq!(btree.values().next_back(), wavl.max());
        assert!(btree.iter().eq(wavl.iter()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_into_empty_tree_stays_in_key_range() {
        for idx in [0, 999, 1000, u32::MAX as usize, usize::MAX] {
            let FinalOp::Insert(key) = Op::Insert(ItemValue::Index(idx)).finalize(&[]) else {
                panic!("insert finalized to another op");
            };
            assert!((0..1000).contains(&key), "index {idx} became key {key}");
        }
    }

    #[test]
    fn huge_indices_replay_cleanly() {
        run_btree_equivalence(vec![
            Op::Insert(ItemValue::Index(usize::MAX)),
            Op::Insert(ItemValue::Index(usize::MAX - 1)),
            Op::Remove(ItemValue::Index(usize::MAX)),
            Op::Neighbours(ItemValue::Random(i32::MAX)),
        ]);
    }
}
