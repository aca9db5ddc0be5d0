#![no_main]
use libfuzzer_sys::fuzz_target;

use wavl_map::{
    model::{run_btree_equivalence_with, Op},
    SuccessorSwap,
};

fuzz_target!(|input: (SuccessorSwap, Vec<Op>)| {
    let (policy, ops) = input;
    run_btree_equivalence_with(policy, ops)
});
