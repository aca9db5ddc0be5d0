use arbitrary::Arbitrary;

/// How the successor swap of a removal is counted.
///
/// Removing a node with a right subtree moves its in-order successor into its place, and the
/// successor inherits the removed node's rank. The rank held at that position does not change, but
/// the classic operation count still reports the swap as one rebalancing operation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Arbitrary)]
pub enum SuccessorSwap {
    /// The swap counts as one operation.
    #[default]
    Counted,

    /// The swap is not a rebalancing operation.
    Uncounted,
}

impl SuccessorSwap {
    pub(crate) fn count(self) -> usize {
        match self {
            SuccessorSwap::Counted => 1,
            SuccessorSwap::Uncounted => 0,
        }
    }
}
