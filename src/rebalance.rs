//! Decision tables for the two rebalancing walks.
//!
//! Each walk inspects the rank differences around its current position and picks one step. The
//! tables are pure functions of those differences so that every branch can be checked in
//! isolation from the tree surgery that carries it out.

/// Rank differences around a node `x` that was just promoted, where `p` is `x`'s parent.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct InsertionGaps {
    /// `r(p) - r(x)`.
    pub(crate) child: i8,
    /// `r(p)` minus the rank of `x`'s sibling.
    pub(crate) sibling: i8,
    /// `r(x)` minus the rank of `x`'s child on the side `x` hangs from `p`.
    pub(crate) outer: i8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum InsertionStep {
    /// The rank rule holds.
    Stop,
    /// `p` is 0,1: promote it and continue from `p`.
    PromoteParent,
    /// `p` is 0,2 and `x`'s outer child is a 1-child: rotate `x` up. Terminal.
    Rotate,
    /// `p` is 0,2 and `x`'s outer child is a 2-child: rotate `x`'s inner child up twice. Terminal.
    RotateTwice,
}

pub(crate) fn insertion_step(gaps: InsertionGaps) -> InsertionStep {
    match gaps {
        InsertionGaps {
            child: 0,
            sibling: 1,
            ..
        } => InsertionStep::PromoteParent,
        InsertionGaps {
            child: 0,
            sibling: 2,
            outer: 1,
        } => InsertionStep::Rotate,
        InsertionGaps {
            child: 0,
            sibling: 2,
            ..
        } => InsertionStep::RotateTwice,
        _ => InsertionStep::Stop,
    }
}

/// Rank differences around a position `x` (possibly missing) below `p` after a removal.
///
/// `far` and `near` describe `x`'s sibling `o`; they are only consulted when `o` is a 1-child,
/// and a 1-child always exists.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct RemovalGaps {
    /// `r(p)`.
    pub(crate) parent_rank: i8,
    /// `r(p) - r(x)`.
    pub(crate) child: i8,
    /// `r(p) - r(o)`.
    pub(crate) sibling: i8,
    /// `r(o)` minus the rank of `o`'s child away from `x`.
    pub(crate) far: i8,
    /// `r(o)` minus the rank of `o`'s child toward `x`.
    pub(crate) near: i8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum RemovalStep {
    /// The rank rule holds.
    Stop,
    /// Demote `p` and continue from `p`.
    DemoteParent,
    /// Demote both `p` and `o` and continue from `p`.
    DemoteBoth,
    /// Rotate `o` up over `p`. Terminal.
    Rotate,
    /// Rotate `o`'s near child up over `o` and then over `p`. Terminal.
    RotateTwice,
}

pub(crate) fn removal_step(gaps: RemovalGaps) -> RemovalStep {
    match gaps {
        // A rank 1 node that is 1,1 or 2,2 after losing a child.
        RemovalGaps {
            parent_rank: 1,
            child: 1,
            sibling: 1,
            ..
        }
        | RemovalGaps {
            parent_rank: 1,
            child: 2,
            sibling: 2,
            ..
        } => RemovalStep::DemoteParent,

        RemovalGaps {
            child: 3,
            sibling: 2,
            ..
        } => RemovalStep::DemoteParent,

        RemovalGaps {
            child: 3,
            sibling: 1,
            far: 1,
            ..
        } => RemovalStep::Rotate,

        RemovalGaps {
            child: 3,
            sibling: 1,
            near: 1,
            ..
        } => RemovalStep::RotateTwice,

        RemovalGaps {
            child: 3,
            sibling: 1,
            far: 2,
            near: 2,
            ..
        } => RemovalStep::DemoteBoth,

        _ => RemovalStep::Stop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 1, 1, InsertionStep::Stop)]
    #[case(2, 1, 1, InsertionStep::Stop)]
    #[case(1, 2, 2, InsertionStep::Stop)]
    #[case(0, 1, 1, InsertionStep::PromoteParent)]
    #[case(0, 1, 2, InsertionStep::PromoteParent)]
    #[case(0, 2, 1, InsertionStep::Rotate)]
    #[case(0, 2, 2, InsertionStep::RotateTwice)]
    fn insertion_table(
        #[case] child: i8,
        #[case] sibling: i8,
        #[case] outer: i8,
        #[case] expected: InsertionStep,
    ) {
        let gaps = InsertionGaps {
            child,
            sibling,
            outer,
        };

        assert_eq!(insertion_step(gaps), expected);
    }

    #[rstest]
    // 2,2 leaf left behind by removing the only child of a unary node.
    #[case(1, 2, 2, 0, 0, RemovalStep::DemoteParent)]
    #[case(1, 1, 1, 1, 1, RemovalStep::DemoteParent)]
    #[case(1, 2, 1, 1, 1, RemovalStep::Stop)]
    #[case(2, 2, 2, 1, 1, RemovalStep::Stop)]
    #[case(3, 2, 1, 1, 2, RemovalStep::Stop)]
    #[case(3, 3, 2, 1, 1, RemovalStep::DemoteParent)]
    #[case(2, 3, 1, 1, 1, RemovalStep::Rotate)]
    #[case(2, 3, 1, 1, 2, RemovalStep::Rotate)]
    #[case(3, 3, 1, 2, 1, RemovalStep::RotateTwice)]
    #[case(4, 3, 1, 2, 2, RemovalStep::DemoteBoth)]
    fn removal_table(
        #[case] parent_rank: i8,
        #[case] child: i8,
        #[case] sibling: i8,
        #[case] far: i8,
        #[case] near: i8,
        #[case] expected: RemovalStep,
    ) {
        let gaps = RemovalGaps {
            parent_rank,
            child,
            sibling,
            far,
            near,
        };

        assert_eq!(removal_step(gaps), expected);
    }
}
