//! An ordered map backed by a weak AVL tree, or WAVL tree, with order statistics.
//!
//! Every mutation reports how many rebalancing operations (promotions, demotions and rotations)
//! it performed.

// Conventions used in comments are from Hauepler, Sen and Tarjan:
// - The rank of a node `x` is denoted `r(x)`. A missing child has rank -1.
// - The parent of a node `x` is denoted `p(x)`.
// - The rank difference of a node `x` is given by `r(p(x)) - r(x)`.
// - A node `x` is an `i`-child if its rank difference is `i`.
// - A node is `i,j` if one of its children is an `i`-child and the other is a `j`-child.
//
// The fundamental invariants of a WAVL tree are:
// 1. All rank differences are either 1 or 2.
// 2. All leaves have rank 0.
//
// On top of those, every node caches the number of nodes in its subtree, and the tree caches its
// minimum and maximum nodes.

use core::{borrow::Borrow, fmt};

use tracing::{debug, trace};

mod arena;
mod debug;
mod error;
mod iter;
mod locate;
mod node;
mod order;
mod policy;
mod rebalance;

#[cfg(any(test, feature = "model"))]
pub mod model;

#[cfg(test)]
mod tests;

pub use error::WavlError;
pub use iter::Iter;
pub use policy::SuccessorSwap;

use arena::{Arena, Handle};
use locate::Locate;
use node::{Dir, Link, Links, Node, ABSENT_RANK};
use rebalance::{
    insertion_step, removal_step, InsertionGaps, InsertionStep, RemovalGaps, RemovalStep,
};

/// An ordered map implemented as a weak AVL tree, or WAVL tree.
///
/// Implementation based on the paper [Rank-Balanced Trees] by Hauepler, Sen and Tarjan. All nodes
/// live in an arena owned by the tree; parent and child links are arena indices.
///
/// [Rank-Balanced Trees]: http://arks.princeton.edu/ark:/88435/pr1nz5z
pub struct WavlTree<K, V> {
    nodes: Arena<Node<K, V>>,
    root: Link,
    min: Link,
    max: Link,
    successor_swap: SuccessorSwap,
}

/// Which mutation a rotation is repairing. The rank fix-ups differ between the two.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    Insert,
    Remove,
}

impl<K, V> WavlTree<K, V> {
    /// Returns a new empty tree.
    pub const fn new() -> WavlTree<K, V> {
        WavlTree::with_successor_swap(SuccessorSwap::Counted)
    }

    /// Returns a new empty tree that counts successor swaps according to `policy`.
    pub const fn with_successor_swap(policy: SuccessorSwap) -> WavlTree<K, V> {
        WavlTree {
            nodes: Arena::new(),
            root: None,
            min: None,
            max: None,
            successor_swap: policy,
        }
    }

    /// Returns the policy used to count successor swaps.
    pub fn successor_swap(&self) -> SuccessorSwap {
        self.successor_swap
    }

    /// Returns `true` if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        let empty = self.root.is_none();
        debug_assert_eq!(empty, self.nodes.len() == 0);
        empty
    }

    /// Returns the number of elements in the tree.
    ///
    /// This operation completes in _O(1)_ time.
    pub fn len(&self) -> usize {
        self.size_of(self.root)
    }

    /// Clears the tree, removing all elements.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.min = None;
        self.max = None;
    }

    /// Removes and returns the element with the minimum key.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let min = self.min?;
        let (key, value, _) = self.remove_at(min);
        Some((key, value))
    }

    /// Removes and returns the element with the maximum key.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let max = self.max?;
        let (key, value, _) = self.remove_at(max);
        Some((key, value))
    }
}

impl<K: Ord, V> WavlTree<K, V> {
    /// Returns `true` if the tree contains a value for `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_raw(key).is_some()
    }

    /// Returns a reference to the value associated with `key`.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_raw(key).map(|node| &self.nodes.get(node).value)
    }

    /// Returns a mutable reference to the value associated with `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.get_raw(key)?;
        Some(&mut self.nodes.get_mut(node).value)
    }

    /// Inserts `value` under `key`.
    ///
    /// Returns the number of rebalancing operations performed, or [`WavlError::DuplicateKey`] if
    /// `key` is already present, in which case the tree is left unchanged.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, key: K, value: V) -> Result<usize, WavlError> {
        let attach = match self.locate(&key) {
            Locate::Found(_) => {
                debug!(len = self.len(), "rejected insert of a present key");
                return Err(WavlError::DuplicateKey);
            }
            Locate::Vacant(attach) => attach,
        };

        let node = self.nodes.alloc(Node::new(key, value));

        let Some((parent, dir)) = attach else {
            // Tree is empty. Set `node` as the root and return.
            self.root = Some(node);
            self.min = Some(node);
            self.max = Some(node);
            return Ok(0);
        };

        let parent_was_leaf = self.links(parent).rank() == 0;

        self.links_mut(parent).set_child(dir, Some(node));
        self.links_mut(node).set_parent(Some(parent));
        self.grow_path(Some(parent));
        self.update_extremes(node);

        if !parent_was_leaf {
            return Ok(0);
        }

        // The parent node is rank 0 and the newly inserted node is also rank 0, which violates the
        // rank rule.
        self.promote(parent);

        Ok(1 + self.rebalance_inserted(parent))
    }

    /// Removes the element associated with `key`.
    ///
    /// Returns the number of rebalancing operations performed, or [`WavlError::NotFound`] if `key`
    /// is absent, in which case the tree is left unchanged.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<usize, WavlError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(node) = self.get_raw(key) else {
            debug!(len = self.len(), "rejected removal of an absent key");
            return Err(WavlError::NotFound);
        };

        let (_, _, count) = self.remove_at(node);
        Ok(count)
    }

    fn update_extremes(&mut self, node: Handle) {
        let key = &self.nodes.get(node).key;

        let is_min = self.min.map_or(true, |min| *key < self.nodes.get(min).key);
        let is_max = self.max.map_or(true, |max| *key > self.nodes.get(max).key);

        if is_min {
            self.min = Some(node);
        }

        if is_max {
            self.max = Some(node);
        }
    }
}

impl<K, V> WavlTree<K, V> {
    // Performs a bottom-up rebalance of the tree after `node` was promoted.
    //
    // Invariants:
    // - `node` is 1,2 or 1,1.
    // - `node` may be a 0-child; no other node violates the rank rule.
    //
    // Returns the number of rebalancing operations performed.
    fn rebalance_inserted(&mut self, node: Handle) -> usize {
        let mut count = 0;
        let mut x = node;

        while let Some(parent) = self.links(x).parent() {
            let dir = self.which_child(parent, x);
            let parent_rank = self.links(parent).rank();
            let x_rank = self.links(x).rank();

            let gaps = InsertionGaps {
                child: parent_rank - x_rank,
                sibling: parent_rank - self.rank(self.links(parent).child(!dir)),
                outer: x_rank - self.rank(self.links(x).child(dir)),
            };

            match insertion_step(gaps) {
                InsertionStep::Stop => break,

                InsertionStep::PromoteParent => {
                    self.promote(parent);
                    count += 1;
                    x = parent;
                }

                InsertionStep::Rotate => {
                    count += self.rotate(parent, !dir, Phase::Insert);
                    break;
                }

                InsertionStep::RotateTwice => {
                    count += self.rotate_twice(parent, !dir, Phase::Insert);
                    break;
                }
            }
        }

        count
    }

    // Unlinks `node` from the tree and releases its slot.
    //
    // There are three possible shapes:
    //
    // 1. `node` is a leaf. It is detached and its slot becomes empty.
    // 2. `node` has only a left child. The child is elevated into `node`'s slot.
    // 3. `node` has a right child. Its successor[^1] assumes `node`'s place, rank and size. If
    //    the successor is deeper than `node`'s right child, the successor's right child is first
    //    elevated to replace it.
    //
    // In each case exactly one slot, the fix-up position, may now hold a 3-child or a 2,2 leaf;
    // the removal walk starts there.
    //
    // [^1]: The successor of a node `a` is the least node in `a`'s right subtree.
    //
    // Returns the removed entry and the number of rebalancing operations performed.
    pub(crate) fn remove_at(&mut self, node: Handle) -> (K, V, usize) {
        // The extremes are replaced while `node` is still linked.
        if self.min == Some(node) {
            self.min = self.successor_raw(node);
        }

        if self.max == Some(node) {
            self.max = self.predecessor_raw(node);
        }

        let parent = self.links(node).parent();
        let left = self.links(node).left();
        let right = self.links(node).right();
        let mut count = 0;

        let fixup = match right {
            None => {
                let side = parent.map(|p| (p, self.which_child(p, node)));

                // Elevate the left child, which may be missing.
                self.replace_child_or_set_root(parent, node, left);
                self.maybe_set_parent(left, parent);
                self.shrink_path(parent);

                side
            }

            Some(right) => {
                let (successor, successor_parent) = self.min_in_subtree(right);

                // Sizes along the successor's old path shrink by one, including `node`'s, which the
                // successor takes over below.
                self.shrink_path(Some(successor_parent.unwrap_or(node)));

                let side = match successor_parent {
                    Some(successor_parent) => {
                        // Elevate the successor's right child to replace it.
                        let successor_right = self.links(successor).right();
                        self.links_mut(successor_parent).set_left(successor_right);
                        self.maybe_set_parent(successor_right, Some(successor_parent));

                        self.links_mut(successor).set_right(Some(right));
                        self.links_mut(right).set_parent(Some(successor));

                        (successor_parent, Dir::Left)
                    }

                    // The successor is `node`'s right child and keeps its own right subtree.
                    None => (successor, Dir::Right),
                };

                let successor_rank = self.links(successor).rank();
                let node_rank = self.links(node).rank();
                let node_size = self.links(node).size();

                self.replace_child_or_set_root(parent, node, Some(successor));

                let links = self.links_mut(successor);
                links.set_parent(parent);
                links.set_left(left);
                links.set_rank(node_rank);
                links.set_size(node_size);
                self.maybe_set_parent(left, Some(successor));

                count += self.successor_swap.count();
                trace!(
                    from = successor_rank,
                    to = node_rank,
                    "successor swapped into removed slot"
                );

                Some(side)
            }
        };

        let Node { key, value, .. } = self.nodes.take(node);

        if let Some((parent, dir)) = fixup {
            count += self.rebalance_removed(parent, dir);
        }

        (key, value, count)
    }

    // Performs a bottom-up rebalance of the tree starting at the `dir` child slot of `parent`.
    //
    // The slot may be empty. Before rebalancing, exactly one of the following is true:
    //
    // 1. The rank rule holds.
    // 2. The slot holds a 3-child.
    // 3. `parent` is a 2,2 leaf of rank 1.
    //
    // Returns the number of rebalancing operations performed.
    fn rebalance_removed(&mut self, mut parent: Handle, mut dir: Dir) -> usize {
        let mut count = 0;

        loop {
            let x = self.links(parent).child(dir);
            let sibling = self.links(parent).child(!dir);
            let parent_rank = self.links(parent).rank();

            let (far, near) = match sibling {
                Some(o) => {
                    let o_rank = self.links(o).rank();
                    (
                        o_rank - self.rank(self.links(o).child(!dir)),
                        o_rank - self.rank(self.links(o).child(dir)),
                    )
                }
                None => (0, 0),
            };

            let gaps = RemovalGaps {
                parent_rank,
                child: parent_rank - self.rank(x),
                sibling: parent_rank - self.rank(sibling),
                far,
                near,
            };

            match removal_step(gaps) {
                RemovalStep::Stop => break,

                RemovalStep::DemoteParent => {
                    self.demote(parent);
                    count += 1;
                }

                RemovalStep::DemoteBoth => {
                    self.demote(parent);
                    self.demote(sibling.expect("a 1-child sibling always exists"));
                    count += 1;
                }

                RemovalStep::Rotate => {
                    count += self.rotate(parent, dir, Phase::Remove);
                    break;
                }

                RemovalStep::RotateTwice => {
                    count += self.rotate_twice(parent, dir, Phase::Remove);
                    break;
                }
            }

            // Ascend one level. If this passes the root, break.
            let Some(grandparent) = self.links(parent).parent() else {
                break;
            };

            dir = self.which_child(grandparent, parent);
            parent = grandparent;
        }

        count
    }

    // Rotates `head` down in direction `dir`, lifting its child on the other side into its slot.
    //
    // Ranks are then repaired for `phase`. Returns the number of rebalancing operations, counting
    // the rotation itself as one.
    fn rotate(&mut self, head: Handle, dir: Dir, phase: Phase) -> usize {
        let up = self
            .links(head)
            .child(!dir)
            .expect("rotation requires a child to lift");

        // - `head` becomes the `dir` child of `up`.
        // - `across` goes from the `dir` child of `up` to the `!dir` child of `head`.
        let across = self.links(up).child(dir);
        let parent = self.links(head).parent();

        self.links_mut(head).set_child(!dir, across);
        self.maybe_set_parent(across, Some(head));

        self.links_mut(up).set_child(dir, Some(head));
        self.links_mut(head).set_parent(Some(up));
        self.links_mut(up).set_parent(parent);
        self.replace_child_or_set_root(parent, head, Some(up));

        // `head` is now below `up`, so its size is settled first.
        self.update_size(head);
        self.update_size(up);

        // The rotation, then the demotion of `head`.
        let mut count = 2;
        self.demote(head);

        if phase == Phase::Remove || self.links(up).rank() == self.links(head).rank() {
            self.promote(up);
            count += 1;
        }

        if phase == Phase::Remove && self.is_2_2(head) {
            self.demote(head);
            count += 1;
        }

        trace!(?phase, ?dir, rank = self.links(up).rank(), "rotated");

        count
    }

    // Lifts the inner grandchild of `head` on the `!dir` side into `head`'s slot.
    fn rotate_twice(&mut self, head: Handle, dir: Dir, phase: Phase) -> usize {
        let head_rank = self.links(head).rank();
        let down = self
            .links(head)
            .child(!dir)
            .expect("double rotation requires an inner child");

        let mut count = self.rotate(down, !dir, phase);
        count += self.rotate(head, dir, phase);

        if phase == Phase::Remove && head_rank - self.links(head).rank() != 2 {
            self.demote(head);
            count += 1;
        }

        trace!(?phase, ?dir, "rotated twice");

        count
    }

    // Support methods ========================================================

    #[inline]
    fn links(&self, node: Handle) -> &Links {
        &self.nodes.get(node).links
    }

    #[inline]
    fn links_mut(&mut self, node: Handle) -> &mut Links {
        &mut self.nodes.get_mut(node).links
    }

    #[inline]
    fn promote(&mut self, node: Handle) {
        let links = self.links_mut(node);
        links.set_rank(links.rank() + 1);
    }

    #[inline]
    fn demote(&mut self, node: Handle) {
        let links = self.links_mut(node);
        debug_assert!(links.rank() > 0, "demoted a rank 0 node");
        links.set_rank(links.rank() - 1);
    }

    /// Returns the rank of the pointed-to node.
    #[inline]
    fn rank(&self, node: Link) -> i8 {
        node.map_or(ABSENT_RANK, |n| self.links(n).rank())
    }

    /// Returns the subtree size of the pointed-to node.
    #[inline]
    fn size_of(&self, node: Link) -> usize {
        node.map_or(0, |n| self.links(n).size())
    }

    fn is_2_2(&self, node: Handle) -> bool {
        let rank = self.links(node).rank();

        rank - self.rank(self.links(node).left()) == 2
            && rank - self.rank(self.links(node).right()) == 2
    }

    fn which_child(&self, parent: Handle, child: Handle) -> Dir {
        if self.links(parent).left() == Some(child) {
            Dir::Left
        } else {
            Dir::Right
        }
    }

    fn maybe_set_parent(&mut self, opt_node: Link, parent: Link) {
        if let Some(node) = opt_node {
            self.links_mut(node).set_parent(parent);
        }
    }

    // Replaces the child pointer of `parent` pointing at `old_child` with `new_child`, or the root
    // if `parent` is `None`.
    //
    // `new_child`'s parent pointer is not updated.
    fn replace_child_or_set_root(&mut self, parent: Link, old_child: Handle, new_child: Link) {
        match parent {
            Some(parent) => {
                let dir = self.which_child(parent, old_child);
                debug_assert_eq!(self.links(parent).child(dir), Some(old_child));
                self.links_mut(parent).set_child(dir, new_child);
            }
            None => self.root = new_child,
        }
    }

    fn update_size(&mut self, node: Handle) {
        let size = 1 + self.size_of(self.links(node).left()) + self.size_of(self.links(node).right());
        self.links_mut(node).set_size(size);
    }

    // Adds one to the size of `from` and each of its ancestors.
    fn grow_path(&mut self, from: Link) {
        let mut cur = from;

        while let Some(node) = cur {
            let links = self.links_mut(node);
            links.set_size(links.size() + 1);
            cur = links.parent();
        }
    }

    // Subtracts one from the size of `from` and each of its ancestors.
    fn shrink_path(&mut self, from: Link) {
        let mut cur = from;

        while let Some(node) = cur {
            let links = self.links_mut(node);
            links.set_size(links.size() - 1);
            cur = links.parent();
        }
    }
}

impl<K, V> Default for WavlTree<K, V> {
    fn default() -> Self {
        WavlTree::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for WavlTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'tree, K, V> IntoIterator for &'tree WavlTree<K, V> {
    type Item = (&'tree K, &'tree V);
    type IntoIter = Iter<'tree, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
