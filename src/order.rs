use core::{borrow::Borrow, cmp::Ordering};

use tracing::debug;

use crate::{arena::Handle, iter::Iter, node::Dir, WavlError, WavlTree};

impl<K, V> WavlTree<K, V> {
    /// Returns the value of the element with the minimum key.
    ///
    /// This operation completes in _O(1)_ time.
    pub fn min(&self) -> Option<&V> {
        self.min.map(|node| &self.nodes.get(node).value)
    }

    /// Returns the value of the element with the maximum key.
    ///
    /// This operation completes in _O(1)_ time.
    pub fn max(&self) -> Option<&V> {
        self.max.map(|node| &self.nodes.get(node).value)
    }

    /// Returns the element with the minimum key.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.min.map(|node| self.entry(node))
    }

    /// Returns the element with the maximum key.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.max.map(|node| self.entry(node))
    }

    /// Returns the value with the `rank`-th smallest key, counting from 1.
    ///
    /// Returns [`WavlError::OutOfRange`] unless `1 <= rank <= self.len()`.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn select(&self, rank: usize) -> Result<&V, WavlError> {
        let len = self.len();

        if rank == 0 || rank > len {
            debug!(rank, len, "rejected out-of-range selection");
            return Err(WavlError::OutOfRange { rank, len });
        }

        // Number of elements still to skip before the wanted one.
        let mut remaining = rank - 1;
        let mut opt_cur = self.root;

        while let Some(cur) = opt_cur {
            let left = self.links(cur).left();
            let left_size = self.size_of(left);

            match remaining.cmp(&left_size) {
                Ordering::Less => opt_cur = left,
                Ordering::Equal => return Ok(&self.nodes.get(cur).value),
                Ordering::Greater => {
                    remaining -= left_size + 1;
                    opt_cur = self.links(cur).right();
                }
            }
        }

        unreachable!("subtree sizes are inconsistent with the tree length")
    }

    /// Returns all keys in ascending order.
    pub fn keys_to_vec(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.iter().map(|(key, _)| key.clone()).collect()
    }

    /// Returns all values, ordered by their keys.
    pub fn values_to_vec(&self) -> Vec<&V> {
        self.iter().map(|(_, value)| value).collect()
    }

    /// Returns an iterator over the elements of the tree in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self)
    }

    pub(crate) fn entry(&self, node: Handle) -> (&K, &V) {
        let node = self.nodes.get(node);
        (&node.key, &node.value)
    }

    // Returns the minimum node in the subtree.
    //
    // If the subtree root is not the minimum, also returns the minimum node's parent.
    #[inline]
    pub(crate) fn min_in_subtree(&self, root: Handle) -> (Handle, Option<Handle>) {
        let mut parent = None;
        let mut cur = root;

        while let Some(left) = self.links(cur).left() {
            parent = Some(cur);
            cur = left;
        }

        (cur, parent)
    }

    #[inline]
    pub(crate) fn max_in_subtree(&self, root: Handle) -> Handle {
        let mut cur = root;

        while let Some(right) = self.links(cur).right() {
            cur = right;
        }

        cur
    }

    pub(crate) fn successor_raw(&self, node: Handle) -> Option<Handle> {
        self.neighbour_raw(node, Dir::Right)
    }

    pub(crate) fn predecessor_raw(&self, node: Handle) -> Option<Handle> {
        self.neighbour_raw(node, Dir::Left)
    }

    // Returns the next node in direction `dir` of the in-order sequence.
    fn neighbour_raw(&self, node: Handle, dir: Dir) -> Option<Handle> {
        if let Some(child) = self.links(node).child(dir) {
            return Some(match dir {
                Dir::Right => self.min_in_subtree(child).0,
                Dir::Left => self.max_in_subtree(child),
            });
        }

        // Ascend while `cur` is the `dir` child of its parent.
        let mut cur = node;

        loop {
            let parent = self.links(cur).parent()?;

            if self.links(parent).child(dir) != Some(cur) {
                return Some(parent);
            }

            cur = parent;
        }
    }
}

impl<K: Ord, V> WavlTree<K, V> {
    /// Returns the element following `key` in key order, if `key` is present.
    pub fn successor<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.get_raw(key)?;
        self.successor_raw(node).map(|next| self.entry(next))
    }

    /// Returns the element preceding `key` in key order, if `key` is present.
    pub fn predecessor<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.get_raw(key)?;
        self.predecessor_raw(node).map(|prev| self.entry(prev))
    }
}
