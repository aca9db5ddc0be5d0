use core::{borrow::Borrow, cmp::Ordering};

use crate::{arena::Handle, node::Dir, WavlTree};

/// Outcome of a binary search for a key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Locate {
    /// The key is stored at this node.
    Found(Handle),

    /// The key is absent. It belongs in the `dir` child slot of the given node, or at the root if
    /// the tree is empty.
    Vacant(Option<(Handle, Dir)>),
}

impl<K: Ord, V> WavlTree<K, V> {
    pub(crate) fn locate<Q>(&self, key: &Q) -> Locate
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(mut cur) = self.root else {
            return Locate::Vacant(None);
        };

        loop {
            let node = self.nodes.get(cur);
            let dir = match key.cmp(node.key.borrow()) {
                Ordering::Less => Dir::Left,
                Ordering::Equal => return Locate::Found(cur),
                Ordering::Greater => Dir::Right,
            };

            match node.links.child(dir) {
                Some(child) => cur = child,
                None => return Locate::Vacant(Some((cur, dir))),
            }
        }
    }

    pub(crate) fn get_raw<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.locate(key) {
            Locate::Found(node) => Some(node),
            Locate::Vacant(_) => None,
        }
    }
}
