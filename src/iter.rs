use core::iter::FusedIterator;

use crate::{node::Link, WavlTree};

enum CameFrom {
    Parent,
    LeftChild,
    Here,
    RightChild,
}

/// An in-order iterator over the elements of a [`WavlTree`].
pub struct Iter<'tree, K, V> {
    tree: &'tree WavlTree<K, V>,

    front_cur: Link,
    front_from: CameFrom,

    len: usize,
}

impl<'tree, K, V> Iter<'tree, K, V> {
    pub(crate) fn new(tree: &'tree WavlTree<K, V>) -> Self {
        Iter {
            tree,

            front_cur: tree.root,
            front_from: CameFrom::Parent,
            len: tree.len(),
        }
    }
}

impl<'tree, K, V> Iterator for Iter<'tree, K, V> {
    type Item = (&'tree K, &'tree V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let tree = self.tree;
        let mut cur = self.front_cur?;

        loop {
            match self.front_from {
                CameFrom::Parent => {
                    // Upon entering a new subtree, find the minimum element.
                    cur = tree.min_in_subtree(cur).0;

                    // Once the minimum is found, its (empty) left subtree has been exhausted.
                    self.front_from = CameFrom::LeftChild;
                }

                CameFrom::LeftChild => {
                    // The left subtree has been exhausted, so this node is up next.
                    self.front_cur = Some(cur);
                    self.front_from = CameFrom::Here;
                    self.len -= 1;

                    return Some(tree.entry(cur));
                }

                CameFrom::Here => {
                    if let Some(right) = tree.links(cur).right() {
                        self.front_from = CameFrom::Parent;
                        cur = right;
                    } else {
                        self.front_from = CameFrom::RightChild;
                    }
                }

                CameFrom::RightChild => {
                    // Ascend until we arrive from a left child; that parent is the successor.
                    loop {
                        let parent = tree
                            .links(cur)
                            .parent()
                            .expect("iterator ran past the maximum");
                        let was_left = tree.links(parent).left() == Some(cur);
                        cur = parent;

                        if was_left {
                            break;
                        }
                    }

                    self.front_from = CameFrom::LeftChild;
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}
