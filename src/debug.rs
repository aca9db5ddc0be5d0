use std::{collections::VecDeque, fmt};

use crate::{arena::Handle, node::Dir, WavlTree};

impl<K: Ord, V> WavlTree<K, V> {
    /// Panics if any structural invariant of the tree does not hold.
    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        let Some(root) = self.root else {
            assert_eq!(self.nodes.len(), 0, "empty tree still owns nodes");
            assert!(self.min.is_none() && self.max.is_none(), "empty tree caches extremes");
            return;
        };

        assert_eq!(self.links(root).parent(), None, "root has a parent");

        let size = self.assert_invariants_at(root, None, None);
        assert_eq!(size, self.nodes.len(), "unreachable nodes in the arena");

        let (min, _) = self.min_in_subtree(root);
        assert_eq!(self.min, Some(min), "stale minimum");
        assert_eq!(self.max, Some(self.max_in_subtree(root)), "stale maximum");
    }

    // Checks the subtree at `node`, whose keys must lie strictly between the bounds. Returns the
    // subtree size.
    fn assert_invariants_at(&self, node: Handle, lower: Option<&K>, upper: Option<&K>) -> usize {
        let links = self.links(node);
        let key = &self.nodes.get(node).key;
        let rank = links.rank();

        assert!(lower.map_or(true, |lower| lower < key), "key ordering violated");
        assert!(upper.map_or(true, |upper| key < upper), "key ordering violated");

        // Ensure all leaves have rank 0.
        if links.is_leaf() {
            assert_eq!(rank, 0, "leaf with nonzero rank");
        }

        let mut size = 1;

        for dir in [Dir::Left, Dir::Right] {
            let child = links.child(dir);

            // Ensure all rank differences are 1 or 2, missing children included.
            let rank_diff = rank - self.rank(child);
            assert!([1, 2].contains(&rank_diff), "rank difference {rank_diff}");

            if let Some(child) = child {
                // Ensure child's parent link points to this node.
                assert_eq!(self.links(child).parent(), Some(node), "child parent pointer");

                size += match dir {
                    Dir::Left => self.assert_invariants_at(child, lower, Some(key)),
                    Dir::Right => self.assert_invariants_at(child, Some(key), upper),
                };
            }
        }

        assert_eq!(links.size(), size, "stale subtree size");

        size
    }
}

impl<K, V> WavlTree<K, V> {
    /// Returns the number of nodes on the longest path from the root to a leaf.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut level: Vec<Handle> = self.root.into_iter().collect();

        while !level.is_empty() {
            height += 1;
            level = level
                .iter()
                .flat_map(|&node| [self.links(node).left(), self.links(node).right()])
                .flatten()
                .collect();
        }

        height
    }

    /// Writes the tree as a Graphviz digraph. Each node is labelled `key:rank`.
    pub fn dotgraph<W>(&self, name: &str, mut w: W) -> fmt::Result
    where
        W: fmt::Write,
        K: fmt::Display,
    {
        let root = match self.root {
            Some(r) => r,
            None => return write!(w, "digraph \"graph-{name}\" {{}}"),
        };

        enum Item {
            Node(Handle),
            Missing(u32),
        }

        let mut queue = VecDeque::new();
        queue.push_back(Item::Node(root));

        write!(
            w,
            "digraph \"graph-{name}\" {{\n subgraph \"subgraph-{name}\" {{"
        )?;

        let mut missing = 0;
        let mut links = String::new();

        while !queue.is_empty() {
            use fmt::Write;

            write!(w, "{{rank=same; ")?;

            for _ in 0..queue.len() {
                let node = match queue.pop_front() {
                    Some(Item::Node(node)) => node,
                    Some(Item::Missing(id)) => {
                        write!(w, "\"graph{name}-missing{id}\" [shape=point]; ")?;
                        continue;
                    }
                    None => break,
                };

                let key = &self.nodes.get(node).key;
                let rank = self.links(node).rank();
                write!(w, "\"graph{name}-{key}\" [label=\"{key}:{rank}\"]; ")?;

                for dir in [Dir::Left, Dir::Right] {
                    if let Some(child) = self.links(node).child(dir) {
                        let child_key = &self.nodes.get(child).key;

                        queue.push_back(Item::Node(child));
                        writeln!(
                            links,
                            "\"graph{name}-{key}\" -> \"graph{name}-{child_key}\";"
                        )?;
                    } else {
                        queue.push_back(Item::Missing(missing));
                        writeln!(
                            links,
                            "\"graph{name}-{key}\" -> \"graph{name}-missing{missing}\";"
                        )?;
                        missing += 1;
                    }
                }
            }

            writeln!(w, "}}")?;
        }

        w.write_str(&links)?;

        w.write_str(" }\n}")
    }
}

#[cfg(test)]
mod tests {
    use crate::WavlTree;

    #[test]
    fn height_of_small_trees() {
        let mut tree = WavlTree::new();
        assert_eq!(tree.height(), 0);

        tree.insert(1, ()).unwrap();
        assert_eq!(tree.height(), 1);

        tree.insert(2, ()).unwrap();
        tree.insert(3, ()).unwrap();
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn dotgraph_labels_ranks() {
        let mut tree = WavlTree::new();
        for key in [2, 1, 3] {
            tree.insert(key, ()).unwrap();
        }

        let mut out = String::new();
        tree.dotgraph("t", &mut out).unwrap();

        assert!(out.starts_with("digraph \"graph-t\""));
        assert!(out.contains("[label=\"2:1\"]"));
        assert!(out.contains("[label=\"1:0\"]"));
        assert!(out.contains("\"grapht-2\" -> \"grapht-1\";"));
        assert!(out.ends_with(" }\n}"));
    }

    #[test]
    fn dotgraph_of_empty_tree() {
        let tree: WavlTree<i32, ()> = WavlTree::new();
        let mut out = String::new();
        tree.dotgraph("empty", &mut out).unwrap();
        assert_eq!(out, "digraph \"graph-empty\" {}");
    }
}
