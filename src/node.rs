use core::{mem, ops::Not};

use crate::arena::Handle;

/// A child or parent link. `None` is the absence marker.
pub(crate) type Link = Option<Handle>;

/// Rank of a missing child.
pub(crate) const ABSENT_RANK: i8 = -1;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

pub(crate) struct Node<K, V> {
    pub(crate) links: Links,
    pub(crate) key: K,
    pub(crate) value: V,
}

impl<K, V> Node<K, V> {
    pub(crate) const fn new(key: K, value: V) -> Self {
        Node {
            links: Links::new(),
            key,
            value,
        }
    }
}

/// Structural fields of a node: tree links, rank and subtree size.
pub(crate) struct Links {
    parent: Link,
    children: [Link; 2],
    rank: i8,
    size: usize,
}

impl Links {
    /// Links of a freshly inserted leaf: rank 0, size 1, no neighbours.
    pub(crate) const fn new() -> Self {
        Links {
            parent: None,
            children: [None; 2],
            rank: 0,
            size: 1,
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.left().is_none() && self.right().is_none()
    }

    #[inline]
    pub(crate) fn rank(&self) -> i8 {
        self.rank
    }

    #[inline]
    pub(crate) fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub(crate) fn parent(&self) -> Link {
        self.parent
    }

    #[inline]
    pub(crate) fn child(&self, dir: Dir) -> Link {
        self.children[dir as usize]
    }

    #[inline]
    pub(crate) fn left(&self) -> Link {
        self.child(Dir::Left)
    }

    #[inline]
    pub(crate) fn right(&self) -> Link {
        self.child(Dir::Right)
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Link) -> Link {
        mem::replace(&mut self.parent, parent)
    }

    #[inline]
    pub(crate) fn set_child(&mut self, dir: Dir, child: Link) -> Link {
        mem::replace(&mut self.children[dir as usize], child)
    }

    #[inline]
    pub(crate) fn set_left(&mut self, left: Link) -> Link {
        self.set_child(Dir::Left, left)
    }

    #[inline]
    pub(crate) fn set_right(&mut self, right: Link) -> Link {
        self.set_child(Dir::Right, right)
    }

    #[inline]
    pub(crate) fn set_rank(&mut self, rank: i8) {
        self.rank = rank;
    }

    #[inline]
    pub(crate) fn set_size(&mut self, size: usize) {
        self.size = size;
    }
}
