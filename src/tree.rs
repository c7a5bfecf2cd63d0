//! `ArenaTree` — the mutable phase: an AVL tree mapping byte-string keys
//! to `u64` records, arena-allocated per [`crate::arena`].
//!
//! Ported directly from `s_index_tree.c`: the four AVL rotations, the
//! recursive `update`/rebalance, `min`/`max`, and the `next`/`prev`
//! "remember the last leftward (or rightward) turn" descent all follow
//! the source's control flow, operating on [`NodeId`]s instead of raw
//! pointers.

use core::cmp::Ordering;
use core::ops::ControlFlow;

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, vec::Vec};
#[cfg(not(feature = "std"))]
use alloc::collections::VecDeque;
#[cfg(feature = "std")]
use std::collections::VecDeque;

use crate::arena::{Arena, NodeId, DEFAULT_CHUNK_BYTES};
use crate::error::IndexError;
use crate::validate_key;

struct AvlNode {
    depth: i32,
    record: u64,
    left: NodeId,
    right: NodeId,
    key: Box<[u8]>,
}

/// The mutable, AVL-balanced `bytes -> u64` dictionary.
pub struct ArenaTree {
    arena: Arena<AvlNode>,
    root: NodeId,
    items: u64,
    chunk_bytes: usize,
}

#[inline]
fn delta(arena: &Arena<AvlNode>, id: NodeId) -> i32 {
    if id.is_none() {
        -1
    } else {
        arena.get(id).depth
    }
}

#[inline]
fn depth_of(arena: &Arena<AvlNode>, a: NodeId, b: NodeId) -> i32 {
    let da = delta(arena, a);
    let db = delta(arena, b);
    if da > db {
        da + 1
    } else {
        db + 1
    }
}

#[inline]
fn balance_factor(arena: &Arena<AvlNode>, id: NodeId) -> i32 {
    let node = arena.get(id);
    delta(arena, node.left) - delta(arena, node.right)
}

fn rotate_right(arena: &mut Arena<AvlNode>, node_id: NodeId) -> NodeId {
    let root_id = arena.get(node_id).left;
    let transferred = arena.get(root_id).right;
    arena.get_mut(node_id).left = transferred;
    arena.get_mut(root_id).right = node_id;

    let (nl, nr) = {
        let n = arena.get(node_id);
        (n.left, n.right)
    };
    arena.get_mut(node_id).depth = depth_of(arena, nl, nr);

    let rl = arena.get(root_id).left;
    arena.get_mut(root_id).depth = depth_of(arena, rl, node_id);

    root_id
}

fn rotate_left(arena: &mut Arena<AvlNode>, node_id: NodeId) -> NodeId {
    let root_id = arena.get(node_id).right;
    let transferred = arena.get(root_id).left;
    arena.get_mut(node_id).right = transferred;
    arena.get_mut(root_id).left = node_id;

    let (nl, nr) = {
        let n = arena.get(node_id);
        (n.left, n.right)
    };
    arena.get_mut(node_id).depth = depth_of(arena, nl, nr);

    let rr = arena.get(root_id).right;
    arena.get_mut(root_id).depth = depth_of(arena, node_id, rr);

    root_id
}

fn rotate_left_right(arena: &mut Arena<AvlNode>, node_id: NodeId) -> NodeId {
    let left = arena.get(node_id).left;
    let new_left = rotate_left(arena, left);
    arena.get_mut(node_id).left = new_left;
    rotate_right(arena, node_id)
}

fn rotate_right_left(arena: &mut Arena<AvlNode>, node_id: NodeId) -> NodeId {
    let right = arena.get(node_id).right;
    let new_right = rotate_right(arena, right);
    arena.get_mut(node_id).right = new_right;
    rotate_left(arena, node_id)
}

/// Recursively insert `key`, rebalancing on the way back up. Returns the
/// (possibly rotated) subtree root, the id of the node holding `key`, and
/// whether a new node was created.
fn update_rec(
    arena: &mut Arena<AvlNode>,
    root: NodeId,
    key: &[u8],
) -> Result<(NodeId, NodeId, bool), IndexError> {
    if root.is_none() {
        let mut kb = Vec::new();
        kb.try_reserve_exact(key.len())
            .map_err(|_| IndexError::OutOfMemory)?;
        kb.extend_from_slice(key);
        let node = AvlNode {
            depth: 0,
            record: 0,
            left: NodeId::NONE,
            right: NodeId::NONE,
            key: kb.into_boxed_slice(),
        };
        let id = arena.alloc(node)?;
        return Ok((id, id, true));
    }

    let cmp = key.cmp(&arena.get(root).key[..]);
    let (new_root, target, inserted) = match cmp {
        Ordering::Equal => (root, root, false),
        Ordering::Less => {
            let left = arena.get(root).left;
            let (new_left, target, inserted) = update_rec(arena, left, key)?;
            arena.get_mut(root).left = new_left;
            let mut subtree_root = root;
            if balance_factor(arena, root).abs() > 1 {
                let left = arena.get(root).left;
                if key.cmp(&arena.get(left).key[..]) == Ordering::Less {
                    subtree_root = rotate_right(arena, root);
                } else {
                    subtree_root = rotate_left_right(arena, root);
                }
            }
            (subtree_root, target, inserted)
        }
        Ordering::Greater => {
            let right = arena.get(root).right;
            let (new_right, target, inserted) = update_rec(arena, right, key)?;
            arena.get_mut(root).right = new_right;
            let mut subtree_root = root;
            if balance_factor(arena, root).abs() > 1 {
                let right = arena.get(root).right;
                if key.cmp(&arena.get(right).key[..]) == Ordering::Greater {
                    subtree_root = rotate_left(arena, root);
                } else {
                    subtree_root = rotate_right_left(arena, root);
                }
            }
            (subtree_root, target, inserted)
        }
    };
    let (nl, nr) = {
        let n = arena.get(new_root);
        (n.left, n.right)
    };
    arena.get_mut(new_root).depth = depth_of(arena, nl, nr);
    Ok((new_root, target, inserted))
}

fn min_node(arena: &Arena<AvlNode>, mut root: NodeId) -> NodeId {
    loop {
        let left = arena.get(root).left;
        if left.is_none() {
            return root;
        }
        root = left;
    }
}

fn max_node(arena: &Arena<AvlNode>, mut root: NodeId) -> NodeId {
    loop {
        let right = arena.get(root).right;
        if right.is_none() {
            return root;
        }
        root = right;
    }
}

/// Smallest key strictly greater than `key` in the subtree rooted at `root`.
fn next_node(arena: &Arena<AvlNode>, mut root: NodeId, key: &[u8]) -> NodeId {
    let mut candidate = NodeId::NONE;
    while root.is_some() {
        let node = arena.get(root);
        match key.cmp(&node.key[..]) {
            Ordering::Equal => {
                if node.right.is_some() {
                    return min_node(arena, node.right);
                }
                break;
            }
            Ordering::Less => {
                candidate = root;
                root = node.left;
            }
            Ordering::Greater => {
                root = node.right;
            }
        }
    }
    candidate
}

/// Largest key strictly less than `key` in the subtree rooted at `root`.
fn prev_node(arena: &Arena<AvlNode>, mut root: NodeId, key: &[u8]) -> NodeId {
    let mut candidate = NodeId::NONE;
    while root.is_some() {
        let node = arena.get(root);
        match key.cmp(&node.key[..]) {
            Ordering::Equal => {
                if node.left.is_some() {
                    return max_node(arena, node.left);
                }
                break;
            }
            Ordering::Greater => {
                candidate = root;
                root = node.right;
            }
            Ordering::Less => {
                root = node.left;
            }
        }
    }
    candidate
}

impl ArenaTree {
    /// An empty tree with the default (1 MiB) arena chunk size.
    pub fn new() -> Self {
        Self::with_chunk_bytes(DEFAULT_CHUNK_BYTES)
    }

    pub fn with_chunk_bytes(chunk_bytes: usize) -> Self {
        Self {
            arena: Arena::with_chunk_bytes(chunk_bytes),
            root: NodeId::NONE,
            items: 0,
            chunk_bytes,
        }
    }

    /// Free every arena and reset to the initial empty state.
    pub fn truncate(&mut self) {
        self.arena.truncate();
        self.root = NodeId::NONE;
        self.items = 0;
    }

    /// Insert `key` if absent, returning a mutable handle to its record.
    /// If `key` already exists, no structural change occurs and the
    /// existing record is returned.
    pub fn update(&mut self, key: &[u8]) -> Result<&mut u64, IndexError> {
        validate_key(key)?;
        let (new_root, target, inserted) = update_rec(&mut self.arena, self.root, key)?;
        self.root = new_root;
        if inserted {
            self.items += 1;
        }
        Ok(&mut self.arena.get_mut(target).record)
    }

    /// Standard BST descent; `O(log n)`.
    pub fn find(&mut self, key: &[u8]) -> Option<&mut u64> {
        let mut cur = self.root;
        loop {
            if cur.is_none() {
                return None;
            }
            let (cmp, left, right) = {
                let node = self.arena.get(cur);
                (key.cmp(&node.key[..]), node.left, node.right)
            };
            match cmp {
                Ordering::Equal => return Some(&mut self.arena.get_mut(cur).record),
                Ordering::Less => cur = left,
                Ordering::Greater => cur = right,
            }
        }
    }

    /// Lexicographic successor of `key` (or the minimum key if `key` is
    /// `None`/empty). `key` need not exist in the tree.
    pub fn next(&mut self, key: Option<&[u8]>, out_key: &mut Vec<u8>) -> Option<&mut u64> {
        let target = match key {
            Some(k) if !k.is_empty() => next_node(&self.arena, self.root, k),
            _ => {
                if self.root.is_some() {
                    min_node(&self.arena, self.root)
                } else {
                    NodeId::NONE
                }
            }
        };
        if target.is_none() {
            return None;
        }
        out_key.clear();
        out_key.extend_from_slice(&self.arena.get(target).key);
        Some(&mut self.arena.get_mut(target).record)
    }

    /// Lexicographic predecessor of `key` (or the maximum key if `key` is
    /// `None`/empty). `key` need not exist in the tree.
    pub fn prev(&mut self, key: Option<&[u8]>, out_key: &mut Vec<u8>) -> Option<&mut u64> {
        let target = match key {
            Some(k) if !k.is_empty() => prev_node(&self.arena, self.root, k),
            _ => {
                if self.root.is_some() {
                    max_node(&self.arena, self.root)
                } else {
                    NodeId::NONE
                }
            }
        };
        if target.is_none() {
            return None;
        }
        out_key.clear();
        out_key.extend_from_slice(&self.arena.get(target).key);
        Some(&mut self.arena.get_mut(target).record)
    }

    /// Breadth-first traversal. The visitor may return
    /// `ControlFlow::Break(())` to stop early.
    pub fn iterate<F>(&self, mut visitor: F) -> Result<ControlFlow<()>, IndexError>
    where
        F: FnMut(&[u8], u64) -> ControlFlow<()>,
    {
        if self.root.is_none() {
            return Ok(ControlFlow::Continue(()));
        }
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        queue
            .try_reserve(self.items as usize)
            .map_err(|_| IndexError::OutOfMemory)?;
        queue.push_back(self.root);
        while let Some(id) = queue.pop_front() {
            let (left, right) = {
                let node = self.arena.get(id);
                if visitor(&node.key, node.record).is_break() {
                    return Ok(ControlFlow::Break(()));
                }
                (node.left, node.right)
            };
            if left.is_some() {
                queue.push_back(left);
            }
            if right.is_some() {
                queue.push_back(right);
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Count of stored keys.
    pub fn items(&self) -> u64 {
        self.items
    }

    pub(crate) fn chunk_bytes(&self) -> usize {
        self.chunk_bytes
    }
}

impl Default for ArenaTree {
    fn default() -> Self {
        Self::new()
    }
}
