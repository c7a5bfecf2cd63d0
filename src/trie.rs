//! `TernaryTrie` — the intermediate, uncompressed ternary search trie
//! built by breadth-first iterating an [`ArenaTree`]. Exists only to
//! drive the [`crate::succinct::Succinct`] encoder; nothing else consumes
//! it.
//!
//! Ported from `s_index_ternary.c`: classic TST descent (next byte `<`
//! node char goes left, `==` consumes the byte and goes center, `>` goes
//! right), arena-allocated the same way as [`ArenaTree`].

use core::ops::ControlFlow;

#[cfg(not(feature = "std"))]
use alloc::collections::VecDeque;
#[cfg(feature = "std")]
use std::collections::VecDeque;

use crate::arena::{Arena, NodeId};
use crate::error::IndexError;
use crate::tree::ArenaTree;

struct TstNode {
    ch: u8,
    valid: bool,
    record: u64,
    left: NodeId,
    center: NodeId,
    right: NodeId,
}

#[derive(Clone, Copy)]
enum Slot {
    Root,
    Left,
    Center,
    Right,
}

/// The intermediate ternary search trie.
pub struct TernaryTrie {
    arena: Arena<TstNode>,
    root: NodeId,
    items: u64,
    nodes: u64,
}

impl TernaryTrie {
    fn empty(chunk_bytes: usize) -> Self {
        Self {
            arena: Arena::with_chunk_bytes(chunk_bytes),
            root: NodeId::NONE,
            items: 0,
            nodes: 0,
        }
    }

    /// Build a trie from every `(key, record)` pair in `tree`, visited in
    /// the tree's breadth-first order. Keys arriving from an `ArenaTree`
    /// are unique by construction, so the "already valid" branch the
    /// source's `update` tolerates never triggers here.
    pub fn new(tree: &ArenaTree) -> Result<Self, IndexError> {
        let mut trie = Self::empty(tree.chunk_bytes());
        let mut failure: Option<IndexError> = None;
        tree.iterate(|key, record| match trie.insert(key, record) {
            Ok(()) => ControlFlow::Continue(()),
            Err(e) => {
                failure = Some(e);
                ControlFlow::Break(())
            }
        })?;
        if let Some(e) = failure {
            return Err(e);
        }
        Ok(trie)
    }

    fn insert(&mut self, key: &[u8], record: u64) -> Result<(), IndexError> {
        debug_assert!(!key.is_empty());

        let mut cur = self.root;
        let mut parent = NodeId::NONE;
        let mut slot = Slot::Root;
        let mut idx = 0usize;

        loop {
            if cur.is_none() {
                let node = TstNode {
                    ch: key[idx],
                    valid: false,
                    record: 0,
                    left: NodeId::NONE,
                    center: NodeId::NONE,
                    right: NodeId::NONE,
                };
                let id = self.arena.alloc(node)?;
                self.nodes += 1;
                if self.root.is_none() {
                    self.root = id;
                }
                match slot {
                    Slot::Root => {}
                    Slot::Left => self.arena.get_mut(parent).left = id,
                    Slot::Center => self.arena.get_mut(parent).center = id,
                    Slot::Right => self.arena.get_mut(parent).right = id,
                }
                cur = id;
            }

            parent = cur;
            let ch = self.arena.get(cur).ch;
            let d = key[idx] as i32 - ch as i32;
            if d == 0 {
                idx += 1;
                if idx == key.len() {
                    let node = self.arena.get_mut(cur);
                    node.valid = true;
                    node.record = record;
                    self.items += 1;
                    break;
                }
                cur = self.arena.get(cur).center;
                slot = Slot::Center;
            } else if d < 0 {
                cur = self.arena.get(cur).left;
                slot = Slot::Left;
            } else {
                cur = self.arena.get(cur).right;
                slot = Slot::Right;
            }
        }
        Ok(())
    }

    /// Breadth-first traversal; the succinct encoder depends on this
    /// exact order. For each node: its character, which of its three
    /// children exist, and its record if it terminates a key.
    pub fn iterate<F>(&self, mut visitor: F) -> Result<(), IndexError>
    where
        F: FnMut(u8, bool, bool, bool, Option<u64>),
    {
        if self.root.is_none() {
            return Ok(());
        }
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        queue
            .try_reserve(self.nodes as usize)
            .map_err(|_| IndexError::OutOfMemory)?;
        queue.push_back(self.root);
        while let Some(id) = queue.pop_front() {
            let node = self.arena.get(id);
            visitor(
                node.ch,
                node.left.is_some(),
                node.center.is_some(),
                node.right.is_some(),
                if node.valid { Some(node.record) } else { None },
            );
            if node.left.is_some() {
                queue.push_back(node.left);
            }
            if node.center.is_some() {
                queue.push_back(node.center);
            }
            if node.right.is_some() {
                queue.push_back(node.right);
            }
        }
        Ok(())
    }

    /// Number of keys terminating in the trie.
    pub fn items(&self) -> u64 {
        self.items
    }

    /// Number of trie nodes.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }
}
