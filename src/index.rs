//! `Index` — the public facade dispatching between the mutable
//! [`ArenaTree`] phase and the compressed [`Succinct`] phase.
//!
//! Ported from `s_index.c`'s `struct s_index { tree, ternary, succinct }`
//! and its `s__index_*` dispatch functions, which pick whichever of
//! `tree`/`succinct` is non-null. Rust expresses that same "exactly one
//! of these is live" invariant as an enum instead of two nullable fields.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::error::IndexError;
use crate::succinct::Succinct;
use crate::tree::ArenaTree;
use crate::trie::TernaryTrie;
use crate::Config;

enum State {
    Mutable(ArenaTree),
    Compressed(Succinct),
}

/// An ordered `bytes -> u64` index.
///
/// Starts in the mutable phase, where [`Self::update`] inserts keys and
/// [`Self::find`]/[`Self::next`]/[`Self::prev`] query an AVL tree.
/// [`Self::compress`] encodes the current key set into a read-only
/// succinct structure; once compressed, further [`Self::update`] or
/// [`Self::compress`] calls are rejected with `InvalidState` until
/// [`Self::truncate`] returns the index to the mutable phase.
pub struct Index {
    state: State,
    config: Config,
}

impl Index {
    /// A new, empty index in the mutable phase.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            state: State::Mutable(ArenaTree::with_chunk_bytes(config.arena_chunk_bytes)),
            config,
        }
    }

    /// Drop all keys and return to an empty mutable phase.
    pub fn truncate(&mut self) {
        match &mut self.state {
            State::Mutable(tree) => tree.truncate(),
            State::Compressed(_) => {
                self.state = State::Mutable(ArenaTree::with_chunk_bytes(self.config.arena_chunk_bytes));
            }
        }
    }

    /// Encode the current key set into a succinct, read-only structure.
    ///
    /// Errors with `InvalidState` if the index is already compressed —
    /// the source asserts the same (`s__index_compress` requires
    /// `!index->succinct`).
    ///
    /// If this fails partway (allocation failure while building the
    /// intermediate trie or the succinct encoding), the index is left
    /// exactly as it was before the call — still mutable, with every
    /// previously inserted key intact. The prior mutable tree is only
    /// ever discarded after the succinct structure has been built
    /// successfully.
    pub fn compress(&mut self) -> Result<(), IndexError> {
        match &self.state {
            State::Mutable(tree) => {
                let trie = TernaryTrie::new(tree)?;
                let succinct = Succinct::new(&trie)?;
                self.state = State::Compressed(succinct);
                Ok(())
            }
            State::Compressed(_) => Err(IndexError::InvalidState("index is already compressed")),
        }
    }

    /// Insert `key` if absent, returning a mutable handle to its record.
    ///
    /// Errors with `InvalidState` if the index is compressed — the
    /// source asserts the same (`s__index_update` requires
    /// `!index->succinct`). Call [`Self::truncate`] or build a fresh
    /// mutable index to insert again after compressing.
    pub fn update(&mut self, key: &[u8]) -> Result<&mut u64, IndexError> {
        match &mut self.state {
            State::Mutable(tree) => tree.update(key),
            State::Compressed(_) => Err(IndexError::InvalidState("index is compressed; updates are forbidden")),
        }
    }

    /// Exact lookup, in either phase.
    pub fn find(&mut self, key: &[u8]) -> Option<&mut u64> {
        match &mut self.state {
            State::Mutable(tree) => tree.find(key),
            State::Compressed(succinct) => succinct.find(key),
        }
    }

    /// Lexicographic successor of `key` (or the minimum key if `key` is
    /// `None`). `key` need not exist in the index.
    pub fn next(&mut self, key: Option<&[u8]>, out_key: &mut Vec<u8>) -> Option<&mut u64> {
        match &mut self.state {
            State::Mutable(tree) => tree.next(key, out_key),
            State::Compressed(succinct) => succinct.next(key, out_key),
        }
    }

    /// Lexicographic predecessor of `key` (or the maximum key if `key`
    /// is `None`). `key` need not exist in the index.
    pub fn prev(&mut self, key: Option<&[u8]>, out_key: &mut Vec<u8>) -> Option<&mut u64> {
        match &mut self.state {
            State::Mutable(tree) => tree.prev(key, out_key),
            State::Compressed(succinct) => succinct.prev(key, out_key),
        }
    }

    /// Count of stored keys.
    pub fn items(&self) -> u64 {
        match &self.state {
            State::Mutable(tree) => tree.items(),
            State::Compressed(succinct) => succinct.items(),
        }
    }

    /// `true` once [`Self::compress`] has built a succinct structure;
    /// `false` again after [`Self::truncate`].
    pub fn is_compressed(&self) -> bool {
        matches!(self.state, State::Compressed(_))
    }
}

impl Default for Index {
    fn default() -> Self {
        Self::new()
    }
}
