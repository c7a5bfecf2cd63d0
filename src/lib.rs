//! An ordered, string-keyed index with two phases: a mutable AVL-tree
//! phase for inserts and point lookups, and a read-only succinct phase
//! — a rank-indexed bitmap encoding of a ternary search trie — for
//! compact storage once the key set has stabilized.
//!
//! ```
//! use succinct_index::Index;
//!
//! let mut index = Index::new();
//! *index.update(b"B").unwrap() = 123;
//! assert_eq!(index.find(b"B"), Some(&mut 123));
//!
//! index.compress().unwrap();
//! assert_eq!(index.find(b"B"), Some(&mut 123));
//! ```

// Use no_std unless std feature is enabled or we're in test mode.
#![cfg_attr(not(any(test, feature = "std")), no_std)]

// When using no_std, we need to explicitly link the alloc crate.
#[cfg(not(any(test, feature = "std")))]
extern crate alloc;

// When using std, re-export alloc types from std for compatibility.
#[cfg(any(test, feature = "std"))]
extern crate std as alloc;

pub mod arena;
pub mod bitmap;
pub mod error;
pub mod index;
pub mod succinct;
pub mod tree;
pub mod trie;

pub use error::IndexError;
pub use index::Index;

/// The largest key this crate accepts, matching the source's
/// `int16_t`-length-prefixed key encoding.
pub const MAX_KEY_LEN: usize = 32_767;

/// Reject empty keys, keys at or over [`MAX_KEY_LEN`] bytes, and keys
/// containing an embedded `0` byte; every mutating entry point funnels
/// through this before touching the tree.
pub(crate) fn validate_key(key: &[u8]) -> Result<(), IndexError> {
    if key.is_empty() {
        Err(IndexError::InvalidArgument("key must not be empty"))
    } else if key.len() >= MAX_KEY_LEN {
        Err(IndexError::InvalidArgument("key exceeds the maximum length"))
    } else if key.contains(&0) {
        Err(IndexError::InvalidArgument("key must not contain an embedded 0 byte"))
    } else {
        Ok(())
    }
}

/// Tunable knobs for a new [`Index`].
///
/// `arena_chunk_bytes` mirrors the source's `CHUNK_SIZE`: the byte size
/// of each chunk backing the mutable tree's arena and the intermediate
/// trie built during [`Index::compress`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub arena_chunk_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            arena_chunk_bytes: arena::DEFAULT_CHUNK_BYTES,
        }
    }
}
