//! The crate's single error type.

use core::fmt;

/// Everything that can go wrong while building or mutating an [`Index`](crate::Index).
///
/// Lookups of missing keys are never errors — `find`/`next`/`prev` return
/// `None` for those. This enum only covers allocation failure and caller
/// contract violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexError {
    /// An allocation failed while growing an arena, a bitmap, or the
    /// succinct `keys`/`records` arrays.
    OutOfMemory,

    /// A key violated the key contract: empty, `>= MAX_KEY_LEN` bytes, or
    /// containing an embedded `0` byte. The payload names which.
    InvalidArgument(&'static str),

    /// An operation was attempted in a state that forbids it (`update` on
    /// a compressed index, `compress` on an already-compressed index).
    InvalidState(&'static str),
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::OutOfMemory => write!(f, "out of memory"),
            IndexError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            IndexError::InvalidState(msg) => write!(f, "invalid state: {msg}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for IndexError {}
