//! Error types for the red-black tree map.

use std::fmt;

/// Error returned by [`RbTreeMap::insert`](super::RbTreeMap::insert) when
/// the key is already present.
///
/// Insertion is insert-only: an equal key is never overwritten, and a
/// failed insert leaves the map completely unmutated. To change the value
/// stored under an existing key, use
/// [`RbTreeMap::get_mut`](super::RbTreeMap::get_mut).
///
/// # Examples
///
/// ```rust
/// use rbmap::tree::{DuplicateKeyError, RbTreeMap};
///
/// let mut map = RbTreeMap::new();
/// map.insert(1, "one").unwrap();
/// assert_eq!(map.insert(1, "ONE"), Err(DuplicateKeyError));
/// assert_eq!(map.get(&1), Some(&"one"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateKeyError;

impl fmt::Display for DuplicateKeyError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "key is already present in the map; insert never overwrites"
        )
    }
}

impl std::error::Error for DuplicateKeyError {}

/// A red-black tree invariant violation reported by
/// [`RbTreeMap::validate`](super::RbTreeMap::validate).
///
/// A violation always indicates a logic bug inside the tree, never a
/// recoverable runtime condition; the checker exists so tests can catch
/// such bugs, not to guard production calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantError {
    /// The root node is red.
    RootNotBlack,
    /// A red node has a red child.
    RedRedViolation,
    /// Two root-to-leaf paths pass through different numbers of black
    /// nodes.
    BlackHeightMismatch {
        /// Black count of the first complete path visited.
        expected: usize,
        /// Black count of the offending path.
        found: usize,
    },
    /// The in-order key sequence is not strictly increasing under the
    /// map's comparator.
    OrderViolation,
    /// The recorded length disagrees with the number of reachable nodes.
    LengthMismatch {
        /// Length recorded by the map.
        len: usize,
        /// Nodes actually reachable from the root.
        reachable: usize,
    },
    /// A child's parent back-reference does not point at its parent, or
    /// the root has a parent.
    LinkCorruption,
}

impl fmt::Display for InvariantError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotBlack => write!(formatter, "root node is red"),
            Self::RedRedViolation => write!(formatter, "red node has a red child"),
            Self::BlackHeightMismatch { expected, found } => write!(
                formatter,
                "unequal black-heights: expected {expected}, found {found}"
            ),
            Self::OrderViolation => {
                write!(formatter, "in-order keys are not strictly increasing")
            }
            Self::LengthMismatch { len, reachable } => write!(
                formatter,
                "recorded length {len} but {reachable} reachable nodes"
            ),
            Self::LinkCorruption => {
                write!(formatter, "parent back-reference is inconsistent")
            }
        }
    }
}

impl std::error::Error for InvariantError {}
