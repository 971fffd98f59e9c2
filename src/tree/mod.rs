//! Ordered map backed by an arena-allocated red-black tree.
//!
//! This module provides [`RbTreeMap`], a mutable ordered map over a
//! self-balancing binary search tree.
//!
//! # Overview
//!
//! - O(log N) get / insert / remove
//! - O(log N) min / max
//! - O(1) len and `is_empty`
//! - O(N) in-order iteration
//!
//! Nodes are stored in a contiguous arena and linked by index, with a
//! reserved sentinel index standing in for "no node". Deleted slots are
//! kept on a free list and reused by later inserts, so a long-lived map
//! does not leak arena capacity.
//!
//! # Examples
//!
//! ```rust
//! use rbmap::tree::RbTreeMap;
//!
//! let mut map = RbTreeMap::new();
//! map.insert(3, "three").unwrap();
//! map.insert(1, "one").unwrap();
//! map.insert(2, "two").unwrap();
//!
//! // Entries are always in sorted order
//! let keys: Vec<&i32> = map.keys().collect();
//! assert_eq!(keys, vec![&1, &2, &3]);
//!
//! // Inserts never overwrite
//! assert!(map.insert(2, "TWO").is_err());
//! assert_eq!(map.get(&2), Some(&"two"));
//! ```
//!
//! # Internal Structure
//!
//! The red-black tree maintains the following invariants:
//! 1. Every node is either red or black
//! 2. The root is black
//! 3. Absent children count as black
//! 4. Red nodes have only black children
//! 5. Every path from the root to an absent child has the same number of
//!    black nodes
//!
//! These invariants bound the tree height by `2 * log2(N + 1)`.
//! [`RbTreeMap::validate`] checks them (together with ordering, size, and
//! link consistency) for use in test harnesses.

mod error;
mod iter;
mod map;
mod validate;

pub use error::DuplicateKeyError;
pub use error::InvariantError;
pub use iter::RbTreeMapIntoIterator;
pub use iter::RbTreeMapIterator;
pub use iter::RbTreeMapKeys;
pub use iter::RbTreeMapValues;
pub use map::Color;
pub use map::Comparator;
pub use map::NaturalOrder;
pub use map::NodeRef;
pub use map::RbTreeMap;
