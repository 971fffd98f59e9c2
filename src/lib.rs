//! # rbmap
//!
//! An ordered key-value map backed by an arena-allocated red-black tree.
//!
//! ## Overview
//!
//! This library provides [`tree::RbTreeMap`], a mutable ordered map with
//! guaranteed O(log N) worst-case insert, remove, and lookup. The tree
//! nodes live in a contiguous arena and reference each other by index,
//! so parent back-references never form ownership cycles and rotations
//! stay O(1) pointer-free link surgery.
//!
//! - **Insert-only writes**: inserting an existing key fails with
//!   [`tree::DuplicateKeyError`] and leaves the map untouched.
//! - **Custom orderings**: a comparator can be supplied at construction
//!   for key types without a useful `Ord`, or to reverse an ordering.
//! - **Checkable invariants**: [`tree::RbTreeMap::validate`] verifies the
//!   red-black invariants on demand, for use in test harnesses.
//!
//! ## Example
//!
//! ```rust
//! use rbmap::tree::RbTreeMap;
//!
//! let mut map = RbTreeMap::new();
//! map.insert(2, "two").unwrap();
//! map.insert(1, "one").unwrap();
//! map.insert(3, "three").unwrap();
//!
//! assert_eq!(map.get(&2), Some(&"two"));
//! let keys: Vec<&i32> = map.keys().collect();
//! assert_eq!(keys, vec![&1, &2, &3]);
//! ```
//!
//! ## Concurrency
//!
//! The map is a single-threaded data structure with no internal locking.
//! It is `Send` when its keys, values, and comparator are, so independent
//! maps may live on different threads; sharing one map across threads
//! requires external synchronization enforced by the caller.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports the commonly used types.
///
/// # Usage
///
/// ```rust
/// use rbmap::prelude::*;
///
/// let mut map: RbTreeMap<u32, &str> = RbTreeMap::new();
/// assert!(map.insert(1, "one").is_ok());
/// ```
pub mod prelude {
    pub use crate::tree::{Color, Comparator, DuplicateKeyError, InvariantError, RbTreeMap};
}

pub mod tree;
