//! Read-only red-black invariant checker.
//!
//! The checker is a test-harness tool, not a runtime guard: a violation
//! always means a logic bug in the tree itself, so production code never
//! calls it. It walks the tree with explicit stacks rather than
//! recursion, so it stays safe on adversarially large inputs even though
//! a balanced tree would keep recursion shallow.

use std::cmp::Ordering;

use super::error::InvariantError;
use super::map::{Color, Comparator, NIL, RbTreeMap};

impl<K, V, C: Comparator<K>> RbTreeMap<K, V, C> {
    /// Verifies every red-black tree invariant, returning the first
    /// violation found.
    ///
    /// Checked, in order:
    /// 1. the root (if present) is black and has no parent;
    /// 2. every child's parent back-reference points at its parent;
    /// 3. no red node has a red child;
    /// 4. every root-to-absent-child path has the same black count;
    /// 5. the recorded length equals the number of reachable nodes;
    /// 6. the in-order key sequence is strictly increasing under the
    ///    map's comparator.
    ///
    /// Read-only and O(N).
    ///
    /// # Errors
    ///
    /// Returns the [`InvariantError`] describing the first violated
    /// invariant. Any violation indicates a bug in the tree code, not a
    /// recoverable runtime condition.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmap::tree::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// for key in [5, 2, 8, 1, 9] {
    ///     map.insert(key, ()).unwrap();
    /// }
    /// assert!(map.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), InvariantError> {
        let root = self.root_id();
        if root == NIL {
            return if self.len() == 0 {
                Ok(())
            } else {
                Err(InvariantError::LengthMismatch {
                    len: self.len(),
                    reachable: 0,
                })
            };
        }
        if self.color_of(root) != Color::Black {
            return Err(InvariantError::RootNotBlack);
        }
        if self.node(root).parent != NIL {
            return Err(InvariantError::LinkCorruption);
        }

        self.check_structure(root)?;
        self.check_order(root)
    }

    /// Structural pass: links, colors, black-heights, reachable count.
    fn check_structure(&self, root: usize) -> Result<(), InvariantError> {
        let mut reachable = 0_usize;
        let mut expected_black = None;
        let mut stack = vec![(root, 0_usize)];
        while let Some((id, blacks_above)) = stack.pop() {
            reachable += 1;
            let node = self.node(id);
            let blacks = blacks_above + usize::from(node.color == Color::Black);
            for child in [node.left, node.right] {
                if child == NIL {
                    // A complete path ends here; all must agree.
                    match expected_black {
                        None => expected_black = Some(blacks),
                        Some(expected) if expected != blacks => {
                            return Err(InvariantError::BlackHeightMismatch {
                                expected,
                                found: blacks,
                            });
                        }
                        Some(_) => {}
                    }
                } else {
                    let child_node = self.node(child);
                    if child_node.parent != id {
                        return Err(InvariantError::LinkCorruption);
                    }
                    if node.color == Color::Red && child_node.color == Color::Red {
                        return Err(InvariantError::RedRedViolation);
                    }
                    stack.push((child, blacks));
                }
            }
        }
        if reachable != self.len() {
            return Err(InvariantError::LengthMismatch {
                len: self.len(),
                reachable,
            });
        }
        Ok(())
    }

    /// Ordering pass: in-order keys strictly increase under the
    /// comparator.
    fn check_order(&self, root: usize) -> Result<(), InvariantError> {
        let mut previous: Option<&K> = None;
        let mut stack = Vec::new();
        let mut cursor = root;
        while cursor != NIL || !stack.is_empty() {
            if cursor != NIL {
                stack.push(cursor);
                cursor = self.node(cursor).left;
            } else if let Some(id) = stack.pop() {
                let key = &self.node(id).key;
                if let Some(previous_key) = previous
                    && self.comparator().compare(previous_key, key) != Ordering::Less
                {
                    return Err(InvariantError::OrderViolation);
                }
                previous = Some(key);
                cursor = self.node(id).right;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn int_map(keys: &[i32]) -> RbTreeMap<i32, ()> {
        let mut map = RbTreeMap::new();
        for &key in keys {
            map.insert(key, ()).unwrap();
        }
        map
    }

    #[rstest]
    fn test_empty_map_is_valid() {
        let map: RbTreeMap<i32, ()> = RbTreeMap::new();
        assert!(map.validate().is_ok());
    }

    #[rstest]
    fn test_built_map_is_valid() {
        let map = int_map(&[8, 3, 10, 1, 6, 14, 4, 7, 13]);
        assert!(map.validate().is_ok());
    }

    #[rstest]
    fn test_detects_red_root() {
        let mut map = int_map(&[1]);
        let root = map.root_id();
        map.node_mut(root).color = Color::Red;
        assert_eq!(map.validate(), Err(InvariantError::RootNotBlack));
    }

    #[rstest]
    fn test_detects_red_red_violation() {
        let mut map = int_map(&[10, 20, 30]);
        map.insert(5, ()).unwrap();
        // Shape: 20(B) { 10(B) { 5(R), _ }, 30(B) }. Reddening 10
        // creates the adjacent pair 10(R)-5(R).
        let left = map.root().unwrap().left().unwrap();
        assert_eq!(*left.key(), 10);
        let root = map.root_id();
        let left_id = map.node(root).left;
        map.node_mut(left_id).color = Color::Red;
        assert_eq!(map.validate(), Err(InvariantError::RedRedViolation));
    }

    #[rstest]
    fn test_detects_black_height_mismatch() {
        let mut map = int_map(&[10, 20, 30]);
        // Blackening a red leaf lengthens one path's black count.
        let root = map.root_id();
        let left_id = map.node(root).left;
        map.node_mut(left_id).color = Color::Black;
        assert!(matches!(
            map.validate(),
            Err(InvariantError::BlackHeightMismatch { .. })
        ));
    }

    #[rstest]
    fn test_detects_length_mismatch() {
        let mut map = int_map(&[1, 2, 3]);
        // Disconnect a leaf without updating the recorded length.
        let root = map.root_id();
        map.node_mut(root).left = NIL;
        assert!(matches!(
            map.validate(),
            Err(InvariantError::LengthMismatch { .. })
        ));
    }

    #[rstest]
    fn test_detects_link_corruption() {
        let mut map = int_map(&[1, 2, 3]);
        let root = map.root_id();
        let left_id = map.node(root).left;
        map.node_mut(left_id).parent = left_id;
        assert_eq!(map.validate(), Err(InvariantError::LinkCorruption));
    }

    #[rstest]
    fn test_detects_order_violation() {
        let mut map = int_map(&[2, 1, 3]);
        // Swap the payloads of the two leaves; structure stays legal but
        // the in-order sequence becomes 3, 2, 1.
        let root = map.root_id();
        let left_id = map.node(root).left;
        let right_id = map.node(root).right;
        map.node_mut(left_id).key = 3;
        map.node_mut(right_id).key = 1;
        assert_eq!(map.validate(), Err(InvariantError::OrderViolation));
    }
}
