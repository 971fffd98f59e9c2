//! In-order iterators over the tree map.
//!
//! All iterators walk the tree with an explicit stack instead of
//! recursion. The balanced height keeps the stack at O(log N) entries.

use super::map::{NIL, RbTreeMap};

// =============================================================================
// Borrowing Iterator
// =============================================================================

/// Borrowing in-order iterator over `(&K, &V)` pairs.
///
/// Created by [`RbTreeMap::iter`].
pub struct RbTreeMapIterator<'map, K, V, C> {
    map: &'map RbTreeMap<K, V, C>,
    stack: Vec<usize>,
    remaining: usize,
}

impl<'map, K, V, C> RbTreeMapIterator<'map, K, V, C> {
    fn new(map: &'map RbTreeMap<K, V, C>) -> Self {
        let mut iterator = Self {
            map,
            stack: Vec::new(),
            remaining: map.len(),
        };
        iterator.push_left_spine(map.root_id());
        iterator
    }

    /// Pushes `id` and every left descendant onto the stack.
    fn push_left_spine(&mut self, mut id: usize) {
        while id != NIL {
            self.stack.push(id);
            id = self.map.node(id).left;
        }
    }
}

impl<'map, K, V, C> Iterator for RbTreeMapIterator<'map, K, V, C> {
    type Item = (&'map K, &'map V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.map.node(id);
        self.push_left_spine(node.right);
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, C> ExactSizeIterator for RbTreeMapIterator<'_, K, V, C> {}

impl<K, V, C> std::iter::FusedIterator for RbTreeMapIterator<'_, K, V, C> {}

// =============================================================================
// Key / Value Projections
// =============================================================================

/// Iterator over the keys in sorted order.
///
/// Created by [`RbTreeMap::keys`].
pub struct RbTreeMapKeys<'map, K, V, C> {
    inner: RbTreeMapIterator<'map, K, V, C>,
}

impl<'map, K, V, C> Iterator for RbTreeMapKeys<'map, K, V, C> {
    type Item = &'map K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, C> ExactSizeIterator for RbTreeMapKeys<'_, K, V, C> {}

/// Iterator over the values in key order.
///
/// Created by [`RbTreeMap::values`].
pub struct RbTreeMapValues<'map, K, V, C> {
    inner: RbTreeMapIterator<'map, K, V, C>,
}

impl<'map, K, V, C> Iterator for RbTreeMapValues<'map, K, V, C> {
    type Item = &'map V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, C> ExactSizeIterator for RbTreeMapValues<'_, K, V, C> {}

// =============================================================================
// Consuming Iterator
// =============================================================================

/// Consuming in-order iterator over `(K, V)` pairs.
///
/// Created by [`IntoIterator::into_iter`] on an owned map; drains the
/// arena in key order.
pub struct RbTreeMapIntoIterator<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for RbTreeMapIntoIterator<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> ExactSizeIterator for RbTreeMapIntoIterator<K, V> {}

impl<K, V> std::iter::FusedIterator for RbTreeMapIntoIterator<K, V> {}

// =============================================================================
// RbTreeMap Iteration Surface
// =============================================================================

impl<K, V, C> RbTreeMap<K, V, C> {
    /// Returns a borrowing in-order iterator over `(&K, &V)` pairs.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmap::tree::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// map.insert(2, "two").unwrap();
    /// map.insert(1, "one").unwrap();
    ///
    /// let entries: Vec<(&i32, &&str)> = map.iter().collect();
    /// assert_eq!(entries, vec![(&1, &"one"), (&2, &"two")]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> RbTreeMapIterator<'_, K, V, C> {
        RbTreeMapIterator::new(self)
    }

    /// Returns an iterator over the keys in sorted order.
    #[must_use]
    pub fn keys(&self) -> RbTreeMapKeys<'_, K, V, C> {
        RbTreeMapKeys { inner: self.iter() }
    }

    /// Returns an iterator over the values in key order.
    #[must_use]
    pub fn values(&self) -> RbTreeMapValues<'_, K, V, C> {
        RbTreeMapValues { inner: self.iter() }
    }
}

impl<'map, K, V, C> IntoIterator for &'map RbTreeMap<K, V, C> {
    type Item = (&'map K, &'map V);
    type IntoIter = RbTreeMapIterator<'map, K, V, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, C> IntoIterator for RbTreeMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = RbTreeMapIntoIterator<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        RbTreeMapIntoIterator {
            entries: self.into_entries().into_iter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_iter_yields_sorted_pairs() {
        let mut map = RbTreeMap::new();
        for key in [5, 3, 8, 1, 4] {
            map.insert(key, key * 2).unwrap();
        }
        let keys: Vec<i32> = map.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, vec![1, 3, 4, 5, 8]);
    }

    #[rstest]
    fn test_iter_is_exact_size() {
        let mut map = RbTreeMap::new();
        for key in 0..10 {
            map.insert(key, ()).unwrap();
        }
        let mut iterator = map.iter();
        assert_eq!(iterator.len(), 10);
        iterator.next();
        assert_eq!(iterator.len(), 9);
    }

    #[rstest]
    fn test_into_iter_drains_in_order() {
        let mut map = RbTreeMap::new();
        for key in [3, 1, 2] {
            map.insert(key, format!("v{key}")).unwrap();
        }
        let entries: Vec<(i32, String)> = map.into_iter().collect();
        assert_eq!(
            entries,
            vec![
                (1, "v1".to_string()),
                (2, "v2".to_string()),
                (3, "v3".to_string()),
            ]
        );
    }

    #[rstest]
    fn test_iter_on_empty_map() {
        let map: RbTreeMap<i32, ()> = RbTreeMap::new();
        assert_eq!(map.iter().count(), 0);
    }
}
