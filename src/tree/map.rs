//! Arena-backed red-black tree map.

use std::cmp::Ordering;
use std::fmt;

use static_assertions::assert_impl_all;

use super::error::DuplicateKeyError;

// =============================================================================
// Sentinel and Color
// =============================================================================

/// Reserved arena index standing in for "no node".
///
/// A `NIL` child is always treated as black when its color is queried and
/// is never stored as a real node.
pub(crate) const NIL: usize = usize::MAX;

/// The color of a red-black tree node.
///
/// An explicit enum rather than a boolean, so the rebalancing case
/// analysis reads as written and cannot be silently inverted.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Color {
    /// A red node. Newly inserted nodes start red.
    Red,
    /// A black node. Absent children count as black.
    Black,
}

// =============================================================================
// Comparator
// =============================================================================

/// A strict total order over keys, fixed at map construction.
///
/// The order must stay consistent for the map's whole lifetime; the map
/// never re-sorts existing entries.
///
/// Any `Fn(&K, &K) -> Ordering` closure is a comparator, so most callers
/// never implement this trait by hand:
///
/// ```rust
/// use rbmap::tree::RbTreeMap;
///
/// let mut descending = RbTreeMap::with_comparator(|a: &i32, b: &i32| b.cmp(a));
/// descending.insert(1, "one").unwrap();
/// descending.insert(2, "two").unwrap();
/// let keys: Vec<&i32> = descending.keys().collect();
/// assert_eq!(keys, vec![&2, &1]);
/// ```
pub trait Comparator<K> {
    /// Compares two keys under this order.
    fn compare(&self, left: &K, right: &K) -> Ordering;
}

impl<K, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    fn compare(&self, left: &K, right: &K) -> Ordering {
        self(left, right)
    }
}

/// The comparator used by [`RbTreeMap::new`]: the key type's own `Ord`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<K: Ord> Comparator<K> for NaturalOrder {
    fn compare(&self, left: &K, right: &K) -> Ordering {
        left.cmp(right)
    }
}

// =============================================================================
// Node and Arena Storage
// =============================================================================

/// Internal node structure. Links are arena indices, `NIL` when absent.
///
/// `parent` is a pure back-reference used to climb toward the root during
/// fixups; it confers no ownership and every rotation keeps it in sync.
#[derive(Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) color: Color,
    pub(crate) left: usize,
    pub(crate) right: usize,
    pub(crate) parent: usize,
}

/// One arena slot: either a live node or a link in the free list.
#[derive(Clone)]
enum Slot<K, V> {
    Occupied(Node<K, V>),
    Vacant(usize),
}

// =============================================================================
// RbTreeMap Definition
// =============================================================================

/// A mutable ordered map backed by an arena-allocated red-black tree.
///
/// Nodes live in a contiguous arena addressed by index, so the parent
/// back-references needed for O(log N) iterative rebalancing never form
/// ownership cycles. Each successful insert allocates exactly one slot,
/// each removal releases exactly one, and freed slots are reused.
///
/// Writes are insert-only: [`insert`](Self::insert) fails with
/// [`DuplicateKeyError`] on an equal key instead of overwriting, and
/// [`get_mut`](Self::get_mut) is the way to change a stored value.
///
/// # Time Complexity
///
/// | Operation      | Complexity |
/// |----------------|------------|
/// | `new`          | O(1)       |
/// | `get`          | O(log N)   |
/// | `insert`       | O(log N)   |
/// | `remove`       | O(log N)   |
/// | `min`/`max`    | O(log N)   |
/// | `len`          | O(1)       |
/// | `is_empty`     | O(1)       |
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
/// assert_eq!(map.len(), 2);
/// assert_eq!(map.get(&1), Some(&"one"));
/// assert_eq!(map.remove(&1), Some("one"));
/// assert_eq!(map.get(&1), None);
/// ```
#[derive(Clone)]
pub struct RbTreeMap<K, V, C = NaturalOrder> {
    slots: Vec<Slot<K, V>>,
    free_head: usize,
    root: usize,
    len: usize,
    comparator: C,
}

impl<K: Ord, V> RbTreeMap<K, V> {
    /// Creates a new empty map ordered by the key type's `Ord`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmap::tree::RbTreeMap;
    ///
    /// let map: RbTreeMap<i32, String> = RbTreeMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<K: Ord, V> Default for RbTreeMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> RbTreeMap<K, V, C> {
    /// Creates a new empty map ordered by the given comparator.
    ///
    /// The comparator must be a strict total order and must stay
    /// consistent for the map's lifetime.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmap::tree::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::with_comparator(|a: &u32, b: &u32| b.cmp(a));
    /// map.insert(1, "one").unwrap();
    /// map.insert(9, "nine").unwrap();
    /// assert_eq!(map.min(), Some((&9, &"nine")));
    /// ```
    #[inline]
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        Self {
            slots: Vec::new(),
            free_head: NIL,
            root: NIL,
            len: 0,
            comparator,
        }
    }

    /// Returns the number of entries in the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmap::tree::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// map.insert(1, "one").unwrap();
    /// map.insert(2, "two").unwrap();
    /// assert_eq!(map.len(), 2);
    /// ```
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes all entries and releases every arena slot.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmap::tree::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// map.insert(1, "one").unwrap();
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.get(&1), None);
    /// ```
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_head = NIL;
        self.root = NIL;
        self.len = 0;
    }

    /// Returns the root node for introspection, or `None` if the map is
    /// empty.
    ///
    /// Together with [`NodeRef`] this exposes the tree shape read-only,
    /// which is what test harnesses need to pin down exact rebalancing
    /// outcomes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmap::tree::{Color, RbTreeMap};
    ///
    /// let mut map = RbTreeMap::new();
    /// map.insert(1, "one").unwrap();
    /// let root = map.root().unwrap();
    /// assert_eq!(*root.key(), 1);
    /// assert_eq!(root.color(), Color::Black);
    /// ```
    #[must_use]
    pub fn root(&self) -> Option<NodeRef<'_, K, V, C>> {
        self.node_ref(self.root)
    }

    /// Returns the number of nodes on the longest root-to-leaf path.
    ///
    /// The red-black invariants bound this by `2 * log2(N + 1)`. An empty
    /// map has height 0.
    #[must_use]
    pub fn height(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = Vec::new();
        if self.root != NIL {
            stack.push((self.root, 1));
        }
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            let node = self.node(id);
            if node.left != NIL {
                stack.push((node.left, depth + 1));
            }
            if node.right != NIL {
                stack.push((node.right, depth + 1));
            }
        }
        max_depth
    }

    // -------------------------------------------------------------------------
    // Arena access
    // -------------------------------------------------------------------------

    pub(crate) fn node(&self, id: usize) -> &Node<K, V> {
        match &self.slots[id] {
            Slot::Occupied(node) => node,
            Slot::Vacant(_) => unreachable!("live link points at a vacant slot"),
        }
    }

    pub(crate) fn node_mut(&mut self, id: usize) -> &mut Node<K, V> {
        match &mut self.slots[id] {
            Slot::Occupied(node) => node,
            Slot::Vacant(_) => unreachable!("live link points at a vacant slot"),
        }
    }

    pub(crate) const fn root_id(&self) -> usize {
        self.root
    }

    pub(crate) const fn comparator(&self) -> &C {
        &self.comparator
    }

    pub(crate) fn node_ref(&self, id: usize) -> Option<NodeRef<'_, K, V, C>> {
        (id != NIL).then(|| NodeRef { map: self, id })
    }

    /// Takes a node out of the free list, or grows the arena by one slot.
    fn allocate(&mut self, node: Node<K, V>) -> usize {
        if self.free_head == NIL {
            self.slots.push(Slot::Occupied(node));
            self.slots.len() - 1
        } else {
            let id = self.free_head;
            self.free_head = match self.slots[id] {
                Slot::Vacant(next) => next,
                Slot::Occupied(_) => unreachable!("free list points at an occupied slot"),
            };
            self.slots[id] = Slot::Occupied(node);
            id
        }
    }

    /// Returns the slot to the free list and hands back the stored value.
    fn release(&mut self, id: usize) -> V {
        let slot = std::mem::replace(&mut self.slots[id], Slot::Vacant(self.free_head));
        self.free_head = id;
        match slot {
            Slot::Occupied(node) => node.value,
            Slot::Vacant(_) => unreachable!("released a vacant slot"),
        }
    }

    // -------------------------------------------------------------------------
    // NIL-tolerant link helpers
    // -------------------------------------------------------------------------

    pub(crate) fn color_of(&self, id: usize) -> Color {
        if id == NIL {
            Color::Black
        } else {
            self.node(id).color
        }
    }

    fn left_of(&self, id: usize) -> usize {
        if id == NIL { NIL } else { self.node(id).left }
    }

    fn right_of(&self, id: usize) -> usize {
        if id == NIL { NIL } else { self.node(id).right }
    }

    fn parent_of(&self, id: usize) -> usize {
        if id == NIL { NIL } else { self.node(id).parent }
    }

    fn set_color(&mut self, id: usize, color: Color) {
        if id != NIL {
            self.node_mut(id).color = color;
        }
    }

    /// Leftmost node of the subtree rooted at `id`. `id` must be real.
    fn min_of(&self, mut id: usize) -> usize {
        while self.node(id).left != NIL {
            id = self.node(id).left;
        }
        id
    }

    /// Rightmost node of the subtree rooted at `id`. `id` must be real.
    fn max_of(&self, mut id: usize) -> usize {
        while self.node(id).right != NIL {
            id = self.node(id).right;
        }
        id
    }

    /// In-order node indices, via an explicit stack.
    pub(crate) fn in_order_ids(&self) -> Vec<usize> {
        let mut ids = Vec::with_capacity(self.len);
        let mut stack = Vec::new();
        let mut cursor = self.root;
        while cursor != NIL || !stack.is_empty() {
            if cursor != NIL {
                stack.push(cursor);
                cursor = self.node(cursor).left;
            } else if let Some(id) = stack.pop() {
                ids.push(id);
                cursor = self.node(id).right;
            }
        }
        ids
    }

    /// Drains the arena into in-order `(key, value)` pairs.
    pub(crate) fn into_entries(self) -> Vec<(K, V)> {
        let order = self.in_order_ids();
        let mut slots = self.slots;
        order
            .into_iter()
            .map(
                |id| match std::mem::replace(&mut slots[id], Slot::Vacant(NIL)) {
                    Slot::Occupied(node) => (node.key, node.value),
                    Slot::Vacant(_) => unreachable!("in-order walk visited a vacant slot"),
                },
            )
            .collect()
    }

    // -------------------------------------------------------------------------
    // Rotations
    // -------------------------------------------------------------------------

    /// Left rotation around `node`:
    ///
    /// ```text
    ///     node                r
    ///    /    \             /   \
    ///   c      r     ->   node   y
    ///         / \         /  \
    ///        x   y       c    x
    /// ```
    ///
    /// O(1) link surgery preserving in-order sequence. Updates the parent
    /// back-references of the three affected nodes and the root when
    /// `node` was the root. No-op when `node` or its right child is `NIL`.
    fn rotate_left(&mut self, node: usize) {
        if node == NIL {
            return;
        }
        let pivot = self.node(node).right;
        if pivot == NIL {
            return;
        }
        let pivot_left = self.node(pivot).left;
        self.node_mut(node).right = pivot_left;
        if pivot_left != NIL {
            self.node_mut(pivot_left).parent = node;
        }
        let parent = self.node(node).parent;
        self.node_mut(pivot).parent = parent;
        if parent == NIL {
            self.root = pivot;
        } else if self.node(parent).left == node {
            self.node_mut(parent).left = pivot;
        } else {
            self.node_mut(parent).right = pivot;
        }
        self.node_mut(pivot).left = node;
        self.node_mut(node).parent = pivot;
    }

    /// Right rotation around `node`, the mirror of [`Self::rotate_left`].
    fn rotate_right(&mut self, node: usize) {
        if node == NIL {
            return;
        }
        let pivot = self.node(node).left;
        if pivot == NIL {
            return;
        }
        let pivot_right = self.node(pivot).right;
        self.node_mut(node).left = pivot_right;
        if pivot_right != NIL {
            self.node_mut(pivot_right).parent = node;
        }
        let parent = self.node(node).parent;
        self.node_mut(pivot).parent = parent;
        if parent == NIL {
            self.root = pivot;
        } else if self.node(parent).right == node {
            self.node_mut(parent).right = pivot;
        } else {
            self.node_mut(parent).left = pivot;
        }
        self.node_mut(pivot).right = node;
        self.node_mut(node).parent = pivot;
    }
}

// =============================================================================
// Search, Insert, Remove
// =============================================================================

impl<K, V, C: Comparator<K>> RbTreeMap<K, V, C> {
    /// Iterative BST descent to the node holding `key`.
    fn find_node(&self, key: &K) -> Option<usize> {
        let mut cursor = self.root;
        while cursor != NIL {
            match self.comparator.compare(key, &self.node(cursor).key) {
                Ordering::Less => cursor = self.node(cursor).left,
                Ordering::Greater => cursor = self.node(cursor).right,
                Ordering::Equal => return Some(cursor),
            }
        }
        None
    }

    /// Returns a reference to the value stored under `key`.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmap::tree::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// map.insert("hello", 42).unwrap();
    /// assert_eq!(map.get(&"hello"), Some(&42));
    /// assert_eq!(map.get(&"world"), None);
    /// ```
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find_node(key).map(|id| &self.node(id).value)
    }

    /// Returns a mutable reference to the value stored under `key`.
    ///
    /// This is the only way to change a stored value; it never triggers
    /// rebalancing, because the key (and therefore the ordering) is
    /// untouched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmap::tree::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// map.insert(1, "one").unwrap();
    /// if let Some(value) = map.get_mut(&1) {
    ///     *value = "ONE";
    /// }
    /// assert_eq!(map.get(&1), Some(&"ONE"));
    /// ```
    #[must_use]
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = self.find_node(key)?;
        Some(&mut self.node_mut(id).value)
    }

    /// Returns `true` if the map contains an entry for `key`.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.find_node(key).is_some()
    }

    /// Returns the entry with the smallest key, or `None` if empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmap::tree::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// map.insert(3, "three").unwrap();
    /// map.insert(1, "one").unwrap();
    /// assert_eq!(map.min(), Some((&1, &"one")));
    /// ```
    #[must_use]
    pub fn min(&self) -> Option<(&K, &V)> {
        if self.root == NIL {
            return None;
        }
        let node = self.node(self.min_of(self.root));
        Some((&node.key, &node.value))
    }

    /// Returns the entry with the largest key, or `None` if empty.
    #[must_use]
    pub fn max(&self) -> Option<(&K, &V)> {
        if self.root == NIL {
            return None;
        }
        let node = self.node(self.max_of(self.root));
        Some((&node.key, &node.value))
    }

    /// Inserts `value` under `key`.
    ///
    /// Descends to the attachment point, splices in a new red leaf, and
    /// rebalances. The first insert into an empty map attaches the node
    /// directly as the root; a single slot is allocated either way.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateKeyError`] if a key comparing equal is already
    /// present. The map is left completely unmutated in that case; use
    /// [`get_mut`](Self::get_mut) to change an existing value.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmap::tree::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// assert!(map.insert(1, "one").is_ok());
    /// assert!(map.insert(1, "ONE").is_err());
    /// assert_eq!(map.get(&1), Some(&"one"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Result<(), DuplicateKeyError> {
        let mut parent = NIL;
        let mut ordering = Ordering::Equal;
        let mut cursor = self.root;
        while cursor != NIL {
            parent = cursor;
            ordering = self.comparator.compare(&key, &self.node(cursor).key);
            cursor = match ordering {
                Ordering::Less => self.node(cursor).left,
                Ordering::Greater => self.node(cursor).right,
                Ordering::Equal => return Err(DuplicateKeyError),
            };
        }
        let id = self.allocate(Node {
            key,
            value,
            color: Color::Red,
            left: NIL,
            right: NIL,
            parent,
        });
        if parent == NIL {
            self.root = id;
        } else if ordering == Ordering::Less {
            self.node_mut(parent).left = id;
        } else {
            self.node_mut(parent).right = id;
        }
        self.len += 1;
        self.fix_after_insert(id);
        Ok(())
    }

    /// Removes the entry for `key`, returning its value.
    ///
    /// Removing an absent key is a silent no-op that returns `None`; it
    /// is not an error.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmap::tree::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// map.insert(1, "one").unwrap();
    /// assert_eq!(map.remove(&1), Some("one"));
    /// assert_eq!(map.remove(&1), None);
    /// assert!(map.is_empty());
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let node = self.find_node(key)?;
        Some(self.remove_node(node))
    }

    /// Physically removes `node` and rebalances.
    ///
    /// A node with two real children first swaps key and value with its
    /// in-order successor (the leftmost node of its right subtree, which
    /// has no left child), then the successor position is spliced out
    /// instead. The spliced node therefore always has at most one child.
    ///
    /// Fixup runs only when the spliced node was black: unlinking a red
    /// node can neither shorten a black path nor create adjacent reds.
    fn remove_node(&mut self, mut node: usize) -> V {
        if self.node(node).left != NIL && self.node(node).right != NIL {
            let successor = self.min_of(self.node(node).right);
            self.swap_entries(node, successor);
            node = successor;
        }
        let replacement = if self.node(node).left != NIL {
            self.node(node).left
        } else {
            self.node(node).right
        };
        if replacement != NIL {
            // Splice the single child into the parent's slot.
            let parent = self.node(node).parent;
            self.node_mut(replacement).parent = parent;
            if parent == NIL {
                self.root = replacement;
            } else if self.node(parent).left == node {
                self.node_mut(parent).left = replacement;
            } else {
                self.node_mut(parent).right = replacement;
            }
            let removed_color = self.node(node).color;
            let unlinked = self.node_mut(node);
            unlinked.left = NIL;
            unlinked.right = NIL;
            unlinked.parent = NIL;
            if removed_color == Color::Black {
                self.fix_after_remove(replacement);
            }
        } else if self.node(node).parent == NIL {
            // Childless root: the tree becomes empty.
            self.root = NIL;
        } else {
            // Childless non-root: rebalance at the node itself, then unlink.
            if self.node(node).color == Color::Black {
                self.fix_after_remove(node);
            }
            let parent = self.node(node).parent;
            if parent != NIL {
                if self.node(parent).left == node {
                    self.node_mut(parent).left = NIL;
                } else {
                    self.node_mut(parent).right = NIL;
                }
                self.node_mut(node).parent = NIL;
            }
        }
        self.len -= 1;
        self.release(node)
    }

    /// Swaps the key/value payloads of two distinct live slots, leaving
    /// colors and links in place.
    fn swap_entries(&mut self, a: usize, b: usize) {
        debug_assert_ne!(a, b);
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.slots.split_at_mut(high);
        match (&mut head[low], &mut tail[0]) {
            (Slot::Occupied(first), Slot::Occupied(second)) => {
                std::mem::swap(&mut first.key, &mut second.key);
                std::mem::swap(&mut first.value, &mut second.value);
            }
            _ => unreachable!("swapped a vacant slot"),
        }
    }

    // -------------------------------------------------------------------------
    // Rebalancing
    // -------------------------------------------------------------------------

    /// Restores the invariants after `x` was attached as a red leaf.
    ///
    /// Climbs while `x`'s parent is red. A red uncle is recolored and the
    /// violation pushed to the grandparent; a black uncle takes one or
    /// two rotations (the inner "zigzag" shape is first straightened) and
    /// terminates the loop. The root is recolored black unconditionally
    /// at the end, absorbing the one transient state where it may have
    /// turned red.
    fn fix_after_insert(&mut self, mut x: usize) {
        while x != self.root && self.color_of(self.parent_of(x)) == Color::Red {
            let parent = self.parent_of(x);
            let grandparent = self.parent_of(parent);
            if parent == self.left_of(grandparent) {
                let uncle = self.right_of(grandparent);
                if self.color_of(uncle) == Color::Red {
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    x = grandparent;
                } else {
                    if x == self.right_of(parent) {
                        x = parent;
                        self.rotate_left(x);
                    }
                    let parent = self.parent_of(x);
                    let grandparent = self.parent_of(parent);
                    self.set_color(parent, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    self.rotate_right(grandparent);
                }
            } else {
                let uncle = self.left_of(grandparent);
                if self.color_of(uncle) == Color::Red {
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    x = grandparent;
                } else {
                    if x == self.left_of(parent) {
                        x = parent;
                        self.rotate_right(x);
                    }
                    let parent = self.parent_of(x);
                    let grandparent = self.parent_of(parent);
                    self.set_color(parent, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    self.rotate_left(grandparent);
                }
            }
        }
        let root = self.root;
        self.set_color(root, Color::Black);
    }

    /// Restores the invariants after a black node was spliced out,
    /// starting from the position `x` carrying the missing black unit.
    ///
    /// Per iteration, with `s` the sibling of `x`:
    /// - red `s`: recolor and rotate the parent toward `x`, exposing a
    ///   black sibling, then continue within the same iteration;
    /// - `s` with two black children: recolor `s` red and move the
    ///   deficiency up to the parent;
    /// - far child of `s` black, near child red: rotate `s` away from
    ///   `x` to expose a red far child;
    /// - far child of `s` red: rotate the parent toward `x` with the
    ///   final recoloring, which settles the deficiency.
    ///
    /// Afterwards `x` is forced black, absorbing the extra black unit if
    /// the loop stopped on a red node.
    fn fix_after_remove(&mut self, mut x: usize) {
        while x != self.root && self.color_of(x) == Color::Black {
            let parent = self.parent_of(x);
            if x == self.left_of(parent) {
                let mut sibling = self.right_of(parent);
                if self.color_of(sibling) == Color::Red {
                    self.set_color(sibling, Color::Black);
                    self.set_color(parent, Color::Red);
                    self.rotate_left(parent);
                    sibling = self.right_of(self.parent_of(x));
                }
                if self.color_of(self.left_of(sibling)) == Color::Black
                    && self.color_of(self.right_of(sibling)) == Color::Black
                {
                    self.set_color(sibling, Color::Red);
                    x = self.parent_of(x);
                } else {
                    if self.color_of(self.right_of(sibling)) == Color::Black {
                        let near = self.left_of(sibling);
                        self.set_color(near, Color::Black);
                        self.set_color(sibling, Color::Red);
                        self.rotate_right(sibling);
                        sibling = self.right_of(self.parent_of(x));
                    }
                    let parent = self.parent_of(x);
                    let parent_color = self.color_of(parent);
                    self.set_color(sibling, parent_color);
                    self.set_color(parent, Color::Black);
                    let far = self.right_of(sibling);
                    self.set_color(far, Color::Black);
                    self.rotate_left(parent);
                    x = self.root;
                }
            } else {
                let mut sibling = self.left_of(parent);
                if self.color_of(sibling) == Color::Red {
                    self.set_color(sibling, Color::Black);
                    self.set_color(parent, Color::Red);
                    self.rotate_right(parent);
                    sibling = self.left_of(self.parent_of(x));
                }
                if self.color_of(self.right_of(sibling)) == Color::Black
                    && self.color_of(self.left_of(sibling)) == Color::Black
                {
                    self.set_color(sibling, Color::Red);
                    x = self.parent_of(x);
                } else {
                    if self.color_of(self.left_of(sibling)) == Color::Black {
                        let near = self.right_of(sibling);
                        self.set_color(near, Color::Black);
                        self.set_color(sibling, Color::Red);
                        self.rotate_left(sibling);
                        sibling = self.left_of(self.parent_of(x));
                    }
                    let parent = self.parent_of(x);
                    let parent_color = self.color_of(parent);
                    self.set_color(sibling, parent_color);
                    self.set_color(parent, Color::Black);
                    let far = self.left_of(sibling);
                    self.set_color(far, Color::Black);
                    self.rotate_right(parent);
                    x = self.root;
                }
            }
        }
        self.set_color(x, Color::Black);
    }
}

// =============================================================================
// NodeRef
// =============================================================================

/// A read-only view of one tree node, for introspection and tests.
///
/// Obtained from [`RbTreeMap::root`] and navigated with
/// [`left`](Self::left), [`right`](Self::right), and
/// [`parent`](Self::parent).
///
/// # Examples
///
/// ```rust
/// use rbmap::tree::{Color, RbTreeMap};
///
/// let mut map = RbTreeMap::new();
/// for key in [10, 20, 30] {
///     map.insert(key, ()).unwrap();
/// }
/// let root = map.root().unwrap();
/// assert_eq!(*root.key(), 20);
/// assert_eq!(*root.left().unwrap().key(), 10);
/// assert_eq!(root.left().unwrap().color(), Color::Red);
/// ```
pub struct NodeRef<'map, K, V, C = NaturalOrder> {
    map: &'map RbTreeMap<K, V, C>,
    id: usize,
}

impl<K, V, C> Clone for NodeRef<'_, K, V, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, C> Copy for NodeRef<'_, K, V, C> {}

impl<'map, K, V, C> NodeRef<'map, K, V, C> {
    /// The node's key.
    #[must_use]
    pub fn key(&self) -> &'map K {
        &self.map.node(self.id).key
    }

    /// The node's value.
    #[must_use]
    pub fn value(&self) -> &'map V {
        &self.map.node(self.id).value
    }

    /// The node's color.
    #[must_use]
    pub fn color(&self) -> Color {
        self.map.node(self.id).color
    }

    /// The left child, if present.
    #[must_use]
    pub fn left(&self) -> Option<Self> {
        self.map.node_ref(self.map.node(self.id).left)
    }

    /// The right child, if present.
    #[must_use]
    pub fn right(&self) -> Option<Self> {
        self.map.node_ref(self.map.node(self.id).right)
    }

    /// The parent node; `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.map.node_ref(self.map.node(self.id).parent)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for RbTreeMap<K, V, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display, C> fmt::Display for RbTreeMap<K, V, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        for (index, (key, value)) in self.iter().enumerate() {
            if index > 0 {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for RbTreeMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for RbTreeMap<K, V, C> {}

impl<K: Ord, V> FromIterator<(K, V)> for RbTreeMap<K, V> {
    /// Builds a map from an iterator of pairs.
    ///
    /// Later pairs with an already-present key are ignored, consistent
    /// with the insert-only contract: the first insert wins.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iterator: I) -> Self {
        let mut map = Self::new();
        map.extend(iterator);
        map
    }
}

impl<K, V, C: Comparator<K>> Extend<(K, V)> for RbTreeMap<K, V, C> {
    /// Inserts every pair in order, ignoring duplicate keys.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iterator: I) {
        for (key, value) in iterator {
            // First insert wins; a duplicate is not an error here.
            let _ = self.insert(key, value);
        }
    }
}

assert_impl_all!(RbTreeMap<i32, String>: Send, Sync);

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn int_map(keys: &[i32]) -> RbTreeMap<i32, i32> {
        let mut map = RbTreeMap::new();
        for &key in keys {
            map.insert(key, key * 10).unwrap();
        }
        map
    }

    // =========================================================================
    // Rotation Tests
    // =========================================================================

    #[rstest]
    fn test_rotate_left_at_root_updates_root_and_parents() {
        let mut map = int_map(&[2, 1, 3]);
        let root = map.root_id();
        map.rotate_left(root);

        // Old right child is the new root, old root hangs off its left.
        let new_root = map.root_id();
        assert_eq!(map.node(new_root).key, 3);
        assert_eq!(map.node(new_root).parent, NIL);
        assert_eq!(map.node(map.node(new_root).left).key, 2);
        assert_eq!(map.node(map.node(new_root).left).parent, new_root);
    }

    #[rstest]
    fn test_rotate_right_then_left_restores_shape() {
        let mut map = int_map(&[2, 1, 3]);
        let root = map.root_id();
        map.rotate_right(root);
        let new_root = map.root_id();
        map.rotate_left(new_root);

        assert_eq!(map.node(map.root_id()).key, 2);
        assert!(map.validate().is_ok());
    }

    #[rstest]
    fn test_rotate_without_required_child_is_noop() {
        let mut map = int_map(&[1]);
        let root = map.root_id();
        map.rotate_left(root);
        assert_eq!(map.root_id(), root);
        map.rotate_right(root);
        assert_eq!(map.root_id(), root);
    }

    // =========================================================================
    // Arena Tests
    // =========================================================================

    #[rstest]
    fn test_removed_slot_is_reused_by_next_insert() {
        let mut map = int_map(&[1, 2, 3]);
        let slots_before = map.slots.len();

        map.remove(&2).unwrap();
        map.insert(4, 40).unwrap();

        assert_eq!(map.slots.len(), slots_before);
        assert!(map.validate().is_ok());
    }

    #[rstest]
    fn test_insert_allocates_exactly_one_slot() {
        let mut map: RbTreeMap<i32, i32> = RbTreeMap::new();
        for key in 0..8 {
            map.insert(key, key).unwrap();
            assert_eq!(map.slots.len(), usize::try_from(key).unwrap() + 1);
        }
    }

    #[rstest]
    fn test_clear_releases_all_slots() {
        let mut map = int_map(&[1, 2, 3]);
        map.clear();
        assert_eq!(map.slots.len(), 0);
        assert_eq!(map.root_id(), NIL);
        assert_eq!(map.len(), 0);
    }

    // =========================================================================
    // Successor Swap Tests
    // =========================================================================

    #[rstest]
    fn test_remove_node_with_two_children_uses_successor() {
        // 2 is the root with both children present; its successor is 3.
        let mut map = int_map(&[2, 1, 3]);
        assert_eq!(map.remove(&2), Some(20));

        assert_eq!(map.node(map.root_id()).key, 3);
        assert_eq!(map.get(&1), Some(&10));
        assert_eq!(map.get(&3), Some(&30));
        assert!(map.validate().is_ok());
    }

    #[rstest]
    fn test_remove_with_deep_successor() {
        // Successor of 10 is 12, two levels down in the right subtree.
        let mut map = int_map(&[10, 5, 20, 15, 25, 12]);
        assert_eq!(map.remove(&10), Some(100));

        assert_eq!(map.get(&10), None);
        assert_eq!(map.get(&12), Some(&120));
        assert!(map.validate().is_ok());
    }

    #[rstest]
    fn test_remove_red_leaf_skips_fixup_path() {
        let mut map = int_map(&[10, 20, 30]);
        // 10 and 30 are red leaves after the rebalance.
        assert_eq!(map.root().unwrap().left().unwrap().color(), Color::Red);
        assert_eq!(map.remove(&30), Some(300));
        assert!(map.validate().is_ok());
    }
}
