//! Ordered index: a size-augmented left-leaning red-black tree.
//!
//! ## Architecture
//!
//! Nodes live in a [`Slab`] and link to each other by slab key:
//!
//! - **Slab**: O(1) node allocation and release, keys reused after removal
//! - **Size augmentation**: every node knows its subtree size, giving
//!   O(log n) `rank` / `select`
//! - **Left-leaning colouring**: red links only lean left and never come two
//!   in a row, so the tree mirrors a 2-3 tree of height O(log n)
//!
//! ## Mutation Rules
//!
//! Insert descends recursively and repairs on the way back up with three
//! local fixups (rotate-left, rotate-right, colour flip). Delete keeps the
//! current node out of a 2-node while descending (`move_red_left` /
//! `move_red_right`) and runs `balance` on every frame it returns through.
//!
//! Extremes (`min` / `max`) are always found by descent. Nothing is cached
//! across mutations.
//!
//! ## Example
//!
//! ```
//! use aisle_catalog::index::OrderedIndex;
//!
//! let mut index = OrderedIndex::new();
//! for key in [50u64, 10, 40, 20, 30] {
//!     index.put(key, key * 2);
//! }
//!
//! assert_eq!(index.min(), Some(&10));
//! assert_eq!(index.max(), Some(&50));
//! assert_eq!(index.rank(&30), 2);
//! assert_eq!(index.select(2), Some(&30));
//!
//! let keys: Vec<u64> = index.range(&15, &40).into_iter().map(|(k, _)| *k).collect();
//! assert_eq!(keys, vec![20, 30, 40]);
//! ```

use std::cmp::Ordering;
use std::mem;

use slab::Slab;

use crate::index::node::{Color, Node};

/// Ordered map from `K` to `V` backed by a left-leaning red-black tree.
#[derive(Debug, Clone)]
pub struct OrderedIndex<K, V> {
    /// Node storage
    pub(super) nodes: Slab<Node<K, V>>,

    /// Slab key of the root, `None` when empty
    pub(super) root: Option<usize>,
}

impl<K, V> Default for OrderedIndex<K, V> {
    fn default() -> Self {
        Self {
            nodes: Slab::new(),
            root: None,
        }
    }
}

impl<K: Ord, V> OrderedIndex<K, V> {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index with node storage pre-allocated for `capacity` keys
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Slab::with_capacity(capacity),
            root: None,
        }
    }

    // ========================================================================
    // Size
    // ========================================================================

    /// Number of keys in the index (subtree size of the root)
    #[inline]
    pub fn len(&self) -> usize {
        self.size(self.root)
    }

    /// Check if the index holds no keys
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Remove every key
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Number of nodes on the longest root-to-leaf path (0 when empty)
    pub fn height(&self) -> usize {
        self.height_at(self.root)
    }

    fn height_at(&self, link: Option<usize>) -> usize {
        match link {
            None => 0,
            Some(h) => {
                let node = &self.nodes[h];
                1 + self.height_at(node.left).max(self.height_at(node.right))
            }
        }
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Slab key of the node holding `key`
    fn find(&self, key: &K) -> Option<usize> {
        let mut link = self.root;
        while let Some(h) = link {
            let node = &self.nodes[h];
            link = match key.cmp(&node.key) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(h),
            };
        }
        None
    }

    /// Get the value stored under `key`
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).map(|h| &self.nodes[h].value)
    }

    /// Get a mutable reference to the value stored under `key`
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let h = self.find(key)?;
        Some(&mut self.nodes[h].value)
    }

    /// Check if `key` is present
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Smallest key, found by descending the left spine
    pub fn min(&self) -> Option<&K> {
        let mut h = self.root?;
        while let Some(left) = self.nodes[h].left {
            h = left;
        }
        Some(&self.nodes[h].key)
    }

    /// Largest key, found by descending the right spine
    pub fn max(&self) -> Option<&K> {
        let mut h = self.root?;
        while let Some(right) = self.nodes[h].right {
            h = right;
        }
        Some(&self.nodes[h].key)
    }

    /// Largest key less than or equal to `key`
    pub fn floor(&self, key: &K) -> Option<&K> {
        let mut link = self.root;
        let mut best = None;
        while let Some(h) = link {
            let node = &self.nodes[h];
            match key.cmp(&node.key) {
                Ordering::Equal => return Some(&node.key),
                Ordering::Less => link = node.left,
                Ordering::Greater => {
                    best = Some(&node.key);
                    link = node.right;
                }
            }
        }
        best
    }

    /// Smallest key greater than or equal to `key`
    pub fn ceiling(&self, key: &K) -> Option<&K> {
        let mut link = self.root;
        let mut best = None;
        while let Some(h) = link {
            let node = &self.nodes[h];
            match key.cmp(&node.key) {
                Ordering::Equal => return Some(&node.key),
                Ordering::Greater => link = node.right,
                Ordering::Less => {
                    best = Some(&node.key);
                    link = node.left;
                }
            }
        }
        best
    }

    // ========================================================================
    // Order Statistics
    // ========================================================================

    /// Number of keys strictly less than `key`
    pub fn rank(&self, key: &K) -> usize {
        let mut rank = 0;
        let mut link = self.root;
        while let Some(h) = link {
            let node = &self.nodes[h];
            match key.cmp(&node.key) {
                Ordering::Less => link = node.left,
                Ordering::Greater => {
                    rank += 1 + self.size(node.left);
                    link = node.right;
                }
                Ordering::Equal => return rank + self.size(node.left),
            }
        }
        rank
    }

    /// Key of rank `k` (the k-th smallest, 0-indexed)
    ///
    /// # Returns
    ///
    /// `None` if `k` is outside `[0, len)`
    pub fn select(&self, k: usize) -> Option<&K> {
        if k >= self.len() {
            return None;
        }

        let mut k = k;
        let mut link = self.root;
        while let Some(h) = link {
            let node = &self.nodes[h];
            let left_size = self.size(node.left);
            match left_size.cmp(&k) {
                Ordering::Greater => link = node.left,
                Ordering::Less => {
                    k -= left_size + 1;
                    link = node.right;
                }
                Ordering::Equal => return Some(&node.key),
            }
        }
        None
    }

    /// Ascending `(key, value)` pairs with `lo <= key <= hi`.
    ///
    /// Subtrees entirely outside the bounds are never visited.
    /// Empty when `lo > hi`.
    pub fn range(&self, lo: &K, hi: &K) -> Vec<(&K, &V)> {
        let mut out = Vec::new();
        if lo > hi {
            return out;
        }
        self.collect_range(self.root, lo, hi, &mut out);
        out
    }

    fn collect_range<'a>(
        &'a self,
        link: Option<usize>,
        lo: &K,
        hi: &K,
        out: &mut Vec<(&'a K, &'a V)>,
    ) {
        let Some(h) = link else {
            return;
        };
        let node = &self.nodes[h];

        if node.key >= *lo {
            self.collect_range(node.left, lo, hi, out);
        }
        if *lo <= node.key && node.key <= *hi {
            out.push((&node.key, &node.value));
        }
        if node.key <= *hi {
            self.collect_range(node.right, lo, hi, out);
        }
    }

    /// Number of keys in `[lo, hi]`, from ranks alone
    pub fn count_range(&self, lo: &K, hi: &K) -> usize {
        if lo > hi {
            return 0;
        }
        let below_hi = self.rank(hi) + usize::from(self.contains(hi));
        below_hi - self.rank(lo)
    }

    /// In-order iterator over `(key, value)` pairs
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self)
    }

    /// Keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(key, _)| key)
    }

    // ========================================================================
    // Insert
    // ========================================================================

    /// Insert `key` with `value`, overwriting any existing value
    ///
    /// # Returns
    ///
    /// The value previously stored under `key`, if any
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let mut replaced = None;
        self.put_root(key, value, &mut replaced);
        replaced
    }

    /// Get the value under `key`, inserting `make()` first if absent
    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, key: K, make: F) -> &mut V {
        if let Some(h) = self.find(&key) {
            return &mut self.nodes[h].value;
        }

        let mut replaced = None;
        let placed = self.put_root(key, make(), &mut replaced);
        &mut self.nodes[placed].value
    }

    /// Insert from the root and re-blacken it. Returns the placed node.
    fn put_root(&mut self, key: K, value: V, replaced: &mut Option<V>) -> usize {
        let (root, placed) = self.put_at(self.root, key, value, replaced);
        self.nodes[root].color = Color::Black;
        self.root = Some(root);
        placed
    }

    /// Insert into the subtree at `link`.
    ///
    /// Returns `(new subtree root, node now holding key)`.
    fn put_at(
        &mut self,
        link: Option<usize>,
        key: K,
        value: V,
        replaced: &mut Option<V>,
    ) -> (usize, usize) {
        let Some(mut h) = link else {
            let h = self.nodes.insert(Node::new(key, value));
            return (h, h);
        };

        let placed = match key.cmp(&self.nodes[h].key) {
            Ordering::Less => {
                let left = self.nodes[h].left;
                let (left, placed) = self.put_at(left, key, value, replaced);
                self.nodes[h].left = Some(left);
                placed
            }
            Ordering::Greater => {
                let right = self.nodes[h].right;
                let (right, placed) = self.put_at(right, key, value, replaced);
                self.nodes[h].right = Some(right);
                placed
            }
            Ordering::Equal => {
                *replaced = Some(mem::replace(&mut self.nodes[h].value, value));
                h
            }
        };

        // Fix right-leaning reds, two reds in a row, then split 4-nodes
        if self.is_red(self.nodes[h].right) && !self.is_red(self.nodes[h].left) {
            h = self.rotate_left(h);
        }
        if self.is_red(self.nodes[h].left) && self.is_red(self.left_of(self.nodes[h].left)) {
            h = self.rotate_right(h);
        }
        if self.is_red(self.nodes[h].left) && self.is_red(self.nodes[h].right) {
            self.flip_colors(h);
        }
        self.update_size(h);

        (h, placed)
    }

    // ========================================================================
    // Delete
    // ========================================================================

    /// Remove `key`. A missing key is a no-op.
    ///
    /// # Returns
    ///
    /// The value that was stored under `key`, if any
    pub fn delete(&mut self, key: &K) -> Option<V> {
        if !self.contains(key) {
            return None;
        }
        let root = self.root?;

        self.redden_root_for_delete(root);
        let (root, removed) = self.delete_at(root, key);
        self.set_root_after_delete(root);

        Some(removed)
    }

    /// Remove and return the smallest entry
    pub fn pop_min(&mut self) -> Option<(K, V)> {
        let root = self.root?;

        self.redden_root_for_delete(root);
        let (root, node) = self.delete_min_at(root);
        self.set_root_after_delete(root);

        Some((node.key, node.value))
    }

    /// Remove and return the largest entry
    pub fn pop_max(&mut self) -> Option<(K, V)> {
        let root = self.root?;

        self.redden_root_for_delete(root);
        let (root, node) = self.delete_max_at(root);
        self.set_root_after_delete(root);

        Some((node.key, node.value))
    }

    /// If both children of the root are black, make the root red so the
    /// top-down pass can borrow from it.
    fn redden_root_for_delete(&mut self, root: usize) {
        let node = &self.nodes[root];
        if !self.is_red(node.left) && !self.is_red(node.right) {
            self.nodes[root].color = Color::Red;
        }
    }

    fn set_root_after_delete(&mut self, root: Option<usize>) {
        self.root = root;
        if let Some(root) = root {
            self.nodes[root].color = Color::Black;
        }
    }

    /// Delete `key` (which must be present) from the subtree at `h`.
    ///
    /// Returns `(new subtree root, removed value)`.
    fn delete_at(&mut self, h: usize, key: &K) -> (Option<usize>, V) {
        let mut h = h;
        let removed;

        if *key < self.nodes[h].key {
            let left = self.nodes[h].left;
            if !self.is_red(left) && !self.is_red(self.left_of(left)) {
                h = self.move_red_left(h);
            }
            let left = self.nodes[h].left.expect("present key must be in left subtree");
            let (left, value) = self.delete_at(left, key);
            self.nodes[h].left = left;
            removed = value;
        } else {
            if self.is_red(self.nodes[h].left) {
                h = self.rotate_right(h);
            }
            if *key == self.nodes[h].key && self.nodes[h].right.is_none() {
                return (None, self.nodes.remove(h).value);
            }
            let right = self.nodes[h].right;
            if !self.is_red(right) && !self.is_red(self.left_of(right)) {
                h = self.move_red_right(h);
            }

            let right = self.nodes[h].right.expect("present key must be at or right of node");
            if *key == self.nodes[h].key {
                // Replace with the in-subtree successor, then drop the successor
                let (right, successor) = self.delete_min_at(right);
                self.nodes[h].right = right;
                let node = &mut self.nodes[h];
                node.key = successor.key;
                removed = mem::replace(&mut node.value, successor.value);
            } else {
                let (right, value) = self.delete_at(right, key);
                self.nodes[h].right = right;
                removed = value;
            }
        }

        (Some(self.balance(h)), removed)
    }

    /// Delete the leftmost node of the subtree at `h`.
    ///
    /// Returns `(new subtree root, removed node)`.
    fn delete_min_at(&mut self, h: usize) -> (Option<usize>, Node<K, V>) {
        if self.nodes[h].left.is_none() {
            return (None, self.nodes.remove(h));
        }

        let mut h = h;
        let left = self.nodes[h].left;
        if !self.is_red(left) && !self.is_red(self.left_of(left)) {
            h = self.move_red_left(h);
        }

        let left = self.nodes[h].left.expect("left spine survives move_red_left");
        let (left, node) = self.delete_min_at(left);
        self.nodes[h].left = left;

        (Some(self.balance(h)), node)
    }

    /// Delete the rightmost node of the subtree at `h`.
    fn delete_max_at(&mut self, h: usize) -> (Option<usize>, Node<K, V>) {
        let mut h = h;
        if self.is_red(self.nodes[h].left) {
            h = self.rotate_right(h);
        }
        if self.nodes[h].right.is_none() {
            return (None, self.nodes.remove(h));
        }

        let right = self.nodes[h].right;
        if !self.is_red(right) && !self.is_red(self.left_of(right)) {
            h = self.move_red_right(h);
        }

        let right = self.nodes[h].right.expect("right spine survives move_red_right");
        let (right, node) = self.delete_max_at(right);
        self.nodes[h].right = right;

        (Some(self.balance(h)), node)
    }

    // ========================================================================
    // Red-Black Helpers
    // ========================================================================

    #[inline]
    pub(super) fn is_red(&self, link: Option<usize>) -> bool {
        matches!(link, Some(h) if self.nodes[h].is_red())
    }

    #[inline]
    pub(super) fn size(&self, link: Option<usize>) -> usize {
        link.map_or(0, |h| self.nodes[h].size)
    }

    #[inline]
    fn left_of(&self, link: Option<usize>) -> Option<usize> {
        link.and_then(|h| self.nodes[h].left)
    }

    #[inline]
    fn update_size(&mut self, h: usize) {
        let node = &self.nodes[h];
        let size = 1 + self.size(node.left) + self.size(node.right);
        self.nodes[h].size = size;
    }

    /// Make a right-leaning red link lean to the left
    fn rotate_left(&mut self, h: usize) -> usize {
        let x = self.nodes[h].right.expect("rotate_left requires a right child");
        self.nodes[h].right = self.nodes[x].left;
        self.nodes[x].left = Some(h);
        self.nodes[x].color = self.nodes[h].color;
        self.nodes[h].color = Color::Red;
        self.nodes[x].size = self.nodes[h].size;
        self.update_size(h);
        x
    }

    /// Make a left-leaning red link lean to the right
    fn rotate_right(&mut self, h: usize) -> usize {
        let x = self.nodes[h].left.expect("rotate_right requires a left child");
        self.nodes[h].left = self.nodes[x].right;
        self.nodes[x].right = Some(h);
        self.nodes[x].color = self.nodes[h].color;
        self.nodes[h].color = Color::Red;
        self.nodes[x].size = self.nodes[h].size;
        self.update_size(h);
        x
    }

    /// Flip the colours of a node and its children
    fn flip_colors(&mut self, h: usize) {
        self.nodes[h].color = self.nodes[h].color.flip();
        let children = [self.nodes[h].left, self.nodes[h].right];
        for child in children.into_iter().flatten() {
            self.nodes[child].color = self.nodes[child].color.flip();
        }
    }

    /// With `h` red and `h.left`, `h.left.left` black, make `h.left` or one
    /// of its children red.
    fn move_red_left(&mut self, h: usize) -> usize {
        let mut h = h;
        self.flip_colors(h);
        if let Some(right) = self.nodes[h].right {
            if self.is_red(self.nodes[right].left) {
                let right = self.rotate_right(right);
                self.nodes[h].right = Some(right);
                h = self.rotate_left(h);
                self.flip_colors(h);
            }
        }
        h
    }

    /// With `h` red and `h.right`, `h.right.left` black, make `h.right` or one
    /// of its children red.
    fn move_red_right(&mut self, h: usize) -> usize {
        let mut h = h;
        self.flip_colors(h);
        if self.is_red(self.left_of(self.nodes[h].left)) {
            h = self.rotate_right(h);
            self.flip_colors(h);
        }
        h
    }

    /// Restore the left-leaning invariants at `h` and recompute its size
    fn balance(&mut self, h: usize) -> usize {
        let mut h = h;
        if self.is_red(self.nodes[h].right) {
            h = self.rotate_left(h);
        }
        if self.is_red(self.nodes[h].left) && self.is_red(self.left_of(self.nodes[h].left)) {
            h = self.rotate_right(h);
        }
        if self.is_red(self.nodes[h].left) && self.is_red(self.nodes[h].right) {
            self.flip_colors(h);
        }
        self.update_size(h);
        h
    }
}

// ============================================================================
// Iteration
// ============================================================================

/// In-order iterator over an [`OrderedIndex`]
pub struct Iter<'a, K, V> {
    index: &'a OrderedIndex<K, V>,
    stack: Vec<usize>,
    remaining: usize,
}

impl<'a, K: Ord, V> Iter<'a, K, V> {
    fn new(index: &'a OrderedIndex<K, V>) -> Self {
        let mut iter = Self {
            index,
            stack: Vec::new(),
            remaining: index.len(),
        };
        iter.push_left_spine(index.root);
        iter
    }

    fn push_left_spine(&mut self, mut link: Option<usize>) {
        while let Some(h) = link {
            self.stack.push(h);
            link = self.index.nodes[h].left;
        }
    }
}

impl<'a, K: Ord, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let h = self.stack.pop()?;
        let index = self.index;
        let node = &index.nodes[h];
        self.push_left_spine(node.right);
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K: Ord, V> ExactSizeIterator for Iter<'a, K, V> {}

impl<'a, K: Ord, V> IntoIterator for &'a OrderedIndex<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
