//! Catalog: the multi-index store.
//!
//! ## Architecture
//!
//! The catalog keeps three indices in lock-step over one item slab:
//!
//! - **Slab**: owns every [`ItemNode`]; O(1) insert, remove and lookup
//! - **Primary index** (`HashMap`): item id to slab key
//! - **Range index** ([`OrderedIndex`]): id-ordered slab keys, for bulk
//!   operations over an id interval
//! - **Category index** (`HashMap` of [`OrderedIndex`]): per category, a
//!   price-ordered index of [`Bucket`]s
//!
//! Buckets and index values only hold slab keys. An item is detached from
//! every bucket before its slab slot is released, so no reference outlives
//! the item.
//!
//! ## Pruning
//!
//! A bucket is removed from its category index the moment its count drops
//! to zero, and a category index is removed once it holds no buckets.
//!
//! ## Example
//!
//! ```
//! use aisle_catalog::catalog::Catalog;
//! use aisle_catalog::types::InsertOutcome;
//!
//! let mut catalog = Catalog::with_capacity(100);
//!
//! assert_eq!(catalog.insert(1, 1_000, Some(&[7])), InsertOutcome::Created);
//! assert_eq!(catalog.insert(2, 1_500, Some(&[7, 8])), InsertOutcome::Created);
//!
//! assert_eq!(catalog.find(1), Some(1_000));
//! assert_eq!(catalog.find_min_price(7), Some(1_000));
//! assert_eq!(catalog.find_max_price(7), Some(1_500));
//! assert_eq!(catalog.find_price_range(7, 900, 1_200), 1);
//!
//! // Price-only update
//! assert_eq!(catalog.insert(1, 2_000, None), InsertOutcome::Updated);
//! assert_eq!(catalog.find_max_price(7), Some(2_000));
//! ```

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use slab::Slab;
use tracing::{debug, trace};

use crate::catalog::{Bucket, CatalogConfig, ItemNode, LinkRef};
use crate::index::OrderedIndex;
use crate::types::price::{is_valid_hike_percent, percent_increment};
use crate::types::{CategoryId, InsertOutcome, Item, ItemId, Price};

/// Price-ordered buckets of one category
pub type PriceIndex = OrderedIndex<Price, Bucket>;

/// In-memory catalog of items indexed by id, id range and category price.
#[derive(Debug)]
pub struct Catalog {
    /// Item storage
    /// Key: slab index, Value: ItemNode
    pub(super) items: Slab<ItemNode>,

    /// Primary index: item ID to slab key
    pub(super) primary: HashMap<ItemId, usize>,

    /// Range index: id-ordered slab keys
    pub(super) by_id: OrderedIndex<ItemId, usize>,

    /// Category index: category to its price-ordered buckets
    pub(super) categories: HashMap<CategoryId, PriceIndex>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Create a new empty catalog with no pre-allocation
    pub fn new() -> Self {
        Self {
            items: Slab::new(),
            primary: HashMap::new(),
            by_id: OrderedIndex::new(),
            categories: HashMap::new(),
        }
    }

    /// Create a catalog with pre-allocated item capacity
    ///
    /// # Example
    ///
    /// ```
    /// use aisle_catalog::catalog::Catalog;
    ///
    /// let catalog = Catalog::with_capacity(100_000);
    /// assert!(catalog.capacity() >= 100_000);
    /// ```
    pub fn with_capacity(item_capacity: usize) -> Self {
        Self::with_config(CatalogConfig::default().item_capacity(item_capacity))
    }

    /// Create a catalog sized by `config`
    pub fn with_config(config: CatalogConfig) -> Self {
        Self {
            items: Slab::with_capacity(config.item_capacity),
            primary: HashMap::with_capacity(config.item_capacity),
            by_id: OrderedIndex::with_capacity(config.item_capacity),
            categories: HashMap::with_capacity(config.category_capacity),
        }
    }

    // ========================================================================
    // Capacity and Size
    // ========================================================================

    /// Get the current item capacity (pre-allocated slots)
    #[inline]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Get the number of live items
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the catalog holds no items
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of categories with at least one item
    #[inline]
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Get the number of distinct prices in a category
    pub fn bucket_count(&self, category: CategoryId) -> usize {
        self.categories.get(&category).map_or(0, OrderedIndex::len)
    }

    /// Check if an item exists
    #[inline]
    pub fn contains(&self, id: ItemId) -> bool {
        self.primary.contains_key(&id)
    }

    /// Get a reference to an item by id
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        let key = *self.primary.get(&id)?;
        self.items.get(key).map(|node| &node.item)
    }

    /// Ids of the items in the (category, price) bucket, most recent first
    pub fn items_at(&self, category: CategoryId, price: Price) -> Vec<ItemId> {
        self.categories
            .get(&category)
            .and_then(|index| index.get(&price))
            .map(|bucket| bucket.iter(&self.items).collect())
            .unwrap_or_default()
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Insert or update an item
    ///
    /// - New `id`: the item is created and indexed everywhere.
    /// - Existing `id` with `Some(categories)`: full replace (delete, then
    ///   insert with the new price and categories).
    /// - Existing `id` with `None`: price-only update; the item moves to the
    ///   bucket for the new price in every category it carries.
    ///
    /// A new `id` with `None` creates an item carrying no categories.
    pub fn insert(
        &mut self,
        id: ItemId,
        price: Price,
        categories: Option<&[CategoryId]>,
    ) -> InsertOutcome {
        let existing = self.primary.get(&id).copied();

        let Some(key) = existing else {
            self.add_item(Item::new(id, price, categories.unwrap_or(&[])));
            debug!(id, price, "item created");
            return InsertOutcome::Created;
        };

        match categories {
            Some(categories) => {
                self.remove_item(key);
                self.add_item(Item::new(id, price, categories));
                debug!(id, price, "item replaced");
            }
            None => {
                self.reprice(key, price);
                debug!(id, price, "item repriced");
            }
        }
        InsertOutcome::Updated
    }

    /// Delete an item by id
    ///
    /// # Returns
    ///
    /// The sum of the item's category ids, or 0 if the id is absent
    ///
    /// # Example
    ///
    /// ```
    /// use aisle_catalog::catalog::Catalog;
    ///
    /// let mut catalog = Catalog::new();
    /// catalog.insert(42, 500, Some(&[3, 4]));
    ///
    /// assert_eq!(catalog.delete(42), 7);
    /// assert_eq!(catalog.delete(42), 0);
    /// assert!(catalog.is_empty());
    /// ```
    pub fn delete(&mut self, id: ItemId) -> u64 {
        let Some(key) = self.primary.get(&id).copied() else {
            return 0;
        };

        let item = self.remove_item(key);
        debug!(id, "item deleted");
        item.checksum()
    }

    /// Raise the price of every item with `lo <= id <= hi` by `percent`%
    ///
    /// Each increment is `price * percent / 100`, truncated. The matching
    /// items are collected before any price changes.
    ///
    /// # Returns
    ///
    /// The sum of the increments, or 0 (with nothing changed) unless
    /// `0 < percent <= 100`
    pub fn price_hike(&mut self, lo: ItemId, hi: ItemId, percent: u32) -> u64 {
        if !is_valid_hike_percent(percent) {
            debug!(lo, hi, percent, "price hike rejected");
            return 0;
        }

        let keys: Vec<usize> = self
            .by_id
            .range(&lo, &hi)
            .into_iter()
            .map(|(_, &key)| key)
            .collect();

        let mut total: u64 = 0;
        for &key in &keys {
            let price = self.items[key].price();
            let increment = percent_increment(price, percent);
            self.reprice(key, price.saturating_add(increment));
            total = total.saturating_add(increment);
        }

        debug!(lo, hi, percent, items = keys.len(), total, "price hike applied");
        total
    }

    /// Remove every item
    pub fn clear(&mut self) {
        self.items.clear();
        self.primary.clear();
        self.by_id.clear();
        self.categories.clear();
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Current price of an item
    #[inline]
    pub fn find(&self, id: ItemId) -> Option<Price> {
        self.get(id).map(|item| item.price)
    }

    /// Lowest price among the items of a category
    pub fn find_min_price(&self, category: CategoryId) -> Option<Price> {
        self.categories.get(&category)?.min().copied()
    }

    /// Highest price among the items of a category
    pub fn find_max_price(&self, category: CategoryId) -> Option<Price> {
        self.categories.get(&category)?.max().copied()
    }

    /// Number of items of a category priced within `[lo, hi]`
    pub fn find_price_range(&self, category: CategoryId, lo: Price, hi: Price) -> usize {
        if lo > hi {
            return 0;
        }
        self.categories.get(&category).map_or(0, |index| {
            index
                .range(&lo, &hi)
                .into_iter()
                .map(|(_, bucket)| bucket.count)
                .sum()
        })
    }

    // ========================================================================
    // State Root
    // ========================================================================

    /// SHA-256 over every item's `(id, price, categories)` in id order
    ///
    /// Two catalogs holding the same items produce the same root regardless
    /// of the operation history that built them.
    pub fn compute_state_root(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        let mut buf = Vec::with_capacity(64);

        for (_, &key) in &self.by_id {
            buf.clear();
            self.items[key].item.to_state_bytes(&mut buf);
            hasher.update(&buf);
        }

        let result = hasher.finalize();
        let mut root = [0u8; 32];
        root.copy_from_slice(&result);
        root
    }

    /// Get the state root as a hex string
    pub fn state_root_hex(&self) -> String {
        hex::encode(self.compute_state_root())
    }

    // ========================================================================
    // Index Maintenance
    // ========================================================================

    /// Store a new item and index it everywhere
    fn add_item(&mut self, item: Item) -> usize {
        let id = item.id;
        let key = self.items.insert(ItemNode::new(item));

        self.primary.insert(id, key);
        self.by_id.put(id, key);
        self.attach_all(key);

        key
    }

    /// Unindex an item everywhere and release its slab slot
    fn remove_item(&mut self, key: usize) -> Item {
        self.detach_all(key);

        let node = self.items.remove(key);
        self.primary.remove(&node.id());
        self.by_id.delete(&node.id());

        node.item
    }

    /// Move an item to the buckets for `price` in every category it carries
    fn reprice(&mut self, key: usize, price: Price) {
        if self.items[key].price() == price {
            return;
        }

        self.detach_all(key);
        self.items[key].item.price = price;
        self.attach_all(key);
    }

    /// Attach every link of an item to the bucket for its current price,
    /// creating the category index and bucket on demand.
    fn attach_all(&mut self, key: usize) {
        let price = self.items[key].price();

        for slot in 0..self.items[key].links.len() {
            let category = self.items[key].links[slot].category;
            let bucket = self
                .categories
                .entry(category)
                .or_default()
                .get_or_insert_with(price, || Bucket::new(category, price));

            bucket.attach(LinkRef::new(key, slot), &mut self.items);
        }
    }

    /// Detach every link of an item, pruning empty buckets and categories.
    fn detach_all(&mut self, key: usize) {
        for slot in 0..self.items[key].links.len() {
            let link = &self.items[key].links[slot];
            let category = link.category;
            let price = link.bucket.expect("live item link is attached");

            let index = self
                .categories
                .get_mut(&category)
                .expect("attached category has a price index");
            let bucket = index
                .get_mut(&price)
                .expect("attached link has a bucket at its price");

            let remaining = bucket.detach(LinkRef::new(key, slot), &mut self.items);
            if remaining == 0 {
                index.delete(&price);
                trace!(category, price, "bucket pruned");

                if index.is_empty() {
                    self.categories.remove(&category);
                    trace!(category, "category pruned");
                }
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
