//! Item node for slab-based storage.
//!
//! ## Design
//!
//! `ItemNode` wraps an [`Item`] with one [`CategoryLink`] per distinct
//! category the item carries. Each link holds the doubly-linked list
//! pointers for that category's price bucket, so an item sits in several
//! bucket lists at once (an intrusive multi-list).
//!
//! ## Link References
//!
//! A neighbour is addressed by [`LinkRef`]: the neighbour's slab key plus the
//! slot of the matching link inside it. Fixing up a neighbour never has to
//! search its category table, which keeps attach/detach O(1).
//!
//! ```text
//! item A                 item B
//! links[0] (cat 7) <---> links[1] (cat 7)
//! links[1] (cat 9)
//! ```
//!
//! Links only *refer* to other items; the catalog slab owns every node.

use smallvec::SmallVec;

use crate::types::{CategoryId, Item, ItemId, Price, INLINE_CATEGORIES};

/// Address of one category link: `(item slab key, link slot)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkRef {
    /// Slab key of the item node
    pub item: usize,

    /// Index into the item node's `links`
    pub slot: usize,
}

impl LinkRef {
    #[inline]
    pub fn new(item: usize, slot: usize) -> Self {
        Self { item, slot }
    }
}

/// Per-category list membership of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryLink {
    /// Category this link belongs to
    pub category: CategoryId,

    /// Previous link in the bucket list (toward the head)
    /// None if this is the head
    pub prev: Option<LinkRef>,

    /// Next link in the bucket list (toward the tail)
    /// None if this is the tail
    pub next: Option<LinkRef>,

    /// Price key of the bucket currently holding this link.
    /// None while detached.
    pub bucket: Option<Price>,
}

impl CategoryLink {
    /// Create a detached link for `category`
    #[inline]
    pub fn new(category: CategoryId) -> Self {
        Self {
            category,
            prev: None,
            next: None,
            bucket: None,
        }
    }

    /// Check if this link is attached to a bucket
    #[inline]
    pub fn is_attached(&self) -> bool {
        self.bucket.is_some()
    }
}

/// Item node stored in the catalog slab.
///
/// ## Memory Layout
///
/// ```text
/// ItemNode {
///     item: Item (id, price, inline categories)
///     links: SmallVec<[CategoryLink; 4]> (one per distinct category)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ItemNode {
    /// The actual item data
    pub item: Item,

    /// One link per distinct category, in first-appearance order
    pub links: SmallVec<[CategoryLink; INLINE_CATEGORIES]>,
}

impl ItemNode {
    /// Create a new item node with every link detached.
    ///
    /// A category repeated on the item gets a single link.
    ///
    /// # Example
    ///
    /// ```
    /// use aisle_catalog::catalog::ItemNode;
    /// use aisle_catalog::types::Item;
    ///
    /// let node = ItemNode::new(Item::new(1, 500, &[3, 8, 3]));
    ///
    /// assert_eq!(node.links.len(), 2);
    /// assert_eq!(node.slot_of(8), Some(1));
    /// assert!(node.is_unlinked());
    /// ```
    pub fn new(item: Item) -> Self {
        let mut links: SmallVec<[CategoryLink; INLINE_CATEGORIES]> = SmallVec::new();
        for &category in &item.categories {
            if !links.iter().any(|link| link.category == category) {
                links.push(CategoryLink::new(category));
            }
        }
        Self { item, links }
    }

    /// Slot of the link for `category`
    #[inline]
    pub fn slot_of(&self, category: CategoryId) -> Option<usize> {
        self.links.iter().position(|link| link.category == category)
    }

    /// Check if no link is attached to any bucket
    #[inline]
    pub fn is_unlinked(&self) -> bool {
        self.links.iter().all(|link| !link.is_attached())
    }

    /// Get the item ID
    #[inline]
    pub fn id(&self) -> ItemId {
        self.item.id
    }

    /// Get the item price
    #[inline]
    pub fn price(&self) -> Price {
        self.item.price
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
