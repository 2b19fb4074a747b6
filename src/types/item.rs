//! Catalog item and the outcome of an insert.
//!
//! ## Fixed-Point Representation
//!
//! Prices are stored as `u64` minor units (cents). See [`crate::types::price`]
//! for conversions to and from the textual `"##.##"` form.

use smallvec::SmallVec;

/// Unique, non-negative item identifier
pub type ItemId = u64;

/// Category identifier (a "partial name" / aisle tag)
pub type CategoryId = u64;

/// Price in minor units (cents)
pub type Price = u64;

/// Inline capacity of the per-item category table.
///
/// Items with more categories spill to the heap.
pub const INLINE_CATEGORIES: usize = 4;

/// Category list carried by an item, in insertion order
pub type Categories = SmallVec<[CategoryId; INLINE_CATEGORIES]>;

// ============================================================================
// Item struct
// ============================================================================

/// A catalog item.
///
/// ## Example
///
/// ```
/// use aisle_catalog::types::Item;
///
/// let item = Item::new(7, 1_250, &[3, 9]);
///
/// assert_eq!(item.id, 7);
/// assert_eq!(item.price, 1_250);
/// assert_eq!(item.checksum(), 12);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Item {
    /// Unique item identifier, immutable once created
    pub id: ItemId,

    /// Current price in cents
    pub price: Price,

    /// Categories carried by this item.
    /// Only replaced wholesale by a full re-insert.
    pub categories: Categories,
}

impl Item {
    /// Create a new item
    pub fn new(id: ItemId, price: Price, categories: &[CategoryId]) -> Self {
        Self {
            id,
            price,
            categories: SmallVec::from_slice(categories),
        }
    }

    /// Check whether this item carries `category`
    #[inline]
    pub fn has_category(&self, category: CategoryId) -> bool {
        self.categories.contains(&category)
    }

    /// Disposal checksum: the sum of all category identifiers.
    ///
    /// Duplicate categories are counted each time they appear.
    pub fn checksum(&self) -> u64 {
        self.categories
            .iter()
            .fold(0u64, |acc, &category| acc.wrapping_add(category))
    }

    /// Serialize into the fixed byte layout hashed by the state root:
    /// `id`, `price`, category count, then each category, all little-endian.
    pub fn to_state_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.id.to_le_bytes());
        out.extend_from_slice(&self.price.to_le_bytes());
        out.extend_from_slice(&(self.categories.len() as u64).to_le_bytes());
        for category in &self.categories {
            out.extend_from_slice(&category.to_le_bytes());
        }
    }
}

// ============================================================================
// InsertOutcome enum
// ============================================================================

/// Result of [`crate::catalog::Catalog::insert`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertOutcome {
    /// The id was not present and a new item was created
    Created,
    /// The id was present and its price (and possibly categories) changed
    Updated,
}

impl InsertOutcome {
    /// Numeric form used by the command total: 1 for created, 0 for updated
    #[inline]
    pub fn as_count(self) -> u64 {
        match self {
            InsertOutcome::Created => 1,
            InsertOutcome::Updated => 0,
        }
    }

    /// Check if a new item was created
    #[inline]
    pub fn is_created(self) -> bool {
        matches!(self, InsertOutcome::Created)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
