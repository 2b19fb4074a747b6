//! Catalog sizing configuration.

/// Default number of item slots pre-allocated by [`CatalogConfig::default`]
pub const DEFAULT_ITEM_CAPACITY: usize = 1_024;

/// Default number of category entries pre-allocated
pub const DEFAULT_CATEGORY_CAPACITY: usize = 64;

/// Pre-allocation hints for a [`Catalog`](crate::catalog::Catalog).
///
/// Capacities are hints only: every structure grows on demand.
///
/// # Example
///
/// ```
/// use aisle_catalog::catalog::{Catalog, CatalogConfig};
///
/// let config = CatalogConfig::default().item_capacity(50_000);
/// let catalog = Catalog::with_config(config);
///
/// assert!(catalog.capacity() >= 50_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Item slots reserved in the slab, primary index and id index
    pub item_capacity: usize,

    /// Category entries reserved in the category index
    pub category_capacity: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            item_capacity: DEFAULT_ITEM_CAPACITY,
            category_capacity: DEFAULT_CATEGORY_CAPACITY,
        }
    }
}

impl CatalogConfig {
    /// Set the number of item slots to reserve
    pub fn item_capacity(mut self, capacity: usize) -> Self {
        self.item_capacity = capacity;
        self
    }

    /// Set the number of category entries to reserve
    pub fn category_capacity(mut self, capacity: usize) -> Self {
        self.category_capacity = capacity;
        self
    }
}
