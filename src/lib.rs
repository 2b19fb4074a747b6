//! # Aisle Catalog
//!
//! In-memory catalog engine answering id and per-category price queries.
//!
//! ## Architecture
//!
//! - **Types**: Core data structures (Item, InsertOutcome, fixed-point prices)
//! - **Index**: Size-augmented left-leaning red-black tree with rank/select
//! - **Catalog**: Slab-backed store with id, id-range and category indices
//! - **Command**: Line-oriented command parser and processor
//!
//! ## Design Principles
//!
//! 1. **Determinism**: Identical command streams produce identical state roots
//! 2. **No Floating Point**: Prices are integer cents (10^2 scaling)
//! 3. **Arena Memory**: Items and tree nodes live in slabs addressed by key
//! 4. **Synchronous Execution**: Single-threaded, no interior locking
//!
//! ## Example
//!
//! ```
//! use aisle_catalog::Catalog;
//!
//! let mut catalog = Catalog::new();
//! catalog.insert(1, 1_000, Some(&[7]));
//! catalog.insert(2, 2_000, Some(&[7]));
//!
//! assert_eq!(catalog.price_hike(1, 2, 10), 300);
//! assert_eq!(catalog.find_price_range(7, 1_100, 2_200), 2);
//! ```

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: Item, InsertOutcome, prices
pub mod types;

/// Ordered index: LLRB tree with order statistics
pub mod index;

/// Catalog: multi-index item store
pub mod catalog;

/// Command parsing and execution
pub mod command;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use types::{CategoryId, InsertOutcome, Item, ItemId, Price};
pub use index::OrderedIndex;
pub use catalog::{Bucket, Catalog, CatalogConfig, ConsistencyError};
pub use command::{Command, CommandProcessor, ParseError};
