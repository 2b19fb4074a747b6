//! Core data types for the catalog.
//!
//! All prices use fixed-point representation (minor units, scaled by 10^2).
//!
//! ## Types
//!
//! - [`Item`]: A catalog item with its id, price and categories
//! - [`InsertOutcome`]: Whether an insert created or updated an item
//!
//! ## Fixed-Point Arithmetic
//!
//! Prices are stored as `u64` cents.
//! Example: 12.34 is stored as 1_234u64

mod item;
pub mod price;

// Re-export all types at module level
pub use item::{Categories, CategoryId, InsertOutcome, Item, ItemId, Price, INLINE_CATEGORIES};
