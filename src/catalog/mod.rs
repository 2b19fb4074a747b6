//! Catalog module: the multi-index item store.
//!
//! ## Architecture
//!
//! - **Slab-based storage**: O(1) item insertion, removal, and lookup
//! - **Id indices**: hash map for point lookups, ordered index for id ranges
//! - **Category buckets**: per category, an ordered index of price buckets,
//!   each an intrusive list of the items at that price
//!
//! ## Components
//!
//! - [`ItemNode`]: `Item` plus one list link per category it carries
//! - [`Bucket`]: all items of one category at one price
//! - [`Catalog`]: the store tying the indices together
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | insert / delete | O(c log n) |
//! | find | O(1) |
//! | find_min_price / find_max_price | O(log b) |
//! | find_price_range | O(log b + k) |
//! | price_hike | O(m c log n) |
//!
//! `c` is categories per item, `b` buckets in the category, `k` buckets in
//! range and `m` items in the id range.
//!
//! ## Example
//!
//! ```
//! use aisle_catalog::catalog::Catalog;
//!
//! let mut catalog = Catalog::with_capacity(10_000);
//! catalog.insert(1, 4_999, Some(&[12, 40]));
//!
//! assert_eq!(catalog.find_min_price(40), Some(4_999));
//! ```

pub mod link;
pub mod bucket;
pub mod config;
pub mod store;
pub mod consistency;

pub use link::{CategoryLink, ItemNode, LinkRef};
pub use bucket::{Bucket, BucketIter};
pub use config::CatalogConfig;
pub use store::{Catalog, PriceIndex};
pub use consistency::ConsistencyError;
