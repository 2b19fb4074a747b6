//! Ordered index module.
//!
//! ## Components
//!
//! - [`OrderedIndex`]: size-augmented left-leaning red-black tree
//! - [`InvariantViolation`]: what [`OrderedIndex::check_invariants`] reports
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | get / put / delete | O(log n) |
//! | min / max | O(log n) |
//! | rank / select | O(log n) |
//! | range(lo, hi) | O(log n + k) |
//! | count_range(lo, hi) | O(log n) |

mod node;
pub mod ordered;
pub mod invariants;

pub use ordered::{Iter, OrderedIndex};
pub use invariants::InvariantViolation;
