//! Cross-index consistency audit for [`Catalog`].
//!
//! Walks every index and every bucket list and reports the first broken
//! invariant. O(n log n); meant for tests and the stress harness.

use thiserror::Error;

use crate::catalog::{Catalog, LinkRef};
use crate::index::InvariantViolation;
use crate::types::{CategoryId, ItemId, Price};

/// A broken catalog invariant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyError {
    #[error("index sizes disagree: slab {slab}, primary {primary}, range {range}")]
    SizeMismatch {
        slab: usize,
        primary: usize,
        range: usize,
    },

    #[error("item {id} is indexed inconsistently between primary and range index")]
    IdIndexMismatch { id: ItemId },

    #[error("id index is malformed")]
    IdTree(#[source] InvariantViolation),

    #[error("price index of category {category} is malformed")]
    PriceTree {
        category: CategoryId,
        #[source]
        source: InvariantViolation,
    },

    #[error("item {id} has no bucket for category {category}")]
    MissingBucket { id: ItemId, category: CategoryId },

    #[error("item {id} is linked at price {linked:?} but priced {price}")]
    WrongBucket {
        id: ItemId,
        linked: Option<Price>,
        price: Price,
    },

    #[error("bucket ({category}, {price}) is stored under key {key}")]
    BucketKeyMismatch {
        category: CategoryId,
        price: Price,
        key: Price,
    },

    #[error("bucket ({category}, {price}) counts {stored} members but links {walked}")]
    CountMismatch {
        category: CategoryId,
        price: Price,
        stored: usize,
        walked: usize,
    },

    #[error("bucket ({category}, {price}) links a stray member {at:?}")]
    StrayMember {
        category: CategoryId,
        price: Price,
        at: LinkRef,
    },

    #[error("bucket ({category}, {price}) is empty")]
    EmptyBucket { category: CategoryId, price: Price },

    #[error("category {category} has no buckets")]
    EmptyCategory { category: CategoryId },

    #[error("bucket members total {buckets} but items carry {links} category links")]
    ConservationMismatch { buckets: usize, links: usize },
}

impl Catalog {
    /// Verify that the slab, both id indices and every category index
    /// agree with each other.
    ///
    /// # Example
    ///
    /// ```
    /// use aisle_catalog::catalog::Catalog;
    ///
    /// let mut catalog = Catalog::new();
    /// catalog.insert(1, 100, Some(&[2, 3]));
    /// catalog.insert(1, 200, None);
    ///
    /// assert!(catalog.check_consistency().is_ok());
    /// ```
    pub fn check_consistency(&self) -> Result<(), ConsistencyError> {
        self.check_id_indices()?;
        self.check_item_links()?;

        let mut bucket_members = 0usize;
        for (&category, index) in &self.categories {
            index
                .check_invariants()
                .map_err(|source| ConsistencyError::PriceTree { category, source })?;

            if index.is_empty() {
                return Err(ConsistencyError::EmptyCategory { category });
            }

            for (&key, bucket) in index {
                if bucket.price != key || bucket.category != category {
                    return Err(ConsistencyError::BucketKeyMismatch {
                        category,
                        price: bucket.price,
                        key,
                    });
                }
                if bucket.is_empty() {
                    return Err(ConsistencyError::EmptyBucket { category, price: key });
                }
                bucket_members += self.walk_bucket(category, key, bucket.head, bucket.tail, bucket.count)?;
            }
        }

        let links: usize = self.items.iter().map(|(_, node)| node.links.len()).sum();
        if bucket_members != links {
            return Err(ConsistencyError::ConservationMismatch {
                buckets: bucket_members,
                links,
            });
        }

        Ok(())
    }

    fn check_id_indices(&self) -> Result<(), ConsistencyError> {
        let (slab, primary, range) = (self.items.len(), self.primary.len(), self.by_id.len());
        if slab != primary || slab != range {
            return Err(ConsistencyError::SizeMismatch { slab, primary, range });
        }

        self.by_id.check_invariants().map_err(ConsistencyError::IdTree)?;

        for (&id, &key) in &self.by_id {
            let agrees = self.primary.get(&id) == Some(&key)
                && self.items.get(key).is_some_and(|node| node.id() == id);
            if !agrees {
                return Err(ConsistencyError::IdIndexMismatch { id });
            }
        }
        Ok(())
    }

    /// Every link of every item must sit in the bucket for the item's price.
    fn check_item_links(&self) -> Result<(), ConsistencyError> {
        for (_, node) in &self.items {
            for link in &node.links {
                if link.bucket != Some(node.price()) {
                    return Err(ConsistencyError::WrongBucket {
                        id: node.id(),
                        linked: link.bucket,
                        price: node.price(),
                    });
                }

                let found = self
                    .categories
                    .get(&link.category)
                    .is_some_and(|index| index.contains(&node.price()));
                if !found {
                    return Err(ConsistencyError::MissingBucket {
                        id: node.id(),
                        category: link.category,
                    });
                }
            }
        }
        Ok(())
    }

    /// Walk one bucket list head to tail and return its length.
    fn walk_bucket(
        &self,
        category: CategoryId,
        price: Price,
        head: Option<LinkRef>,
        tail: Option<LinkRef>,
        count: usize,
    ) -> Result<usize, ConsistencyError> {
        let stray = |at| ConsistencyError::StrayMember { category, price, at };

        let mut walked = 0usize;
        let mut prev: Option<LinkRef> = None;
        let mut cursor = head;

        while let Some(at) = cursor {
            // A cycle would walk past the stored count
            if walked > count {
                break;
            }

            let link = self
                .items
                .get(at.item)
                .and_then(|node| node.links.get(at.slot))
                .ok_or_else(|| stray(at))?;
            if link.category != category || link.bucket != Some(price) || link.prev != prev {
                return Err(stray(at));
            }

            walked += 1;
            prev = Some(at);
            cursor = link.next;
        }

        if walked != count || prev != tail {
            return Err(ConsistencyError::CountMismatch {
                category,
                price,
                stored: count,
                walked,
            });
        }
        Ok(walked)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
