//! Bucket management for items sharing one (category, price) pair.
//!
//! ## Design
//!
//! A `Bucket` is the counted sentinel head of a doubly-linked list threaded
//! through the items' [`CategoryLink`](crate::catalog::CategoryLink)s for one
//! category. The item data lives in the catalog slab; this struct only
//! holds the list metadata.
//!
//! ## List Structure
//!
//! ```text
//! head (newest) <-> item2 <-> item3 <-> tail (oldest)
//! ```
//!
//! - Attached items are prepended at the head
//! - Any item can be detached in O(1) through its stored prev/next
//! - The catalog prunes a bucket once `detach` reports zero remaining

use slab::Slab;

use crate::catalog::{ItemNode, LinkRef};
use crate::types::{CategoryId, ItemId, Price};

/// All items of one category at one price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    /// Category shared by every member
    pub category: CategoryId,

    /// Price shared by every member (cents)
    pub price: Price,

    /// Most recently attached member
    pub head: Option<LinkRef>,

    /// Least recently attached member
    pub tail: Option<LinkRef>,

    /// Number of attached members
    pub count: usize,
}

impl Bucket {
    /// Create a new empty bucket
    pub fn new(category: CategoryId, price: Price) -> Self {
        Self {
            category,
            price,
            head: None,
            tail: None,
            count: 0,
        }
    }

    /// Check if the bucket is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Prepend a link to the list
    ///
    /// # Arguments
    ///
    /// * `at` - The item slab key and link slot to attach
    /// * `items` - The slab containing all item nodes
    ///
    /// # Panics
    ///
    /// Panics if the key doesn't exist in the slab, or if the link belongs to
    /// another category or is already attached somewhere.
    pub fn attach(&mut self, at: LinkRef, items: &mut Slab<ItemNode>) {
        let node = items.get_mut(at.item).expect("Invalid slab key");
        let link = &mut node.links[at.slot];
        assert_eq!(link.category, self.category, "link belongs to another category");
        assert!(!link.is_attached(), "link is already attached to a bucket");

        link.prev = None;
        link.next = self.head;
        link.bucket = Some(self.price);

        if let Some(head) = self.head {
            // Link the old head back to the new node
            let head_node = items.get_mut(head.item).expect("Invalid head key");
            head_node.links[head.slot].prev = Some(at);
        } else {
            // Empty list - this is also the tail
            self.tail = Some(at);
        }

        self.head = Some(at);
        self.count += 1;
    }

    /// Unlink a link from the list
    ///
    /// # Returns
    ///
    /// The number of members left in this bucket
    ///
    /// # Panics
    ///
    /// Panics if the link is not currently attached to this bucket.
    pub fn detach(&mut self, at: LinkRef, items: &mut Slab<ItemNode>) -> usize {
        let node = items.get(at.item).expect("Invalid slab key");
        let link = &node.links[at.slot];
        assert!(
            link.category == self.category && link.bucket == Some(self.price),
            "item {} is not attached to bucket ({}, {})",
            node.id(),
            self.category,
            self.price
        );
        let prev = link.prev;
        let next = link.next;

        // Update the previous link's next pointer
        if let Some(p) = prev {
            let prev_node = items.get_mut(p.item).expect("Invalid prev key");
            prev_node.links[p.slot].next = next;
        } else {
            // This was the head
            self.head = next;
        }

        // Update the next link's prev pointer
        if let Some(n) = next {
            let next_node = items.get_mut(n.item).expect("Invalid next key");
            next_node.links[n.slot].prev = prev;
        } else {
            // This was the tail
            self.tail = prev;
        }

        // Clear the detached link
        let link = &mut items.get_mut(at.item).expect("Invalid slab key").links[at.slot];
        link.prev = None;
        link.next = None;
        link.bucket = None;

        self.count -= 1;
        self.count
    }

    /// Walk the member item ids from head to tail
    pub fn iter<'a>(&self, items: &'a Slab<ItemNode>) -> BucketIter<'a> {
        BucketIter {
            items,
            cursor: self.head,
        }
    }
}

/// Iterator over the item ids in a [`Bucket`], head first
pub struct BucketIter<'a> {
    items: &'a Slab<ItemNode>,
    cursor: Option<LinkRef>,
}

impl<'a> Iterator for BucketIter<'a> {
    type Item = ItemId;

    fn next(&mut self) -> Option<Self::Item> {
        let at = self.cursor?;
        let node = self.items.get(at.item)?;
        self.cursor = node.links[at.slot].next;
        Some(node.id())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Item;

    const CATEGORY: CategoryId = 7;
    const PRICE: Price = 1_000;

    fn create_test_node(slab: &mut Slab<ItemNode>, id: ItemId, categories: &[CategoryId]) -> usize {
        slab.insert(ItemNode::new(Item::new(id, PRICE, categories)))
    }

    fn ids(bucket: &Bucket, slab: &Slab<ItemNode>) -> Vec<ItemId> {
        bucket.iter(slab).collect()
    }

    #[test]
    fn test_bucket_new() {
        let bucket = Bucket::new(CATEGORY, PRICE);

        assert_eq!(bucket.category, CATEGORY);
        assert_eq!(bucket.price, PRICE);
        assert!(bucket.head.is_none());
        assert!(bucket.tail.is_none());
        assert_eq!(bucket.count, 0);
        assert!(bucket.is_empty());
    }

    #[test]
    fn test_bucket_attach_single() {
        let mut slab = Slab::with_capacity(10);
        let mut bucket = Bucket::new(CATEGORY, PRICE);

        let key = create_test_node(&mut slab, 1, &[CATEGORY]);
        let at = LinkRef::new(key, 0);
        bucket.attach(at, &mut slab);

        assert_eq!(bucket.count, 1);
        assert_eq!(bucket.head, Some(at));
        assert_eq!(bucket.tail, Some(at));
        assert!(!bucket.is_empty());

        let link = &slab[key].links[0];
        assert!(link.prev.is_none());
        assert!(link.next.is_none());
        assert_eq!(link.bucket, Some(PRICE));
    }

    #[test]
    fn test_bucket_attach_prepends() {
        let mut slab = Slab::with_capacity(10);
        let mut bucket = Bucket::new(CATEGORY, PRICE);

        let key1 = create_test_node(&mut slab, 1, &[CATEGORY]);
        let key2 = create_test_node(&mut slab, 2, &[CATEGORY]);
        let key3 = create_test_node(&mut slab, 3, &[CATEGORY]);

        for key in [key1, key2, key3] {
            bucket.attach(LinkRef::new(key, 0), &mut slab);
        }

        assert_eq!(bucket.count, 3);
        assert_eq!(bucket.head, Some(LinkRef::new(key3, 0)));
        assert_eq!(bucket.tail, Some(LinkRef::new(key1, 0)));
        assert_eq!(ids(&bucket, &slab), vec![3, 2, 1]);

        // Verify linked list structure: key3 <-> key2 <-> key1
        let link2 = &slab[key2].links[0];
        assert_eq!(link2.prev, Some(LinkRef::new(key3, 0)));
        assert_eq!(link2.next, Some(LinkRef::new(key1, 0)));
    }

    #[test]
    fn test_bucket_links_across_slots() {
        let mut slab = Slab::with_capacity(10);
        let mut bucket = Bucket::new(CATEGORY, PRICE);

        // The shared category sits in a different slot on each item
        let key1 = create_test_node(&mut slab, 1, &[CATEGORY, 2]);
        let key2 = create_test_node(&mut slab, 2, &[3, 4, CATEGORY]);

        bucket.attach(LinkRef::new(key1, 0), &mut slab);
        bucket.attach(LinkRef::new(key2, 2), &mut slab);

        assert_eq!(slab[key2].links[2].next, Some(LinkRef::new(key1, 0)));
        assert_eq!(slab[key1].links[0].prev, Some(LinkRef::new(key2, 2)));
        // Other categories untouched
        assert!(!slab[key1].links[1].is_attached());
        assert!(!slab[key2].links[0].is_attached());
    }

    #[test]
    fn test_bucket_detach_middle() {
        let mut slab = Slab::with_capacity(10);
        let mut bucket = Bucket::new(CATEGORY, PRICE);

        let key1 = create_test_node(&mut slab, 1, &[CATEGORY]);
        let key2 = create_test_node(&mut slab, 2, &[CATEGORY]);
        let key3 = create_test_node(&mut slab, 3, &[CATEGORY]);
        for key in [key1, key2, key3] {
            bucket.attach(LinkRef::new(key, 0), &mut slab);
        }

        let remaining = bucket.detach(LinkRef::new(key2, 0), &mut slab);

        assert_eq!(remaining, 2);
        assert_eq!(bucket.count, 2);
        assert_eq!(ids(&bucket, &slab), vec![3, 1]);
        assert_eq!(slab[key3].links[0].next, Some(LinkRef::new(key1, 0)));
        assert_eq!(slab[key1].links[0].prev, Some(LinkRef::new(key3, 0)));
        assert!(slab[key2].is_unlinked());
    }

    #[test]
    fn test_bucket_detach_head_and_tail() {
        let mut slab = Slab::with_capacity(10);
        let mut bucket = Bucket::new(CATEGORY, PRICE);

        let key1 = create_test_node(&mut slab, 1, &[CATEGORY]);
        let key2 = create_test_node(&mut slab, 2, &[CATEGORY]);
        let key3 = create_test_node(&mut slab, 3, &[CATEGORY]);
        for key in [key1, key2, key3] {
            bucket.attach(LinkRef::new(key, 0), &mut slab);
        }

        // Head
        bucket.detach(LinkRef::new(key3, 0), &mut slab);
        assert_eq!(bucket.head, Some(LinkRef::new(key2, 0)));
        assert!(slab[key2].links[0].prev.is_none());

        // Tail
        bucket.detach(LinkRef::new(key1, 0), &mut slab);
        assert_eq!(bucket.tail, Some(LinkRef::new(key2, 0)));
        assert_eq!(bucket.head, Some(LinkRef::new(key2, 0)));
        assert!(slab[key2].links[0].next.is_none());
    }

    #[test]
    fn test_bucket_detach_only() {
        let mut slab = Slab::with_capacity(10);
        let mut bucket = Bucket::new(CATEGORY, PRICE);

        let key = create_test_node(&mut slab, 1, &[CATEGORY]);
        bucket.attach(LinkRef::new(key, 0), &mut slab);

        let remaining = bucket.detach(LinkRef::new(key, 0), &mut slab);

        assert_eq!(remaining, 0);
        assert!(bucket.is_empty());
        assert!(bucket.head.is_none());
        assert!(bucket.tail.is_none());
        assert!(ids(&bucket, &slab).is_empty());
    }

    #[test]
    fn test_bucket_reattach_after_detach() {
        let mut slab = Slab::with_capacity(10);
        let mut bucket = Bucket::new(CATEGORY, PRICE);

        let key = create_test_node(&mut slab, 1, &[CATEGORY]);
        bucket.attach(LinkRef::new(key, 0), &mut slab);
        bucket.detach(LinkRef::new(key, 0), &mut slab);
        bucket.attach(LinkRef::new(key, 0), &mut slab);

        assert_eq!(bucket.count, 1);
        assert_eq!(ids(&bucket, &slab), vec![1]);
    }

    #[test]
    #[should_panic(expected = "not attached")]
    fn test_bucket_detach_unattached_panics() {
        let mut slab = Slab::with_capacity(10);
        let mut bucket = Bucket::new(CATEGORY, PRICE);

        let key = create_test_node(&mut slab, 1, &[CATEGORY]);
        bucket.detach(LinkRef::new(key, 0), &mut slab);
    }

    #[test]
    #[should_panic(expected = "not attached")]
    fn test_bucket_detach_from_wrong_price_panics() {
        let mut slab = Slab::with_capacity(10);
        let mut cheap = Bucket::new(CATEGORY, PRICE);
        let mut dear = Bucket::new(CATEGORY, PRICE * 2);

        let key = create_test_node(&mut slab, 1, &[CATEGORY]);
        cheap.attach(LinkRef::new(key, 0), &mut slab);
        dear.detach(LinkRef::new(key, 0), &mut slab);
    }

    #[test]
    #[should_panic(expected = "already attached")]
    fn test_bucket_double_attach_panics() {
        let mut slab = Slab::with_capacity(10);
        let mut bucket = Bucket::new(CATEGORY, PRICE);

        let key = create_test_node(&mut slab, 1, &[CATEGORY]);
        bucket.attach(LinkRef::new(key, 0), &mut slab);
        bucket.attach(LinkRef::new(key, 0), &mut slab);
    }
}
