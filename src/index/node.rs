//! Tree node for slab-based storage.
//!
//! ## Design
//!
//! `Node` carries a key/value pair plus the structural fields of a
//! left-leaning red-black tree. Children are slab keys (`usize`), not
//! boxed pointers, so rotations only rewrite links and never move a node.
//!
//! ## Colour
//!
//! The colour of a node is the colour of the link from its parent. A red
//! link glues the node to its parent into a 3-node of the equivalent 2-3 tree.

/// Colour of the link pointing at a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Color {
    Red,
    Black,
}

impl Color {
    /// Returns the opposite colour
    #[inline]
    pub(crate) fn flip(self) -> Self {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }
}

/// Node stored in the index slab.
///
/// `size` counts the nodes of the subtree rooted here, including itself.
#[derive(Debug, Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Option<usize>,
    pub(crate) right: Option<usize>,
    pub(crate) color: Color,
    pub(crate) size: usize,
}

impl<K, V> Node<K, V> {
    /// New nodes are always red leaves: they join an existing 2-3 node.
    #[inline]
    pub(crate) fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            color: Color::Red,
            size: 1,
        }
    }

    #[inline]
    pub(crate) fn is_red(&self) -> bool {
        self.color == Color::Red
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_new() {
        let node = Node::new(5u64, "five");

        assert_eq!(node.key, 5);
        assert_eq!(node.value, "five");
        assert!(node.left.is_none());
        assert!(node.right.is_none());
        assert!(node.is_red());
        assert_eq!(node.size, 1);
    }

    #[test]
    fn test_color_flip() {
        assert_eq!(Color::Red.flip(), Color::Black);
        assert_eq!(Color::Black.flip(), Color::Red);
    }
}
