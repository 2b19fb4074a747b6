//! Structural self-check for [`OrderedIndex`].
//!
//! Every public mutation must leave the tree satisfying all of these. The
//! check is O(n log n) and meant for tests and consistency audits, not the
//! hot path.

use thiserror::Error;

use crate::index::OrderedIndex;

/// A broken tree invariant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// Some left key is not below, or some right key not above, its ancestor
    #[error("keys are not in symmetric order")]
    SymmetricOrder,

    /// A node's size field disagrees with its children
    #[error("subtree size mismatch: stored {stored}, computed {computed}")]
    SizeMismatch { stored: usize, computed: usize },

    /// `rank(select(k)) != k` for some k
    #[error("rank and select disagree at rank {rank}")]
    RankMismatch { rank: usize },

    /// A red link leans right
    #[error("right-leaning red link")]
    RightLeaningRed,

    /// Two red links in a row on some path
    #[error("two consecutive red links")]
    ConsecutiveRed,

    /// The root is coloured red
    #[error("root is red")]
    RedRoot,

    /// Root-to-leaf paths differ in black-link count
    #[error("black height differs between root-to-leaf paths")]
    Unbalanced,
}

impl<K: Ord, V> OrderedIndex<K, V> {
    /// Verify symmetric order, size fields, rank/select duality, the
    /// left-leaning 2-3 shape and perfect black balance.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if !self.is_ordered(self.root, None, None) {
            return Err(InvariantViolation::SymmetricOrder);
        }
        self.check_sizes(self.root)?;
        self.check_ranks()?;
        if self.is_red(self.root) {
            return Err(InvariantViolation::RedRoot);
        }
        self.check_two_three(self.root)?;
        self.check_black_balance()
    }

    fn is_ordered(&self, link: Option<usize>, lower: Option<&K>, upper: Option<&K>) -> bool {
        let Some(h) = link else {
            return true;
        };
        let node = &self.nodes[h];

        if lower.is_some_and(|lower| node.key <= *lower) {
            return false;
        }
        if upper.is_some_and(|upper| node.key >= *upper) {
            return false;
        }
        self.is_ordered(node.left, lower, Some(&node.key))
            && self.is_ordered(node.right, Some(&node.key), upper)
    }

    fn check_sizes(&self, link: Option<usize>) -> Result<(), InvariantViolation> {
        let Some(h) = link else {
            return Ok(());
        };
        let node = &self.nodes[h];

        let computed = 1 + self.size(node.left) + self.size(node.right);
        if node.size != computed {
            return Err(InvariantViolation::SizeMismatch {
                stored: node.size,
                computed,
            });
        }
        self.check_sizes(node.left)?;
        self.check_sizes(node.right)
    }

    fn check_ranks(&self) -> Result<(), InvariantViolation> {
        for rank in 0..self.len() {
            match self.select(rank) {
                Some(key) if self.rank(key) == rank => {}
                _ => return Err(InvariantViolation::RankMismatch { rank }),
            }
        }
        for key in self.keys() {
            let rank = self.rank(key);
            if self.select(rank) != Some(key) {
                return Err(InvariantViolation::RankMismatch { rank });
            }
        }
        Ok(())
    }

    fn check_two_three(&self, link: Option<usize>) -> Result<(), InvariantViolation> {
        let Some(h) = link else {
            return Ok(());
        };
        let node = &self.nodes[h];

        if self.is_red(node.right) {
            return Err(InvariantViolation::RightLeaningRed);
        }
        if node.is_red() && self.is_red(node.left) {
            return Err(InvariantViolation::ConsecutiveRed);
        }
        self.check_two_three(node.left)?;
        self.check_two_three(node.right)
    }

    fn check_black_balance(&self) -> Result<(), InvariantViolation> {
        // Black links on the leftmost path set the expected height
        let mut black = 0;
        let mut link = self.root;
        while let Some(h) = link {
            if !self.nodes[h].is_red() {
                black += 1;
            }
            link = self.nodes[h].left;
        }

        if self.has_black_height(self.root, black) {
            Ok(())
        } else {
            Err(InvariantViolation::Unbalanced)
        }
    }

    fn has_black_height(&self, link: Option<usize>, black: usize) -> bool {
        let Some(h) = link else {
            return black == 0;
        };
        let node = &self.nodes[h];

        let black = if node.is_red() {
            black
        } else {
            match black.checked_sub(1) {
                Some(black) => black,
                None => return false,
            }
        };
        self.has_black_height(node.left, black) && self.has_black_height(node.right, black)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
