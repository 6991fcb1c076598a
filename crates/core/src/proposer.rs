//! Interface for external ordering proposers.
//!
//! A proposer (for example a learned sequence model) stands in for a
//! metaheuristic: it returns an item ordering, optionally with a selection
//! mask, and is scored through the same fitness oracle.

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An ordering proposed for one batch of items.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Proposal {
    /// Permutation of `0..n`.
    pub ordering: Vec<usize>,
    /// Per-item selection mask, indexed by item. `false` means the item is
    /// never offered to the packer.
    pub mask: Option<Vec<bool>>,
}

impl Proposal {
    /// A proposal without a mask.
    pub fn new(ordering: Vec<usize>) -> Self {
        Self {
            ordering,
            mask: None,
        }
    }

    /// Attaches a selection mask.
    pub fn with_mask(mut self, mask: Vec<bool>) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Checks that the ordering is a permutation of `0..num_items` and that
    /// the mask, if present, has one entry per item.
    pub fn validate(&self, num_items: usize) -> Result<()> {
        if self.ordering.len() != num_items {
            return Err(Error::Collaborator(format!(
                "proposal has {} entries, expected {}",
                self.ordering.len(),
                num_items
            )));
        }
        let mut seen = vec![false; num_items];
        for &index in &self.ordering {
            if index >= num_items || seen[index] {
                return Err(Error::Collaborator(format!(
                    "proposal is not a permutation (index {index})"
                )));
            }
            seen[index] = true;
        }
        if let Some(mask) = &self.mask {
            if mask.len() != num_items {
                return Err(Error::Collaborator(format!(
                    "mask has {} entries, expected {}",
                    mask.len(),
                    num_items
                )));
            }
        }
        Ok(())
    }

    /// The ordering restricted to selected items.
    pub fn selected(&self) -> Vec<usize> {
        match &self.mask {
            Some(mask) => self
                .ordering
                .iter()
                .copied()
                .filter(|&i| mask.get(i).copied().unwrap_or(false))
                .collect(),
            None => self.ordering.clone(),
        }
    }
}

/// Source of item orderings other than the built-in metaheuristics.
pub trait SequenceProposer {
    /// The item record the proposer reads.
    type Item;

    /// Proposes an ordering for `items`.
    fn propose(&mut self, items: &[Self::Item]) -> Result<Proposal>;
}
