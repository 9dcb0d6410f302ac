use std::collections::HashMap;

use burst_model::{ActivationId, LogicalIndex};
use thiserror::Error;

/// Bookkeeping violations detected while recording an activation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexConflict {
    #[error("activation {0} is already live")]
    DuplicateActivation(ActivationId),
    #[error("logical index {index} already has live activation {live}")]
    IndexAlreadyLive {
        index: LogicalIndex,
        live: ActivationId,
    },
}

/// Live activation registry of one batch.
///
/// Maps every live activation to the logical index it represents, so a retry can derive the arguments of the right slot.
/// Owned by the dispatcher loop: all mutations happen there, in event order.
#[derive(Debug, Default)]
pub struct ActivationIndex {
    /// Live activations indexed by activation id.
    live: HashMap<ActivationId, LogicalIndex>,
    /// Reverse index: logical index -> its live activation.
    by_index: HashMap<LogicalIndex, ActivationId>,
}

impl ActivationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly accepted activation (Triggering -> Pending).
    ///
    /// Refuses a second live activation for the same id or the same logical index.
    pub fn record(
        &mut self,
        activation: ActivationId,
        index: LogicalIndex,
    ) -> Result<(), IndexConflict> {
        if self.live.contains_key(&activation) {
            return Err(IndexConflict::DuplicateActivation(activation));
        }
        if let Some(live) = self.by_index.get(&index) {
            return Err(IndexConflict::IndexAlreadyLive {
                index,
                live: live.clone(),
            });
        }
        self.by_index.insert(index, activation.clone());
        self.live.insert(activation, index);
        Ok(())
    }

    /// Drop an activation that reached a terminal state.
    pub fn settle(&mut self, activation: &ActivationId) -> Option<LogicalIndex> {
        let index = self.live.remove(activation)?;
        self.by_index.remove(&index);
        Some(index)
    }

    /// Drop an activation replaced by a retry, returning the slot to re-invoke.
    pub fn supersede(&mut self, activation: &ActivationId) -> Option<LogicalIndex> {
        self.settle(activation)
    }

    /// Live activation of a logical index, if any.
    pub fn activation_of(&self, index: LogicalIndex) -> Option<&ActivationId> {
        self.by_index.get(&index)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Forget every live activation (batch aborted).
    pub fn clear(&mut self) {
        self.live.clear();
        self.by_index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_lookup() {
        let mut idx = ActivationIndex::new();
        idx.record(ActivationId::from("a-1"), 3).unwrap();

        assert_eq!(idx.activation_of(3), Some(&ActivationId::from("a-1")));
        assert_eq!(idx.live_count(), 1);
    }

    #[test]
    fn settle_removes_both_directions() {
        let mut idx = ActivationIndex::new();
        idx.record(ActivationId::from("a-1"), 0).unwrap();

        assert_eq!(idx.settle(&ActivationId::from("a-1")), Some(0));
        assert!(idx.activation_of(0).is_none());
        assert!(idx.is_empty());
        assert_eq!(idx.settle(&ActivationId::from("a-1")), None);
    }

    #[test]
    fn supersede_frees_the_slot_for_a_retry() {
        let mut idx = ActivationIndex::new();
        idx.record(ActivationId::from("a-1"), 2).unwrap();

        let slot = idx.supersede(&ActivationId::from("a-1")).unwrap();
        assert_eq!(slot, 2);
        idx.record(ActivationId::from("a-2"), slot).unwrap();
        assert_eq!(idx.activation_of(2), Some(&ActivationId::from("a-2")));
    }

    #[test]
    fn duplicate_activation_is_rejected() {
        let mut idx = ActivationIndex::new();
        idx.record(ActivationId::from("dup"), 0).unwrap();

        let err = idx.record(ActivationId::from("dup"), 1).unwrap_err();
        assert_eq!(err, IndexConflict::DuplicateActivation(ActivationId::from("dup")));
        assert_eq!(idx.live_count(), 1);
    }

    #[test]
    fn second_live_activation_for_index_is_rejected() {
        let mut idx = ActivationIndex::new();
        idx.record(ActivationId::from("a-1"), 4).unwrap();

        let err = idx.record(ActivationId::from("a-2"), 4).unwrap_err();
        assert_eq!(
            err,
            IndexConflict::IndexAlreadyLive {
                index: 4,
                live: ActivationId::from("a-1"),
            }
        );
    }

    #[test]
    fn clear_forgets_everything() {
        let mut idx = ActivationIndex::new();
        idx.record(ActivationId::from("a"), 0).unwrap();
        idx.record(ActivationId::from("b"), 1).unwrap();
        idx.clear();
        assert!(idx.is_empty());
        assert!(idx.activation_of(1).is_none());
    }
}
