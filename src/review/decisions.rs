use std::collections::{HashMap, HashSet};

use crate::{
    backend::ReviewBackend,
    error::ApiError,
    types::{Decision, DecisionEntry, ItemId, JobId, ReviewItem},
};

/// Holds the user's verdict per review item and turns it into a submission batch.
///
/// Only items the store was created with can receive a decision. Items without
/// a decision are left out of the batch, i.e. unreviewed items are skipped on
/// finalize. Setting a decision again overwrites the previous one in place, so
/// the batch keeps the order in which items were first decided.
#[derive(Debug, Clone, Default)]
pub struct DecisionStore {
    known: HashSet<ItemId>,
    decisions: HashMap<ItemId, Decision>,
    order: Vec<ItemId>,
}

impl DecisionStore {
    pub fn new(items: &[ReviewItem]) -> Self {
        Self::with_ids(items.iter().map(|item| item.id))
    }

    pub fn with_ids(ids: impl IntoIterator<Item = ItemId>) -> Self {
        Self {
            known: ids.into_iter().collect(),
            decisions: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Replays previously recorded entries, e.g. from a saved draft.
    ///
    /// Entries for items that are no longer under review are dropped. Returns
    /// the number of entries applied.
    pub fn restore(&mut self, entries: &[DecisionEntry]) -> usize {
        entries
            .iter()
            .filter(|entry| self.set_decision(entry.item_id, entry.decision))
            .count()
    }

    /// Records `decision` for `item_id`, last write wins.
    ///
    /// Returns `false` and changes nothing when the item is not loaded.
    pub fn set_decision(&mut self, item_id: ItemId, decision: Decision) -> bool {
        if !self.known.contains(&item_id) {
            return false;
        }

        if self.decisions.insert(item_id, decision).is_none() {
            self.order.push(item_id);
        }
        true
    }

    /// `None` means the item is still unset.
    pub fn decision(&self, item_id: ItemId) -> Option<Decision> {
        self.decisions.get(&item_id).copied()
    }

    /// Number of items with an explicit decision.
    pub fn pending_count(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.known.len()
    }

    /// Decided items in the order they were first decided.
    pub fn build_submission(&self) -> Vec<DecisionEntry> {
        self.order
            .iter()
            .filter_map(|item_id| {
                self.decisions.get(item_id).map(|decision| DecisionEntry {
                    item_id: *item_id,
                    decision: *decision,
                })
            })
            .collect()
    }

    /// Hands the current batch to the backend, exactly one call per invocation.
    ///
    /// The store is left untouched either way so a failed submit can be
    /// repeated by the user. Returns the number of decisions sent.
    pub async fn submit<B: ReviewBackend>(
        &self,
        backend: &B,
        job_id: JobId,
    ) -> Result<usize, ApiError> {
        let batch = self.build_submission();
        backend.submit_decisions(job_id, &batch).await?;
        Ok(batch.len())
    }
}
