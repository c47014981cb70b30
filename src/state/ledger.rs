/// Suggestion ledger operations on the item store
///
/// Callers name a suggestion by id only, so lookups scan every item's
/// suggestion sequence.
use thiserror::Error;
use tracing::debug;

use super::data::ItemId;
use super::store::ItemStore;
use super::suggestion::{Suggestion, SuggestionDraft, SuggestionId, SuggestionSummary};

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("{0} is not in the store")]
    UnknownItem(ItemId),
    #[error("{0} not found")]
    SuggestionNotFound(SuggestionId),
}

impl ItemStore {
    /// Append a suggestion to the end of an item's sequence
    pub fn append(
        &mut self,
        item_id: ItemId,
        draft: SuggestionDraft,
    ) -> Result<SuggestionId, LedgerError> {
        let id = SuggestionId(self.next_suggestion + 1);
        let item = self
            .get_mut(item_id)
            .ok_or(LedgerError::UnknownItem(item_id))?;
        item.suggestions.push(Suggestion::from_draft(id, draft));
        self.next_suggestion += 1;

        debug!(item = %item_id, suggestion = %id, "suggestion appended");
        Ok(id)
    }

    /// Flip a suggestion's implemented flag
    ///
    /// Marking an already implemented suggestion is a no-op.
    pub fn mark_implemented(&mut self, id: SuggestionId) -> Result<(), LedgerError> {
        let suggestion = self
            .items
            .iter_mut()
            .flat_map(|item| item.suggestions.iter_mut())
            .find(|s| s.id() == id)
            .ok_or(LedgerError::SuggestionNotFound(id))?;

        if suggestion.mark_implemented() {
            debug!(suggestion = %id, "suggestion implemented");
        }
        Ok(())
    }

    /// Resolve a suggestion id to its owner
    pub fn find_suggestion(&self, id: SuggestionId) -> Option<(ItemId, &Suggestion)> {
        self.items.iter().find_map(|item| {
            item.suggestions
                .iter()
                .find(|s| s.id() == id)
                .map(|s| (item.id, s))
        })
    }

    pub fn summary(&self, item_id: ItemId) -> Option<SuggestionSummary> {
        self.get(item_id)
            .map(|item| SuggestionSummary::from_suggestions(&item.suggestions))
    }
}
