use chrono::Utc;
use tracing::info;

use super::data::{Item, ItemId, Operation, Progress, Status};
use crate::upload::AcceptedFile;

/// The ItemStore owns every image under management.
///
/// Items keep the order in which they were added. Ids come from a
/// monotonic counter, so a removed item's id is never handed out again
/// and stale ids held by callers simply stop resolving.
#[derive(Debug, Default)]
pub struct ItemStore {
    pub(crate) items: Vec<Item>,
    next_item: u64,
    pub(crate) next_suggestion: u64,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an accepted upload and return its new id
    pub fn add(&mut self, file: AcceptedFile) -> ItemId {
        self.next_item += 1;
        let id = ItemId(self.next_item);

        info!(%id, name = %file.name, bytes = file.content.len(), "item added");

        self.items.push(Item {
            id,
            name: file.name,
            mime: file.mime,
            source: file.content,
            derived: None,
            enhancement: Progress::default(),
            validation: Progress::default(),
            suggestions: Vec::new(),
            accepted_at: Utc::now(),
        });
        id
    }

    /// Remove an item, handing it back to the caller
    ///
    /// Dropping the returned item releases its derived content and its
    /// suggestions.
    pub fn remove(&mut self, id: ItemId) -> Option<Item> {
        let index = self.items.iter().position(|item| item.id == id)?;
        let item = self.items.remove(index);
        info!(%id, suggestions = item.suggestions.len(), "item removed");
        Some(item)
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn status(&self, id: ItemId, operation: Operation) -> Option<Status> {
        self.get(id).map(|item| item.status(operation))
    }

    /// True iff every item is done for `operation`
    ///
    /// Recomputed on each call; an empty store counts as all done.
    pub fn all_done(&self, operation: Operation) -> bool {
        self.items
            .iter()
            .all(|item| item.status(operation) == Status::Done)
    }
}
