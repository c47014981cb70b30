/// State management module
///
/// This module handles all application state, including:
/// - The in-memory item store (store.rs)
/// - Shared data structures (data.rs)
/// - Suggestions and the ledger operations on them (suggestion.rs, ledger.rs)

pub mod data;
pub mod ledger;
pub mod store;
pub mod suggestion;

pub use data::{ContentHandle, Item, ItemId, Operation, Progress, Status};
pub use ledger::LedgerError;
pub use store::ItemStore;
pub use suggestion::{Category, Priority, Suggestion, SuggestionDraft, SuggestionId, SuggestionSummary};
