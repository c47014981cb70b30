/// Single-item operation runner
///
/// An operation goes through three steps:
/// 1. `begin` checks the in-progress guard, marks the item and snapshots
///    its source bytes into an owned `Dispatch`
/// 2. `execute` calls the collaborator without touching the store
/// 3. `commit` writes the settled outcome back into the item
///
/// Keeping the store out of step 2 lets any executor drive the await.
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::CollaboratorError;
use crate::services::Collaborators;
use crate::state::data::{ContentHandle, ItemId, Operation, Status};
use crate::state::store::ItemStore;
use crate::state::suggestion::{Category, Priority, SuggestionDraft};

/// What to run on an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub operation: Operation,
    /// Only meaningful for enhance
    pub remove_background: bool,
}

impl Request {
    pub fn enhance(remove_background: bool) -> Self {
        Self {
            operation: Operation::Enhance,
            remove_background,
        }
    }

    pub fn validate() -> Self {
        Self {
            operation: Operation::Validate,
            remove_background: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("{operation} already in progress for {item}")]
    Conflict { item: ItemId, operation: Operation },
    #[error("{0} is not in the store")]
    UnknownItem(ItemId),
}

/// A claimed operation, ready to execute
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub item: ItemId,
    pub request: Request,
    source: ContentHandle,
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Enhanced(ContentHandle),
    Validated(String),
}

/// The result of one executed dispatch, not yet committed
#[derive(Debug, Clone)]
pub struct Settled {
    pub item: ItemId,
    pub request: Request,
    pub result: Result<Outcome, CollaboratorError>,
}

impl Settled {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Mark an item in progress for `request.operation`
///
/// Fails without touching the item if that operation is already running.
pub fn begin(store: &mut ItemStore, id: ItemId, request: Request) -> Result<Dispatch, DispatchError> {
    let item = store.get_mut(id).ok_or(DispatchError::UnknownItem(id))?;

    let progress = item.progress_mut(request.operation);
    if progress.status == Status::InProgress {
        return Err(DispatchError::Conflict {
            item: id,
            operation: request.operation,
        });
    }
    progress.status = Status::InProgress;

    debug!(item = %id, operation = %request.operation, "dispatched");

    Ok(Dispatch {
        item: id,
        request,
        source: item.source.clone(),
    })
}

/// Call the collaborator for a dispatch
pub async fn execute(dispatch: Dispatch, collaborators: &Collaborators) -> Settled {
    let Dispatch {
        item,
        request,
        source,
    } = dispatch;
    let bytes = source.bytes().clone();

    let result = match request.operation {
        Operation::Enhance => collaborators
            .enhancer
            .enhance(bytes, request.remove_background)
            .await
            .map(|enhanced| Outcome::Enhanced(ContentHandle::new(enhanced))),
        Operation::Validate => collaborators
            .validator
            .validate(bytes)
            .await
            .map(Outcome::Validated),
    };

    Settled {
        item,
        request,
        result,
    }
}

/// Apply a settled outcome to its item
///
/// Returns the item's new status, or None if the item was removed while
/// the operation was in flight.
pub fn commit(store: &mut ItemStore, settled: Settled) -> Option<Status> {
    let Settled {
        item: id,
        request,
        result,
    } = settled;
    let operation = request.operation;

    let Some(item) = store.get_mut(id) else {
        debug!(item = %id, %operation, "item removed before its result arrived");
        return None;
    };

    let draft = match result {
        Ok(outcome) => {
            let draft = match outcome {
                Outcome::Enhanced(handle) => {
                    item.derived = Some(handle);
                    enhanced_suggestion(request.remove_background)
                }
                Outcome::Validated(review) => review_suggestion(review),
            };
            let progress = item.progress_mut(operation);
            progress.status = Status::Done;
            progress.last_failure = None;
            Some(draft)
        }
        Err(err) => {
            warn!(item = %id, %operation, kind = ?err.kind(), error = %err, "operation failed");
            let progress = item.progress_mut(operation);
            progress.status = Status::Failed;
            progress.last_failure = Some(err);
            None
        }
    };

    if let Some(draft) = draft {
        if let Err(err) = store.append(id, draft) {
            warn!(item = %id, error = %err, "could not record suggestion");
        }
    }

    store.status(id, operation)
}

/// begin, execute and commit in one go
pub async fn run(
    store: &mut ItemStore,
    id: ItemId,
    request: Request,
    collaborators: &Collaborators,
) -> Result<Status, DispatchError> {
    let dispatch = begin(store, id, request)?;
    let settled = execute(dispatch, collaborators).await;
    commit(store, settled).ok_or(DispatchError::UnknownItem(id))
}

fn enhanced_suggestion(remove_background: bool) -> SuggestionDraft {
    let description = if remove_background {
        "Background removed and replaced with white; brightness and contrast adjusted for the listing."
    } else {
        "Brightness and contrast adjusted for the listing."
    };
    SuggestionDraft::new(Category::Success, Priority::Low, "Image enhanced", description)
}

fn review_suggestion(review: String) -> SuggestionDraft {
    SuggestionDraft::new(
        Category::Improvement,
        Priority::High,
        "Listing guideline review",
        review,
    )
}
