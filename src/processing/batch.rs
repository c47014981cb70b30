/// Batch orchestration over every item in the store
///
/// A batch is three explicit phases:
/// - `dispatch_all` claims every eligible item
/// - `settle_all` awaits all collaborator calls together
/// - `commit_all` writes every outcome back once all have settled
///
/// A failing item never stops the others.
use futures_util::future::join_all;
use tracing::info;

use super::runner::{self, Dispatch, Request, Settled};
use crate::services::Collaborators;
use crate::state::data::{ItemId, Operation, Status};
use crate::state::store::ItemStore;

/// Items claimed by one `dispatch_all` call
#[derive(Debug, Clone)]
pub struct Batch {
    pub request: Request,
    pub dispatches: Vec<Dispatch>,
    /// Items left alone because they were done or already running
    pub skipped: Vec<ItemId>,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.dispatches.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SettledBatch {
    pub request: Request,
    pub settled: Vec<Settled>,
    pub skipped: Vec<ItemId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub dispatched: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Claim every item that is neither done nor running for the operation
pub fn dispatch_all(store: &mut ItemStore, request: Request) -> Batch {
    let mut dispatches = Vec::new();
    let mut skipped = Vec::new();

    for id in store.ids() {
        match store.status(id, request.operation) {
            Some(Status::Done | Status::InProgress) | None => skipped.push(id),
            Some(Status::NotStarted | Status::Failed) => match runner::begin(store, id, request) {
                Ok(dispatch) => dispatches.push(dispatch),
                Err(_) => skipped.push(id),
            },
        }
    }

    info!(
        operation = %request.operation,
        dispatched = dispatches.len(),
        skipped = skipped.len(),
        "batch dispatched"
    );

    Batch {
        request,
        dispatches,
        skipped,
    }
}

/// Run every dispatch concurrently and wait for all of them
pub async fn settle_all(batch: Batch, collaborators: Collaborators) -> SettledBatch {
    let Batch {
        request,
        dispatches,
        skipped,
    } = batch;

    let settled = join_all(
        dispatches
            .into_iter()
            .map(|dispatch| runner::execute(dispatch, &collaborators)),
    )
    .await;

    SettledBatch {
        request,
        settled,
        skipped,
    }
}

/// Apply every settled outcome to the store
pub fn commit_all(store: &mut ItemStore, batch: SettledBatch) -> BatchSummary {
    let mut summary = BatchSummary {
        dispatched: batch.settled.len(),
        skipped: batch.skipped.len(),
        ..BatchSummary::default()
    };

    for settled in batch.settled {
        match runner::commit(store, settled) {
            Some(Status::Done) => summary.succeeded += 1,
            Some(_) => summary.failed += 1,
            None => {}
        }
    }

    info!(
        operation = %batch.request.operation,
        succeeded = summary.succeeded,
        failed = summary.failed,
        skipped = summary.skipped,
        "batch committed"
    );
    summary
}

pub async fn enhance_all(
    store: &mut ItemStore,
    collaborators: &Collaborators,
    remove_background: bool,
) -> BatchSummary {
    let batch = dispatch_all(store, Request::enhance(remove_background));
    let settled = settle_all(batch, collaborators.clone()).await;
    commit_all(store, settled)
}

pub async fn validate_all(store: &mut ItemStore, collaborators: &Collaborators) -> BatchSummary {
    let batch = dispatch_all(store, Request::validate());
    let settled = settle_all(batch, collaborators.clone()).await;
    commit_all(store, settled)
}

pub fn all_enhanced(store: &ItemStore) -> bool {
    store.all_done(Operation::Enhance)
}

pub fn all_validated(store: &ItemStore) -> bool {
    store.all_done(Operation::Validate)
}
