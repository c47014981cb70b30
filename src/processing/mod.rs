/// Processing module
///
/// This module handles running operations against items:
/// - Single-item begin/execute/commit (runner.rs)
/// - Whole-store batches with a join barrier (batch.rs)

pub mod batch;
pub mod runner;

pub use batch::{
    all_enhanced, all_validated, commit_all, dispatch_all, enhance_all, settle_all, validate_all,
    Batch, BatchSummary, SettledBatch,
};
pub use runner::{begin, commit, execute, run, Dispatch, DispatchError, Outcome, Request, Settled};
