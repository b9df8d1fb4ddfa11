// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Errors raised when the crate's containers are misused.
//!
//! Stale change ids are _not_ errors: committing or cancelling a change that has already been
//! superseded is an expected outcome of the optimistic model and is reported as `false` by
//! [`TransactionalValue`](crate::TransactionalValue).

use crate::transaction::ChangeId;

/// The error type for this crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A transactional value was assembled from parts that list the same change twice.
    #[error("change `{0}` appears more than once among the pending changes")]
    DuplicateChangeId(ChangeId),

    /// A task spawned by [`each_spawned`](crate::scheduler::each_spawned) panicked or was
    /// aborted.
    #[cfg(feature = "tokio")]
    #[error("spawned iteration task failed: {0}")]
    TaskFailed(String),
}

/// A `Result` defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
