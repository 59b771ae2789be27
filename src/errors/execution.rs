// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{SourceError, StoreError};
use crate::traits::ExecutionSummary;
use thiserror::Error;

/// Errors that abort a driver run.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// A cut misused a store; carries the record and the cut that did it.
    #[error("record {index}: cut '{node}' failed: {source}")]
    Record {
        index: u64,
        node: String,
        #[source]
        source: StoreError,
    },

    #[error("record {index}: event source failed: {source}")]
    Source {
        index: u64,
        #[source]
        source: SourceError,
    },

    #[error("traversal start '{name}' is not a cut in this cutflow")]
    StartNotFound { name: String },

    #[error("worker failed: {reason}")]
    Worker { reason: String },
}

/// A driver run that stopped at a fatal fault.
///
/// `partial` holds everything accumulated before the fault, including the
/// counters of the cuts the faulting record had already passed through, so a
/// report can still be written.
#[derive(Debug, Error)]
#[error("execution aborted: {error}")]
pub struct ExecutionFailure {
    #[source]
    pub error: ExecutionError,
    pub partial: ExecutionSummary,
}

impl ExecutionFailure {
    pub fn new(error: ExecutionError, partial: ExecutionSummary) -> Self {
        Self { error, partial }
    }
}
