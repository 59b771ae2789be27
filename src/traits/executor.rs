// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::cutflow::{Cutflow, CutflowStats};
use crate::errors::ExecutionFailure;
use crate::event::EventSource;
use crate::store::{OutputTable, Stores};

/// Everything a driver run produces.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Per-cut counters accumulated over the run, indexed like the cutflow.
    pub stats: CutflowStats,
    /// One row per accepted record, in record-arrival order.
    pub table: OutputTable,
    /// Records pulled from the source and traversed.
    pub processed: u64,
    /// Records whose traversal ended in ACCEPT.
    pub accepted: u64,
    pub elapsed: Duration,
}

#[async_trait]
pub trait CutflowExecutor: Send + Sync {
    /// Drive every record of `source` through `cutflow`, starting at `start`.
    ///
    /// - `cutflow`: the fully constructed, read-only decision tree
    /// - `stores`: prototype stores holding the declarations; each worker clones them
    /// - `start`: name of the cut the traversal begins at (usually the root)
    /// - `source`: records, read strictly in order
    ///
    /// Returns the accumulated statistics and output table, or the first
    /// fatal error (with the record index and cut name that raised it)
    /// together with everything accumulated before it.
    async fn execute(
        &self,
        cutflow: Arc<Cutflow>,
        stores: Stores,
        start: &str,
        source: Box<dyn EventSource>,
    ) -> Result<ExecutionSummary, ExecutionFailure>;

    /// Name of the strategy, for logs.
    fn strategy(&self) -> &'static str;
}
