// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The reference driver: one record at a time, in arrival order.
//!
//! For every record the executor resets both stores, traverses the cutflow
//! from the start cut and commits the output row when the traversal accepts.
//! The parallel driver is defined as producing exactly what this loop
//! produces, so the per-record step lives here and is shared.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cutflow::{Cutflow, CutflowStats};
use crate::errors::{CutflowError, ExecutionError, ExecutionFailure};
use crate::event::{Event, EventContext, EventSource};
use crate::observability::messages::engine::{
    DebugLimitReached, ExecutionCompleted, ExecutionFailed, ExecutionStarted, RecordFailed,
};
use crate::observability::messages::StructuredLog;
use crate::store::{OutputTable, Stores};
use crate::traits::{CutflowExecutor, ExecutionSummary};

const STRATEGY: &str = "sequential";

/// Single-threaded driver.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use the_cutflow::cutflow::{Bookkeeping, Branch, Cutflow, LambdaCut};
/// use the_cutflow::engine::SequentialExecutor;
/// use the_cutflow::event::{Event, MemorySource};
/// use the_cutflow::store::Stores;
/// use the_cutflow::traits::CutflowExecutor;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut cutflow = Cutflow::new();
/// cutflow.set_root("Bookkeeping", Bookkeeping::default())?;
/// cutflow.insert(
///     "Bookkeeping",
///     "Positive",
///     LambdaCut::new(|ctx| Ok(ctx.event.get::<i64>("value")?.unwrap_or(0) > 0)),
///     Branch::Pass,
/// )?;
///
/// let source = MemorySource::new(vec![
///     Event::new().with("value", 3_i64),
///     Event::new().with("value", -1_i64),
/// ]);
///
/// let summary = SequentialExecutor::new(None)
///     .execute(Arc::new(cutflow), Stores::default(), "Bookkeeping", Box::new(source))
///     .await?;
/// assert_eq!(summary.processed, 2);
/// assert_eq!(summary.accepted, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SequentialExecutor {
    debug_limit: Option<u64>,
}

impl SequentialExecutor {
    /// `debug_limit` stops the run after that many records.
    pub fn new(debug_limit: Option<u64>) -> Self {
        Self { debug_limit }
    }

    fn drive(
        &self,
        cutflow: &Cutflow,
        mut stores: Stores,
        start: &str,
        mut source: Box<dyn EventSource>,
    ) -> (Tally, Option<ExecutionError>) {
        let mut tally = Tally::new(cutflow, &stores);
        if let Err(e) = ensure_start(cutflow, start) {
            return (tally, Some(e));
        }

        loop {
            if let Some(limit) = self.debug_limit {
                if tally.processed >= limit {
                    DebugLimitReached { limit }.log();
                    return (tally, None);
                }
            }

            let event = match source.next_event() {
                None => return (tally, None),
                Some(Ok(event)) => event,
                Some(Err(source)) => {
                    let index = tally.processed;
                    return (tally, Some(ExecutionError::Source { index, source }));
                }
            };

            if let Err(e) = tally.record(cutflow, start, &event, &mut stores) {
                return (tally, Some(e));
            }
        }
    }
}

#[async_trait]
impl CutflowExecutor for SequentialExecutor {
    async fn execute(
        &self,
        cutflow: Arc<Cutflow>,
        stores: Stores,
        start: &str,
        source: Box<dyn EventSource>,
    ) -> Result<ExecutionSummary, ExecutionFailure> {
        let started = Instant::now();
        let start_msg = ExecutionStarted {
            strategy: STRATEGY,
            cut_count: cutflow.len(),
            max_concurrency: 1,
        };
        start_msg.log();

        let (tally, fault) = {
            let span = start_msg.span("sequential_execution");
            let _guard = span.enter();
            self.drive(&cutflow, stores, start, source)
        };

        finish(STRATEGY, tally.into_summary(started.elapsed()), fault)
    }

    fn strategy(&self) -> &'static str {
        STRATEGY
    }
}

/// Counters, rows and record counts accumulated by one driver or worker.
#[derive(Debug)]
pub(crate) struct Tally {
    pub(crate) stats: CutflowStats,
    pub(crate) table: OutputTable,
    pub(crate) processed: u64,
    pub(crate) accepted: u64,
}

impl Tally {
    pub(crate) fn new(cutflow: &Cutflow, stores: &Stores) -> Self {
        Self {
            stats: cutflow.new_stats(),
            table: OutputTable::for_row(&stores.row),
            processed: 0,
            accepted: 0,
        }
    }

    /// Runs the next record; its index is the number of records processed so far.
    pub(crate) fn record(
        &mut self,
        cutflow: &Cutflow,
        start: &str,
        event: &Event,
        stores: &mut Stores,
    ) -> Result<(), ExecutionError> {
        self.record_at(self.processed, cutflow, start, event, stores)
    }

    pub(crate) fn record_at(
        &mut self,
        index: u64,
        cutflow: &Cutflow,
        start: &str,
        event: &Event,
        stores: &mut Stores,
    ) -> Result<(), ExecutionError> {
        if process_record(cutflow, start, index, event, stores, &mut self.stats, &mut self.table)? {
            self.accepted += 1;
        }
        self.processed += 1;
        Ok(())
    }

    /// Appends a later tally: counters add up, rows follow this tally's rows.
    pub(crate) fn absorb(&mut self, later: Tally) {
        self.stats.merge(&later.stats);
        self.table.extend(later.table);
        self.processed += later.processed;
        self.accepted += later.accepted;
    }

    pub(crate) fn into_summary(self, elapsed: Duration) -> ExecutionSummary {
        ExecutionSummary {
            stats: self.stats,
            table: self.table,
            processed: self.processed,
            accepted: self.accepted,
            elapsed,
        }
    }
}

/// Logs the end of a run and shapes its result.
pub(crate) fn finish(
    strategy: &'static str,
    summary: ExecutionSummary,
    fault: Option<ExecutionError>,
) -> Result<ExecutionSummary, ExecutionFailure> {
    match fault {
        None => {
            ExecutionCompleted {
                strategy,
                processed: summary.processed,
                accepted: summary.accepted,
                duration: summary.elapsed,
            }
            .log();
            Ok(summary)
        }
        Some(e) => {
            ExecutionFailed { strategy, error: &e }.log();
            Err(ExecutionFailure::new(e, summary))
        }
    }
}

pub(crate) fn ensure_start(cutflow: &Cutflow, start: &str) -> Result<(), ExecutionError> {
    if cutflow.contains(start) {
        Ok(())
    } else {
        Err(ExecutionError::StartNotFound {
            name: start.to_string(),
        })
    }
}

/// Runs one record through the cutflow and commits its row on ACCEPT.
///
/// Returns whether the record was accepted.
pub(crate) fn process_record(
    cutflow: &Cutflow,
    start: &str,
    index: u64,
    event: &Event,
    stores: &mut Stores,
    stats: &mut CutflowStats,
    table: &mut OutputTable,
) -> Result<bool, ExecutionError> {
    stores.reset();
    let outcome = {
        let mut ctx = EventContext::new(event, stores);
        cutflow.run_with(start, &mut ctx, stats)
    };

    match outcome {
        Ok(outcome) => {
            if outcome.is_accepted() {
                table.append(&stores.row);
            }
            Ok(outcome.is_accepted())
        }
        Err(CutflowError::Evaluation { node, source }) => {
            RecordFailed {
                index,
                node: &node,
                error: &source,
            }
            .log();
            Err(ExecutionError::Record { index, node, source })
        }
        Err(CutflowError::NotFound { name }) => Err(ExecutionError::StartNotFound { name }),
        Err(other) => Err(ExecutionError::Worker {
            reason: other.to_string(),
        }),
    }
}
