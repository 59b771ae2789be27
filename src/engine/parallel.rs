// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Chunked parallel driver.
//!
//! The source is read strictly in order on the calling task and cut into
//! chunks of `chunk_size` records. Each chunk runs on the blocking pool with
//! its own store clones and its own [`crate::cutflow::CutflowStats`]; the cutflow itself is
//! shared read-only behind an `Arc`. A semaphore bounds the number of chunks
//! in flight, which also bounds how far the reader runs ahead of the workers.
//!
//! Reduction happens in chunk order once every dispatched chunk has finished,
//! so the output table keeps record-arrival order and the counters equal what
//! [`super::SequentialExecutor`] produces for the same input. When several
//! faults occur, the one in the earliest chunk is reported and nothing after
//! it is reduced, which leaves exactly the state the sequential driver would
//! have stopped with.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::cutflow::Cutflow;
use crate::errors::{ExecutionError, ExecutionFailure};
use crate::event::{Event, EventSource};
use crate::observability::messages::engine::{ChunkDispatched, DebugLimitReached, ExecutionStarted};
use crate::observability::messages::StructuredLog;
use crate::store::Stores;
use crate::traits::{CutflowExecutor, ExecutionSummary};

use super::sequential::{ensure_start, finish, Tally};

const STRATEGY: &str = "parallel";

/// What one worker hands back: its tally and the fault that stopped it, if any.
type ChunkHandle = JoinHandle<(Tally, Option<ExecutionError>)>;

#[derive(Debug, Clone)]
pub struct ParallelExecutor {
    max_concurrency: usize,
    chunk_size: usize,
    debug_limit: Option<u64>,
}

impl ParallelExecutor {
    /// Zero values for `max_concurrency` or `chunk_size` are raised to one.
    pub fn new(max_concurrency: usize, chunk_size: usize, debug_limit: Option<u64>) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
            chunk_size: chunk_size.max(1),
            debug_limit,
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    async fn drive(
        &self,
        cutflow: Arc<Cutflow>,
        stores: Stores,
        start: &str,
        mut source: Box<dyn EventSource>,
    ) -> (Tally, Option<ExecutionError>) {
        let mut total = Tally::new(&cutflow, &stores);
        if let Err(e) = ensure_start(&cutflow, start) {
            return (total, Some(e));
        }

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let cancellation_token = CancellationToken::new();
        let mut handles: Vec<ChunkHandle> = Vec::new();
        let mut read_fault: Option<ExecutionError> = None;
        let mut read = 0u64;
        let mut exhausted = false;

        while !exhausted && !cancellation_token.is_cancelled() {
            let first_record = read;
            let mut events = Vec::with_capacity(self.chunk_size);

            while events.len() < self.chunk_size {
                if let Some(limit) = self.debug_limit {
                    if read >= limit {
                        DebugLimitReached { limit }.log();
                        exhausted = true;
                        break;
                    }
                }
                match source.next_event() {
                    None => {
                        exhausted = true;
                        break;
                    }
                    Some(Ok(event)) => {
                        events.push(event);
                        read += 1;
                    }
                    Some(Err(source)) => {
                        read_fault = Some(ExecutionError::Source { index: read, source });
                        exhausted = true;
                        break;
                    }
                }
            }

            if events.is_empty() {
                break;
            }

            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    read_fault = Some(ExecutionError::Worker {
                        reason: format!("failed to acquire a worker permit: {}", e),
                    });
                    break;
                }
            };

            let dispatched = ChunkDispatched {
                chunk: handles.len(),
                first_record,
                record_count: events.len(),
            };
            dispatched.log();
            let span = dispatched.span("chunk");

            let cutflow = cutflow.clone();
            let stores = stores.clone();
            let start = start.to_string();
            let token = cancellation_token.clone();
            handles.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                let _guard = span.enter();
                let (tally, fault) = run_chunk(&cutflow, &start, stores, first_record, events);
                if fault.is_some() {
                    token.cancel();
                }
                (tally, fault)
            }));
        }

        // Every handle is awaited so no worker outlives the run, but nothing
        // after the first faulting chunk is reduced.
        let mut chunk_fault: Option<ExecutionError> = None;
        for handle in handles {
            let joined = handle.await;
            if chunk_fault.is_some() {
                continue;
            }
            match joined {
                Ok((tally, fault)) => {
                    total.absorb(tally);
                    chunk_fault = fault;
                }
                Err(join_error) => {
                    chunk_fault = Some(ExecutionError::Worker {
                        reason: format!("task join error: {}", join_error),
                    });
                }
            }
        }

        (total, chunk_fault.or(read_fault))
    }
}

#[async_trait]
impl CutflowExecutor for ParallelExecutor {
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
            max_concurrency: self.max_concurrency,
        };
        start_msg.log();
        let span = start_msg.span("parallel_execution");

        let (tally, fault) = self.drive(cutflow, stores, start, source).instrument(span).await;
        finish(STRATEGY, tally.into_summary(started.elapsed()), fault)
    }

    fn strategy(&self) -> &'static str {
        STRATEGY
    }
}

fn run_chunk(
    cutflow: &Cutflow,
    start: &str,
    mut stores: Stores,
    first_record: u64,
    events: Vec<Event>,
) -> (Tally, Option<ExecutionError>) {
    let mut tally = Tally::new(cutflow, &stores);
    for (offset, event) in events.iter().enumerate() {
        let index = first_record + offset as u64;
        if let Err(e) = tally.record_at(index, cutflow, start, event, &mut stores) {
            return (tally, Some(e));
        }
    }
    (tally, None)
}
