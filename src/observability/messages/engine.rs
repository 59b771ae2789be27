// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for driver lifecycle and execution events.
//!
//! This module contains message types for logging events related to:
//! * Execution lifecycle (start, completion, failure)
//! * Parallel chunk dispatch
//! * Debug-mode early termination
//! * Per-record faults
//! * Output persistence

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::path::Path;
use tracing::Span;

/// Execution started with specified strategy and configuration.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_cutflow::observability::messages::engine::ExecutionStarted;
///
/// let msg = ExecutionStarted {
///     strategy: "parallel",
///     cut_count: 12,
///     max_concurrency: 4,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ExecutionStarted<'a> {
    pub strategy: &'a str,
    pub cut_count: usize,
    pub max_concurrency: usize,
}

impl Display for ExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting cutflow execution with {} strategy: {} cuts, max_concurrency={}",
            self.strategy, self.cut_count, self.max_concurrency
        )
    }
}

impl StructuredLog for ExecutionStarted<'_> {
    fn log(&self) {
        tracing::info!(
            strategy = self.strategy,
            cut_count = self.cut_count,
            max_concurrency = self.max_concurrency,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "execution",
            span_name = name,
            strategy = self.strategy,
            cut_count = self.cut_count,
            max_concurrency = self.max_concurrency,
        )
    }
}

/// Execution completed successfully.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ExecutionCompleted<'a> {
    pub strategy: &'a str,
    pub processed: u64,
    pub accepted: u64,
    pub duration: std::time::Duration,
}

impl Display for ExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cutflow execution completed with {} strategy: {} of {} records accepted in {:?}",
            self.strategy, self.accepted, self.processed, self.duration
        )
    }
}

impl StructuredLog for ExecutionCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            strategy = self.strategy,
            processed = self.processed,
            accepted = self.accepted,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "execution_completed",
            span_name = name,
            strategy = self.strategy,
            processed = self.processed,
            duration = ?self.duration,
        )
    }
}

/// Execution failed with error.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_cutflow::observability::messages::engine::ExecutionFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
/// let msg = ExecutionFailed {
///     strategy: "sequential",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ExecutionFailed<'a> {
    pub strategy: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cutflow execution failed with {} strategy: {}",
            self.strategy, self.error
        )
    }
}

impl StructuredLog for ExecutionFailed<'_> {
    fn log(&self) {
        tracing::error!(
            strategy = self.strategy,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "execution_failed",
            span_name = name,
            strategy = self.strategy,
            error = %self.error,
        )
    }
}

/// A chunk of records was handed to a worker.
///
/// # Log Level
/// `debug!` - Scheduling detail
pub struct ChunkDispatched {
    pub chunk: usize,
    pub first_record: u64,
    pub record_count: usize,
}

impl Display for ChunkDispatched {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dispatched chunk {} (records {}..{})",
            self.chunk,
            self.first_record,
            self.first_record + self.record_count as u64
        )
    }
}

impl StructuredLog for ChunkDispatched {
    fn log(&self) {
        tracing::debug!(
            chunk = self.chunk,
            first_record = self.first_record,
            record_count = self.record_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "chunk",
            span_name = name,
            chunk = self.chunk,
            first_record = self.first_record,
            record_count = self.record_count,
        )
    }
}

/// Debug mode stopped reading records.
///
/// # Log Level
/// `warn!` - Output is deliberately partial
pub struct DebugLimitReached {
    pub limit: u64,
}

impl Display for DebugLimitReached {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Debug limit reached: stopped after {} records", self.limit)
    }
}

impl StructuredLog for DebugLimitReached {
    fn log(&self) {
        tracing::warn!(limit = self.limit, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("debug_limit", span_name = name, limit = self.limit)
    }
}

/// A record triggered a fatal fault in a cut.
///
/// # Log Level
/// `error!` - The run is aborted
pub struct RecordFailed<'a> {
    pub index: u64,
    pub node: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for RecordFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Record {} failed in cut '{}': {}",
            self.index, self.node, self.error
        )
    }
}

impl StructuredLog for RecordFailed<'_> {
    fn log(&self) {
        tracing::error!(
            index = self.index,
            node = self.node,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "record_failed",
            span_name = name,
            index = self.index,
            node = self.node,
        )
    }
}

/// An output artifact was written.
///
/// # Log Level
/// `info!` - Important operational event
pub struct OutputWritten<'a> {
    pub artifact: &'a str,
    pub path: &'a Path,
}

impl Display for OutputWritten<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Wrote {} to {}", self.artifact, self.path.display())
    }
}

impl StructuredLog for OutputWritten<'_> {
    fn log(&self) {
        tracing::info!(
            artifact = self.artifact,
            path = %self.path.display(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "output_written",
            span_name = name,
            artifact = self.artifact,
            path = %self.path.display(),
        )
    }
}
