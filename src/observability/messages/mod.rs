// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! * `cutflow` - tree construction and record traversal
//! * `engine` - driver lifecycle and execution events
//! * `validation` - configuration validation errors

pub mod cutflow;
pub mod engine;
pub mod validation;

use tracing::Span;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the message as a `tracing` event.
    fn log(&self);

    /// Open a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
