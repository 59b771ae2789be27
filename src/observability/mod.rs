// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Every diagnostic the crate emits is a message struct with a `Display`
//! implementation and a [`messages::StructuredLog`] implementation that picks
//! the level and attaches the message's fields to the `tracing` event. This
//! keeps log text out of the engine code and gives each event stable,
//! queryable fields.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::cutflow` - tree construction and record traversal
//! * `messages::engine` - driver lifecycle, chunk dispatch and record faults
//! * `messages::validation` - configuration loading and validation faults
//!
//! # Usage
//!
//! ```rust
//! use the_cutflow::observability::messages::engine::ExecutionStarted;
//! use the_cutflow::observability::messages::StructuredLog;
//!
//! ExecutionStarted {
//!     strategy: "sequential",
//!     cut_count: 12,
//!     max_concurrency: 1,
//! }
//! .log();
//! ```

pub mod messages;
