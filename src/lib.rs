// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Binary decision trees of event selections.
//!
//! A [`cutflow::Cutflow`] routes every record from a bookkeeping root through
//! pass/fail branches of cuts until it runs out of successors, counting raw
//! and weighted passes and failures at every cut on the way. Cuts share two
//! typed per-record stores ([`store::VariableStore`] and [`store::RowStore`]);
//! accepted records commit their row to an [`store::OutputTable`]. Counters
//! are exported as a [`cutflow::CutflowReport`], which can be merged,
//! differenced, rendered and round-tripped through the `.cflow` text format,
//! and gathered per sample into a [`cutflow::CutflowCollection`].

pub mod config;        // config loading, validation + runtime assembly
pub mod cutflow;       // decision tree, counters, reports
pub mod cuts;          // configurable cut library
pub mod engine;        // record drivers
pub mod errors;        // error handling
pub mod event;         // records and record sources
pub mod observability;
pub mod store;         // typed per-record stores
pub mod traits;        // unified abstractions

pub use cutflow::{
    Bookkeeping, Branch, Cutflow, CutflowCollection, CutflowOutcome, CutflowReport, LambdaCut, Verdict,
};
pub use traits::{Cut, CutflowExecutor, ExecutionSummary};
