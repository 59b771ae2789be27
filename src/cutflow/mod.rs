// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The cutflow: a binary decision tree of cuts with per-cut bookkeeping.
//!
//! Each record enters at the root ([`Bookkeeping`]) and walks down the tree.
//! A cut that passes multiplies its weight contribution into the running
//! weight and hands the record to its pass successor; a cut that fails hands
//! it to its fail successor. Running out of successors ends the walk: ACCEPT
//! after a pass, REJECT after a fail.
//!
//! ```text
//! Bookkeeping
//! └☑─HasLep
//!     ├☒─NoLep
//!     └☑─TwoJets
//! ```

mod bookkeeping;
mod collection;
mod graph;
mod node;
mod report;
mod stats;


pub use bookkeeping::Bookkeeping;
pub use collection::CutflowCollection;
pub use graph::Cutflow;
pub use node::{Branch, CutflowOutcome, LambdaCut, Verdict};
pub use report::{CutflowReport, ReportEntry};
pub(crate) use report::unreportable_name;
pub use stats::{CutStats, CutflowStats};
