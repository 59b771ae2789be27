// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for cutflow construction and traversal.

use crate::cutflow::{Branch, Verdict};
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Root cut installed.
///
/// # Log Level
/// `debug!` - Construction detail
pub struct RootSet<'a> {
    pub name: &'a str,
}

impl Display for RootSet<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cutflow root set to '{}'", self.name)
    }
}

impl StructuredLog for RootSet<'_> {
    fn log(&self) {
        tracing::debug!(name = self.name, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("root_set", span_name = name, root = self.name)
    }
}

/// Cut attached to a successor slot of an existing cut.
///
/// # Log Level
/// `debug!` - Construction detail
///
/// # Example
/// ```
/// use the_cutflow::cutflow::Branch;
/// use the_cutflow::observability::messages::cutflow::CutAttached;
///
/// let msg = CutAttached {
///     anchor: "Bookkeeping",
///     name: "HasLep",
///     branch: Branch::Pass,
///     kind: "threshold",
/// };
///
/// assert_eq!(msg.to_string(), "Attached threshold cut 'HasLep' to the pass slot of 'Bookkeeping'");
/// ```
pub struct CutAttached<'a> {
    pub anchor: &'a str,
    pub name: &'a str,
    pub branch: Branch,
    pub kind: &'a str,
}

impl Display for CutAttached<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Attached {} cut '{}' to the {} slot of '{}'",
            self.kind, self.name, self.branch, self.anchor
        )
    }
}

impl StructuredLog for CutAttached<'_> {
    fn log(&self) {
        tracing::debug!(
            anchor = self.anchor,
            name = self.name,
            branch = %self.branch,
            kind = self.kind,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "cut_attached",
            span_name = name,
            anchor = self.anchor,
            cut = self.name,
            branch = %self.branch,
        )
    }
}

/// One record's walk through the tree ended.
///
/// # Log Level
/// `trace!` - Emitted once per record
pub struct TraversalTerminated<'a> {
    pub terminal: &'a str,
    pub verdict: Verdict,
    pub weight: f64,
}

impl Display for TraversalTerminated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Traversal ended at '{}' with {:?} (weight {})",
            self.terminal, self.verdict, self.weight
        )
    }
}

impl StructuredLog for TraversalTerminated<'_> {
    fn log(&self) {
        tracing::trace!(
            terminal = self.terminal,
            verdict = ?self.verdict,
            weight = self.weight,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!(
            "traversal",
            span_name = name,
            terminal = self.terminal,
            verdict = ?self.verdict,
        )
    }
}
