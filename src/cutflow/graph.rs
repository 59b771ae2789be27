// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fmt;

use crate::cutflow::{
    unreportable_name, Bookkeeping, Branch, CutStats, CutflowOutcome, CutflowReport, CutflowStats, Verdict,
};
use crate::errors::CutflowError;
use crate::event::EventContext;
use crate::observability::messages::cutflow::{CutAttached, RootSet, TraversalTerminated};
use crate::observability::messages::StructuredLog;
use crate::traits::Cut;

struct CutNode {
    name: String,
    cut: Box<dyn Cut>,
    parent: Option<usize>,
    pass: Option<usize>,
    fail: Option<usize>,
}

/// A binary decision tree of cuts.
///
/// Every cut has at most one successor per [`Branch`]. Nodes live in an
/// arena in insertion order (the root is always index 0) and are found by
/// name through an index. The structure is write-once: after construction the
/// graph is only read, so it can be shared between workers behind an `Arc`
/// while each worker keeps its own [`CutflowStats`].
pub struct Cutflow {
    nodes: Vec<CutNode>,
    index: HashMap<String, usize>,
    stats: CutflowStats,
}

impl Default for Cutflow {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Cutflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cutflow")
            .field("cuts", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

impl Cutflow {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            stats: CutflowStats::default(),
        }
    }

    /// Designate the unique entry point of the tree.
    pub fn set_root(&mut self, name: impl Into<String>, root: Bookkeeping) -> Result<(), CutflowError> {
        if let Some(existing) = self.nodes.first() {
            return Err(CutflowError::RootExists {
                name: existing.name.clone(),
            });
        }
        let name = name.into();
        check_name(&name)?;
        self.index.insert(name.clone(), 0);
        self.nodes.push(CutNode {
            name: name.clone(),
            cut: Box::new(root),
            parent: None,
            pass: None,
            fail: None,
        });
        self.stats = CutflowStats::with_len(self.nodes.len());
        RootSet { name: &name }.log();
        Ok(())
    }

    /// Attach `cut` under the name `name` as the `branch` successor of `anchor`.
    ///
    /// An occupied slot is never overwritten.
    pub fn insert<C>(
        &mut self,
        anchor: &str,
        name: impl Into<String>,
        cut: C,
        branch: Branch,
    ) -> Result<(), CutflowError>
    where
        C: Cut + 'static,
    {
        self.insert_boxed(anchor, name, Box::new(cut), branch)
    }

    pub fn insert_boxed(
        &mut self,
        anchor: &str,
        name: impl Into<String>,
        cut: Box<dyn Cut>,
        branch: Branch,
    ) -> Result<(), CutflowError> {
        let name = name.into();
        let anchor_i = self.index_of(anchor)?;
        let slot = match branch {
            Branch::Pass => self.nodes[anchor_i].pass,
            Branch::Fail => self.nodes[anchor_i].fail,
        };
        if let Some(occupant) = slot {
            return Err(CutflowError::SlotOccupied {
                anchor: anchor.to_string(),
                branch,
                occupant: self.nodes[occupant].name.clone(),
            });
        }
        if self.index.contains_key(&name) {
            return Err(CutflowError::DuplicateName { name });
        }
        check_name(&name)?;

        let new_i = self.nodes.len();
        let kind = cut.kind();
        self.nodes.push(CutNode {
            name: name.clone(),
            cut,
            parent: Some(anchor_i),
            pass: None,
            fail: None,
        });
        self.index.insert(name.clone(), new_i);
        match branch {
            Branch::Pass => self.nodes[anchor_i].pass = Some(new_i),
            Branch::Fail => self.nodes[anchor_i].fail = Some(new_i),
        }
        self.stats = {
            let mut grown = CutflowStats::with_len(self.nodes.len());
            grown.merge(&self.stats);
            grown
        };

        CutAttached {
            anchor,
            name: &name,
            branch,
            kind,
        }
        .log();
        Ok(())
    }

    /// Traverse from `start`, accumulating into the cutflow's own counters.
    pub fn run(&mut self, start: &str, ctx: &mut EventContext<'_>) -> Result<CutflowOutcome, CutflowError> {
        let start_i = self.index_of(start)?;
        let Cutflow { nodes, stats, .. } = self;
        traverse(nodes, start_i, ctx, stats)
    }

    /// Traverse from `start` against a read-only graph, accumulating into
    /// caller-owned counters.
    pub fn run_with(
        &self,
        start: &str,
        ctx: &mut EventContext<'_>,
        stats: &mut CutflowStats,
    ) -> Result<CutflowOutcome, CutflowError> {
        let start_i = self.index_of(start)?;
        traverse(&self.nodes, start_i, ctx, stats)
    }

    /// Empty counters shaped like this cutflow.
    pub fn new_stats(&self) -> CutflowStats {
        CutflowStats::with_len(self.nodes.len())
    }

    /// Fold externally accumulated counters into the cutflow's own.
    pub fn absorb(&mut self, stats: &CutflowStats) {
        self.stats.merge(stats);
    }

    pub fn reset_stats(&mut self) {
        self.stats = self.new_stats();
    }

    pub fn stats(&self) -> &CutflowStats {
        &self.stats
    }

    pub fn stats_for(&self, name: &str) -> Option<&CutStats> {
        self.index.get(name).and_then(|&i| self.stats.get(i))
    }

    /// Snapshot of the cutflow's own counters.
    pub fn report(&self) -> CutflowReport {
        self.report_with(&self.stats)
    }

    /// Snapshot of the tree structure paired with `stats`.
    pub fn report_with(&self, stats: &CutflowStats) -> CutflowReport {
        let link = |i: Option<usize>| i.map(|i| self.nodes[i].name.clone());
        CutflowReport::from_entries(self.nodes.iter().enumerate().map(|(i, node)| {
            (
                node.name.clone(),
                stats.get(i).copied().unwrap_or_default(),
                link(node.parent),
                link(node.fail),
                link(node.pass),
            )
        }))
    }

    pub fn root(&self) -> Option<&str> {
        self.nodes.first().map(|node| node.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Cut names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|node| node.name.as_str())
    }

    pub fn kind(&self, name: &str) -> Option<&'static str> {
        self.node(name).map(|node| node.cut.kind())
    }

    pub fn parent(&self, name: &str) -> Option<&str> {
        self.linked(name, |node| node.parent)
    }

    pub fn pass_child(&self, name: &str) -> Option<&str> {
        self.linked(name, |node| node.pass)
    }

    pub fn fail_child(&self, name: &str) -> Option<&str> {
        self.linked(name, |node| node.fail)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn index_of(&self, name: &str) -> Result<usize, CutflowError> {
        self.index.get(name).copied().ok_or_else(|| CutflowError::NotFound {
            name: name.to_string(),
        })
    }

    fn node(&self, name: &str) -> Option<&CutNode> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    fn linked(&self, name: &str, link: impl Fn(&CutNode) -> Option<usize>) -> Option<&str> {
        self.node(name)
            .and_then(link)
            .map(|i| self.nodes[i].name.as_str())
    }
}

fn traverse(
    nodes: &[CutNode],
    start: usize,
    ctx: &mut EventContext<'_>,
    stats: &mut CutflowStats,
) -> Result<CutflowOutcome, CutflowError> {
    let mut current = start;
    let mut weight = 1.0;
    loop {
        let node = &nodes[current];
        let evaluation = |source| CutflowError::Evaluation {
            node: node.name.clone(),
            source,
        };

        let next = if node.cut.evaluate(ctx).map_err(evaluation)? {
            weight *= node.cut.weight(ctx).map_err(evaluation)?;
            stats.record_pass(current, weight);
            node.pass.ok_or(Verdict::Accept)
        } else {
            stats.record_fail(current, weight);
            node.fail.ok_or(Verdict::Reject)
        };

        match next {
            Ok(successor) => current = successor,
            Err(verdict) => {
                TraversalTerminated {
                    terminal: &node.name,
                    verdict,
                    weight,
                }
                .log();
                return Ok(CutflowOutcome {
                    verdict,
                    weight,
                    terminal: node.name.clone(),
                });
            }
        }
    }
}

// Names end up as fields of `.cflow` lines and must read back unchanged.
fn check_name(name: &str) -> Result<(), CutflowError> {
    match unreportable_name(name) {
        Some(reason) => Err(CutflowError::InvalidName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
