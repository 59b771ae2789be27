// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::StoreError;
use crate::event::EventContext;
use crate::traits::Cut;

/// Which successor slot of a cut a new cut is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    /// Visited when the anchor's predicate is true.
    Pass,
    /// Visited when the anchor's predicate is false.
    Fail,
}

impl Default for Branch {
    fn default() -> Self {
        Branch::Pass
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Branch::Pass => write!(f, "pass"),
            Branch::Fail => write!(f, "fail"),
        }
    }
}

/// How a record's traversal ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
}

/// Result of one traversal.
#[derive(Debug, Clone, PartialEq)]
pub struct CutflowOutcome {
    pub verdict: Verdict,
    /// Product of the weight contributions of every cut that passed on the path.
    pub weight: f64,
    /// The last cut visited.
    pub terminal: String,
}

impl CutflowOutcome {
    pub fn is_accepted(&self) -> bool {
        self.verdict == Verdict::Accept
    }
}

type Predicate = dyn Fn(&mut EventContext<'_>) -> Result<bool, StoreError> + Send + Sync;
type Weight = dyn Fn(&mut EventContext<'_>) -> Result<f64, StoreError> + Send + Sync;

/// A cut built from closures, for cuts that are simplest written inline.
///
/// ```
/// use the_cutflow::cutflow::LambdaCut;
///
/// let lep_pt_gt40 = LambdaCut::new(|ctx| Ok(ctx.row.get::<f64>("lep_pt")? >= 40.0))
///     .with_weight(|ctx| Ok(ctx.row.get::<f64>("lep_sf")?));
/// ```
pub struct LambdaCut {
    predicate: Box<Predicate>,
    weight: Option<Box<Weight>>,
}

impl LambdaCut {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&mut EventContext<'_>) -> Result<bool, StoreError> + Send + Sync + 'static,
    {
        Self {
            predicate: Box::new(predicate),
            weight: None,
        }
    }

    pub fn with_weight<W>(mut self, weight: W) -> Self
    where
        W: Fn(&mut EventContext<'_>) -> Result<f64, StoreError> + Send + Sync + 'static,
    {
        self.weight = Some(Box::new(weight));
        self
    }
}

impl Cut for LambdaCut {
    fn evaluate(&self, ctx: &mut EventContext<'_>) -> Result<bool, StoreError> {
        (self.predicate)(ctx)
    }

    fn weight(&self, ctx: &mut EventContext<'_>) -> Result<f64, StoreError> {
        match &self.weight {
            Some(weight) => weight(ctx),
            None => Ok(1.0),
        }
    }

    fn kind(&self) -> &'static str {
        "lambda"
    }
}
