// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::StoreError;
use crate::event::EventContext;

/// One decision in a cutflow: a predicate plus an optional weight contribution.
///
/// `evaluate` may read the event and read or write both stores; whatever it
/// writes is visible to every cut visited after it in the same record.
/// `weight` is only consulted when `evaluate` returned `true`, and runs after
/// it, so it may depend on values the predicate just stored.
///
/// A store misuse surfaces as `Err` and aborts the whole run.
pub trait Cut: Send + Sync {
    fn evaluate(&self, ctx: &mut EventContext<'_>) -> Result<bool, StoreError>;

    fn weight(&self, _ctx: &mut EventContext<'_>) -> Result<f64, StoreError> {
        Ok(1.0)
    }

    /// Short identifier of the cut's implementation, for logs.
    fn kind(&self) -> &'static str;
}
