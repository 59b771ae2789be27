// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed ephemeral stores.
//!
//! * [`VariableStore`] - intermediate values shared between cuts within one record
//! * [`RowStore`] - the output row being assembled for the current record
//! * [`OutputTable`] - committed rows, one per accepted record
//!
//! Both stores follow the same contract: names and types are declared once
//! during construction, every access is checked against the declaration, and
//! `reset` runs exactly once per record before any cut is evaluated.

mod row;
mod table;
mod value;
mod variables;

pub use row::RowStore;
pub use table::OutputTable;
pub use value::{TypedValue, Value, ValueType};
pub use variables::VariableStore;

/// The pair of per-record stores a traversal works against.
///
/// Executors clone one `Stores` per worker; the clone carries the
/// declarations and starts from fresh values.
#[derive(Debug, Default)]
pub struct Stores {
    pub variables: VariableStore,
    pub row: RowStore,
}

impl Clone for Stores {
    fn clone(&self) -> Self {
        let mut fresh = Self {
            variables: self.variables.clone(),
            row: self.row.clone(),
        };
        fresh.reset();
        fresh
    }
}

impl Stores {
    pub fn new(variables: VariableStore, row: RowStore) -> Self {
        Self { variables, row }
    }

    /// Closes both stores to further declarations.
    pub fn seal(&mut self) {
        self.variables.seal();
        self.row.seal();
    }

    /// Resets both stores ahead of a new record.
    pub fn reset(&mut self) {
        self.variables.reset();
        self.row.reset();
    }
}
