// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The output table: one row per accepted record, in arrival order.

use serde_json::{Map, Value as JsonValue};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::store::{RowStore, Value, ValueType};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputTable {
    columns: Vec<(String, ValueType)>,
    rows: Vec<Vec<Value>>,
}

impl OutputTable {
    /// An empty table whose schema is fixed by the row store's declarations.
    pub fn for_row(row: &RowStore) -> Self {
        Self {
            columns: row.schema(),
            rows: Vec::new(),
        }
    }

    /// Appends the row store's current values.
    pub fn append(&mut self, row: &RowStore) {
        self.rows.push(row.values());
    }

    /// Moves all rows of `other` to the end of this table.
    pub fn extend(&mut self, other: OutputTable) {
        self.rows.extend(other.rows);
    }

    pub fn columns(&self) -> &[(String, ValueType)] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of `column` in row `i`.
    pub fn cell(&self, i: usize, column: &str) -> Option<&Value> {
        let c = self.columns.iter().position(|(name, _)| name == column)?;
        self.rows.get(i).map(|row| &row[c])
    }

    /// Writes one JSON object per row, keys in column order.
    pub fn write_jsonl<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        for row in &self.rows {
            let mut object = Map::new();
            for ((name, _), value) in self.columns.iter().zip(row) {
                let json = serde_json::to_value(value).unwrap_or(JsonValue::Null);
                object.insert(name.clone(), json);
            }
            serde_json::to_writer(&mut out, &object)?;
            out.write_all(b"\n")?;
        }
        out.flush()
    }
}
