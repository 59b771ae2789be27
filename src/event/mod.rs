// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Records and where they come from.
//!
//! An [`Event`] is one record of the input stream. Fields that only exist for
//! some sub-populations of records (a trigger path that was not run in one
//! data-taking period, generator information that only simulation carries)
//! come back as `Ok(None)` rather than as an error, so cuts can substitute a
//! neutral default and carry on.

mod json;

pub use json::JsonLinesSource;

use std::collections::HashMap;

use crate::errors::{SourceError, StoreError};
use crate::store::{RowStore, Stores, TypedValue, Value, VariableStore};

/// One input record: a set of named, typed fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    fields: HashMap<String, Value>,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion, mostly for tests and in-memory sources.
    pub fn with<T: TypedValue>(mut self, name: impl Into<String>, value: T) -> Self {
        self.fields.insert(name.into(), value.into_value());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// Typed access to an optional field.
    ///
    /// Absent fields are `Ok(None)`; a field present with an incompatible type
    /// is a schema defect and is reported as a type mismatch.
    pub fn get<T: TypedValue>(&self, name: &str) -> Result<Option<T>, StoreError> {
        match self.fields.get(name) {
            None => Ok(None),
            Some(value) => T::coerce(value).map(Some).ok_or_else(|| StoreError::TypeMismatch {
                name: name.to_string(),
                declared: value.value_type(),
                requested: T::TYPE,
            }),
        }
    }

    pub fn get_value(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Value)> for Event {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// A strictly sequential supplier of records.
pub trait EventSource: Send {
    /// The next record, `None` when the source is exhausted.
    fn next_event(&mut self) -> Option<Result<Event, SourceError>>;
}

/// An event source over records already in memory.
#[derive(Debug, Default)]
pub struct MemorySource {
    events: std::vec::IntoIter<Event>,
}

impl MemorySource {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events: events.into_iter(),
        }
    }
}

impl EventSource for MemorySource {
    fn next_event(&mut self) -> Option<Result<Event, SourceError>> {
        self.events.next().map(Ok)
    }
}

/// Everything a cut may look at or touch while one record is traversed.
pub struct EventContext<'a> {
    pub event: &'a Event,
    pub variables: &'a mut VariableStore,
    pub row: &'a mut RowStore,
}

impl<'a> EventContext<'a> {
    pub fn new(event: &'a Event, stores: &'a mut Stores) -> Self {
        Self {
            event,
            variables: &mut stores.variables,
            row: &mut stores.row,
        }
    }
}
