// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The prospective output row of the record being processed.
//!
//! Columns are declared once, in order, each with a type and a default. The
//! defaults are restored at the start of every record, so any column no cut
//! touched is written out with its default.

use std::collections::HashMap;

use crate::errors::StoreError;
use crate::store::{TypedValue, Value, ValueType};

#[derive(Debug, Clone)]
struct Column {
    name: String,
    ty: ValueType,
    default: Value,
    value: Value,
}

/// Typed output fields for one record, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct RowStore {
    columns: Vec<Column>,
    index: HashMap<String, usize>,
    sealed: bool,
}

impl RowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a column whose type is inferred from its default.
    pub fn declare<T: TypedValue>(&mut self, name: impl Into<String>, default: T) -> Result<(), StoreError> {
        self.declare_value(name, default.into_value())
    }

    /// Declare a column from a runtime value; the column type is the value's type.
    pub fn declare_value(&mut self, name: impl Into<String>, default: Value) -> Result<(), StoreError> {
        let name = name.into();
        if self.sealed {
            return Err(StoreError::Sealed { name });
        }
        if self.index.contains_key(&name) {
            return Err(StoreError::AlreadyDeclared { name });
        }
        self.index.insert(name.clone(), self.columns.len());
        self.columns.push(Column {
            name,
            ty: default.value_type(),
            value: default.clone(),
            default,
        });
        Ok(())
    }

    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Restores every column to its declared default.
    pub fn reset(&mut self) {
        for column in &mut self.columns {
            column.value.clone_from(&column.default);
        }
    }

    pub fn set<T: TypedValue>(&mut self, name: &str, value: T) -> Result<(), StoreError> {
        let column = self.column_mut(name, T::TYPE)?;
        column.value = value.into_value();
        Ok(())
    }

    pub fn get<T: TypedValue>(&self, name: &str) -> Result<T, StoreError> {
        let column = self.column(name, T::TYPE)?;
        T::from_value(&column.value).ok_or_else(|| StoreError::TypeMismatch {
            name: name.to_string(),
            declared: column.ty,
            requested: T::TYPE,
        })
    }

    pub fn get_value(&self, name: &str) -> Result<&Value, StoreError> {
        self.index
            .get(name)
            .map(|i| &self.columns[*i].value)
            .ok_or_else(|| StoreError::Undeclared {
                name: name.to_string(),
            })
    }

    pub fn set_value(&mut self, name: &str, value: Value) -> Result<(), StoreError> {
        let column = self.column_mut(name, value.value_type())?;
        column.value = value;
        Ok(())
    }

    pub fn declared_type(&self, name: &str) -> Option<ValueType> {
        self.index.get(name).map(|i| self.columns[*i].ty)
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Column names and types, in declaration order.
    pub fn schema(&self) -> Vec<(String, ValueType)> {
        self.columns.iter().map(|c| (c.name.clone(), c.ty)).collect()
    }

    /// Current values, in declaration order.
    pub fn values(&self) -> Vec<Value> {
        self.columns.iter().map(|c| c.value.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn column(&self, name: &str, requested: ValueType) -> Result<&Column, StoreError> {
        let i = *self.index.get(name).ok_or_else(|| StoreError::Undeclared {
            name: name.to_string(),
        })?;
        let column = &self.columns[i];
        if column.ty != requested {
            return Err(StoreError::TypeMismatch {
                name: name.to_string(),
                declared: column.ty,
                requested,
            });
        }
        Ok(column)
    }

    fn column_mut(&mut self, name: &str, requested: ValueType) -> Result<&mut Column, StoreError> {
        let i = *self.index.get(name).ok_or_else(|| StoreError::Undeclared {
            name: name.to_string(),
        })?;
        let column = &mut self.columns[i];
        if column.ty != requested {
            return Err(StoreError::TypeMismatch {
                name: name.to_string(),
                declared: column.ty,
                requested,
            });
        }
        Ok(column)
    }
}
