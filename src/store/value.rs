// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Tagged values shared by the variable store, the row store and events.
//!
//! Every slot in a store is declared with a [`ValueType`] and only ever holds a
//! [`Value`] of that type. Rust types map onto value types through
//! [`TypedValue`], which is what makes `store.get::<f64>("lep_pt")` checkable
//! against the declaration at runtime without any reflection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The declared type of a store slot, output column or event field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Bool,
    Int,
    Float,
    Text,
    FloatList,
    IntList,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Text => "text",
            ValueType::FloatList => "float_list",
            ValueType::IntList => "int_list",
        };
        write!(f, "{}", name)
    }
}

impl ValueType {
    /// Whether values of this type read as a number (see [`Value::as_f64`]).
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueType::Bool | ValueType::Int | ValueType::Float)
    }
}

/// A single typed value.
///
/// Deserialization is untagged so that plain JSON/YAML scalars map directly:
/// `true` is a `Bool`, `3` an `Int`, `3.5` a `Float`, `"x"` a `Text` and
/// numeric arrays become `IntList` or `FloatList`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    IntList(Vec<i64>),
    FloatList(Vec<f64>),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::Text(_) => ValueType::Text,
            Value::IntList(_) => ValueType::IntList,
            Value::FloatList(_) => ValueType::FloatList,
        }
    }

    /// Numeric view of a scalar, used by threshold comparisons.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Converts a loosely-typed literal (e.g. `-999` from a config file) into
    /// the declared type. Only widening conversions are allowed.
    pub fn conform(self, ty: ValueType) -> Option<Value> {
        match (self, ty) {
            (value, ty) if value.value_type() == ty => Some(value),
            (Value::Int(v), ValueType::Float) => Some(Value::Float(v as f64)),
            (Value::IntList(v), ValueType::FloatList) => {
                Some(Value::FloatList(v.into_iter().map(|x| x as f64).collect()))
            }
            _ => None,
        }
    }

    /// The zero value of a type; used when a column is declared without an
    /// explicit default.
    pub fn zero(ty: ValueType) -> Value {
        match ty {
            ValueType::Bool => Value::Bool(false),
            ValueType::Int => Value::Int(0),
            ValueType::Float => Value::Float(0.0),
            ValueType::Text => Value::Text(String::new()),
            ValueType::FloatList => Value::FloatList(Vec::new()),
            ValueType::IntList => Value::IntList(Vec::new()),
        }
    }
}

/// Rust types that can live in a store slot.
pub trait TypedValue: Sized {
    const TYPE: ValueType;

    fn into_value(self) -> Value;

    /// Strict extraction: the value must already have `Self::TYPE`.
    fn from_value(value: &Value) -> Option<Self>;

    /// Lenient extraction used for event fields, where the source format may
    /// not distinguish `3` from `3.0`.
    fn coerce(value: &Value) -> Option<Self> {
        Self::from_value(value)
    }
}

impl TypedValue for bool {
    const TYPE: ValueType = ValueType::Bool;

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl TypedValue for i64 {
    const TYPE: ValueType = ValueType::Int;

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl TypedValue for f64 {
    const TYPE: ValueType = ValueType::Float;

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    fn coerce(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl TypedValue for String {
    const TYPE: ValueType = ValueType::Text;

    fn into_value(self) -> Value {
        Value::Text(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl TypedValue for Vec<f64> {
    const TYPE: ValueType = ValueType::FloatList;

    fn into_value(self) -> Value {
        Value::FloatList(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::FloatList(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn coerce(value: &Value) -> Option<Self> {
        match value {
            Value::FloatList(v) => Some(v.clone()),
            Value::IntList(v) => Some(v.iter().map(|x| *x as f64).collect()),
            _ => None,
        }
    }
}

impl TypedValue for Vec<i64> {
    const TYPE: ValueType = ValueType::IntList;

    fn into_value(self) -> Value {
        Value::IntList(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::IntList(v) => Some(v.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_json_scalars() {
        let v: Value = serde_json::from_str("3").unwrap();
        assert_eq!(v, Value::Int(3));
        let v: Value = serde_json::from_str("3.5").unwrap();
        assert_eq!(v, Value::Float(3.5));
        let v: Value = serde_json::from_str("true").unwrap();
        assert_eq!(v, Value::Bool(true));
        let v: Value = serde_json::from_str("[1.5, 2.5]").unwrap();
        assert_eq!(v, Value::FloatList(vec![1.5, 2.5]));
    }

    #[test]
    fn test_conform_widens_only() {
        assert_eq!(Value::Int(-999).conform(ValueType::Float), Some(Value::Float(-999.0)));
        assert_eq!(Value::Float(1.5).conform(ValueType::Int), None);
        assert_eq!(Value::Bool(true).conform(ValueType::Bool), Some(Value::Bool(true)));
    }

    #[test]
    fn test_strict_vs_lenient_extraction() {
        let v = Value::Int(40);
        assert_eq!(f64::from_value(&v), None);
        assert_eq!(f64::coerce(&v), Some(40.0));
        assert_eq!(i64::from_value(&v), Some(40));
    }
}
