// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::StoreError;
use crate::event::EventContext;
use crate::store::{Value, ValueType};
use crate::traits::Cut;

/// Where a cut reads the value it tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    /// A field of the current record. Absent fields make the cut fail.
    #[default]
    Event,
    /// A variable written by an earlier cut. Reading it unset is fatal.
    Variable,
    /// A column of the output row being assembled.
    Row,
}

impl fmt::Display for FieldSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSource::Event => write!(f, "event"),
            FieldSource::Variable => write!(f, "variable"),
            FieldSource::Row => write!(f, "row"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum CompareOp {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
}

impl CompareOp {
    pub fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            CompareOp::Gt => lhs > rhs,
            CompareOp::Ge => lhs >= rhs,
            CompareOp::Lt => lhs < rhs,
            CompareOp::Le => lhs <= rhs,
            CompareOp::Eq => lhs == rhs,
            CompareOp::Ne => lhs != rhs,
        }
    }
}

/// A cut's multiplicative weight contribution.
#[derive(Debug, Clone, PartialEq)]
pub enum WeightSource {
    Unit,
    Constant(f64),
    /// Read from the record; an absent field is neutral.
    Field(String),
}

impl WeightSource {
    fn resolve(&self, ctx: &EventContext<'_>) -> Result<f64, StoreError> {
        match self {
            WeightSource::Unit => Ok(1.0),
            WeightSource::Constant(weight) => Ok(*weight),
            WeightSource::Field(field) => Ok(ctx.event.get::<f64>(field)?.unwrap_or(1.0)),
        }
    }
}

fn numeric(name: &str, value: &Value) -> Result<f64, StoreError> {
    value.as_f64().ok_or_else(|| StoreError::TypeMismatch {
        name: name.to_string(),
        declared: value.value_type(),
        requested: ValueType::Float,
    })
}

/// Passes every record.
#[derive(Debug, Clone)]
pub struct AlwaysCut {
    weight: WeightSource,
}

impl AlwaysCut {
    pub fn new(weight: WeightSource) -> Self {
        Self { weight }
    }
}

impl Cut for AlwaysCut {
    fn evaluate(&self, _ctx: &mut EventContext<'_>) -> Result<bool, StoreError> {
        Ok(true)
    }

    fn weight(&self, ctx: &mut EventContext<'_>) -> Result<f64, StoreError> {
        self.weight.resolve(ctx)
    }

    fn kind(&self) -> &'static str {
        "always"
    }
}

/// Numeric comparison of one field against a constant.
#[derive(Debug, Clone)]
pub struct ThresholdCut {
    source: FieldSource,
    field: String,
    op: CompareOp,
    value: f64,
    weight: WeightSource,
}

impl ThresholdCut {
    pub fn new(source: FieldSource, field: impl Into<String>, op: CompareOp, value: f64) -> Self {
        Self {
            source,
            field: field.into(),
            op,
            value,
            weight: WeightSource::Unit,
        }
    }

    pub fn with_weight(mut self, weight: WeightSource) -> Self {
        self.weight = weight;
        self
    }

    fn read(&self, ctx: &EventContext<'_>) -> Result<Option<f64>, StoreError> {
        let field = self.field.as_str();
        match self.source {
            FieldSource::Event => ctx
                .event
                .get_value(field)
                .map(|value| numeric(field, value))
                .transpose(),
            FieldSource::Variable => match ctx.variables.get_value(field)? {
                Some(value) => numeric(field, value).map(Some),
                None => Err(StoreError::Unset {
                    name: field.to_string(),
                }),
            },
            FieldSource::Row => numeric(field, ctx.row.get_value(field)?).map(Some),
        }
    }
}

impl Cut for ThresholdCut {
    fn evaluate(&self, ctx: &mut EventContext<'_>) -> Result<bool, StoreError> {
        Ok(self
            .read(ctx)?
            .is_some_and(|lhs| self.op.apply(lhs, self.value)))
    }

    fn weight(&self, ctx: &mut EventContext<'_>) -> Result<f64, StoreError> {
        self.weight.resolve(ctx)
    }

    fn kind(&self) -> &'static str {
        "threshold"
    }
}

/// Passes when a boolean record field is true. Absent means false.
#[derive(Debug, Clone)]
pub struct FlagCut {
    field: String,
    weight: WeightSource,
}

impl FlagCut {
    pub fn new(field: impl Into<String>, weight: WeightSource) -> Self {
        Self {
            field: field.into(),
            weight,
        }
    }
}

impl Cut for FlagCut {
    fn evaluate(&self, ctx: &mut EventContext<'_>) -> Result<bool, StoreError> {
        Ok(ctx.event.get::<bool>(&self.field)?.unwrap_or(false))
    }

    fn weight(&self, ctx: &mut EventContext<'_>) -> Result<f64, StoreError> {
        self.weight.resolve(ctx)
    }

    fn kind(&self) -> &'static str {
        "flag"
    }
}

/// Passes when the record carries the field at all.
#[derive(Debug, Clone)]
pub struct PresentCut {
    field: String,
    weight: WeightSource,
}

impl PresentCut {
    pub fn new(field: impl Into<String>, weight: WeightSource) -> Self {
        Self {
            field: field.into(),
            weight,
        }
    }
}

impl Cut for PresentCut {
    fn evaluate(&self, ctx: &mut EventContext<'_>) -> Result<bool, StoreError> {
        Ok(ctx.event.contains(&self.field))
    }

    fn weight(&self, ctx: &mut EventContext<'_>) -> Result<f64, StoreError> {
        self.weight.resolve(ctx)
    }

    fn kind(&self) -> &'static str {
        "present"
    }
}

/// Where a [`SaveCut`] copies one record field.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveTarget {
    Column(String),
    Variable(String),
}

/// Copies record fields into the stores, then passes.
///
/// Absent fields leave the column at its default and the variable unset.
#[derive(Debug, Clone)]
pub struct SaveCut {
    copies: Vec<(String, SaveTarget)>,
    weight: WeightSource,
}

impl SaveCut {
    pub fn new(weight: WeightSource) -> Self {
        Self {
            copies: Vec::new(),
            weight,
        }
    }

    pub fn copy(mut self, field: impl Into<String>, target: SaveTarget) -> Self {
        self.copies.push((field.into(), target));
        self
    }
}

impl Cut for SaveCut {
    fn evaluate(&self, ctx: &mut EventContext<'_>) -> Result<bool, StoreError> {
        for (field, target) in &self.copies {
            let Some(value) = ctx.event.get_value(field) else {
                continue;
            };
            let (name, declared) = match target {
                SaveTarget::Column(name) => (name, ctx.row.declared_type(name)),
                SaveTarget::Variable(name) => (name, ctx.variables.declared_type(name)),
            };
            let declared = declared.ok_or_else(|| StoreError::Undeclared { name: name.clone() })?;
            let value = value
                .clone()
                .conform(declared)
                .ok_or_else(|| StoreError::TypeMismatch {
                    name: name.clone(),
                    declared,
                    requested: value.value_type(),
                })?;
            match target {
                SaveTarget::Column(name) => ctx.row.set_value(name, value)?,
                SaveTarget::Variable(name) => ctx.variables.set_value(name, value)?,
            }
        }
        Ok(true)
    }

    fn weight(&self, ctx: &mut EventContext<'_>) -> Result<f64, StoreError> {
        self.weight.resolve(ctx)
    }

    fn kind(&self) -> &'static str {
        "save"
    }
}
