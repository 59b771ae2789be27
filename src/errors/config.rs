// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::cutflow::Branch;
use crate::errors::{CutflowError, StoreError};
use crate::store::ValueType;
use thiserror::Error;

/// Errors that can occur during cutflow configuration validation.
///
/// All of these are construction-time faults: they are reported together and
/// no record is processed while any of them is present.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Two cuts (or a cut and the bookkeeping root) share a name
    #[error("Duplicate cut name: '{name}'")]
    DuplicateCutName { name: String },

    /// A cut is attached to a parent that does not exist
    #[error("Cut '{cut}' is attached to '{parent}' which does not exist")]
    UnresolvedParent { cut: String, parent: String },

    /// A cut name cannot be written to a cutflow report
    #[error("Invalid cut name '{name}': {reason}")]
    InvalidCutName { name: String, reason: &'static str },

    /// Two cuts claim the same pass/fail slot of one parent
    #[error("Cuts '{first}' and '{second}' both occupy the {branch} slot of '{parent}'")]
    SlotConflict {
        parent: String,
        branch: Branch,
        first: String,
        second: String,
    },

    /// A cut's lineage never reaches the bookkeeping root (detached or cyclic)
    #[error("Cut '{cut}' is not reachable from the root (lineage: {})", lineage.join(" -> "))]
    UnreachableCut { cut: String, lineage: Vec<String> },

    /// The configured traversal start is not a cut
    #[error("Traversal start '{start}' does not exist")]
    UnresolvedStart { start: String },

    /// Two output columns share a name
    #[error("Duplicate output column: '{name}'")]
    DuplicateColumn { name: String },

    /// Two variables share a name
    #[error("Duplicate variable: '{name}'")]
    DuplicateVariable { name: String },

    /// A column default cannot be represented as the column's type
    #[error("Default for column '{name}' is not a {expected}")]
    DefaultTypeMismatch { name: String, expected: ValueType },

    /// A cut kind is missing a field it needs
    #[error("Cut '{cut}' of kind '{kind}' requires '{field}'")]
    MissingCutField {
        cut: String,
        kind: &'static str,
        field: &'static str,
    },

    /// A cut reads or writes a name that is not declared in the stores
    #[error("Cut '{cut}' refers to undeclared {store} '{name}'")]
    UndeclaredReference {
        cut: String,
        store: &'static str,
        name: String,
    },

    /// A threshold cut compares a store slot that does not hold numbers
    #[error("Cut '{cut}' compares {store} '{name}' of type {found}, which is not numeric")]
    NonNumericReference {
        cut: String,
        store: &'static str,
        name: String,
        found: ValueType,
    },
}

/// Errors raised while reading a configuration file or building a cutflow from it.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration validation failed:\n{}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n"))]
    Invalid(Vec<ValidationError>),

    #[error("could not build cutflow: {0}")]
    Build(#[from] CutflowError),

    #[error("could not declare stores: {0}")]
    Store(#[from] StoreError),
}
