// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Misuse of the variable store or the row store.
//!
//! These are defects in a cut's logic, never a property of the data, so the
//! executors abort the whole run when one surfaces.

use crate::store::ValueType;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("'{name}' was never declared")]
    Undeclared { name: String },

    #[error("'{name}' is declared as {declared} but was accessed as {requested}")]
    TypeMismatch {
        name: String,
        declared: ValueType,
        requested: ValueType,
    },

    #[error("variable '{name}' was read before any cut set it for this record")]
    Unset { name: String },

    #[error("'{name}' is already declared")]
    AlreadyDeclared { name: String },

    #[error("cannot declare '{name}': declarations are closed once processing starts")]
    Sealed { name: String },
}
