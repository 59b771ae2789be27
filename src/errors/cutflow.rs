// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::cutflow::Branch;
use crate::errors::StoreError;
use thiserror::Error;

/// Faults raised while building or traversing a [`crate::cutflow::Cutflow`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CutflowError {
    #[error("cutflow already has root '{name}'")]
    RootExists { name: String },

    #[error("cutflow has no root")]
    NoRoot,

    #[error("no cut named '{name}'")]
    NotFound { name: String },

    #[error("{branch} slot of '{anchor}' is already occupied by '{occupant}'")]
    SlotOccupied {
        anchor: String,
        branch: Branch,
        occupant: String,
    },

    #[error("a cut named '{name}' already exists")]
    DuplicateName { name: String },

    #[error("invalid cut name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("cut '{node}' failed: {source}")]
    Evaluation {
        node: String,
        #[source]
        source: StoreError,
    },
}
