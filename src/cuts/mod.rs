// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Cuts that can be declared in a configuration file.
//!
//! Cuts written in code use [`crate::cutflow::LambdaCut`] or implement
//! [`crate::traits::Cut`] directly; the kinds here cover the selections that
//! only compare, test or copy record fields.

mod factory;
mod library;

pub use factory::LocalCutFactory;
pub use library::{
    AlwaysCut, CompareOp, FieldSource, FlagCut, PresentCut, SaveCut, SaveTarget, ThresholdCut,
    WeightSource,
};
