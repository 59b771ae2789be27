// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod runtime;
mod validation;

pub mod consts;

pub use loader::{
    load_and_validate_config, load_config, BookkeepingConfig, ColumnConfig, Config, CutConfig,
    CutKind, ExecutorOptions, SaveConfig, Strategy, Variation, VariableConfig, WeightConfig,
};
pub use runtime::{attachment_order, RuntimeBuilder};
pub use validation::validate_config;
