// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod cut;
pub mod executor;

pub use cut::Cut;
pub use executor::{CutflowExecutor, ExecutionSummary};
