// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod cutflow;
mod execution;
mod report;
mod source;
mod store;

pub use config::{ConfigError, ValidationError};
pub use cutflow::CutflowError;
pub use execution::{ExecutionError, ExecutionFailure};
pub use report::ReportError;
pub use source::SourceError;
pub use store::StoreError;
