// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors reading, writing or combining cutflow reports.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("report has more than one root cut ('{first}' and '{second}')")]
    MultipleRoots { first: String, second: String },

    #[error("report has no root cut")]
    NoRoot,

    #[error("cut '{name}' links to unknown cut '{missing}'")]
    DanglingLink { name: String, missing: String },

    #[error("can only combine reports with identical cut networks")]
    Inconsistent,

    #[error("cut '{name}' would have a negative raw count")]
    NegativeCount { name: String },

    #[error("no cut named '{name}' in report")]
    UnknownCut { name: String },

    #[error("sample name '{name}' must not contain ',' or line breaks")]
    InvalidSampleName { name: String },

    #[error("a sample named '{name}' already exists")]
    DuplicateSample { name: String },

    #[error("sample order {given:?} does not name each of {expected:?} exactly once")]
    SampleOrder {
        expected: Vec<String>,
        given: Vec<String>,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
