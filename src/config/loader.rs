// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{BOOKKEEPING_NAME, DOWN_SUFFIX, UP_SUFFIX};
use crate::cutflow::Branch;
use crate::cuts::{CompareOp, FieldSource};
use crate::errors::{ConfigError, ValidationError};
use crate::observability::messages::validation::ConfigLoaded;
use crate::observability::messages::StructuredLog;
use crate::store::{Value, ValueType};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main configuration structure for a cutflow run.
///
/// Describes the stores, the tree of cuts hanging off the bookkeeping root,
/// and how the driver walks the records through it. Loaded from YAML, or from
/// TOML when the file ends in `.toml`.
///
/// # Example
/// ```yaml
/// name: vbswh
/// strategy: parallel
/// executor_options:
///   max_concurrency: 4
///   chunk_size: 1000
/// variation: up
/// bookkeeping:
///   base_weight: 1.0
///   weight_fields: [genWeight]
/// columns:
///   - { name: lep_pt, type: float, default: -999.0 }
/// cuts:
///   - name: HasLep
///     parent: Bookkeeping
///     kind: threshold
///     field: n_leps
///     op: ">="
///     value: 1
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub name: String,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub executor_options: ExecutorOptions,
    #[serde(default)]
    pub variation: Variation,
    /// Traversal start; the bookkeeping root when omitted.
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub bookkeeping: BookkeepingConfig,
    #[serde(default)]
    pub variables: Vec<VariableConfig>,
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
    #[serde(default)]
    pub cuts: Vec<CutConfig>,
}

impl Config {
    /// The cut each record's traversal starts at.
    pub fn start(&self) -> &str {
        self.start.as_deref().unwrap_or(&self.bookkeeping.name)
    }
}

/// How records are driven through the cutflow.
///
/// # Variants
/// * `Sequential` - one record at a time, in order
/// * `Parallel` - chunks of records on a pool of blocking workers
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Sequential,
    Parallel,
}

/// Executor-specific configuration options.
///
/// # Fields
/// * `max_concurrency` - Maximum number of chunks in flight (parallel only)
/// * `chunk_size` - Records per parallel work unit
/// * `debug_limit` - Stop reading after this many records
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutorOptions {
    pub max_concurrency: Option<usize>,
    pub chunk_size: Option<usize>,
    pub debug_limit: Option<u64>,
}

/// Systematic variation applied to every varied weight field.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Variation {
    #[default]
    Nominal,
    Up,
    Down,
}

impl Variation {
    /// Record field carrying the varied value of `field`.
    pub fn apply(self, field: &str) -> String {
        match self {
            Variation::Nominal => field.to_string(),
            Variation::Up => format!("{}{}", field, UP_SUFFIX),
            Variation::Down => format!("{}{}", field, DOWN_SUFFIX),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookkeepingConfig {
    #[serde(default = "default_bookkeeping_name")]
    pub name: String,
    #[serde(default = "default_base_weight")]
    pub base_weight: f64,
    #[serde(default)]
    pub weight_fields: Vec<String>,
}

impl Default for BookkeepingConfig {
    fn default() -> Self {
        Self {
            name: default_bookkeeping_name(),
            base_weight: default_base_weight(),
            weight_fields: Vec::new(),
        }
    }
}

fn default_bookkeeping_name() -> String {
    BOOKKEEPING_NAME.to_string()
}

fn default_base_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariableConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ValueType,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ValueType,
    /// Defaults to the type's zero value.
    #[serde(default)]
    pub default: Option<Value>,
}

impl ColumnConfig {
    /// The declared default, widened to the column type.
    pub fn default_value(&self) -> Result<Value, ValidationError> {
        match &self.default {
            None => Ok(Value::zero(self.ty)),
            Some(value) => {
                value
                    .clone()
                    .conform(self.ty)
                    .ok_or_else(|| ValidationError::DefaultTypeMismatch {
                        name: self.name.clone(),
                        expected: self.ty,
                    })
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum CutKind {
    Always,
    Threshold,
    Flag,
    Present,
    Save,
}

impl CutKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CutKind::Always => "always",
            CutKind::Threshold => "threshold",
            CutKind::Flag => "flag",
            CutKind::Present => "present",
            CutKind::Save => "save",
        }
    }
}

/// Configuration for one cut of the tree.
///
/// # Fields
/// * `name` - Unique cut name
/// * `parent` - Cut whose successor slot this cut occupies
/// * `branch` - `pass` (default) or `fail` slot of the parent
/// * `kind` - Which predicate to build
/// * `source`, `field`, `op`, `value` - Operands of `threshold`, `flag` and `present`
/// * `weight` - Optional weight contribution
/// * `save` - Field copies performed by a `save` cut
#[derive(Debug, Clone, Deserialize)]
pub struct CutConfig {
    pub name: String,
    pub parent: String,
    #[serde(default)]
    pub branch: Branch,
    pub kind: CutKind,
    #[serde(default)]
    pub source: FieldSource,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub op: Option<CompareOp>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub weight: Option<WeightConfig>,
    #[serde(default)]
    pub save: Vec<SaveConfig>,
}

/// Weight contribution of a cut: a constant, or a record field that follows
/// the configured systematic variation when `varied` is set.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum WeightConfig {
    Constant {
        constant: f64,
    },
    Field {
        field: String,
        #[serde(default)]
        varied: bool,
    },
}

/// One field copy of a `save` cut. Exactly one of `column` and `variable`
/// names the destination.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveConfig {
    pub field: String,
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub variable: Option<String>,
}

/// Load a config from a YAML (or `.toml`) file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let cfg: Config = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&content)?,
        _ => serde_yaml::from_str(&content)?,
    };

    ConfigLoaded {
        path: &path.display().to_string(),
        name: &cfg.name,
        cut_count: cfg.cuts.len(),
    }
    .log();
    Ok(cfg)
}

/// Load and validate a config
///
/// Every validation error is collected and reported together.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_config(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}
