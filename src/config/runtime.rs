// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{HashMap, VecDeque};

use crate::config::{validate_config, Config, CutConfig};
use crate::cutflow::{Bookkeeping, Cutflow};
use crate::cuts::LocalCutFactory;
use crate::engine::ExecutorFactory;
use crate::errors::ConfigError;
use crate::store::{RowStore, Stores, VariableStore};
use crate::traits::CutflowExecutor;

/// Cutflow runtime builder - turns a configuration into a ready-to-run
/// cutflow, its stores and an executor.
///
/// # Examples
///
/// ```
/// use the_cutflow::config::RuntimeBuilder;
///
/// let config = serde_yaml::from_str(r#"
/// name: demo
/// columns: [{ name: pt, type: float, default: -1 }]
/// cuts:
///   - { name: HasPt, parent: Bookkeeping, kind: present, field: pt }
///   - name: SavePt
///     parent: HasPt
///     kind: save
///     save: [{ field: pt, column: pt }]
/// "#).unwrap();
///
/// let (cutflow, stores, executor) = RuntimeBuilder::from_config(&config).unwrap();
///
/// assert_eq!(cutflow.names().collect::<Vec<_>>(), vec!["Bookkeeping", "HasPt", "SavePt"]);
/// assert!(stores.row.is_declared("pt"));
/// assert_eq!(executor.strategy(), "sequential");
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build the complete runtime from configuration.
    ///
    /// Creates and returns:
    /// - `Cutflow`: the tree, rooted at the configured bookkeeping cut
    /// - `Stores`: declared and sealed variable and row stores
    /// - `Box<dyn CutflowExecutor>`: executor configured per strategy
    ///
    /// The configuration is validated first; any fault aborts the build.
    pub fn from_config(
        cfg: &Config,
    ) -> Result<(Cutflow, Stores, Box<dyn CutflowExecutor>), ConfigError> {
        validate_config(cfg).map_err(ConfigError::Invalid)?;

        let stores = Self::build_stores(cfg)?;
        let cutflow = Self::build_cutflow(cfg)?;
        let executor = ExecutorFactory::from_config(cfg);
        Ok((cutflow, stores, executor))
    }

    pub fn build_stores(cfg: &Config) -> Result<Stores, ConfigError> {
        let mut variables = VariableStore::new();
        for variable in &cfg.variables {
            variables.declare_type(variable.name.clone(), variable.ty)?;
        }
        let mut row = RowStore::new();
        for column in &cfg.columns {
            let default = column.default_value().map_err(|e| ConfigError::Invalid(vec![e]))?;
            row.declare_value(column.name.clone(), default)?;
        }

        let mut stores = Stores::new(variables, row);
        stores.seal();
        Ok(stores)
    }

    pub fn build_cutflow(cfg: &Config) -> Result<Cutflow, ConfigError> {
        let bookkeeping = cfg
            .bookkeeping
            .weight_fields
            .iter()
            .fold(Bookkeeping::new(cfg.bookkeeping.base_weight), |root, field| {
                root.with_weight_field(field.clone())
            });

        let mut cutflow = Cutflow::new();
        cutflow.set_root(cfg.bookkeeping.name.clone(), bookkeeping)?;
        for cut in attachment_order(cfg) {
            let built = LocalCutFactory::create_cut(cut, cfg.variation)
                .map_err(|e| ConfigError::Invalid(vec![e]))?;
            cutflow.insert_boxed(&cut.parent, cut.name.clone(), built, cut.branch)?;
        }
        Ok(cutflow)
    }
}

/// Cuts in breadth-first order from the root, so every parent is attached
/// before its children. Cuts not reachable from the root are left out.
pub fn attachment_order(cfg: &Config) -> Vec<&CutConfig> {
    let mut children: HashMap<&str, Vec<&CutConfig>> = HashMap::new();
    for cut in &cfg.cuts {
        children.entry(cut.parent.as_str()).or_default().push(cut);
    }

    let mut order = Vec::with_capacity(cfg.cuts.len());
    let mut queue = VecDeque::from([cfg.bookkeeping.name.as_str()]);
    while let Some(parent) = queue.pop_front() {
        for &cut in children.get(parent).into_iter().flatten() {
            order.push(cut);
            queue.push_back(cut.name.as_str());
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_follow_parents_regardless_of_file_order() {
        let cfg: Config = serde_yaml::from_str(
            r#"
name: order
cuts:
  - { name: C, parent: B, kind: always }
  - { name: B, parent: A, kind: always, branch: fail }
  - { name: A, parent: Bookkeeping, kind: always }
  - { name: D, parent: A, kind: always }
"#,
        )
        .unwrap();

        let order: Vec<&str> = attachment_order(&cfg).iter().map(|c| c.name.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "D", "C"]);

        let cutflow = RuntimeBuilder::build_cutflow(&cfg).unwrap();
        assert_eq!(cutflow.fail_child("A"), Some("B"));
        assert_eq!(cutflow.pass_child("A"), Some("D"));
        assert_eq!(cutflow.parent("C"), Some("B"));
    }

    #[test]
    fn test_invalid_config_is_not_built() {
        let cfg: Config = serde_yaml::from_str(
            r#"
name: invalid
cuts:
  - { name: A, parent: Missing, kind: always }
"#,
        )
        .unwrap();

        assert!(matches!(
            RuntimeBuilder::from_config(&cfg),
            Err(ConfigError::Invalid(errors)) if errors.len() == 1
        ));
    }

    #[test]
    fn test_stores_are_declared_and_sealed() {
        let cfg: Config = serde_yaml::from_str(
            r#"
name: stores
variables: [{ name: ld_pt, type: float }]
columns:
  - { name: lep_pt, type: float, default: -999 }
  - { name: n_jets, type: int }
"#,
        )
        .unwrap();

        let stores = RuntimeBuilder::build_stores(&cfg).unwrap();
        assert!(stores.variables.is_sealed());
        assert!(stores.row.is_sealed());
        assert_eq!(stores.row.get::<f64>("lep_pt").unwrap(), -999.0);
        assert_eq!(stores.row.get::<i64>("n_jets").unwrap(), 0);
        assert_eq!(stores.variables.try_get::<f64>("ld_pt").unwrap(), None);
    }
}
