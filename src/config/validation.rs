// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration validation for cutflow trees.
//!
//! Configuration faults are fatal and must be found before the first record
//! is read. Validation runs in stages and accumulates every error it can find
//! so a broken config is fixed in one pass:
//!
//! 1. **Uniqueness**: cut names (including the bookkeeping root), columns and
//!    variables are each unique, and every cut name can be written to a report
//! 2. **References**: every parent exists, the traversal start exists, and
//!    every store name a cut touches is declared (and numeric where a
//!    threshold compares it)
//! 3. **Slots**: no two cuts claim the same pass/fail slot of one parent
//! 4. **Reachability**: every cut's lineage leads back to the root. Skipped
//!    when stage 2 found unresolved parents, since lineages are then broken
//!    anyway.
//!
//! Cut kinds are also checked for the operands they need (a `threshold` cut
//! without `op`, for example).
//!
//! # Example
//!
//! ```rust
//! use the_cutflow::config::validate_config;
//! use the_cutflow::errors::ValidationError;
//!
//! let config = serde_yaml::from_str(r#"
//! name: demo
//! cuts:
//!   - { name: A, parent: Bookkeeping, kind: always }
//!   - { name: B, parent: A, kind: always }
//!   - { name: C, parent: A, kind: always }
//! "#).unwrap();
//!
//! let errors = validate_config(&config).unwrap_err();
//! assert!(matches!(&errors[0], ValidationError::SlotConflict { parent, .. } if parent == "A"));
//! ```

use std::collections::{HashMap, HashSet};

use crate::config::{Config, CutConfig, CutKind};
use crate::cutflow::{unreportable_name, Branch};
use crate::cuts::FieldSource;
use crate::errors::ValidationError;
use crate::observability::messages::validation::{
    ConfigurationFault, ValidationCompleted, ValidationFailed, ValidationStarted,
};
use crate::observability::messages::StructuredLog;
use crate::store::ValueType;

/// Validates a configuration before any cutflow is built from it.
///
/// # Returns
///
/// * `Ok(())` - the tree can be built and every store access is declared
/// * `Err(Vec<ValidationError>)` - every fault found
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    ValidationStarted {
        cut_count: config.cuts.len(),
    }
    .log();

    let mut errors = Vec::new();
    errors.extend(unique_cut_names(config));
    errors.extend(invalid_cut_names(config));
    errors.extend(unique_store_names(config));

    let unresolved = unresolved_parents(config);
    let lineage_is_sound = unresolved.is_empty();
    errors.extend(unresolved);
    errors.extend(unresolved_start(config));
    errors.extend(slot_conflicts(config));
    errors.extend(cut_operands(config));
    errors.extend(undeclared_references(config));

    if lineage_is_sound {
        errors.extend(unreachable_cuts(config));
    }

    if errors.is_empty() {
        ValidationCompleted {
            cut_count: config.cuts.len(),
        }
        .log();
        Ok(())
    } else {
        for error in &errors {
            ConfigurationFault { error }.log();
        }
        ValidationFailed {
            error_count: errors.len(),
        }
        .log();
        Err(errors)
    }
}

fn unique_cut_names(config: &Config) -> Vec<ValidationError> {
    let mut seen = HashSet::new();
    seen.insert(config.bookkeeping.name.as_str());
    config
        .cuts
        .iter()
        .filter(|cut| !seen.insert(cut.name.as_str()))
        .map(|cut| ValidationError::DuplicateCutName {
            name: cut.name.clone(),
        })
        .collect()
}

fn invalid_cut_names(config: &Config) -> Vec<ValidationError> {
    std::iter::once(config.bookkeeping.name.as_str())
        .chain(config.cuts.iter().map(|cut| cut.name.as_str()))
        .filter_map(|name| {
            unreportable_name(name).map(|reason| ValidationError::InvalidCutName {
                name: name.to_string(),
                reason,
            })
        })
        .collect()
}

fn unique_store_names(config: &Config) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut columns = HashSet::new();
    for column in &config.columns {
        if !columns.insert(column.name.as_str()) {
            errors.push(ValidationError::DuplicateColumn {
                name: column.name.clone(),
            });
        }
        if let Err(error) = column.default_value() {
            errors.push(error);
        }
    }

    let mut variables = HashSet::new();
    for variable in &config.variables {
        if !variables.insert(variable.name.as_str()) {
            errors.push(ValidationError::DuplicateVariable {
                name: variable.name.clone(),
            });
        }
    }
    errors
}

fn known_cut_names(config: &Config) -> HashSet<&str> {
    config
        .cuts
        .iter()
        .map(|cut| cut.name.as_str())
        .chain(std::iter::once(config.bookkeeping.name.as_str()))
        .collect()
}

fn unresolved_parents(config: &Config) -> Vec<ValidationError> {
    let known = known_cut_names(config);
    config
        .cuts
        .iter()
        .filter(|cut| !known.contains(cut.parent.as_str()))
        .map(|cut| ValidationError::UnresolvedParent {
            cut: cut.name.clone(),
            parent: cut.parent.clone(),
        })
        .collect()
}

fn unresolved_start(config: &Config) -> Option<ValidationError> {
    let start = config.start();
    if known_cut_names(config).contains(start) {
        None
    } else {
        Some(ValidationError::UnresolvedStart {
            start: start.to_string(),
        })
    }
}

fn slot_conflicts(config: &Config) -> Vec<ValidationError> {
    let mut slots: HashMap<(&str, Branch), &str> = HashMap::new();
    let mut errors = Vec::new();
    for cut in &config.cuts {
        match slots.get(&(cut.parent.as_str(), cut.branch)) {
            Some(first) => errors.push(ValidationError::SlotConflict {
                parent: cut.parent.clone(),
                branch: cut.branch,
                first: first.to_string(),
                second: cut.name.clone(),
            }),
            None => {
                slots.insert((cut.parent.as_str(), cut.branch), cut.name.as_str());
            }
        }
    }
    errors
}

fn cut_operands(config: &Config) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for cut in &config.cuts {
        let kind = cut.kind.as_str();
        let mut missing = |field: &'static str| {
            errors.push(ValidationError::MissingCutField {
                cut: cut.name.clone(),
                kind,
                field,
            })
        };
        match cut.kind {
            CutKind::Always => {}
            CutKind::Threshold => {
                if cut.field.is_none() {
                    missing("field");
                }
                if cut.op.is_none() {
                    missing("op");
                }
                if cut.value.is_none() {
                    missing("value");
                }
            }
            CutKind::Flag | CutKind::Present => {
                if cut.field.is_none() {
                    missing("field");
                }
            }
            CutKind::Save => {
                if cut.save.is_empty() {
                    missing("save");
                }
                for copy in &cut.save {
                    if copy.column.is_some() == copy.variable.is_some() {
                        missing("column");
                    }
                }
            }
        }
    }
    errors
}

fn undeclared_references(config: &Config) -> Vec<ValidationError> {
    let columns: HashMap<&str, ValueType> =
        config.columns.iter().map(|c| (c.name.as_str(), c.ty)).collect();
    let variables: HashMap<&str, ValueType> =
        config.variables.iter().map(|v| (v.name.as_str(), v.ty)).collect();
    let mut errors = Vec::new();

    let mut check = |cut: &CutConfig, store: &'static str, name: &str, numeric: bool| {
        let declared = match store {
            "column" => columns.get(name),
            _ => variables.get(name),
        };
        match declared {
            None => errors.push(ValidationError::UndeclaredReference {
                cut: cut.name.clone(),
                store,
                name: name.to_string(),
            }),
            Some(&ty) if numeric && !ty.is_numeric() => {
                errors.push(ValidationError::NonNumericReference {
                    cut: cut.name.clone(),
                    store,
                    name: name.to_string(),
                    found: ty,
                })
            }
            Some(_) => {}
        }
    };

    for cut in &config.cuts {
        if cut.kind == CutKind::Threshold {
            if let Some(field) = &cut.field {
                match cut.source {
                    FieldSource::Event => {}
                    FieldSource::Variable => check(cut, "variable", field, true),
                    FieldSource::Row => check(cut, "column", field, true),
                }
            }
        }
        for copy in &cut.save {
            if let Some(column) = &copy.column {
                check(cut, "column", column, false);
            }
            if let Some(variable) = &copy.variable {
                check(cut, "variable", variable, false);
            }
        }
    }
    errors
}

/// Walks each cut's parent chain. A chain that revisits a cut never reaches
/// the root and is reported with the lineage walked so far.
fn unreachable_cuts(config: &Config) -> Vec<ValidationError> {
    let parents: HashMap<&str, &str> = config
        .cuts
        .iter()
        .map(|cut| (cut.name.as_str(), cut.parent.as_str()))
        .collect();
    let root = config.bookkeeping.name.as_str();

    let mut errors = Vec::new();
    for cut in &config.cuts {
        let mut lineage = vec![cut.name.as_str()];
        let mut seen = HashSet::from([cut.name.as_str()]);
        let mut cursor = cut.name.as_str();
        while let Some(&parent) = parents.get(cursor) {
            if parent == root {
                break;
            }
            lineage.push(parent);
            if !seen.insert(parent) {
                errors.push(ValidationError::UnreachableCut {
                    cut: cut.name.clone(),
                    lineage: lineage.iter().map(|s| s.to_string()).collect(),
                });
                break;
            }
            cursor = parent;
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(yaml: &str) -> Config {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_valid_config() {
        let cfg = config(
            r#"
name: ok
variables: [{ name: ld_pt, type: float }]
columns: [{ name: lep_pt, type: float, default: -999 }]
cuts:
  - name: Save
    parent: Bookkeeping
    kind: save
    save:
      - { field: lep_pt, column: lep_pt }
      - { field: lep_pt, variable: ld_pt }
  - name: PtCut
    parent: Save
    kind: threshold
    source: variable
    field: ld_pt
    op: ">"
    value: 40
  - name: Low
    parent: PtCut
    branch: fail
    kind: always
"#,
        );
        assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn test_duplicate_names() {
        let cfg = config(
            r#"
name: dupes
columns:
  - { name: a, type: int }
  - { name: a, type: int }
variables:
  - { name: v, type: bool }
  - { name: v, type: bool }
cuts:
  - { name: Bookkeeping, parent: Bookkeeping, kind: always, branch: fail }
  - { name: A, parent: Bookkeeping, kind: always }
  - { name: A, parent: Bookkeeping, kind: always, branch: fail }
"#,
        );
        let errors = validate_config(&cfg).unwrap_err();
        assert!(errors.contains(&ValidationError::DuplicateCutName {
            name: "Bookkeeping".into()
        }));
        assert!(errors.contains(&ValidationError::DuplicateCutName { name: "A".into() }));
        assert!(errors.contains(&ValidationError::DuplicateColumn { name: "a".into() }));
        assert!(errors.contains(&ValidationError::DuplicateVariable { name: "v".into() }));
    }

    #[test]
    fn test_unresolved_parent_and_start() {
        let cfg = config(
            r#"
name: refs
start: Nope
cuts:
  - { name: A, parent: Ghost, kind: always }
"#,
        );
        let errors = validate_config(&cfg).unwrap_err();
        assert!(errors.contains(&ValidationError::UnresolvedParent {
            cut: "A".into(),
            parent: "Ghost".into()
        }));
        assert!(errors.contains(&ValidationError::UnresolvedStart {
            start: "Nope".into()
        }));
    }

    #[test]
    fn test_slot_conflict() {
        let cfg = config(
            r#"
name: slots
cuts:
  - { name: A, parent: Bookkeeping, kind: always }
  - { name: B, parent: A, kind: always, branch: fail }
  - { name: C, parent: A, kind: always, branch: fail }
"#,
        );
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::SlotConflict {
                parent: "A".into(),
                branch: Branch::Fail,
                first: "B".into(),
                second: "C".into(),
            }]
        );
    }

    #[test]
    fn test_cyclic_lineage_is_unreachable() {
        let cfg = config(
            r#"
name: cycle
cuts:
  - { name: A, parent: Bookkeeping, kind: always }
  - { name: B, parent: C, kind: always }
  - { name: C, parent: B, kind: always }
"#,
        );
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(&ValidationError::UnreachableCut {
            cut: "B".into(),
            lineage: vec!["B".into(), "C".into(), "B".into()],
        }));
    }

    #[test]
    fn test_missing_operands_and_undeclared_references() {
        let cfg = config(
            r#"
name: operands
cuts:
  - { name: A, parent: Bookkeeping, kind: flag }
  - name: B
    parent: A
    kind: threshold
    source: row
    field: lep_pt
    op: "<"
    value: 5
  - { name: C, parent: B, kind: save }
  - name: D
    parent: C
    kind: save
    save: [{ field: x, variable: undeclared }]
"#,
        );
        let errors = validate_config(&cfg).unwrap_err();
        assert!(errors.contains(&ValidationError::MissingCutField {
            cut: "A".into(),
            kind: "flag",
            field: "field"
        }));
        assert!(errors.contains(&ValidationError::MissingCutField {
            cut: "C".into(),
            kind: "save",
            field: "save"
        }));
        assert!(errors.contains(&ValidationError::UndeclaredReference {
            cut: "B".into(),
            store: "column",
            name: "lep_pt".into()
        }));
        assert!(errors.contains(&ValidationError::UndeclaredReference {
            cut: "D".into(),
            store: "variable",
            name: "undeclared".into()
        }));
    }

    #[test]
    fn test_names_that_break_reports() {
        let cfg = config(
            r#"
name: names
bookkeeping: { name: "null" }
start: "null"
cuts:
  - { name: "Lep,Pt", parent: "null", kind: always }
  - { name: LepPt, parent: "Lep,Pt", kind: always }
"#,
        );
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidCutName { name, .. } if name == "null")));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidCutName { name, .. } if name == "Lep,Pt")));
    }

    #[test]
    fn test_threshold_on_non_numeric_slot() {
        let cfg = config(
            r#"
name: types
variables: [{ name: jet_pts, type: float_list }]
columns: [{ name: sample, type: text }, { name: n_jets, type: int }]
cuts:
  - { name: A, parent: Bookkeeping, kind: threshold, source: variable, field: jet_pts, op: ">", value: 1 }
  - { name: B, parent: A, kind: threshold, source: row, field: sample, op: "==", value: 0 }
  - { name: C, parent: B, kind: threshold, source: row, field: n_jets, op: ">=", value: 2 }
"#,
        );
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::NonNumericReference {
                    cut: "A".into(),
                    store: "variable",
                    name: "jet_pts".into(),
                    found: ValueType::FloatList,
                },
                ValidationError::NonNumericReference {
                    cut: "B".into(),
                    store: "column",
                    name: "sample".into(),
                    found: ValueType::Text,
                },
            ]
        );
    }
}
