// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-record scratch space shared between cuts.
//!
//! A cut that selects objects typically stores its result here (for example
//! the four-vector of the chosen lepton) so that later cuts in the same
//! traversal can build on it. Slots are declared once with a type; their
//! values are wiped at the start of every record.

use std::collections::HashMap;

use crate::errors::StoreError;
use crate::store::{TypedValue, Value, ValueType};

#[derive(Debug, Clone)]
struct Slot {
    ty: ValueType,
    value: Option<Value>,
}

/// Named, typed intermediate values for the record currently being processed.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    slots: HashMap<String, Slot>,
    sealed: bool,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a slot holding values of `T`.
    pub fn declare<T: TypedValue>(&mut self, name: impl Into<String>) -> Result<(), StoreError> {
        self.declare_type(name, T::TYPE)
    }

    /// Declare a slot by runtime type token (used by config-driven setup).
    pub fn declare_type(&mut self, name: impl Into<String>, ty: ValueType) -> Result<(), StoreError> {
        let name = name.into();
        if self.sealed {
            return Err(StoreError::Sealed { name });
        }
        if self.slots.contains_key(&name) {
            return Err(StoreError::AlreadyDeclared { name });
        }
        self.slots.insert(name, Slot { ty, value: None });
        Ok(())
    }

    /// Ends the construction phase. Later declarations fail with `Sealed`.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Returns every slot to the unset state.
    pub fn reset(&mut self) {
        for slot in self.slots.values_mut() {
            slot.value = None;
        }
    }

    pub fn set<T: TypedValue>(&mut self, name: &str, value: T) -> Result<(), StoreError> {
        let slot = self.slot_mut(name, T::TYPE)?;
        slot.value = Some(value.into_value());
        Ok(())
    }

    /// Reads a slot. Reading a slot nothing has written this record is an error.
    pub fn get<T: TypedValue>(&self, name: &str) -> Result<T, StoreError> {
        self.try_get(name)?.ok_or_else(|| StoreError::Unset {
            name: name.to_string(),
        })
    }

    /// Reads a slot that may legitimately still be unset.
    pub fn try_get<T: TypedValue>(&self, name: &str) -> Result<Option<T>, StoreError> {
        let slot = self.slot(name, T::TYPE)?;
        Ok(slot.value.as_ref().and_then(T::from_value))
    }

    /// Untyped read used by config-driven cuts; still enforces declaration.
    pub fn get_value(&self, name: &str) -> Result<Option<&Value>, StoreError> {
        self.slots
            .get(name)
            .map(|slot| slot.value.as_ref())
            .ok_or_else(|| StoreError::Undeclared {
                name: name.to_string(),
            })
    }

    /// Untyped write; the value must match the declared type.
    pub fn set_value(&mut self, name: &str, value: Value) -> Result<(), StoreError> {
        let slot = self.slot_mut(name, value.value_type())?;
        slot.value = Some(value);
        Ok(())
    }

    pub fn declared_type(&self, name: &str) -> Option<ValueType> {
        self.slots.get(name).map(|slot| slot.ty)
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn slot(&self, name: &str, requested: ValueType) -> Result<&Slot, StoreError> {
        let slot = self.slots.get(name).ok_or_else(|| StoreError::Undeclared {
            name: name.to_string(),
        })?;
        if slot.ty != requested {
            return Err(StoreError::TypeMismatch {
                name: name.to_string(),
                declared: slot.ty,
                requested,
            });
        }
        Ok(slot)
    }

    fn slot_mut(&mut self, name: &str, requested: ValueType) -> Result<&mut Slot, StoreError> {
        let slot = self
            .slots
            .get_mut(name)
            .ok_or_else(|| StoreError::Undeclared {
                name: name.to_string(),
            })?;
        if slot.ty != requested {
            return Err(StoreError::TypeMismatch {
                name: name.to_string(),
                declared: slot.ty,
                requested,
            });
        }
        Ok(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> VariableStore {
        let mut vars = VariableStore::new();
        vars.declare::<f64>("lep_pt").unwrap();
        vars.declare::<Vec<f64>>("jet_pts").unwrap();
        vars.seal();
        vars
    }

    #[test]
    fn test_set_then_get() {
        let mut vars = store();
        vars.set("lep_pt", 42.5).unwrap();
        assert_eq!(vars.get::<f64>("lep_pt").unwrap(), 42.5);
    }

    #[test]
    fn test_reset_clears_every_slot() {
        let mut vars = store();
        vars.set("lep_pt", 42.5).unwrap();
        vars.set("jet_pts", vec![30.0, 25.0]).unwrap();
        vars.reset();
        assert_eq!(vars.try_get::<f64>("lep_pt").unwrap(), None);
        assert_eq!(vars.try_get::<Vec<f64>>("jet_pts").unwrap(), None);
    }

    #[test]
    fn test_unset_read_is_an_error() {
        let vars = store();
        assert_eq!(
            vars.get::<f64>("lep_pt"),
            Err(StoreError::Unset {
                name: "lep_pt".to_string()
            })
        );
    }

    #[test]
    fn test_undeclared_name() {
        let mut vars = store();
        assert!(matches!(
            vars.get::<f64>("nope"),
            Err(StoreError::Undeclared { .. })
        ));
        assert!(matches!(
            vars.set("nope", 1.0),
            Err(StoreError::Undeclared { .. })
        ));
    }

    #[test]
    fn test_type_mismatch_on_read_and_write() {
        let mut vars = store();
        assert_eq!(
            vars.set("lep_pt", 3_i64),
            Err(StoreError::TypeMismatch {
                name: "lep_pt".to_string(),
                declared: ValueType::Float,
                requested: ValueType::Int,
            })
        );
        vars.set("lep_pt", 3.0).unwrap();
        assert!(matches!(
            vars.get::<bool>("lep_pt"),
            Err(StoreError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_declarations_closed_after_seal() {
        let mut vars = store();
        assert!(matches!(
            vars.declare::<i64>("late"),
            Err(StoreError::Sealed { .. })
        ));
    }

    #[test]
    fn test_duplicate_declaration() {
        let mut vars = VariableStore::new();
        vars.declare::<f64>("x").unwrap();
        assert!(matches!(
            vars.declare::<i64>("x"),
            Err(StoreError::AlreadyDeclared { .. })
        ));
    }
}
