// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::{CutConfig, CutKind, SaveConfig, Variation, WeightConfig};
use crate::errors::ValidationError;
use crate::traits::Cut;

use super::library::*;

/// Factory for building config-driven cuts
pub struct LocalCutFactory;

impl LocalCutFactory {
    /// Create a cut from its configuration
    ///
    /// The `kind` field selects the predicate:
    /// - "always" -> AlwaysCut
    /// - "threshold" -> ThresholdCut (requires `field`, `op`, `value`)
    /// - "flag" -> FlagCut (requires `field`)
    /// - "present" -> PresentCut (requires `field`)
    /// - "save" -> SaveCut (requires a non-empty `save` list)
    ///
    /// Varied weight fields are resolved against `variation` here, so the
    /// running cut only ever reads one field name.
    pub fn create_cut(config: &CutConfig, variation: Variation) -> Result<Box<dyn Cut>, ValidationError> {
        let weight = Self::weight_source(config.weight.as_ref(), variation);
        let missing = |field: &'static str| ValidationError::MissingCutField {
            cut: config.name.clone(),
            kind: config.kind.as_str(),
            field,
        };
        let field = || config.field.clone().ok_or_else(|| missing("field"));

        match config.kind {
            CutKind::Always => Ok(Box::new(AlwaysCut::new(weight))),
            CutKind::Threshold => {
                let op = config.op.ok_or_else(|| missing("op"))?;
                let value = config.value.ok_or_else(|| missing("value"))?;
                Ok(Box::new(
                    ThresholdCut::new(config.source, field()?, op, value).with_weight(weight),
                ))
            }
            CutKind::Flag => Ok(Box::new(FlagCut::new(field()?, weight))),
            CutKind::Present => Ok(Box::new(PresentCut::new(field()?, weight))),
            CutKind::Save => {
                if config.save.is_empty() {
                    return Err(missing("save"));
                }
                config
                    .save
                    .iter()
                    .try_fold(SaveCut::new(weight), |cut, copy| {
                        let target = Self::save_target(copy).ok_or_else(|| missing("column"))?;
                        Ok(cut.copy(copy.field.clone(), target))
                    })
                    .map(|cut| Box::new(cut) as Box<dyn Cut>)
            }
        }
    }

    pub fn weight_source(config: Option<&WeightConfig>, variation: Variation) -> WeightSource {
        match config {
            None => WeightSource::Unit,
            Some(WeightConfig::Constant { constant }) => WeightSource::Constant(*constant),
            Some(WeightConfig::Field { field, varied: true }) => {
                WeightSource::Field(variation.apply(field))
            }
            Some(WeightConfig::Field { field, varied: false }) => WeightSource::Field(field.clone()),
        }
    }

    fn save_target(copy: &SaveConfig) -> Option<SaveTarget> {
        match (&copy.column, &copy.variable) {
            (Some(column), None) => Some(SaveTarget::Column(column.clone())),
            (None, Some(variable)) => Some(SaveTarget::Variable(variable.clone())),
            _ => None,
        }
    }

    /// List all available cut kinds
    pub fn list_available_kinds() -> Vec<&'static str> {
        vec!["always", "threshold", "flag", "present", "save"]
    }

    /// Check if a cut kind is available
    pub fn is_kind_available(kind: &str) -> bool {
        Self::list_available_kinds().contains(&kind)
    }
}
