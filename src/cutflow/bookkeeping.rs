// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::StoreError;
use crate::event::EventContext;
use crate::traits::Cut;

/// The root cut: always passes and seeds the cumulative weight.
///
/// Its pass counters are the raw and weighted record totals that every
/// downstream efficiency is measured against.
#[derive(Debug, Clone, PartialEq)]
pub struct Bookkeeping {
    base_weight: f64,
    weight_fields: Vec<String>,
}

impl Default for Bookkeeping {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Bookkeeping {
    pub fn new(base_weight: f64) -> Self {
        Self {
            base_weight,
            weight_fields: Vec::new(),
        }
    }

    /// Multiply the seed by a per-record event field. Records without the
    /// field contribute a neutral 1.0.
    pub fn with_weight_field(mut self, field: impl Into<String>) -> Self {
        self.weight_fields.push(field.into());
        self
    }

    pub fn base_weight(&self) -> f64 {
        self.base_weight
    }

    pub fn weight_fields(&self) -> &[String] {
        &self.weight_fields
    }
}

impl Cut for Bookkeeping {
    fn evaluate(&self, _ctx: &mut EventContext<'_>) -> Result<bool, StoreError> {
        Ok(true)
    }

    fn weight(&self, ctx: &mut EventContext<'_>) -> Result<f64, StoreError> {
        let mut weight = self.base_weight;
        for field in &self.weight_fields {
            weight *= ctx.event.get::<f64>(field)?.unwrap_or(1.0);
        }
        Ok(weight)
    }

    fn kind(&self) -> &'static str {
        "bookkeeping"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::store::Stores;

    #[test]
    fn test_seed_is_product_of_base_and_fields() {
        let bookkeeping = Bookkeeping::new(2.0)
            .with_weight_field("genWeight")
            .with_weight_field("xsec");
        let event = Event::new().with("genWeight", 0.5).with("xsec", 3.0);
        let mut stores = Stores::default();
        let mut ctx = EventContext::new(&event, &mut stores);

        assert!(bookkeeping.evaluate(&mut ctx).unwrap());
        assert_eq!(bookkeeping.weight(&mut ctx).unwrap(), 3.0);
    }

    #[test]
    fn test_absent_weight_field_is_neutral() {
        let bookkeeping = Bookkeeping::new(1.5).with_weight_field("genWeight");
        let event = Event::new();
        let mut stores = Stores::default();
        let mut ctx = EventContext::new(&event, &mut stores);

        assert_eq!(bookkeeping.weight(&mut ctx).unwrap(), 1.5);
    }
}
