use serde::{Deserialize, Serialize};

use crate::error::{PortionError, Result};
use crate::models::nutrients::{Axis, Nutrients};

/// A food's base nutrition record as returned by a lookup.
///
/// Nutrient values are given for `quantity` mass units of the food. The
/// aliases accept the Portuguese column names of the food spreadsheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodRecord {
    #[serde(alias = "identificador")]
    pub code: String,

    #[serde(alias = "alimento", default)]
    pub name: String,

    #[serde(alias = "Quantidade")]
    pub quantity: f64,

    #[serde(alias = "Calorias")]
    pub calories: f64,

    #[serde(alias = "proteins", alias = "Proteínas")]
    pub protein: f64,

    #[serde(alias = "carbs", alias = "Carboidratos")]
    pub carb: f64,

    #[serde(alias = "fats", alias = "Gorduras")]
    pub fat: f64,
}

impl FoodRecord {
    /// Raw nutrient values for the record's base quantity.
    pub fn nutrients(&self) -> Nutrients {
        Nutrients::new(self.calories, self.protein, self.carb, self.fat)
    }

    /// Basic validation: positive finite basis, non-negative finite nutrients.
    pub fn is_valid(&self) -> bool {
        let n = self.nutrients();
        self.quantity.is_finite()
            && self.quantity > 0.0
            && n.is_finite()
            && Axis::ALL.iter().all(|&a| n.get(a) >= 0.0)
    }

    /// Canonical key for lookups (lowercase code).
    pub fn key(&self) -> String {
        self.code.to_lowercase()
    }
}

/// Nutrient values per 100 mass units of a food.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodDensity {
    pub code: String,
    pub per_100: Nutrients,
}

impl FoodDensity {
    pub fn new(code: impl Into<String>, per_100: Nutrients) -> Self {
        Self {
            code: code.into(),
            per_100,
        }
    }

    /// Normalize a base record to per-100 density: raw * 100 / quantity.
    pub fn from_record(record: &FoodRecord) -> Result<Self> {
        if !record.quantity.is_finite() || record.quantity <= 0.0 {
            return Err(PortionError::InvalidFoodRecord {
                code: record.code.clone(),
                reason: format!("base quantity {} is not positive", record.quantity),
            });
        }

        let per_100 = record.nutrients().scaled(100.0 / record.quantity);
        if !per_100.is_finite() {
            return Err(PortionError::InvalidFoodRecord {
                code: record.code.clone(),
                reason: "nutrient values are not finite".to_string(),
            });
        }
        if Axis::ALL.iter().any(|&axis| per_100.get(axis) < 0.0) {
            return Err(PortionError::InvalidFoodRecord {
                code: record.code.clone(),
                reason: "nutrient values must not be negative".to_string(),
            });
        }

        Ok(Self::new(record.code.clone(), per_100))
    }

    #[inline]
    pub fn get(&self, axis: Axis) -> f64 {
        self.per_100.get(axis)
    }

    /// Nutrients contributed by `quantity` units of this food.
    pub fn nutrients_for(&self, quantity: f64) -> Nutrients {
        self.per_100.scaled(quantity / 100.0)
    }
}

/// Quantity bounds for one selected food. `max_qty = None` means unbounded.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodBound {
    pub code: String,
    pub min_qty: f64,
    pub max_qty: Option<f64>,
}

impl FoodBound {
    pub fn new(code: impl Into<String>, min_qty: f64, max_qty: Option<f64>) -> Self {
        Self {
            code: code.into(),
            min_qty,
            max_qty,
        }
    }

    /// Upper bound as a float, `+inf` when unset.
    #[inline]
    pub fn upper(&self) -> f64 {
        self.max_qty.unwrap_or(f64::INFINITY)
    }

    /// Require 0 <= min <= max with a finite min.
    pub fn validate(&self) -> Result<()> {
        if !self.min_qty.is_finite() || self.min_qty < 0.0 {
            return Err(PortionError::validation(format!(
                "minimum quantity for '{}' must be a non-negative number, got {}",
                self.code, self.min_qty
            )));
        }
        if let Some(max) = self.max_qty {
            if max.is_nan() || max < self.min_qty {
                return Err(PortionError::validation(format!(
                    "maximum quantity for '{}' ({}) is below its minimum ({})",
                    self.code, max, self.min_qty
                )));
            }
        }
        Ok(())
    }
}
