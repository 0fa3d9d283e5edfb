use serde::Serialize;

use crate::models::nutrients::Nutrients;

/// One row of a computed portion plan.
///
/// Values are unrounded; rounding is left to rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Portion {
    /// Code of the food this row belongs to.
    pub code: String,

    /// Chosen quantity in mass units.
    pub quantity: f64,

    pub calories: f64,
    pub protein: f64,
    pub carb: f64,
    pub fat: f64,
}

impl Portion {
    pub fn new(code: String, quantity: f64, nutrients: Nutrients) -> Self {
        Self {
            code,
            quantity,
            calories: nutrients.calories,
            protein: nutrients.protein,
            carb: nutrients.carb,
            fat: nutrients.fat,
        }
    }

    pub fn nutrients(&self) -> Nutrients {
        Nutrients::new(self.calories, self.protein, self.carb, self.fat)
    }
}

/// Sum the nutrients of all portions.
pub fn portion_totals(portions: &[Portion]) -> Nutrients {
    let mut totals = Nutrients::default();
    for portion in portions {
        totals.accumulate(&portion.nutrients());
    }
    totals
}
