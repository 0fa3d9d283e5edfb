use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the four tracked nutrient quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Calories,
    Protein,
    Carb,
    Fat,
}

impl Axis {
    /// All axes in canonical order.
    pub const ALL: [Axis; 4] = [Axis::Calories, Axis::Protein, Axis::Carb, Axis::Fat];

    pub fn name(self) -> &'static str {
        match self {
            Axis::Calories => "calories",
            Axis::Protein => "protein",
            Axis::Carb => "carb",
            Axis::Fat => "fat",
        }
    }

    /// Display unit for aggregate values on this axis.
    pub fn unit(self) -> &'static str {
        match self {
            Axis::Calories => "kcal",
            _ => "g",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value per nutrient axis.
///
/// Used for raw targets, per-100 densities and aggregated totals. Missing
/// fields deserialize as 0, which makes the axis inactive when used as a target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Nutrients {
    pub calories: f64,

    #[serde(alias = "proteins")]
    pub protein: f64,

    #[serde(alias = "carbs")]
    pub carb: f64,

    #[serde(alias = "fats")]
    pub fat: f64,
}

/// Raw target values; an axis with a target <= 0 is inactive.
pub type Targets = Nutrients;

impl Nutrients {
    pub fn new(calories: f64, protein: f64, carb: f64, fat: f64) -> Self {
        Self {
            calories,
            protein,
            carb,
            fat,
        }
    }

    #[inline]
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Calories => self.calories,
            Axis::Protein => self.protein,
            Axis::Carb => self.carb,
            Axis::Fat => self.fat,
        }
    }

    #[inline]
    pub fn get_mut(&mut self, axis: Axis) -> &mut f64 {
        match axis {
            Axis::Calories => &mut self.calories,
            Axis::Protein => &mut self.protein,
            Axis::Carb => &mut self.carb,
            Axis::Fat => &mut self.fat,
        }
    }

    /// Every axis multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            calories: self.calories * factor,
            protein: self.protein * factor,
            carb: self.carb * factor,
            fat: self.fat * factor,
        }
    }

    /// Add `other` axis-by-axis into `self`.
    pub fn accumulate(&mut self, other: &Nutrients) {
        for axis in Axis::ALL {
            *self.get_mut(axis) += other.get(axis);
        }
    }

    pub fn is_finite(&self) -> bool {
        Axis::ALL.iter().all(|&a| self.get(a).is_finite())
    }
}
