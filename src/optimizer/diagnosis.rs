use std::fmt;

use serde::Serialize;

use crate::models::{Axis, FoodBound, FoodDensity};
use crate::optimizer::constants::DENSITY_BASIS;
use crate::optimizer::targets::{ActiveAxis, TargetSpec};

/// Generic lead-in for every optimization failure.
pub const NO_SOLUTION_MESSAGE: &str = "No solution found within the requested tolerance";

/// Aggregate range achievable on one axis from per-food bound extremes alone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReachableRange {
    pub min: f64,
    /// `+inf` when some unbounded food contributes to the axis.
    pub max: f64,
}

/// Which way an axis misses its band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InfeasibleSide {
    /// Even the minimum quantities overshoot the band.
    Low,
    /// Even the maximum quantities fall short of the band.
    High,
}

/// An axis that cannot be satisfied regardless of the other axes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisDiagnosis {
    pub axis: Axis,
    pub side: InfeasibleSide,

    /// The reachable extreme that misses the band.
    pub reachable: f64,

    pub band_min: f64,
    pub band_max: f64,
}

impl AxisDiagnosis {
    pub fn explanation(&self) -> String {
        let unit = self.axis.unit();
        match self.side {
            InfeasibleSide::Low => format!(
                "{}: the minimum possible with the given quantity limits ({:.1} {unit}) \
                 exceeds the target range maximum ({:.1}-{:.1} {unit})",
                self.axis, self.reachable, self.band_min, self.band_max
            ),
            InfeasibleSide::High => format!(
                "{}: the maximum reachable with the given quantity limits ({:.1} {unit}) \
                 is below the target range ({:.1}-{:.1} {unit})",
                self.axis, self.reachable, self.band_min, self.band_max
            ),
        }
    }
}

/// Explanation of a failed optimization.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnosis {
    /// Axes that are infeasible on their own. Empty means the failure is joint.
    pub infeasible: Vec<AxisDiagnosis>,

    /// Partial-overlap notes, reported only for joint failures.
    pub hints: Vec<String>,
}

impl Diagnosis {
    pub fn is_joint(&self) -> bool {
        self.infeasible.is_empty()
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{NO_SOLUTION_MESSAGE}. ")?;
        if self.is_joint() {
            write!(
                f,
                "Each target is reachable on its own, but not all at once with the selected \
                 foods; try a wider tolerance or adjust the quantity limits."
            )?;
            for hint in &self.hints {
                write!(f, " {hint}.")?;
            }
            Ok(())
        } else {
            let explanations: Vec<String> =
                self.infeasible.iter().map(|d| d.explanation()).collect();
            write!(f, "{}.", explanations.join("; "))
        }
    }
}

/// Reachable aggregate range for `axis` given aligned densities and bounds.
pub fn reachable_range(axis: Axis, densities: &[FoodDensity], bounds: &[FoodBound]) -> ReachableRange {
    let mut min = 0.0;
    let mut max = 0.0;
    for (density, bound) in densities.iter().zip(bounds) {
        let per_unit = density.get(axis) / DENSITY_BASIS;
        min += bound.min_qty * per_unit;
        // An unbounded food only matters when it actually contributes.
        if per_unit > 0.0 {
            max += bound.upper() * per_unit;
        }
    }
    ReachableRange { min, max }
}

fn diagnose_axis(active: &ActiveAxis, range: ReachableRange) -> Option<AxisDiagnosis> {
    let band = active.band;
    if range.min > band.max {
        Some(AxisDiagnosis {
            axis: active.axis,
            side: InfeasibleSide::Low,
            reachable: range.min,
            band_min: band.min,
            band_max: band.max,
        })
    } else if range.max.is_finite() && range.max < band.min {
        Some(AxisDiagnosis {
            axis: active.axis,
            side: InfeasibleSide::High,
            reachable: range.max,
            band_min: band.min,
            band_max: band.max,
        })
    } else {
        None
    }
}

fn overlap_hints(active: &ActiveAxis, range: ReachableRange) -> Vec<String> {
    let unit = active.axis.unit();
    let mut hints = Vec::new();
    if range.min > active.band.min {
        hints.push(format!(
            "{}: the minimum quantities already give {:.1} {unit}, above the range minimum {:.1} {unit}",
            active.axis, range.min, active.band.min
        ));
    }
    if range.max.is_finite() && range.max < active.band.max {
        hints.push(format!(
            "{}: at most {:.1} {unit} is reachable, below the range maximum {:.1} {unit}",
            active.axis, range.max, active.band.max
        ));
    }
    hints
}

/// Explain why no quantity vector satisfies every band.
///
/// Only per-axis infeasibility is detected; when every axis is reachable on
/// its own the failure is reported as joint.
pub fn diagnose(spec: &TargetSpec, densities: &[FoodDensity], bounds: &[FoodBound]) -> Diagnosis {
    let mut infeasible = Vec::new();
    let mut hints = Vec::new();

    for active in &spec.axes {
        let range = reachable_range(active.axis, densities, bounds);
        match diagnose_axis(active, range) {
            Some(d) => infeasible.push(d),
            None => hints.extend(overlap_hints(active, range)),
        }
    }

    if !infeasible.is_empty() {
        hints.clear();
    }

    Diagnosis { infeasible, hints }
}
