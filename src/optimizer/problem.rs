use crate::models::{Axis, FoodBound, FoodDensity, Nutrients};
use crate::optimizer::config::OptimizerConfig;
use crate::optimizer::constants::DENSITY_BASIS;
use crate::optimizer::targets::TargetSpec;

/// A differentiable objective over the quantity vector.
pub trait Objective {
    fn value(&self, q: &[f64]) -> f64;

    /// Write the gradient at `q` into `grad` (same length as `q`).
    fn gradient(&self, q: &[f64], grad: &mut [f64]);
}

/// Linear inequality `coefficients · q + offset >= 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub coefficients: Vec<f64>,
    pub offset: f64,

    /// Human-readable form, used in logs.
    pub label: String,
}

impl LinearConstraint {
    /// Signed slack at `q`; negative means violated.
    #[inline]
    pub fn evaluate(&self, q: &[f64]) -> f64 {
        dot(&self.coefficients, q) + self.offset
    }
}

/// Box bound on one variable. `upper` may be `+inf`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub lower: f64,
    pub upper: f64,
}

impl Bound {
    #[inline]
    pub fn clamp(&self, x: f64) -> f64 {
        x.max(self.lower).min(self.upper)
    }

    #[inline]
    pub fn contains(&self, x: f64) -> bool {
        x >= self.lower && x <= self.upper
    }
}

/// One active axis: aggregate coefficients per food and the point target.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTerm {
    pub axis: Axis,
    pub coefficients: Vec<f64>,
    pub target: f64,
}

impl AxisTerm {
    #[inline]
    fn aggregate(&self, q: &[f64]) -> f64 {
        dot(&self.coefficients, q)
    }
}

/// Sum over active axes of `((aggregate - target) / target)^2`.
///
/// Errors are relative so that calories and grams of fat weigh the same.
#[derive(Debug, Clone, PartialEq)]
pub struct RelativeSquaredError {
    pub terms: Vec<AxisTerm>,
}

impl Objective for RelativeSquaredError {
    fn value(&self, q: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|t| {
                let r = (t.aggregate(q) - t.target) / t.target;
                r * r
            })
            .sum()
    }

    fn gradient(&self, q: &[f64], grad: &mut [f64]) {
        grad.iter_mut().for_each(|g| *g = 0.0);
        for term in &self.terms {
            let scale = 2.0 * (term.aggregate(q) - term.target) / (term.target * term.target);
            for (g, c) in grad.iter_mut().zip(&term.coefficients) {
                *g += scale * c;
            }
        }
    }
}

/// Everything a solver needs for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct PortionProblem {
    pub objective: RelativeSquaredError,
    pub constraints: Vec<LinearConstraint>,
    pub bounds: Vec<Bound>,
    pub initial_guess: Vec<f64>,
}

/// Build objective, band constraints, box bounds and starting point.
///
/// `densities` and `bounds` must be aligned by index.
pub fn build_problem(
    spec: &TargetSpec,
    densities: &[FoodDensity],
    bounds: &[FoodBound],
    config: &OptimizerConfig,
) -> PortionProblem {
    let mut terms = Vec::with_capacity(spec.axes.len());
    let mut constraints = Vec::with_capacity(spec.axes.len() * 2);

    for active in &spec.axes {
        let coefficients: Vec<f64> = densities
            .iter()
            .map(|d| d.get(active.axis) / DENSITY_BASIS)
            .collect();

        // aggregate - band_min >= 0
        constraints.push(LinearConstraint {
            coefficients: coefficients.clone(),
            offset: -active.band.min,
            label: format!("{} >= {:.2}", active.axis, active.band.min),
        });
        // band_max - aggregate >= 0
        constraints.push(LinearConstraint {
            coefficients: coefficients.iter().map(|c| -c).collect(),
            offset: active.band.max,
            label: format!("{} <= {:.2}", active.axis, active.band.max),
        });

        terms.push(AxisTerm {
            axis: active.axis,
            coefficients,
            target: active.target,
        });
    }

    let boxes: Vec<Bound> = bounds
        .iter()
        .map(|b| Bound {
            lower: b.min_qty,
            upper: b.upper(),
        })
        .collect();

    let initial_guess = boxes
        .iter()
        .map(|b| b.clamp(config.initial_quantity))
        .collect();

    PortionProblem {
        objective: RelativeSquaredError { terms },
        constraints,
        bounds: boxes,
        initial_guess,
    }
}

/// Aggregate nutrients for quantity vector `q`.
pub fn aggregates(densities: &[FoodDensity], q: &[f64]) -> Nutrients {
    let mut total = Nutrients::default();
    for (density, &qty) in densities.iter().zip(q) {
        total.accumulate(&density.nutrients_for(qty));
    }
    total
}

#[inline]
pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
