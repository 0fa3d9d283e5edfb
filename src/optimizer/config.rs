use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PortionError, Result};
use crate::optimizer::constants::*;

/// Limits and tolerances for [`AugmentedLagrangianSolver`](crate::optimizer::AugmentedLagrangianSolver).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub max_outer_iters: usize,
    pub max_inner_iters: usize,
    pub feasibility_tol: f64,
    pub optimality_tol: f64,
    pub initial_penalty: f64,
    pub penalty_growth: f64,
    pub max_penalty: f64,

    /// Wall-clock budget for one solve. Running out counts as a failed solve.
    pub time_budget_ms: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_outer_iters: MAX_OUTER_ITERS,
            max_inner_iters: MAX_INNER_ITERS,
            feasibility_tol: FEASIBILITY_TOL,
            optimality_tol: OPTIMALITY_TOL,
            initial_penalty: INITIAL_PENALTY,
            penalty_growth: PENALTY_GROWTH,
            max_penalty: MAX_PENALTY,
            time_budget_ms: None,
        }
    }
}

impl SolverConfig {
    /// Validates iteration limits and tolerances.
    ///
    /// # Errors
    ///
    /// Returns a description of the first offending field.
    pub fn validate(&self) -> std::result::Result<(), &'static str> {
        if self.max_outer_iters == 0 || self.max_inner_iters == 0 {
            return Err("iteration limits must be positive");
        }
        if !self.feasibility_tol.is_finite() || self.feasibility_tol <= 0.0 {
            return Err("feasibility_tol must be finite and positive");
        }
        if !self.optimality_tol.is_finite() || self.optimality_tol <= 0.0 {
            return Err("optimality_tol must be finite and positive");
        }
        if !self.initial_penalty.is_finite() || self.initial_penalty <= 0.0 {
            return Err("initial_penalty must be finite and positive");
        }
        if !self.penalty_growth.is_finite() || self.penalty_growth <= 1.0 {
            return Err("penalty_growth must be finite and greater than 1");
        }
        if !self.max_penalty.is_finite() || self.max_penalty < self.initial_penalty {
            return Err("max_penalty must be finite and at least initial_penalty");
        }
        Ok(())
    }

    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_ms.map(Duration::from_millis)
    }
}

/// Explicit parameters for building and solving a portion problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Tolerance used when a request omits one.
    pub default_tolerance: f64,

    /// Minimum quantity for foods without an explicit `min`.
    pub default_min_qty: f64,

    /// Maximum quantity for foods without an explicit `max`; `None` = unbounded.
    pub default_max_qty: Option<f64>,

    /// Uniform starting quantity for every food.
    pub initial_quantity: f64,

    /// Relative slack when re-checking a solution against the bands.
    pub verification_slack: f64,

    pub solver: SolverConfig,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            default_tolerance: DEFAULT_TOLERANCE,
            default_min_qty: DEFAULT_MIN_QTY,
            default_max_qty: None,
            initial_quantity: DEFAULT_INITIAL_QUANTITY,
            verification_slack: VERIFICATION_SLACK,
            solver: SolverConfig::default(),
        }
    }
}

impl OptimizerConfig {
    /// Load a configuration from a JSON file. Missing fields keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: OptimizerConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| PortionError::validation(format!("invalid config: {reason}"));

        if !self.default_tolerance.is_finite()
            || self.default_tolerance <= 0.0
            || self.default_tolerance > 1.0
        {
            return Err(invalid("default_tolerance must be in (0, 1]"));
        }
        if !self.default_min_qty.is_finite() || self.default_min_qty < 0.0 {
            return Err(invalid("default_min_qty must be finite and non-negative"));
        }
        if let Some(max) = self.default_max_qty {
            if max.is_nan() || max < self.default_min_qty {
                return Err(invalid("default_max_qty must be at least default_min_qty"));
            }
        }
        if !self.initial_quantity.is_finite() || self.initial_quantity < 0.0 {
            return Err(invalid("initial_quantity must be finite and non-negative"));
        }
        if !self.verification_slack.is_finite() || self.verification_slack < 0.0 {
            return Err(invalid("verification_slack must be finite and non-negative"));
        }
        self.solver.validate().map_err(invalid)
    }
}
