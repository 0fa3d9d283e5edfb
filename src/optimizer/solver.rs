use std::collections::VecDeque;
use std::time::Instant;

use tracing::{debug, trace};

use crate::optimizer::config::SolverConfig;
use crate::optimizer::constants::*;
use crate::optimizer::problem::{dot, Bound, LinearConstraint, Objective};

/// Result of one solver run.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    /// Whether `solution` satisfies every constraint within the solver's tolerance.
    pub success: bool,

    /// Final iterate. Always within the box bounds.
    pub solution: Vec<f64>,

    /// Total inner iterations spent.
    pub iterations: usize,

    /// Multiplier/penalty updates performed.
    pub outer_iterations: usize,

    /// Largest scaled constraint violation at `solution`.
    pub max_violation: f64,

    pub message: String,
}

/// A nonlinear solver for box-bounded problems with linear inequality
/// constraints (`constraint.evaluate(q) >= 0`).
///
/// Implementations must be deterministic: identical inputs give the same verdict.
pub trait Solver {
    fn solve<O: Objective>(
        &self,
        objective: &O,
        constraints: &[LinearConstraint],
        bounds: &[Bound],
        initial_guess: &[f64],
    ) -> SolveOutcome;
}

/// Augmented Lagrangian method with a spectral projected-gradient inner loop.
///
/// Inequalities are handled through PHR multipliers and a growing quadratic
/// penalty; bounds are enforced exactly by projection. Constraints are scaled
/// by the magnitude of their offset so that violations are relative to the
/// band edge.
#[derive(Debug, Clone, Default)]
pub struct AugmentedLagrangianSolver {
    config: SolverConfig,
}

impl AugmentedLagrangianSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }
}

/// Constraint rescaled to unit-ish magnitude.
struct ScaledConstraint {
    coefficients: Vec<f64>,
    offset: f64,
}

impl ScaledConstraint {
    fn from_constraint(c: &LinearConstraint) -> Self {
        let scale = 1.0 / c.offset.abs().max(1.0);
        Self {
            coefficients: c.coefficients.iter().map(|a| a * scale).collect(),
            offset: c.offset * scale,
        }
    }

    #[inline]
    fn evaluate(&self, x: &[f64]) -> f64 {
        dot(&self.coefficients, x) + self.offset
    }
}

/// `f(x) + 1/(2ρ) Σ [max(0, λ - ρ g(x))² - λ²]`
struct AugmentedLagrangian<'a, O> {
    objective: &'a O,
    constraints: &'a [ScaledConstraint],
    multipliers: &'a [f64],
    penalty: f64,
}

impl<O: Objective> AugmentedLagrangian<'_, O> {
    fn value(&self, x: &[f64]) -> f64 {
        let penalty_term: f64 = self
            .constraints
            .iter()
            .zip(self.multipliers)
            .map(|(c, &lambda)| {
                let shifted = (lambda - self.penalty * c.evaluate(x)).max(0.0);
                shifted * shifted - lambda * lambda
            })
            .sum();
        self.objective.value(x) + penalty_term / (2.0 * self.penalty)
    }

    fn gradient(&self, x: &[f64], grad: &mut [f64]) {
        self.objective.gradient(x, grad);
        for (c, &lambda) in self.constraints.iter().zip(self.multipliers) {
            let shifted = (lambda - self.penalty * c.evaluate(x)).max(0.0);
            if shifted > 0.0 {
                for (g, a) in grad.iter_mut().zip(&c.coefficients) {
                    *g -= shifted * a;
                }
            }
        }
    }
}

enum InnerStatus {
    Converged,
    LineSearchStalled,
    IterationLimit,
    TimedOut,
}

struct InnerOutcome {
    status: InnerStatus,
    iterations: usize,
}

impl Solver for AugmentedLagrangianSolver {
    fn solve<O: Objective>(
        &self,
        objective: &O,
        constraints: &[LinearConstraint],
        bounds: &[Bound],
        initial_guess: &[f64],
    ) -> SolveOutcome {
        let cfg = &self.config;
        let deadline = cfg.time_budget().map(|budget| Instant::now() + budget);

        let scaled: Vec<ScaledConstraint> = constraints
            .iter()
            .map(ScaledConstraint::from_constraint)
            .collect();

        let mut x: Vec<f64> = initial_guess
            .iter()
            .zip(bounds)
            .map(|(&v, b)| b.clamp(v))
            .collect();
        let mut multipliers = vec![0.0; scaled.len()];
        let mut penalty = cfg.initial_penalty;
        let mut prev_violation = f64::INFINITY;
        let mut iterations = 0;
        let mut outer_iterations = 0;
        let mut stalled_rounds = 0;
        let mut timed_out = false;
        let mut converged = false;
        let mut stagnated = false;

        for outer in 0..cfg.max_outer_iters {
            outer_iterations = outer + 1;
            let lagrangian = AugmentedLagrangian {
                objective,
                constraints: &scaled,
                multipliers: &multipliers,
                penalty,
            };
            let inner = spectral_projected_gradient(&lagrangian, bounds, &mut x, cfg, deadline);
            iterations += inner.iterations;

            let slacks: Vec<f64> = scaled.iter().map(|c| c.evaluate(&x)).collect();
            let violation = max_violation(&slacks);

            // λ ← max(0, λ - ρ g)
            for (lambda, &g) in multipliers.iter_mut().zip(&slacks) {
                *lambda = (*lambda - penalty * g).max(0.0);
            }
            let complementarity = slacks
                .iter()
                .zip(&multipliers)
                .map(|(&g, &lambda)| g.min(lambda).abs())
                .fold(0.0, f64::max);

            trace!(
                outer,
                penalty,
                violation,
                complementarity,
                inner_iters = inner.iterations,
                "augmented lagrangian step"
            );

            if matches!(inner.status, InnerStatus::TimedOut) {
                timed_out = true;
                break;
            }

            let inner_done = matches!(
                inner.status,
                InnerStatus::Converged | InnerStatus::LineSearchStalled
            );
            if violation <= cfg.feasibility_tol && complementarity <= cfg.feasibility_tol && inner_done
            {
                converged = true;
                break;
            }

            // An infeasible problem settles at its least violation no matter the penalty.
            let plateau = prev_violation.is_finite()
                && prev_violation - violation <= STAGNATION_RTOL * prev_violation;
            let capped =
                penalty >= cfg.max_penalty && violation > VIOLATION_DECREASE * prev_violation;
            if violation > cfg.feasibility_tol && (plateau || capped) {
                stalled_rounds += 1;
            } else {
                stalled_rounds = 0;
            }
            if stalled_rounds >= STAGNATION_ROUNDS {
                debug!(outer, penalty, violation, "constraint violation stalled");
                stagnated = true;
                break;
            }

            if violation > VIOLATION_DECREASE * prev_violation {
                penalty = (penalty * cfg.penalty_growth).min(cfg.max_penalty);
            }
            prev_violation = violation;
        }

        let violation = max_violation(&scaled.iter().map(|c| c.evaluate(&x)).collect::<Vec<_>>());
        let finite = x.iter().all(|v| v.is_finite()) && objective.value(&x).is_finite();
        let success = !timed_out && finite && violation <= cfg.feasibility_tol;

        let message = if timed_out {
            "time budget exhausted".to_string()
        } else if !finite {
            "iterate became non-finite".to_string()
        } else if success && converged {
            "converged".to_string()
        } else if success {
            "feasible point found at iteration limit".to_string()
        } else if stagnated {
            format!("constraint violation stalled at {violation:.3e} after {outer_iterations} updates")
        } else {
            format!("constraints violated by {violation:.3e} after {iterations} iterations")
        };

        debug!(success, iterations, outer_iterations, violation, %message, "solver finished");

        SolveOutcome {
            success,
            solution: x,
            iterations,
            outer_iterations,
            max_violation: violation,
            message,
        }
    }
}

fn max_violation(slacks: &[f64]) -> f64 {
    slacks.iter().map(|&g| (-g).max(0.0)).fold(0.0, f64::max)
}

fn project(x: &mut [f64], bounds: &[Bound]) {
    for (v, b) in x.iter_mut().zip(bounds) {
        *v = b.clamp(*v);
    }
}

/// Infinity norm of `P(x - g) - x`, zero exactly at box-constrained stationary points.
fn projected_gradient_norm(x: &[f64], g: &[f64], bounds: &[Bound]) -> f64 {
    x.iter()
        .zip(g)
        .zip(bounds)
        .map(|((&xi, &gi), b)| (b.clamp(xi - gi) - xi).abs())
        .fold(0.0, f64::max)
}

/// Minimize `lagrangian` over the box, starting from (and updating) `x`.
///
/// Barzilai-Borwein step lengths with a non-monotone Armijo line search
/// along the projected direction.
fn spectral_projected_gradient<O: Objective>(
    lagrangian: &AugmentedLagrangian<'_, O>,
    bounds: &[Bound],
    x: &mut [f64],
    cfg: &SolverConfig,
    deadline: Option<Instant>,
) -> InnerOutcome {
    let n = x.len();
    project(x, bounds);

    let mut g = vec![0.0; n];
    let mut f = lagrangian.value(x);
    lagrangian.gradient(x, &mut g);

    let mut history: VecDeque<f64> = VecDeque::with_capacity(SPG_MEMORY);
    history.push_back(f);

    let pg = projected_gradient_norm(x, &g, bounds);
    let mut step = if pg > 0.0 {
        (1.0 / pg).clamp(STEP_MIN, STEP_MAX)
    } else {
        1.0
    };

    let mut direction = vec![0.0; n];
    let mut trial = vec![0.0; n];
    let mut g_trial = vec![0.0; n];

    for iter in 0..cfg.max_inner_iters {
        if projected_gradient_norm(x, &g, bounds) <= cfg.optimality_tol {
            return InnerOutcome {
                status: InnerStatus::Converged,
                iterations: iter,
            };
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return InnerOutcome {
                status: InnerStatus::TimedOut,
                iterations: iter,
            };
        }

        for i in 0..n {
            direction[i] = bounds[i].clamp(x[i] - step * g[i]) - x[i];
        }
        let slope = dot(&g, &direction);
        if slope >= 0.0 {
            // No descent left along the projected path.
            return InnerOutcome {
                status: InnerStatus::Converged,
                iterations: iter,
            };
        }

        let f_ref = history.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mut fraction = 1.0;
        let f_trial = loop {
            for i in 0..n {
                trial[i] = x[i] + fraction * direction[i];
            }
            let value = lagrangian.value(&trial);
            if value <= f_ref + ARMIJO_GAMMA * fraction * slope {
                break value;
            }
            if fraction < MIN_LINE_SEARCH_FRACTION {
                return InnerOutcome {
                    status: InnerStatus::LineSearchStalled,
                    iterations: iter,
                };
            }
            // Safeguarded quadratic interpolation, falling back to halving.
            let candidate = -0.5 * fraction * fraction * slope / (value - f - fraction * slope);
            fraction = if candidate >= 0.1 * fraction && candidate <= 0.9 * fraction {
                candidate
            } else {
                fraction * 0.5
            };
        };

        lagrangian.gradient(&trial, &mut g_trial);

        let mut ss = 0.0;
        let mut sy = 0.0;
        for i in 0..n {
            let s = trial[i] - x[i];
            let y = g_trial[i] - g[i];
            ss += s * s;
            sy += s * y;
        }
        step = if sy > 0.0 {
            (ss / sy).clamp(STEP_MIN, STEP_MAX)
        } else {
            STEP_MAX
        };

        x.copy_from_slice(&trial);
        std::mem::swap(&mut g, &mut g_trial);
        f = f_trial;

        if history.len() == SPG_MEMORY {
            history.pop_front();
        }
        history.push_back(f);
    }

    InnerOutcome {
        status: InnerStatus::IterationLimit,
        iterations: cfg.max_inner_iters,
    }
}
