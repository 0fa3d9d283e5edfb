use tracing::{debug, info, warn};

use crate::error::{PortionError, Result};
use crate::models::{FoodBound, FoodDensity, FoodRecord, FoodSelection, Portion, PortionRequest};
use crate::optimizer::config::OptimizerConfig;
use crate::optimizer::diagnosis::diagnose;
use crate::optimizer::materialize::materialize;
use crate::optimizer::problem::{aggregates, build_problem, Bound};
use crate::optimizer::solver::Solver;
use crate::optimizer::targets::TargetSpec;

/// Resolves a food code to its base nutrition record.
///
/// Which record wins (a user override or a shared catalog entry) is up to
/// the implementation.
pub trait FoodLookup {
    fn lookup(&self, code: &str) -> Option<FoodRecord>;
}

/// Foods that survived lookup, with aligned densities and bounds.
#[derive(Debug, Clone, Default)]
pub struct ResolvedFoods {
    pub densities: Vec<FoodDensity>,
    pub bounds: Vec<FoodBound>,

    /// Codes dropped because no usable record was found.
    pub dropped: Vec<String>,
}

/// Validate bounds and look up every selected food.
///
/// Unknown codes and unusable records are dropped with a warning.
pub fn resolve_foods<L: FoodLookup>(
    selections: &[FoodSelection],
    lookup: &L,
    config: &OptimizerConfig,
) -> Result<ResolvedFoods> {
    let mut resolved = ResolvedFoods::default();

    for selection in selections {
        let bound = FoodBound::new(
            selection.code.clone(),
            selection.min.unwrap_or(config.default_min_qty),
            selection.max.or(config.default_max_qty),
        );
        bound.validate()?;

        let density = lookup
            .lookup(&selection.code)
            .ok_or_else(|| PortionError::FoodNotFound(selection.code.clone()))
            .and_then(|record| FoodDensity::from_record(&record));

        match density {
            Ok(density) => {
                resolved.densities.push(density);
                resolved.bounds.push(bound);
            }
            Err(e) if e.is_lookup() => {
                warn!(code = %selection.code, error = %e, "dropping food from candidate set");
                resolved.dropped.push(selection.code.clone());
            }
            Err(e) => return Err(e),
        }
    }

    Ok(resolved)
}

/// Solve for portions given resolved densities and bounds.
///
/// On solver failure (or a claimed solution that misses a band) the
/// feasibility diagnosis is returned as [`PortionError::OptimizationFailure`].
pub fn solve_portions<S: Solver>(
    spec: &TargetSpec,
    densities: &[FoodDensity],
    bounds: &[FoodBound],
    solver: &S,
    config: &OptimizerConfig,
) -> Result<Vec<Portion>> {
    if densities.is_empty() {
        return Err(PortionError::validation("select at least one food"));
    }

    let problem = build_problem(spec, densities, bounds, config);
    debug!(
        foods = densities.len(),
        axes = spec.axes.len(),
        constraints = problem.constraints.len(),
        tolerance = spec.tolerance,
        "built portion problem"
    );

    let outcome = solver.solve(
        &problem.objective,
        &problem.constraints,
        &problem.bounds,
        &problem.initial_guess,
    );

    if outcome.success && satisfies(spec, densities, &problem.bounds, &outcome.solution, config) {
        info!(
            foods = densities.len(),
            iterations = outcome.iterations,
            "portion calculation succeeded"
        );
        return Ok(materialize(densities, &outcome.solution));
    }

    if outcome.success {
        warn!(message = %outcome.message, "solver reported success but the solution misses a band");
    }

    let diagnosis = diagnose(spec, densities, bounds);
    info!(
        infeasible_axes = diagnosis.infeasible.len(),
        joint = diagnosis.is_joint(),
        solver_message = %outcome.message,
        "portion calculation failed"
    );
    Err(PortionError::OptimizationFailure { diagnosis })
}

/// Re-check a solution against the box bounds and every active band.
fn satisfies(
    spec: &TargetSpec,
    densities: &[FoodDensity],
    bounds: &[Bound],
    solution: &[f64],
    config: &OptimizerConfig,
) -> bool {
    if solution.len() != densities.len() {
        return false;
    }
    if !solution.iter().zip(bounds).all(|(&q, b)| b.contains(q)) {
        return false;
    }
    let totals = aggregates(densities, solution);
    spec.axes.iter().all(|active| {
        let slack = config.verification_slack * active.target;
        active.band.contains(totals.get(active.axis), slack)
    })
}

/// Full pipeline: validate the request, resolve foods, build, solve, and
/// either materialize portions or diagnose the failure.
pub fn calculate_portions<L: FoodLookup, S: Solver>(
    request: &PortionRequest,
    lookup: &L,
    solver: &S,
    config: &OptimizerConfig,
) -> Result<Vec<Portion>> {
    config.validate()?;

    if request.foods.is_empty() {
        return Err(PortionError::validation("select at least one food"));
    }

    let tolerance = request.tolerance.unwrap_or(config.default_tolerance);
    let spec = TargetSpec::build(&request.targets, tolerance)?;

    let resolved = resolve_foods(&request.foods, lookup, config)?;
    if resolved.densities.is_empty() {
        return Err(PortionError::validation(format!(
            "none of the selected foods could be found: {}",
            resolved.dropped.join(", ")
        )));
    }

    solve_portions(&spec, &resolved.densities, &resolved.bounds, solver, config)
}
