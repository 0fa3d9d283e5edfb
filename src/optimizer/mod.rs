pub mod config;
pub mod constants;
pub mod diagnosis;
pub mod materialize;
pub mod pipeline;
pub mod problem;
pub mod solver;
pub mod targets;

pub use config::{OptimizerConfig, SolverConfig};
pub use constants::*;
pub use diagnosis::{diagnose, reachable_range, AxisDiagnosis, Diagnosis, InfeasibleSide, ReachableRange};
pub use materialize::materialize;
pub use pipeline::{calculate_portions, resolve_foods, solve_portions, FoodLookup, ResolvedFoods};
pub use problem::{
    aggregates, build_problem, Bound, LinearConstraint, Objective, PortionProblem,
    RelativeSquaredError,
};
pub use solver::{AugmentedLagrangianSolver, SolveOutcome, Solver};
pub use targets::{ActiveAxis, Band, TargetSpec};
