/// Mass units that per-food densities are normalized to.
pub const DENSITY_BASIS: f64 = 100.0;

/// Tolerance fraction applied when a request does not give one.
pub const DEFAULT_TOLERANCE: f64 = 0.10;

/// Lower quantity bound for foods without an explicit minimum.
pub const DEFAULT_MIN_QTY: f64 = 0.0;

/// Starting quantity for every food before optimization.
pub const DEFAULT_INITIAL_QUANTITY: f64 = 100.0;

/// Slack (relative to the target) allowed when re-checking a solver's
/// claimed solution against the bands.
pub const VERIFICATION_SLACK: f64 = 1e-4;

// ─────────────────────────────────────────────────────────────────────────────
// Augmented Lagrangian solver
// ─────────────────────────────────────────────────────────────────────────────

/// Maximum multiplier/penalty updates.
pub const MAX_OUTER_ITERS: usize = 60;

/// Maximum projected-gradient steps per subproblem.
pub const MAX_INNER_ITERS: usize = 5000;

/// Largest accepted constraint violation, relative to the constraint's edge.
pub const FEASIBILITY_TOL: f64 = 1e-7;

/// Projected gradient norm at which a subproblem counts as solved.
pub const OPTIMALITY_TOL: f64 = 1e-11;

/// Starting quadratic penalty weight.
pub const INITIAL_PENALTY: f64 = 10.0;

/// Penalty multiplier applied when violation does not shrink fast enough.
pub const PENALTY_GROWTH: f64 = 10.0;

/// Penalty ceiling.
pub const MAX_PENALTY: f64 = 1e10;

/// Required violation reduction per outer iteration before the penalty grows.
pub const VIOLATION_DECREASE: f64 = 0.25;

/// Relative violation change below which an outer iteration counts as stalled.
pub const STAGNATION_RTOL: f64 = 1e-3;

/// Consecutive stalled outer iterations before the solve is abandoned.
pub const STAGNATION_ROUNDS: usize = 3;

// ─────────────────────────────────────────────────────────────────────────────
// Spectral projected gradient (inner loop)
// ─────────────────────────────────────────────────────────────────────────────

/// Number of past values kept for the non-monotone line search.
pub const SPG_MEMORY: usize = 10;

/// Sufficient decrease constant for the Armijo test.
pub const ARMIJO_GAMMA: f64 = 1e-4;

/// Spectral step length range.
pub const STEP_MIN: f64 = 1e-12;
pub const STEP_MAX: f64 = 1e12;

/// Line search gives up below this fraction of the full step.
pub const MIN_LINE_SEARCH_FRACTION: f64 = 1e-16;
