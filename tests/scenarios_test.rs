use std::cell::RefCell;

use portion_optimizer_rs::catalog::FoodCatalog;
use portion_optimizer_rs::error::PortionError;
use portion_optimizer_rs::models::{
    portion_totals, Axis, FoodRecord, FoodSelection, Nutrients, PortionRequest, PortionResponse,
};
use portion_optimizer_rs::optimizer::{
    calculate_portions, AugmentedLagrangianSolver, Bound, InfeasibleSide, LinearConstraint,
    Objective, OptimizerConfig, SolveOutcome, Solver, SolverConfig, MAX_OUTER_ITERS,
};

fn make_record(code: &str, quantity: f64, cal: f64, p: f64, c: f64, f: f64) -> FoodRecord {
    FoodRecord {
        code: code.to_string(),
        name: code.to_string(),
        quantity,
        calories: cal,
        protein: p,
        carb: c,
        fat: f,
    }
}

fn sample_catalog() -> FoodCatalog {
    FoodCatalog::new(vec![
        make_record("F1", 100.0, 200.0, 10.0, 20.0, 5.0),
        make_record("ARROZ", 100.0, 128.0, 2.5, 28.1, 0.2),
        make_record("FRANGO", 100.0, 159.0, 32.0, 0.0, 2.5),
        make_record("AZEITE", 10.0, 88.4, 0.0, 0.0, 10.0),
        make_record("BROCOLIS", 100.0, 34.0, 2.8, 6.6, 0.4),
    ])
}

fn solve(request: &PortionRequest) -> Result<Vec<portion_optimizer_rs::Portion>, PortionError> {
    let config = OptimizerConfig::default();
    let solver = AugmentedLagrangianSolver::new(config.solver.clone());
    calculate_portions(request, &sample_catalog(), &solver, &config)
}

/// Runs the default solver and keeps every outcome it produced.
struct RecordingSolver {
    inner: AugmentedLagrangianSolver,
    outcomes: RefCell<Vec<SolveOutcome>>,
}

impl RecordingSolver {
    fn new() -> Self {
        Self {
            inner: AugmentedLagrangianSolver::default(),
            outcomes: RefCell::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.outcomes.borrow().len()
    }
}

impl Solver for RecordingSolver {
    fn solve<O: Objective>(
        &self,
        objective: &O,
        constraints: &[LinearConstraint],
        bounds: &[Bound],
        initial_guess: &[f64],
    ) -> SolveOutcome {
        let outcome = self.inner.solve(objective, constraints, bounds, initial_guess);
        self.outcomes.borrow_mut().push(outcome.clone());
        outcome
    }
}

/// Thirty foods sharing a 2:1 protein to fat ratio, each capped at 300g.
fn thirty_food_setup() -> (FoodCatalog, Vec<FoodSelection>) {
    let records: Vec<FoodRecord> = (0..30)
        .map(|i| {
            let scale = 1.0 + (i % 5) as f64 * 0.25;
            make_record(
                &format!("F{i:02}"),
                100.0,
                90.0 + i as f64 * 4.0,
                10.0 * scale,
                8.0 + (i % 7) as f64,
                5.0 * scale,
            )
        })
        .collect();
    let selections = records
        .iter()
        .map(|r| FoodSelection::new(r.code.clone()).with_bounds(None, Some(300.0)))
        .collect();
    (FoodCatalog::new(records), selections)
}

fn assert_in_band(actual: f64, target: f64, tolerance: f64) {
    let slack = 1e-3 * target;
    assert!(
        actual >= target * (1.0 - tolerance) - slack && actual <= target * (1.0 + tolerance) + slack,
        "{} outside band around {} (±{})",
        actual,
        target,
        tolerance
    );
}

#[test]
fn test_single_food_hits_targets_exactly() {
    let request = PortionRequest {
        targets: Nutrients::new(200.0, 10.0, 20.0, 5.0),
        tolerance: Some(0.10),
        foods: vec![FoodSelection::new("F1")],
    };

    let portions = solve(&request).expect("single food should be solvable");
    assert_eq!(portions.len(), 1);
    assert_eq!(portions[0].code, "F1");
    assert!(
        (portions[0].quantity - 100.0).abs() < 0.5,
        "expected ~100g, got {}",
        portions[0].quantity
    );
}

#[test]
fn test_unreachable_calories_are_explained() {
    let request = PortionRequest {
        targets: Nutrients::new(1000.0, 0.0, 0.0, 0.0),
        tolerance: Some(0.10),
        foods: vec![FoodSelection::new("F1").with_bounds(None, Some(200.0))],
    };

    let err = solve(&request).unwrap_err();
    let PortionError::OptimizationFailure { diagnosis } = &err else {
        panic!("expected optimization failure, got {err:?}");
    };

    assert_eq!(diagnosis.infeasible.len(), 1);
    let d = &diagnosis.infeasible[0];
    assert_eq!(d.axis, Axis::Calories);
    assert_eq!(d.side, InfeasibleSide::High);
    assert!((d.reachable - 400.0).abs() < 1e-9);
    assert!((d.band_max - 1100.0).abs() < 1e-9);

    let message = err.to_string();
    assert!(message.contains("No solution found"));
    assert!(message.contains("400.0"));
    assert!(message.contains("1100.0"));
}

#[test]
fn test_unreachable_calories_with_all_targets() {
    let request = PortionRequest {
        targets: Nutrients::new(1000.0, 10.0, 20.0, 5.0),
        tolerance: Some(0.10),
        foods: vec![FoodSelection::new("F1").with_bounds(None, Some(200.0))],
    };

    match solve(&request).unwrap_err() {
        PortionError::OptimizationFailure { diagnosis } => {
            let axes: Vec<Axis> = diagnosis.infeasible.iter().map(|d| d.axis).collect();
            assert_eq!(axes, vec![Axis::Calories]);
        }
        other => panic!("expected optimization failure, got {other:?}"),
    }
}

#[test]
fn test_zero_target_is_unconstrained() {
    // Protein 50 cannot be combined with the other targets using F1 alone...
    let constrained = PortionRequest {
        targets: Nutrients::new(200.0, 50.0, 20.0, 5.0),
        tolerance: Some(0.10),
        foods: vec![FoodSelection::new("F1")],
    };
    assert!(matches!(
        solve(&constrained),
        Err(PortionError::OptimizationFailure { .. })
    ));

    // ...but with protein inactive any protein value is accepted.
    let relaxed = PortionRequest {
        targets: Nutrients::new(200.0, 0.0, 20.0, 5.0),
        ..constrained
    };
    let portions = solve(&relaxed).expect("inactive protein should not constrain");
    let totals = portion_totals(&portions);
    assert_in_band(totals.calories, 200.0, 0.10);
    assert_in_band(totals.carb, 20.0, 0.10);
    assert_in_band(totals.fat, 5.0, 0.10);
    assert!((totals.protein - 50.0).abs() > 10.0);
}

#[test]
fn test_empty_food_list_is_validation_error() {
    let request = PortionRequest {
        targets: Nutrients::new(500.0, 30.0, 0.0, 0.0),
        tolerance: Some(0.10),
        foods: vec![],
    };

    let solver = RecordingSolver::new();
    let result = calculate_portions(&request, &sample_catalog(), &solver, &OptimizerConfig::default());

    assert!(matches!(result, Err(PortionError::Validation(_))));
    assert_eq!(solver.calls(), 0);
}

#[test]
fn test_no_active_target_is_validation_error() {
    let request = PortionRequest {
        targets: Nutrients::default(),
        tolerance: Some(0.10),
        foods: vec![FoodSelection::new("F1")],
    };

    assert!(matches!(solve(&request), Err(PortionError::Validation(_))));
}

#[test]
fn test_bad_tolerance_is_validation_error() {
    let request = PortionRequest {
        targets: Nutrients::new(500.0, 0.0, 0.0, 0.0),
        tolerance: Some(0.0),
        foods: vec![FoodSelection::new("F1")],
    };

    assert!(matches!(solve(&request), Err(PortionError::Validation(_))));
}

#[test]
fn test_meal_with_four_foods() {
    let request = PortionRequest {
        targets: Nutrients::new(500.0, 45.0, 50.0, 14.0),
        tolerance: Some(0.10),
        foods: vec![
            FoodSelection::new("ARROZ"),
            FoodSelection::new("FRANGO").with_bounds(Some(50.0), Some(250.0)),
            FoodSelection::new("AZEITE").with_bounds(None, Some(20.0)),
            FoodSelection::new("BROCOLIS").with_bounds(Some(80.0), None),
        ],
    };

    let portions = solve(&request).expect("meal should be solvable");
    assert_eq!(portions.len(), 4);

    // Order follows the request
    let codes: Vec<&str> = portions.iter().map(|p| p.code.as_str()).collect();
    assert_eq!(codes, vec!["ARROZ", "FRANGO", "AZEITE", "BROCOLIS"]);

    assert!(portions[1].quantity >= 50.0 && portions[1].quantity <= 250.0);
    assert!(portions[2].quantity <= 20.0);
    assert!(portions[3].quantity >= 80.0);

    let totals = portion_totals(&portions);
    assert_in_band(totals.calories, 500.0, 0.10);
    assert_in_band(totals.protein, 45.0, 0.10);
    assert_in_band(totals.carb, 50.0, 0.10);
    assert_in_band(totals.fat, 14.0, 0.10);
}

#[test]
fn test_unknown_food_is_dropped() {
    let request = PortionRequest {
        targets: Nutrients::new(200.0, 10.0, 20.0, 5.0),
        tolerance: Some(0.10),
        foods: vec![FoodSelection::new("NOT_A_FOOD"), FoodSelection::new("F1")],
    };

    let portions = solve(&request).expect("known food should still be solved");
    assert_eq!(portions.len(), 1);
    assert_eq!(portions[0].code, "F1");
}

#[test]
fn test_user_override_changes_density() {
    // A user record says F1 is twice as dense, so ~50g meets the same targets.
    let catalog = sample_catalog().with_overrides(vec![make_record(
        "F1", 50.0, 200.0, 10.0, 20.0, 5.0,
    )]);
    let request = PortionRequest {
        targets: Nutrients::new(200.0, 10.0, 20.0, 5.0),
        tolerance: Some(0.10),
        foods: vec![FoodSelection::new("f1")],
    };

    let config = OptimizerConfig::default();
    let solver = AugmentedLagrangianSolver::new(config.solver.clone());
    let portions = calculate_portions(&request, &catalog, &solver, &config).unwrap();
    assert!((portions[0].quantity - 50.0).abs() < 0.5);
}

#[test]
fn test_timeout_is_diagnosed_failure() {
    let config = OptimizerConfig {
        solver: SolverConfig {
            time_budget_ms: Some(0),
            ..Default::default()
        },
        ..Default::default()
    };
    let request = PortionRequest {
        targets: Nutrients::new(500.0, 45.0, 50.0, 14.0),
        tolerance: Some(0.10),
        foods: vec![FoodSelection::new("ARROZ"), FoodSelection::new("FRANGO")],
    };

    let solver = AugmentedLagrangianSolver::new(config.solver.clone());
    let result = calculate_portions(&request, &sample_catalog(), &solver, &config);
    assert!(matches!(result, Err(PortionError::OptimizationFailure { .. })));
}

#[test]
fn test_response_shapes() {
    let ok = PortionRequest {
        targets: Nutrients::new(200.0, 10.0, 20.0, 5.0),
        tolerance: Some(0.10),
        foods: vec![FoodSelection::new("F1")],
    };
    let value = serde_json::to_value(PortionResponse::from_result(&solve(&ok))).unwrap();
    assert_eq!(value["success"], true);
    let row = &value["portions"][0];
    for field in ["code", "quantity", "calories", "protein", "carb", "fat"] {
        assert!(row.get(field).is_some(), "missing field {field}");
    }
    assert!(value.get("error").is_none());

    let failing = PortionRequest {
        targets: Nutrients::new(1000.0, 0.0, 0.0, 0.0),
        tolerance: Some(0.10),
        foods: vec![FoodSelection::new("F1").with_bounds(None, Some(200.0))],
    };
    let value = serde_json::to_value(PortionResponse::from_result(&solve(&failing))).unwrap();
    assert_eq!(value["success"], false);
    assert!(value["error"].as_str().unwrap().contains("calories"));
    assert_eq!(value["infeasible_axes"][0]["axis"], "calories");
    assert_eq!(value["infeasible_axes"][0]["side"], "high");
}

#[test]
fn test_unreachable_fat_over_many_foods_gives_up_early() {
    let (catalog, foods) = thirty_food_setup();
    // At most 30 * 3 * 10g = 900g of fat is reachable.
    let request = PortionRequest {
        targets: Nutrients::new(2000.0, 100.0, 200.0, 5000.0),
        tolerance: Some(0.10),
        foods,
    };

    let solver = RecordingSolver::new();
    let err = calculate_portions(&request, &catalog, &solver, &OptimizerConfig::default())
        .unwrap_err();

    match err {
        PortionError::OptimizationFailure { diagnosis } => {
            let axes: Vec<Axis> = diagnosis.infeasible.iter().map(|d| d.axis).collect();
            assert_eq!(axes, vec![Axis::Fat]);
        }
        other => panic!("expected optimization failure, got {other:?}"),
    }

    let outcomes = solver.outcomes.borrow();
    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].success);
    assert!(
        outcomes[0].outer_iterations < MAX_OUTER_ITERS / 2,
        "took {} outer iterations",
        outcomes[0].outer_iterations
    );
}

#[test]
fn test_joint_failure_over_many_foods_gives_up_early() {
    let (catalog, foods) = thirty_food_setup();
    // Every food gives protein and fat at 2:1, so 100g of each cannot coexist.
    let request = PortionRequest {
        targets: Nutrients::new(0.0, 100.0, 0.0, 100.0),
        tolerance: Some(0.10),
        foods,
    };

    let solver = RecordingSolver::new();
    let err = calculate_portions(&request, &catalog, &solver, &OptimizerConfig::default())
        .unwrap_err();

    match err {
        PortionError::OptimizationFailure { diagnosis } => assert!(diagnosis.is_joint()),
        other => panic!("expected optimization failure, got {other:?}"),
    }

    let outcomes = solver.outcomes.borrow();
    assert!(!outcomes[0].success);
    assert!(
        outcomes[0].outer_iterations < MAX_OUTER_ITERS / 2,
        "took {} outer iterations",
        outcomes[0].outer_iterations
    );
}
