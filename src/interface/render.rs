use crate::error::PortionError;
use crate::models::{portion_totals, Axis, FoodRecord, Portion};

/// Display computed portions with totals, and per-kg ratios when a body
/// weight is known.
pub fn display_portions(portions: &[Portion], body_weight_kg: Option<f64>) {
    if portions.is_empty() {
        println!("No portions computed.");
        return;
    }

    println!();
    println!("=== Portions ===");
    println!();

    let width = portions.iter().map(|p| p.code.len()).max().unwrap_or(4).max(4);

    println!(
        "{:<width$}  {:>9}  {:>9}  {:>8}  {:>8}  {:>8}",
        "Code",
        "Quantity",
        "Calories",
        "Protein",
        "Carb",
        "Fat",
        width = width
    );

    for p in portions {
        println!(
            "{:<width$}  {:>8.1}g  {:>9.1}  {:>8.1}  {:>8.1}  {:>8.1}",
            p.code,
            p.quantity,
            p.calories,
            p.protein,
            p.carb,
            p.fat,
            width = width
        );
    }

    let totals = portion_totals(portions);
    println!();
    println!("--- Totals ---");
    for axis in Axis::ALL {
        println!("{:<9} {:>9.1} {}", axis.name(), totals.get(axis), axis.unit());
    }

    if let Some(weight) = body_weight_kg.filter(|w| *w > 0.0) {
        println!();
        println!("--- Per kg of body weight ({:.1} kg) ---", weight);
        for axis in Axis::ALL {
            println!(
                "{:<9} {:>9.2} {}/kg",
                axis.name(),
                totals.get(axis) / weight,
                axis.unit()
            );
        }
    }
    println!();
}

/// Display a failed calculation, listing per-axis explanations when known.
pub fn display_failure(err: &PortionError) {
    println!();
    match err {
        PortionError::OptimizationFailure { diagnosis } if !diagnosis.is_joint() => {
            println!("No solution found within the requested tolerance:");
            for d in &diagnosis.infeasible {
                println!("  - {}", d.explanation());
            }
        }
        _ => println!("{}", err),
    }
    println!();
}

/// Display catalog search results.
pub fn display_search_results(foods: &[&FoodRecord], query: &str) {
    if foods.is_empty() {
        println!("No foods match '{}'", query);
        return;
    }

    println!();
    println!("=== Matches for '{}' ({} items) ===", query, foods.len());
    println!();

    for food in foods {
        println!(
            "  {} - {} | per {}g: {} kcal, P:{} C:{} F:{}",
            food.code, food.name, food.quantity, food.calories, food.protein, food.carb, food.fat
        );
    }

    println!();
}
