use crate::models::{FoodDensity, Portion};

/// Turn a solution vector into per-food result rows, aligned by index.
pub fn materialize(densities: &[FoodDensity], solution: &[f64]) -> Vec<Portion> {
    densities
        .iter()
        .zip(solution)
        .map(|(density, &quantity)| {
            Portion::new(density.code.clone(), quantity, density.nutrients_for(quantity))
        })
        .collect()
}
