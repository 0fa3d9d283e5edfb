use dialoguer::{Confirm, Input, Select};

use crate::catalog::FoodCatalog;
use crate::error::{PortionError, Result};
use crate::models::{Axis, FoodSelection, PortionRequest, Targets};

/// Parse a number, accepting a comma as decimal separator.
pub fn parse_number(input: &str) -> Result<f64> {
    let value: f64 = input
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| PortionError::validation(format!("'{}' is not a number", input.trim())))?;

    if !value.is_finite() {
        return Err(PortionError::validation("number must be finite"));
    }
    Ok(value)
}

/// Parse an optional number; blank input means "not set".
pub fn parse_optional_number(input: &str) -> Result<Option<f64>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    parse_number(input).map(Some)
}

/// Prompt for the four targets. 0 leaves an axis unconstrained.
pub fn prompt_targets() -> Result<Targets> {
    let mut targets = Targets::default();

    for axis in Axis::ALL {
        let input: String = Input::new()
            .with_prompt(format!("Target {} ({}, 0 to ignore)", axis, axis.unit()))
            .default("0".to_string())
            .interact_text()?;
        *targets.get_mut(axis) = parse_number(&input)?;
    }

    Ok(targets)
}

/// Prompt for the tolerance as a percentage; returns a fraction.
pub fn prompt_tolerance(default: f64) -> Result<f64> {
    let input: String = Input::new()
        .with_prompt("Tolerance (%)")
        .default(format!("{:.0}", default * 100.0))
        .interact_text()?;

    let percent = parse_number(&input)?;
    if percent <= 0.0 || percent > 100.0 {
        return Err(PortionError::validation("tolerance must be between 0 and 100%"));
    }
    Ok(percent / 100.0)
}

fn prompt_bounds(code: &str) -> Result<(Option<f64>, Option<f64>)> {
    let min: String = Input::new()
        .with_prompt(format!("Minimum grams of {} (blank for none)", code))
        .allow_empty(true)
        .interact_text()?;
    let max: String = Input::new()
        .with_prompt(format!("Maximum grams of {} (blank for none)", code))
        .allow_empty(true)
        .interact_text()?;

    Ok((parse_optional_number(&min)?, parse_optional_number(&max)?))
}

/// Resolve one typed code against the catalog, asking when the match is fuzzy.
fn resolve_code(catalog: &FoodCatalog, input: &str) -> Result<Option<String>> {
    if let Some(food) = catalog.get(input) {
        return Ok(Some(food.code.clone()));
    }

    let candidates = catalog.fuzzy_matches(input);

    if candidates.is_empty() {
        println!("No matching food found for '{}'", input);
        return Ok(None);
    }

    if candidates.len() == 1 {
        let food = candidates[0].0;
        let confirm = Confirm::new()
            .with_prompt(format!("Did you mean '{}'?", food.code))
            .default(true)
            .interact()?;
        return Ok(confirm.then(|| food.code.clone()));
    }

    let options: Vec<String> = candidates
        .iter()
        .take(5)
        .map(|(f, _)| f.code.clone())
        .collect();

    let mut selection_options = options.clone();
    selection_options.push("None of these".to_string());

    let selection = Select::new()
        .with_prompt("Which did you mean?")
        .items(&selection_options)
        .default(0)
        .interact()?;

    Ok(options.get(selection).cloned())
}

/// Prompt for food codes (fuzzy matched against the catalog) and their bounds.
pub fn prompt_foods(catalog: &FoodCatalog) -> Result<Vec<FoodSelection>> {
    let mut foods: Vec<FoodSelection> = Vec::new();

    loop {
        let input: String = Input::new()
            .with_prompt("Enter a food code (or press Enter to finish)")
            .allow_empty(true)
            .interact_text()?;

        let input = input.trim();
        if input.is_empty() {
            break;
        }

        let Some(code) = resolve_code(catalog, input)? else {
            continue;
        };

        if foods.iter().any(|f| f.code.eq_ignore_ascii_case(&code)) {
            println!("{} is already selected", code);
            continue;
        }

        let (min, max) = prompt_bounds(&code)?;
        println!("Added: {}", code);
        foods.push(FoodSelection::new(code).with_bounds(min, max));
    }

    Ok(foods)
}

/// Prompt for yes/no confirmation.
pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

/// Collect a full portion request interactively.
pub fn collect_request(catalog: &FoodCatalog, default_tolerance: f64) -> Result<PortionRequest> {
    let targets = prompt_targets()?;
    let tolerance = prompt_tolerance(default_tolerance)?;
    let foods = prompt_foods(catalog)?;

    Ok(PortionRequest {
        targets,
        tolerance: Some(tolerance),
        foods,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("12.5").unwrap(), 12.5);
        assert_eq!(parse_number(" 12,5 ").unwrap(), 12.5);
        assert!(parse_number("abc").is_err());
        assert!(parse_number("inf").is_err());
    }

    #[test]
    fn test_parse_optional_number() {
        assert_eq!(parse_optional_number("").unwrap(), None);
        assert_eq!(parse_optional_number("   ").unwrap(), None);
        assert_eq!(parse_optional_number("200").unwrap(), Some(200.0));
        assert!(parse_optional_number("x").is_err());
    }
}
