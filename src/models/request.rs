use serde::{Deserialize, Serialize};

use crate::error::{PortionError, Result};
use crate::models::nutrients::{Nutrients, Targets};
use crate::models::portion::{portion_totals, Portion};
use crate::optimizer::diagnosis::AxisDiagnosis;

/// A food chosen by the caller, with optional quantity bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodSelection {
    pub code: String,

    #[serde(default)]
    pub min: Option<f64>,

    #[serde(default)]
    pub max: Option<f64>,
}

impl FoodSelection {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            min: None,
            max: None,
        }
    }

    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }
}

/// A portion calculation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortionRequest {
    pub targets: Targets,

    /// Fractional tolerance in (0, 1]. The configured default applies when absent.
    #[serde(default)]
    pub tolerance: Option<f64>,

    #[serde(default)]
    pub foods: Vec<FoodSelection>,
}

/// Transport shape of a portion calculation result.
#[derive(Debug, Clone, Serialize)]
pub struct PortionResponse {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub portions: Option<Vec<Portion>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<Nutrients>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub infeasible_axes: Vec<AxisDiagnosis>,
}

impl PortionResponse {
    pub fn success(portions: Vec<Portion>) -> Self {
        let totals = portion_totals(&portions);
        Self {
            success: true,
            portions: Some(portions),
            totals: Some(totals),
            error: None,
            infeasible_axes: Vec::new(),
        }
    }

    pub fn failure(err: &PortionError) -> Self {
        let infeasible_axes = match err {
            PortionError::OptimizationFailure { diagnosis } => diagnosis.infeasible.clone(),
            _ => Vec::new(),
        };
        Self {
            success: false,
            portions: None,
            totals: None,
            error: Some(err.to_string()),
            infeasible_axes,
        }
    }

    pub fn from_result(result: &Result<Vec<Portion>>) -> Self {
        match result {
            Ok(portions) => Self::success(portions.clone()),
            Err(e) => Self::failure(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_with_null_bounds() {
        let json = r#"{
            "targets": {"calories": 600, "proteins": 40, "carbs": 0, "fats": 20},
            "tolerance": 0.15,
            "foods": [
                {"code": "FRANGO", "min": null, "max": 250},
                {"code": "ARROZ"}
            ]
        }"#;
        let request: PortionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.targets.protein, 40.0);
        assert_eq!(request.tolerance, Some(0.15));
        assert_eq!(request.foods.len(), 2);
        assert_eq!(request.foods[0].max, Some(250.0));
        assert_eq!(request.foods[1].min, None);
    }

    #[test]
    fn test_tolerance_optional() {
        let request: PortionRequest =
            serde_json::from_str(r#"{"targets": {"calories": 500}, "foods": []}"#).unwrap();
        assert_eq!(request.tolerance, None);
    }

    #[test]
    fn test_failure_response_shape() {
        let err = PortionError::validation("no food selected");
        let value = serde_json::to_value(PortionResponse::failure(&err)).unwrap();
        assert_eq!(value["success"], false);
        assert!(value["error"].as_str().unwrap().contains("no food selected"));
        assert!(value.get("portions").is_none());
        assert!(value.get("infeasible_axes").is_none());
    }
}
