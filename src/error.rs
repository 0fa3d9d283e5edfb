use thiserror::Error;

use crate::optimizer::diagnosis::Diagnosis;

#[derive(Debug, Error)]
pub enum PortionError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Food not found: {0}")]
    FoodNotFound(String),

    #[error("Food '{code}' has no usable nutrition record: {reason}")]
    InvalidFoodRecord { code: String, reason: String },

    #[error("{diagnosis}")]
    OptimizationFailure { diagnosis: Diagnosis },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl PortionError {
    /// Shorthand for a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        PortionError::Validation(msg.into())
    }

    /// Whether this error came from resolving a food code to a density.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            PortionError::FoodNotFound(_) | PortionError::InvalidFoodRecord { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PortionError>;
