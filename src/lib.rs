pub mod catalog;
pub mod cli;
pub mod error;
pub mod interface;
pub mod models;
pub mod optimizer;

pub use error::{PortionError, Result};
pub use models::{FoodRecord, Portion, PortionRequest, PortionResponse};
pub use optimizer::{calculate_portions, AugmentedLagrangianSolver, OptimizerConfig};
