pub mod food;
pub mod nutrients;
pub mod portion;
pub mod request;

pub use food::{FoodBound, FoodDensity, FoodRecord};
pub use nutrients::{Axis, Nutrients, Targets};
pub use portion::{portion_totals, Portion};
pub use request::{FoodSelection, PortionRequest, PortionResponse};
