mod persistence;
mod store;

pub use persistence::load_catalog;
pub use store::{FoodCatalog, FUZZY_MATCH_THRESHOLD, SEARCH_LIMIT, SEARCH_MIN_QUERY_LEN};
