use std::collections::HashMap;

use strsim::jaro_winkler;

use crate::models::FoodRecord;
use crate::optimizer::FoodLookup;

/// Queries shorter than this return no search results.
pub const SEARCH_MIN_QUERY_LEN: usize = 2;

/// Default number of search results.
pub const SEARCH_LIMIT: usize = 10;

/// Minimum Jaro-Winkler similarity for a fuzzy code match.
pub const FUZZY_MATCH_THRESHOLD: f64 = 0.7;

/// Food records keyed by code, with optional per-user overrides.
///
/// An override with the same code (case-insensitive) shadows the shared entry.
pub struct FoodCatalog {
    /// Shared records keyed by lowercase code.
    foods: HashMap<String, FoodRecord>,

    /// User-specific records keyed by lowercase code.
    overrides: HashMap<String, FoodRecord>,
}

impl FoodCatalog {
    /// Create a catalog from shared records. Later duplicates win.
    pub fn new(foods: Vec<FoodRecord>) -> Self {
        let mut map = HashMap::new();
        for food in foods {
            map.insert(food.key(), food);
        }
        Self {
            foods: map,
            overrides: HashMap::new(),
        }
    }

    /// Layer user-specific records over the shared ones.
    pub fn with_overrides(mut self, overrides: Vec<FoodRecord>) -> Self {
        for food in overrides {
            self.overrides.insert(food.key(), food);
        }
        self
    }

    /// Get a record by code (case-insensitive), preferring an override.
    pub fn get(&self, code: &str) -> Option<&FoodRecord> {
        let key = code.to_lowercase();
        self.overrides.get(&key).or_else(|| self.foods.get(&key))
    }

    /// Whether the effective record for `code` is a user override.
    pub fn is_override(&self, code: &str) -> bool {
        self.overrides.contains_key(&code.to_lowercase())
    }

    /// All effective records, sorted by code.
    pub fn all_foods(&self) -> Vec<&FoodRecord> {
        let mut foods: Vec<&FoodRecord> = self
            .overrides
            .values()
            .chain(
                self.foods
                    .iter()
                    .filter(|(k, _)| !self.overrides.contains_key(*k))
                    .map(|(_, f)| f),
            )
            .collect();
        foods.sort_by(|a, b| a.code.cmp(&b.code));
        foods
    }

    /// Search codes by case-insensitive substring.
    ///
    /// Falls back to fuzzy matching when nothing contains the query.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&FoodRecord> {
        let query = query.trim();
        if query.chars().count() < SEARCH_MIN_QUERY_LEN {
            return Vec::new();
        }

        let needle = query.to_lowercase();
        let exact: Vec<&FoodRecord> = self
            .all_foods()
            .into_iter()
            .filter(|f| f.key().contains(&needle))
            .take(limit)
            .collect();

        if !exact.is_empty() {
            return exact;
        }

        self.fuzzy_matches(query)
            .into_iter()
            .take(limit)
            .map(|(f, _)| f)
            .collect()
    }

    /// Records whose code is similar to `query`, best first.
    pub fn fuzzy_matches(&self, query: &str) -> Vec<(&FoodRecord, f64)> {
        let needle = query.trim().to_lowercase();
        let mut candidates: Vec<(&FoodRecord, f64)> = self
            .all_foods()
            .into_iter()
            .map(|f| (f, jaro_winkler(&f.key(), &needle)))
            .filter(|(_, score)| *score > FUZZY_MATCH_THRESHOLD)
            .collect();

        candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        candidates
    }

    /// Count of effective records.
    pub fn len(&self) -> usize {
        self.foods.len()
            + self
                .overrides
                .keys()
                .filter(|k| !self.foods.contains_key(*k))
                .count()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty() && self.overrides.is_empty()
    }
}

impl FoodLookup for FoodCatalog {
    fn lookup(&self, code: &str) -> Option<FoodRecord> {
        self.get(code).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, calories: f64) -> FoodRecord {
        FoodRecord {
            code: code.to_string(),
            name: String::new(),
            quantity: 100.0,
            calories,
            protein: 1.0,
            carb: 1.0,
            fat: 1.0,
        }
    }

    fn sample_catalog() -> FoodCatalog {
        FoodCatalog::new(vec![
            record("ARROZ_BRANCO", 128.0),
            record("ARROZ_INTEGRAL", 124.0),
            record("FEIJAO", 76.0),
            record("FRANGO_GRELHADO", 159.0),
        ])
    }

    #[test]
    fn test_get_case_insensitive() {
        let catalog = sample_catalog();
        assert!(catalog.get("feijao").is_some());
        assert!(catalog.get("FeIjAo").is_some());
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn test_override_shadows_shared_record() {
        let catalog = sample_catalog().with_overrides(vec![record("FEIJAO", 90.0)]);

        assert_eq!(catalog.get("FEIJAO").unwrap().calories, 90.0);
        assert!(catalog.is_override("feijao"));
        assert!(!catalog.is_override("ARROZ_BRANCO"));
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.lookup("FEIJAO").unwrap().calories, 90.0);
    }

    #[test]
    fn test_override_only_code() {
        let catalog = sample_catalog().with_overrides(vec![record("MY_SHAKE", 250.0)]);
        assert_eq!(catalog.len(), 5);
        assert!(catalog.lookup("my_shake").is_some());
    }

    #[test]
    fn test_search_substring() {
        let catalog = sample_catalog();
        let results = catalog.search("arroz", SEARCH_LIMIT);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].code, "ARROZ_BRANCO");
    }

    #[test]
    fn test_search_short_query() {
        let catalog = sample_catalog();
        assert!(catalog.search("a", SEARCH_LIMIT).is_empty());
        assert!(catalog.search("  ", SEARCH_LIMIT).is_empty());
    }

    #[test]
    fn test_search_respects_limit() {
        let catalog = sample_catalog();
        assert_eq!(catalog.search("ar", 1).len(), 1);
    }

    #[test]
    fn test_search_fuzzy_fallback() {
        let catalog = sample_catalog();
        let results = catalog.search("feijoa", SEARCH_LIMIT);
        assert!(!results.is_empty());
        assert_eq!(results[0].code, "FEIJAO");
    }
}
