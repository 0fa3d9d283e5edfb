use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::Result;
use crate::models::FoodRecord;

/// Load food records from a JSON array or a CSV file (by `.csv` extension).
///
/// Invalid records are skipped. Deduplicates by lowercase code (last occurrence wins).
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<FoodRecord>> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let records = if is_csv {
        read_csv(path)?
    } else {
        let content = fs::read_to_string(path)?;
        serde_json::from_str::<Vec<FoodRecord>>(&content)?
    };

    let mut seen: HashMap<String, FoodRecord> = HashMap::new();
    for record in records {
        if !record.is_valid() {
            warn!(code = %record.code, "skipping food record with invalid values");
            continue;
        }
        seen.insert(record.key(), record);
    }

    debug!(path = %path.display(), count = seen.len(), "loaded food records");
    Ok(seen.into_values().collect())
}

fn read_csv(path: &Path) -> Result<Vec<FoodRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: FoodRecord = row?;
        records.push(record);
    }
    Ok(records)
}
