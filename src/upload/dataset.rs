use crate::models::{DatasetRow, NOT_AVAILABLE};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// Trimmed value, or empty when the cell is blank or `N/A`
pub fn clean_value(value: &str) -> &str {
    let value = value.trim();
    if value.eq_ignore_ascii_case(NOT_AVAILABLE) {
        ""
    } else {
        value
    }
}

/// Read a dataset partition, dropping rows whose link was already seen
pub fn load_dataset(path: &Path) -> Result<Vec<DatasetRow>> {
    info!("📂 Loading data from: {}", path.display());

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let rows = reader
        .deserialize()
        .collect::<Result<Vec<DatasetRow>, _>>()
        .with_context(|| format!("Malformed row in {}", path.display()))?;
    let loaded = rows.len();

    let rows = dedupe_by_link(rows);
    if rows.len() < loaded {
        warn!("Removed {} duplicate rows from CSV", loaded - rows.len());
    }

    info!("✅ Loaded {} listings from CSV", rows.len());
    Ok(rows)
}

fn dedupe_by_link(rows: Vec<DatasetRow>) -> Vec<DatasetRow> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| {
            let link = clean_value(&row.link);
            link.is_empty() || seen.insert(link.to_string())
        })
        .collect()
}
