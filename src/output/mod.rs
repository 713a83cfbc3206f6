//! Dataset sinks: the three CSV partitions and the console summary.

use crate::config::Partition;
use crate::models::{Category, DatasetRow, ListingRecord, RunReport};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Write one partition, header included even when there are no rows
pub fn write_csv<'a>(
    path: &Path,
    records: impl IntoIterator<Item = &'a ListingRecord>,
) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let mut written = 0;
    for record in records {
        writer.serialize(DatasetRow::from(record))?;
        written += 1;
    }
    if written == 0 {
        writer.write_record(DATASET_HEADERS)?;
    }
    writer.flush().with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(written)
}

/// Column order produced by serializing a [`DatasetRow`]
pub const DATASET_HEADERS: &[&str] = &[
    "title",
    "price",
    "link",
    "description",
    "address",
    "agent",
    "bedrooms",
    "bathrooms",
    "city",
    "source",
    "published",
    "category",
    "image_urls_str",
];

/// Write all, sale-only and rent-only partitions into `dir`
pub fn write_partitions(dir: &Path, records: &[ListingRecord]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let partitions = [
        (Partition::All, None),
        (Partition::Sale, Some(Category::ForSale)),
        (Partition::Rent, Some(Category::ForRent)),
    ];

    let mut paths = Vec::new();
    for (partition, category) in partitions {
        let path = dir.join(partition.file_name());
        let rows = records
            .iter()
            .filter(|r| category.map_or(true, |c| r.category == c));
        let count = write_csv(&path, rows)?;
        info!("💾 Saved {} listings to {}", count, path.display());
        paths.push(path);
    }

    Ok(paths)
}

pub fn log_summary(report: &RunReport) {
    info!("==========================================");
    info!("Sites scraped:             {}", report.sites);
    info!("Total listings:            {}", report.records.len());
    info!("Listings with images:      {}", report.with_images());
    info!("Total images:              {}", report.total_images());
    info!("Average images per listing: {:.1}", report.average_images());
    info!("==========================================");
}
