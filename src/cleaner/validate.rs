//! Batch loading and upfront validation. A batch is rejected before any
//! cleaning work if its header is missing mandatory columns or any row lacks
//! a price; everything softer than that is handled row by row downstream.

use std::path::Path;

use tracing::info;

use crate::domain::listing::{RawListing, AREA_VARIANT_COLS, IMPORTANT_INIT_COLS};
use crate::errors::{PipelineError, Result};

/// Reads an uploaded CSV batch into raw rows, keeping the header around for
/// column-set checks.
pub fn load_batch(path: &Path) -> Result<(Vec<String>, Vec<RawListing>)> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    info!(file = %path.display(), rows = rows.len(), "loaded batch");
    Ok((headers, rows))
}

/// Rejects a batch whose header drops any mandatory column. Extra columns
/// are fine; the area-variant columns in particular ride along on newer
/// scrapes.
pub fn validate_dataset(headers: &[String], rows: &[RawListing]) -> Result<()> {
    let missing: Vec<&str> = IMPORTANT_INIT_COLS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::Validation(format!(
            "batch is missing mandatory columns: {}",
            missing.join(", ")
        )));
    }

    if rows.is_empty() {
        return Err(PipelineError::Validation("batch has no rows".into()));
    }

    let priceless = rows
        .iter()
        .filter(|r| r.price.as_deref().map(str::trim).unwrap_or("").is_empty())
        .count();
    if priceless > 0 {
        return Err(PipelineError::Validation(format!(
            "{priceless} rows have no price; every listing must carry one"
        )));
    }
    Ok(())
}

/// Whether the batch carries the full set of alternate area measurements,
/// switching area handling from the plain decoder to the regression
/// estimator.
pub fn has_area_variants(headers: &[String]) -> bool {
    AREA_VARIANT_COLS
        .iter()
        .all(|col| headers.iter().any(|h| h == col))
}
