use std::path::Path;

use crate::domain::listing::CleanedListing;
use crate::errors::Result;

/// Writes one cleaned dataset as CSV. Serde emits the published header row
/// from the struct's column renames, so the file round-trips through the
/// batch loader.
pub fn export_listings_csv(rows: &[CleanedListing], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
