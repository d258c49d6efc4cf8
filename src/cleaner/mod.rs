//! The cleaning pipeline, end to end: decode the raw columns, fill missing
//! areas, prune structurally bad rows, impute the rest, score luxury, then
//! project onto the published column set.

pub mod area;
pub mod cluster;
pub mod decode;
pub mod impute;
pub mod pseudo_json;
pub mod validate;

use std::collections::HashSet;

use tracing::info;

use crate::domain::listing::{DISALLOWED_PROPERTY_TYPES, REQUIRED_COLS};
use crate::domain::{CleanedListing, RawListing, WorkingListing};
use crate::errors::{PipelineError, Result};
use crate::facets::Facets;

pub struct DataCleaner<'f> {
    facets: &'f Facets,
}

impl<'f> DataCleaner<'f> {
    pub fn new(facets: &'f Facets) -> Self {
        Self { facets }
    }

    /// Runs the whole pipeline over one validated batch. The header decides
    /// area handling: batches carrying all four area-variant columns get the
    /// regression estimator instead of the plain area decoder.
    pub fn clean(&self, headers: &[String], raw: Vec<RawListing>) -> Result<Vec<CleanedListing>> {
        let use_estimator = validate::has_area_variants(headers);
        let mut rows: Vec<WorkingListing> =
            raw.into_iter().map(WorkingListing::from_raw).collect();
        let loaded = rows.len();

        let decoder = decode::ColumnDecoder::new(self.facets);
        let skip: &[&str] = if use_estimator { &["decode_area"] } else { &[] };
        decoder.run_all(&mut rows, skip);

        if use_estimator {
            let filled = area::AreaEstimator::new(&rows).estimate()?;
            for (row, area) in rows.iter_mut().zip(filled) {
                row.area = area;
            }
        }

        structural_cleanup(&mut rows);
        impute::fill_missing(&mut rows);

        let categories = cluster::luxury_categories(&rows)?;
        for (row, category) in rows.iter_mut().zip(categories) {
            row.luxury_category = Some(category);
        }

        let cleaned = project(rows)?;
        info!(loaded, cleaned = cleaned.len(), "batch cleaned");
        Ok(cleaned)
    }
}

/// Row-level pruning and the parsers that split composite cells: duplicate
/// ids keep their first occurrence, disallowed property types go, location
/// and map cells split into their named parts, and descriptions flatten to
/// one line.
fn structural_cleanup(rows: &mut Vec<WorkingListing>) {
    let mut seen: HashSet<String> = HashSet::new();
    rows.retain(|r| seen.insert(r.prop_id.clone()));

    rows.retain(|r| match r.property_type.as_deref() {
        Some(t) => !DISALLOWED_PROPERTY_TYPES.contains(&t),
        None => true,
    });

    for row in rows.iter_mut() {
        if let Some(v) = row.location_raw.as_deref().and_then(pseudo_json::parse) {
            row.locality_name = pseudo_json::get_str(&v, "locality_name");
            row.society_name = pseudo_json::get_str(&v, "society_name");
        }
        if let Some(v) = row.map_details_raw.as_deref().and_then(pseudo_json::parse) {
            row.latitude = pseudo_json::get_f64(&v, "latitude");
            row.longitude = pseudo_json::get_f64(&v, "longitude");
        }
        if let Some(desc) = row.description.take() {
            row.description = Some(desc.replace('\n', " "));
        }
    }
}

/// Projects the working rows onto the published column set. Rows that lost
/// their price along the way cannot be published and are dropped here;
/// everything else must carry a luxury category by now.
fn project(rows: Vec<WorkingListing>) -> Result<Vec<CleanedListing>> {
    let mut emitted: Vec<&str> = CleanedListing::COLUMNS.to_vec();
    let mut required: Vec<&str> = REQUIRED_COLS.to_vec();
    emitted.sort_unstable();
    required.sort_unstable();
    if emitted != required {
        return Err(PipelineError::Validation(
            "cleaned column set drifted from the published contract".into(),
        ));
    }

    rows.into_iter()
        .filter(|r| r.price.is_some())
        .map(|r| {
            let luxury_category = r.luxury_category.ok_or_else(|| {
                PipelineError::Validation(format!("{} has no luxury category", r.prop_id))
            })?;
            // String cells are lower-cased once more on the way out; fills
            // and parsers in between must not reintroduce mixed case.
            Ok(CleanedListing {
                prop_id: r.prop_id.to_lowercase(),
                city: lower(r.city),
                price: r.price.unwrap_or_default(),
                area: r.area,
                property_type: lower(r.property_type),
                furnish: lower(r.furnish),
                facing: lower(r.facing),
                age: lower(r.age),
                bedroom_num: r.bedroom_num,
                balcony_num: r.balcony_num,
                floor_num: lower(r.floor_num),
                locality_name: lower(r.locality_name),
                luxury_category,
                prop_heading: lower(r.prop_heading),
                description: lower(r.description),
                prop_name: lower(r.prop_name),
                latitude: r.latitude,
                longitude: r.longitude,
                society_name: lower(r.society_name),
            })
        })
        .collect()
}

fn lower(v: Option<String>) -> Option<String> {
    v.map(|s| s.to_lowercase())
}
