//! Persistence for the cleaned dataset and the per-property-type datasets.
//! Both tables key on (id, partition); re-ingesting an id overwrites the
//! stored row, so the newest scrape of a listing always wins.

use chrono::Utc;
use rusqlite::{params, Row, Transaction};

use crate::db::connection::Database;
use crate::db::DatasetKind;
use crate::domain::listing::CleanedListing;
use crate::domain::property::PropertyKind;
use crate::errors::{PipelineError, Result};

fn db_err(e: rusqlite::Error) -> PipelineError {
    PipelineError::Db(e.to_string())
}

/// Upserts one cleaned batch into the unified table, all rows in one
/// transaction. Returns the row count written.
pub fn upsert_cleaned(
    db: &Database,
    kind: DatasetKind,
    rows: &[CleanedListing],
) -> Result<usize> {
    let now = Utc::now().to_rfc3339();
    db.with_conn(|conn| {
        let tx = conn.transaction().map_err(db_err)?;
        for row in rows {
            tx.execute(
                r#"
                INSERT INTO cleaned_listings (
                    prop_id, dataset_kind,
                    city, price, area, property_type, furnish, facing, age,
                    bedroom_num, balcony_num, floor_num, locality_name,
                    luxury_category, prop_heading, description, prop_name,
                    latitude, longitude, society_name, updated_at
                ) VALUES (
                    ?1, ?2,
                    ?3, ?4, ?5, ?6, ?7, ?8, ?9,
                    ?10, ?11, ?12, ?13,
                    ?14, ?15, ?16, ?17,
                    ?18, ?19, ?20, ?21
                )
                ON CONFLICT(prop_id, dataset_kind) DO UPDATE SET
                    city = excluded.city,
                    price = excluded.price,
                    area = excluded.area,
                    property_type = excluded.property_type,
                    furnish = excluded.furnish,
                    facing = excluded.facing,
                    age = excluded.age,
                    bedroom_num = excluded.bedroom_num,
                    balcony_num = excluded.balcony_num,
                    floor_num = excluded.floor_num,
                    locality_name = excluded.locality_name,
                    luxury_category = excluded.luxury_category,
                    prop_heading = excluded.prop_heading,
                    description = excluded.description,
                    prop_name = excluded.prop_name,
                    latitude = excluded.latitude,
                    longitude = excluded.longitude,
                    society_name = excluded.society_name,
                    updated_at = excluded.updated_at
                "#,
                params![
                    row.prop_id,
                    kind.as_str(),
                    row.city,
                    row.price,
                    row.area,
                    row.property_type,
                    row.furnish,
                    row.facing,
                    row.age,
                    row.bedroom_num,
                    row.balcony_num,
                    row.floor_num,
                    row.locality_name,
                    row.luxury_category,
                    row.prop_heading,
                    row.description,
                    row.prop_name,
                    row.latitude,
                    row.longitude,
                    row.society_name,
                    now,
                ],
            )
            .map_err(db_err)?;
        }
        tx.commit().map_err(db_err)?;
        Ok(rows.len())
    })
}

/// Writes one property-type slice. With `extend` the slice merges into what
/// is stored (id conflicts overwrite); without it the stored slice for this
/// (type, partition) is replaced wholesale. Ids are stored in canonical
/// listing-URL form.
pub fn dump_property_dataset(
    db: &Database,
    kind: DatasetKind,
    property: &PropertyKind,
    rows: &[CleanedListing],
    extend: bool,
) -> Result<usize> {
    let now = Utc::now().to_rfc3339();
    db.with_conn(|conn| {
        let tx = conn.transaction().map_err(db_err)?;
        if !extend {
            tx.execute(
                "DELETE FROM property_datasets WHERE prop_type = ?1 AND dataset_kind = ?2",
                params![property.alias, kind.as_str()],
            )
            .map_err(db_err)?;
        }
        for row in rows {
            insert_property_row(&tx, kind, property, row, &now)?;
        }
        tx.commit().map_err(db_err)?;
        Ok(rows.len())
    })
}

fn insert_property_row(
    tx: &Transaction<'_>,
    kind: DatasetKind,
    property: &PropertyKind,
    row: &CleanedListing,
    now: &str,
) -> Result<()> {
    tx.execute(
        r#"
        INSERT INTO property_datasets (
            prop_id, prop_type, dataset_kind,
            city, price, area, property_type, furnish, facing, age,
            bedroom_num, balcony_num, floor_num, locality_name,
            luxury_category, prop_heading, description, prop_name,
            latitude, longitude, society_name, updated_at
        ) VALUES (
            ?1, ?2, ?3,
            ?4, ?5, ?6, ?7, ?8, ?9, ?10,
            ?11, ?12, ?13, ?14,
            ?15, ?16, ?17, ?18,
            ?19, ?20, ?21, ?22
        )
        ON CONFLICT(prop_id, prop_type, dataset_kind) DO UPDATE SET
            city = excluded.city,
            price = excluded.price,
            area = excluded.area,
            property_type = excluded.property_type,
            furnish = excluded.furnish,
            facing = excluded.facing,
            age = excluded.age,
            bedroom_num = excluded.bedroom_num,
            balcony_num = excluded.balcony_num,
            floor_num = excluded.floor_num,
            locality_name = excluded.locality_name,
            luxury_category = excluded.luxury_category,
            prop_heading = excluded.prop_heading,
            description = excluded.description,
            prop_name = excluded.prop_name,
            latitude = excluded.latitude,
            longitude = excluded.longitude,
            society_name = excluded.society_name,
            updated_at = excluded.updated_at
        "#,
        params![
            PropertyKind::canonical_prop_id(&row.prop_id),
            property.alias,
            kind.as_str(),
            row.city,
            row.price,
            row.area,
            row.property_type,
            row.furnish,
            row.facing,
            row.age,
            row.bedroom_num,
            row.balcony_num,
            row.floor_num,
            row.locality_name,
            row.luxury_category,
            row.prop_heading,
            row.description,
            row.prop_name,
            row.latitude,
            row.longitude,
            row.society_name,
            now,
        ],
    )
    .map_err(db_err)?;
    Ok(())
}

fn listing_from_row(row: &Row<'_>) -> rusqlite::Result<CleanedListing> {
    Ok(CleanedListing {
        prop_id: row.get(0)?,
        city: row.get(1)?,
        price: row.get(2)?,
        area: row.get(3)?,
        property_type: row.get(4)?,
        furnish: row.get(5)?,
        facing: row.get(6)?,
        age: row.get(7)?,
        bedroom_num: row.get(8)?,
        balcony_num: row.get(9)?,
        floor_num: row.get(10)?,
        locality_name: row.get(11)?,
        luxury_category: row.get(12)?,
        prop_heading: row.get(13)?,
        description: row.get(14)?,
        prop_name: row.get(15)?,
        latitude: row.get(16)?,
        longitude: row.get(17)?,
        society_name: row.get(18)?,
    })
}

const LISTING_COLS: &str = "prop_id, city, price, area, property_type, furnish, facing, age, \
     bedroom_num, balcony_num, floor_num, locality_name, luxury_category, \
     prop_heading, description, prop_name, latitude, longitude, society_name";

/// Reads back one property-type slice, ids in canonical form, stable order.
pub fn get_property_dataset(
    db: &Database,
    kind: DatasetKind,
    property: &PropertyKind,
) -> Result<Vec<CleanedListing>> {
    db.with_conn(|conn| {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {LISTING_COLS} FROM property_datasets \
                 WHERE prop_type = ?1 AND dataset_kind = ?2 ORDER BY prop_id"
            ))
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![property.alias, kind.as_str()], listing_from_row)
            .map_err(db_err)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(db_err)?);
        }
        Ok(out)
    })
}

/// Reads back the unified cleaned slice for one partition.
pub fn get_cleaned(db: &Database, kind: DatasetKind) -> Result<Vec<CleanedListing>> {
    db.with_conn(|conn| {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {LISTING_COLS} FROM cleaned_listings \
                 WHERE dataset_kind = ?1 ORDER BY prop_id"
            ))
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![kind.as_str()], listing_from_row)
            .map_err(db_err)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(db_err)?);
        }
        Ok(out)
    })
}

/// One line of the post-ingest summary: what each type dataset now holds.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSummary {
    pub prop_type: String,
    pub rows: i64,
    pub mean_price: Option<f64>,
    pub mean_area: Option<f64>,
}

pub fn summarize_property_datasets(
    db: &Database,
    kind: DatasetKind,
) -> Result<Vec<TypeSummary>> {
    db.with_conn(|conn| {
        let mut stmt = conn
            .prepare(
                "SELECT prop_type, COUNT(*), AVG(price), AVG(area) \
                 FROM property_datasets WHERE dataset_kind = ?1 \
                 GROUP BY prop_type ORDER BY prop_type",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![kind.as_str()], |row| {
                Ok(TypeSummary {
                    prop_type: row.get(0)?,
                    rows: row.get(1)?,
                    mean_price: row.get(2)?,
                    mean_area: row.get(3)?,
                })
            })
            .map_err(db_err)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(db_err)?);
        }
        Ok(out)
    })
}
