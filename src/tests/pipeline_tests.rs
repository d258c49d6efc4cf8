//! End-to-end coverage: a synthetic scraped batch goes through load,
//! validation, cleaning, the per-type split and persistence, then comes back
//! out of the store.

use std::path::PathBuf;

use tempfile::TempDir;

use crate::cleaner::validate::{load_batch, validate_dataset};
use crate::cleaner::DataCleaner;
use crate::db::connection::{init_db, Database};
use crate::db::{datasets, DatasetKind};
use crate::domain::listing::{CleanedListing, AREA_VARIANT_COLS, IMPORTANT_INIT_COLS};
use crate::domain::property::{PropertyKind, ALL_PROPERTY};
use crate::facets::Facets;

fn make_db(dir: &TempDir) -> Database {
    let path = dir.path().join("test.sqlite3");
    let db = Database::new(path.to_string_lossy().to_string());
    init_db(&db).expect("database initialization failed");
    db
}

/// One scraped row in `IMPORTANT_INIT_COLS` order.
fn batch_row(id: &str, price: &str, bedrooms: &str, prop_type: &str, desc: &str) -> Vec<String> {
    vec![
        id.to_string(),                                                   // PROP_ID
        "Gurgaon".to_string(),                                            // CITY
        price.to_string(),                                                // PRICE
        "1250 sq.ft.".to_string(),                                        // AREA
        "12".to_string(),                                                 // TOTAL_LANDMARK_COUNT
        "[{'text': '3 bus stops nearby'}, {'text': '2 hospitals'}]".to_string(),
        "3 BHK Apartment".to_string(),                                    // PROP_HEADING
        prop_type.to_string(),                                            // PROPERTY_TYPE
        "1".to_string(),                                                  // FURNISH
        "2".to_string(),                                                  // FACING
        "3".to_string(),                                                  // AGE
        bedrooms.to_string(),                                             // BEDROOM_NUM
        "1,2,3".to_string(),                                              // FEATURES
        "1,2,3,4".to_string(),                                            // AMENITIES
        "Skyline Towers".to_string(),                                     // PROP_NAME
        "2".to_string(),                                                  // BALCONY_NUM
        "4".to_string(),                                                  // FLOOR_NUM
        "{'latitude': '28.42', 'longitude': 77.09}".to_string(),          // MAP_DETAILS
        "{'locality_name': 'Sector 57', 'society_name': none}".to_string(), // location
        desc.to_string(),                                                 // DESCRIPTION
    ]
}

fn write_batch(dir: &TempDir, rows: &[Vec<String>]) -> PathBuf {
    let path = dir.path().join("batch.csv");
    let mut writer = csv::Writer::from_path(&path).unwrap();
    writer.write_record(IMPORTANT_INIT_COLS).unwrap();
    for row in rows {
        writer.write_record(row).unwrap();
    }
    writer.flush().unwrap();
    path
}

fn sample_batch(dir: &TempDir) -> PathBuf {
    write_batch(
        dir,
        &[
            batch_row("A1", "1.2 cr", "3", "Residential Apartment", "spacious 3bhk flat"),
            batch_row("A2", "85 l", "2", "Residential Apartment", "well lit 2bhk"),
            batch_row("A3", "2.1 cr", "4", "Residential Apartment", "corner flat"),
            batch_row("R1", "15000", "1", "Residential Apartment", "1bhk for rent in tower"),
            batch_row("H1", "95 l", "4", "Independent House/Villa", "villa with lawn"),
            batch_row("L1", "30 l", "", "Residential Land", "plot on main road"),
        ],
    )
}

fn clean_sample(dir: &TempDir) -> Vec<CleanedListing> {
    let path = sample_batch(dir);
    let (headers, raw) = load_batch(&path).unwrap();
    validate_dataset(&headers, &raw).unwrap();
    let facets = Facets::load().unwrap();
    DataCleaner::new(&facets).clean(&headers, raw).unwrap()
}

fn cleaned(id: &str, price: f64) -> CleanedListing {
    CleanedListing {
        prop_id: id.into(),
        city: Some("gurgaon".into()),
        price,
        area: Some(1250.0),
        property_type: Some("residential apartment".into()),
        furnish: Some("furnished".into()),
        facing: Some("east".into()),
        age: Some("1-5 year old property".into()),
        bedroom_num: Some(3.0),
        balcony_num: Some(2.0),
        floor_num: Some("mid rise".into()),
        locality_name: Some("sector 57".into()),
        luxury_category: 1,
        prop_heading: None,
        description: Some("3bhk flat".into()),
        prop_name: None,
        latitude: Some(28.42),
        longitude: Some(77.09),
        society_name: None,
    }
}

#[test]
fn batch_cleans_into_decoded_published_rows() {
    let dir = TempDir::new().unwrap();
    let rows = clean_sample(&dir);
    assert_eq!(rows.len(), 6);

    let a1 = rows.iter().find(|r| r.prop_id == "a1").unwrap();
    assert_eq!(a1.price, 12_000_000.0);
    assert_eq!(a1.area, Some(1250.0));
    assert_eq!(a1.furnish.as_deref(), Some("furnished"));
    assert_eq!(a1.facing.as_deref(), Some("east"));
    assert_eq!(a1.floor_num.as_deref(), Some("mid rise"));
    assert_eq!(a1.locality_name.as_deref(), Some("sector 57"));
    assert_eq!(a1.society_name, None);
    assert_eq!(a1.latitude, Some(28.42));
    assert_eq!(a1.longitude, Some(77.09));
    assert!((0..=2).contains(&a1.luxury_category));
}

/// One scraped v2 row: the base columns plus the four area-variant cells.
fn v2_row(
    id: &str,
    price: &str,
    builtup: &str,
    carpet: &str,
    superbuiltup: &str,
    super_sqft: &str,
) -> Vec<String> {
    let mut row = batch_row(id, price, "3", "Residential Apartment", "3bhk flat");
    row[3] = String::new(); // AREA arrives empty on these batches
    row.extend([
        builtup.to_string(),
        carpet.to_string(),
        superbuiltup.to_string(),
        super_sqft.to_string(),
    ]);
    row
}

#[test]
fn v2_batch_fills_area_from_the_variant_columns() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("batch_v2.csv");
    let mut writer = csv::Writer::from_path(&path).unwrap();
    let headers: Vec<&str> = IMPORTANT_INIT_COLS
        .iter()
        .chain(AREA_VARIANT_COLS.iter())
        .copied()
        .collect();
    writer.write_record(&headers).unwrap();
    // The first row is dropped by the price decoder; the estimator must
    // stay aligned with the surviving rows.
    let rows = [
        v2_row("X9", "price on request", "", "", "", "900"),
        v2_row("V0", "1.1 cr", "", "", "", "1450"),
        v2_row("V1", "1.2 cr", "1000", "400", "600", ""),
        v2_row("V2", "2.4 cr", "2000", "800", "1200", ""),
        v2_row("V3", "1.8 cr", "1500", "1000", "500", ""),
        v2_row("V4", "1.6 cr", "", "600", "900", ""),
    ];
    for row in &rows {
        writer.write_record(row).unwrap();
    }
    writer.flush().unwrap();

    let (headers, raw) = load_batch(&path).unwrap();
    validate_dataset(&headers, &raw).unwrap();
    let facets = Facets::load().unwrap();
    let cleaned = DataCleaner::new(&facets).clean(&headers, raw).unwrap();

    assert_eq!(cleaned.len(), 5);
    assert!(cleaned.iter().all(|r| r.prop_id != "x9"));
    let area_of = |id: &str| cleaned.iter().find(|r| r.prop_id == id).unwrap().area;
    // Direct super-area substitution.
    assert_eq!(area_of("v0"), Some(1450.0));
    // Present built-up values pass through untouched.
    assert_eq!(area_of("v1"), Some(1000.0));
    // Regression over [carpet, superbuiltup]: training rows define
    // builtup = carpet + superbuiltup exactly.
    assert_eq!(area_of("v4"), Some(1500.0));
}

#[test]
fn duplicate_ids_in_a_batch_keep_the_first_row() {
    let dir = TempDir::new().unwrap();
    let path = write_batch(
        &dir,
        &[
            batch_row("A1", "1.2 cr", "3", "Residential Apartment", "first"),
            batch_row("A1", "2.0 cr", "3", "Residential Apartment", "second"),
            batch_row("A2", "85 l", "2", "Residential Apartment", "other"),
            batch_row("A3", "95 l", "2", "Residential Apartment", "another"),
        ],
    );
    let (headers, raw) = load_batch(&path).unwrap();
    let facets = Facets::load().unwrap();
    let rows = DataCleaner::new(&facets).clean(&headers, raw).unwrap();
    assert_eq!(rows.len(), 3);
    let a1 = rows.iter().find(|r| r.prop_id == "a1").unwrap();
    assert_eq!(a1.price, 12_000_000.0);
}

#[test]
fn type_split_covers_every_classified_row_exactly_once() {
    let dir = TempDir::new().unwrap();
    let rows = clean_sample(&dir);

    let split_total: usize = ALL_PROPERTY.iter().map(|k| k.extract(&rows).len()).sum();
    assert_eq!(split_total, rows.len());

    let rent = PropertyKind::by_alias("rent_apartment").unwrap().extract(&rows);
    assert_eq!(rent.len(), 1);
    assert_eq!(rent[0].prop_id, "r1");
}

#[test]
fn ingested_datasets_read_back_with_canonical_ids() {
    let dir = TempDir::new().unwrap();
    let db = make_db(&dir);
    let rows = clean_sample(&dir);

    datasets::upsert_cleaned(&db, DatasetKind::Main, &rows).unwrap();
    for kind in &ALL_PROPERTY {
        let slice = kind.extract(&rows);
        datasets::dump_property_dataset(&db, DatasetKind::Main, kind, &slice, true).unwrap();
    }

    let stored = datasets::get_cleaned(&db, DatasetKind::Main).unwrap();
    assert_eq!(stored.len(), 6);

    let apartments = datasets::get_property_dataset(
        &db,
        DatasetKind::Main,
        PropertyKind::by_alias("res_apartment").unwrap(),
    )
    .unwrap();
    assert_eq!(apartments.len(), 3);
    assert!(apartments
        .iter()
        .all(|r| r.prop_id.starts_with("https://99acres.com/")));
    assert!(apartments.iter().any(|r| r.prop_id.ends_with("/A1")));
}

#[test]
fn reingesting_an_id_overwrites_the_stored_row() {
    let dir = TempDir::new().unwrap();
    let db = make_db(&dir);

    datasets::upsert_cleaned(&db, DatasetKind::Main, &[cleaned("a1", 5_000_000.0)]).unwrap();
    datasets::upsert_cleaned(&db, DatasetKind::Main, &[cleaned("a1", 6_500_000.0)]).unwrap();

    let stored = datasets::get_cleaned(&db, DatasetKind::Main).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].price, 6_500_000.0);
}

#[test]
fn replace_swaps_the_stored_slice_extend_merges_into_it() {
    let dir = TempDir::new().unwrap();
    let db = make_db(&dir);
    let kind = PropertyKind::by_alias("res_apartment").unwrap();

    datasets::dump_property_dataset(&db, DatasetKind::Main, kind, &[cleaned("a1", 5e6)], true)
        .unwrap();
    datasets::dump_property_dataset(&db, DatasetKind::Main, kind, &[cleaned("a2", 7e6)], true)
        .unwrap();
    let merged = datasets::get_property_dataset(&db, DatasetKind::Main, kind).unwrap();
    assert_eq!(merged.len(), 2);

    datasets::dump_property_dataset(&db, DatasetKind::Main, kind, &[cleaned("a3", 8e6)], false)
        .unwrap();
    let replaced = datasets::get_property_dataset(&db, DatasetKind::Main, kind).unwrap();
    assert_eq!(replaced.len(), 1);
    assert!(replaced[0].prop_id.ends_with("/A3"));
}

#[test]
fn partitions_do_not_leak_into_each_other() {
    let dir = TempDir::new().unwrap();
    let db = make_db(&dir);

    datasets::upsert_cleaned(&db, DatasetKind::User, &[cleaned("a1", 5e6)]).unwrap();
    assert!(datasets::get_cleaned(&db, DatasetKind::Main).unwrap().is_empty());
    assert_eq!(datasets::get_cleaned(&db, DatasetKind::User).unwrap().len(), 1);
}

#[test]
fn summary_reports_counts_and_means_per_type() {
    let dir = TempDir::new().unwrap();
    let db = make_db(&dir);
    let kind = PropertyKind::by_alias("res_apartment").unwrap();

    datasets::dump_property_dataset(
        &db,
        DatasetKind::Main,
        kind,
        &[cleaned("a1", 4e6), cleaned("a2", 6e6)],
        true,
    )
    .unwrap();

    let summary = datasets::summarize_property_datasets(&db, DatasetKind::Main).unwrap();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].prop_type, "res_apartment");
    assert_eq!(summary[0].rows, 2);
    assert_eq!(summary[0].mean_price, Some(5e6));
}

#[test]
fn batch_missing_a_mandatory_column_never_reaches_cleaning() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.csv");
    let mut writer = csv::Writer::from_path(&path).unwrap();
    // Header without DESCRIPTION.
    writer
        .write_record(IMPORTANT_INIT_COLS.iter().filter(|c| **c != "DESCRIPTION"))
        .unwrap();
    let row = batch_row("A1", "1.2 cr", "3", "Residential Apartment", "flat");
    writer.write_record(&row[..row.len() - 1]).unwrap();
    writer.flush().unwrap();

    let (headers, raw) = load_batch(&path).unwrap();
    assert!(validate_dataset(&headers, &raw).is_err());
}
