use serde::{Deserialize, Serialize};

/// Columns every uploaded batch must carry. Batches may carry more (the
/// area-variant columns ride along on newer scrapes).
pub const IMPORTANT_INIT_COLS: [&str; 20] = [
    "PROP_ID",
    "CITY",
    "PRICE",
    "AREA",
    "TOTAL_LANDMARK_COUNT",
    "FORMATTED_LANDMARK_DETAILS",
    "PROP_HEADING",
    "PROPERTY_TYPE",
    "FURNISH",
    "FACING",
    "AGE",
    "BEDROOM_NUM",
    "FEATURES",
    "AMENITIES",
    "PROP_NAME",
    "BALCONY_NUM",
    "FLOOR_NUM",
    "MAP_DETAILS",
    "location",
    "DESCRIPTION",
];

/// Columns of the cleaned dataset, in published order. The cleaner must emit
/// exactly this set, no more, no fewer.
pub const REQUIRED_COLS: [&str; 19] = [
    "PROP_ID",
    "CITY",
    "PRICE",
    "AREA",
    "PROPERTY_TYPE",
    "FURNISH",
    "FACING",
    "AGE",
    "BEDROOM_NUM",
    "BALCONY_NUM",
    "FLOOR_NUM",
    "LOCALITY_NAME",
    "LUXURY_CATEGORY",
    "PROP_HEADING",
    "DESCRIPTION",
    "PROP_NAME",
    "LATITUDE",
    "LONGITUDE",
    "SOCIETY_NAME",
];

/// Alternate area measurements present only on newer batches. When all four
/// exist in the header, the area estimator replaces the plain area decoder.
pub const AREA_VARIANT_COLS: [&str; 4] = [
    "BUILTUP_SQFT",
    "CARPET_SQFT",
    "SUPERBUILTUP_SQFT",
    "SUPER_SQFT",
];

/// Property-type labels dropped outright during structural cleanup.
pub const DISALLOWED_PROPERTY_TYPES: [&str; 4] = [
    "studio apartment",
    "farm house",
    "serviced apartments",
    "other",
];

/// Counts above these stay capped with the 99 "more than max" sentinel.
pub const MAX_BEDROOMS: f64 = 5.0;
pub const MAX_BALCONIES: f64 = 4.0;
pub const MORE_THAN_MAX: f64 = 99.0;

/// One row of an uploaded batch, exactly as scraped. Everything except the
/// id is kept as loose text; decoding happens downstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawListing {
    #[serde(rename = "PROP_ID")]
    pub prop_id: String,
    #[serde(rename = "CITY", default)]
    pub city: Option<String>,
    #[serde(rename = "PRICE", default)]
    pub price: Option<String>,
    #[serde(rename = "AREA", default)]
    pub area: Option<String>,
    #[serde(rename = "TOTAL_LANDMARK_COUNT", default)]
    pub total_landmark_count: Option<String>,
    #[serde(rename = "FORMATTED_LANDMARK_DETAILS", default)]
    pub formatted_landmark_details: Option<String>,
    #[serde(rename = "PROP_HEADING", default)]
    pub prop_heading: Option<String>,
    #[serde(rename = "PROPERTY_TYPE", default)]
    pub property_type: Option<String>,
    #[serde(rename = "FURNISH", default)]
    pub furnish: Option<String>,
    #[serde(rename = "FACING", default)]
    pub facing: Option<String>,
    #[serde(rename = "AGE", default)]
    pub age: Option<String>,
    #[serde(rename = "BEDROOM_NUM", default)]
    pub bedroom_num: Option<String>,
    #[serde(rename = "FEATURES", default)]
    pub features: Option<String>,
    #[serde(rename = "AMENITIES", default)]
    pub amenities: Option<String>,
    #[serde(rename = "PROP_NAME", default)]
    pub prop_name: Option<String>,
    #[serde(rename = "BALCONY_NUM", default)]
    pub balcony_num: Option<String>,
    #[serde(rename = "FLOOR_NUM", default)]
    pub floor_num: Option<String>,
    #[serde(rename = "MAP_DETAILS", default)]
    pub map_details: Option<String>,
    #[serde(rename = "location", default)]
    pub location: Option<String>,
    #[serde(rename = "DESCRIPTION", default)]
    pub description: Option<String>,

    // Area variants; absent on v1 batches.
    #[serde(rename = "BUILTUP_SQFT", default)]
    pub builtup_sqft: Option<String>,
    #[serde(rename = "CARPET_SQFT", default)]
    pub carpet_sqft: Option<String>,
    #[serde(rename = "SUPERBUILTUP_SQFT", default)]
    pub superbuiltup_sqft: Option<String>,
    #[serde(rename = "SUPER_SQFT", default)]
    pub super_sqft: Option<String>,
}

/// Per-category landmark counts produced by the landmark decoder.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LandmarkCounts {
    pub transportation: Option<f64>,
    pub accommodation: Option<f64>,
    pub leisure: Option<f64>,
    pub education: Option<f64>,
    pub health: Option<f64>,
    pub other: Option<f64>,
}

/// The cleaner's in-memory workspace row: raw cells alongside the decoded
/// values the column decoders progressively fill in.
#[derive(Debug, Clone, Default)]
pub struct WorkingListing {
    pub prop_id: String,
    pub city: Option<String>,

    pub price_raw: Option<String>,
    pub price: Option<f64>,

    pub area_raw: Option<String>,
    pub area: Option<f64>,

    pub total_landmark_count: Option<f64>,
    pub landmark_details_raw: Option<String>,
    pub landmarks: LandmarkCounts,

    pub prop_heading: Option<String>,
    pub property_type: Option<String>,

    // Category-coded cells; the decoders swap codes for labels in place.
    pub furnish: Option<String>,
    pub facing: Option<String>,
    pub age: Option<String>,

    pub bedroom_num: Option<f64>,
    pub balcony_num: Option<f64>,
    pub floor_num: Option<String>,

    pub features_raw: Option<String>,
    pub features_score: Option<f64>,
    pub amenities_raw: Option<String>,
    pub amenities_score: Option<f64>,

    pub prop_name: Option<String>,

    pub map_details_raw: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub location_raw: Option<String>,
    pub locality_name: Option<String>,
    pub society_name: Option<String>,

    pub description: Option<String>,
    pub luxury_category: Option<i64>,

    pub builtup_sqft: Option<f64>,
    pub carpet_sqft: Option<f64>,
    pub superbuiltup_sqft: Option<f64>,
    pub super_sqft: Option<f64>,
}

impl WorkingListing {
    /// Builds the workspace row, lower-casing every governed string cell up
    /// front and parsing the numeric-by-construction cells.
    pub fn from_raw(raw: RawListing) -> Self {
        Self {
            prop_id: raw.prop_id.to_lowercase(),
            city: lower(raw.city),
            price_raw: lower(raw.price),
            price: None,
            area_raw: lower(raw.area),
            area: None,
            total_landmark_count: parse_float(raw.total_landmark_count.as_deref()),
            landmark_details_raw: lower(raw.formatted_landmark_details),
            landmarks: LandmarkCounts::default(),
            prop_heading: lower(raw.prop_heading),
            property_type: lower(raw.property_type),
            furnish: lower(raw.furnish),
            facing: lower(raw.facing),
            age: lower(raw.age),
            bedroom_num: parse_float(raw.bedroom_num.as_deref()),
            balcony_num: parse_float(raw.balcony_num.as_deref()),
            floor_num: lower(raw.floor_num),
            features_raw: lower(raw.features),
            features_score: None,
            amenities_raw: lower(raw.amenities),
            amenities_score: None,
            prop_name: lower(raw.prop_name),
            map_details_raw: lower(raw.map_details),
            latitude: None,
            longitude: None,
            location_raw: lower(raw.location),
            locality_name: None,
            society_name: None,
            description: lower(raw.description),
            luxury_category: None,
            builtup_sqft: parse_float(raw.builtup_sqft.as_deref()),
            carpet_sqft: parse_float(raw.carpet_sqft.as_deref()),
            superbuiltup_sqft: parse_float(raw.superbuiltup_sqft.as_deref()),
            super_sqft: parse_float(raw.super_sqft.as_deref()),
        }
    }
}

/// A fully cleaned listing. Field order mirrors `REQUIRED_COLS`, which is
/// also the column order of every export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedListing {
    #[serde(rename = "PROP_ID")]
    pub prop_id: String,
    #[serde(rename = "CITY")]
    pub city: Option<String>,
    #[serde(rename = "PRICE")]
    pub price: f64,
    #[serde(rename = "AREA")]
    pub area: Option<f64>,
    #[serde(rename = "PROPERTY_TYPE")]
    pub property_type: Option<String>,
    #[serde(rename = "FURNISH")]
    pub furnish: Option<String>,
    #[serde(rename = "FACING")]
    pub facing: Option<String>,
    #[serde(rename = "AGE")]
    pub age: Option<String>,
    #[serde(rename = "BEDROOM_NUM")]
    pub bedroom_num: Option<f64>,
    #[serde(rename = "BALCONY_NUM")]
    pub balcony_num: Option<f64>,
    #[serde(rename = "FLOOR_NUM")]
    pub floor_num: Option<String>,
    #[serde(rename = "LOCALITY_NAME")]
    pub locality_name: Option<String>,
    #[serde(rename = "LUXURY_CATEGORY")]
    pub luxury_category: i64,
    #[serde(rename = "PROP_HEADING")]
    pub prop_heading: Option<String>,
    #[serde(rename = "DESCRIPTION")]
    pub description: Option<String>,
    #[serde(rename = "PROP_NAME")]
    pub prop_name: Option<String>,
    #[serde(rename = "LATITUDE")]
    pub latitude: Option<f64>,
    #[serde(rename = "LONGITUDE")]
    pub longitude: Option<f64>,
    #[serde(rename = "SOCIETY_NAME")]
    pub society_name: Option<String>,
}

impl CleanedListing {
    /// Column names in emit order. Kept next to the struct so the invariant
    /// check against `REQUIRED_COLS` stays meaningful if fields move.
    pub const COLUMNS: [&'static str; 19] = [
        "PROP_ID",
        "CITY",
        "PRICE",
        "AREA",
        "PROPERTY_TYPE",
        "FURNISH",
        "FACING",
        "AGE",
        "BEDROOM_NUM",
        "BALCONY_NUM",
        "FLOOR_NUM",
        "LOCALITY_NAME",
        "LUXURY_CATEGORY",
        "PROP_HEADING",
        "DESCRIPTION",
        "PROP_NAME",
        "LATITUDE",
        "LONGITUDE",
        "SOCIETY_NAME",
    ];
}

fn lower(v: Option<String>) -> Option<String> {
    v.map(|s| s.to_lowercase())
}

/// Lenient float parse: scraped numerics arrive as "3", "3.0" or garbage.
pub fn parse_float(v: Option<&str>) -> Option<f64> {
    v.and_then(|s| s.trim().parse::<f64>().ok())
}

/// Parse an integer lookup code; "2.0" style cells round to 2.
pub fn parse_code(v: &str) -> Option<i64> {
    v.trim().parse::<f64>().ok().map(|f| f.round() as i64)
}
