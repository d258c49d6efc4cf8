//! Bundled reference lookup tables ("facets"): integer code → label maps for
//! the category-coded columns, importance weights for features/amenities,
//! landmark keyword groups, and the price-unit multipliers.

use std::collections::HashMap;

use crate::errors::{PipelineError, Result};

// Price units as quoted by the source market.
pub const LAKH: f64 = 1_00_000.0;
pub const CRORE: f64 = 1_00_00_000.0;

/// Importance weight per feature label, used to collapse a feature list into
/// one richness score.
pub const FEATURES_WEIGHTS: [(&str, f64); 14] = [
    ("Parking", 5.0),
    ("Park", 7.0),
    ("Power Backup", 9.0),
    ("Lift", 8.0),
    ("Gymnasium", 8.0),
    ("Club house", 7.0),
    ("Waste disposal", 5.0),
    ("Swimming Pool", 8.0),
    ("Security Personnel", 9.0),
    ("Gas Pipeline", 6.0),
    ("Near bank", 5.0),
    ("DG Availability", 7.0),
    ("Wheelchair Accessibility", 4.0),
    ("ATM", 6.0),
];

pub const AMENITIES_WEIGHTS: [(&str, f64); 33] = [
    ("Waste Disposal", 5.0),
    ("Rain Water Harvesting", 7.0),
    ("Bank Attached Property", 3.0),
    ("Power Back-up", 9.0),
    ("Feng Shui / Vaastu Compliant", 6.0),
    ("Private Garden / Terrace", 8.0),
    ("Centrally Air Conditioned", 9.0),
    ("Security / Fire Alarm", 9.0),
    ("Intercom Facility", 7.0),
    ("Water Storage", 6.0),
    ("Piped-gas", 4.0),
    ("Water purifier", 6.0),
    ("Near Bank", 5.0),
    ("Swimming Pool", 8.0),
    ("Club house / Community Center", 7.0),
    ("Park", 8.0),
    ("Security Personnel", 9.0),
    ("Fitness Centre / GYM", 8.0),
    ("Visitor Parking", 6.0),
    ("Lift(s)", 8.0),
    ("Maintenance Staff", 5.0),
    ("Shopping Centre", 7.0),
    ("WheelChair Accessibilitiy", 4.0),
    ("DG Availability", 7.0),
    ("CCTV Surveillance", 9.0),
    ("Grade A Building", 7.0),
    ("Grocery Shop", 5.0),
    ("ATM", 6.0),
    ("Cafeteria / Food Court", 6.0),
    ("Bar / Lounge", 7.0),
    ("Conference room", 6.0),
    ("Service / Goods Lift", 6.0),
    ("Access to High Speed Internet", 8.0),
];

/// Keyword groups used to bucket free-text landmark descriptions. Order is
/// fixed; it is also the column order of the derived landmark counts.
pub const LANDMARK_GROUPS: [(&str, &[&str]); 6] = [
    ("TRANSPORTATION", &["station", "bus", "airport"]),
    ("ACCOMMODATION", &["hotel", "office", "atm", "bank"]),
    ("OTHER", &["religious", "connect", "miscellaneou", "parking"]),
    (
        "LEISURE",
        &[
            "shop",
            "mall",
            "park",
            "stadium",
            "club",
            "pool",
            "attraction",
            "golf",
        ],
    ),
    ("EDUCATION", &["education", "library"]),
    ("HEALTH", &["hospital", "pharmacy"]),
];

const AGE_CSV: &str = include_str!("../data/facets/AGE.csv");
const FURNISH_CSV: &str = include_str!("../data/facets/FURNISH.csv");
const FACING_CSV: &str = include_str!("../data/facets/FACING_DIRECTION.csv");
const FEATURES_CSV: &str = include_str!("../data/facets/FEATURES.csv");
const AMENITIES_CSV: &str = include_str!("../data/facets/AMENITIES.csv");

/// All lookup tables, loaded once at startup and passed by reference to the
/// components that decode against them.
#[derive(Debug, Clone)]
pub struct Facets {
    pub age: HashMap<i64, String>,
    pub furnish: HashMap<i64, String>,
    pub facing: HashMap<i64, String>,
    pub features_weight: HashMap<i64, f64>,
    pub amenities_weight: HashMap<i64, f64>,
}

impl Facets {
    pub fn load() -> Result<Self> {
        Ok(Self {
            age: load_labels(AGE_CSV)?,
            furnish: load_labels(FURNISH_CSV)?,
            facing: load_labels(FACING_CSV)?,
            features_weight: load_weights(FEATURES_CSV, &FEATURES_WEIGHTS)?,
            amenities_weight: load_weights(AMENITIES_CSV, &AMENITIES_WEIGHTS)?,
        })
    }
}

#[derive(serde::Deserialize)]
struct FacetRow {
    id: i64,
    label: String,
}

/// id → label. Labels are lower-cased on load; the whole pipeline works in
/// lower case.
fn load_labels(raw: &str) -> Result<HashMap<i64, String>> {
    let mut reader = csv::Reader::from_reader(raw.as_bytes());
    let mut out = HashMap::new();
    for row in reader.deserialize::<FacetRow>() {
        let row = row?;
        out.insert(row.id, row.label.to_lowercase());
    }
    if out.is_empty() {
        return Err(PipelineError::Validation("empty facet table".into()));
    }
    Ok(out)
}

/// id → importance weight, joining the facet's id → label table against the
/// static label → weight map. Labels without a weight are skipped and score
/// as unknown (0) during decoding.
fn load_weights(raw: &str, weights: &[(&str, f64)]) -> Result<HashMap<i64, f64>> {
    let mut reader = csv::Reader::from_reader(raw.as_bytes());
    let mut out = HashMap::new();
    for row in reader.deserialize::<FacetRow>() {
        let row = row?;
        if let Some((_, w)) = weights.iter().find(|(label, _)| *label == row.label) {
            out.insert(row.id, *w);
        }
    }
    if out.is_empty() {
        return Err(PipelineError::Validation("empty facet weight table".into()));
    }
    Ok(out)
}
