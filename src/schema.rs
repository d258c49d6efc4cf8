//! Per property-type column governance, read once from the bundled schema
//! document and handed around by reference.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::{PipelineError, Result};

const SCHEMA_JSON: &str = include_str!("../data/schema.json");

/// Category value orderings for the ordinal columns, smallest first. The
/// training side encodes ordinals against exactly these sequences.
pub const ORD_CATEGORIES: [(&str, &[&str]); 6] = [
    ("FURNISH", &["unfurnished", "semifurnished", "furnished"]),
    (
        "AGE",
        &[
            "10+ year old property",
            "5-10 year old property",
            "1-5 year old property",
            "0-1 year old property",
            "under construction",
        ],
    ),
    ("BEDROOM_NUM", &["1", "2", "3", "4", "5", "99"]),
    ("BALCONY_NUM", &["0", "1", "2", "3", "4", "99"]),
    ("FLOOR_NUM", &["low rise", "mid rise", "high rise"]),
    ("LUXURY_CATEGORY", &["0", "1", "2"]),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatCols {
    pub ord_cols: Vec<String>,
    pub ohe_cols: Vec<String>,
}

/// One property type's column contract: the supervised target, the full
/// model column set, and the numeric / ordinal / one-hot split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySchema {
    pub target: String,
    pub all_cols: Vec<String>,
    pub num_cols: Vec<String>,
    pub cat_cols: CatCols,
}

/// Registry of all property-type schemas. Constructed once at process start
/// and injected where needed; logically immutable afterwards.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<String, PropertySchema>,
}

impl SchemaRegistry {
    pub fn load() -> Result<Self> {
        let schemas: HashMap<String, PropertySchema> = serde_json::from_str(SCHEMA_JSON)?;
        Ok(Self { schemas })
    }

    pub fn get(&self, alias: &str) -> Result<&PropertySchema> {
        self.schemas.get(alias).ok_or_else(|| {
            PipelineError::Validation(format!("unknown property type alias: {alias}"))
        })
    }

    pub fn aliases(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        out.sort_unstable();
        out
    }

    pub fn ord_categories(col: &str) -> Option<&'static [&'static str]> {
        ORD_CATEGORIES
            .iter()
            .find(|(name, _)| *name == col)
            .map(|(_, cats)| *cats)
    }
}
