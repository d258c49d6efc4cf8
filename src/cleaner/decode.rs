//! Per-column decoders turning raw scraped cells into normalized values.
//!
//! Decoders are registered as an explicit ordered list of (name, fn) pairs.
//! The two row-dropping decoders (price, area) run first so every later
//! decoder only ever sees rows that survive filtering; the remaining
//! decoders are independent of each other and keep their registration
//! order for determinism.

use std::collections::HashMap;

use crate::domain::listing::{
    parse_code, WorkingListing, MAX_BALCONIES, MAX_BEDROOMS, MORE_THAN_MAX,
};
use crate::facets::{Facets, CRORE, LAKH, LANDMARK_GROUPS};

pub type DecodeFn = fn(&mut Vec<WorkingListing>, &Facets);

pub struct ColumnDecoder<'f> {
    facets: &'f Facets,
    decoders: Vec<(&'static str, DecodeFn)>,
}

impl<'f> ColumnDecoder<'f> {
    pub fn new(facets: &'f Facets) -> Self {
        let decoders: Vec<(&'static str, DecodeFn)> = vec![
            ("decode_price", decode_price),
            ("decode_area", decode_area),
            ("decode_features", decode_features),
            ("decode_amenities", decode_amenities),
            ("decode_landmark_details", decode_landmark_details),
            ("decode_bedroom_num", decode_bedroom_num),
            ("decode_balcony_num", decode_balcony_num),
            ("decode_floor_num", decode_floor_num),
            ("decode_age", decode_age),
            ("decode_furnish", decode_furnish),
            ("decode_facing", decode_facing),
        ];
        Self { facets, decoders }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.decoders.iter().map(|(name, _)| *name).collect()
    }

    /// Applies every registered decoder not named in `skip`, in registration
    /// order.
    pub fn run_all(&self, rows: &mut Vec<WorkingListing>, skip: &[&str]) {
        for (name, decode) in &self.decoders {
            if skip.contains(name) {
                continue;
            }
            let before = rows.len();
            decode(rows, self.facets);
            let dropped = before - rows.len();
            if dropped > 0 {
                tracing::debug!(decoder = name, dropped, "decoder filtered rows");
            }
        }
    }
}

/// Normalize the asking price to absolute currency units. Rows whose price
/// text is non-numeric or ambiguous (per-bed rates, "price on request",
/// ranges, "onwards") are filtered out, never imputed.
fn decode_price(rows: &mut Vec<WorkingListing>, _facets: &Facets) {
    rows.retain_mut(|row| {
        let raw = match &row.price_raw {
            Some(raw) => raw.replace(',', ""),
            None => return true,
        };
        if raw.contains("bed")
            || raw.contains("request")
            || raw.contains('-')
            || raw.contains("onwards")
        {
            return false;
        }

        let value = if raw.contains(" cr") {
            first_token(&raw).map(|v| round2(v * CRORE))
        } else if raw.contains(" l") {
            first_token(&raw).map(|v| round2(v * LAKH))
        } else {
            raw.trim().parse::<f64>().ok()
        };

        match value {
            Some(v) => {
                row.price = Some(v);
                true
            }
            None => false,
        }
    });
}

/// Parse the area text into square feet. Values without the sq.ft. unit
/// marker or carrying a range dash are dropped; wholly missing cells
/// survive for the estimator / imputation stages.
fn decode_area(rows: &mut Vec<WorkingListing>, _facets: &Facets) {
    rows.retain_mut(|row| {
        let raw = match &row.area_raw {
            Some(raw) => raw,
            None => return true,
        };
        if !raw.contains("sq.ft.") || raw.contains('-') {
            return false;
        }
        row.area = first_token(raw);
        true
    });
}

fn decode_features(rows: &mut Vec<WorkingListing>, facets: &Facets) {
    for row in rows.iter_mut() {
        row.features_score = score_tokens(row.features_raw.as_deref(), &facets.features_weight);
    }
}

fn decode_amenities(rows: &mut Vec<WorkingListing>, facets: &Facets) {
    for row in rows.iter_mut() {
        row.amenities_score = score_tokens(row.amenities_raw.as_deref(), &facets.amenities_weight);
    }
}

/// Aggregate the nested landmark list into one count per landmark category.
/// Each entry's free text starts with a count ("3 hospitals nearby"); the
/// count is added to every category whose keyword matches the text.
fn decode_landmark_details(rows: &mut Vec<WorkingListing>, _facets: &Facets) {
    for row in rows.iter_mut() {
        let texts = landmark_texts(row.landmark_details_raw.as_deref());

        for (group, keywords) in LANDMARK_GROUPS {
            let mut count = 0.0;
            for text in &texts {
                let leading = first_token(text).unwrap_or(0.0).trunc();
                for keyword in keywords {
                    if text.contains(keyword) {
                        count += leading;
                    }
                }
            }
            match group {
                "TRANSPORTATION" => row.landmarks.transportation = Some(count),
                "ACCOMMODATION" => row.landmarks.accommodation = Some(count),
                "LEISURE" => row.landmarks.leisure = Some(count),
                "EDUCATION" => row.landmarks.education = Some(count),
                "HEALTH" => row.landmarks.health = Some(count),
                "OTHER" => row.landmarks.other = Some(count),
                _ => unreachable!("unknown landmark group"),
            }
        }
    }
}

fn decode_bedroom_num(rows: &mut Vec<WorkingListing>, _facets: &Facets) {
    for row in rows.iter_mut() {
        if let Some(n) = row.bedroom_num {
            row.bedroom_num = Some(if n <= MAX_BEDROOMS { n } else { MORE_THAN_MAX });
        }
    }
}

fn decode_balcony_num(rows: &mut Vec<WorkingListing>, _facets: &Facets) {
    for row in rows.iter_mut() {
        if let Some(n) = row.balcony_num {
            row.balcony_num = Some(if n <= MAX_BALCONIES { n } else { MORE_THAN_MAX });
        }
    }
}

/// Bucket floor codes into rise categories. Ground / lower / basement /
/// mezzanine codes are low rise; unrecognized tokens become missing and are
/// imputed later, not here.
fn decode_floor_num(rows: &mut Vec<WorkingListing>, _facets: &Facets) {
    const RISE_BUCKETS: [&str; 3] = ["low rise", "mid rise", "high rise"];

    for row in rows.iter_mut() {
        let raw = match &row.floor_num {
            Some(raw) => raw.trim(),
            None => continue,
        };
        // Idempotent: an already-bucketed value stays as is.
        if RISE_BUCKETS.contains(&raw) {
            continue;
        }
        row.floor_num = if let Some(n) = parse_code(raw) {
            Some(
                match n {
                    1..=3 => "low rise",
                    4..=10 => "mid rise",
                    _ => "high rise",
                }
                .to_string(),
            )
        } else if matches!(raw, "g" | "l" | "b" | "m") {
            Some("low rise".to_string())
        } else {
            None
        };
    }
}

fn decode_age(rows: &mut Vec<WorkingListing>, facets: &Facets) {
    for row in rows.iter_mut() {
        row.age = map_category(row.age.take(), &facets.age);
    }
}

fn decode_furnish(rows: &mut Vec<WorkingListing>, facets: &Facets) {
    for row in rows.iter_mut() {
        row.furnish = map_category(row.furnish.take(), &facets.furnish);
    }
}

fn decode_facing(rows: &mut Vec<WorkingListing>, facets: &Facets) {
    for row in rows.iter_mut() {
        row.facing = map_category(row.facing.take(), &facets.facing);
    }
}

/// Numeric code → label through a facet table. Unmapped codes become
/// missing; a value that already is a label passes through unchanged.
fn map_category(value: Option<String>, table: &HashMap<i64, String>) -> Option<String> {
    let value = value?;
    if table.values().any(|label| *label == value) {
        return Some(value);
    }
    parse_code(&value).and_then(|id| table.get(&id).cloned())
}

/// Reduce a comma-delimited list of facet ids to a single richness score.
/// A cell with no delimiter is a one-element list; unknown ids weigh 0.
/// Each decoder runs exactly once per batch, so the scores are never fed
/// back through here.
fn score_tokens(raw: Option<&str>, weights: &HashMap<i64, f64>) -> Option<f64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sum = 0.0;
    for token in raw.split(',') {
        let token = token.trim_matches(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'));
        if let Some(id) = parse_code(token) {
            sum += weights.get(&id).copied().unwrap_or(0.0);
        }
    }
    Some(sum)
}

/// Extract each landmark's free-text description from the pseudo-JSON list.
/// A missing or malformed payload counts as no landmarks.
fn landmark_texts(raw: Option<&str>) -> Vec<String> {
    let parsed = match raw.and_then(super::pseudo_json::parse) {
        Some(value) => value,
        None => return Vec::new(),
    };
    parsed
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|e| e.get("text").and_then(|t| t.as_str()).map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn first_token(s: &str) -> Option<f64> {
    s.split_whitespace().next().and_then(|t| t.parse::<f64>().ok())
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(f: impl FnOnce(&mut WorkingListing)) -> WorkingListing {
        let mut r = WorkingListing {
            prop_id: "x1".into(),
            ..Default::default()
        };
        f(&mut r);
        r
    }

    fn facets() -> Facets {
        Facets::load().unwrap()
    }

    #[test]
    fn price_converts_crore_and_lakh() {
        let facets = facets();
        let mut rows = vec![
            row(|r| r.price_raw = Some("1.5 cr".into())),
            row(|r| r.price_raw = Some("45 l".into())),
            row(|r| r.price_raw = Some("12,50,000".into())),
        ];
        decode_price(&mut rows, &facets);
        assert_eq!(rows[0].price, Some(15_000_000.0));
        assert_eq!(rows[1].price, Some(4_500_000.0));
        assert_eq!(rows[2].price, Some(1_250_000.0));
    }

    #[test]
    fn price_drops_disqualified_rows() {
        let facets = facets();
        let mut rows = vec![
            row(|r| r.price_raw = Some("price on request".into())),
            row(|r| r.price_raw = Some("1.2 - 1.5 cr".into())),
            row(|r| r.price_raw = Some("45 l onwards".into())),
            row(|r| r.price_raw = Some("5,000/bed".into())),
            row(|r| r.price_raw = Some("75 l".into())),
        ];
        decode_price(&mut rows, &facets);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].price, Some(7_500_000.0));
    }

    #[test]
    fn price_is_not_double_converted() {
        // An already-decoded absolute value has no unit marker and parses
        // straight through.
        let facets = facets();
        let mut rows = vec![row(|r| r.price_raw = Some("15000000.0".into()))];
        decode_price(&mut rows, &facets);
        assert_eq!(rows[0].price, Some(15_000_000.0));
    }

    #[test]
    fn area_requires_sqft_unit_and_no_range() {
        let facets = facets();
        let mut rows = vec![
            row(|r| r.area_raw = Some("1200 sq.ft.".into())),
            row(|r| r.area_raw = Some("1200-1500 sq.ft.".into())),
            row(|r| r.area_raw = Some("150 sq.yards".into())),
            row(|r| r.area_raw = None),
        ];
        decode_area(&mut rows, &facets);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].area, Some(1200.0));
        // the unit-less missing cell survives untouched
        assert_eq!(rows[1].area, None);
    }

    #[test]
    fn bedroom_count_above_max_becomes_sentinel() {
        let facets = facets();
        let mut rows = vec![
            row(|r| r.bedroom_num = Some(7.0)),
            row(|r| r.bedroom_num = Some(3.0)),
            row(|r| r.balcony_num = Some(6.0)),
        ];
        decode_bedroom_num(&mut rows, &facets);
        decode_balcony_num(&mut rows, &facets);
        assert_eq!(rows[0].bedroom_num, Some(99.0));
        assert_eq!(rows[1].bedroom_num, Some(3.0));
        assert_eq!(rows[2].balcony_num, Some(99.0));
    }

    #[test]
    fn floor_codes_bucket_into_rises() {
        let facets = facets();
        let mut rows = vec![
            row(|r| r.floor_num = Some("g".into())),
            row(|r| r.floor_num = Some("2".into())),
            row(|r| r.floor_num = Some("7".into())),
            row(|r| r.floor_num = Some("14".into())),
            row(|r| r.floor_num = Some("penthouse".into())),
            row(|r| r.floor_num = None),
        ];
        decode_floor_num(&mut rows, &facets);
        assert_eq!(rows[0].floor_num.as_deref(), Some("low rise"));
        assert_eq!(rows[1].floor_num.as_deref(), Some("low rise"));
        assert_eq!(rows[2].floor_num.as_deref(), Some("mid rise"));
        assert_eq!(rows[3].floor_num.as_deref(), Some("high rise"));
        assert_eq!(rows[4].floor_num, None);
        assert_eq!(rows[5].floor_num, None);
    }

    #[test]
    fn category_codes_map_to_labels() {
        let facets = facets();
        let mut rows = vec![
            row(|r| {
                r.furnish = Some("3.0".into());
                r.age = Some("5".into());
                r.facing = Some("2".into());
            }),
            row(|r| r.furnish = Some("47".into())), // unmapped code
            row(|r| r.furnish = Some("furnished".into())), // already decoded
        ];
        decode_furnish(&mut rows, &facets);
        decode_age(&mut rows, &facets);
        decode_facing(&mut rows, &facets);
        assert_eq!(rows[0].furnish.as_deref(), Some("unfurnished"));
        assert_eq!(rows[0].age.as_deref(), Some("10+ year old property"));
        assert_eq!(rows[0].facing.as_deref(), Some("east"));
        assert_eq!(rows[1].furnish, None);
        assert_eq!(rows[2].furnish.as_deref(), Some("furnished"));
    }

    #[test]
    fn feature_lists_reduce_to_scores() {
        let facets = facets();
        // Parking (5) + Lift (8) + unknown id -> 13
        let mut rows = vec![
            row(|r| r.features_raw = Some("1,4,250".into())),
            row(|r| r.features_raw = None),
        ];
        decode_features(&mut rows, &facets);
        assert_eq!(rows[0].features_score, Some(13.0));
        assert_eq!(rows[1].features_score, None);
    }

    #[test]
    fn single_feature_cell_scores_through_the_table() {
        // A one-element list carries a facet id, not a precomputed score:
        // FEATURES id 4 is Lift, weight 8.
        let facets = facets();
        let mut rows = vec![
            row(|r| r.features_raw = Some("4".into())),
            row(|r| r.features_raw = Some("4.0".into())),
        ];
        decode_features(&mut rows, &facets);
        assert_eq!(rows[0].features_score, Some(8.0));
        assert_eq!(rows[1].features_score, Some(8.0));
    }

    #[test]
    fn landmarks_aggregate_per_category() {
        let facets = facets();
        let payload =
            "[{'text': '3 hospitals nearby'}, {'text': '2 bus stops'}, {'text': '1 mall'}]";
        let mut rows = vec![row(|r| r.landmark_details_raw = Some(payload.into()))];
        decode_landmark_details(&mut rows, &facets);
        let lm = rows[0].landmarks;
        assert_eq!(lm.health, Some(3.0));
        assert_eq!(lm.transportation, Some(2.0));
        assert_eq!(lm.leisure, Some(1.0));
        assert_eq!(lm.education, Some(0.0));
    }

    #[test]
    fn malformed_landmark_payload_counts_as_empty() {
        let facets = facets();
        let mut rows = vec![row(|r| r.landmark_details_raw = Some("not a list".into()))];
        decode_landmark_details(&mut rows, &facets);
        assert_eq!(rows[0].landmarks.health, Some(0.0));
    }

    #[test]
    fn run_all_honors_skip_list() {
        let facets = facets();
        let decoder = ColumnDecoder::new(&facets);
        let mut rows = vec![row(|r| {
            r.price_raw = Some("75 l".into());
            r.area_raw = Some("150 sq.yards".into());
        })];
        decoder.run_all(&mut rows, &["decode_area"]);
        // price decoded, but the area filter never ran
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].price, Some(7_500_000.0));
        assert_eq!(rows[0].area, None);
    }

    #[test]
    fn decoder_registration_order_is_stable() {
        let facets = facets();
        let decoder = ColumnDecoder::new(&facets);
        let names = decoder.names();
        assert_eq!(names[0], "decode_price");
        assert_eq!(names[1], "decode_area");
        assert_eq!(names.len(), 11);
    }
}
