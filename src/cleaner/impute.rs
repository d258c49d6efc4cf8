//! Missing-value imputation over the decoded working table. Score-like
//! columns take the rounded column mean, category-like columns take the
//! column mode, and balcony counts come from a bedroom → median-balcony
//! pivot built from the dataset itself, which tracks the bedroom/balcony
//! correlation better than a flat fill.

use std::collections::HashMap;

use crate::domain::listing::WorkingListing;

/// Property types for which furnishing is structurally inapplicable; they
/// are excluded when computing the furnish mode.
const FURNISH_EXEMPT_TYPES: [&str; 2] = ["residential land", "independent/builder floor"];

pub fn fill_missing(rows: &mut [WorkingListing]) {
    fill_with_mean(rows, |r| &mut r.total_landmark_count);
    fill_with_mean(rows, |r| &mut r.amenities_score);
    fill_with_mean(rows, |r| &mut r.features_score);

    let furnish_mode = mode_str(rows.iter().filter_map(|r| {
        let applicable = r
            .property_type
            .as_deref()
            .map(|t| !FURNISH_EXEMPT_TYPES.contains(&t))
            .unwrap_or(true);
        if applicable {
            r.furnish.as_deref()
        } else {
            None
        }
    }));
    fill_with(rows, furnish_mode, |r| &mut r.furnish);

    let facing_mode = mode_str(rows.iter().filter_map(|r| r.facing.as_deref()));
    fill_with(rows, facing_mode, |r| &mut r.facing);

    let age_mode = mode_str(rows.iter().filter_map(|r| r.age.as_deref()));
    fill_with(rows, age_mode, |r| &mut r.age);

    let floor_mode = mode_str(rows.iter().filter_map(|r| r.floor_num.as_deref()));
    fill_with(rows, floor_mode, |r| &mut r.floor_num);

    let bedroom_mode = mode_f64(rows.iter().filter_map(|r| r.bedroom_num));
    if let Some(mode) = bedroom_mode {
        for row in rows.iter_mut() {
            row.bedroom_num.get_or_insert(mode);
        }
    }

    fill_balconies(rows);
}

/// Fill missing balcony counts from the dataset's own bedroom → median
/// balcony pivot. Bedroom counts without a pivot entry stay missing.
fn fill_balconies(rows: &mut [WorkingListing]) {
    let pivot = balcony_pivot(rows);
    for row in rows.iter_mut() {
        if row.balcony_num.is_none() {
            if let Some(bedroom) = row.bedroom_num {
                row.balcony_num = pivot.get(&(bedroom.round() as i64)).copied();
            }
        }
    }
}

/// bedroom count → median balcony count, over rows holding both.
pub fn balcony_pivot(rows: &[WorkingListing]) -> HashMap<i64, f64> {
    let mut grouped: HashMap<i64, Vec<f64>> = HashMap::new();
    for row in rows {
        if let (Some(bedroom), Some(balcony)) = (row.bedroom_num, row.balcony_num) {
            grouped
                .entry(bedroom.round() as i64)
                .or_default()
                .push(balcony);
        }
    }
    grouped
        .into_iter()
        .map(|(bedroom, values)| (bedroom, median(values)))
        .collect()
}

fn fill_with_mean(
    rows: &mut [WorkingListing],
    field: impl Fn(&mut WorkingListing) -> &mut Option<f64>,
) {
    let mut sum = 0.0;
    let mut n = 0usize;
    for row in rows.iter_mut() {
        if let Some(v) = *field(row) {
            sum += v;
            n += 1;
        }
    }
    // A column with no observed values at all stays missing.
    if n == 0 {
        return;
    }
    let mean = (sum / n as f64).round();
    for row in rows.iter_mut() {
        field(row).get_or_insert(mean);
    }
}

fn fill_with(
    rows: &mut [WorkingListing],
    value: Option<String>,
    field: impl Fn(&mut WorkingListing) -> &mut Option<String>,
) {
    if let Some(value) = value {
        for row in rows.iter_mut() {
            field(row).get_or_insert_with(|| value.clone());
        }
    }
}

/// Most frequent value; ties break toward the smallest so the fill is
/// deterministic regardless of row order.
fn mode_str<'a>(values: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|(va, ca), (vb, cb)| ca.cmp(cb).then_with(|| vb.cmp(va)))
        .map(|(v, _)| v.to_string())
}

fn mode_f64(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut counts: HashMap<i64, (f64, usize)> = HashMap::new();
    for v in values {
        let entry = counts.entry(v.round() as i64).or_insert((v, 0));
        entry.1 += 1;
    }
    counts
        .into_values()
        .max_by(|(va, ca), (vb, cb)| ca.cmp(cb).then_with(|| vb.total_cmp(va)))
        .map(|(v, _)| v)
}

fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}
