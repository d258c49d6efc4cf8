//! Unsupervised luxury scoring: a seeded, feature-standardized K-means over
//! the landmark/amenity richness columns. Standardization is mandatory (the
//! raw columns differ in scale by orders of magnitude) and the seed is fixed
//! so an identical input always reproduces identical labels.
//!
//! Raw K-means cluster ids are arbitrary, so after the best-inertia fit the
//! clusters are relabeled by ascending mean richness: 0 is always the budget
//! cluster and 2 the luxury one, run over run.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::listing::WorkingListing;
use crate::errors::{PipelineError, Result};

pub const N_CLUSTERS: usize = 3;
const N_INIT: usize = 10;
const MAX_ITER: usize = 300;
const TOL: f64 = 1e-4;
const SEED: u64 = 42;

/// The nine derived numeric columns the luxury clustering runs over, in
/// fixed order.
const CLUSTER_COLS: [&str; 9] = [
    "TOTAL_LANDMARK_COUNT",
    "TRANSPORTATION",
    "ACCOMMODATION",
    "LEISURE",
    "EDUCATION",
    "HEALTH",
    "OTHER",
    "AMENITIES_SCORE",
    "FEATURES_SCORE",
];

/// Assigns every row a luxury category in {0, 1, 2}.
pub fn luxury_categories(rows: &[WorkingListing]) -> Result<Vec<i64>> {
    if rows.len() < N_CLUSTERS {
        return Err(PipelineError::Validation(format!(
            "need at least {N_CLUSTERS} rows to derive luxury categories, got {}",
            rows.len()
        )));
    }

    let mut data: Vec<Vec<f64>> = rows.iter().map(cluster_features).collect::<Result<_>>()?;
    standardize(&mut data);

    let mut rng = StdRng::seed_from_u64(SEED);
    let mut best: Option<(f64, Vec<usize>)> = None;
    for _ in 0..N_INIT {
        let centroids = kmeans_pp_init(&data, N_CLUSTERS, &mut rng);
        let (labels, inertia) = lloyd(&data, centroids);
        if best.as_ref().map(|(b, _)| inertia < *b).unwrap_or(true) {
            best = Some((inertia, labels));
        }
    }
    let (_, labels) = best.expect("at least one k-means initialization ran");

    Ok(relabel_by_richness(&data, &labels))
}

fn cluster_features(row: &WorkingListing) -> Result<Vec<f64>> {
    let lm = &row.landmarks;
    let values = [
        row.total_landmark_count,
        lm.transportation,
        lm.accommodation,
        lm.leisure,
        lm.education,
        lm.health,
        lm.other,
        row.amenities_score,
        row.features_score,
    ];
    values
        .iter()
        .zip(CLUSTER_COLS)
        .map(|(v, col)| {
            v.ok_or_else(|| {
                PipelineError::Validation(format!(
                    "cluster feature {col} missing for {}; decode/imputation must run first",
                    row.prop_id
                ))
            })
        })
        .collect()
}

/// Column-wise zero-mean unit-variance scaling. Constant columns are left
/// centered only, as a standard scaler does.
fn standardize(data: &mut [Vec<f64>]) {
    let n = data.len() as f64;
    let dims = data[0].len();
    for d in 0..dims {
        let mean = data.iter().map(|r| r[d]).sum::<f64>() / n;
        let var = data.iter().map(|r| (r[d] - mean).powi(2)).sum::<f64>() / n;
        let std = if var > 0.0 { var.sqrt() } else { 1.0 };
        for row in data.iter_mut() {
            row[d] = (row[d] - mean) / std;
        }
    }
}

fn dist2(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// k-means++ seeding: each next centroid is drawn proportionally to the
/// squared distance from the nearest already-chosen one.
fn kmeans_pp_init(data: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids: Vec<Vec<f64>> = Vec::with_capacity(k);
    centroids.push(data[rng.gen_range(0..data.len())].clone());

    while centroids.len() < k {
        let weights: Vec<f64> = data
            .iter()
            .map(|p| {
                centroids
                    .iter()
                    .map(|c| dist2(p, c))
                    .fold(f64::INFINITY, f64::min)
            })
            .collect();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            // All points coincide with a centroid; fall back to uniform.
            centroids.push(data[rng.gen_range(0..data.len())].clone());
            continue;
        }
        let mut target = rng.gen::<f64>() * total;
        let mut chosen = data.len() - 1;
        for (i, w) in weights.iter().enumerate() {
            target -= w;
            if target <= 0.0 {
                chosen = i;
                break;
            }
        }
        centroids.push(data[chosen].clone());
    }
    centroids
}

/// Standard Lloyd iterations; returns final labels and inertia. An emptied
/// cluster is reseeded with the point farthest from its centroid.
fn lloyd(data: &[Vec<f64>], mut centroids: Vec<Vec<f64>>) -> (Vec<usize>, f64) {
    let k = centroids.len();
    let dims = data[0].len();
    let mut labels = vec![0usize; data.len()];

    for _ in 0..MAX_ITER {
        for (i, point) in data.iter().enumerate() {
            labels[i] = (0..k)
                .min_by(|&a, &b| dist2(point, &centroids[a]).total_cmp(&dist2(point, &centroids[b])))
                .unwrap_or(0);
        }

        let mut sums = vec![vec![0.0f64; dims]; k];
        let mut counts = vec![0usize; k];
        for (point, &label) in data.iter().zip(&labels) {
            counts[label] += 1;
            for d in 0..dims {
                sums[label][d] += point[d];
            }
        }

        let mut shift = 0.0f64;
        for c in 0..k {
            if counts[c] == 0 {
                let farthest = data
                    .iter()
                    .enumerate()
                    .max_by(|(_, a), (_, b)| {
                        dist2(a, &centroids[c]).total_cmp(&dist2(b, &centroids[c]))
                    })
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                centroids[c] = data[farthest].clone();
                shift = f64::INFINITY;
                continue;
            }
            let new: Vec<f64> = sums[c].iter().map(|s| s / counts[c] as f64).collect();
            shift += dist2(&new, &centroids[c]);
            centroids[c] = new;
        }
        if shift < TOL {
            break;
        }
    }

    let inertia = data
        .iter()
        .zip(&labels)
        .map(|(point, &label)| dist2(point, &centroids[label]))
        .sum();
    (labels, inertia)
}

/// Map arbitrary cluster ids onto a stable 0 = budget, 2 = luxury ordering
/// by each cluster's mean standardized feature sum.
fn relabel_by_richness(data: &[Vec<f64>], labels: &[usize]) -> Vec<i64> {
    let mut sums = vec![0.0f64; N_CLUSTERS];
    let mut counts = vec![0usize; N_CLUSTERS];
    for (point, &label) in data.iter().zip(labels) {
        sums[label] += point.iter().sum::<f64>();
        counts[label] += 1;
    }
    let mut order: Vec<usize> = (0..N_CLUSTERS).collect();
    order.sort_by(|&a, &b| {
        let ma = if counts[a] > 0 { sums[a] / counts[a] as f64 } else { f64::INFINITY };
        let mb = if counts[b] > 0 { sums[b] / counts[b] as f64 } else { f64::INFINITY };
        ma.total_cmp(&mb)
    });
    let mut rank = vec![0i64; N_CLUSTERS];
    for (new_label, &old_label) in order.iter().enumerate() {
        rank[old_label] = new_label as i64;
    }
    labels.iter().map(|&l| rank[l]).collect()
}
