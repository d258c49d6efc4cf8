//! Fills missing built-up area values from whichever alternate area
//! measurements a row carries: direct SUPER_SQFT substitution first, then a
//! cascade of linear regressions with shrinking predictor sets so every
//! availability pattern gets the richest model that can serve it.

use crate::domain::listing::WorkingListing;
use crate::errors::{PipelineError, Result};

/// Ordinary least squares with intercept, fit by the normal equations.
/// Plenty for the 1-2 predictor models this cascade trains.
#[derive(Debug, Clone)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefs: Vec<f64>,
}

impl LinearModel {
    pub fn fit(xs: &[Vec<f64>], ys: &[f64]) -> Result<Self> {
        if xs.is_empty() || xs.len() != ys.len() {
            return Err(PipelineError::ModelNotFound(
                "no complete rows to train the area model on".into(),
            ));
        }
        let p = xs[0].len() + 1; // intercept column

        // Accumulate X^T X and X^T y with the implicit leading 1 column.
        let mut xtx = vec![vec![0.0f64; p]; p];
        let mut xty = vec![0.0f64; p];
        for (x, &y) in xs.iter().zip(ys) {
            let mut row = Vec::with_capacity(p);
            row.push(1.0);
            row.extend_from_slice(x);
            for i in 0..p {
                for j in 0..p {
                    xtx[i][j] += row[i] * row[j];
                }
                xty[i] += row[i] * y;
            }
        }

        let beta = solve(xtx, xty)?;
        Ok(Self {
            intercept: beta[0],
            coefs: beta[1..].to_vec(),
        })
    }

    pub fn predict(&self, x: &[f64]) -> f64 {
        self.intercept
            + self
                .coefs
                .iter()
                .zip(x)
                .map(|(c, v)| c * v)
                .sum::<f64>()
    }
}

/// Gaussian elimination with partial pivoting. A singular system means the
/// training rows carried no usable signal, which is a missing-model
/// condition, not bad input data.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < 1e-12 {
            return Err(PipelineError::ModelNotFound(
                "singular design matrix while fitting the area model".into(),
            ));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0f64; n];
    for col in (0..n).rev() {
        let mut acc = b[col];
        for k in (col + 1)..n {
            acc -= a[col][k] * x[k];
        }
        x[col] = acc / a[col][col];
    }
    Ok(x)
}

/// Predictor columns the cascade may draw on.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Predictor {
    Carpet,
    SuperBuiltup,
}

/// The cascade's pass order: the two-predictor combination first, then each
/// remaining single predictor mopping up the rows the richer pass could not
/// cover.
const CASCADE: [&[Predictor]; 3] = [
    &[Predictor::Carpet, Predictor::SuperBuiltup],
    &[Predictor::Carpet],
    &[Predictor::SuperBuiltup],
];

/// Area imputation over the four area-variant columns of newer batches.
pub struct AreaEstimator {
    builtup: Vec<Option<f64>>,
    carpet: Vec<Option<f64>>,
    superbuiltup: Vec<Option<f64>>,
    super_sqft: Vec<Option<f64>>,
}

impl AreaEstimator {
    pub fn new(rows: &[WorkingListing]) -> Self {
        Self {
            builtup: rows.iter().map(|r| r.builtup_sqft).collect(),
            carpet: rows.iter().map(|r| r.carpet_sqft).collect(),
            superbuiltup: rows.iter().map(|r| r.superbuiltup_sqft).collect(),
            super_sqft: rows.iter().map(|r| r.super_sqft).collect(),
        }
    }

    /// Runs the full cascade and returns the filled built-up areas, aligned
    /// with the input rows. Rows no pass can reach stay missing.
    pub fn estimate(mut self) -> Result<Vec<Option<f64>>> {
        self.impute_with_super_area();
        for predictors in CASCADE {
            self.estimate_pass(predictors)?;
        }
        Ok(self.builtup)
    }

    /// Direct substitution: a missing built-up area with a super area copies
    /// it across, no model needed.
    fn impute_with_super_area(&mut self) {
        for i in 0..self.builtup.len() {
            if self.builtup[i].is_none() {
                self.builtup[i] = self.super_sqft[i];
            }
        }
    }

    fn predictor_value(&self, p: Predictor, i: usize) -> Option<f64> {
        match p {
            Predictor::Carpet => self.carpet[i],
            Predictor::SuperBuiltup => self.superbuiltup[i],
        }
    }

    fn full_predictor_row(&self, predictors: &[Predictor], i: usize) -> Option<Vec<f64>> {
        predictors
            .iter()
            .map(|&p| self.predictor_value(p, i))
            .collect()
    }

    /// One cascade pass: train on rows where target and predictors are all
    /// present, predict for rows still missing the target but holding every
    /// predictor. Skipped entirely when no row needs it.
    fn estimate_pass(&mut self, predictors: &[Predictor]) -> Result<()> {
        let candidates: Vec<usize> = (0..self.builtup.len())
            .filter(|&i| {
                self.builtup[i].is_none() && self.full_predictor_row(predictors, i).is_some()
            })
            .collect();
        if candidates.is_empty() {
            return Ok(());
        }

        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for i in 0..self.builtup.len() {
            if let (Some(y), Some(x)) = (self.builtup[i], self.full_predictor_row(predictors, i)) {
                xs.push(x);
                ys.push(y);
            }
        }
        let model = LinearModel::fit(&xs, &ys)?;

        for i in candidates {
            let x = self
                .full_predictor_row(predictors, i)
                .expect("candidate row lost its predictors");
            self.builtup[i] = Some(model.predict(&x).round());
        }
        Ok(())
    }
}
