//! Pairwise Pearson correlation between numeric columns.

use rayon::prelude::*;

use crate::types::{Column, CorrelationMatrix};

/// Builds the correlation matrix of the numeric columns.
pub struct CorrelationAnalyzer;

impl CorrelationAnalyzer {
    /// Pearson correlation over every pair of `columns`, using only rows
    /// where both values are present. Pairs are evaluated in parallel.
    ///
    /// A coefficient is `None` when fewer than two rows are complete or when
    /// either side has zero variance over those rows.
    pub fn analyze(columns: &[&Column]) -> CorrelationMatrix {
        let parsed: Vec<Vec<Option<f64>>> = columns
            .par_iter()
            .map(|column| column.cells.iter().map(|c| c.as_number()).collect())
            .collect();

        let n = columns.len();
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .collect();

        let coefficients: Vec<Option<f64>> = pairs
            .par_iter()
            .map(|&(i, j)| pearson(&parsed[i], &parsed[j]))
            .collect();

        let mut values = vec![vec![None; n]; n];
        for (i, row) in values.iter_mut().enumerate() {
            row[i] = Some(1.0);
        }
        for (&(i, j), r) in pairs.iter().zip(coefficients) {
            values[i][j] = r;
            values[j][i] = r;
        }

        CorrelationMatrix {
            columns: columns.iter().map(|c| c.name.clone()).collect(),
            values,
        }
    }
}

/// Pearson coefficient over pairwise-complete observations, clamped to [-1, 1].
pub(crate) fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| a.zip(*b))
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    // zero variance, checked on the values themselves
    let (x0, y0) = pairs[0];
    if pairs.iter().all(|&(a, _)| a == x0) || pairs.iter().all(|&(_, b)| b == y0) {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return None;
    }

    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}
