//! Seeded uniform row sampling for large datasets.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::types::{Dataset, SamplingInfo};

/// Draw `size` distinct row indices uniformly from `0..total`, returned in
/// ascending order. The same seed always yields the same indices.
pub fn sample_indices(total: usize, size: usize, seed: u64) -> Vec<usize> {
    if size >= total {
        return (0..total).collect();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let all: Vec<usize> = (0..total).collect();
    let mut picked: Vec<usize> = all.choose_multiple(&mut rng, size).copied().collect();
    picked.sort_unstable();
    picked
}

/// Sample the dataset when it has more rows than `threshold`.
///
/// Returns the dataset to analyze and, when sampled, what was done.
pub fn sample_dataset(
    dataset: &Dataset,
    threshold: Option<usize>,
    seed: u64,
) -> Option<(Dataset, SamplingInfo)> {
    let threshold = threshold?;
    if dataset.n_rows() <= threshold {
        return None;
    }

    let indices = sample_indices(dataset.n_rows(), threshold, seed);
    let info = SamplingInfo {
        original_rows: dataset.n_rows(),
        sampled_rows: indices.len(),
        seed,
    };
    Some((dataset.select_rows(&indices), info))
}
