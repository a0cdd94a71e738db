//! Train/test index splitting
//!
//! Produces two disjoint index sets covering all samples, with
//! `|test| = floor(test_fraction * n)`. When shuffling is requested the
//! permutation is driven by a caller-supplied seed, so the split is
//! deterministic and reproducible for a fixed seed.

use std::sync::Arc;

use burn::data::dataset::Dataset;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::utils::error::{PpdaeError, Result};

/// A reproducible train/test split over sample indices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainTestSplit {
    /// Indices assigned to the training set
    pub train: Vec<usize>,
    /// Indices assigned to the test set
    pub test: Vec<usize>,
    /// Seed used for the permutation (recorded for reproducibility)
    pub seed: u64,
}

impl TrainTestSplit {
    pub fn train_len(&self) -> usize {
        self.train.len()
    }

    pub fn test_len(&self) -> usize {
        self.test.len()
    }
}

/// Split `n` sample indices into disjoint train and test sets.
///
/// The test set takes the first `floor(test_fraction * n)` indices of the
/// (optionally shuffled) permutation; the rest go to train. `test_fraction`
/// of zero yields an empty test set.
pub fn split_indices(
    n: usize,
    test_fraction: f64,
    shuffle: bool,
    seed: u64,
) -> Result<TrainTestSplit> {
    if !(0.0..=1.0).contains(&test_fraction) {
        return Err(PpdaeError::Config(format!(
            "test_fraction must be in [0.0, 1.0], got {}",
            test_fraction
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    if shuffle {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        indices.shuffle(&mut rng);
    }

    let n_test = (test_fraction * n as f64).floor() as usize;
    let test = indices[..n_test].to_vec();
    let train = indices[n_test..].to_vec();

    Ok(TrainTestSplit { train, test, seed })
}

/// A view over a subset of another dataset, selected by index list.
///
/// Both halves of a split share the underlying dataset through an `Arc`.
pub struct SubsetDataset<D, I> {
    dataset: Arc<D>,
    indices: Vec<usize>,
    marker: std::marker::PhantomData<I>,
}

impl<D, I> SubsetDataset<D, I>
where
    D: Dataset<I>,
    I: Clone + Send + Sync,
{
    pub fn new(dataset: Arc<D>, indices: Vec<usize>) -> Self {
        Self {
            dataset,
            indices,
            marker: std::marker::PhantomData,
        }
    }
}

impl<D, I> Dataset<I> for SubsetDataset<D, I>
where
    D: Dataset<I>,
    I: Clone + Send + Sync,
{
    fn get(&self, index: usize) -> Option<I> {
        let inner = *self.indices.get(index)?;
        self.dataset.get(inner)
    }

    fn len(&self) -> usize {
        self.indices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_split_sizes() {
        let split = split_indices(100, 0.2, true, 42).unwrap();
        assert_eq!(split.test_len(), 20);
        assert_eq!(split.train_len(), 80);
    }

    #[test]
    fn test_split_disjoint_and_complete() {
        let split = split_indices(100, 0.2, true, 42).unwrap();

        let train: HashSet<usize> = split.train.iter().copied().collect();
        let test: HashSet<usize> = split.test.iter().copied().collect();

        assert!(train.is_disjoint(&test));

        let union: HashSet<usize> = train.union(&test).copied().collect();
        let expected: HashSet<usize> = (0..100).collect();
        assert_eq!(union, expected);
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = split_indices(100, 0.2, true, 7).unwrap();
        let b = split_indices(100, 0.2, true, 7).unwrap();
        assert_eq!(a.train, b.train);
        assert_eq!(a.test, b.test);
    }

    #[test]
    fn test_different_seed_different_split() {
        let a = split_indices(100, 0.2, true, 7).unwrap();
        let b = split_indices(100, 0.2, true, 8).unwrap();
        assert_ne!(a.test, b.test);
    }

    #[test]
    fn test_zero_fraction_empty_test() {
        let split = split_indices(100, 0.0, true, 42).unwrap();
        assert!(split.test.is_empty());
        assert_eq!(split.train_len(), 100);
    }

    #[test]
    fn test_no_shuffle_is_ordered() {
        let split = split_indices(10, 0.3, false, 0).unwrap();
        assert_eq!(split.test, vec![0, 1, 2]);
        assert_eq!(split.train, vec![3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_invalid_fraction_rejected() {
        assert!(split_indices(10, 1.5, true, 0).is_err());
        assert!(split_indices(10, -0.1, true, 0).is_err());
    }
}
