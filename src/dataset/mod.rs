//! Dataset module for disk image handling
//!
//! This module provides functionality for:
//! - Loading the protoplanetary-disk image stack and parameter matrix from npy files
//! - Per-access data augmentation (quarter-turn rotation, vertical flip)
//! - Reproducible train/test index splitting
//! - Batching into burn tensors
//!
//! An MNIST variant is included for sanity-checking the pipeline end to end.

pub mod augmentation;
pub mod batcher;
pub mod loader;
pub mod mnist;
pub mod split;

// Re-export main types for convenience
pub use augmentation::{flip_vertical, rotate90, Augmenter};
pub use batcher::{VaeBatch, VaeBatcher, VaeItem};
pub use loader::{DiskDataset, DiskHost};
pub use mnist::MnistVaeDataset;
pub use split::{split_indices, SubsetDataset, TrainTestSplit};

/// Number of physical parameters per disk sample
pub const NUM_PARAMS: usize = 8;

/// Names of the physical parameters, in column order
pub const PARAM_NAMES: [&str; NUM_PARAMS] = [
    "m_dust", "Rc", "f_exp", "H0", "Rin", "sd_exp", "a_max", "inc",
];

/// Get the parameter name for a column index
pub fn param_name(index: usize) -> Option<&'static str> {
    PARAM_NAMES.get(index).copied()
}

/// Get the column index for a parameter name
pub fn param_index(name: &str) -> Option<usize> {
    PARAM_NAMES.iter().position(|&n| n == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_name() {
        assert_eq!(param_name(0), Some("m_dust"));
        assert_eq!(param_name(7), Some("inc"));
        assert_eq!(param_name(8), None);
    }

    #[test]
    fn test_param_index() {
        assert_eq!(param_index("Rc"), Some(1));
        assert_eq!(param_index("inc"), Some(7));
        assert_eq!(param_index("mass"), None);
    }
}
