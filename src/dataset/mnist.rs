//! MNIST sanity-check variant
//!
//! Wraps burn's bundled MNIST vision dataset behind the same item type as the
//! disk dataset, so the trainer runs unchanged on either. Pixels are scaled
//! to [0, 1] and normalized with the standard MNIST statistics; the digit
//! label rides along as the sample's single metadata value.

use burn::data::dataset::vision::MnistDataset;
use burn::data::dataset::Dataset;

use crate::dataset::batcher::VaeItem;

/// MNIST image side length
pub const MNIST_DIM: usize = 28;

/// Normalization mean for MNIST pixels
pub const MNIST_MEAN: f32 = 0.1307;

/// Normalization standard deviation for MNIST pixels
pub const MNIST_STD: f32 = 0.3081;

/// MNIST dataset presented as VAE items (1x28x28, label as metadata)
pub struct MnistVaeDataset {
    inner: MnistDataset,
}

impl MnistVaeDataset {
    /// The 60k-image training split
    pub fn train() -> Self {
        Self {
            inner: MnistDataset::train(),
        }
    }

    /// The 10k-image test split
    pub fn test() -> Self {
        Self {
            inner: MnistDataset::test(),
        }
    }
}

impl Dataset<VaeItem> for MnistVaeDataset {
    fn get(&self, index: usize) -> Option<VaeItem> {
        let item = self.inner.get(index)?;

        let mut image = Vec::with_capacity(MNIST_DIM * MNIST_DIM);
        for row in item.image.iter() {
            for &px in row.iter() {
                image.push((px / 255.0 - MNIST_MEAN) / MNIST_STD);
            }
        }

        Some(VaeItem {
            image,
            params: vec![item.label as f32],
            channels: 1,
            height: MNIST_DIM,
            width: MNIST_DIM,
        })
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
