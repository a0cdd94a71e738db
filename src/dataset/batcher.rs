//! Burn batching for VAE training
//!
//! Items carry a flattened CHW image plus the sample's physical parameters;
//! the batcher stacks them into `[batch, channels, height, width]` image
//! tensors and a `[batch, params]` parameter tensor on the target device.

use burn::data::dataloader::batcher::Batcher;
use burn::prelude::*;
use ndarray::Array3;
use serde::{Deserialize, Serialize};

use crate::utils::error::{PpdaeError, Result};

/// A single sample ready for batching
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VaeItem {
    /// Image data as a flattened CHW float array
    pub image: Vec<f32>,
    /// Physical parameters (or label metadata for the MNIST variant)
    pub params: Vec<f32>,
    /// Number of image channels
    pub channels: usize,
    /// Image height
    pub height: usize,
    /// Image width
    pub width: usize,
}

impl VaeItem {
    /// Build an item from a `[channels, height, width]` array
    pub fn from_array(image: Array3<f32>, params: Vec<f32>) -> Self {
        let (channels, height, width) = image.dim();
        Self {
            // Iterate in logical order; the array may be a flipped/rotated copy
            // whose memory layout is not contiguous row-major.
            image: image.iter().copied().collect(),
            params,
            channels,
            height,
            width,
        }
    }

    /// View the image back as a `[channels, height, width]` array
    pub fn to_array(&self) -> Result<Array3<f32>> {
        Array3::from_shape_vec((self.channels, self.height, self.width), self.image.clone())
            .map_err(|e| PpdaeError::Dataset(format!("item shape mismatch: {}", e)))
    }
}

/// A batch of disk images for VAE training
#[derive(Clone, Debug)]
pub struct VaeBatch<B: Backend> {
    /// Images with shape [batch_size, channels, height, width]
    pub images: Tensor<B, 4>,
    /// Physical parameters with shape [batch_size, num_params]
    pub params: Tensor<B, 2>,
}

/// Batcher assembling `VaeItem`s into tensors on a device
#[derive(Clone, Debug)]
pub struct VaeBatcher<B: Backend> {
    device: B::Device,
}

impl<B: Backend> VaeBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<VaeItem, VaeBatch<B>> for VaeBatcher<B> {
    fn batch(&self, items: Vec<VaeItem>) -> VaeBatch<B> {
        let batch_size = items.len();
        let (channels, height, width) = items
            .first()
            .map(|item| (item.channels, item.height, item.width))
            .unwrap_or((1, 1, 1));
        let num_params = items.first().map(|item| item.params.len()).unwrap_or(1);

        let images_data: Vec<f32> = items.iter().flat_map(|item| item.image.clone()).collect();
        let params_data: Vec<f32> = items.iter().flat_map(|item| item.params.clone()).collect();

        let images = Tensor::<B, 4>::from_floats(
            TensorData::new(images_data, [batch_size, channels, height, width]),
            &self.device,
        );

        let params = Tensor::<B, 2>::from_floats(
            TensorData::new(params_data, [batch_size, num_params]),
            &self.device,
        );

        VaeBatch { images, params }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::NdArrayDevice;
    use burn::backend::NdArray;
    use ndarray::Array3;

    type TestBackend = NdArray;

    fn sample_item(fill: f32) -> VaeItem {
        let image = Array3::from_elem((1, 4, 4), fill);
        VaeItem::from_array(image, vec![fill; 8])
    }

    #[test]
    fn test_item_array_round_trip() {
        let image = Array3::from_shape_fn((2, 3, 3), |(c, i, j)| (c * 9 + i * 3 + j) as f32);
        let item = VaeItem::from_array(image.clone(), vec![1.0]);
        assert_eq!(item.to_array().unwrap(), image);
    }

    #[test]
    fn test_batch_shapes() {
        let batcher = VaeBatcher::<TestBackend>::new(NdArrayDevice::default());
        let batch = batcher.batch(vec![sample_item(0.0), sample_item(1.0), sample_item(2.0)]);

        assert_eq!(batch.images.dims(), [3, 1, 4, 4]);
        assert_eq!(batch.params.dims(), [3, 8]);
    }

    #[test]
    fn test_batch_preserves_values() {
        let batcher = VaeBatcher::<TestBackend>::new(NdArrayDevice::default());
        let batch = batcher.batch(vec![sample_item(0.5), sample_item(1.5)]);

        let data: Vec<f32> = batch.images.into_data().to_vec().unwrap();
        assert_eq!(data[0], 0.5);
        assert_eq!(data[16], 1.5);
    }
}
