//! Disk image dataset loader
//!
//! Loads the synthetic protoplanetary-disk image stack and the matching
//! physical-parameter matrix from flat `.npy` files. Both arrays are read
//! into memory wholesale at startup; there is no partial or streaming read.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use burn::data::dataset::Dataset;
use ndarray::{Array2, Array4, ArrayD, ArrayView3, Axis};
use ndarray_npy::ReadNpyExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::dataset::batcher::VaeItem;
use crate::dataset::NUM_PARAMS;
use crate::utils::error::{PpdaeError, Result};

/// Known dataset hosts and their data roots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskHost {
    /// `./data/PPD` relative to the working directory
    Local,
    /// Google Drive mount used on Colab
    Colab,
    /// Exalearn cluster storage
    Exalearn,
}

impl DiskHost {
    /// Data root for this host
    pub fn root(&self) -> PathBuf {
        match self {
            DiskHost::Local => PathBuf::from("data/PPD"),
            DiskHost::Colab => PathBuf::from("/content/drive/My Drive/PPDAE"),
            DiskHost::Exalearn => PathBuf::from("/home/jorgemarpa/data/PPD"),
        }
    }
}

impl FromStr for DiskHost {
    type Err = PpdaeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "local" => Ok(DiskHost::Local),
            "colab" => Ok(DiskHost::Colab),
            "exalearn" => Ok(DiskHost::Exalearn),
            other => Err(PpdaeError::UnknownHost(other.to_string())),
        }
    }
}

impl std::fmt::Display for DiskHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiskHost::Local => write!(f, "local"),
            DiskHost::Colab => write!(f, "colab"),
            DiskHost::Exalearn => write!(f, "exalearn"),
        }
    }
}

/// In-memory dataset of disk images and their physical parameters.
///
/// Images have shape `[n, channels, height, width]`; parameters have shape
/// `[n, 8]`. Stored arrays are immutable after loading — augmentation
/// operates on copies at access time.
pub struct DiskDataset {
    images: Array4<f32>,
    params: Array2<f32>,
}

impl DiskDataset {
    /// Load the dataset for the given host.
    ///
    /// `img_norm` selects the pre-normalized image stack; the raw stack has
    /// no channel axis and gains a singleton one. `subsample` draws a random
    /// 1000-sample subset with the given seed.
    pub fn load(host: DiskHost, img_norm: bool, subsample: Option<u64>) -> Result<Self> {
        Self::from_dir(&host.root(), img_norm, subsample)
    }

    /// Load from an explicit data directory (used for custom roots and tests)
    pub fn from_dir(dir: &Path, img_norm: bool, subsample: Option<u64>) -> Result<Self> {
        if !dir.exists() {
            return Err(PpdaeError::PathNotFound(dir.to_path_buf()));
        }

        let params = read_npy_f32(&dir.join("param_arr.npy"))?
            .into_dimensionality::<ndarray::Ix2>()
            .map_err(|e| PpdaeError::Dataset(format!("param_arr.npy is not a matrix: {}", e)))?;

        let image_file = if img_norm {
            "img_norm_array.npy"
        } else {
            "img_array.npy"
        };
        let raw = read_npy_f32(&dir.join(image_file))?;

        let images: Array4<f32> = match raw.ndim() {
            // Raw stack [n, h, w]: add a singleton channel axis
            3 => raw
                .insert_axis(Axis(1))
                .into_dimensionality()
                .map_err(|e| PpdaeError::Dataset(e.to_string()))?,
            4 => raw
                .into_dimensionality()
                .map_err(|e| PpdaeError::Dataset(e.to_string()))?,
            n => {
                return Err(PpdaeError::Dataset(format!(
                    "{} has {} dimensions, expected 3 or 4",
                    image_file, n
                )))
            }
        };

        if images.len_of(Axis(0)) != params.nrows() {
            return Err(PpdaeError::Dataset(format!(
                "image stack has {} samples but parameter matrix has {} rows",
                images.len_of(Axis(0)),
                params.nrows()
            )));
        }

        if params.ncols() != NUM_PARAMS {
            return Err(PpdaeError::Dataset(format!(
                "parameter matrix has {} columns, expected {}",
                params.ncols(),
                NUM_PARAMS
            )));
        }

        let mut dataset = Self { images, params };

        if let Some(seed) = subsample {
            dataset = dataset.subsample(1000, seed);
        }

        info!(
            "Loaded {} disk images ({}x{}x{}) with {} parameters each",
            dataset.len(),
            dataset.channels(),
            dataset.img_dim(),
            dataset.img_dim(),
            NUM_PARAMS
        );

        Ok(dataset)
    }

    /// Build directly from arrays (used by tests)
    pub fn from_arrays(images: Array4<f32>, params: Array2<f32>) -> Self {
        Self { images, params }
    }

    /// Keep a random subset of at most `count` samples
    fn subsample(self, count: usize, seed: u64) -> Self {
        let n = self.len();
        let count = count.min(n);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut indices = rand::seq::index::sample(&mut rng, n, count).into_vec();
        indices.sort_unstable();

        let images = self.images.select(Axis(0), &indices);
        let params = self.params.select(Axis(0), &indices);
        Self { images, params }
    }

    /// Side length of each (square) image
    pub fn img_dim(&self) -> usize {
        self.images.len_of(Axis(3))
    }

    /// Number of image channels
    pub fn channels(&self) -> usize {
        self.images.len_of(Axis(1))
    }

    /// Borrow one image as a `[channels, height, width]` view
    pub fn image(&self, index: usize) -> ArrayView3<f32> {
        self.images.index_axis(Axis(0), index)
    }

    /// Parameter vector for one sample
    pub fn params_row(&self, index: usize) -> Vec<f32> {
        self.params.row(index).to_vec()
    }
}

impl Dataset<VaeItem> for DiskDataset {
    fn get(&self, index: usize) -> Option<VaeItem> {
        if index >= self.len() {
            return None;
        }
        Some(VaeItem::from_array(
            self.image(index).to_owned(),
            self.params_row(index),
        ))
    }

    fn len(&self) -> usize {
        self.images.len_of(Axis(0))
    }
}

/// Read an npy array as f32, accepting f64 files by downcasting.
fn read_npy_f32(path: &Path) -> Result<ArrayD<f32>> {
    let file = File::open(path).map_err(|_| PpdaeError::PathNotFound(path.to_path_buf()))?;
    match ArrayD::<f32>::read_npy(file) {
        Ok(arr) => Ok(arr),
        Err(_) => {
            let file = File::open(path)?;
            let arr = ArrayD::<f64>::read_npy(file)?;
            Ok(arr.mapv(|v| v as f32))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array4};

    fn sample_dataset(n: usize) -> DiskDataset {
        let images = Array4::from_shape_fn((n, 1, 4, 4), |(s, _, i, j)| {
            (s * 16 + i * 4 + j) as f32
        });
        let params = Array2::from_shape_fn((n, NUM_PARAMS), |(s, p)| (s * 8 + p) as f32);
        DiskDataset::from_arrays(images, params)
    }

    #[test]
    fn test_host_from_str() {
        assert_eq!("local".parse::<DiskHost>().unwrap(), DiskHost::Local);
        assert_eq!("Colab".parse::<DiskHost>().unwrap(), DiskHost::Colab);
        assert_eq!("EXALEARN".parse::<DiskHost>().unwrap(), DiskHost::Exalearn);
    }

    #[test]
    fn test_unknown_host_is_fatal() {
        let err = "laptop".parse::<DiskHost>().unwrap_err();
        assert!(matches!(err, PpdaeError::UnknownHost(_)));
    }

    #[test]
    fn test_dataset_accessors() {
        let ds = sample_dataset(5);
        assert_eq!(ds.len(), 5);
        assert_eq!(ds.img_dim(), 4);
        assert_eq!(ds.channels(), 1);
        assert_eq!(ds.params_row(1).len(), NUM_PARAMS);
    }

    #[test]
    fn test_get_returns_item() {
        let ds = sample_dataset(3);
        let item = ds.get(2).unwrap();
        assert_eq!(item.image.len(), 16);
        assert_eq!(item.params.len(), NUM_PARAMS);
        assert_eq!(item.image[0], 32.0);
        assert!(ds.get(3).is_none());
    }

    #[test]
    fn test_subsample_caps_length() {
        let ds = sample_dataset(10).subsample(4, 42);
        assert_eq!(ds.len(), 4);
        // Same seed keeps the same subset
        let ds2 = sample_dataset(10).subsample(4, 42);
        assert_eq!(ds.params_row(0), ds2.params_row(0));
    }
}
