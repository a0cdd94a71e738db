//! # PPDAE — Protoplanetary Disk Autoencoder
//!
//! A Rust library for training variational autoencoders on synthetic
//! protoplanetary-disk images using the Burn framework.
//!
//! ## Features
//!
//! - **VAE training** with beta annealing, learning-rate scheduling, and early stopping
//! - **Burn framework** for portable, efficient neural network training
//! - **npy dataset loading** of the disk image stack and physical-parameter matrix
//! - **MNIST variant** for sanity-checking the whole pipeline
//!
//! ## Modules
//!
//! - `dataset`: npy loading, augmentation, splitting, and batching
//! - `model`: dense VAE architecture and training configuration
//! - `training`: the epoch loop, loss, schedules, and early stopping
//! - `tracking`: per-run artifact directories, scalar logs, and reconstruction walls
//! - `utils`: logging and error types
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ppdae::backend::TrainingBackend;
//! use ppdae::dataset::{DiskDataset, DiskHost};
//! use ppdae::model::DiskVaeConfig;
//!
//! // Load dataset
//! let dataset = DiskDataset::load(DiskHost::Local, true, None)?;
//!
//! // Create model
//! let config = DiskVaeConfig::new(dataset.img_dim(), dataset.channels());
//! // ... training via ppdae::training::Trainer
//! ```

pub mod backend;
pub mod dataset;
pub mod model;
pub mod tracking;
pub mod training;
pub mod utils;

// Re-export commonly used items for convenience
pub use dataset::loader::{DiskDataset, DiskHost};
pub use dataset::split::{split_indices, SubsetDataset, TrainTestSplit};
pub use dataset::{Augmenter, MnistVaeDataset, VaeBatch, VaeBatcher, VaeItem, NUM_PARAMS};
pub use model::vae::{DiskVae, DiskVaeConfig, VaeOutput};
pub use model::TrainingConfig;
pub use tracking::RunTracker;
pub use training::trainer::{Trainer, TrainerState};
pub use training::{BetaSchedule, EarlyStoppingConfig, LrSchedule, SchedulerKind};
pub use utils::error::{PpdaeError, Result};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
