//! Model definitions and training configuration

pub mod config;
pub mod vae;

pub use config::TrainingConfig;
pub use vae::{DiskVae, DiskVaeConfig, VaeOutput};
