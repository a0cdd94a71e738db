//! Training configuration
//!
//! Serializable knobs for a training run, with JSON save/load so a run
//! directory records exactly how its checkpoint was produced.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::training::beta::BetaSchedule;
use crate::training::early_stopping::EarlyStoppingConfig;
use crate::training::scheduler::SchedulerKind;
use crate::training::{DEFAULT_BATCH_SIZE, DEFAULT_EPOCHS, DEFAULT_LEARNING_RATE};
use crate::utils::error::{PpdaeError, Result};

/// Configuration for a VAE training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of training epochs
    pub epochs: usize,

    /// Batch size
    pub batch_size: usize,

    /// Initial learning rate
    pub learning_rate: f64,

    /// Log training scalars every N steps
    pub print_every: usize,

    /// Fraction of samples held out for the test split
    pub test_split: f64,

    /// RNG seed for splitting, shuffling, and augmentation
    pub seed: u64,

    /// KL-divergence weight schedule
    pub beta: BetaSchedule,

    /// Learning-rate schedule
    pub scheduler: SchedulerKind,

    /// Early-stopping criterion, if any
    pub early_stopping: Option<EarlyStoppingConfig>,

    /// Apply rotation/flip augmentation to training images
    pub augment: bool,

    /// Write checkpoints and artifacts to the run directory
    pub save: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: DEFAULT_EPOCHS,
            batch_size: DEFAULT_BATCH_SIZE,
            learning_rate: DEFAULT_LEARNING_RATE,
            print_every: 50,
            test_split: 0.2,
            seed: 42,
            beta: BetaSchedule::step_default(),
            scheduler: SchedulerKind::None,
            early_stopping: Some(EarlyStoppingConfig::default()),
            augment: false,
            save: true,
        }
    }
}

impl TrainingConfig {
    /// Check the configuration for values that cannot produce a valid run
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(PpdaeError::Config("epochs must be positive".to_string()));
        }
        if self.batch_size == 0 {
            return Err(PpdaeError::Config("batch_size must be positive".to_string()));
        }
        if self.learning_rate <= 0.0 {
            return Err(PpdaeError::Config(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.test_split) {
            return Err(PpdaeError::Config(format!(
                "test_split must be in [0, 1], got {}",
                self.test_split
            )));
        }
        if self.print_every == 0 {
            return Err(PpdaeError::Config(
                "print_every must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!("Saved training config to {:?}", path);
        Ok(())
    }

    /// Load a configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PpdaeError::PathNotFound(path.to_path_buf()));
        }
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_default_is_valid() {
        let config = TrainingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.epochs, DEFAULT_EPOCHS);
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.learning_rate, DEFAULT_LEARNING_RATE);
    }

    #[test]
    fn test_invalid_split_rejected() {
        let config = TrainingConfig {
            test_split: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate().unwrap_err(),
            PpdaeError::Config(_)
        ));
    }

    #[test]
    fn test_zero_epochs_rejected() {
        let config = TrainingConfig {
            epochs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_load_round_trip() {
        let config = TrainingConfig {
            epochs: 7,
            batch_size: 16,
            ..Default::default()
        };
        let path = env::temp_dir().join("ppdae_test_config.json");
        config.save(&path).unwrap();
        let loaded = TrainingConfig::load(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(loaded.epochs, 7);
        assert_eq!(loaded.batch_size, 16);
        assert_eq!(loaded.seed, config.seed);
    }
}
