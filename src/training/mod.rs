//! Training infrastructure
//!
//! The epoch loop lives in [`trainer`]; the supporting pieces are the
//! beta annealing schedule, the VAE loss, learning-rate scheduling, and
//! early stopping.

pub mod beta;
pub mod early_stopping;
pub mod loss;
pub mod scheduler;
pub mod trainer;

pub use beta::BetaSchedule;
pub use early_stopping::{EarlyStopping, EarlyStoppingConfig};
pub use loss::{vae_loss, LossTerms};
pub use scheduler::{LrSchedule, ReduceOnPlateauState, SchedulerKind};
pub use trainer::{LossHistory, Trainer, TrainerState};

pub use crate::model::TrainingConfig;

/// Default number of epochs
pub const DEFAULT_EPOCHS: usize = 100;

/// Default batch size
pub const DEFAULT_BATCH_SIZE: usize = 128;

/// Default initial learning rate
pub const DEFAULT_LEARNING_RATE: f64 = 1e-4;
