//! KL-divergence weight annealing
//!
//! The KL term is weighted by a beta coefficient that starts low and is
//! stepped up during training, so early epochs focus on reconstruction
//! before the latent prior is enforced.

use serde::{Deserialize, Serialize};

/// Schedule for the KL-divergence weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BetaSchedule {
    /// Staircase ramp: `beta0 + gamma * floor(epoch / step)`
    Step { beta0: f64, gamma: f64, step: usize },
    /// Fixed weight for the whole run
    Constant { value: f64 },
}

impl BetaSchedule {
    /// The standard staircase used for disk training: 0.0 + 0.2 per 15 epochs
    pub fn step_default() -> Self {
        BetaSchedule::Step {
            beta0: 0.0,
            gamma: 0.2,
            step: 15,
        }
    }

    /// Beta value for a zero-based epoch index
    pub fn value(&self, epoch: usize) -> f64 {
        match self {
            BetaSchedule::Step { beta0, gamma, step } => {
                beta0 + gamma * (epoch / step.max(&1)) as f64
            }
            BetaSchedule::Constant { value } => *value,
        }
    }
}
