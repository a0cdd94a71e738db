//! Learning-rate scheduling
//!
//! Two families: epoch-indexed schedules that compute the rate from the
//! epoch number alone, and a reduce-on-plateau state machine driven by the
//! monitored test loss.

use serde::{Deserialize, Serialize};

/// Epoch-indexed learning rate schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LrSchedule {
    /// Fixed learning rate
    Constant { lr: f64 },

    /// Reduce by `decay_factor` at each listed epoch
    StepDecay {
        initial_lr: f64,
        decay_factor: f64,
        step_epochs: Vec<usize>,
    },

    /// lr = initial_lr * decay_rate^epoch
    Exponential { initial_lr: f64, decay_rate: f64 },

    /// Smooth decay from `initial_lr` to `min_lr` over `total_epochs`
    CosineAnnealing {
        initial_lr: f64,
        min_lr: f64,
        total_epochs: usize,
    },
}

impl LrSchedule {
    /// Learning rate for a zero-based epoch index
    pub fn lr_at(&self, epoch: usize) -> f64 {
        match self {
            Self::Constant { lr } => *lr,

            Self::StepDecay {
                initial_lr,
                decay_factor,
                step_epochs,
            } => {
                let mut lr = *initial_lr;
                for &step_epoch in step_epochs {
                    if epoch >= step_epoch {
                        lr *= decay_factor;
                    }
                }
                lr
            }

            Self::Exponential {
                initial_lr,
                decay_rate,
            } => initial_lr * decay_rate.powi(epoch as i32),

            Self::CosineAnnealing {
                initial_lr,
                min_lr,
                total_epochs,
            } => {
                let progress = epoch as f64 / (*total_epochs).max(1) as f64;
                let cosine_factor = (1.0 + (std::f64::consts::PI * progress).cos()) / 2.0;
                min_lr + (initial_lr - min_lr) * cosine_factor
            }
        }
    }
}

/// Which learning-rate policy a run uses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchedulerKind {
    /// Keep the configured learning rate for the whole run
    None,

    /// Recompute the rate from the epoch index
    Epoch { schedule: LrSchedule },

    /// Reduce the rate when the monitored loss plateaus
    Plateau {
        factor: f64,
        patience: usize,
        min_lr: f64,
    },
}

/// State for the reduce-on-plateau policy.
///
/// Monitors a loss, so lower is always better. After `patience` epochs
/// without a new best the rate is multiplied by `reduction_factor`, floored
/// at `min_lr`, and the streak resets.
#[derive(Debug, Clone)]
pub struct ReduceOnPlateauState {
    best_loss: f64,
    epochs_without_improvement: usize,
    current_lr: f64,
    reduction_factor: f64,
    patience: usize,
    min_lr: f64,
}

impl ReduceOnPlateauState {
    pub fn new(initial_lr: f64, reduction_factor: f64, patience: usize, min_lr: f64) -> Self {
        Self {
            best_loss: f64::INFINITY,
            epochs_without_improvement: 0,
            current_lr: initial_lr,
            reduction_factor,
            patience,
            min_lr,
        }
    }

    /// Feed one loss observation and return the (possibly reduced) rate
    pub fn step(&mut self, loss: f64) -> f64 {
        if loss < self.best_loss {
            self.best_loss = loss;
            self.epochs_without_improvement = 0;
        } else {
            self.epochs_without_improvement += 1;

            if self.epochs_without_improvement >= self.patience {
                let new_lr = (self.current_lr * self.reduction_factor).max(self.min_lr);
                if new_lr < self.current_lr {
                    self.current_lr = new_lr;
                    self.epochs_without_improvement = 0;
                }
            }
        }

        self.current_lr
    }

    /// Current learning rate
    pub fn lr(&self) -> f64 {
        self.current_lr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_schedule() {
        let schedule = LrSchedule::Constant { lr: 0.001 };
        assert_eq!(schedule.lr_at(0), 0.001);
        assert_eq!(schedule.lr_at(100), 0.001);
    }

    #[test]
    fn test_step_decay_schedule() {
        let schedule = LrSchedule::StepDecay {
            initial_lr: 0.1,
            decay_factor: 0.1,
            step_epochs: vec![10, 20, 30],
        };

        assert_eq!(schedule.lr_at(0), 0.1);
        assert_eq!(schedule.lr_at(9), 0.1);
        assert!((schedule.lr_at(10) - 0.01).abs() < 1e-10);
        assert!((schedule.lr_at(20) - 0.001).abs() < 1e-10);
        assert!((schedule.lr_at(30) - 0.0001).abs() < 1e-10);
    }

    #[test]
    fn test_exponential_schedule() {
        let schedule = LrSchedule::Exponential {
            initial_lr: 0.1,
            decay_rate: 0.9,
        };
        assert_eq!(schedule.lr_at(0), 0.1);
        assert!((schedule.lr_at(2) - 0.081).abs() < 1e-10);
    }

    #[test]
    fn test_cosine_annealing_schedule() {
        let schedule = LrSchedule::CosineAnnealing {
            initial_lr: 0.1,
            min_lr: 0.001,
            total_epochs: 100,
        };

        assert!(schedule.lr_at(0) > 0.09);
        let expected_mid = (0.1 + 0.001) / 2.0;
        assert!((schedule.lr_at(50) - expected_mid).abs() < 0.01);
        assert!(schedule.lr_at(100) < 0.01);
    }

    #[test]
    fn test_reduce_on_plateau() {
        let mut state = ReduceOnPlateauState::new(0.1, 0.5, 3, 1e-6);

        // Improving loss keeps the rate
        assert_eq!(state.step(1.0), 0.1);
        assert_eq!(state.step(0.9), 0.1);
        assert_eq!(state.step(0.8), 0.1);

        // Stagnation for patience epochs halves it
        assert_eq!(state.step(0.85), 0.1);
        assert_eq!(state.step(0.86), 0.1);
        assert_eq!(state.step(0.87), 0.05);
    }

    #[test]
    fn test_plateau_respects_min_lr() {
        let mut state = ReduceOnPlateauState::new(0.1, 0.01, 1, 0.05);
        state.step(1.0);
        assert_eq!(state.step(1.0), 0.05);
        // Already at the floor: further stagnation leaves it untouched
        assert_eq!(state.step(1.0), 0.05);
        assert_eq!(state.step(1.0), 0.05);
    }
}
