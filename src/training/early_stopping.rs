//! Early stopping on the test loss
//!
//! Training halts once the monitored loss has gone `patience` consecutive
//! observations without improving by more than `min_delta`. Once tripped the
//! stop is permanent.

use serde::{Deserialize, Serialize};
use tracing::info;

/// Early-stopping criterion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarlyStoppingConfig {
    /// Number of non-improving observations tolerated before stopping
    pub patience: usize,
    /// Minimum decrease counted as an improvement
    pub min_delta: f64,
}

impl Default for EarlyStoppingConfig {
    fn default() -> Self {
        Self {
            patience: 10,
            min_delta: 0.01,
        }
    }
}

/// Tracks the best loss seen so far and the non-improvement streak
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    config: EarlyStoppingConfig,
    best: f64,
    counter: usize,
    stopped: bool,
}

impl EarlyStopping {
    pub fn new(config: EarlyStoppingConfig) -> Self {
        Self {
            config,
            best: f64::INFINITY,
            counter: 0,
            stopped: false,
        }
    }

    /// Feed one loss observation; returns true once training should stop
    pub fn observe(&mut self, loss: f64) -> bool {
        if self.stopped {
            return true;
        }

        if self.best - loss > self.config.min_delta {
            self.best = loss;
            self.counter = 0;
        } else {
            self.counter += 1;
            if self.counter >= self.config.patience {
                info!(
                    "Early stopping: no improvement beyond {} for {} observations (best {:.6})",
                    self.config.min_delta, self.counter, self.best
                );
                self.stopped = true;
            }
        }

        self.stopped
    }

    /// Best loss observed so far
    pub fn best(&self) -> f64 {
        self.best
    }

    /// Whether the stop has tripped
    pub fn stopped(&self) -> bool {
        self.stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stops_after_patience_exhausted() {
        let mut es = EarlyStopping::new(EarlyStoppingConfig {
            patience: 3,
            min_delta: 0.1,
        });

        assert!(!es.observe(1.0));
        assert!(!es.observe(0.95)); // improvement below min_delta: counter 1
        assert!(!es.observe(0.95)); // counter 2
        assert!(es.observe(0.95)); // counter 3: stop
        assert_eq!(es.best(), 1.0);
    }

    #[test]
    fn test_steady_improvement_never_stops() {
        let mut es = EarlyStopping::new(EarlyStoppingConfig {
            patience: 2,
            min_delta: 0.1,
        });

        for loss in [1.0, 0.8, 0.6, 0.4] {
            assert!(!es.observe(loss));
        }
        assert_eq!(es.best(), 0.4);
    }

    #[test]
    fn test_stop_is_permanent() {
        let mut es = EarlyStopping::new(EarlyStoppingConfig {
            patience: 1,
            min_delta: 0.0,
        });

        assert!(!es.observe(1.0));
        assert!(es.observe(1.0));
        // A later improvement does not resurrect the run
        assert!(es.observe(0.1));
        assert!(es.stopped());
    }
}
