//! VAE training loop
//!
//! A custom epoch loop over burn's optimizer API rather than the high-level
//! LearnerBuilder: batches are assembled lazily from shuffled indices, the
//! beta-weighted VAE loss is stepped with Adam, and the test split is
//! evaluated once per epoch on the inner (non-autodiff) backend.

use burn::{
    data::dataloader::batcher::Batcher,
    data::dataset::Dataset,
    module::{AutodiffModule, Module},
    optim::{AdamConfig, GradientsParams, Optimizer},
    record::CompactRecorder,
    tensor::{backend::AutodiffBackend, backend::Backend, Tensor},
};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::dataset::{Augmenter, VaeBatcher, VaeItem};
use crate::model::{DiskVae, TrainingConfig};
use crate::tracking::{recon_wall, RunTracker};
use crate::training::early_stopping::EarlyStopping;
use crate::training::loss::{vae_loss, LossTerms};
use crate::training::scheduler::{ReduceOnPlateauState, SchedulerKind};
use crate::utils::error::{PpdaeError, Result};
use crate::utils::logging::EpochTimer;

/// Sample pairs shown per reconstruction wall
const WALL_COLS: usize = 8;

/// Append-only record of loss components over a run
#[derive(Debug, Clone, Default)]
pub struct LossHistory {
    pub total: Vec<f64>,
    pub reconstruction: Vec<f64>,
    pub divergence: Vec<f64>,
}

impl LossHistory {
    fn push(&mut self, terms: &LossTerms) {
        self.total.push(terms.total);
        self.reconstruction.push(terms.reconstruction);
        self.divergence.push(terms.divergence);
    }

    pub fn len(&self) -> usize {
        self.total.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total.is_empty()
    }

    pub fn last_total(&self) -> Option<f64> {
        self.total.last().copied()
    }
}

/// Mutable state carried across epochs
#[derive(Debug, Clone, Default)]
pub struct TrainerState {
    /// Current zero-based epoch
    pub epoch: usize,
    /// Optimizer steps taken so far
    pub num_steps: usize,
    /// Learning rate in effect
    pub current_lr: f64,
    /// Per-step training losses
    pub train_loss: LossHistory,
    /// Per-evaluation-pass test losses
    pub test_loss: LossHistory,
}

/// Pixel rows extracted from a batch for a reconstruction wall
struct WallData {
    inputs: Vec<Vec<f32>>,
    recons: Vec<Vec<f32>>,
    height: usize,
    width: usize,
}

/// Drives VAE training over an autodiff backend
pub struct Trainer<B: AutodiffBackend> {
    model: DiskVae<B>,
    config: TrainingConfig,
    state: TrainerState,
    tracker: Option<RunTracker>,
    device: B::Device,
    rng: ChaCha8Rng,
}

impl<B: AutodiffBackend> Trainer<B> {
    pub fn new(
        model: DiskVae<B>,
        config: TrainingConfig,
        device: B::Device,
        tracker: Option<RunTracker>,
    ) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let current_lr = config.learning_rate;
        Self {
            model,
            config,
            state: TrainerState {
                current_lr,
                ..Default::default()
            },
            tracker,
            device,
            rng,
        }
    }

    /// Trained model
    pub fn model(&self) -> &DiskVae<B> {
        &self.model
    }

    /// Accumulated training state
    pub fn state(&self) -> &TrainerState {
        &self.state
    }

    /// Run the full training loop.
    ///
    /// The test set may be empty; the plateau scheduler and early stopping
    /// then fall back to the train-epoch mean loss.
    pub fn fit(
        &mut self,
        train: &dyn Dataset<VaeItem>,
        test: &dyn Dataset<VaeItem>,
    ) -> Result<()> {
        self.config.validate()?;
        if train.len() == 0 {
            return Err(PpdaeError::Training("training dataset is empty".to_string()));
        }
        if test.len() == 0 {
            warn!("Test set is empty; stopping criteria will monitor the training loss");
        }

        if let Some(tracker) = &self.tracker {
            self.config.save(&tracker.run_dir().join("config.json"))?;
        }

        let batcher = VaeBatcher::<B>::new(self.device.clone());
        let mut optimizer = AdamConfig::new().init();
        let mut model = self.model.clone();

        let mut early_stopping = self
            .config
            .early_stopping
            .clone()
            .map(EarlyStopping::new);
        let mut plateau = match &self.config.scheduler {
            SchedulerKind::Plateau {
                factor,
                patience,
                min_lr,
            } => Some(ReduceOnPlateauState::new(
                self.config.learning_rate,
                *factor,
                *patience,
                *min_lr,
            )),
            _ => None,
        };
        let augmenter = self.config.augment.then(Augmenter::default);

        info!(
            "Training for up to {} epochs ({} train / {} test samples, batch size {})",
            self.config.epochs,
            train.len(),
            test.len(),
            self.config.batch_size
        );

        let mut timer = EpochTimer::new(self.config.epochs);

        for epoch in 0..self.config.epochs {
            self.state.epoch = epoch;
            timer.start_epoch(epoch);

            if let SchedulerKind::Epoch { schedule } = &self.config.scheduler {
                self.state.current_lr = schedule.lr_at(epoch);
            }
            let beta = self.config.beta.value(epoch);

            let (updated, train_mean) =
                self.train_epoch(model, &mut optimizer, &batcher, train, augmenter.as_ref(), beta)?;
            model = updated;

            let test_mean = self.evaluate(&model, test, beta, epoch)?;
            let monitored = test_mean.map(|t| t.total).unwrap_or(train_mean.total);

            if let Some(plateau) = &mut plateau {
                let new_lr = plateau.step(monitored);
                if new_lr != self.state.current_lr {
                    info!(
                        "Plateau: learning rate {:.2e} -> {:.2e}",
                        self.state.current_lr, new_lr
                    );
                }
                self.state.current_lr = new_lr;
            }

            match test_mean {
                Some(t) => info!(
                    "Epoch {}: train {:.4} | test {:.4} (mse {:.4}, kld {:.4}) | beta {:.2} | lr {:.2e}",
                    epoch + 1,
                    train_mean.total,
                    t.total,
                    t.reconstruction,
                    t.divergence,
                    beta,
                    self.state.current_lr
                ),
                None => info!(
                    "Epoch {}: train {:.4} (mse {:.4}, kld {:.4}) | beta {:.2} | lr {:.2e}",
                    epoch + 1,
                    train_mean.total,
                    train_mean.reconstruction,
                    train_mean.divergence,
                    beta,
                    self.state.current_lr
                ),
            }
            timer.end_epoch(epoch);

            if let Some(es) = &mut early_stopping {
                if es.observe(monitored) {
                    break;
                }
            }
        }

        if self.config.save {
            if let Some(tracker) = &self.tracker {
                let path = tracker.run_dir().join("model");
                model
                    .clone()
                    .save_file(&path, &CompactRecorder::new())
                    .map_err(|e| {
                        PpdaeError::Model(format!("failed to save checkpoint: {:?}", e))
                    })?;
                info!("Saved checkpoint to {:?}", path);
            }
        }

        info!("Training finished in {:.1}s", timer.elapsed_secs());
        self.model = model;
        Ok(())
    }

    /// One pass over the training set; returns the updated model and the
    /// epoch-mean loss terms.
    fn train_epoch<O: Optimizer<DiskVae<B>, B>>(
        &mut self,
        mut model: DiskVae<B>,
        optimizer: &mut O,
        batcher: &VaeBatcher<B>,
        train: &dyn Dataset<VaeItem>,
        augmenter: Option<&Augmenter>,
        beta: f64,
    ) -> Result<(DiskVae<B>, LossTerms)> {
        let batch_size = self.config.batch_size;
        let mut indices: Vec<usize> = (0..train.len()).collect();
        indices.shuffle(&mut self.rng);
        let num_batches = (indices.len() + batch_size - 1) / batch_size;

        let mut sum = (0.0, 0.0, 0.0);
        let mut batches = 0usize;
        let mut wall: Option<WallData> = None;
        let mut latents: Option<Vec<Vec<f32>>> = None;

        for batch_idx in 0..num_batches {
            let start = batch_idx * batch_size;
            let end = (start + batch_size).min(indices.len());
            let mut items: Vec<VaeItem> = indices[start..end]
                .iter()
                .filter_map(|&i| train.get(i))
                .collect();

            if items.is_empty() {
                continue;
            }

            if let Some(aug) = augmenter {
                for item in &mut items {
                    let img = item.to_array()?;
                    let params = std::mem::take(&mut item.params);
                    *item = VaeItem::from_array(aug.apply(img.view(), &mut self.rng), params);
                }
            }

            let batch = batcher.batch(items);
            let output = model.forward(batch.images.clone());

            let (loss, terms) = vae_loss(
                output.reconstruction.clone(),
                batch.images.clone(),
                output.mu.clone(),
                output.logvar,
                beta,
            );

            self.state.train_loss.push(&terms);
            sum.0 += terms.total;
            sum.1 += terms.reconstruction;
            sum.2 += terms.divergence;
            batches += 1;

            if wall.is_none() {
                wall = Some(wall_data(batch.images.clone(), output.reconstruction, WALL_COLS)?);
                latents = Some(latent_rows(output.mu)?);
            }

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optimizer.step(self.state.current_lr, model, grads);
            self.state.num_steps += 1;

            if self.state.num_steps % self.config.print_every == 0 {
                info!(
                    "  step {:>6}: loss {:.4} (mse {:.4}, kld {:.4})",
                    self.state.num_steps, terms.total, terms.reconstruction, terms.divergence
                );
                if let Some(tracker) = &mut self.tracker {
                    tracker.log_scalars(
                        self.state.num_steps,
                        &[
                            ("train_loss", terms.total),
                            ("train_mse", terms.reconstruction),
                            ("train_kld", terms.divergence),
                            ("beta", beta),
                            ("lr", self.state.current_lr),
                        ],
                    )?;
                }
            }
        }

        if let Some(tracker) = &self.tracker {
            if let Some(wall) = &wall {
                tracker.log_image(
                    &format!("recon_train_e{}", self.state.epoch),
                    &recon_wall(&wall.inputs, &wall.recons, wall.height, wall.width, WALL_COLS),
                )?;
            }
            if let Some(rows) = &latents {
                tracker.log_latents(&format!("mu_train_e{}", self.state.epoch), rows)?;
            }
        }

        let n = batches.max(1) as f64;
        Ok((
            model,
            LossTerms {
                total: sum.0 / n,
                reconstruction: sum.1 / n,
                divergence: sum.2 / n,
            },
        ))
    }

    /// One evaluation pass over the test set on the inner backend.
    ///
    /// Appends a single mean record to the test history; returns None when
    /// the test set is empty.
    fn evaluate(
        &mut self,
        model: &DiskVae<B>,
        test: &dyn Dataset<VaeItem>,
        beta: f64,
        epoch: usize,
    ) -> Result<Option<LossTerms>> {
        if test.len() == 0 {
            return Ok(None);
        }

        let device = <B::InnerBackend as Backend>::Device::default();
        let batcher = VaeBatcher::<B::InnerBackend>::new(device);
        let inner_model = model.valid();

        let mut sum = (0.0, 0.0, 0.0);
        let mut batches = 0usize;
        let mut wall: Option<WallData> = None;

        for start in (0..test.len()).step_by(self.config.batch_size) {
            let end = (start + self.config.batch_size).min(test.len());
            let items: Vec<VaeItem> = (start..end).filter_map(|i| test.get(i)).collect();

            if items.is_empty() {
                continue;
            }

            let batch = batcher.batch(items);
            let output = inner_model.forward(batch.images.clone());

            let (_, terms) = vae_loss(
                output.reconstruction.clone(),
                batch.images.clone(),
                output.mu,
                output.logvar,
                beta,
            );

            sum.0 += terms.total;
            sum.1 += terms.reconstruction;
            sum.2 += terms.divergence;
            batches += 1;

            // Test walls every other epoch
            if wall.is_none() && epoch % 2 == 0 {
                wall = Some(wall_data(batch.images.clone(), output.reconstruction, WALL_COLS)?);
            }
        }

        if let (Some(wall), Some(tracker)) = (&wall, &self.tracker) {
            tracker.log_image(
                &format!("recon_test_e{}", epoch),
                &recon_wall(&wall.inputs, &wall.recons, wall.height, wall.width, WALL_COLS),
            )?;
        }

        let n = batches.max(1) as f64;
        let mean = LossTerms {
            total: sum.0 / n,
            reconstruction: sum.1 / n,
            divergence: sum.2 / n,
        };
        self.state.test_loss.push(&mean);

        if let Some(tracker) = &mut self.tracker {
            tracker.log_scalars(
                self.state.num_steps,
                &[
                    ("test_loss", mean.total),
                    ("test_mse", mean.reconstruction),
                    ("test_kld", mean.divergence),
                ],
            )?;
        }

        Ok(Some(mean))
    }
}

/// Extract first-channel pixel rows from a batch pair for a wall
fn wall_data<B: Backend>(
    inputs: Tensor<B, 4>,
    recons: Tensor<B, 4>,
    n_cols: usize,
) -> Result<WallData> {
    let [batch, channels, height, width] = inputs.dims();
    let n = batch.min(n_cols);
    let stride = channels * height * width;

    let raw_in: Vec<f32> = inputs
        .into_data()
        .to_vec()
        .map_err(|e| PpdaeError::Tracking(format!("wall extraction failed: {:?}", e)))?;
    let raw_out: Vec<f32> = recons
        .into_data()
        .to_vec()
        .map_err(|e| PpdaeError::Tracking(format!("wall extraction failed: {:?}", e)))?;

    let rows = |raw: &[f32]| -> Vec<Vec<f32>> {
        (0..n)
            .map(|s| raw[s * stride..s * stride + height * width].to_vec())
            .collect()
    };

    Ok(WallData {
        inputs: rows(&raw_in),
        recons: rows(&raw_out),
        height,
        width,
    })
}

/// Per-sample latent mean vectors from a batch
fn latent_rows<B: Backend>(mu: Tensor<B, 2>) -> Result<Vec<Vec<f32>>> {
    let [batch, latent] = mu.dims();
    let raw: Vec<f32> = mu
        .into_data()
        .to_vec()
        .map_err(|e| PpdaeError::Tracking(format!("latent extraction failed: {:?}", e)))?;

    Ok((0..batch)
        .map(|s| raw[s * latent..(s + 1) * latent].to_vec())
        .collect())
}
