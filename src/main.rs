//! PPDAE Training CLI
//!
//! Entry point for training variational autoencoders on synthetic
//! protoplanetary-disk images (or MNIST as a pipeline sanity check).

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use ppdae::backend::{backend_name, default_device, TrainingBackend};
use ppdae::dataset::{split_indices, DiskDataset, DiskHost, MnistVaeDataset, SubsetDataset};
use ppdae::model::DiskVaeConfig;
use ppdae::training::{BetaSchedule, EarlyStoppingConfig, LrSchedule, SchedulerKind, Trainer};
use ppdae::utils::logging::{init_logging, LogConfig};
use ppdae::{RunTracker, TrainingConfig};

/// Protoplanetary Disk Autoencoder
///
/// Trains a variational autoencoder on synthetic disk images with the
/// Burn framework.
#[derive(Parser, Debug)]
#[command(name = "ppdae")]
#[command(version = ppdae::VERSION)]
#[command(about = "VAE training on synthetic protoplanetary-disk images", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train the VAE
    Train {
        /// Dataset host: local, colab, or exalearn
        #[arg(long, default_value = "local")]
        host: String,

        /// Train on MNIST instead of disk images (pipeline sanity check)
        #[arg(long, default_value = "false")]
        mnist: bool,

        /// Use the raw image stack instead of the pre-normalized one
        #[arg(long, default_value = "false")]
        raw_images: bool,

        /// Subsample the dataset to 1000 images (quick experiments)
        #[arg(long, default_value = "false")]
        subsample: bool,

        /// Number of training epochs
        #[arg(short, long, default_value = "100")]
        epochs: usize,

        /// Batch size for training
        #[arg(short, long, default_value = "128")]
        batch_size: usize,

        /// Initial learning rate
        #[arg(short, long, default_value = "0.0001")]
        learning_rate: f64,

        /// Latent space dimensionality
        #[arg(long, default_value = "16")]
        latent_dim: usize,

        /// Beta schedule: "step" for the staircase ramp, or a fixed value
        #[arg(long, default_value = "step")]
        beta: String,

        /// Staircase start value
        #[arg(long, default_value = "0.0")]
        beta0: f64,

        /// Staircase increment
        #[arg(long, default_value = "0.2")]
        gamma: f64,

        /// Epochs per staircase step
        #[arg(long, default_value = "15")]
        beta_step: usize,

        /// LR scheduler: none, plateau, cosine, exp, or step
        #[arg(long, default_value = "none")]
        scheduler: String,

        /// LR reduction factor (plateau / step / exp schedulers)
        #[arg(long, default_value = "0.5")]
        lr_decay: f64,

        /// Epochs without improvement before the plateau scheduler reduces
        #[arg(long, default_value = "5")]
        lr_patience: usize,

        /// Learning rate floor for decaying schedulers
        #[arg(long, default_value = "1e-6")]
        min_lr: f64,

        /// Disable early stopping
        #[arg(long, default_value = "false")]
        no_early_stop: bool,

        /// Non-improving evaluations tolerated before early stopping
        #[arg(long, default_value = "10")]
        early_stop_patience: usize,

        /// Minimum loss decrease counted as an improvement
        #[arg(long, default_value = "0.01")]
        min_delta: f64,

        /// Fraction of samples held out for the test split
        #[arg(long, default_value = "0.2")]
        test_split: f64,

        /// Log training scalars every N steps
        #[arg(long, default_value = "50")]
        print_every: usize,

        /// Apply rotation/flip augmentation to training images
        #[arg(long, default_value = "false")]
        augment: bool,

        /// Random seed for reproducibility
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Root directory for run artifacts
        #[arg(short, long, default_value = "output/runs")]
        output_dir: String,

        /// Skip writing checkpoints and artifacts
        #[arg(long, default_value = "false")]
        no_save: bool,
    },

    /// Show dataset statistics
    Stats {
        /// Dataset host: local, colab, or exalearn
        #[arg(long, default_value = "local")]
        host: String,

        /// Use the raw image stack instead of the pre-normalized one
        #[arg(long, default_value = "false")]
        raw_images: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };
    if let Err(e) = init_logging(&log_config) {
        eprintln!("{} {}", "Warning:".yellow(), e);
    }

    print_banner();

    match cli.command {
        Commands::Train {
            host,
            mnist,
            raw_images,
            subsample,
            epochs,
            batch_size,
            learning_rate,
            latent_dim,
            beta,
            beta0,
            gamma,
            beta_step,
            scheduler,
            lr_decay,
            lr_patience,
            min_lr,
            no_early_stop,
            early_stop_patience,
            min_delta,
            test_split,
            print_every,
            augment,
            seed,
            output_dir,
            no_save,
        } => {
            let beta = parse_beta(&beta, beta0, gamma, beta_step)?;
            let scheduler = parse_scheduler(
                &scheduler,
                learning_rate,
                epochs,
                lr_decay,
                lr_patience,
                min_lr,
            )?;
            let early_stopping = (!no_early_stop).then_some(EarlyStoppingConfig {
                patience: early_stop_patience,
                min_delta,
            });

            let config = TrainingConfig {
                epochs,
                batch_size,
                learning_rate,
                print_every,
                test_split,
                seed,
                beta,
                scheduler,
                early_stopping,
                augment,
                save: !no_save,
            };
            config.validate()?;

            cmd_train(
                config,
                &host,
                mnist,
                !raw_images,
                subsample,
                latent_dim,
                &output_dir,
            )?;
        }

        Commands::Stats { host, raw_images } => {
            cmd_stats(&host, !raw_images)?;
        }
    }

    Ok(())
}

fn print_banner() {
    println!(
        "{}",
        r#"
 ╔═══════════════════════════════════════════════════════╗
 ║   PPDAE — Protoplanetary Disk Autoencoder             ║
 ║   VAE training on synthetic disk images with Burn     ║
 ╚═══════════════════════════════════════════════════════╝
  "#
        .cyan()
    );
}

fn parse_beta(beta: &str, beta0: f64, gamma: f64, step: usize) -> Result<BetaSchedule> {
    if beta.eq_ignore_ascii_case("step") {
        return Ok(BetaSchedule::Step { beta0, gamma, step });
    }
    let value: f64 = beta.parse().map_err(|_| {
        anyhow::anyhow!("--beta must be \"step\" or a number, got \"{}\"", beta)
    })?;
    Ok(BetaSchedule::Constant { value })
}

fn parse_scheduler(
    kind: &str,
    learning_rate: f64,
    epochs: usize,
    lr_decay: f64,
    lr_patience: usize,
    min_lr: f64,
) -> Result<SchedulerKind> {
    let scheduler = match kind.to_lowercase().as_str() {
        "none" => SchedulerKind::None,
        "plateau" => SchedulerKind::Plateau {
            factor: lr_decay,
            patience: lr_patience,
            min_lr,
        },
        "cosine" => SchedulerKind::Epoch {
            schedule: LrSchedule::CosineAnnealing {
                initial_lr: learning_rate,
                min_lr,
                total_epochs: epochs,
            },
        },
        "exp" => SchedulerKind::Epoch {
            schedule: LrSchedule::Exponential {
                initial_lr: learning_rate,
                decay_rate: lr_decay.powf(1.0 / epochs.max(1) as f64),
            },
        },
        "step" => SchedulerKind::Epoch {
            schedule: LrSchedule::StepDecay {
                initial_lr: learning_rate,
                decay_factor: lr_decay,
                step_epochs: vec![epochs / 2, 3 * epochs / 4],
            },
        },
        other => {
            anyhow::bail!(
                "unknown scheduler \"{}\", expected one of: none, plateau, cosine, exp, step",
                other
            )
        }
    };
    Ok(scheduler)
}

fn cmd_train(
    config: TrainingConfig,
    host: &str,
    mnist: bool,
    img_norm: bool,
    subsample: bool,
    latent_dim: usize,
    output_dir: &str,
) -> Result<()> {
    let device = default_device();

    println!("{}", "Training Configuration:".cyan().bold());
    println!("  Dataset:        {}", if mnist { "mnist".to_string() } else { host.to_string() });
    println!("  Epochs:         {}", config.epochs);
    println!("  Batch size:     {}", config.batch_size);
    println!("  Learning rate:  {}", config.learning_rate);
    println!("  Latent dim:     {}", latent_dim);
    println!("  Backend:        {}", backend_name());
    println!();

    let tracker = if config.save {
        Some(RunTracker::create(Path::new(output_dir))?)
    } else {
        None
    };

    if mnist {
        info!("Loading MNIST");
        let train = MnistVaeDataset::train();
        let test = MnistVaeDataset::test();

        let model = DiskVaeConfig::new(ppdae::dataset::mnist::MNIST_DIM, 1)
            .with_latent_dim(latent_dim)
            .init::<TrainingBackend>(&device);

        let mut trainer = Trainer::new(model, config, device, tracker);
        trainer.fit(&train, &test)?;
    } else {
        let host: DiskHost = host.parse()?;
        let subsample_seed = subsample.then_some(config.seed);
        let dataset = Arc::new(DiskDataset::load(host, img_norm, subsample_seed)?);

        use burn::data::dataset::Dataset;
        let split = split_indices(dataset.len(), config.test_split, true, config.seed)?;
        let train = SubsetDataset::new(Arc::clone(&dataset), split.train);
        let test = SubsetDataset::new(Arc::clone(&dataset), split.test);

        let model = DiskVaeConfig::new(dataset.img_dim(), dataset.channels())
            .with_latent_dim(latent_dim)
            .init::<TrainingBackend>(&device);

        let mut trainer = Trainer::new(model, config, device, tracker);
        trainer.fit(&train, &test)?;
    }

    println!();
    println!("{}", "Training Complete!".green().bold());
    Ok(())
}

fn cmd_stats(host: &str, img_norm: bool) -> Result<()> {
    use burn::data::dataset::Dataset;

    let host: DiskHost = host.parse()?;
    info!("Computing dataset statistics for host {}", host);

    let dataset = DiskDataset::load(host, img_norm, None)?;

    println!("{}", "Dataset Statistics:".cyan().bold());
    println!("  Samples:   {}", dataset.len());
    println!(
        "  Images:    {}x{}x{}",
        dataset.channels(),
        dataset.img_dim(),
        dataset.img_dim()
    );
    println!();

    println!("{}", "Parameter Ranges:".cyan().bold());
    for (col, name) in ppdae::dataset::PARAM_NAMES.iter().enumerate() {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for row in 0..dataset.len() {
            let value = dataset.params_row(row)[col];
            min = min.min(value);
            max = max.max(value);
        }
        println!("  {:8} [{:>10.4}, {:>10.4}]", name, min, max);
    }

    Ok(())
}
