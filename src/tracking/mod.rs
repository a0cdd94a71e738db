//! Local run tracking
//!
//! Each training run gets its own timestamped directory holding the config,
//! a JSONL scalar log, reconstruction images, and the model checkpoint.
//! Everything is written locally; no network service is involved.

pub mod recon;

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use image::GrayImage;
use serde_json::json;
use tracing::{debug, info};

use crate::utils::error::{PpdaeError, Result};

pub use recon::recon_wall;

/// Writer for one training run's artifacts
pub struct RunTracker {
    run_dir: PathBuf,
    metrics: File,
}

impl RunTracker {
    /// Create a fresh `run_YYYYmmdd_HHMMSS` directory under `root`
    pub fn create(root: &Path) -> Result<Self> {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let run_dir = root.join(format!("run_{}", stamp));
        fs::create_dir_all(run_dir.join("images"))?;

        let metrics = OpenOptions::new()
            .create(true)
            .append(true)
            .open(run_dir.join("metrics.jsonl"))?;

        info!("Tracking run artifacts in {:?}", run_dir);
        Ok(Self { run_dir, metrics })
    }

    /// Directory holding this run's artifacts
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Append one scalar record to the metrics log
    pub fn log_scalars(&mut self, step: usize, scalars: &[(&str, f64)]) -> Result<()> {
        let mut record = serde_json::Map::new();
        record.insert("step".to_string(), json!(step));
        for (name, value) in scalars {
            record.insert(name.to_string(), json!(value));
        }

        let line = serde_json::Value::Object(record).to_string();
        writeln!(self.metrics, "{}", line)?;
        Ok(())
    }

    /// Save a grayscale image under `images/` with the given file stem
    pub fn log_image(&self, name: &str, image: &GrayImage) -> Result<()> {
        let path = self.run_dir.join("images").join(format!("{}.png", name));
        image
            .save(&path)
            .map_err(|e| PpdaeError::Tracking(format!("failed to save {:?}: {}", path, e)))?;
        debug!("Saved image {:?}", path);
        Ok(())
    }

    /// Save a batch of latent vectors as JSON under `latents/`
    pub fn log_latents(&self, name: &str, rows: &[Vec<f32>]) -> Result<()> {
        let dir = self.run_dir.join("latents");
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.json", name));
        fs::write(&path, serde_json::to_string(rows)?)?;
        debug!("Saved latents {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_create_and_log() {
        let root = env::temp_dir().join("ppdae_tracker_test");
        let mut tracker = RunTracker::create(&root).unwrap();

        tracker
            .log_scalars(1, &[("train_loss", 0.5), ("beta", 0.0)])
            .unwrap();
        tracker.log_scalars(2, &[("train_loss", 0.4)]).unwrap();

        let contents = fs::read_to_string(tracker.run_dir().join("metrics.jsonl")).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["step"], 1);
        assert_eq!(first["train_loss"], 0.5);

        fs::remove_dir_all(tracker.run_dir()).unwrap();
    }

    #[test]
    fn test_log_latents_round_trip() {
        let root = env::temp_dir().join("ppdae_tracker_latents_test");
        let tracker = RunTracker::create(&root).unwrap();

        let rows = vec![vec![0.5f32, -1.0], vec![2.0, 0.0]];
        tracker.log_latents("mu_train_e3", &rows).unwrap();

        let json =
            fs::read_to_string(tracker.run_dir().join("latents/mu_train_e3.json")).unwrap();
        let loaded: Vec<Vec<f32>> = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, rows);

        fs::remove_dir_all(tracker.run_dir()).unwrap();
    }

    #[test]
    fn test_log_image_writes_png() {
        let root = env::temp_dir().join("ppdae_tracker_image_test");
        let tracker = RunTracker::create(&root).unwrap();

        let image = GrayImage::from_pixel(8, 8, image::Luma([128u8]));
        tracker.log_image("recon_train_e0", &image).unwrap();

        assert!(tracker
            .run_dir()
            .join("images/recon_train_e0.png")
            .exists());
        fs::remove_dir_all(tracker.run_dir()).unwrap();
    }
}
