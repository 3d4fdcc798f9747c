//! Run configuration.
//!
//! A run is fully described by one JSON document: topology, hyper-parameters,
//! the five stage thread counts, dataset paths and report paths. The document
//! is deserialized as-is and then validated in one place; every constraint the
//! numeric core assumes is rejected here, before any buffer is allocated.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::pool::StageThreads;
use crate::train::FitConfig;
use crate::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Layer widths, input first, output last.
    pub layer_sizes: Vec<usize>,
    pub learning_rate: f64,
    pub mini_batch_size: usize,
    pub epochs: usize,
    pub threads: StageThreads,

    pub train_images: PathBuf,
    pub train_labels: PathBuf,
    pub test_images: PathBuf,
    pub test_labels: PathBuf,

    /// Human-readable report, appended to after the run.
    pub report_file: PathBuf,
    /// Optional structured report, one JSON record appended per run.
    #[serde(default)]
    pub report_json: Option<PathBuf>,
    /// Seed for weight initialization and batch sampling. Entropy-seeded when
    /// absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl RunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| Error::InvalidConfig(format!("could not open {}: {e}", path.display())))?;
        let cfg: RunConfig = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::InvalidConfig(format!("{}: {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.layer_sizes.len() < 2 {
            return Err(Error::InvalidConfig(
                "layer_sizes must include input and output layers".to_owned(),
            ));
        }
        if self.layer_sizes.contains(&0) {
            return Err(Error::InvalidConfig(
                "all layer sizes must be > 0".to_owned(),
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(
                "learning_rate must be finite and > 0".to_owned(),
            ));
        }
        if self.mini_batch_size == 0 {
            return Err(Error::InvalidConfig(
                "mini_batch_size must be > 0".to_owned(),
            ));
        }
        if self.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be > 0".to_owned()));
        }
        self.threads.validate(self.mini_batch_size)
    }

    pub fn fit_config(&self) -> FitConfig {
        FitConfig {
            learning_rate: self.learning_rate,
            batch_size: self.mini_batch_size,
            epochs: self.epochs,
            threads: self.threads,
        }
    }
}
