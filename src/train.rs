//! Training orchestration.
//!
//! One "epoch" is `train_len / batch_size` mini-batch iterations, each drawing
//! its samples uniformly at random **with replacement** from the training
//! split. This deliberately differs from the textbook shuffle-and-partition
//! epoch: draws are independent, so a sample can appear several times (or not
//! at all) within one epoch. After each epoch the network is scored on the
//! test split and the running best is kept.
//!
//! Mini-batches run strictly Forward -> Backward -> Update; the parameter
//! store is only mutated by the update step, after the backward pass has fully
//! joined, so consecutive batches never overlap.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::batch::Activations;
use crate::data::Dataset;
use crate::metrics;
use crate::net::Network;
use crate::pool::{StagePools, StageThreads};
use crate::timing::{StageTimers, TimingSnapshot};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy)]
pub struct FitConfig {
    pub learning_rate: f64,
    pub batch_size: usize,
    pub epochs: usize,
    pub threads: StageThreads,
}

#[derive(Debug, Clone)]
pub struct FitReport {
    /// Best correct count seen at any epoch boundary (monotonic max).
    pub best_correct: usize,
    /// Test split size the counts are out of.
    pub test_len: usize,
    /// Correct count after each epoch, in order.
    pub epoch_correct: Vec<usize>,
    pub timing: TimingSnapshot,
}

impl Network {
    /// Train with a seeded sampler. See [`Network::fit_with_rng`].
    pub fn fit(
        &mut self,
        train: &Dataset,
        test: &Dataset,
        cfg: &FitConfig,
        seed: u64,
    ) -> Result<FitReport> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.fit_with_rng(train, test, cfg, &mut rng)
    }

    /// Train for `cfg.epochs` epochs and score the test split after each one.
    ///
    /// Validates the datasets and hyper-parameters up front; the numeric
    /// passes themselves check nothing beyond shape contracts.
    pub fn fit_with_rng<R: Rng + ?Sized>(
        &mut self,
        train: &Dataset,
        test: &Dataset,
        cfg: &FitConfig,
        rng: &mut R,
    ) -> Result<FitReport> {
        self.validate_split(train, "train")?;
        self.validate_split(test, "test")?;
        if cfg.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be > 0".to_owned()));
        }
        if !(cfg.learning_rate.is_finite() && cfg.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(
                "learning rate must be finite and > 0".to_owned(),
            ));
        }
        if cfg.batch_size == 0 {
            return Err(Error::InvalidConfig("batch size must be > 0".to_owned()));
        }
        if cfg.batch_size > train.len() {
            return Err(Error::InvalidConfig(format!(
                "batch size {} exceeds training split size {}",
                cfg.batch_size,
                train.len()
            )));
        }

        let pools = StagePools::new(cfg.threads, cfg.batch_size)?;
        let mut acts = Activations::new(self.topology(), cfg.batch_size);
        let mut scratch = Activations::new(self.topology(), 1);
        let mut timers = StageTimers::default();

        let steps_per_epoch = train.len() / cfg.batch_size;
        debug!(
            "training {:?}: {} epochs x {steps_per_epoch} mini-batches of {}",
            self.topology().widths(),
            cfg.epochs,
            cfg.batch_size
        );
        let mut best = 0usize;
        let mut epoch_correct = Vec::with_capacity(cfg.epochs);

        for epoch in 0..cfg.epochs {
            for _ in 0..steps_per_epoch {
                for k in 0..cfg.batch_size {
                    let pick = rng.gen_range(0..train.len());
                    acts.set_input(self.topology(), k, train.input(pick));
                    acts.set_target(self.topology(), k, train.label(pick));
                }
                self.forward(&mut acts, &pools, &mut timers);
                self.backward(&mut acts, &pools, &mut timers);
                self.update(&acts, cfg.learning_rate, &pools, &mut timers);
            }

            let correct = metrics::evaluate(self, test, &mut scratch)?;
            best = best.max(correct);
            epoch_correct.push(correct);
            info!(
                "epoch {epoch}: {correct}/{} correct (best {best})",
                test.len()
            );
        }

        Ok(FitReport {
            best_correct: best,
            test_len: test.len(),
            epoch_correct,
            timing: timers.snapshot(),
        })
    }

    fn validate_split(&self, split: &Dataset, name: &str) -> Result<()> {
        if split.is_empty() {
            return Err(Error::InvalidData(format!(
                "{name} split must not be empty"
            )));
        }
        if split.input_dim() != self.topology().input_width() {
            return Err(Error::InvalidData(format!(
                "{name} input_dim {} does not match network input width {}",
                split.input_dim(),
                self.topology().input_width()
            )));
        }
        let out_w = self.topology().output_width();
        if let Some(max) = split.max_label() {
            if max >= out_w {
                return Err(Error::InvalidData(format!(
                    "{name} split has label {max}, but the network has {out_w} outputs"
                )));
            }
        }
        Ok(())
    }
}
