//! Per-stage thread pools.
//!
//! Each numeric stage fans its independent work units out over its own
//! dedicated rayon pool: one for the forward pass, one per backward phase
//! (output delta, hidden propagation) and one per update phase (biases,
//! weights). Pool sizes come from configuration and are validated here, once,
//! at startup; the hot passes assume them.
//!
//! The forward count doubles as the chunk count: the mini-batch is split into
//! that many equal groups of samples, so it must divide the batch size.

use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Worker counts for the five parallel regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageThreads {
    /// Forward pass (also the number of sample chunks).
    pub forward: usize,
    /// Backward phase 1: output-layer deltas.
    pub delta: usize,
    /// Backward phase 2: hidden-layer propagation.
    pub backprop: usize,
    /// Update phase 1: bias cells.
    pub bias: usize,
    /// Update phase 2: weight cells.
    pub weight: usize,
}

impl StageThreads {
    /// Uniform counts for all five stages.
    pub fn uniform(n: usize) -> Self {
        Self {
            forward: n,
            delta: n,
            backprop: n,
            bias: n,
            weight: n,
        }
    }

    pub fn validate(&self, batch_size: usize) -> Result<()> {
        for (name, n) in [
            ("forward", self.forward),
            ("delta", self.delta),
            ("backprop", self.backprop),
            ("bias", self.bias),
            ("weight", self.weight),
        ] {
            if n == 0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} thread count must be > 0"
                )));
            }
        }
        if batch_size % self.forward != 0 {
            return Err(Error::InvalidConfig(format!(
                "forward chunk count {} does not divide batch size {batch_size}",
                self.forward
            )));
        }
        Ok(())
    }
}

pub struct StagePools {
    threads: StageThreads,
    pub(crate) forward: ThreadPool,
    pub(crate) delta: ThreadPool,
    pub(crate) backprop: ThreadPool,
    pub(crate) bias: ThreadPool,
    pub(crate) weight: ThreadPool,
}

impl StagePools {
    pub fn new(threads: StageThreads, batch_size: usize) -> Result<Self> {
        threads.validate(batch_size)?;
        Ok(Self {
            threads,
            forward: build_pool(threads.forward)?,
            delta: build_pool(threads.delta)?,
            backprop: build_pool(threads.backprop)?,
            bias: build_pool(threads.bias)?,
            weight: build_pool(threads.weight)?,
        })
    }

    #[inline]
    pub fn threads(&self) -> StageThreads {
        self.threads
    }

    /// Number of sample groups the forward pass is split into.
    #[inline]
    pub fn forward_chunks(&self) -> usize {
        self.threads.forward
    }
}

fn build_pool(num_threads: usize) -> Result<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| Error::InvalidConfig(format!("could not build thread pool: {e}")))
}
