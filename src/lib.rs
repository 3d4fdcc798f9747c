//! Parallel mini-batch SGD for dense sigmoid networks.
//!
//! `batchnn` trains a fully-connected feedforward network on an IDX-format
//! image/label dataset and reports test accuracy plus per-stage timing. It is
//! a small-core trainer, not a tensor library: one topology class (dense
//! layers, sigmoid, gradient descent) implemented directly over flat buffers.
//!
//! # Design goals
//!
//! - Flat tensors: weights, biases and all per-batch state are single
//!   contiguous `Vec<f64>` buffers addressed through a precomputed offset
//!   table ([`Topology`]). No per-layer objects, no per-step allocation.
//! - Deterministic parallelism: each stage fans independent (sample, cell)
//!   work out over its own configured thread pool ([`StagePools`]), and
//!   results are bit-identical for any pool sizes.
//! - Explicit orchestration: the training loop wires
//!   Forward -> Backward -> Update per mini-batch and scores the test split
//!   once per epoch, accumulating per-stage wall and CPU time
//!   ([`StageTimers`]).
//!
//! # Data layout and shapes
//!
//! - Scalars are `f64`.
//! - [`Dataset`] stores samples contiguously in row-major layout.
//! - Transition `i`'s weight matrix is row-major `(width(i), width(i+1))`,
//!   row = source neuron, column = destination neuron.
//! - Batch buffers are `(batch_size, total_neurons)`: sample `k`'s value for
//!   neuron `j` of layer `i` is at `k * total_neurons + neuron_offset(i) + j`.
//!
//! # Panics vs `Result`
//!
//! Two API layers, on purpose:
//!
//! - Low-level hot path (panics on misuse): [`Network::forward`],
//!   [`Network::backward`], [`Network::update`]. Shape mismatches are
//!   programmer error and assert.
//! - Validated surface (returns [`Result`]): constructors, [`Network::fit`],
//!   [`metrics::evaluate`], [`Network::predict_into`], configuration and
//!   dataset loading.
//!
//! # Quick start
//!
//! ```rust
//! use batchnn::{Dataset, FitConfig, Network, StageThreads};
//!
//! # fn main() -> batchnn::Result<()> {
//! let inputs = vec![
//!     0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0,
//!     0.1, 0.0, 0.0, 0.9, 0.9, 0.1, 1.0, 0.9,
//! ];
//! let labels = vec![0, 1, 1, 0, 0, 1, 1, 0];
//! let data = Dataset::from_flat(inputs, labels, 2)?;
//!
//! let mut net = Network::new_with_seed(&[2, 8, 2], 0)?;
//! let report = net.fit(
//!     &data,
//!     &data,
//!     &FitConfig {
//!         learning_rate: 0.5,
//!         batch_size: 4,
//!         epochs: 10,
//!         threads: StageThreads::uniform(2),
//!     },
//!     0,
//! )?;
//! assert_eq!(report.epoch_correct.len(), 10);
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod batch;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod net;
pub mod params;
pub mod pool;
pub mod report;
pub mod timing;
pub mod topology;
pub mod train;

pub use batch::Activations;
pub use config::RunConfig;
pub use data::Dataset;
pub use error::{Error, Result};
pub use net::Network;
pub use params::Params;
pub use pool::{StagePools, StageThreads};
pub use timing::{StageSpan, StageTimers, TimingSnapshot};
pub use topology::Topology;
pub use train::{FitConfig, FitReport};
