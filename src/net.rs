//! The network core: forward, backward and update passes over a mini-batch.
//!
//! `Network` owns a [`Topology`] and its [`Params`]; all per-batch state lives
//! in a caller-provided [`Activations`]. The three passes are the only code
//! that touches the flat tensors, and they share one addressing scheme:
//! sample `k`, layer `i`, neuron `j` is `k * total_neurons + neuron_offset(i)
//! + j`.
//!
//! # Ordering and determinism
//!
//! Layers are strictly sequential inside the forward pass and inside the
//! backward propagation phase; samples (and parameter cells in the update
//! pass) are mutually independent and are what gets fanned out across the
//! stage pools. Every per-cell reduction runs in a fixed sequential order, so
//! results are bit-identical for any pool or chunk configuration.
//!
//! # Panics vs `Result`
//!
//! The passes are the hot path: shape mismatches are programmer error and
//! panic via `assert!`. Constructors and [`Network::predict_into`] validate
//! and return [`Result`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::activation::{sigmoid, sigmoid_prime};
use crate::batch::Activations;
use crate::params::Params;
use crate::pool::StagePools;
use crate::timing::StageTimers;
use crate::topology::Topology;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct Network {
    topology: Topology,
    params: Params,
}

impl Network {
    pub fn new_with_seed(widths: &[usize], seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new_with_rng(widths, &mut rng)
    }

    pub fn new_with_rng<R: Rng + ?Sized>(widths: &[usize], rng: &mut R) -> Result<Self> {
        let topology = Topology::new(widths)?;
        let params = Params::new_with_rng(&topology, rng);
        Ok(Self { topology, params })
    }

    /// Assemble a network from existing parts, validating buffer sizes.
    pub fn from_parts(topology: Topology, params: Params) -> Result<Self> {
        if params.weights().len() != topology.total_weights() {
            return Err(Error::InvalidShape(format!(
                "weight buffer len {} does not match topology total {}",
                params.weights().len(),
                topology.total_weights()
            )));
        }
        if params.biases().len() != topology.total_neurons() {
            return Err(Error::InvalidShape(format!(
                "bias buffer len {} does not match topology total {}",
                params.biases().len(),
                topology.total_neurons()
            )));
        }
        Ok(Self { topology, params })
    }

    #[inline]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    #[inline]
    pub fn params(&self) -> &Params {
        &self.params
    }

    #[inline]
    pub fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    /// Forward pass over the whole mini-batch.
    ///
    /// Caller contract: layer 0 of `acts.neuron` holds each sample's input
    /// vector. Overwrites `zs` and `neuron` for layers `1..L-1`.
    ///
    /// Samples are fanned out over `pools.forward_chunks()` equal groups on
    /// the forward pool; elapsed time accumulates into `timers.forward`.
    pub fn forward(&self, acts: &mut Activations, pools: &StagePools, timers: &mut StageTimers) {
        let total = self.topology.total_neurons();
        assert_eq!(
            acts.total_neurons(),
            total,
            "activation buffers built for {} neurons, topology has {}",
            acts.total_neurons(),
            total
        );
        debug_assert_eq!(acts.batch_size() % pools.forward_chunks(), 0);

        let rows_per_chunk = acts.batch_size().div_ceil(pools.forward_chunks());
        let chunk_len = rows_per_chunk * total;

        timers.forward.measure(|| {
            for layer in 0..self.topology.num_layers() - 1 {
                let neuron = &mut acts.neuron;
                let zs = &mut acts.zs;
                pools.forward.install(|| {
                    neuron
                        .par_chunks_mut(chunk_len)
                        .zip(zs.par_chunks_mut(chunk_len))
                        .for_each(|(n_chunk, z_chunk)| {
                            for (n_row, z_row) in n_chunk
                                .chunks_exact_mut(total)
                                .zip(z_chunk.chunks_exact_mut(total))
                            {
                                self.advance_layer(layer, n_row, z_row);
                            }
                        });
                });
            }
        });
    }

    /// Backward pass.
    ///
    /// Caller contract: `forward` has run for this batch and the output-layer
    /// rows of `acts.error` hold each sample's one-hot target. On return the
    /// whole of `error` (layers `1..L-1`) holds deltas; layer 0 is never
    /// written.
    pub fn backward(&self, acts: &mut Activations, pools: &StagePools, timers: &mut StageTimers) {
        let topo = &self.topology;
        let total = topo.total_neurons();
        assert_eq!(
            acts.total_neurons(),
            total,
            "activation buffers built for {} neurons, topology has {}",
            acts.total_neurons(),
            total
        );
        let last = topo.num_layers() - 1;

        timers.backward.measure(|| {
            // Phase 1: output-layer deltas, independent per (sample, neuron).
            let out_off = topo.neuron_offset(last);
            let out_w = topo.width(last);
            {
                let error = &mut acts.error;
                let neuron = &acts.neuron;
                let zs = &acts.zs;
                pools.delta.install(|| {
                    error
                        .par_chunks_mut(total)
                        .zip(neuron.par_chunks(total).zip(zs.par_chunks(total)))
                        .for_each(|(e_row, (n_row, z_row))| {
                            for j in out_off..out_off + out_w {
                                e_row[j] = (n_row[j] - e_row[j]) * sigmoid_prime(z_row[j]);
                            }
                        });
                });
            }

            // Phase 2: propagate deltas down through the hidden layers.
            // Layers are strictly sequential here; samples are not.
            for layer in (1..last).rev() {
                let cur = topo.neuron_offset(layer);
                let cur_w = topo.width(layer);
                let next = topo.neuron_offset(layer + 1);
                let next_w = topo.width(layer + 1);
                let w_base = topo.weight_offset(layer);
                let weights = self.params.weights();

                let error = &mut acts.error;
                let zs = &acts.zs;
                pools.backprop.install(|| {
                    error
                        .par_chunks_mut(total)
                        .zip(zs.par_chunks(total))
                        .for_each(|(e_row, z_row)| {
                            let (lower, upper) = e_row.split_at_mut(next);
                            let next_err = &upper[..next_w];
                            let cur_err = &mut lower[cur..cur + cur_w];
                            for (k, e) in cur_err.iter_mut().enumerate() {
                                let row = w_base + k * next_w;
                                let mut sum = 0.0;
                                for (l, &d) in next_err.iter().enumerate() {
                                    sum = weights[row + l].mul_add(d, sum);
                                }
                                *e = sum * sigmoid_prime(z_row[cur + k]);
                            }
                        });
                });
            }
        });
    }

    /// Gradient-descent update.
    ///
    /// Caller contract: `backward` has run for this batch. Every bias and
    /// weight cell reduces over the batch dimension in sample order and steps
    /// by `learning_rate / batch_size` times its summed gradient. Cells never
    /// alias, so both phases fan out freely over their pools.
    pub fn update(
        &mut self,
        acts: &Activations,
        learning_rate: f64,
        pools: &StagePools,
        timers: &mut StageTimers,
    ) {
        let topo = &self.topology;
        let params = &mut self.params;
        let total = topo.total_neurons();
        assert_eq!(
            acts.total_neurons(),
            total,
            "activation buffers built for {} neurons, topology has {}",
            acts.total_neurons(),
            total
        );
        assert!(
            learning_rate.is_finite() && learning_rate > 0.0,
            "learning rate must be finite and > 0"
        );

        let batch = acts.batch_size();
        let step = learning_rate / batch as f64;

        timers.update.measure(|| {
            // Phase 1: biases. Layer 0 slots are skipped; every remaining cell
            // reduces its own delta column over the batch.
            let input_w = topo.width(0);
            {
                let error = &acts.error;
                let biases = &mut params.biases_mut()[input_w..];
                pools.bias.install(|| {
                    biases.par_iter_mut().enumerate().for_each(|(i, b)| {
                        let cell = input_w + i;
                        let mut sum = 0.0;
                        for s in 0..batch {
                            sum += error[s * total + cell];
                        }
                        *b -= step * sum;
                    });
                });
            }

            // Phase 2: weights, one transition at a time.
            for layer in 0..topo.num_layers() - 1 {
                let src = topo.neuron_offset(layer);
                let dst = topo.neuron_offset(layer + 1);
                let out_w = topo.width(layer + 1);
                let w_base = topo.weight_offset(layer);
                let w_len = topo.width(layer) * out_w;

                let neuron = &acts.neuron;
                let error = &acts.error;
                let weights = &mut params.weights_mut()[w_base..w_base + w_len];
                pools.weight.install(|| {
                    weights.par_iter_mut().enumerate().for_each(|(idx, w)| {
                        let j = idx / out_w;
                        let k = idx % out_w;
                        let mut sum = 0.0;
                        for s in 0..batch {
                            let row = s * total;
                            sum += neuron[row + src + j] * error[row + dst + k];
                        }
                        *w -= step * sum;
                    });
                });
            }
        });
    }

    /// Shape-checked serial forward pass for one sample.
    ///
    /// `scratch` must be a batch-1 buffer built for this topology. Returns the
    /// output-layer activations.
    pub fn predict_into<'a>(
        &self,
        input: &[f64],
        scratch: &'a mut Activations,
    ) -> Result<&'a [f64]> {
        if scratch.batch_size() != 1 {
            return Err(Error::InvalidShape(format!(
                "prediction scratch must have batch size 1, got {}",
                scratch.batch_size()
            )));
        }
        if scratch.total_neurons() != self.topology.total_neurons() {
            return Err(Error::InvalidShape(format!(
                "scratch built for {} neurons, topology has {}",
                scratch.total_neurons(),
                self.topology.total_neurons()
            )));
        }
        if input.len() != self.topology.input_width() {
            return Err(Error::InvalidShape(format!(
                "input len {} does not match input width {}",
                input.len(),
                self.topology.input_width()
            )));
        }

        scratch.set_input(&self.topology, 0, input);
        self.forward_single(scratch);
        Ok(scratch.output(&self.topology, 0))
    }

    /// Serial forward over sample 0 of `scratch`. No pools, no timing.
    pub(crate) fn forward_single(&self, scratch: &mut Activations) {
        let total = self.topology.total_neurons();
        let n_row = &mut scratch.neuron[..total];
        let z_row = &mut scratch.zs[..total];
        for layer in 0..self.topology.num_layers() - 1 {
            self.advance_layer(layer, n_row, z_row);
        }
    }

    /// One layer transition for a single sample. `neuron` and `zs` are that
    /// sample's full rows (`total_neurons` long).
    #[inline]
    fn advance_layer(&self, layer: usize, neuron: &mut [f64], zs: &mut [f64]) {
        let topo = &self.topology;
        let src = topo.neuron_offset(layer);
        let dst = topo.neuron_offset(layer + 1);
        let in_w = topo.width(layer);
        let out_w = topo.width(layer + 1);
        let w_base = topo.weight_offset(layer);
        let weights = self.params.weights();
        let biases = self.params.biases();

        let (lower, upper) = neuron.split_at_mut(dst);
        let inputs = &lower[src..src + in_w];
        let outputs = &mut upper[..out_w];
        let z_out = &mut zs[dst..dst + out_w];

        for (k, (z_slot, out)) in z_out.iter_mut().zip(outputs.iter_mut()).enumerate() {
            let mut sum = 0.0;
            for (l, &x) in inputs.iter().enumerate() {
                sum = weights[w_base + l * out_w + k].mul_add(x, sum);
            }
            let z = sum + biases[dst + k];
            *z_slot = z;
            *out = sigmoid(z);
        }
    }
}
