//! Per-mini-batch activation buffers.
//!
//! `Activations` holds the three batch-shaped tensors the passes read and
//! write: post-sigmoid activations (`neuron`), pre-activation sums (`zs`) and
//! backpropagated deltas (`error`). Each is a flat buffer of
//! `batch_size * total_neurons` entries; sample `k`'s value for neuron `j` of
//! layer `i` lives at `k * total_neurons + neuron_offset(i) + j`.
//!
//! The buffers are allocated once, sized for the configured batch size, and
//! fully overwritten every mini-batch. Caller contract per batch:
//!
//! - layer 0 of `neuron` holds each sample's input before a forward pass;
//! - the output-layer rows of `error` hold each sample's one-hot target
//!   before a backward pass (the backward pass overwrites them with deltas).

use crate::topology::Topology;

#[derive(Debug, Clone)]
pub struct Activations {
    batch_size: usize,
    total_neurons: usize,
    pub(crate) neuron: Vec<f64>,
    pub(crate) zs: Vec<f64>,
    pub(crate) error: Vec<f64>,
}

impl Activations {
    pub fn new(topology: &Topology, batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch size must be > 0");
        let total = topology.total_neurons();
        let len = batch_size * total;
        Self {
            batch_size,
            total_neurons: total,
            neuron: vec![0.0; len],
            zs: vec![0.0; len],
            error: vec![0.0; len],
        }
    }

    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    #[inline]
    pub fn total_neurons(&self) -> usize {
        self.total_neurons
    }

    /// Copy `input` into layer 0 of sample `sample`.
    ///
    /// Shape contract: `input.len() == topology.input_width()`.
    pub fn set_input(&mut self, topology: &Topology, sample: usize, input: &[f64]) {
        debug_assert!(sample < self.batch_size);
        assert_eq!(
            input.len(),
            topology.input_width(),
            "input len {} does not match input width {}",
            input.len(),
            topology.input_width()
        );
        let start = sample * self.total_neurons;
        self.neuron[start..start + input.len()].copy_from_slice(input);
    }

    /// Seed the output-layer row of `error` for sample `sample` with a one-hot
    /// encoding of `label`.
    pub fn set_target(&mut self, topology: &Topology, sample: usize, label: usize) {
        debug_assert!(sample < self.batch_size);
        let out_w = topology.output_width();
        assert!(
            label < out_w,
            "label {label} out of range for output width {out_w}"
        );
        let last = topology.num_layers() - 1;
        let start = sample * self.total_neurons + topology.neuron_offset(last);
        let row = &mut self.error[start..start + out_w];
        row.fill(0.0);
        row[label] = 1.0;
    }

    /// Output-layer activations of sample `sample`.
    #[inline]
    pub fn output(&self, topology: &Topology, sample: usize) -> &[f64] {
        debug_assert!(sample < self.batch_size);
        let last = topology.num_layers() - 1;
        let start = sample * self.total_neurons + topology.neuron_offset(last);
        &self.neuron[start..start + topology.output_width()]
    }

    /// Delta row of sample `sample` for layer `layer`. Test and inspection
    /// helper; the passes address the flat buffers directly.
    #[inline]
    pub fn error_layer(&self, topology: &Topology, sample: usize, layer: usize) -> &[f64] {
        debug_assert!(sample < self.batch_size);
        let start = sample * self.total_neurons + topology.neuron_offset(layer);
        &self.error[start..start + topology.width(layer)]
    }
}
