//! Network topology and flat-buffer addressing.
//!
//! Every tensor in this crate is a single contiguous `Vec<f64>`. `Topology`
//! owns the ordered layer-width sequence and two prefix-sum offset tables
//! computed once at construction:
//!
//! - `neuron_offset(i)` locates layer `i` inside any neuron-shaped buffer
//!   (biases, or one sample's row of activations / pre-activations / deltas).
//! - `weight_offset(i)` locates the weight matrix of transition `i -> i+1`
//!   inside the flat weight buffer. Entry `(row, col)` of that matrix lives at
//!   `weight_offset(i) + row * width(i+1) + col`, where `row` indexes the
//!   source-layer neuron and `col` the destination-layer neuron.
//!
//! The offset tables are the sole addressing mechanism; no per-layer
//! sub-objects are allocated anywhere.

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    widths: Vec<usize>,
    /// `widths.len() + 1` entries; the last one is the total neuron count.
    neuron_offsets: Vec<usize>,
    /// `widths.len()` entries; the last one is the total weight count.
    weight_offsets: Vec<usize>,
}

impl Topology {
    /// Build a topology from a layer-width sequence.
    ///
    /// Requires at least an input and an output layer, all widths nonzero.
    pub fn new(widths: &[usize]) -> Result<Self> {
        if widths.len() < 2 {
            return Err(Error::InvalidConfig(
                "topology must include input and output layers".to_owned(),
            ));
        }
        if widths.contains(&0) {
            return Err(Error::InvalidConfig(
                "all layer widths must be > 0".to_owned(),
            ));
        }

        let mut neuron_offsets = Vec::with_capacity(widths.len() + 1);
        let mut acc = 0usize;
        for &w in widths {
            neuron_offsets.push(acc);
            acc += w;
        }
        neuron_offsets.push(acc);

        let mut weight_offsets = Vec::with_capacity(widths.len());
        let mut acc = 0usize;
        for pair in widths.windows(2) {
            weight_offsets.push(acc);
            acc += pair[0] * pair[1];
        }
        weight_offsets.push(acc);

        Ok(Self {
            widths: widths.to_vec(),
            neuron_offsets,
            weight_offsets,
        })
    }

    #[inline]
    pub fn num_layers(&self) -> usize {
        self.widths.len()
    }

    #[inline]
    pub fn width(&self, layer: usize) -> usize {
        self.widths[layer]
    }

    #[inline]
    pub fn widths(&self) -> &[usize] {
        &self.widths
    }

    #[inline]
    pub fn input_width(&self) -> usize {
        self.widths[0]
    }

    #[inline]
    pub fn output_width(&self) -> usize {
        *self.widths.last().expect("topology has at least two layers")
    }

    /// Start of layer `layer` in a neuron-shaped buffer.
    #[inline]
    pub fn neuron_offset(&self, layer: usize) -> usize {
        self.neuron_offsets[layer]
    }

    /// Start of transition `layer -> layer + 1` in the flat weight buffer.
    #[inline]
    pub fn weight_offset(&self, layer: usize) -> usize {
        self.weight_offsets[layer]
    }

    /// Total neuron count across all layers (also the bias buffer length and
    /// the per-sample row length of every activation buffer).
    #[inline]
    pub fn total_neurons(&self) -> usize {
        *self
            .neuron_offsets
            .last()
            .expect("offset table is never empty")
    }

    /// Total weight count across all transitions.
    #[inline]
    pub fn total_weights(&self) -> usize {
        *self
            .weight_offsets
            .last()
            .expect("offset table is never empty")
    }

    /// Flat index of weight `(row, col)` in transition `layer -> layer + 1`.
    #[inline]
    pub fn weight_index(&self, layer: usize, row: usize, col: usize) -> usize {
        debug_assert!(layer + 1 < self.num_layers());
        debug_assert!(row < self.width(layer));
        debug_assert!(col < self.width(layer + 1));
        self.weight_offsets[layer] + row * self.width(layer + 1) + col
    }
}
