//! Learnable parameters and their initializer.
//!
//! `Params` owns the network's two contiguous learnable buffers:
//!
//! - `weights`: `total_weights()` entries, addressed through
//!   [`Topology::weight_index`].
//! - `biases`: `total_neurons()` entries, addressed like any neuron-shaped
//!   buffer. Layer 0 slots are allocated but never read; keeping them makes
//!   bias addressing identical to activation addressing.
//!
//! Buffer sizes always equal the topology's precomputed totals. The only
//! supported initialization fills every entry with an independent standard
//! normal draw; resizing means building a fresh `Params`.

use rand::Rng;

use crate::topology::Topology;

#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    weights: Vec<f64>,
    biases: Vec<f64>,
}

impl Params {
    /// Allocate both buffers and fill them with standard normal draws.
    pub fn new_with_rng<R: Rng + ?Sized>(topology: &Topology, rng: &mut R) -> Self {
        let mut weights = vec![0.0; topology.total_weights()];
        for w in &mut weights {
            *w = standard_normal(rng);
        }
        let mut biases = vec![0.0; topology.total_neurons()];
        for b in &mut biases {
            *b = standard_normal(rng);
        }
        Self { weights, biases }
    }

    /// All-zero parameters. Intended for callers that inject known values.
    pub fn zeros(topology: &Topology) -> Self {
        Self {
            weights: vec![0.0; topology.total_weights()],
            biases: vec![0.0; topology.total_neurons()],
        }
    }

    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    #[inline]
    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    #[inline]
    pub fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    #[inline]
    pub fn biases_mut(&mut self) -> &mut [f64] {
        &mut self.biases
    }
}

/// Standard normal draw via the polar Box-Muller transform.
///
/// Draws a point uniformly from the square (-1,1)^2 and rejects it unless it
/// falls strictly inside the unit disc (and away from the origin), then scales
/// one coordinate by `sqrt(-2 ln(s) / s)`.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    loop {
        let v1: f64 = rng.gen_range(-1.0..1.0);
        let v2: f64 = rng.gen_range(-1.0..1.0);
        let s = v1 * v1 + v2 * v2;
        if s >= 1.0 || s == 0.0 {
            continue;
        }
        return v1 * (-2.0 * s.ln() / s).sqrt();
    }
}
