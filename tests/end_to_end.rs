//! One full mini-batch (forward, backward, update) on a [4, 3, 2] network with
//! injected parameters, checked against a naive nested-loop reference
//! implementation of the same formulas.

use batchnn::{Activations, Network, Params, StagePools, StageThreads, StageTimers, Topology};

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn sigmoid_prime(z: f64) -> f64 {
    sigmoid(z) * (1.0 - sigmoid(z))
}

/// Plain nested-`Vec` network used only as an oracle.
struct Reference {
    widths: Vec<usize>,
    /// `w[i][j][k]`: transition `i`, source neuron `j`, destination neuron `k`.
    w: Vec<Vec<Vec<f64>>>,
    /// `b[i][j]`; layer 0 entries exist but are unused.
    b: Vec<Vec<f64>>,
}

impl Reference {
    fn from_flat(widths: &[usize], weights: &[f64], biases: &[f64]) -> Self {
        let mut w = Vec::new();
        let mut at = 0;
        for t in 0..widths.len() - 1 {
            let mut matrix = Vec::new();
            for _ in 0..widths[t] {
                matrix.push(weights[at..at + widths[t + 1]].to_vec());
                at += widths[t + 1];
            }
            w.push(matrix);
        }

        let mut b = Vec::new();
        let mut at = 0;
        for &width in widths {
            b.push(biases[at..at + width].to_vec());
            at += width;
        }

        Self {
            widths: widths.to_vec(),
            w,
            b,
        }
    }

    /// Returns per-layer activations and pre-activations for one sample.
    fn forward(&self, input: &[f64]) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let mut a = vec![input.to_vec()];
        let mut z = vec![vec![0.0; self.widths[0]]];
        for t in 0..self.widths.len() - 1 {
            let mut z_next = vec![0.0; self.widths[t + 1]];
            for (k, z_slot) in z_next.iter_mut().enumerate() {
                let mut sum = 0.0;
                for j in 0..self.widths[t] {
                    sum += a[t][j] * self.w[t][j][k];
                }
                *z_slot = sum + self.b[t + 1][k];
            }
            a.push(z_next.iter().map(|&v| sigmoid(v)).collect());
            z.push(z_next);
        }
        (a, z)
    }

    /// Returns per-layer deltas for one sample (layer 0 entry all zero).
    fn backward(&self, a: &[Vec<f64>], z: &[Vec<f64>], target: &[f64]) -> Vec<Vec<f64>> {
        let last = self.widths.len() - 1;
        let mut delta: Vec<Vec<f64>> = self.widths.iter().map(|&w| vec![0.0; w]).collect();

        for j in 0..self.widths[last] {
            delta[last][j] = (a[last][j] - target[j]) * sigmoid_prime(z[last][j]);
        }
        for i in (1..last).rev() {
            for k in 0..self.widths[i] {
                let mut sum = 0.0;
                for l in 0..self.widths[i + 1] {
                    sum += delta[i + 1][l] * self.w[i][k][l];
                }
                delta[i][k] = sum * sigmoid_prime(z[i][k]);
            }
        }
        delta
    }

    fn update(&mut self, batch: &[(Vec<Vec<f64>>, Vec<Vec<f64>>)], eta: f64) {
        let scale = eta / batch.len() as f64;
        for i in 1..self.widths.len() {
            for j in 0..self.widths[i] {
                let sum: f64 = batch.iter().map(|(_, delta)| delta[i][j]).sum();
                self.b[i][j] -= scale * sum;
            }
        }
        for t in 0..self.widths.len() - 1 {
            for j in 0..self.widths[t] {
                for k in 0..self.widths[t + 1] {
                    let sum: f64 = batch
                        .iter()
                        .map(|(a, delta)| a[t][j] * delta[t + 1][k])
                        .sum();
                    self.w[t][j][k] -= scale * sum;
                }
            }
        }
    }
}

const WIDTHS: [usize; 3] = [4, 3, 2];

// 4*3 transition-0 weights followed by 3*2 transition-1 weights.
const WEIGHTS: [f64; 18] = [
    0.15, -0.32, 0.41, 0.08, 0.27, -0.19, -0.44, 0.36, 0.12, 0.05, -0.21, 0.33, 0.52, -0.17, 0.29,
    0.09, -0.38, 0.24,
];

// One bias slot per neuron; the first four (input layer) stay unused.
const BIASES: [f64; 9] = [0.0, 0.0, 0.0, 0.0, 0.11, -0.26, 0.18, 0.31, -0.09];

const SAMPLES: [([f64; 4], usize); 2] = [
    ([0.9, 0.1, 0.4, 0.7], 0),
    ([0.2, 0.8, 0.6, 0.3], 1),
];

const ETA: f64 = 0.5;
const TOL: f64 = 1e-9;

#[test]
fn one_minibatch_matches_the_reference_formulas() {
    let topo = Topology::new(&WIDTHS).unwrap();
    let mut params = Params::zeros(&topo);
    params.weights_mut().copy_from_slice(&WEIGHTS);
    params.biases_mut().copy_from_slice(&BIASES);
    let mut net = Network::from_parts(topo.clone(), params).unwrap();

    let mut acts = Activations::new(&topo, SAMPLES.len());
    for (k, (input, label)) in SAMPLES.iter().enumerate() {
        acts.set_input(&topo, k, input);
        acts.set_target(&topo, k, *label);
    }

    let pools = StagePools::new(StageThreads::uniform(2), SAMPLES.len()).unwrap();
    let mut timers = StageTimers::default();
    net.forward(&mut acts, &pools, &mut timers);
    net.backward(&mut acts, &pools, &mut timers);
    net.update(&acts, ETA, &pools, &mut timers);

    // Drive the oracle through the same batch.
    let mut oracle = Reference::from_flat(&WIDTHS, &WEIGHTS, &BIASES);
    let mut per_sample = Vec::new();
    for (input, label) in &SAMPLES {
        let (a, z) = oracle.forward(input);
        let mut target = vec![0.0; WIDTHS[2]];
        target[*label] = 1.0;
        let delta = oracle.backward(&a, &z, &target);
        per_sample.push((a, delta));
    }

    // Deltas seen by the backward pass match the oracle's.
    for (k, (_, delta)) in per_sample.iter().enumerate() {
        for layer in 1..WIDTHS.len() {
            let got = acts.error_layer(&topo, k, layer);
            for (j, &d) in delta[layer].iter().enumerate() {
                assert!(
                    (got[j] - d).abs() < TOL,
                    "delta mismatch at sample {k}, layer {layer}, neuron {j}: {} vs {d}",
                    got[j]
                );
            }
        }
    }

    oracle.update(&per_sample, ETA);

    // Post-update parameters match the oracle's.
    for t in 0..WIDTHS.len() - 1 {
        for j in 0..WIDTHS[t] {
            for k in 0..WIDTHS[t + 1] {
                let got = net.params().weights()[topo.weight_index(t, j, k)];
                let want = oracle.w[t][j][k];
                assert!(
                    (got - want).abs() < TOL,
                    "weight mismatch at transition {t} ({j} -> {k}): {got} vs {want}"
                );
            }
        }
    }
    for i in 1..WIDTHS.len() {
        for j in 0..WIDTHS[i] {
            let got = net.params().biases()[topo.neuron_offset(i) + j];
            let want = oracle.b[i][j];
            assert!(
                (got - want).abs() < TOL,
                "bias mismatch at layer {i}, neuron {j}: {got} vs {want}"
            );
        }
    }

    // A parameter actually moved; the batch was not a no-op.
    assert!((net.params().weights()[0] - WEIGHTS[0]).abs() > 0.0);
}

#[test]
fn repeated_runs_are_bit_identical_across_pool_layouts() {
    let run = |threads: StageThreads| -> Vec<f64> {
        let topo = Topology::new(&WIDTHS).unwrap();
        let mut params = Params::zeros(&topo);
        params.weights_mut().copy_from_slice(&WEIGHTS);
        params.biases_mut().copy_from_slice(&BIASES);
        let mut net = Network::from_parts(topo.clone(), params).unwrap();

        let mut acts = Activations::new(&topo, SAMPLES.len());
        for (k, (input, label)) in SAMPLES.iter().enumerate() {
            acts.set_input(&topo, k, input);
            acts.set_target(&topo, k, *label);
        }

        let pools = StagePools::new(threads, SAMPLES.len()).unwrap();
        let mut timers = StageTimers::default();
        net.forward(&mut acts, &pools, &mut timers);
        net.backward(&mut acts, &pools, &mut timers);
        net.update(&acts, ETA, &pools, &mut timers);

        let mut out = net.params().weights().to_vec();
        out.extend_from_slice(net.params().biases());
        out
    };

    let serial = run(StageThreads::uniform(1));
    let spread = run(StageThreads {
        forward: 2,
        delta: 4,
        backprop: 3,
        bias: 2,
        weight: 4,
    });
    assert_eq!(serial, spread);
}
