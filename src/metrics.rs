//! Evaluation.
//!
//! Accuracy here is a raw correct count over a test split, computed with
//! single-sample forward passes. The parameter store is read-only throughout;
//! only the caller-provided scratch buffer is overwritten.

use crate::batch::Activations;
use crate::data::Dataset;
use crate::net::Network;
use crate::{Error, Result};

/// Index of the largest value. The first occurrence wins on ties.
#[inline]
pub fn argmax(values: &[f64]) -> usize {
    debug_assert!(!values.is_empty());
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Count of correctly classified samples over the whole test split.
///
/// `scratch` must be a batch-1 buffer built for the network's topology.
pub fn evaluate(net: &Network, test: &Dataset, scratch: &mut Activations) -> Result<usize> {
    if test.input_dim() != net.topology().input_width() {
        return Err(Error::InvalidData(format!(
            "test input_dim {} does not match network input width {}",
            test.input_dim(),
            net.topology().input_width()
        )));
    }

    let mut correct = 0;
    for idx in 0..test.len() {
        let output = net.predict_into(test.input(idx), scratch)?;
        if argmax(output) == test.label(idx) {
            correct += 1;
        }
    }
    Ok(correct)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_picks_the_largest() {
        assert_eq!(argmax(&[0.1, 0.9, 0.3]), 1);
        assert_eq!(argmax(&[2.0, -1.0, 0.0]), 0);
        assert_eq!(argmax(&[0.0, 0.1, 0.7]), 2);
    }

    #[test]
    fn argmax_ties_go_to_the_first_index() {
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[0.1, 0.8, 0.8, 0.2]), 1);
        assert_eq!(argmax(&[0.3, 0.3, 0.3]), 0);
    }

    #[test]
    fn evaluate_rejects_mismatched_input_dim() {
        let net = Network::new_with_seed(&[4, 3, 2], 0).unwrap();
        let mut scratch = Activations::new(net.topology(), 1);
        let test = Dataset::from_flat(vec![0.0; 6], vec![0, 1], 3).unwrap();
        assert!(evaluate(&net, &test, &mut scratch).is_err());
    }

    #[test]
    fn evaluate_counts_matches() {
        // With zero weights and strongly biased outputs, every sample lands on
        // the same predicted class.
        use crate::params::Params;
        use crate::topology::Topology;

        let topo = Topology::new(&[2, 2]).unwrap();
        let mut params = Params::zeros(&topo);
        params.biases_mut()[2 + 1] = 4.0;
        let net = Network::from_parts(topo.clone(), params).unwrap();

        let test = Dataset::from_flat(vec![0.0; 8], vec![1, 0, 1, 1], 2).unwrap();
        let mut scratch = Activations::new(&topo, 1);
        assert_eq!(evaluate(&net, &test, &mut scratch).unwrap(), 3);
    }
}
