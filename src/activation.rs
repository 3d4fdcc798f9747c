//! Sigmoid activation.
//!
//! The passes cache pre-activations (`zs`), so the derivative is evaluated
//! from `z` rather than from the cached output.

/// Logistic sigmoid `1 / (1 + e^-z)`.
#[inline]
pub fn sigmoid(z: f64) -> f64 {
    // Numerically stable: never forms e^z for large positive z.
    if z >= 0.0 {
        let e = (-z).exp();
        1.0 / (1.0 + e)
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Derivative of the sigmoid, `sigmoid(z) * (1 - sigmoid(z))`.
#[inline]
pub fn sigmoid_prime(z: f64) -> f64 {
    let s = sigmoid(z);
    s * (1.0 - s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_stays_strictly_inside_unit_interval() {
        for i in -700..=700 {
            let z = f64::from(i);
            let s = sigmoid(z);
            assert!(s > 0.0 && s < 1.0, "sigmoid({z}) = {s}");
        }
    }

    #[test]
    fn sigmoid_midpoint_and_symmetry() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-15);
        for &z in &[0.1, 1.0, 3.5, 20.0] {
            assert!((sigmoid(z) + sigmoid(-z) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn sigmoid_prime_peaks_at_zero() {
        assert!((sigmoid_prime(0.0) - 0.25).abs() < 1e-15);
        for &z in &[0.5, -0.5, 2.0, -2.0, 10.0] {
            assert!(sigmoid_prime(z) < 0.25);
            assert!(sigmoid_prime(z) > 0.0);
        }
    }
}
