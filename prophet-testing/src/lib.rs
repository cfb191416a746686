//! Float assertions shared by the workspace tests.

use assert_float_eq::*;

/// Asserts that two slices are element-wise within `distance` ULPs.
pub fn assert_slice_f64_near(expected: &[f64], actual: &[f64], distance: u32) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (&expected, &actual) in expected.iter().zip(actual) {
        if actual != expected {
            assert_f64_near!(expected, actual, distance);
        }
    }
}

/// Asserts that two probability vectors agree to within an absolute `epsilon` per element.
pub fn assert_probs_absolute(expected: &[f64], actual: &[f64], epsilon: f64) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (&expected, &actual) in expected.iter().zip(actual) {
        assert_float_absolute_eq!(expected, actual, epsilon);
    }
}

/// Asserts that `probs` is a distribution: non-negative entries summing to 1 within `epsilon`.
pub fn assert_distribution(probs: &[f64], epsilon: f64) {
    assert!(!probs.is_empty(), "empty distribution");
    for &prob in probs {
        assert!(prob >= 0.0, "negative probability {prob} in {probs:?}");
    }
    let sum: f64 = probs.iter().sum();
    assert_float_absolute_eq!(1.0, sum, epsilon);
}
