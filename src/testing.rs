//! Test utilities

use crate::math::tuplerss;

/// Divide-by-zero-resistant approximate comparison
pub(crate) fn approx(truth: f64, val: f64, rtol: f64, atol: f64) -> bool {
    let abs_err = (val - truth).abs();
    let lim = rtol * truth.abs() + atol;
    abs_err < lim
}

/// Approximate comparison of two vectors, with the relative tolerance
/// scaled by the magnitude of the reference vector rather than per component
/// so that near-zero components do not dominate.
pub(crate) fn approx3(
    truth: (f64, f64, f64),
    val: (f64, f64, f64),
    rtol: f64,
    atol: f64,
) -> bool {
    let err = tuplerss((val.0 - truth.0, val.1 - truth.1, val.2 - truth.2));
    err < rtol * tuplerss(truth) + atol
}

/// Evenly spaced values from start to end
pub(crate) fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| start + (i as f64 / (n - 1) as f64) * (end - start))
        .collect::<Vec<f64>>()
}

/// Observation points scattered around the origin, away from the
/// unit-scale source geometry used in tests
pub(crate) fn example_observation_points() -> Vec<(f64, f64, f64)> {
    let xs = linspace(-1.7, 1.9, 4);
    let zs = linspace(-2.3, 2.1, 3);
    let mut points = Vec::with_capacity(xs.len() * zs.len());
    for &x in xs.iter() {
        for &z in zs.iter() {
            points.push((x, 0.37 * x + 0.61, z));
        }
    }
    points
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_approx3() {
        assert!(approx3((1.0, 0.0, 0.0), (1.0, 1e-9, 0.0), 1e-6, 0.0));
        assert!(!approx3((1.0, 0.0, 0.0), (1.0, 1e-3, 0.0), 1e-6, 0.0));
    }
}
