//! Pure-math functions supporting physics calculations.

use core::f64::consts::PI;

/// Newton iteration limit for Legendre root refinement.
/// Convergence is quadratic from the asymptotic initial guess, so this is rarely approached.
const LEGENDRE_MAX_ITER: usize = 100;

/// 3D $(x^2 + y^2 + z^2)^{1/2}$ using `mul_add` to reduce roundoff error.
#[inline]
pub fn rss3(x: f64, y: f64, z: f64) -> f64 {
    x.mul_add(x, y.mul_add(y, z.powi(2))).sqrt()
}

/// Evaluate the cross products for each axis component
/// separately using `mul_add` which would not be assumed usable
/// in a more general implementation.
#[inline]
pub fn cross3(x0: f64, y0: f64, z0: f64, x1: f64, y1: f64, z1: f64) -> (f64, f64, f64) {
    let xy = -x1 * y0;
    let yz = -y1 * z0;
    let zx = -z1 * x0;
    let cx = y0.mul_add(z1, yz);
    let cy = z0.mul_add(x1, zx);
    let cz = x0.mul_add(y1, xy);

    (cx, cy, cz)
}

/// Scalar dot product using `mul_add`.
#[inline]
pub fn dot3(x0: f64, y0: f64, z0: f64, x1: f64, y1: f64, z1: f64) -> f64 {
    x0.mul_add(x1, y0.mul_add(y1, z0 * z1))
}

/// Dot product of two vectors stored as tuples
#[inline(always)]
pub fn tupledot(a: (f64, f64, f64), b: (f64, f64, f64)) -> f64 {
    dot3(a.0, a.1, a.2, b.0, b.1, b.2)
}

/// Magnitude of a vector stored as a tuple
#[inline(always)]
pub fn tuplerss(a: (f64, f64, f64)) -> f64 {
    rss3(a.0, a.1, a.2)
}

/// Unit vector in the direction of a vector stored as a tuple.
/// A zero-length input yields NaN components.
#[inline(always)]
pub fn tuplenormalize(a: (f64, f64, f64)) -> (f64, f64, f64) {
    let mag = tuplerss(a);
    (a.0 / mag, a.1 / mag, a.2 / mag)
}

/// Cross product of two vectors stored as tuples
#[inline(always)]
pub fn tuplecross(a: (f64, f64, f64), b: (f64, f64, f64)) -> (f64, f64, f64) {
    cross3(a.0, a.1, a.2, b.0, b.1, b.2)
}

/// Elementwise `a - b`
#[inline(always)]
pub fn tuplesub(a: (f64, f64, f64), b: (f64, f64, f64)) -> (f64, f64, f64) {
    (a.0 - b.0, a.1 - b.1, a.2 - b.2)
}

/// Elementwise `a + b`
#[inline(always)]
pub fn tupleadd(a: (f64, f64, f64), b: (f64, f64, f64)) -> (f64, f64, f64) {
    (a.0 + b.0, a.1 + b.1, a.2 + b.2)
}

/// `c * a` for scalar `c`
#[inline(always)]
pub fn tuplescale(c: f64, a: (f64, f64, f64)) -> (f64, f64, f64) {
    (c * a.0, c * a.1, c * a.2)
}

/// Whether every component of a tuple is finite
#[inline(always)]
pub fn tuplefinite(a: (f64, f64, f64)) -> bool {
    a.0.is_finite() && a.1.is_finite() && a.2.is_finite()
}

/// Decompose two filament endpoints into a midpoint and a length vector
#[inline]
pub fn decompose_filament(
    start: (f64, f64, f64),
    end: (f64, f64, f64),
) -> ((f64, f64, f64), (f64, f64, f64)) {
    let dl = (end.0 - start.0, end.1 - start.1, end.2 - start.2); // [m] filament vector
    let midpoint = (
        dl.0.mul_add(0.5, start.0),
        dl.1.mul_add(0.5, start.1),
        dl.2.mul_add(0.5, start.2),
    ); // [m] filament midpoint

    (midpoint, dl)
}

/// Legendre polynomial $P_n(x)$ and its derivative $P_n'(x)$ by upward recurrence.
///
/// The derivative identity is singular at $x = \pm 1$, which is never a root.
#[inline]
fn legendre(n: usize, x: f64) -> (f64, f64) {
    let mut p_prev = 1.0; // P_0
    let mut p = x; // P_1
    for k in 2..=n {
        let kf = k as f64;
        let p_next = ((2.0 * kf - 1.0) * x * p - (kf - 1.0) * p_prev) / kf;
        p_prev = p;
        p = p_next;
    }

    let dp = n as f64 * x.mul_add(p, -p_prev) / x.mul_add(x, -1.0);

    (p, dp)
}

/// Gauss-Legendre quadrature nodes and weights of order `n` on $[-1, 1]$.
///
/// Nodes are returned in ascending order. The rule integrates polynomials
/// of degree up to $2n - 1$ exactly.
///
/// # Commentary
///
/// Each root of $P_n$ is refined by Newton's method from the asymptotic
/// estimate $\cos(\pi (i + 3/4) / (n + 1/2))$, which lies close enough to
/// the $i$-th largest root for quadratic convergence at any practical order.
/// Only half of the roots are computed; the rest follow from symmetry.
///
/// Weights are $w_i = 2 / ((1 - x_i^2) P_n'(x_i)^2)$.
///
/// # References
///
///   \[1\] M. Abramowitz and I. A. Stegun, *Handbook of mathematical functions: with formulas, graphs, and mathematical tables*. 1970. Eq. 25.4.29.
pub fn roots_legendre(n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut nodes = vec![0.0; n];
    let mut weights = vec![0.0; n];
    let nf = n as f64;

    for i in 0..n.div_ceil(2) {
        let mut x = libm::cos(PI * (i as f64 + 0.75) / (nf + 0.5));
        for _ in 0..LEGENDRE_MAX_ITER {
            let (p, dp) = legendre(n, x);
            let dx = p / dp;
            x -= dx;
            if dx.abs() <= 4.0 * f64::EPSILON {
                break;
            }
        }

        let (_, dp) = legendre(n, x);
        let w = 2.0 / (x.mul_add(-x, 1.0) * dp * dp);

        nodes[i] = -x;
        nodes[n - 1 - i] = x;
        weights[i] = w;
        weights[n - 1 - i] = w;
    }

    (nodes, weights)
}
