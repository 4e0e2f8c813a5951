//! Magnetics calculations for circular current filaments in arbitrary orientation.
use core::f64::consts::PI;
use std::sync::Arc;

use crate::{
    error::{FieldSourceError, FieldSourceResult},
    math::{cross3, dot3, roots_legendre, tuplecross, tuplenormalize, tuplerss},
    physics::{biotsavart::Curve, FieldSource, GeneralWire, Vector, Wire},
    MU0_OVER_4PI,
};

/// Default Gauss-Legendre order for [`CircularWire`]
pub const DEFAULT_QUADRATURE_ORDER: usize = 300;

/// Below this, the loop normal is treated as parallel to the world z-axis
const PARALLEL_TOL: f64 = 1e-12;

/// Circular current loop, evaluated by Gauss-Legendre quadrature
/// over its analytic parametrization.
///
/// The loop is $\vec{l}(\theta) = \vec{c} + R(\cos\theta \hat{x}' + \sin\theta \hat{y}')$
/// for $\theta \in [-\pi, \pi]$, where $\hat{x}'$, $\hat{y}'$ span the loop plane and
/// $\hat{x}' \times \hat{y}' = \hat{n}$, so positive current circulates right-handed about the normal.
///
/// The exception is a normal along $-\hat{z}$: the plane axes are then the world x and y axes,
/// and positive current circulates right-handed about $+\hat{z}$.
#[derive(Clone)]
pub struct CircularWire {
    normal: (f64, f64, f64), // [dimensionless] unit vector
    center: (f64, f64, f64), // [m]
    radius: f64,             // [m]
    current: f64,            // [A]
    axis_x: (f64, f64, f64), // [dimensionless] in-plane unit vector
    axis_y: (f64, f64, f64), // [dimensionless] in-plane unit vector

    // Quadrature nodes in [-pi, pi] with their Gauss-Legendre weights on [-1, 1]
    nodes: Vec<f64>,   // [rad]
    weights: Vec<f64>, // [dimensionless]
    cos_nodes: Vec<f64>,
    sin_nodes: Vec<f64>,

    curve: Curve,
}

impl CircularWire {
    /// Circular loop with the default quadrature order, [`DEFAULT_QUADRATURE_ORDER`].
    ///
    /// # Arguments
    ///
    /// * `normal`:  loop normal; any nonzero length, normalized here
    /// * `center`:  (m) center of the loop
    /// * `radius`:  (m) loop radius, strictly positive
    /// * `current`: (A) signed current, positive when circulating right-handed about `normal`
    ///   (about +z when `normal` is along -z)
    ///
    /// # Errors
    ///
    /// * [`FieldSourceError::DegenerateGeometry`] if the radius is not positive and finite,
    ///   or if `normal` has zero or non-finite length
    pub fn new(
        normal: (f64, f64, f64),
        center: (f64, f64, f64),
        radius: f64,
        current: f64,
    ) -> FieldSourceResult<Self> {
        Self::with_order(normal, center, radius, current, DEFAULT_QUADRATURE_ORDER)
    }

    /// Circular loop using `n` Gauss-Legendre nodes. See [`CircularWire::new`].
    ///
    /// # Errors
    ///
    /// * [`FieldSourceError::DegenerateGeometry`] as for [`CircularWire::new`], or if `n` is zero
    pub fn with_order(
        normal: (f64, f64, f64),
        center: (f64, f64, f64),
        radius: f64,
        current: f64,
        n: usize,
    ) -> FieldSourceResult<Self> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(FieldSourceError::DegenerateGeometry(format!(
                "radius should be larger than 0, got {radius}"
            )));
        }
        let normal_mag = tuplerss(normal);
        if !(normal_mag > 0.0 && normal_mag.is_finite()) {
            return Err(FieldSourceError::DegenerateGeometry(format!(
                "loop normal {} cannot be normalized",
                Vector(normal)
            )));
        }
        if n == 0 {
            return Err(FieldSourceError::DegenerateGeometry(
                "quadrature order must be at least 1".to_owned(),
            ));
        }

        let normal = tuplenormalize(normal);
        let (axis_x, axis_y) = in_plane_axes(normal);

        // Rescale nodes from [-1, 1] to [-pi, pi]; the Jacobian is applied at evaluation
        let (x, weights) = roots_legendre(n);
        let nodes: Vec<f64> = x.iter().map(|xi| PI * xi).collect();
        let cos_nodes = nodes.iter().map(|&t| libm::cos(t)).collect();
        let sin_nodes = nodes.iter().map(|&t| libm::sin(t)).collect();

        let curve: Curve = Arc::new(move |t: f64| {
            let (c, s) = (libm::cos(t), libm::sin(t));
            (
                radius.mul_add(c.mul_add(axis_x.0, s * axis_y.0), center.0),
                radius.mul_add(c.mul_add(axis_x.1, s * axis_y.1), center.1),
                radius.mul_add(c.mul_add(axis_x.2, s * axis_y.2), center.2),
            )
        });

        tracing::debug!(
            ?normal,
            ?center,
            radius,
            current,
            ?axis_x,
            ?axis_y,
            order = n,
            "circular wire"
        );

        Ok(Self {
            normal,
            center,
            radius,
            current,
            axis_x,
            axis_y,
            nodes,
            weights,
            cos_nodes,
            sin_nodes,
            curve,
        })
    }

    /// Unit normal of the loop plane
    pub fn normal(&self) -> (f64, f64, f64) {
        self.normal
    }

    /// (m) center of the loop
    pub fn center(&self) -> (f64, f64, f64) {
        self.center
    }

    /// (m) loop radius
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// In-plane unit vector at $\theta = 0$
    pub fn axis_x(&self) -> (f64, f64, f64) {
        self.axis_x
    }

    /// In-plane unit vector at $\theta = \pi / 2$
    pub fn axis_y(&self) -> (f64, f64, f64) {
        self.axis_y
    }

    /// Number of quadrature nodes
    pub fn order(&self) -> usize {
        self.nodes.len()
    }

    /// (rad) quadrature nodes on $[-\pi, \pi]$
    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    /// Gauss-Legendre weights for [`CircularWire::nodes`], normalized to the interval $[-1, 1]$
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// (m) point on the loop at angle `theta`
    pub fn curve(&self, theta: f64) -> (f64, f64, f64) {
        (self.curve)(theta)
    }

    /// Equivalent parametric wire over $\theta \in [-\pi, \pi]$
    /// for evaluation with the discretization engine instead of quadrature.
    pub fn to_general_wire(&self) -> GeneralWire {
        GeneralWire::from_curve_unchecked(Arc::clone(&self.curve), -PI, PI, self.current)
    }
}

impl FieldSource for CircularWire {
    /// Magnetic flux density by Gauss-Legendre quadrature of the Biot-Savart integral,
    ///
    /// $$\vec{B} = \frac{\mu_0 I}{4\pi} \int_{-\pi}^{\pi}
    ///     \frac{\frac{d\vec{l}}{d\theta} \times (\vec{p} - \vec{l}(\theta))}{|\vec{p} - \vec{l}(\theta)|^3} d\theta
    ///     \approx \frac{\mu_0 I}{4\pi} \pi \sum_k w_k \vec{f}(\pi x_k)$$
    ///
    /// with $\frac{d\vec{l}}{d\theta} = R(-\sin\theta \hat{x}' + \cos\theta \hat{y}')$.
    ///
    /// Non-finite if `point` lies exactly on a quadrature node of the circumference.
    fn magnetic_field(&self, point: (f64, f64, f64)) -> (f64, f64, f64) {
        let (ax, ay) = (self.axis_x, self.axis_y);
        let r0 = self.radius; // [m]

        // Observation point relative to the loop center
        let px = point.0 - self.center.0; // [m]
        let py = point.1 - self.center.1; // [m]
        let pz = point.2 - self.center.2; // [m]

        let (mut bx, mut by, mut bz) = (0.0, 0.0, 0.0);
        for k in 0..self.nodes.len() {
            let c = self.cos_nodes[k];
            let s = self.sin_nodes[k];

            // In-plane unit vectors along the radius and the tangent
            let (ux, uy, uz) = (
                c.mul_add(ax.0, s * ay.0),
                c.mul_add(ax.1, s * ay.1),
                c.mul_add(ax.2, s * ay.2),
            );
            let (tx, ty, tz) = (
                c.mul_add(ay.0, -s * ax.0),
                c.mul_add(ay.1, -s * ax.1),
                c.mul_add(ay.2, -s * ax.2),
            );

            // Displacement from the loop point to the observation point
            let rx = r0.mul_add(-ux, px); // [m]
            let ry = r0.mul_add(-uy, py); // [m]
            let rz = r0.mul_add(-uz, pz); // [m]

            let sumsq = dot3(rx, ry, rz, rx, ry, rz); // [m^2]
            let w = self.weights[k] * sumsq.powf(-1.5); // [m^-3]

            let (cx, cy, cz) = cross3(tx, ty, tz, rx, ry, rz); // [m]
            bx = w.mul_add(cx, bx);
            by = w.mul_add(cy, by);
            bz = w.mul_add(cz, bz);
        }

        // Tangent length, interval Jacobian, and the shared constant factor
        let c = MU0_OVER_4PI * self.current * r0 * PI; // [H-A]
        (c * bx, c * by, c * bz) // [T]
    }
}

impl Wire for CircularWire {
    fn current(&self) -> f64 {
        self.current
    }
}

impl std::fmt::Debug for CircularWire {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircularWire")
            .field("normal", &self.normal)
            .field("center", &self.center)
            .field("radius", &self.radius)
            .field("current", &self.current)
            .field("axis_x", &self.axis_x)
            .field("axis_y", &self.axis_y)
            .field("order", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for CircularWire {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CircularWire(normal={}, center={}, radius={}, current={})",
            Vector(self.normal),
            Vector(self.center),
            self.radius,
            self.current
        )
    }
}

/// Orthonormal in-plane axes for a loop with unit `normal`.
///
/// `axis_x` is `z x normal` and `axis_y` is `normal x axis_x`. When the normal is
/// along z, the world x and y axes are used regardless of the normal's sign.
fn in_plane_axes(normal: (f64, f64, f64)) -> ((f64, f64, f64), (f64, f64, f64)) {
    let axis_x = tuplecross((0.0, 0.0, 1.0), normal);

    if tuplerss(axis_x) < PARALLEL_TOL {
        tracing::trace!(?normal, "loop normal is along z; using world x and y axes");
        return ((1.0, 0.0, 0.0), (0.0, 1.0, 0.0));
    }

    let axis_x = tuplenormalize(axis_x);
    let axis_y = tuplenormalize(tuplecross(normal, axis_x));

    (axis_x, axis_y)
}
