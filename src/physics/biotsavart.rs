//! Biot-Savart calculations for B-field from arbitrary parametric current paths.
use std::sync::Arc;

use rayon::{
    iter::{IntoParallelIterator, ParallelIterator},
    slice::ParallelSlice,
};

use crate::{
    chunksize,
    error::{FieldSourceError, FieldSourceResult},
    math::{cross3, decompose_filament, dot3, tupleadd, tuplefinite},
    physics::{FieldSource, Vector, Wire},
    MU0_OVER_4PI,
};

/// Default number of straight segments used to approximate a [`GeneralWire`]
pub const DEFAULT_SEGMENTS: usize = 1000;

/// Parametric space curve, mapping a scalar parameter to a position in meters
pub type Curve = Arc<dyn Fn(f64) -> (f64, f64, f64) + Send + Sync>;

/// Piecewise-linear approximation of a current path, stored as
/// segment origins and length deltas on each axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filaments {
    /// (m) Filament origin coords (start of segment), each length `n`
    pub xyzfil: (Vec<f64>, Vec<f64>, Vec<f64>),
    /// (m) Filament segment length deltas, each length `n`
    pub dlxyzfil: (Vec<f64>, Vec<f64>, Vec<f64>),
}

impl Filaments {
    /// Number of segments
    pub fn len(&self) -> usize {
        self.xyzfil.0.len()
    }

    /// True if there are no segments
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Current-carrying wire along an arbitrary parametric curve,
/// evaluated by summing straight-segment contributions.
#[derive(Clone)]
pub struct GeneralWire {
    curve: Curve,
    t_min: f64,
    t_max: f64,
    current: f64,    // [A]
    segments: usize, // number of straight segments used by `magnetic_field`
}

impl GeneralWire {
    /// # Arguments
    ///
    /// * `curve`:   (m) position along the wire as a function of the parameter
    /// * `t_min`:   start of the parameter interval
    /// * `t_max`:   end of the parameter interval, strictly greater than `t_min`
    /// * `current`: (A) signed current in the direction of increasing parameter
    ///
    /// # Errors
    ///
    /// * [`FieldSourceError::DegenerateGeometry`] if the parameter bounds are not finite and strictly increasing
    /// * [`FieldSourceError::InvalidSourceFunction`] if the curve does not yield a finite point at either bound
    pub fn new<F>(curve: F, t_min: f64, t_max: f64, current: f64) -> FieldSourceResult<Self>
    where
        F: Fn(f64) -> (f64, f64, f64) + Send + Sync + 'static,
    {
        Self::from_curve(Arc::new(curve), t_min, t_max, current)
    }

    /// Like [`GeneralWire::new`], for a curve that is already shared.
    pub fn from_curve(curve: Curve, t_min: f64, t_max: f64, current: f64) -> FieldSourceResult<Self> {
        if !(t_min.is_finite() && t_max.is_finite() && t_min < t_max) {
            return Err(FieldSourceError::DegenerateGeometry(format!(
                "t_min={t_min} is not smaller than t_max={t_max}"
            )));
        }

        for t in [t_min, t_max] {
            let p = curve(t);
            if !tuplefinite(p) {
                return Err(FieldSourceError::InvalidSourceFunction(format!(
                    "curve({t}) = {} is not a finite point",
                    Vector(p)
                )));
            }
        }

        tracing::debug!(t_min, t_max, current, "general wire");

        Ok(Self {
            curve,
            t_min,
            t_max,
            current,
            segments: DEFAULT_SEGMENTS,
        })
    }

    /// Conversion path for sources whose geometry is already validated.
    pub(crate) fn new_unchecked<F>(curve: F, t_min: f64, t_max: f64, current: f64) -> Self
    where
        F: Fn(f64) -> (f64, f64, f64) + Send + Sync + 'static,
    {
        Self::from_curve_unchecked(Arc::new(curve), t_min, t_max, current)
    }

    pub(crate) fn from_curve_unchecked(curve: Curve, t_min: f64, t_max: f64, current: f64) -> Self {
        Self {
            curve,
            t_min,
            t_max,
            current,
            segments: DEFAULT_SEGMENTS,
        }
    }

    /// Copy of this wire whose [`FieldSource::magnetic_field`] uses `segments` straight segments.
    ///
    /// # Errors
    ///
    /// * [`FieldSourceError::DegenerateGeometry`] if `segments` is zero
    pub fn with_segments(&self, segments: usize) -> FieldSourceResult<Self> {
        if segments == 0 {
            return Err(FieldSourceError::DegenerateGeometry(
                "a wire needs at least one segment".to_owned(),
            ));
        }

        Ok(Self {
            segments,
            ..self.clone()
        })
    }

    /// Number of straight segments used by [`FieldSource::magnetic_field`]
    pub fn segments(&self) -> usize {
        self.segments
    }

    pub fn t_min(&self) -> f64 {
        self.t_min
    }

    pub fn t_max(&self) -> f64 {
        self.t_max
    }

    /// (m) position along the wire at parameter `t`
    pub fn curve(&self, t: f64) -> (f64, f64, f64) {
        (self.curve)(t)
    }

    /// Parameter value at the `i`-th of `n` equal steps
    #[inline]
    fn parameter(&self, i: usize, n: usize) -> f64 {
        if i == n {
            return self.t_max;
        }
        let frac = i as f64 / n as f64;
        (self.t_max - self.t_min).mul_add(frac, self.t_min)
    }

    /// Piecewise-linear approximation of the curve with `n` segments of equal parameter step.
    pub fn discretize(&self, n: usize) -> Filaments {
        let mut out = Filaments {
            xyzfil: (
                Vec::with_capacity(n),
                Vec::with_capacity(n),
                Vec::with_capacity(n),
            ),
            dlxyzfil: (
                Vec::with_capacity(n),
                Vec::with_capacity(n),
                Vec::with_capacity(n),
            ),
        };
        if n == 0 {
            return out;
        }

        let mut start = self.curve(self.t_min);
        for i in 1..=n {
            let end = self.curve(self.parameter(i, n));
            out.xyzfil.0.push(start.0);
            out.xyzfil.1.push(start.1);
            out.xyzfil.2.push(start.2);
            out.dlxyzfil.0.push(end.0 - start.0);
            out.dlxyzfil.1.push(end.1 - start.1);
            out.dlxyzfil.2.push(end.2 - start.2);
            start = end;
        }

        out
    }

    /// Magnetic flux density using `n` straight segments of equal parameter step.
    ///
    /// $$\vec{B} \approx \frac{\mu_0 I}{4\pi} \sum_{i=1}^{n}
    ///     \frac{\Delta\vec{l}_i \times (\vec{p} - \vec{m}_i)}{|\vec{p} - \vec{m}_i|^3}$$
    ///
    /// where $\Delta\vec{l}_i = \vec{l}(t_i) - \vec{l}(t_{i-1})$ and $\vec{m}_i$ is the segment midpoint.
    ///
    /// Error shrinks with the curvature per segment; there is no adaptive refinement.
    /// Zero segments yield zero field. Non-finite if `point` coincides with a segment midpoint.
    pub fn magnetic_field_with_segments(&self, point: (f64, f64, f64), n: usize) -> (f64, f64, f64) {
        let (mut bx, mut by, mut bz) = (0.0, 0.0, 0.0);
        if n == 0 {
            return (bx, by, bz);
        }

        let mut start = self.curve(self.t_min);
        for i in 1..=n {
            let end = self.curve(self.parameter(i, n));
            let (mid, dl) = decompose_filament(start, end);
            let (cx, cy, cz) = segment_kernel(mid, dl, point);
            bx += cx;
            by += cy;
            bz += cz;
            start = end;
        }

        let c = MU0_OVER_4PI * self.current; // [H-A/m]
        (c * bx, c * by, c * bz) // [T]
    }

    /// Same sum as [`GeneralWire::magnetic_field_with_segments`], with the segments
    /// split into chunks that are evaluated on the rayon thread pool.
    ///
    /// Agrees with the serial result up to float roundoff from the different summation order.
    pub fn magnetic_field_par(
        &self,
        point: (f64, f64, f64),
        n: usize,
    ) -> Result<(f64, f64, f64), &'static str> {
        let fil = self.discretize(n);
        let chunk = chunksize(n);

        let (x, y, z) = &fil.xyzfil;
        let (dlx, dly, dlz) = &fil.dlxyzfil;

        (
            x.par_chunks(chunk),
            y.par_chunks(chunk),
            z.par_chunks(chunk),
            dlx.par_chunks(chunk),
            dly.par_chunks(chunk),
            dlz.par_chunks(chunk),
        )
            .into_par_iter()
            .map(|(x, y, z, dlx, dly, dlz)| {
                flux_density_biot_savart(point, (x, y, z), (dlx, dly, dlz), self.current)
            })
            .try_reduce(|| (0.0, 0.0, 0.0), |a, b| Ok(tupleadd(a, b)))
    }
}

impl FieldSource for GeneralWire {
    /// See [`GeneralWire::magnetic_field_with_segments`]; uses [`GeneralWire::segments`] segments.
    fn magnetic_field(&self, point: (f64, f64, f64)) -> (f64, f64, f64) {
        self.magnetic_field_with_segments(point, self.segments)
    }
}

impl Wire for GeneralWire {
    fn current(&self) -> f64 {
        self.current
    }
}

impl std::fmt::Debug for GeneralWire {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneralWire")
            .field("t_min", &self.t_min)
            .field("t_max", &self.t_max)
            .field("current", &self.current)
            .field("segments", &self.segments)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for GeneralWire {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "GeneralWire(t_min={}, t_max={}, current={}, segments={})",
            self.t_min, self.t_max, self.current, self.segments
        )
    }
}

/// Contribution of one straight segment to the flux density at an observation point,
/// less the factor of $\mu_0 I / 4\pi$.
#[inline]
fn segment_kernel(
    mid: (f64, f64, f64),
    dl: (f64, f64, f64),
    obs: (f64, f64, f64),
) -> (f64, f64, f64) {
    // Get distance from middle of the filament segment to the observation point
    let rx = obs.0 - mid.0; // [m]
    let ry = obs.1 - mid.1; // [m]
    let rz = obs.2 - mid.2; // [m]

    // Do 1/r^3 operation with an ordering that improves float error by eliminating
    // the actual cube operation and using fused multiply-add to reduce roundoff events.
    let sumsq = dot3(rx, ry, rz, rx, ry, rz);
    let rnorm3_inv = sumsq.powf(-1.5); // [m^-3]

    let (cx, cy, cz) = cross3(dl.0, dl.1, dl.2, rx, ry, rz); // [m^2]

    (rnorm3_inv * cx, rnorm3_inv * cy, rnorm3_inv * cz) // [m^-1]
}

/// Biot-Savart calculation for B-field contribution from many current filament
/// segments carrying the same current to one observation point.
///
/// Uses filament midpoint as field source.
///
/// # Arguments
///
/// * `xyzp`:     (m) Observation point coords
/// * `xyzfil`:   (m) Filament origin coords (start of segment), each length `m`
/// * `dlxyzfil`: (m) Filament segment length deltas, each length `m`
/// * `ifil`:     (A) Filament current
///
/// # Returns
///
/// * (bx, by, bz) [T] at the observation point
pub fn flux_density_biot_savart(
    xyzp: (f64, f64, f64),
    xyzfil: (&[f64], &[f64], &[f64]),
    dlxyzfil: (&[f64], &[f64], &[f64]),
    ifil: f64,
) -> Result<(f64, f64, f64), &'static str> {
    // Unpack
    let (xfil, yfil, zfil) = xyzfil;
    let (dlxfil, dlyfil, dlzfil) = dlxyzfil;

    // Check lengths; if there is any possibility of mismatch,
    // the compiler will bypass vectorization
    let n = xfil.len();
    if yfil.len() != n
        || zfil.len() != n
        || dlxfil.len() != n
        || dlyfil.len() != n
        || dlzfil.len() != n
    {
        return Err("Input length mismatch");
    }

    let (mut bx, mut by, mut bz) = (0.0, 0.0, 0.0);
    for i in 0..n {
        // Get filament midpoint
        let dl = (dlxfil[i], dlyfil[i], dlzfil[i]); // [m]
        let mid = (
            dl.0.mul_add(0.5, xfil[i]),
            dl.1.mul_add(0.5, yfil[i]),
            dl.2.mul_add(0.5, zfil[i]),
        ); // [m]

        let (cx, cy, cz) = segment_kernel(mid, dl, xyzp);
        bx += cx;
        by += cy;
        bz += cz;
    }

    // Bake in the constant factor once for all contributions
    let c = MU0_OVER_4PI * ifil; // [H-A/m]
    Ok((c * bx, c * by, c * bz)) // [T]
}

#[cfg(test)]
mod test {
    use std::f64::consts::PI;

    use super::*;
    use crate::math::tuplerss;
    use crate::physics::CircularWire;
    use crate::testing::*;
    use crate::MU_0;

    fn on_axis_loop_field(current: f64, radius: f64, d: f64) -> f64 {
        MU_0 * current * radius.powi(2) / (2.0 * (radius.powi(2) + d.powi(2)).powf(1.5))
    }

    fn unit_circle(radius: f64) -> impl Fn(f64) -> (f64, f64, f64) + Send + Sync + 'static {
        move |t: f64| (radius * t.cos(), radius * t.sin(), 0.0)
    }

    #[test]
    fn test_construction_validation() {
        let err = GeneralWire::new(unit_circle(1.0), 1.0, 0.0, 1.0).unwrap_err();
        assert!(matches!(err, FieldSourceError::DegenerateGeometry(_)));

        let err = GeneralWire::new(unit_circle(1.0), 0.5, 0.5, 1.0).unwrap_err();
        assert!(matches!(err, FieldSourceError::DegenerateGeometry(_)));

        let err = GeneralWire::new(unit_circle(1.0), f64::NAN, 1.0, 1.0).unwrap_err();
        assert!(matches!(err, FieldSourceError::DegenerateGeometry(_)));

        let err = GeneralWire::new(|t: f64| (1.0 / t, 0.0, 0.0), 0.0, 1.0, 1.0).unwrap_err();
        assert!(matches!(err, FieldSourceError::InvalidSourceFunction(_)));

        let wire = GeneralWire::new(unit_circle(1.0), -PI, PI, 1.0).unwrap();
        assert_eq!(wire.segments(), DEFAULT_SEGMENTS);
        assert!(matches!(
            wire.with_segments(0).unwrap_err(),
            FieldSourceError::DegenerateGeometry(_)
        ));
        assert_eq!(wire.with_segments(17).unwrap().segments(), 17);
    }

    /// On the axis of a circular path, refining the discretization
    /// moves monotonically toward the exact loop field.
    #[test]
    fn test_convergence_on_axis() {
        let (radius, current, d) = (0.5, 2.0, 1.0);
        let wire = GeneralWire::new(unit_circle(radius), -PI, PI, current).unwrap();
        let exact = on_axis_loop_field(current, radius, d);

        let mut prev_err = f64::INFINITY;
        for n in [10, 30, 100, 300, 1000] {
            let (_, _, bz) = wire.magnetic_field_with_segments((0.0, 0.0, d), n);
            let err = (bz - exact).abs();
            assert!(err < prev_err);
            prev_err = err;
        }

        let (_, _, bz) = wire.magnetic_field((0.0, 0.0, d));
        assert!(approx(exact, bz, 1e-5, 0.0));
    }

    #[test]
    fn test_discretize() {
        let wire = GeneralWire::new(|t: f64| (t, 2.0 * t, 0.0), 0.0, 2.0, 1.0).unwrap();
        let fil = wire.discretize(4);
        assert_eq!(fil.len(), 4);
        assert_eq!(fil.xyzfil.0, vec![0.0, 0.5, 1.0, 1.5]);
        assert_eq!(fil.xyzfil.1, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(fil.dlxyzfil.0, vec![0.5; 4]);
        assert_eq!(fil.dlxyzfil.1, vec![1.0; 4]);
        assert_eq!(fil.dlxyzfil.2, vec![0.0; 4]);

        assert!(wire.discretize(0).is_empty());
    }

    /// The streaming sum, the slice kernel, and the parallel reduction agree
    #[test]
    fn test_serial_kernel_and_parallel_agree() {
        let (rtol, atol) = (1e-12, 1e-20);

        // Tilted helix
        let helix = |t: f64| (0.3 * t.cos(), 0.3 * t.sin(), 0.05 * t);
        let wire = GeneralWire::new(helix, -4.0 * PI, 4.0 * PI, 1.7).unwrap();
        let n = 2000;
        let fil = wire.discretize(n);

        for obs in example_observation_points() {
            let serial = wire.magnetic_field_with_segments(obs, n);

            let (x, y, z) = &fil.xyzfil;
            let (dlx, dly, dlz) = &fil.dlxyzfil;
            let kernel =
                flux_density_biot_savart(obs, (x, y, z), (dlx, dly, dlz), wire.current()).unwrap();
            let par = wire.magnetic_field_par(obs, n).unwrap();

            assert!(approx3(serial, kernel, rtol, atol));
            assert!(approx3(serial, par, rtol, atol));
        }
    }

    #[test]
    fn test_kernel_length_mismatch() {
        let x = [0.0, 1.0];
        let short = [0.0];
        let result = flux_density_biot_savart(
            (0.0, 0.0, 1.0),
            (&x, &x, &x),
            (&x, &short, &x),
            1.0,
        );
        assert!(result.is_err());
    }

    /// Reversing the parameter direction reverses the field
    #[test]
    fn test_current_direction_follows_parameter() {
        let fwd = GeneralWire::new(unit_circle(0.4), -PI, PI, 1.0).unwrap();
        let rev = GeneralWire::new(|t: f64| unit_circle(0.4)(-t), -PI, PI, 1.0).unwrap();
        let neg = GeneralWire::new(unit_circle(0.4), -PI, PI, -1.0).unwrap();

        for obs in example_observation_points() {
            let b0 = fwd.magnetic_field(obs);
            let b1 = rev.magnetic_field(obs);
            let b2 = neg.magnetic_field(obs);
            assert!(approx3((-b0.0, -b0.1, -b0.2), b1, 1e-9, 1e-20));
            assert_eq!((-b0.0, -b0.1, -b0.2), b2);
        }
    }

    /// Discretized and quadrature loops of the same geometry agree away from the wire
    #[test]
    fn test_matches_circular_wire() {
        let loop_ = CircularWire::new((0.0, 0.0, 1.0), (0.0, 0.0, 0.0), 0.5, 2.0).unwrap();
        let wire = GeneralWire::new(unit_circle(0.5), -PI, PI, 2.0).unwrap();

        for obs in example_observation_points() {
            let b_loop = loop_.magnetic_field(obs);
            let b_wire = wire.magnetic_field(obs);
            assert!(approx3(b_loop, b_wire, 1e-4, 0.0));
            assert!(tuplerss(b_loop) > 0.0);
        }
    }

    /// A point on a segment midpoint gives a non-finite sum
    #[test]
    fn test_singular_on_midpoint() {
        let wire = GeneralWire::new(|t: f64| (t, 0.0, 0.0), 0.0, 2.0, 1.0).unwrap();

        let (bx, by, bz) = wire.magnetic_field_with_segments((0.5, 0.0, 0.0), 2);
        assert!(!(bx.is_finite() && by.is_finite() && bz.is_finite()));

        // Off the midpoints, on the same line, the sum is finite
        let (bx, by, bz) = wire.magnetic_field_with_segments((1.0, 0.0, 0.0), 2);
        assert!(bx.is_finite() && by.is_finite() && bz.is_finite());
    }

    #[test]
    fn test_display() {
        let wire = GeneralWire::new(unit_circle(1.0), 0.0, 1.5, 2.0).unwrap();
        assert_eq!(
            wire.to_string(),
            "GeneralWire(t_min=0, t_max=1.5, current=2, segments=1000)"
        );
    }
}
