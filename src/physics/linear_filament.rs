//! Magnetics calculations for straight current filaments.

use crate::{
    error::{FieldSourceError, FieldSourceResult},
    math::{tuplecross, tupledot, tuplefinite, tuplenormalize, tuplerss, tuplescale, tuplesub},
    physics::{FieldSource, GeneralWire, Vector, Wire},
    MU0_OVER_4PI,
};

/// Straight filament of infinite length.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "InfiniteStraightWireParams"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfiniteStraightWire {
    direction: (f64, f64, f64),    // [dimensionless] unit vector
    anchor_point: (f64, f64, f64), // [m]
    current: f64,                  // [A]
}

impl InfiniteStraightWire {
    /// # Arguments
    ///
    /// * `direction`:    direction of positive current; any nonzero length, normalized here
    /// * `anchor_point`: (m) any point on the wire
    /// * `current`:      (A) signed current along `direction`
    ///
    /// # Errors
    ///
    /// * [`FieldSourceError::DegenerateGeometry`] if `direction` has zero or non-finite length,
    ///   or if `anchor_point` is not finite
    pub fn new(
        direction: (f64, f64, f64),
        anchor_point: (f64, f64, f64),
        current: f64,
    ) -> FieldSourceResult<Self> {
        let mag = tuplerss(direction);
        if !(mag > 0.0 && mag.is_finite()) {
            return Err(FieldSourceError::DegenerateGeometry(format!(
                "wire direction {} cannot be normalized",
                Vector(direction)
            )));
        }
        if !tuplefinite(anchor_point) {
            return Err(FieldSourceError::DegenerateGeometry(format!(
                "wire anchor point {} is not finite",
                Vector(anchor_point)
            )));
        }
        let direction = tuplenormalize(direction);
        tracing::debug!(?direction, ?anchor_point, current, "infinite straight wire");

        Ok(Self {
            direction,
            anchor_point,
            current,
        })
    }

    /// Unit vector along the direction of positive current
    pub fn direction(&self) -> (f64, f64, f64) {
        self.direction
    }

    /// (m) the point on the wire supplied at construction
    pub fn anchor_point(&self) -> (f64, f64, f64) {
        self.anchor_point
    }
}

impl FieldSource for InfiniteStraightWire {
    /// $\frac{\mu_0 I}{2 \pi r}$ in the azimuthal direction $\hat{l} \times \vec{r}$,
    /// where $r$ is the perpendicular distance from the wire.
    ///
    /// Non-finite on the wire axis.
    #[inline]
    fn magnetic_field(&self, point: (f64, f64, f64)) -> (f64, f64, f64) {
        // Perpendicular offset rotated into the field direction; its length is the distance
        let rvec = tuplecross(self.direction, tuplesub(point, self.anchor_point)); // [m]
        let r2 = tupledot(rvec, rvec); // [m^2]

        // mu0 I / (2 pi r) * rvec / r
        let c = 2.0 * MU0_OVER_4PI * self.current / r2; // [T/m]

        tuplescale(c, rvec) // [T]
    }
}

impl Wire for InfiniteStraightWire {
    fn current(&self) -> f64 {
        self.current
    }
}

impl std::fmt::Display for InfiniteStraightWire {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "InfiniteStraightWire(direction={}, anchor_point={}, current={})",
            Vector(self.direction),
            Vector(self.anchor_point),
            self.current
        )
    }
}

/// Straight filament between two endpoints.
/// Positive current flows from `endpoint_a` to `endpoint_b`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "FiniteStraightWireParams"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiniteStraightWire {
    endpoint_a: (f64, f64, f64), // [m]
    endpoint_b: (f64, f64, f64), // [m]
    current: f64,                // [A]
}

impl FiniteStraightWire {
    /// # Arguments
    ///
    /// * `endpoint_a`: (m) start of the filament
    /// * `endpoint_b`: (m) end of the filament
    /// * `current`:    (A) signed current from `endpoint_a` to `endpoint_b`
    ///
    /// # Errors
    ///
    /// * [`FieldSourceError::DegenerateGeometry`] if the endpoints coincide or are not finite
    pub fn new(
        endpoint_a: (f64, f64, f64),
        endpoint_b: (f64, f64, f64),
        current: f64,
    ) -> FieldSourceResult<Self> {
        if !(tuplefinite(endpoint_a) && tuplefinite(endpoint_b)) {
            return Err(FieldSourceError::DegenerateGeometry(format!(
                "wire endpoints must be finite, got {} and {}",
                Vector(endpoint_a),
                Vector(endpoint_b)
            )));
        }
        if endpoint_a == endpoint_b {
            return Err(FieldSourceError::DegenerateGeometry(format!(
                "wire endpoints must be distinct, got {} twice",
                Vector(endpoint_a)
            )));
        }
        tracing::debug!(?endpoint_a, ?endpoint_b, current, "finite straight wire");

        Ok(Self {
            endpoint_a,
            endpoint_b,
            current,
        })
    }

    /// (m) start of the filament
    pub fn endpoint_a(&self) -> (f64, f64, f64) {
        self.endpoint_a
    }

    /// (m) end of the filament
    pub fn endpoint_b(&self) -> (f64, f64, f64) {
        self.endpoint_b
    }

    /// Equivalent parametric wire, $\vec{a} + (\vec{b} - \vec{a}) t$ for $t \in [0, 1]$,
    /// for evaluation with the discretization engine instead of the exact formula.
    pub fn to_general_wire(&self) -> GeneralWire {
        let a = self.endpoint_a;
        let ab = tuplesub(self.endpoint_b, a);
        GeneralWire::new_unchecked(
            move |t: f64| (ab.0.mul_add(t, a.0), ab.1.mul_add(t, a.1), ab.2.mul_add(t, a.2)),
            0.0,
            1.0,
            self.current,
        )
    }
}

impl FieldSource for FiniteStraightWire {
    /// Exact flux density of a finite segment.
    ///
    /// # Commentary
    ///
    /// With $P_f$ the foot of the perpendicular from the observation point $P$
    /// to the line through the endpoints, and $\theta_1$, $\theta_2$ the angles
    /// between $\overrightarrow{AB}$ and $\overrightarrow{AP}$, $\overrightarrow{BP}$,
    ///
    /// $$\vec{B} = \frac{\mu_0 I}{4\pi} \frac{\cos\theta_1 - \cos\theta_2}{|\overrightarrow{P_fP}|}
    ///     \frac{\overrightarrow{AB} \times \overrightarrow{P_fP}}{|\overrightarrow{AB} \times \overrightarrow{P_fP}|}$$
    ///
    /// Non-finite anywhere on the infinite extension of the segment.
    #[inline]
    fn magnetic_field(&self, point: (f64, f64, f64)) -> (f64, f64, f64) {
        let a = self.endpoint_a; // [m]
        let ab = tuplesub(self.endpoint_b, a); // [m] filament vector
        let ab2 = tupledot(ab, ab); // [m^2]
        let abmag = ab2.sqrt(); // [m]

        let ap = tuplesub(point, a); // [m]
        let bp = tuplesub(point, self.endpoint_b); // [m]

        // Foot of perpendicular
        let ap_dot_ab = tupledot(ap, ab); // [m^2]
        let ratio = ap_dot_ab / ab2; // [dimensionless]
        let foot = (
            ab.0.mul_add(ratio, a.0),
            ab.1.mul_add(ratio, a.1),
            ab.2.mul_add(ratio, a.2),
        ); // [m]
        let perp = tuplesub(point, foot); // [m]
        let dist = tuplerss(perp); // [m]

        // Direction cosines relative to each end
        let cos_theta_1 = ap_dot_ab / (tuplerss(ap) * abmag);
        let cos_theta_2 = tupledot(bp, ab) / (tuplerss(bp) * abmag);

        let bhat = tuplenormalize(tuplecross(ab, perp)); // [dimensionless]
        let bmag = MU0_OVER_4PI * self.current * (cos_theta_1 - cos_theta_2) / dist; // [T]

        tuplescale(bmag, bhat) // [T]
    }
}

impl Wire for FiniteStraightWire {
    fn current(&self) -> f64 {
        self.current
    }
}

impl std::fmt::Display for FiniteStraightWire {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FiniteStraightWire(endpoint_a={}, endpoint_b={}, current={})",
            Vector(self.endpoint_a),
            Vector(self.endpoint_b),
            self.current
        )
    }
}

/// Deserialized form of [`InfiniteStraightWire`], validated through its constructor
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct InfiniteStraightWireParams {
    direction: (f64, f64, f64),
    anchor_point: (f64, f64, f64),
    current: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<InfiniteStraightWireParams> for InfiniteStraightWire {
    type Error = FieldSourceError;

    fn try_from(p: InfiniteStraightWireParams) -> FieldSourceResult<Self> {
        Self::new(p.direction, p.anchor_point, p.current)
    }
}

/// Deserialized form of [`FiniteStraightWire`], validated through its constructor
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct FiniteStraightWireParams {
    endpoint_a: (f64, f64, f64),
    endpoint_b: (f64, f64, f64),
    current: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<FiniteStraightWireParams> for FiniteStraightWire {
    type Error = FieldSourceError;

    fn try_from(p: FiniteStraightWireParams) -> FieldSourceResult<Self> {
        Self::new(p.endpoint_a, p.endpoint_b, p.current)
    }
}
