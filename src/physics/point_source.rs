//! Calculations for 0D field sources such as dipoles.

use crate::{
    math::{dot3, tuplesub},
    physics::{FieldSource, Vector},
    MU0_OVER_4PI,
};

/// Point magnetic dipole.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagneticDipole {
    moment: (f64, f64, f64),   // [A-m^2]
    position: (f64, f64, f64), // [m]
}

impl MagneticDipole {
    /// # Arguments
    ///
    /// * `moment`:   (A-m^2) magnetic moment vector
    /// * `position`: (m) location of the dipole
    pub fn new(moment: (f64, f64, f64), position: (f64, f64, f64)) -> Self {
        tracing::debug!(?moment, ?position, "magnetic dipole");
        Self { moment, position }
    }

    /// (A-m^2) magnetic moment vector
    pub fn moment(&self) -> (f64, f64, f64) {
        self.moment
    }

    /// (m) location of the dipole
    pub fn position(&self) -> (f64, f64, f64) {
        self.position
    }
}

impl FieldSource for MagneticDipole {
    /// Magnetic flux density of a dipole in cartesian coordinates,
    /// $\frac{\mu_0}{4\pi}\left(\frac{3\vec{r}(\vec{m}\cdot\vec{r})}{|r|^5} - \frac{\vec{m}}{|r|^3}\right)$.
    ///
    /// Singular at the dipole location, where the result is non-finite.
    #[inline]
    fn magnetic_field(&self, point: (f64, f64, f64)) -> (f64, f64, f64) {
        // Radius vector decomposed into direction and magnitude
        let r = tuplesub(point, self.position); // [m]
        let r2 = dot3(r.0, r.1, r.2, r.0, r.1, r.2); // [m^2]
        let rmag = r2.sqrt(); // [m]
        let rhat = (r.0 / rmag, r.1 / rmag, r.2 / rmag); // [dimensionless]
        let r3 = r2 * rmag; // [m^3]

        // r(dot(m, r))/|r|^5 reordered to avoid computing the 5th power for improved float resolution
        let m = self.moment;
        let m_dot_rhat = dot3(m.0, m.1, m.2, rhat.0, rhat.1, rhat.2);

        // Assemble components
        let c = MU0_OVER_4PI / r3; // [H/m^4]
        let c1 = 3.0 * m_dot_rhat; // [A-m^2]

        (
            c * rhat.0.mul_add(c1, -m.0),
            c * rhat.1.mul_add(c1, -m.1),
            c * rhat.2.mul_add(c1, -m.2),
        ) // [T]
    }
}

impl std::fmt::Display for MagneticDipole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MagneticDipole(moment={}, position={})",
            Vector(self.moment),
            Vector(self.position)
        )
    }
}
