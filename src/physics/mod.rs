//! Electromagnetics calculations.
//!
//! Every source implements [`FieldSource`]: construction validates and caches the
//! geometry, and evaluation is a pure function of the source and the observation point.
pub mod biotsavart;
pub mod circular_filament;
pub mod linear_filament;
pub mod point_source;

pub use biotsavart::{flux_density_biot_savart, Curve, Filaments, GeneralWire, DEFAULT_SEGMENTS};
pub use circular_filament::{CircularWire, DEFAULT_QUADRATURE_ORDER};
pub use linear_filament::{FiniteStraightWire, InfiniteStraightWire};
pub use point_source::MagneticDipole;

/// A static magnetic field source.
pub trait FieldSource: Send + Sync {
    /// Magnetic flux density at an observation point.
    ///
    /// # Arguments
    ///
    /// * `point`: (m) observation point, in the same frame as the source geometry
    ///
    /// # Returns
    ///
    /// * (bx, by, bz) [T]. Non-finite if `point` lies on the source geometry.
    fn magnetic_field(&self, point: (f64, f64, f64)) -> (f64, f64, f64);
}

/// A current-carrying filament.
pub trait Wire: FieldSource {
    /// (A) signed current along the wire's positive direction
    fn current(&self) -> f64;
}

/// Sum the flux density contributions of several sources at one observation point.
pub fn total_magnetic_field(sources: &[&dyn FieldSource], point: (f64, f64, f64)) -> (f64, f64, f64) {
    sources.iter().fold((0.0, 0.0, 0.0), |acc, source| {
        let (bx, by, bz) = source.magnetic_field(point);
        (acc.0 + bx, acc.1 + by, acc.2 + bz)
    })
}

/// Tuple formatting shared by the sources' `Display` impls
pub(crate) struct Vector(pub (f64, f64, f64));

impl std::fmt::Display for Vector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.0 .0, self.0 .1, self.0 .2)
    }
}
