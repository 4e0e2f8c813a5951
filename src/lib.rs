#![allow(non_snake_case)]
//! Magnetostatic flux density of idealized current sources.
//!
//! Sources are constructed once from SI-unit geometry and current, then
//! evaluated at any number of observation points through [`physics::FieldSource`].
//! Outputs are in tesla.

pub mod error;
pub mod math;
pub mod physics;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{FieldSourceError, FieldSourceResult};
pub use physics::{
    CircularWire, FieldSource, FiniteStraightWire, GeneralWire, InfiniteStraightWire,
    MagneticDipole, Wire,
};

/// (H/m) vacuum magnetic permeability.
/// Value from 2022 CODATA recommended values, [NIST SPI 961](https://physics.nist.gov/cuu/pdf/wall_2022.pdf).
pub const MU_0: f64 = 0.999_999_999_87 * core::f64::consts::PI * 4e-7; // [H/m]

/// (H/m) Recurring constant multiple of `mu_0`
pub const MU0_OVER_4PI: f64 = MU_0 / (4.0 * core::f64::consts::PI);

/// Number of items per rayon work chunk, given the number of available cores.
#[inline]
pub(crate) fn chunksize(nelem: usize) -> usize {
    let ncores = std::thread::available_parallelism()
        .unwrap_or(std::num::NonZeroUsize::MIN)
        .get();

    (nelem / ncores).max(1)
}
