use crate::error::{Error, Result};

/// Fixed spatial dimension (2D disks).
pub const DIM: usize = 2;

/// Disk diameter, which is also the center-to-center contact distance.
pub const DIAMETER: f64 = 1.0;

/// A unit-mass hard disk.
///
/// Fields:
/// - `r`: position [x, y], kept inside the periodic cell
/// - `v`: velocity [vx, vy]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disk {
    /// Position (x, y).
    pub r: [f64; DIM],
    /// Velocity (vx, vy).
    pub v: [f64; DIM],
}

impl Disk {
    /// Create a new disk after validating that every component is finite.
    pub fn new(r: [f64; DIM], v: [f64; DIM]) -> Result<Self> {
        if !r.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        if !v.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        Ok(Self { r, v })
    }

    /// Squared speed |v|^2.
    #[inline]
    pub fn speed_sq(&self) -> f64 {
        self.v.iter().map(|&c| c * c).sum()
    }

    /// Kinetic energy 1/2 |v|^2 (unit mass).
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.speed_sq()
    }
}
