use crate::core::particle::{DIAMETER, DIM};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Rectangular simulation cell, periodic along both axes.
///
/// Positions live in `[0, Lx) × [0, Ly)`; separations use the minimum-image convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodicCell {
    size: [f64; DIM],
}

impl PeriodicCell {
    /// Create a cell with edge lengths `lx` × `ly`.
    ///
    /// Each edge must be finite and at least two diameters, otherwise the minimum image
    /// of a touching pair is not the image that touches.
    pub fn new(lx: f64, ly: f64) -> Result<Self> {
        for (name, l) in [("lx", lx), ("ly", ly)] {
            if !l.is_finite() {
                return Err(Error::InvalidConfig(format!("{name} must be finite")));
            }
            if l < 2.0 * DIAMETER {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be at least {} (two disk diameters), got {l}",
                    2.0 * DIAMETER
                )));
            }
        }
        Ok(Self { size: [lx, ly] })
    }

    #[inline]
    pub fn lx(&self) -> f64 {
        self.size[0]
    }

    #[inline]
    pub fn ly(&self) -> f64 {
        self.size[1]
    }

    /// Edge length along axis `k`.
    #[inline]
    pub fn edge(&self, k: usize) -> f64 {
        self.size[k]
    }

    /// Minimum-image reduction of a coordinate difference along axis `k`.
    #[inline]
    pub fn separation(&self, dx: f64, k: usize) -> f64 {
        let l = self.size[k];
        dx - l * (dx / l).round()
    }

    /// Minimum-image separation vector `a - b`.
    #[inline]
    pub fn separation_vec(&self, a: &[f64; DIM], b: &[f64; DIM]) -> [f64; DIM] {
        let mut d = [0.0_f64; DIM];
        for (k, d_k) in d.iter_mut().enumerate() {
            *d_k = self.separation(a[k] - b[k], k);
        }
        d
    }

    /// Squared minimum-image distance between two points.
    #[inline]
    pub fn distance_sq(&self, a: &[f64; DIM], b: &[f64; DIM]) -> f64 {
        let d = self.separation_vec(a, b);
        dot(&d, &d)
    }

    /// Wrap a coordinate back into `[0, L)` along axis `k`.
    #[inline]
    pub fn wrap(&self, x: f64, k: usize) -> f64 {
        let l = self.size[k];
        let mut w = x - l * (x / l).floor();
        if w < 0.0 {
            w += l;
        }
        if w >= l {
            w -= l;
        }
        // Tiny negative inputs round up to exactly `l`.
        if (0.0..l).contains(&w) {
            w
        } else {
            0.0
        }
    }

    /// Wrap a position vector into the cell.
    #[inline]
    pub fn wrap_vec(&self, r: &[f64; DIM]) -> [f64; DIM] {
        let mut out = [0.0_f64; DIM];
        for (k, o) in out.iter_mut().enumerate() {
            *o = self.wrap(r[k], k);
        }
        out
    }
}

#[inline]
pub(crate) fn dot(a: &[f64; DIM], b: &[f64; DIM]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn rejects_small_or_non_finite_cells() {
        assert!(PeriodicCell::new(1.5, 10.0).is_err());
        assert!(PeriodicCell::new(10.0, f64::NAN).is_err());
        assert!(PeriodicCell::new(f64::INFINITY, 10.0).is_err());
        assert!(PeriodicCell::new(2.0, 2.0).is_ok());
    }

    #[test]
    fn separation_uses_nearest_image() -> Result<()> {
        let cell = PeriodicCell::new(10.0, 6.0)?;
        assert_relative_eq!(cell.separation(9.0, 0), -1.0);
        assert_relative_eq!(cell.separation(-9.0, 0), 1.0);
        assert_relative_eq!(cell.separation(2.0, 1), 2.0);
        assert_relative_eq!(cell.separation(5.0, 1), -1.0);
        let d = cell.separation_vec(&[0.5, 0.5], &[9.5, 5.5]);
        assert_relative_eq!(d[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(d[1], 1.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn wrap_maps_into_cell() -> Result<()> {
        let cell = PeriodicCell::new(10.0, 10.0)?;
        assert_relative_eq!(cell.wrap(10.5, 0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(cell.wrap(-0.25, 0), 9.75, epsilon = 1e-12);
        assert_eq!(cell.wrap(-1e-18, 0), 0.0);
        Ok(())
    }

    proptest! {
        #[test]
        fn prop_wrap_in_range(x in -1.0e6f64..1.0e6) {
            let cell = PeriodicCell::new(7.5, 3.0).unwrap();
            for k in 0..DIM {
                let w = cell.wrap(x, k);
                prop_assert!(w >= 0.0 && w < cell.edge(k));
            }
        }

        #[test]
        fn prop_separation_at_most_half_cell(dx in -1.0e4f64..1.0e4) {
            let cell = PeriodicCell::new(7.5, 3.0).unwrap();
            for k in 0..DIM {
                let s = cell.separation(dx, k);
                prop_assert!(s.abs() <= 0.5 * cell.edge(k) + 1e-9);
            }
        }
    }
}
