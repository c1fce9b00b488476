//! Initial configurations: disk placement and velocity sampling.

use crate::core::cell::PeriodicCell;
use crate::core::particle::{DIAMETER, DIM};
use crate::error::{Error, Result};
use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default cap on random placement attempts per disk.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;

/// How initial positions are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Staggered square lattice filling the cell.
    #[default]
    Regular,
    /// Uniform random positions with overlap rejection.
    Random,
}

impl FromStr for Placement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regular" => Ok(Self::Regular),
            "random" => Ok(Self::Random),
            other => Err(Error::InvalidConfig(format!(
                "unknown placement mode '{other}' (expected 'regular' or 'random')"
            ))),
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regular => f.write_str("regular"),
            Self::Random => f.write_str("random"),
        }
    }
}

/// Lay `n` disks on a staggered lattice with `ceil(sqrt(n))` columns.
///
/// Rows alternate between a quarter and three-quarter column offset. Fails if the
/// resulting lattice has overlapping disks.
pub fn place_regular(n: usize, cell: &PeriodicCell) -> Result<Vec<[f64; DIM]>> {
    let nx = lattice_columns(n);
    let ax = cell.lx() / nx as f64;
    let ay = cell.ly() / nx as f64;

    let mut out = Vec::with_capacity(n);
    let mut iy = 0usize;
    while out.len() < n {
        let offset = if iy % 2 == 0 { 0.25 } else { 0.75 };
        for ix in 0..nx {
            if out.len() == n {
                break;
            }
            out.push([ax * (ix as f64 + offset), ay * (iy as f64 + 0.5)]);
        }
        iy += 1;
    }

    if let Some((i, j)) = first_overlap(&out, cell, DIAMETER * DIAMETER) {
        return Err(Error::InvalidConfig(format!(
            "regular lattice of {n} disks overlaps in a {} x {} cell (disks {i} and {j})",
            cell.lx(),
            cell.ly()
        )));
    }
    debug!("placed {n} disks on a {nx}-column lattice");
    Ok(out)
}

/// Place `n` disks uniformly at random, rejecting spots that overlap earlier disks.
///
/// Each disk gets at most `max_attempts` tries before placement fails with
/// [`Error::PlacementExhausted`].
pub fn place_random<R: Rng>(
    n: usize,
    cell: &PeriodicCell,
    rng: &mut R,
    max_attempts: usize,
) -> Result<Vec<[f64; DIM]>> {
    let mut out: Vec<[f64; DIM]> = Vec::with_capacity(n);
    let mut total_attempts = 0usize;
    for index in 0..n {
        let mut attempts = 0usize;
        let r = loop {
            if attempts >= max_attempts {
                return Err(Error::PlacementExhausted { index, attempts });
            }
            attempts += 1;
            let r = [
                cell.lx() * rng.random::<f64>(),
                cell.ly() * rng.random::<f64>(),
            ];
            if !overlaps_any(&out, &r, cell) {
                break r;
            }
        };
        if attempts > max_attempts / 2 {
            warn!("disk {index} needed {attempts} placement attempts; cell is close to jamming");
        }
        total_attempts += attempts;
        out.push(r);
    }
    debug!("placed {n} disks at random in {total_attempts} attempts");
    Ok(out)
}

/// Sample velocities uniform in `[-0.5, 0.5)` per component, then remove the
/// centre-of-mass drift.
pub fn sample_velocities<R: Rng>(n: usize, rng: &mut R) -> Vec<[f64; DIM]> {
    let mut v: Vec<[f64; DIM]> = (0..n)
        .map(|_| [rng.random::<f64>() - 0.5, rng.random::<f64>() - 0.5])
        .collect();
    remove_drift(&mut v);
    v
}

/// Subtract the mean velocity so total momentum is zero.
pub fn remove_drift(v: &mut [[f64; DIM]]) {
    if v.is_empty() {
        return;
    }
    let n = v.len() as f64;
    let mut mean = [0.0_f64; DIM];
    for vi in v.iter() {
        for (m, &c) in mean.iter_mut().zip(vi) {
            *m += c / n;
        }
    }
    for vi in v.iter_mut() {
        for (c, &m) in vi.iter_mut().zip(&mean) {
            *c -= m;
        }
    }
}

/// First pair `(i, j)`, `i < j`, whose minimum-image squared distance is below `min_sq`.
pub fn first_overlap(
    positions: &[[f64; DIM]],
    cell: &PeriodicCell,
    min_sq: f64,
) -> Option<(usize, usize)> {
    for (i, ri) in positions.iter().enumerate() {
        for (j, rj) in positions.iter().enumerate().skip(i + 1) {
            if cell.distance_sq(ri, rj) < min_sq {
                return Some((i, j));
            }
        }
    }
    None
}

fn overlaps_any(existing: &[[f64; DIM]], r: &[f64; DIM], cell: &PeriodicCell) -> bool {
    let min_sq = DIAMETER * DIAMETER;
    existing.iter().any(|p| cell.distance_sq(r, p) < min_sq)
}

fn lattice_columns(n: usize) -> usize {
    let mut nx = (n as f64).sqrt() as usize;
    while nx * nx < n {
        nx += 1;
    }
    nx.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn placement_parses_from_str() -> Result<()> {
        assert_eq!("regular".parse::<Placement>()?, Placement::Regular);
        assert_eq!(" Random ".parse::<Placement>()?, Placement::Random);
        assert!("hexagonal".parse::<Placement>().is_err());
        assert_eq!(Placement::Random.to_string(), "random");
        Ok(())
    }

    #[test]
    fn lattice_columns_is_ceil_sqrt() {
        assert_eq!(lattice_columns(1), 1);
        assert_eq!(lattice_columns(16), 4);
        assert_eq!(lattice_columns(17), 5);
        assert_eq!(lattice_columns(50), 8);
    }

    #[test]
    fn regular_lattice_layout() -> Result<()> {
        let cell = PeriodicCell::new(8.0, 8.0)?;
        let r = place_regular(16, &cell)?;
        assert_eq!(r.len(), 16);
        // First row: quarter offset; second row: three-quarter offset.
        assert_relative_eq!(r[0][0], 0.5);
        assert_relative_eq!(r[0][1], 1.0);
        assert_relative_eq!(r[4][0], 1.5);
        assert_relative_eq!(r[4][1], 3.0);
        assert!(first_overlap(&r, &cell, DIAMETER * DIAMETER).is_none());
        Ok(())
    }

    #[test]
    fn regular_lattice_rejects_overlap() -> Result<()> {
        let cell = PeriodicCell::new(4.0, 4.0)?;
        let err = place_regular(30, &cell).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        Ok(())
    }

    #[test]
    fn random_placement_has_no_overlap() -> Result<()> {
        let cell = PeriodicCell::new(12.0, 12.0)?;
        let mut rng = StdRng::seed_from_u64(11);
        let r = place_random(40, &cell, &mut rng, DEFAULT_MAX_ATTEMPTS)?;
        assert_eq!(r.len(), 40);
        assert!(first_overlap(&r, &cell, DIAMETER * DIAMETER).is_none());
        assert!(r
            .iter()
            .all(|p| (0.0..cell.lx()).contains(&p[0]) && (0.0..cell.ly()).contains(&p[1])));
        Ok(())
    }

    #[test]
    fn random_placement_gives_up_when_dense() -> Result<()> {
        // 16 disks at packing fraction ~0.79 in a 4x4 cell rarely fit by rejection.
        let cell = PeriodicCell::new(4.0, 4.0)?;
        let mut rng = StdRng::seed_from_u64(5);
        let err = place_random(16, &cell, &mut rng, 50).unwrap_err();
        match err {
            Error::PlacementExhausted { attempts, .. } => assert_eq!(attempts, 50),
            other => panic!("unexpected error: {other}"),
        }
        Ok(())
    }

    #[test]
    fn sampled_velocities_have_zero_momentum() {
        let mut rng = StdRng::seed_from_u64(99);
        let v = sample_velocities(25, &mut rng);
        let px: f64 = v.iter().map(|vi| vi[0]).sum();
        let py: f64 = v.iter().map(|vi| vi[1]).sum();
        assert!(px.abs() < 1e-12);
        assert!(py.abs() < 1e-12);
        assert!(v.iter().all(|vi| vi.iter().all(|c| c.abs() <= 1.0)));
    }
}
