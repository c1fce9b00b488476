//! Observables beyond pressure: energy, momentum, temperature, collision rate and speeds.

use crate::core::particle::DIM;
use crate::core::sim::{mean_kinetic_energy, HardDisks};
use crate::error::{Error, Result};

/// Binned speed distribution next to the 2D Maxwell–Boltzmann expectation.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedHistogram {
    /// Bin edges, `bins + 1` values from 0 to the maximum speed.
    pub edges: Vec<f64>,
    /// Disks per bin. Speeds at or above the top edge land in the last bin.
    pub counts: Vec<f64>,
    /// Expected disks per bin at the current kinetic temperature.
    pub expected: Vec<f64>,
}

/// 2D Maxwell–Boltzmann speed density for unit mass: `(v / T) exp(-v² / 2T)`.
pub fn maxwell_boltzmann_2d(speed: f64, temperature: f64) -> f64 {
    if temperature <= 0.0 || speed < 0.0 {
        return 0.0;
    }
    speed / temperature * (-speed * speed / (2.0 * temperature)).exp()
}

impl HardDisks {
    /// Total kinetic energy.
    pub fn kinetic_energy(&self) -> f64 {
        self.disks.iter().map(|d| d.kinetic_energy()).sum()
    }

    /// Total momentum (unit mass).
    pub fn momentum(&self) -> [f64; DIM] {
        let mut p = [0.0_f64; DIM];
        for d in &self.disks {
            for (pk, vk) in p.iter_mut().zip(d.v) {
                *pk += vk;
            }
        }
        p
    }

    /// Instantaneous kinetic temperature (mean kinetic energy per disk).
    ///
    /// Equals [`HardDisks::temperature`] as long as energy is conserved.
    pub fn kinetic_temperature(&self) -> f64 {
        mean_kinetic_energy(&self.disks)
    }

    /// Per-axis temperatures `<v_k²>`, one entry per axis.
    pub fn temperature_components(&self) -> [f64; DIM] {
        let mut t = [0.0_f64; DIM];
        if self.disks.is_empty() {
            return t;
        }
        let n = self.disks.len() as f64;
        for d in &self.disks {
            for (tk, vk) in t.iter_mut().zip(d.v) {
                *tk += vk * vk / n;
            }
        }
        t
    }

    /// Mean time between collisions per disk, `N · elapsed / (2 · collisions)`.
    ///
    /// `None` until a collision has been counted since the last reset.
    pub fn mean_free_time(&self) -> Option<f64> {
        let avg = self.averages();
        if avg.collisions == 0 {
            return None;
        }
        Some(self.num_particles() as f64 * avg.elapsed / (2.0 * avg.collisions as f64))
    }

    /// Histogram of disk speeds over `[0, max_speed)` in `bins` equal bins.
    ///
    /// `max_speed` defaults to four thermal speeds `4 sqrt(T)`.
    pub fn speed_histogram(&self, bins: usize, max_speed: Option<f64>) -> Result<SpeedHistogram> {
        if bins == 0 {
            return Err(Error::InvalidParam("bins must be > 0".into()));
        }
        let t = self.kinetic_temperature();
        let top = match max_speed {
            Some(m) => m,
            None => 4.0 * t.sqrt(),
        };
        if !top.is_finite() || top <= 0.0 {
            return Err(Error::InvalidParam(
                "max_speed must be finite and > 0".into(),
            ));
        }

        let width = top / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|b| b as f64 * width).collect();
        let mut counts = vec![0.0_f64; bins];
        for d in &self.disks {
            let s = d.speed_sq().sqrt();
            let b = ((s / width) as usize).min(bins - 1);
            counts[b] += 1.0;
        }
        let n = self.disks.len() as f64;
        let expected = (0..bins)
            .map(|b| n * width * maxwell_boltzmann_2d((b as f64 + 0.5) * width, t))
            .collect();
        Ok(SpeedHistogram {
            edges,
            counts,
            expected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Placement;
    use approx::assert_relative_eq;

    #[test]
    fn maxwell_boltzmann_normalized() {
        // Midpoint rule over [0, 12) at T = 0.7
        let t = 0.7;
        let dv = 1e-3;
        let total: f64 = (0..12_000)
            .map(|i| maxwell_boltzmann_2d((i as f64 + 0.5) * dv, t) * dv)
            .sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-6);
        assert_eq!(maxwell_boltzmann_2d(1.0, 0.0), 0.0);
    }

    #[test]
    fn momentum_and_temperature_of_fresh_system() -> Result<()> {
        let sim = HardDisks::new(25, 10.0, 10.0, Placement::Regular, Some(8))?;
        let p = sim.momentum();
        assert!(p[0].abs() < 1e-12 && p[1].abs() < 1e-12);
        assert_relative_eq!(sim.kinetic_temperature(), sim.temperature(), epsilon = 1e-15);
        let tc = sim.temperature_components();
        // Mean KE = (<vx²> + <vy²>) / 2
        assert_relative_eq!(0.5 * (tc[0] + tc[1]), sim.temperature(), epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn mean_free_time_needs_collisions() -> Result<()> {
        let mut sim = HardDisks::new(25, 10.0, 10.0, Placement::Regular, Some(8))?;
        assert!(sim.mean_free_time().is_none());
        sim.run(100)?;
        let tau = sim.mean_free_time().expect("collisions recorded");
        assert_relative_eq!(tau, 25.0 * sim.time() / 200.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn speed_histogram_counts_every_disk() -> Result<()> {
        let sim = HardDisks::new(36, 12.0, 12.0, Placement::Random, Some(21))?;
        let h = sim.speed_histogram(10, None)?;
        assert_eq!(h.edges.len(), 11);
        assert_eq!(h.counts.len(), 10);
        assert_eq!(h.expected.len(), 10);
        assert_eq!(h.counts.iter().sum::<f64>() as usize, 36);
        assert!(h.expected.iter().all(|e| e.is_finite() && *e >= 0.0));

        assert!(sim.speed_histogram(0, None).is_err());
        assert!(sim.speed_histogram(5, Some(-1.0)).is_err());
        Ok(())
    }
}
