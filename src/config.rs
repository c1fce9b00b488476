//! Simulation configuration with serde loading and validation.
//!
//! Defaults match the original interactive demo: 16 disks on a regular lattice in an
//! 8 × 8 cell, stopping the driver after 5000 collisions.

use crate::core::cell::PeriodicCell;
use crate::core::particle::DIAMETER;
use crate::core::placement::{Placement, DEFAULT_MAX_ATTEMPTS};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::path::Path;

/// Highest area fraction equal disks can reach: π / (2√3), hexagonal close packing.
pub const CLOSE_PACKING_FRACTION: f64 = 0.906_899_682_117_109;

/// Parameters for building a [`crate::HardDisks`] simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    /// Number of disks.
    #[serde(default = "default_num_particles")]
    pub num_particles: usize,

    /// Cell width.
    #[serde(default = "default_edge")]
    pub lx: f64,

    /// Cell height.
    #[serde(default = "default_edge")]
    pub ly: f64,

    /// Initial placement mode.
    #[serde(default)]
    pub placement: Placement,

    /// RNG seed; `None` draws a fresh one.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Random placement attempts allowed per disk.
    #[serde(default = "default_max_attempts")]
    pub max_placement_attempts: usize,

    /// Collision count at which the driver stops.
    #[serde(default = "default_max_collisions")]
    pub max_collisions: u64,
}

fn default_num_particles() -> usize {
    16
}

fn default_edge() -> f64 {
    8.0
}

fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

fn default_max_collisions() -> u64 {
    5000
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_particles: default_num_particles(),
            lx: default_edge(),
            ly: default_edge(),
            placement: Placement::default(),
            seed: None,
            max_placement_attempts: default_max_attempts(),
            max_collisions: default_max_collisions(),
        }
    }
}

impl SimConfig {
    /// Configuration for `num_particles` disks in an `lx` × `ly` cell; other fields default.
    pub fn new(num_particles: usize, lx: f64, ly: f64, placement: Placement) -> Self {
        Self {
            num_particles,
            lx,
            ly,
            placement,
            ..Self::default()
        }
    }

    /// Builder-style seed setter.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fraction of the cell area covered by disks.
    pub fn packing_fraction(&self) -> f64 {
        let disk_area = 0.25 * PI * DIAMETER * DIAMETER;
        self.num_particles as f64 * disk_area / (self.lx * self.ly)
    }

    /// Check that the configuration can describe a non-overlapping system.
    ///
    /// This does not guarantee random placement succeeds; it rejects what can never fit.
    pub fn validate(&self) -> Result<()> {
        if self.num_particles == 0 {
            return Err(Error::InvalidConfig("num_particles must be > 0".into()));
        }
        PeriodicCell::new(self.lx, self.ly)?;
        let phi = self.packing_fraction();
        if phi > CLOSE_PACKING_FRACTION {
            return Err(Error::InvalidConfig(format!(
                "{} disks cover {phi:.3} of a {} x {} cell, above close packing {CLOSE_PACKING_FRACTION:.4}",
                self.num_particles, self.lx, self.ly
            )));
        }
        if self.max_placement_attempts == 0 {
            return Err(Error::InvalidConfig(
                "max_placement_attempts must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load and validate a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_are_valid() -> Result<()> {
        let cfg = SimConfig::default();
        cfg.validate()?;
        assert_eq!(cfg.num_particles, 16);
        assert_eq!(cfg.placement, Placement::Regular);
        assert_eq!(cfg.max_collisions, 5000);
        Ok(())
    }

    #[test]
    fn close_packing_constant() {
        assert_relative_eq!(CLOSE_PACKING_FRACTION, 0.906_899_682, epsilon = 1e-9);
    }

    #[test]
    fn json_fills_defaults() -> Result<()> {
        let cfg = SimConfig::from_json_str(r#"{"num_particles": 50, "lx": 20, "ly": 20, "placement": "random", "seed": 7}"#)?;
        assert_eq!(cfg.num_particles, 50);
        assert_eq!(cfg.placement, Placement::Random);
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.max_placement_attempts, DEFAULT_MAX_ATTEMPTS);
        Ok(())
    }

    #[test]
    fn unknown_fields_rejected() {
        let err = SimConfig::from_json_str(r#"{"num_particles": 4, "radius": 0.5}"#).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn invalid_configs_fail_fast() {
        let zero = SimConfig::new(0, 10.0, 10.0, Placement::Regular);
        assert!(matches!(zero.validate(), Err(Error::InvalidConfig(_))));

        // Edge checks report exactly what the cell itself reports.
        let tiny = SimConfig::new(2, 1.0, 10.0, Placement::Regular);
        let cell_err = PeriodicCell::new(1.0, 10.0).unwrap_err().to_string();
        assert_eq!(tiny.validate().unwrap_err().to_string(), cell_err);
        let unbounded = SimConfig::new(2, 10.0, f64::INFINITY, Placement::Regular);
        assert!(matches!(unbounded.validate(), Err(Error::InvalidConfig(_))));

        // 200 unit disks need ~157 area units; 12 x 12 = 144 cannot hold them.
        let crowded = SimConfig::new(200, 12.0, 12.0, Placement::Random);
        let msg = crowded.validate().unwrap_err().to_string();
        assert!(msg.contains("close packing"));

        let mut capless = SimConfig::default();
        capless.max_placement_attempts = 0;
        assert!(capless.validate().is_err());
    }
}
