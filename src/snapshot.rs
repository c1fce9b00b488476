use crate::core::particle::DIM;
use crate::core::sim::{Averages, HardDisks};
use crate::error::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Full simulation state at one instant, serializable for saving and restoring.
///
/// The collision schedule is not stored; it is rebuilt from positions and velocities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Cell width.
    pub lx: f64,
    /// Cell height.
    pub ly: f64,
    /// Simulation clock.
    pub time: f64,
    /// Temperature fixed at initialization, used by the pressure estimate.
    pub temperature: f64,
    /// Pressure statistics since the last reset.
    pub averages: Averages,
    /// Collisions since initialization.
    pub collisions_total: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub seed: Option<u64>,
    pub positions: Vec<[f64; DIM]>,
    pub velocities: Vec<[f64; DIM]>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Write the snapshot as JSON to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(writer, self)?;
        debug!("saved snapshot at t = {} to {}", self.time, path.as_ref().display());
        Ok(())
    }

    /// Read a JSON snapshot from `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl HardDisks {
    /// Capture the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            lx: self.cell.lx(),
            ly: self.cell.ly(),
            time: self.time_now,
            temperature: self.temperature,
            averages: self.averages,
            collisions_total: self.collisions_total,
            seed: self.seed,
            positions: self.positions(),
            velocities: self.velocities(),
        }
    }

    /// Rebuild a simulation from a snapshot, including clock and statistics.
    pub fn restore(snapshot: &Snapshot) -> Result<Self> {
        if !snapshot.time.is_finite() || snapshot.time < 0.0 {
            return Err(Error::InvalidParam(
                "snapshot time must be finite and >= 0".into(),
            ));
        }
        let mut sim = Self::from_state(
            snapshot.lx,
            snapshot.ly,
            &snapshot.positions,
            &snapshot.velocities,
        )?;
        sim.time_now = snapshot.time;
        sim.temperature = snapshot.temperature;
        sim.averages = snapshot.averages;
        sim.collisions_total = snapshot.collisions_total;
        sim.seed = snapshot.seed;
        Ok(sim)
    }
}
