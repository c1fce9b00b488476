//! Event-driven simulation of a hard-disk gas in a periodic cell.
//!
//! Disks of unit diameter and unit mass move ballistically between elastic collisions.
//! Rather than stepping a fixed `dt`, the engine predicts every disk's next collision and
//! jumps straight to the earliest one, re-predicting only for disks the collision touched.
//! The pressure follows from the virial theorem.
//!
//! ```no_run
//! use hdsim::{HardDisks, Placement};
//!
//! # fn main() -> hdsim::Result<()> {
//! let mut sim = HardDisks::new(50, 20.0, 20.0, Placement::Random, Some(7))?;
//! sim.run(1_000)?;
//! println!("t = {:.3}, PA/NkT = {:.4}", sim.time(), sim.pressure());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod diagnostics;
pub mod error;
pub mod snapshot;

#[cfg(feature = "python")]
mod python;

pub use crate::config::SimConfig;
pub use crate::core::{Collision, HardDisks, PeriodicCell, Placement};
pub use crate::error::{Error, Result};
pub use crate::snapshot::Snapshot;
