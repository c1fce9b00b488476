//! Core simulation types for the event-driven hard-disk engine.

pub mod cell;
pub mod event;
pub mod particle;
pub mod placement;
pub mod schedule;
pub mod sim;

pub use cell::PeriodicCell;
pub use event::Collision;
pub use particle::Disk;
pub use placement::Placement;
pub use schedule::CollisionSchedule;
pub use sim::HardDisks;
