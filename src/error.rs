use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the hard-disk simulation.
///
/// Every failure is local to one simulation object; nothing is retried.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration that cannot describe a valid non-overlapping system.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Random placement gave up on a particle after the attempt cap.
    #[error(
        "placement density too high: particle {index} found no free spot after {attempts} attempts"
    )]
    PlacementExhausted { index: usize, attempts: usize },

    /// Invalid argument to an operation on an existing simulation.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Numerical or geometric issue (e.g., coincident centers at contact).
    #[error("numerical error: {0}")]
    MathError(String),

    /// No collision is scheduled, so there is no event to process.
    #[error("no collision scheduled")]
    NoCollision,

    /// Snapshot or configuration (de)serialization failure.
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Propagated I/O errors from snapshot and config files.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
