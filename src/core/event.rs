use crate::error::{Error, Result};
use ordered_float::NotNan;
use std::cmp::Ordering;

/// A disk-disk collision: either the next one scheduled or one just realised by a step.
///
/// - `time`: time of the collision (relative when scheduled, absolute once realised).
/// - `collider`, `partner`: the participating disk indices.
///
/// Ordering is by time, then by collider and partner index, so ties resolve
/// deterministically toward the lowest index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collision {
    pub time: NotNan<f64>,
    pub collider: usize,
    pub partner: usize,
}

impl Collision {
    /// Create a new collision record, rejecting NaN times.
    pub fn new(time: f64, collider: usize, partner: usize) -> Result<Self> {
        let time = NotNan::new(time)
            .map_err(|_| Error::InvalidParam("collision time cannot be NaN".into()))?;
        Ok(Self {
            time,
            collider,
            partner,
        })
    }

    /// Returns the raw f64 collision time.
    #[inline]
    pub fn time_f64(&self) -> f64 {
        self.time.into_inner()
    }
}

impl Ord for Collision {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .cmp(&other.time)
            .then_with(|| self.collider.cmp(&other.collider))
            .then_with(|| self.partner.cmp(&other.partner))
    }
}

impl PartialOrd for Collision {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_collision_rejects_nan_time() {
        let err = Collision::new(f64::NAN, 1, 2).unwrap_err();
        assert!(err.to_string().contains("NaN"));
    }

    #[test]
    fn ordering_by_time() -> Result<()> {
        let c1 = Collision::new(1.0, 5, 6)?;
        let c2 = Collision::new(2.0, 0, 1)?;
        assert!(c1 < c2);
        Ok(())
    }

    #[test]
    fn tie_breaker_prefers_lower_index() -> Result<()> {
        let a = Collision::new(0.5, 2, 9)?;
        let b = Collision::new(0.5, 3, 1)?;
        assert!(a < b);
        let c = Collision::new(0.5, 2, 4)?;
        assert!(c < a);
        Ok(())
    }
}
