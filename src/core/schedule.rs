use crate::core::event::Collision;
use crate::error::Result;

/// Sentinel for "no collision predicted".
pub const NEVER: f64 = f64::INFINITY;

/// Per-disk collision predictions.
///
/// `time[i]` is the time remaining until disk `i`'s earliest predicted collision and
/// `partner[i]` the disk it collides with. Updates are min-reductions: a prediction is
/// only replaced by a strictly earlier one, except through explicit invalidation.
#[derive(Debug, Clone)]
pub struct CollisionSchedule {
    time: Vec<f64>,
    partner: Vec<Option<usize>>,
}

impl CollisionSchedule {
    /// Empty schedule for `n` disks.
    pub fn new(n: usize) -> Self {
        Self {
            time: vec![NEVER; n],
            partner: vec![None; n],
        }
    }

    /// Time remaining until disk `i`'s predicted collision (`NEVER` if none).
    #[inline]
    pub fn time(&self, i: usize) -> f64 {
        self.time[i]
    }

    /// Disk `i`'s scheduled partner, if any prediction is active.
    #[inline]
    pub fn partner(&self, i: usize) -> Option<usize> {
        self.partner[i]
    }

    /// Offer a candidate collision between `i` and `j` after `t`.
    ///
    /// Each side adopts it only if it is strictly earlier than what it already holds.
    #[inline]
    pub fn offer(&mut self, i: usize, j: usize, t: f64) {
        if !t.is_finite() {
            return;
        }
        if t < self.time[i] {
            self.time[i] = t;
            self.partner[i] = Some(j);
        }
        if t < self.time[j] {
            self.time[j] = t;
            self.partner[j] = Some(i);
        }
    }

    /// Earliest scheduled collision; ties go to the lowest disk index.
    pub fn next(&self) -> Result<Option<Collision>> {
        let mut best: Option<Collision> = None;
        for (k, (&t, &partner)) in self.time.iter().zip(&self.partner).enumerate() {
            let Some(p) = partner else { continue };
            if !t.is_finite() {
                continue;
            }
            let candidate = Collision::new(t, k, p)?;
            match best {
                Some(b) if b <= candidate => {}
                _ => best = Some(candidate),
            }
        }
        Ok(best)
    }

    /// Let `dt` pass: every remaining time shrinks by `dt`.
    pub fn elapse(&mut self, dt: f64) {
        for t in &mut self.time {
            *t -= dt;
        }
    }

    /// Drop every prediction that involves `a` or `b`, including their own.
    ///
    /// Returns the other disks whose prediction was dropped.
    pub fn invalidate(&mut self, a: usize, b: usize) -> Vec<usize> {
        let mut orphaned = Vec::new();
        for k in 0..self.time.len() {
            let hit = k == a || k == b || matches!(self.partner[k], Some(p) if p == a || p == b);
            if !hit {
                continue;
            }
            if k != a && k != b && self.time[k].is_finite() {
                orphaned.push(k);
            }
            self.time[k] = NEVER;
            self.partner[k] = None;
        }
        orphaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_is_min_reduction() {
        let mut s = CollisionSchedule::new(3);
        s.offer(0, 1, 2.0);
        assert_eq!(s.time(0), 2.0);
        assert_eq!(s.partner(1), Some(0));

        // A later candidate never overwrites an earlier one.
        s.offer(0, 2, 3.0);
        assert_eq!(s.time(0), 2.0);
        assert_eq!(s.partner(0), Some(1));
        assert_eq!(s.time(2), 3.0);

        // An earlier one does.
        s.offer(2, 0, 1.0);
        assert_eq!(s.time(0), 1.0);
        assert_eq!(s.partner(0), Some(2));
        assert_eq!(s.partner(1), Some(0));
    }

    #[test]
    fn next_picks_earliest_lowest_index() -> Result<()> {
        let mut s = CollisionSchedule::new(4);
        assert!(s.next()?.is_none());
        s.offer(2, 3, 0.75);
        s.offer(0, 1, 0.75);
        let c = s.next()?.expect("scheduled");
        assert_eq!(c.collider, 0);
        assert_eq!(c.partner, 1);
        assert_eq!(c.time_f64(), 0.75);
        Ok(())
    }

    #[test]
    fn elapse_shifts_times_and_keeps_never() {
        let mut s = CollisionSchedule::new(3);
        s.offer(0, 1, 2.0);
        s.elapse(0.5);
        assert_eq!(s.time(0), 1.5);
        assert_eq!(s.time(2), NEVER);
    }

    #[test]
    fn invalidate_reports_third_parties() {
        let mut s = CollisionSchedule::new(5);
        s.offer(0, 1, 1.0);
        s.offer(2, 0, 2.0); // 2 -> 0, 0 keeps 1
        s.offer(3, 4, 0.5);
        let orphaned = s.invalidate(0, 1);
        assert_eq!(orphaned, vec![2]);
        assert_eq!(s.time(0), NEVER);
        assert_eq!(s.time(1), NEVER);
        assert_eq!(s.time(2), NEVER);
        assert_eq!(s.time(3), 0.5);
        assert_eq!(s.partner(4), Some(3));
    }
}
