use crate::config::SimConfig;
use crate::core::cell::{dot, PeriodicCell};
use crate::core::event::Collision;
use crate::core::particle::{Disk, DIAMETER, DIM};
use crate::core::placement::{self, Placement, DEFAULT_MAX_ATTEMPTS};
use crate::core::schedule::CollisionSchedule;
use crate::error::{Error, Result};
use log::{debug, info, trace};
use rand::{rng, rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Relative slack on the contact distance when accepting explicit states.
///
/// A pair resolved by `step` sits at contact, where roundoff can leave `d²` a few ulps
/// below one diameter squared.
const CONTACT_TOLERANCE: f64 = 1e-9;

/// Small numeric tolerance for time and geometric checks.
const EPS_TIME: f64 = 1e-12;

/// Statistics accumulated since the last [`HardDisks::reset_averages`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Averages {
    /// Simulated time covered by these statistics.
    pub elapsed: f64,
    /// Sum of impulse · separation over collisions.
    pub virial_sum: f64,
    /// Collisions counted.
    pub collisions: u64,
}

/// Event-driven hard-disk gas in a periodic cell.
///
/// Unit-diameter, unit-mass disks move ballistically between collisions. Each disk keeps
/// a prediction of its next collision; a step jumps straight to the earliest one, resolves
/// it, and re-predicts only for disks affected by the two colliders.
#[derive(Debug, Clone)]
pub struct HardDisks {
    pub(crate) cell: PeriodicCell,
    pub(crate) disks: Vec<Disk>,
    pub(crate) schedule: CollisionSchedule,
    pub(crate) time_now: f64,
    pub(crate) temperature: f64,
    pub(crate) averages: Averages,
    pub(crate) collisions_total: u64,
    pub(crate) seed: Option<u64>,
    max_placement_attempts: usize,
}

impl HardDisks {
    /// Create `num_particles` disks in an `lx` × `ly` periodic cell.
    ///
    /// Errors:
    /// - `Error::InvalidConfig` if the parameters cannot hold non-overlapping disks
    /// - `Error::PlacementExhausted` if random placement runs out of attempts
    pub fn new(
        num_particles: usize,
        lx: f64,
        ly: f64,
        placement: Placement,
        seed: Option<u64>,
    ) -> Result<Self> {
        let mut cfg = SimConfig::new(num_particles, lx, ly, placement);
        cfg.seed = seed;
        Self::from_config(&cfg)
    }

    /// Build and initialize a simulation from a validated configuration.
    pub fn from_config(cfg: &SimConfig) -> Result<Self> {
        cfg.validate()?;
        let mut sim = Self {
            cell: PeriodicCell::new(cfg.lx, cfg.ly)?,
            disks: Vec::with_capacity(cfg.num_particles),
            schedule: CollisionSchedule::new(cfg.num_particles),
            time_now: 0.0,
            temperature: 0.0,
            averages: Averages::default(),
            collisions_total: 0,
            seed: None,
            max_placement_attempts: cfg.max_placement_attempts,
        };
        sim.initialize_n(cfg.num_particles, cfg.placement, cfg.seed)?;
        Ok(sim)
    }

    /// Build a simulation from explicit positions and velocities.
    ///
    /// Positions are wrapped into the cell. The temperature is taken from the supplied
    /// velocities. Velocities are used as given; no drift is removed.
    pub fn from_state(
        lx: f64,
        ly: f64,
        positions: &[[f64; DIM]],
        velocities: &[[f64; DIM]],
    ) -> Result<Self> {
        if positions.is_empty() {
            return Err(Error::InvalidConfig("num_particles must be > 0".into()));
        }
        if positions.len() != velocities.len() {
            return Err(Error::InvalidParam(format!(
                "got {} positions but {} velocities",
                positions.len(),
                velocities.len()
            )));
        }
        let cell = PeriodicCell::new(lx, ly)?;
        let mut sim = Self {
            cell,
            disks: Vec::new(),
            schedule: CollisionSchedule::new(positions.len()),
            time_now: 0.0,
            temperature: 0.0,
            averages: Averages::default(),
            collisions_total: 0,
            seed: None,
            max_placement_attempts: DEFAULT_MAX_ATTEMPTS,
        };
        sim.load_disks(positions, velocities)?;
        sim.temperature = mean_kinetic_energy(&sim.disks);
        sim.rebuild_schedule();
        Ok(sim)
    }

    /// Re-create the configuration from scratch with the same `N` and cell.
    ///
    /// The clock, statistics and schedule are all reset. With the same seed this
    /// reproduces the same configuration.
    pub fn initialize(&mut self, placement: Placement, seed: Option<u64>) -> Result<()> {
        self.initialize_n(self.disks.len(), placement, seed)
    }

    fn initialize_n(&mut self, n: usize, placement: Placement, seed: Option<u64>) -> Result<()> {
        let seed = seed.unwrap_or_else(|| rng().random());
        let mut rng = StdRng::seed_from_u64(seed);

        let positions = match placement {
            Placement::Regular => placement::place_regular(n, &self.cell)?,
            Placement::Random => {
                placement::place_random(n, &self.cell, &mut rng, self.max_placement_attempts)?
            }
        };
        let velocities = placement::sample_velocities(n, &mut rng);

        self.schedule = CollisionSchedule::new(n);
        self.load_disks(&positions, &velocities)?;
        self.temperature = mean_kinetic_energy(&self.disks);
        self.time_now = 0.0;
        self.averages = Averages::default();
        self.collisions_total = 0;
        self.seed = Some(seed);
        self.rebuild_schedule();

        info!(
            "initialized {n} disks ({placement}) in a {} x {} cell, seed {seed}, T = {:.4}",
            self.cell.lx(),
            self.cell.ly(),
            self.temperature
        );
        Ok(())
    }

    fn load_disks(&mut self, positions: &[[f64; DIM]], velocities: &[[f64; DIM]]) -> Result<()> {
        let mut disks = Vec::with_capacity(positions.len());
        for (r, v) in positions.iter().zip(velocities) {
            let d = Disk::new(*r, *v)?;
            disks.push(Disk {
                r: self.cell.wrap_vec(&d.r),
                v: d.v,
            });
        }
        let wrapped: Vec<[f64; DIM]> = disks.iter().map(|d| d.r).collect();
        if let Some((i, j)) = placement::first_overlap(
            &wrapped,
            &self.cell,
            DIAMETER * DIAMETER * (1.0 - CONTACT_TOLERANCE),
        ) {
            return Err(Error::InvalidParam(format!(
                "disks {i} and {j} overlap (closer than one diameter)"
            )));
        }
        self.disks = disks;
        Ok(())
    }

    /// Returns current simulation time.
    pub fn time(&self) -> f64 {
        self.time_now
    }

    /// Number of disks.
    pub fn num_particles(&self) -> usize {
        self.disks.len()
    }

    /// The periodic cell.
    pub fn cell(&self) -> &PeriodicCell {
        &self.cell
    }

    /// Read-only view of the disks.
    pub fn disks(&self) -> &[Disk] {
        &self.disks
    }

    /// Positions as a Vec of fixed-size arrays.
    pub fn positions(&self) -> Vec<[f64; DIM]> {
        self.disks.iter().map(|d| d.r).collect()
    }

    /// Velocities as a Vec of fixed-size arrays.
    pub fn velocities(&self) -> Vec<[f64; DIM]> {
        self.disks.iter().map(|d| d.v).collect()
    }

    /// Temperature fixed at initialization (mean kinetic energy per disk).
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Seed used by the last random initialization, if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Collisions since the simulation was initialized.
    pub fn num_collisions(&self) -> u64 {
        self.collisions_total
    }

    /// Current accumulated statistics.
    pub fn averages(&self) -> Averages {
        self.averages
    }

    /// Schedule view, mostly for diagnostics and tests.
    pub fn schedule(&self) -> &CollisionSchedule {
        &self.schedule
    }

    /// Absolute time of the next scheduled collision, if any.
    pub fn next_collision_time(&self) -> Result<Option<f64>> {
        Ok(self
            .schedule
            .next()?
            .map(|c| self.time_now + c.time_f64().max(0.0)))
    }

    /// Restart pressure statistics without touching the configuration or clock.
    pub fn reset_averages(&mut self) {
        self.averages = Averages::default();
    }

    /// Pressure estimate `PA/NkT` from the virial theorem.
    ///
    /// Returns the ideal-gas value 1.0 until some time has elapsed (or if `T == 0`).
    pub fn pressure(&self) -> f64 {
        let n = self.disks.len() as f64;
        if self.averages.elapsed <= 0.0 || self.temperature <= 0.0 || n == 0.0 {
            return 1.0;
        }
        1.0 + self.averages.virial_sum / (2.0 * self.averages.elapsed * n * self.temperature)
    }

    /// Process exactly one collision and return it, stamped with its absolute time.
    ///
    /// Errors:
    /// - `Error::NoCollision` if nothing is scheduled; the state is left untouched
    /// - `Error::MathError` if the colliding centers coincide
    pub fn step(&mut self) -> Result<Collision> {
        let Some(next) = self.schedule.next()? else {
            return Err(Error::NoCollision);
        };
        let dt = next.time_f64().max(0.0);
        let (c, p) = (next.collider, next.partner);

        self.drift(dt);
        self.contact(c, p)?;

        let orphaned = self.schedule.invalidate(c, p);
        self.repredict(c, p, &orphaned);

        self.averages.collisions += 1;
        self.collisions_total += 1;
        trace!(
            "collision #{} at t = {:.6}: {c} <-> {p}",
            self.collisions_total,
            self.time_now
        );
        Collision::new(self.time_now, c, p)
    }

    /// Process `steps` collisions.
    pub fn run(&mut self, steps: u64) -> Result<()> {
        for _ in 0..steps {
            self.step()?;
        }
        Ok(())
    }

    /// Advance the simulation to `target_time` (must be ≥ current time).
    ///
    /// Every collision up to and including `target_time` is processed, then all disks
    /// drift ballistically to exactly `target_time`.
    pub fn advance_to(&mut self, target_time: f64) -> Result<()> {
        if !target_time.is_finite() {
            return Err(Error::InvalidParam("target_time must be finite".into()));
        }
        if target_time < self.time_now - EPS_TIME {
            return Err(Error::InvalidParam(
                "target_time cannot be earlier than current time".into(),
            ));
        }

        while let Some(next) = self.schedule.next()? {
            if self.time_now + next.time_f64() > target_time {
                break;
            }
            self.step()?;
        }

        if target_time > self.time_now {
            self.drift(target_time - self.time_now);
            self.time_now = target_time;
        }
        Ok(())
    }

    /// Rebuild the collision schedule from the current disk states by checking all pairs.
    pub fn rebuild_schedule(&mut self) {
        let n = self.disks.len();
        self.schedule = CollisionSchedule::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                self.check_collision(i, j);
            }
        }
        debug!("rebuilt collision schedule for {n} disks");
    }

    /// Predict the collision between `i` and `j` and record it for both if it improves
    /// on their current predictions.
    pub fn check_collision(&mut self, i: usize, j: usize) {
        if let Some(t) = self.predict(i, j) {
            self.schedule.offer(i, j, t);
        }
    }

    /// Earliest time until `i` and `j` touch, over the 3 × 3 periodic images of `j`.
    ///
    /// Only approaching images (`b < 0`) with a positive discriminant count. A root that
    /// is negative only through roundoff is reported as 0.
    pub fn predict(&self, i: usize, j: usize) -> Option<f64> {
        let (di, dj) = (&self.disks[i], &self.disks[j]);
        let mut dv = [0.0_f64; DIM];
        for (k, dv_k) in dv.iter_mut().enumerate() {
            *dv_k = di.v[k] - dj.v[k];
        }
        let v2 = dot(&dv, &dv);
        if v2 <= 0.0 {
            return None; // No relative motion
        }

        let mut best = f64::INFINITY;
        for sx in [-1.0, 0.0, 1.0] {
            for sy in [-1.0, 0.0, 1.0] {
                let d = [
                    di.r[0] - dj.r[0] + sx * self.cell.lx(),
                    di.r[1] - dj.r[1] + sy * self.cell.ly(),
                ];
                let b = dot(&d, &dv);
                if b >= 0.0 {
                    continue;
                }
                let r2 = dot(&d, &d);
                let disc = b * b - v2 * (r2 - DIAMETER * DIAMETER);
                if disc <= 0.0 {
                    continue;
                }
                let t = ((-b - disc.sqrt()) / v2).max(0.0);
                if t < best {
                    best = t;
                }
            }
        }
        best.is_finite().then_some(best)
    }

    // ============ Internal helpers ============

    /// Move every disk ballistically by `dt` and age the schedule.
    fn drift(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        for d in &mut self.disks {
            for k in 0..DIM {
                d.r[k] = self.cell.wrap(d.r[k] + d.v[k] * dt, k);
            }
        }
        self.schedule.elapse(dt);
        self.time_now += dt;
        self.averages.elapsed += dt;
    }

    /// Elastic unit-mass contact between `c` and `p`: exchange the normal component of
    /// the relative velocity and accumulate the virial.
    fn contact(&mut self, c: usize, p: usize) -> Result<()> {
        let d = self.cell.separation_vec(&self.disks[c].r, &self.disks[p].r);
        let r2 = dot(&d, &d);
        if r2 <= EPS_TIME {
            return Err(Error::MathError(format!(
                "coincident centers for disks {c} and {p} at contact"
            )));
        }
        let mut dv = [0.0_f64; DIM];
        for (k, dv_k) in dv.iter_mut().enumerate() {
            *dv_k = self.disks[c].v[k] - self.disks[p].v[k];
        }
        let factor = dot(&d, &dv) / r2;

        let mut delv = [0.0_f64; DIM];
        for (k, dl) in delv.iter_mut().enumerate() {
            *dl = -factor * d[k];
            self.disks[c].v[k] += *dl;
            self.disks[p].v[k] -= *dl;
        }
        self.averages.virial_sum += dot(&delv, &d);
        Ok(())
    }

    /// Re-predict after `c` and `p` collided.
    ///
    /// Every other disk is checked against both colliders, the pair is checked against
    /// itself (another periodic image may be next), and disks that lost their prediction
    /// to the collision are checked against everyone.
    fn repredict(&mut self, c: usize, p: usize, orphaned: &[usize]) {
        let n = self.disks.len();
        for k in 0..n {
            if k != c && k != p {
                self.check_collision(k, p);
                self.check_collision(k, c);
            }
        }
        self.check_collision(c, p);
        for &k in orphaned {
            for m in 0..n {
                if m != k && m != c && m != p {
                    self.check_collision(k, m);
                }
            }
        }
    }
}

pub(crate) fn mean_kinetic_energy(disks: &[Disk]) -> f64 {
    if disks.is_empty() {
        return 0.0;
    }
    disks.iter().map(Disk::kinetic_energy).sum::<f64>() / disks.len() as f64
}
