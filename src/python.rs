//! Python bindings: a thin wrapper for a rendering/UI layer.

use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::core::particle::DIM;
use crate::core::{HardDisks, Placement};
use crate::snapshot::Snapshot;

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn to_array(rows: &[[f64; DIM]]) -> Array2<f64> {
    let mut arr = Array2::<f64>::zeros((rows.len(), DIM));
    for (i, row) in rows.iter().enumerate() {
        for k in 0..DIM {
            arr[[i, k]] = row[k];
        }
    }
    arr
}

fn from_array(arr: &PyReadonlyArray2<'_, f64>, what: &str) -> PyResult<Vec<[f64; DIM]>> {
    let view = arr.as_array();
    if view.shape()[1] != DIM {
        return Err(py_err(format!(
            "{what} must have shape (N, {DIM}), got {:?}",
            view.shape()
        )));
    }
    Ok(view.rows().into_iter().map(|r| [r[0], r[1]]).collect())
}

/// Python-facing wrapper around [`HardDisks`].
///
/// API:
/// - __new__(num_particles, lx, ly, placement="regular", seed=None)
/// - step() -> (time, collider, partner)
/// - run(steps), advance_to(time)
/// - pressure(), get_positions(), get_velocities() -> np.ndarray of shape (N, 2)
#[pyclass(name = "HardDisks")]
pub struct PyHardDisks {
    sim: HardDisks,
}

#[pymethods]
impl PyHardDisks {
    /// Initialize hard disks in a periodic `lx` × `ly` cell.
    ///
    /// Errors: raises ValueError on invalid parameters or when random placement fails.
    #[new]
    #[pyo3(signature = (num_particles, lx, ly, placement="regular", seed=None))]
    fn new(
        num_particles: usize,
        lx: f64,
        ly: f64,
        placement: &str,
        seed: Option<u64>,
    ) -> PyResult<Self> {
        let placement: Placement = placement.parse().map_err(py_err)?;
        let sim = HardDisks::new(num_particles, lx, ly, placement, seed).map_err(py_err)?;
        Ok(Self { sim })
    }

    /// Build from explicit (N, 2) position and velocity arrays.
    #[staticmethod]
    fn from_state(
        lx: f64,
        ly: f64,
        positions: PyReadonlyArray2<'_, f64>,
        velocities: PyReadonlyArray2<'_, f64>,
    ) -> PyResult<Self> {
        let r = from_array(&positions, "positions")?;
        let v = from_array(&velocities, "velocities")?;
        let sim = HardDisks::from_state(lx, ly, &r, &v).map_err(py_err)?;
        Ok(Self { sim })
    }

    /// Re-initialize with the same N and cell.
    #[pyo3(signature = (placement="regular", seed=None))]
    fn initialize(&mut self, placement: &str, seed: Option<u64>) -> PyResult<()> {
        let placement: Placement = placement.parse().map_err(py_err)?;
        self.sim.initialize(placement, seed).map_err(py_err)
    }

    /// Process one collision; returns (time, collider, partner).
    fn step(&mut self) -> PyResult<(f64, usize, usize)> {
        let c = self.sim.step().map_err(py_err)?;
        Ok((c.time_f64(), c.collider, c.partner))
    }

    /// Process `steps` collisions (releases the GIL during computation).
    fn run(&mut self, py: Python<'_>, steps: u64) -> PyResult<()> {
        py.detach(|| self.sim.run(steps)).map_err(py_err)
    }

    /// Advance to the absolute time `target_time` (releases the GIL during computation).
    fn advance_to(&mut self, py: Python<'_>, target_time: f64) -> PyResult<()> {
        py.detach(|| self.sim.advance_to(target_time))
            .map_err(py_err)
    }

    fn pressure(&self) -> f64 {
        self.sim.pressure()
    }

    fn reset_averages(&mut self) {
        self.sim.reset_averages();
    }

    #[getter]
    fn time(&self) -> f64 {
        self.sim.time()
    }

    #[getter]
    fn collisions(&self) -> u64 {
        self.sim.num_collisions()
    }

    #[getter]
    fn temperature(&self) -> f64 {
        self.sim.temperature()
    }

    #[getter]
    fn num_particles(&self) -> usize {
        self.sim.num_particles()
    }

    fn kinetic_energy(&self) -> f64 {
        self.sim.kinetic_energy()
    }

    /// Positions as a NumPy array of shape (N, 2), dtype=float64.
    fn get_positions<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        to_array(&self.sim.positions()).into_pyarray(py)
    }

    /// Velocities as a NumPy array of shape (N, 2), dtype=float64.
    fn get_velocities<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        to_array(&self.sim.velocities()).into_pyarray(py)
    }

    /// Speed histogram: dict with "edges", "counts" and "expected" arrays.
    #[pyo3(signature = (bins=40, max_speed=None))]
    fn speed_histogram<'py>(
        &self,
        py: Python<'py>,
        bins: usize,
        max_speed: Option<f64>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let h = self.sim.speed_histogram(bins, max_speed).map_err(py_err)?;
        let out = PyDict::new(py);
        out.set_item("edges", PyArray1::from_vec(py, h.edges))?;
        out.set_item("counts", PyArray1::from_vec(py, h.counts))?;
        out.set_item("expected", PyArray1::from_vec(py, h.expected))?;
        Ok(out)
    }

    /// Write the current state as a JSON snapshot.
    fn save_snapshot(&self, path: &str) -> PyResult<()> {
        self.sim.snapshot().save(path).map_err(py_err)
    }

    /// Restore from a JSON snapshot written by `save_snapshot`.
    #[staticmethod]
    fn load_snapshot(path: &str) -> PyResult<Self> {
        let snap = Snapshot::load(path).map_err(py_err)?;
        let sim = HardDisks::restore(&snap).map_err(py_err)?;
        Ok(Self { sim })
    }
}

/// The hdsim Python module entry point.
#[pymodule]
fn hdsim(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyHardDisks>()?;
    Ok(())
}
