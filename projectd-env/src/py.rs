//! Backend over the `PyProjectD` extension module.
//!
//! The simulator and its viewer ship as a Python extension module. This
//! backend drives it through an embedded interpreter: the module is imported
//! on first use, with `<asset_root>/bin` prepended to `sys.path` so the binary
//! next to the assets is picked up.
//!
//! State is read from the `CarState` binding used by the Python environment,
//! which exposes the track-relative fields (`lookAhead`, `bodyVsTrack`,
//! `stepReward`, ...) next to the physics ones. The drift reward lives in the
//! car's scoring system and is only available when the binding mirrors it as
//! `CarState.agentDriftReward`. Without it, `drift_reward` reads as NaN, so a
//! profile rewarding drift fails with [`EnvError::NonFiniteState`] on the first
//! step while other profiles are unaffected.
//!
//! [`EnvError::NonFiniteState`]: crate::error::EnvError::NonFiniteState
use crate::{
    car::{CarControls, CarState, Vec3, LOOK_AHEAD_COUNT, PROBE_COUNT, TYRE_COUNT},
    error::{AssetKind, SimError},
    sim::{Assists, CarId, SimBackend, SimId, TeleportMode},
    viewer::ViewerBackend,
};
use log::{debug, info};
use pyo3::{exceptions::PyRuntimeError, prelude::*, types::PyModule};
use std::path::Path;

const MODULE: &str = "PyProjectD";

fn backend_err(e: PyErr) -> SimError {
    SimError::Backend(format!("{:?}", e))
}

fn viewer_err(e: PyErr) -> SimError {
    SimError::Viewer(format!("{:?}", e))
}

fn with_module<T>(f: impl FnOnce(Python, &PyModule) -> PyResult<T>) -> PyResult<T> {
    Python::with_gil(|py| {
        let pd = py.import(MODULE)?;
        f(py, pd)
    })
}

fn add_bin_dir(py: Python, asset_root: &Path) -> PyResult<()> {
    let bin = asset_root.join("bin");
    if bin.is_dir() {
        let bin = bin.to_string_lossy().into_owned();
        debug!("prepending {} to sys.path", bin);
        py.import("sys")?
            .getattr("path")?
            .call_method1("insert", (0, bin))?;
    }
    Ok(())
}

/// Returns the buffer object in `slot`, creating an instance of `class` on first use.
fn buffer<'py>(
    slot: &mut Option<PyObject>,
    py: Python<'py>,
    pd: &'py PyModule,
    class: &str,
) -> PyResult<&'py PyAny> {
    if slot.is_none() {
        *slot = Some(pd.getattr(class)?.call0()?.into());
    }
    match slot {
        Some(obj) => Ok(obj.clone_ref(py).into_ref(py)),
        None => Err(PyRuntimeError::new_err(format!("no {} buffer", class))),
    }
}

fn read_vec3(v: &PyAny) -> PyResult<Vec3> {
    Ok(Vec3::new(
        v.getattr("x")?.extract()?,
        v.getattr("y")?.extract()?,
        v.getattr("z")?.extract()?,
    ))
}

fn read_into(state: &PyAny, name: &str, out: &mut [f32]) -> PyResult<()> {
    let values: Vec<f32> = state.getattr(name)?.extract()?;
    if values.len() < out.len() {
        return Err(PyRuntimeError::new_err(format!(
            "{} has {} elements, expected {}",
            name,
            values.len(),
            out.len()
        )));
    }
    out.copy_from_slice(&values[..out.len()]);
    Ok(())
}

fn read_state(state: &PyAny, out: &mut CarState) -> PyResult<()> {
    out.engine_rpm = state.getattr("engineRPM")?.extract()?;
    out.speed_ms = state.getattr("speedMS")?.extract()?;
    out.gear = state.getattr("gear")?.extract()?;
    out.velocity = read_vec3(state.getattr("localVelocity")?)?;
    out.angular_velocity = read_vec3(state.getattr("localAngularVelocity")?)?;
    read_into(state, "tyreNdSlip", &mut out.tyre_slip[..TYRE_COUNT])?;
    read_into(state, "probes", &mut out.probes[..PROBE_COUNT])?;
    read_into(state, "lookAhead", &mut out.look_ahead[..LOOK_AHEAD_COUNT])?;
    out.body_vs_track = state.getattr("bodyVsTrack")?.extract()?;
    out.velocity_vs_track = state.getattr("velocityVsTrack")?.extract()?;
    out.collision_flag = state.getattr("collisionFlag")?.extract()?;
    out.out_of_track_flag = state.getattr("outOfTrackFlag")?.extract()?;
    out.nearest_track_point_id = state.getattr("nearestTrackPointId")?.extract()?;
    out.last_track_point_timestamp = state.getattr("lastTrackPointTimestamp")?.extract()?;
    out.timestamp = state.getattr("timestamp")?.extract()?;
    out.step_reward = state.getattr("stepReward")?.extract()?;
    out.drift_reward = if state.hasattr("agentDriftReward")? {
        state.getattr("agentDriftReward")?.extract()?
    } else {
        f32::NAN
    };
    Ok(())
}

fn write_controls(obj: &PyAny, c: &CarControls) -> PyResult<()> {
    obj.setattr("steer", c.steer)?;
    obj.setattr("gas", c.gas)?;
    obj.setattr("brake", c.brake)?;
    obj.setattr("handBrake", c.hand_brake)?;
    obj.setattr("clutch", c.clutch)?;
    // -1 leaves the gearbox alone
    obj.setattr("requestedGearIndex", c.requested_gear.map_or(-1, i32::from))?;
    Ok(())
}

/// The `PyProjectD` simulator and viewer.
///
/// The viewer functions of the module act on a process-wide playground, so
/// any instance can serve as [`ViewerBackend`]. State and control buffers are
/// allocated once per instance and reused on every tick.
#[derive(Default)]
pub struct PyProjectD {
    state: Option<PyObject>,
    controls: Option<PyObject>,
}

impl PyProjectD {
    /// Creates the backend. The module is imported on first use.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SimBackend for PyProjectD {
    fn create(&mut self, asset_root: &Path) -> Result<SimId, SimError> {
        let root = asset_root.to_string_lossy().into_owned();
        let id: i32 = Python::with_gil(|py| {
            add_bin_dir(py, asset_root)?;
            let pd = py.import(MODULE)?;
            pd.getattr("createSimulator")?.call1((root.as_str(),))?.extract()
        })
        .map_err(|e| SimError::Initialization(format!("{:?}", e)))?;

        if id < 0 {
            return Err(SimError::Initialization(format!(
                "createSimulator failed for {}",
                root
            )));
        }
        info!("PyProjectD simulator {} created", id);
        Ok(SimId(id))
    }

    fn load_track(&mut self, sim: SimId, name: &str) -> Result<(), SimError> {
        with_module(|_, pd| {
            pd.getattr("loadTrack")?.call1((sim.0, name))?;
            Ok(())
        })
        .map_err(|e| {
            debug!("loadTrack failed: {:?}", e);
            SimError::AssetNotFound {
                kind: AssetKind::Track,
                name: name.to_string(),
            }
        })
    }

    fn add_car(&mut self, sim: SimId, model: &str) -> Result<CarId, SimError> {
        let id: i32 = with_module(|_, pd| pd.getattr("addCar")?.call1((sim.0, model))?.extract())
            .map_err(backend_err)?;
        if id < 0 {
            return Err(SimError::AssetNotFound {
                kind: AssetKind::Car,
                name: model.to_string(),
            });
        }
        Ok(CarId(id))
    }

    fn set_tune(
        &mut self,
        sim: SimId,
        car: CarId,
        name: &str,
        value: f32,
    ) -> Result<(), SimError> {
        with_module(|_, pd| {
            pd.getattr("setCarTune")?.call1((sim.0, car.0, name, value))?;
            Ok(())
        })
        .map_err(backend_err)
    }

    fn set_scoring_var(
        &mut self,
        sim: SimId,
        car: CarId,
        name: &str,
        value: f32,
    ) -> Result<(), SimError> {
        with_module(|_, pd| {
            pd.getattr("setScoringVar")?.call1((sim.0, car.0, name, value))?;
            Ok(())
        })
        .map_err(backend_err)
    }

    fn teleport(
        &mut self,
        sim: SimId,
        car: CarId,
        mode: TeleportMode,
        offset: Option<f32>,
    ) -> Result<(), SimError> {
        with_module(|_, pd| {
            match offset {
                Some(offset) => pd
                    .getattr("teleportCarToSpline")?
                    .call1((sim.0, car.0, offset))?,
                None => pd
                    .getattr("teleportCarByMode")?
                    .call1((sim.0, car.0, mode.index()))?,
            };
            Ok(())
        })
        .map_err(backend_err)
    }

    fn set_auto_teleport(
        &mut self,
        sim: SimId,
        car: CarId,
        on_hit: bool,
        off_track: bool,
        mode: TeleportMode,
    ) -> Result<(), SimError> {
        with_module(|_, pd| {
            pd.getattr("setCarAutoTeleport")?
                .call1((sim.0, car.0, on_hit, off_track, mode.index()))?;
            Ok(())
        })
        .map_err(backend_err)
    }

    fn set_assists(&mut self, sim: SimId, car: CarId, assists: Assists) -> Result<(), SimError> {
        with_module(|_, pd| {
            pd.getattr("setCarAssists")?.call1((
                sim.0,
                car.0,
                assists.auto_clutch,
                assists.auto_shift,
                assists.auto_blip,
            ))?;
            Ok(())
        })
        .map_err(backend_err)
    }

    fn set_controls(
        &mut self,
        sim: SimId,
        car: CarId,
        smooth: bool,
        controls: &CarControls,
    ) -> Result<(), SimError> {
        let slot = &mut self.controls;
        with_module(|py, pd| {
            let obj = buffer(slot, py, pd, "CarControls")?;
            write_controls(obj, controls)?;
            pd.getattr("setCarControls")?
                .call1((sim.0, car.0, smooth, obj))?;
            Ok(())
        })
        .map_err(backend_err)
    }

    fn step(&mut self, sim: SimId, dt: f64) -> Result<(), SimError> {
        with_module(|_, pd| {
            pd.getattr("stepSimulator")?.call1((sim.0, dt))?;
            Ok(())
        })
        .map_err(backend_err)
    }

    fn get_state(&mut self, sim: SimId, car: CarId, out: &mut CarState) -> Result<(), SimError> {
        let slot = &mut self.state;
        with_module(|py, pd| {
            let obj = buffer(slot, py, pd, "CarState")?;
            pd.getattr("getCarState")?.call1((sim.0, car.0, obj))?;
            read_state(obj, out)
        })
        .map_err(|e| SimError::StateRead(format!("{:?}", e)))
    }

    fn destroy(&mut self, sim: SimId) -> Result<(), SimError> {
        with_module(|_, pd| {
            pd.getattr("destroySimulator")?.call1((sim.0,))?;
            Ok(())
        })
        .map_err(backend_err)
    }
}

impl ViewerBackend for PyProjectD {
    fn init(&mut self, asset_root: &Path) -> Result<(), SimError> {
        let root = asset_root.to_string_lossy().into_owned();
        Python::with_gil(|py| {
            add_bin_dir(py, asset_root)?;
            py.import(MODULE)?
                .getattr("initPlayground")?
                .call1((root.as_str(),))?;
            Ok(())
        })
        .map_err(viewer_err)
    }

    fn set_render_hz(&mut self, hz: u32, owns_loop: bool) -> Result<(), SimError> {
        with_module(|_, pd| {
            pd.getattr("setRenderHz")?.call1((hz, owns_loop))?;
            Ok(())
        })
        .map_err(viewer_err)
    }

    fn set_active_simulator(&mut self, sim: SimId, owns_loop: bool) -> Result<(), SimError> {
        with_module(|_, pd| {
            pd.getattr("setActiveSimulator")?.call1((sim.0, owns_loop))?;
            Ok(())
        })
        .map_err(viewer_err)
    }

    fn set_active_car(
        &mut self,
        car: CarId,
        take_controls: bool,
        enable_sound: bool,
    ) -> Result<(), SimError> {
        with_module(|_, pd| {
            pd.getattr("setActiveCar")?
                .call1((car.0, take_controls, enable_sound))?;
            Ok(())
        })
        .map_err(viewer_err)
    }

    fn tick(&mut self) -> Result<(), SimError> {
        with_module(|_, pd| {
            pd.getattr("tickPlayground")?.call0()?;
            Ok(())
        })
        .map_err(viewer_err)
    }

    fn is_exited(&self) -> bool {
        // an unreachable viewer counts as closed
        with_module(|_, pd| pd.getattr("isPlaygroundExited")?.call0()?.extract())
            .unwrap_or(true)
    }

    fn shut(&mut self) -> Result<(), SimError> {
        with_module(|_, pd| {
            pd.getattr("shutPlayground")?.call0()?;
            Ok(())
        })
        .map_err(viewer_err)
    }
}
