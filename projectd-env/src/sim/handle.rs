use super::{Assists, CarId, SimBackend, SimId, TeleportMode};
use crate::{
    car::{CarControls, CarState},
    error::SimError,
    profile::{ScoringVar, TuneParam},
};
use log::{info, trace, warn};
use std::path::Path;

/// A car added to a [`SimulationHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarHandle(CarId);

impl CarHandle {
    /// Identifier of the car in the backend.
    pub fn id(&self) -> CarId {
        self.0
    }
}

/// Owns one simulator instance of a backend.
///
/// The instance is created in [`SimulationHandle::create`] and released
/// either by [`SimulationHandle::destroy`] or when the handle is dropped.
/// Every call after `destroy` returns [`SimError::InvalidHandle`].
pub struct SimulationHandle<B: SimBackend> {
    backend: B,
    id: Option<SimId>,
}

impl<B: SimBackend> SimulationHandle<B> {
    /// Creates a simulator instance on `backend`.
    ///
    /// Fails with [`SimError::Initialization`] if the assets under `asset_root` are incomplete.
    pub fn create(mut backend: B, asset_root: &Path) -> Result<Self, SimError> {
        let id = backend.create(asset_root)?;
        info!("created simulator {:?} from {}", id, asset_root.display());
        Ok(Self {
            backend,
            id: Some(id),
        })
    }

    fn live(&self) -> Result<SimId, SimError> {
        self.id.ok_or(SimError::InvalidHandle)
    }

    /// Identifier of the instance, `None` once destroyed.
    pub fn id(&self) -> Option<SimId> {
        self.id
    }

    /// Returns `true` until the instance is destroyed.
    pub fn is_live(&self) -> bool {
        self.id.is_some()
    }

    /// Loads a track, failing with [`SimError::AssetNotFound`] on unknown names.
    pub fn load_track(&mut self, name: &str) -> Result<(), SimError> {
        let sim = self.live()?;
        self.backend.load_track(sim, name)?;
        info!("loaded track {}", name);
        Ok(())
    }

    /// Adds a car, failing with [`SimError::AssetNotFound`] on unknown models.
    pub fn add_car(&mut self, model: &str) -> Result<CarHandle, SimError> {
        let sim = self.live()?;
        let car = self.backend.add_car(sim, model)?;
        info!("added car {} as {:?}", model, car);
        Ok(CarHandle(car))
    }

    /// Sets a setup value of the car.
    pub fn set_tune(
        &mut self,
        car: CarHandle,
        param: TuneParam,
        value: f32,
    ) -> Result<(), SimError> {
        let sim = self.live()?;
        self.backend.set_tune(sim, car.0, param.name(), value)
    }

    /// Sets a weight of the car's scoring system.
    pub fn set_scoring_var(
        &mut self,
        car: CarHandle,
        var: ScoringVar,
        value: f32,
    ) -> Result<(), SimError> {
        let sim = self.live()?;
        self.backend.set_scoring_var(sim, car.0, var.name(), value)
    }

    /// Places the car by `mode`, or at a normalized spline offset when given.
    pub fn teleport(
        &mut self,
        car: CarHandle,
        mode: TeleportMode,
        offset: Option<f32>,
    ) -> Result<(), SimError> {
        let sim = self.live()?;
        trace!("teleport {:?} {:?} {:?}", car, mode, offset);
        self.backend.teleport(sim, car.0, mode, offset)
    }

    /// Configures automatic repositioning inside the simulator.
    pub fn set_auto_teleport(
        &mut self,
        car: CarHandle,
        on_hit: bool,
        off_track: bool,
        mode: TeleportMode,
    ) -> Result<(), SimError> {
        let sim = self.live()?;
        self.backend
            .set_auto_teleport(sim, car.0, on_hit, off_track, mode)
    }

    /// Configures driving assists.
    pub fn set_assists(&mut self, car: CarHandle, assists: Assists) -> Result<(), SimError> {
        let sim = self.live()?;
        self.backend.set_assists(sim, car.0, assists)
    }

    /// Pushes driver inputs.
    pub fn set_controls(
        &mut self,
        car: CarHandle,
        smooth: bool,
        controls: &CarControls,
    ) -> Result<(), SimError> {
        let sim = self.live()?;
        self.backend.set_controls(sim, car.0, smooth, controls)
    }

    /// Advances physics by exactly `dt` seconds.
    pub fn step(&mut self, dt: f64) -> Result<(), SimError> {
        let sim = self.live()?;
        self.backend.step(sim, dt)
    }

    /// Fills the caller-owned `out` with the current state of `car`.
    pub fn get_state(&mut self, car: CarHandle, out: &mut CarState) -> Result<(), SimError> {
        let sim = self.live()?;
        self.backend.get_state(sim, car.0, out)
    }

    /// Releases the simulator instance.
    ///
    /// Fails with [`SimError::InvalidHandle`] if it was released already.
    pub fn destroy(&mut self) -> Result<(), SimError> {
        let sim = self.id.take().ok_or(SimError::InvalidHandle)?;
        info!("destroying simulator {:?}", sim);
        self.backend.destroy(sim)
    }
}

impl<B: SimBackend> Drop for SimulationHandle<B> {
    fn drop(&mut self) {
        if let Some(sim) = self.id.take() {
            if let Err(e) = self.backend.destroy(sim) {
                warn!("failed to destroy simulator {:?}: {}", sim, e);
            }
        }
    }
}
