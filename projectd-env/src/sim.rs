//! Simulator collaborator and the handle owning one simulator instance.
//!
//! The physics, asset loading and scoring live in a native simulator. This
//! module describes what the environment needs from it ([`SimBackend`]) and
//! wraps one instance in a [`SimulationHandle`] that enforces the lifecycle:
//! exactly one `create`, then configuration and stepping, then `destroy`,
//! after which every call fails with [`SimError::InvalidHandle`].
mod handle;
pub use handle::{CarHandle, SimulationHandle};

use crate::{
    car::{CarControls, CarState},
    error::SimError,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Identifier of a simulator instance inside a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SimId(pub i32);

/// Identifier of a car inside a simulator instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CarId(pub i32);

/// Policy for placing the car on the track without advancing simulated time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeleportMode {
    /// The start point of the track.
    Start,
    /// The track point nearest to the car.
    Nearest,
    /// A random track point.
    Random,
}

impl TeleportMode {
    /// Index of the mode in the simulator's interface.
    pub fn index(self) -> i32 {
        match self {
            TeleportMode::Start => 0,
            TeleportMode::Nearest => 1,
            TeleportMode::Random => 2,
        }
    }
}

/// Driving assists handled inside the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assists {
    /// Operate the clutch automatically.
    pub auto_clutch: bool,
    /// Shift gears automatically.
    pub auto_shift: bool,
    /// Blip the throttle on downshifts.
    pub auto_blip: bool,
}

impl Default for Assists {
    fn default() -> Self {
        Self {
            auto_clutch: true,
            auto_shift: true,
            auto_blip: true,
        }
    }
}

/// The native simulator, seen from the environment.
///
/// Implementations are not reentrant; callers serialize all calls.
/// Tune and scoring names reach this boundary as the simulator's own string
/// keys.
pub trait SimBackend {
    /// Creates a simulator whose assets live under `asset_root`.
    fn create(&mut self, asset_root: &Path) -> Result<SimId, SimError>;

    /// Loads a track by directory name.
    fn load_track(&mut self, sim: SimId, name: &str) -> Result<(), SimError>;

    /// Adds a car by model name.
    fn add_car(&mut self, sim: SimId, model: &str) -> Result<CarId, SimError>;

    /// Sets a named setup value of the car.
    fn set_tune(&mut self, sim: SimId, car: CarId, name: &str, value: f32)
        -> Result<(), SimError>;

    /// Sets a named weight of the car's scoring system.
    fn set_scoring_var(
        &mut self,
        sim: SimId,
        car: CarId,
        name: &str,
        value: f32,
    ) -> Result<(), SimError>;

    /// Places the car by `mode`, or at the normalized spline position `offset`
    /// in `[0, 1]` when given.
    fn teleport(
        &mut self,
        sim: SimId,
        car: CarId,
        mode: TeleportMode,
        offset: Option<f32>,
    ) -> Result<(), SimError>;

    /// Makes the simulator reposition the car by itself on collisions and/or track exits.
    fn set_auto_teleport(
        &mut self,
        sim: SimId,
        car: CarId,
        on_hit: bool,
        off_track: bool,
        mode: TeleportMode,
    ) -> Result<(), SimError>;

    /// Configures driving assists.
    fn set_assists(&mut self, sim: SimId, car: CarId, assists: Assists) -> Result<(), SimError>;

    /// Pushes driver inputs; with `smooth`, the car moves toward them over the following ticks.
    fn set_controls(
        &mut self,
        sim: SimId,
        car: CarId,
        smooth: bool,
        controls: &CarControls,
    ) -> Result<(), SimError>;

    /// Advances physics by exactly `dt` seconds.
    fn step(&mut self, sim: SimId, dt: f64) -> Result<(), SimError>;

    /// Copies the car state into `out`.
    fn get_state(&mut self, sim: SimId, car: CarId, out: &mut CarState) -> Result<(), SimError>;

    /// Releases the simulator.
    fn destroy(&mut self, sim: SimId) -> Result<(), SimError>;
}
