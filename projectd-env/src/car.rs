//! Control and state buffers exchanged with the simulator.
use serde::{Deserialize, Serialize};

/// Number of wheels.
pub const TYRE_COUNT: usize = 4;

/// Number of obstacle distance probes in [`CarState::probes`].
pub const PROBE_COUNT: usize = 7;

/// Number of curvature samples in [`CarState::look_ahead`].
pub const LOOK_AHEAD_COUNT: usize = 5;

/// Gear index of reverse.
pub const GEAR_REVERSE: u8 = 0;

/// Gear index of neutral.
pub const GEAR_NEUTRAL: u8 = 1;

/// Gear index of the first forward gear; higher gears follow.
pub const GEAR_FIRST: u8 = 2;

/// A 3-vector in the simulator's coordinate frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    #[allow(missing_docs)]
    pub x: f32,
    #[allow(missing_docs)]
    pub y: f32,
    #[allow(missing_docs)]
    pub z: f32,
}

impl Vec3 {
    /// Creates a vector.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Driver inputs pushed to the simulator on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarControls {
    /// Steering in `[-1, 1]`.
    pub steer: f32,

    /// Throttle in the profile's gas range.
    pub gas: f32,

    /// Brake in the profile's brake range.
    pub brake: f32,

    /// Hand brake in `[0, 1]`.
    pub hand_brake: f32,

    /// Clutch in `[0, 1]`, 1 being fully engaged.
    pub clutch: f32,

    /// Gear to select ([`GEAR_REVERSE`], [`GEAR_NEUTRAL`], [`GEAR_FIRST`]..),
    /// `None` leaves the gearbox alone.
    pub requested_gear: Option<u8>,
}

impl Default for CarControls {
    fn default() -> Self {
        Self {
            steer: 0.0,
            gas: 0.0,
            brake: 0.0,
            hand_brake: 0.0,
            clutch: 1.0,
            requested_gear: None,
        }
    }
}

/// Snapshot of a car, refreshed in place after every tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CarState {
    /// Engine speed.
    pub engine_rpm: f32,

    /// Ground speed in m/s.
    pub speed_ms: f32,

    /// Current gear index.
    pub gear: i32,

    /// Body velocity in m/s.
    pub velocity: Vec3,

    /// Body angular velocity in rad/s.
    pub angular_velocity: Vec3,

    /// Normalized slip of every tyre.
    pub tyre_slip: [f32; TYRE_COUNT],

    /// Distance to the nearest obstacle along each probe ray, in meters.
    pub probes: [f32; PROBE_COUNT],

    /// Track direction change at fixed distances ahead, in `[-PI, PI]`.
    pub look_ahead: [f32; LOOK_AHEAD_COUNT],

    /// Dot product of the body direction and the track direction.
    pub body_vs_track: f32,

    /// Dot product of the velocity direction and the track direction.
    pub velocity_vs_track: f32,

    /// Nonzero while the car touches an obstacle.
    pub collision_flag: i32,

    /// Nonzero while the car is off the track.
    pub out_of_track_flag: i32,

    /// Id of the nearest track point.
    pub nearest_track_point_id: i32,

    /// Simulated time at which the car last reached a new track point, in seconds.
    pub last_track_point_timestamp: f64,

    /// Simulated time of the snapshot, in seconds.
    pub timestamp: f64,

    /// Generic reward produced by the scoring system during the last tick.
    pub step_reward: f32,

    /// Drift reward produced by the scoring system during the last tick.
    pub drift_reward: f32,
}
