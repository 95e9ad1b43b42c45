//! Immutable description of one environment variant.
//!
//! A [`Profile`] fixes everything that differs between variants of the
//! environment: the action arity, the observation layout and its bounds, the
//! reward source, the termination rules and the values pushed into the
//! simulator at initialization. Variants used so far are available as presets,
//! [`Profile::drift_playground`] and [`Profile::drift_telemetry`].
use crate::{
    car::{GEAR_FIRST, LOOK_AHEAD_COUNT, PROBE_COUNT, TYRE_COUNT},
    error::ConfigError,
    sim::{Assists, TeleportMode},
    util::LinScale,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    f32::consts::PI,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Number of components of an action vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionArity {
    /// Steer and gas; the brake is never applied.
    Two,
    /// Steer, gas and brake.
    Three,
}

impl ActionArity {
    /// Length of the action vector.
    pub fn len(self) -> usize {
        match self {
            ActionArity::Two => 2,
            ActionArity::Three => 3,
        }
    }
}

/// Component of a 3-vector.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn label(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

/// An element of the observation vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObsFeature {
    /// Dot product of the body and track directions, in `[-1, 1]`.
    BodyVsTrack,
    /// Dot product of the velocity and track directions, in `[-1, 1]`.
    VelocityVsTrack,
    /// Track direction change at the given look-ahead sample.
    LookAhead(usize),
    /// Obstacle distance along the given probe.
    Probe(usize),
    /// Body velocity component.
    Velocity(Axis),
    /// Body angular velocity component.
    AngularVelocity(Axis),
    /// Normalized slip of the given tyre.
    TyreSlip(usize),
    /// Engine speed scaled from `[0, 20000]` rpm onto `[0, 1]`.
    EngineRpm,
}

impl ObsFeature {
    /// Human-readable name, used in error messages.
    pub fn label(&self) -> String {
        match self {
            ObsFeature::BodyVsTrack => "bodyVsTrack".to_string(),
            ObsFeature::VelocityVsTrack => "velocityVsTrack".to_string(),
            ObsFeature::LookAhead(i) => format!("lookAhead{}", i),
            ObsFeature::Probe(i) => format!("probe{}", i),
            ObsFeature::Velocity(a) => format!("velocity.{}", a.label()),
            ObsFeature::AngularVelocity(a) => format!("angularVelocity.{}", a.label()),
            ObsFeature::TyreSlip(i) => format!("tyreSlip{}", i),
            ObsFeature::EngineRpm => "engineRpm".to_string(),
        }
    }

    /// Fails if the feature indexes past the arrays of the car state.
    pub fn check_index(&self) -> Result<(), ConfigError> {
        let (index, available) = match self {
            ObsFeature::LookAhead(i) => (*i, LOOK_AHEAD_COUNT),
            ObsFeature::Probe(i) => (*i, PROBE_COUNT),
            ObsFeature::TyreSlip(i) => (*i, TYRE_COUNT),
            _ => return Ok(()),
        };
        if index < available {
            Ok(())
        } else {
            Err(ConfigError::FeatureIndex {
                feature: self.label(),
                available,
            })
        }
    }

    /// The `(low, high)` bounds of the feature.
    pub fn bounds(&self, ranges: &ObsRanges) -> (f32, f32) {
        match self {
            ObsFeature::BodyVsTrack | ObsFeature::VelocityVsTrack => (-1.0, 1.0),
            ObsFeature::LookAhead(_) => (-ranges.look_ahead, ranges.look_ahead),
            ObsFeature::Probe(_) => (0.0, ranges.probe),
            ObsFeature::Velocity(_) => (-ranges.velocity, ranges.velocity),
            ObsFeature::AngularVelocity(_) => (-ranges.angular_velocity, ranges.angular_velocity),
            ObsFeature::TyreSlip(_) => (0.0, ranges.tyre_slip),
            ObsFeature::EngineRpm => (0.0, 1.0),
        }
    }
}

/// Field of the car state used as the per-step reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardSource {
    /// The generic reward of the scoring system.
    StepReward,
    /// The drift reward of the scoring system.
    DriftReward,
}

/// Setup parameter of a car.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TuneParam {
    #[serde(rename = "FRONT_BIAS")]
    FrontBias,
    #[serde(rename = "DIFF_POWER")]
    DiffPower,
    #[serde(rename = "DIFF_COAST")]
    DiffCoast,
    #[serde(rename = "FINAL_RATIO")]
    FinalRatio,
    #[serde(rename = "TURBO_0")]
    Turbo0,
    #[serde(rename = "TURBO_1")]
    Turbo1,
}

impl TuneParam {
    /// Key of the parameter in the simulator.
    pub fn name(self) -> &'static str {
        match self {
            TuneParam::FrontBias => "FRONT_BIAS",
            TuneParam::DiffPower => "DIFF_POWER",
            TuneParam::DiffCoast => "DIFF_COAST",
            TuneParam::FinalRatio => "FINAL_RATIO",
            TuneParam::Turbo0 => "TURBO_0",
            TuneParam::Turbo1 => "TURBO_1",
        }
    }
}

/// Weight or threshold of the simulator's scoring system.
///
/// Speeds are in km/h, distances in meters.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScoringVar {
    SmoothSteerSpeed,
    MinBonusSpeed,
    MaxBonusSpeed,
    StallRpm,
    DirectionThreshold,
    OutOfTrackThreshold,
    ApproachDistance,
    CriticalDistance,
    TravelBonus,
    TravelSplineBonus,
    DriftBonus,
    SpeedBonus,
    ThrottleBonus,
    EngineRpmBonus,
    DirectionBonus,
    DirectionPenalty,
    ObstApproachPenalty,
    CollisionPenalty,
    OffTrackPenalty,
    GearGrindPenalty,
    StallPenalty,
}

impl ScoringVar {
    /// Key of the variable in the simulator.
    pub fn name(self) -> &'static str {
        match self {
            ScoringVar::SmoothSteerSpeed => "SmoothSteerSpeed",
            ScoringVar::MinBonusSpeed => "MinBonusSpeed",
            ScoringVar::MaxBonusSpeed => "MaxBonusSpeed",
            ScoringVar::StallRpm => "StallRpm",
            ScoringVar::DirectionThreshold => "DirectionThreshold",
            ScoringVar::OutOfTrackThreshold => "OutOfTrackThreshold",
            ScoringVar::ApproachDistance => "ApproachDistance",
            ScoringVar::CriticalDistance => "CriticalDistance",
            ScoringVar::TravelBonus => "TravelBonus",
            ScoringVar::TravelSplineBonus => "TravelSplineBonus",
            ScoringVar::DriftBonus => "DriftBonus",
            ScoringVar::SpeedBonus => "SpeedBonus",
            ScoringVar::ThrottleBonus => "ThrottleBonus",
            ScoringVar::EngineRpmBonus => "EngineRpmBonus",
            ScoringVar::DirectionBonus => "DirectionBonus",
            ScoringVar::DirectionPenalty => "DirectionPenalty",
            ScoringVar::ObstApproachPenalty => "ObstApproachPenalty",
            ScoringVar::CollisionPenalty => "CollisionPenalty",
            ScoringVar::OffTrackPenalty => "OffTrackPenalty",
            ScoringVar::GearGrindPenalty => "GearGrindPenalty",
            ScoringVar::StallPenalty => "StallPenalty",
        }
    }
}

/// Symmetric ranges of the unbounded observation features.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObsRanges {
    /// Velocity range in m/s.
    pub velocity: f32,

    /// Angular velocity range in rad/s.
    pub angular_velocity: f32,

    /// Upper bound of tyre slip.
    pub tyre_slip: f32,

    /// Look-ahead range in radians.
    pub look_ahead: f32,

    /// Upper bound of probe distances in meters.
    pub probe: f32,
}

impl Default for ObsRanges {
    fn default() -> Self {
        Self {
            velocity: 100.0,
            angular_velocity: 100.0,
            tyre_slip: 10.0,
            look_ahead: PI,
            probe: 50.0,
        }
    }
}

impl ObsRanges {
    fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("ranges.velocity", self.velocity),
            ("ranges.angular_velocity", self.angular_velocity),
            ("ranges.tyre_slip", self.tyre_slip),
            ("ranges.look_ahead", self.look_ahead),
            ("ranges.probe", self.probe),
        ];
        for &(name, v) in named.iter() {
            if !(v.is_finite() && v > 0.0) {
                return Err(ConfigError::InvalidSetting {
                    name,
                    reason: format!("{} is not a positive finite number", v),
                });
            }
        }
        Ok(())
    }
}

/// Termination toggles and their penalties.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerminationConfig {
    /// End the episode on collisions.
    pub on_hit: bool,

    /// End the episode when the car leaves the track.
    pub off_track: bool,

    /// End the episode when no new track point was reached for `stuck_timeout` seconds.
    pub when_stuck: bool,

    /// Subtracted from the reward of a colliding step.
    pub hit_penalty: f32,

    /// Subtracted from the reward of an off-track step.
    pub off_track_penalty: f32,

    /// Subtracted from the reward of a stuck step.
    pub stuck_penalty: f32,

    /// Seconds of simulated time without progress before the car counts as stuck.
    pub stuck_timeout: f64,

    /// The episode ends once the accumulated reward falls below this value.
    pub reward_floor: f32,
}

impl Default for TerminationConfig {
    fn default() -> Self {
        Self {
            on_hit: true,
            off_track: true,
            when_stuck: true,
            hit_penalty: 100.0,
            off_track_penalty: 100.0,
            stuck_penalty: 0.0,
            stuck_timeout: 5.0,
            reward_floor: -10000.0,
        }
    }
}

impl TerminationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let penalties = [
            ("termination.hit_penalty", self.hit_penalty),
            ("termination.off_track_penalty", self.off_track_penalty),
            ("termination.stuck_penalty", self.stuck_penalty),
        ];
        for &(name, v) in penalties.iter() {
            if !v.is_finite() {
                return Err(ConfigError::InvalidSetting {
                    name,
                    reason: format!("penalty {} is not finite", v),
                });
            }
        }
        if !(self.stuck_timeout.is_finite() && self.stuck_timeout > 0.0) {
            return Err(ConfigError::InvalidSetting {
                name: "termination.stuck_timeout",
                reason: format!("{} is not a positive finite number", self.stuck_timeout),
            });
        }
        // -inf disables the floor
        if self.reward_floor.is_nan() {
            return Err(ConfigError::InvalidSetting {
                name: "termination.reward_floor",
                reason: "NaN".to_string(),
            });
        }
        Ok(())
    }
}

/// Where the car is placed at initialization and on reset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeleportConfig {
    /// Placement policy.
    pub mode: TeleportMode,

    /// Teleport on every reset.
    pub on_reset: bool,

    /// Let the simulator teleport the car after collisions.
    pub on_hit: bool,

    /// Let the simulator teleport the car after leaving the track.
    pub off_track: bool,

    /// Normalized spline position in `[0, 1]` used at initialization instead of `mode`.
    pub start_offset: Option<f32>,
}

impl Default for TeleportConfig {
    fn default() -> Self {
        Self {
            mode: TeleportMode::Random,
            on_reset: true,
            on_hit: false,
            off_track: false,
            start_offset: None,
        }
    }
}

/// Configuration of one environment variant.
///
/// Built with the consuming setters and checked with [`Profile::validate`],
/// which the controller calls before touching the simulator.
///
/// ```
/// use projectd_env::profile::{ActionArity, Profile};
///
/// let profile = Profile::drift_playground().min_gas(0.2).arity(ActionArity::Two);
/// assert!(profile.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    arity: ActionArity,
    observation: Vec<ObsFeature>,
    ranges: ObsRanges,
    reward_source: RewardSource,
    termination: TerminationConfig,
    min_gas: f32,
    max_gas: f32,
    min_brake: f32,
    max_brake: f32,
    teleport: TeleportConfig,
    assists: Assists,
    manual_gear: u8,
    tunes: BTreeMap<TuneParam, f32>,
    scoring: BTreeMap<ScoringVar, f32>,
}

impl Default for Profile {
    fn default() -> Self {
        Self::drift_playground()
    }
}

fn supra_tunes() -> BTreeMap<TuneParam, f32> {
    [
        (TuneParam::FrontBias, 53.0),
        (TuneParam::DiffPower, 90.0),
        (TuneParam::DiffCoast, 90.0),
        (TuneParam::FinalRatio, 5.0),
        (TuneParam::Turbo0, 100.0),
        (TuneParam::Turbo1, 100.0),
    ]
    .iter()
    .cloned()
    .collect()
}

fn default_scoring() -> BTreeMap<ScoringVar, f32> {
    use ScoringVar::*;
    [
        (SmoothSteerSpeed, 10.0),
        (MinBonusSpeed, 5.0),
        (MaxBonusSpeed, 200.0),
        (StallRpm, 300.0),
        (DirectionThreshold, 0.75),
        (OutOfTrackThreshold, 0.51),
        (ApproachDistance, 3.5),
        (CriticalDistance, 2.0),
        (TravelBonus, 1.0),
        (TravelSplineBonus, 0.1),
        (DriftBonus, 0.0),
        (SpeedBonus, 0.0),
        (ThrottleBonus, 0.0),
        (EngineRpmBonus, 0.0),
        (DirectionBonus, 0.0),
        (DirectionPenalty, 1.0),
        (ObstApproachPenalty, 1.0),
        (CollisionPenalty, 1.0),
        (OffTrackPenalty, 1.0),
        (GearGrindPenalty, 0.0),
        (StallPenalty, 0.0),
    ]
    .iter()
    .cloned()
    .collect()
}

impl Profile {
    /// Track-following on the drift playground: steer/gas/brake actions,
    /// track-relative observations, the generic step reward.
    pub fn drift_playground() -> Self {
        let mut observation = vec![ObsFeature::BodyVsTrack, ObsFeature::VelocityVsTrack];
        observation.extend((0..LOOK_AHEAD_COUNT).map(ObsFeature::LookAhead));
        observation.extend((0..PROBE_COUNT).map(ObsFeature::Probe));

        Self {
            arity: ActionArity::Three,
            observation,
            ranges: ObsRanges::default(),
            reward_source: RewardSource::StepReward,
            termination: TerminationConfig::default(),
            min_gas: 0.1,
            max_gas: 1.0,
            min_brake: 0.0,
            max_brake: 1.0,
            teleport: TeleportConfig::default(),
            assists: Assists::default(),
            manual_gear: GEAR_FIRST,
            tunes: supra_tunes(),
            scoring: default_scoring(),
        }
    }

    /// Drifting from vehicle telemetry: steer/gas actions, engine and body
    /// dynamics as observations, the drift reward.
    pub fn drift_telemetry() -> Self {
        let axes = [Axis::X, Axis::Y, Axis::Z];
        let mut observation = vec![ObsFeature::EngineRpm];
        observation.extend(axes.iter().cloned().map(ObsFeature::Velocity));
        observation.extend(axes.iter().cloned().map(ObsFeature::AngularVelocity));
        observation.extend((0..TYRE_COUNT).map(ObsFeature::TyreSlip));

        let mut scoring = default_scoring();
        scoring.insert(ScoringVar::DriftBonus, 1.0);

        Self {
            arity: ActionArity::Two,
            observation,
            reward_source: RewardSource::DriftReward,
            scoring,
            ..Self::drift_playground()
        }
    }

    /// Sets the action arity.
    pub fn arity(mut self, v: ActionArity) -> Self {
        self.arity = v;
        self
    }

    /// Sets the observation layout.
    pub fn observation(mut self, v: Vec<ObsFeature>) -> Self {
        self.observation = v;
        self
    }

    /// Sets the observation ranges.
    pub fn ranges(mut self, v: ObsRanges) -> Self {
        self.ranges = v;
        self
    }

    /// Sets the reward source.
    pub fn reward_source(mut self, v: RewardSource) -> Self {
        self.reward_source = v;
        self
    }

    /// Sets the termination rules.
    pub fn termination(mut self, v: TerminationConfig) -> Self {
        self.termination = v;
        self
    }

    /// Sets the gas applied at action value -1.
    pub fn min_gas(mut self, v: f32) -> Self {
        self.min_gas = v;
        self
    }

    /// Sets the gas applied at action value 1.
    pub fn max_gas(mut self, v: f32) -> Self {
        self.max_gas = v;
        self
    }

    /// Sets the brake applied at action value -1.
    pub fn min_brake(mut self, v: f32) -> Self {
        self.min_brake = v;
        self
    }

    /// Sets the brake applied at action value 1.
    pub fn max_brake(mut self, v: f32) -> Self {
        self.max_brake = v;
        self
    }

    /// Sets teleport behavior.
    pub fn teleport(mut self, v: TeleportConfig) -> Self {
        self.teleport = v;
        self
    }

    /// Sets driving assists.
    pub fn assists(mut self, v: Assists) -> Self {
        self.assists = v;
        self
    }

    /// Sets the gear requested while auto-shift is off.
    pub fn manual_gear(mut self, v: u8) -> Self {
        self.manual_gear = v;
        self
    }

    /// Sets a car setup value.
    pub fn tune(mut self, param: TuneParam, value: f32) -> Self {
        self.tunes.insert(param, value);
        self
    }

    /// Removes all car setup values.
    pub fn clear_tunes(mut self) -> Self {
        self.tunes.clear();
        self
    }

    /// Sets a scoring weight.
    pub fn scoring_var(mut self, var: ScoringVar, value: f32) -> Self {
        self.scoring.insert(var, value);
        self
    }

    /// Action arity.
    pub fn get_arity(&self) -> ActionArity {
        self.arity
    }

    /// Observation layout.
    pub fn get_observation(&self) -> &[ObsFeature] {
        &self.observation
    }

    /// Observation ranges.
    pub fn get_ranges(&self) -> &ObsRanges {
        &self.ranges
    }

    /// Reward source.
    pub fn get_reward_source(&self) -> RewardSource {
        self.reward_source
    }

    /// Termination rules.
    pub fn get_termination(&self) -> &TerminationConfig {
        &self.termination
    }

    /// Gas range `(min, max)`.
    pub fn gas_range(&self) -> (f32, f32) {
        (self.min_gas, self.max_gas)
    }

    /// Brake range `(min, max)`.
    pub fn brake_range(&self) -> (f32, f32) {
        (self.min_brake, self.max_brake)
    }

    /// Teleport behavior.
    pub fn get_teleport(&self) -> &TeleportConfig {
        &self.teleport
    }

    /// Driving assists.
    pub fn get_assists(&self) -> Assists {
        self.assists
    }

    /// Gear requested while auto-shift is off.
    pub fn get_manual_gear(&self) -> u8 {
        self.manual_gear
    }

    /// Car setup values in key order.
    pub fn tunes(&self) -> impl Iterator<Item = (TuneParam, f32)> + '_ {
        self.tunes.iter().map(|(k, v)| (*k, *v))
    }

    /// Scoring weights in key order.
    pub fn scoring(&self) -> impl Iterator<Item = (ScoringVar, f32)> + '_ {
        self.scoring.iter().map(|(k, v)| (*k, *v))
    }

    /// Checks every setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.observation.is_empty() {
            return Err(ConfigError::EmptyObservation);
        }
        for f in self.observation.iter() {
            f.check_index()?;
        }
        self.ranges.validate()?;
        self.termination.validate()?;

        check_unit_range("gas", self.min_gas, self.max_gas)?;
        check_unit_range("brake", self.min_brake, self.max_brake)?;
        LinScale::new(-1.0, 1.0, self.min_gas, self.max_gas)?;
        LinScale::new(-1.0, 1.0, self.min_brake, self.max_brake)?;

        if let Some(offset) = self.teleport.start_offset {
            if !(0.0..=1.0).contains(&offset) {
                return Err(ConfigError::InvalidSetting {
                    name: "teleport.start_offset",
                    reason: format!("{} is outside [0, 1]", offset),
                });
            }
        }

        for (name, value) in self
            .tunes
            .iter()
            .map(|(k, v)| (k.name(), *v))
            .chain(self.scoring.iter().map(|(k, v)| (k.name(), *v)))
        {
            if !value.is_finite() {
                return Err(ConfigError::InvalidSetting {
                    name,
                    reason: format!("{} is not finite", value),
                });
            }
        }
        Ok(())
    }

    /// Constructs [`Profile`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`Profile`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

fn check_unit_range(name: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if 0.0 <= min && min <= max && max <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidSetting {
            name,
            reason: format!("[{}, {}] is not an ordered range inside [0, 1]", min, max),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_presets_are_valid() {
        let p = Profile::drift_playground();
        p.validate().unwrap();
        assert_eq!(p.get_arity().len(), 3);
        assert_eq!(p.get_observation().len(), 14);
        assert_eq!(p.scoring().count(), 21);
        assert_eq!(p.tunes().count(), 6);

        let p = Profile::drift_telemetry();
        p.validate().unwrap();
        assert_eq!(p.get_arity().len(), 2);
        assert_eq!(p.get_observation().len(), 11);
        assert_eq!(p.get_reward_source(), RewardSource::DriftReward);
    }

    #[test]
    fn test_playground_layout_order() {
        let labels: Vec<_> = Profile::drift_playground()
            .get_observation()
            .iter()
            .map(|f| f.label())
            .collect();
        assert_eq!(labels[0], "bodyVsTrack");
        assert_eq!(labels[1], "velocityVsTrack");
        assert_eq!(labels[2], "lookAhead0");
        assert_eq!(labels[6], "lookAhead4");
        assert_eq!(labels[7], "probe0");
        assert_eq!(labels[13], "probe6");
    }

    #[test]
    fn test_invalid_settings() {
        let p = Profile::drift_playground().observation(vec![]);
        assert_eq!(p.validate(), Err(ConfigError::EmptyObservation));

        let p = Profile::drift_playground().observation(vec![ObsFeature::Probe(7)]);
        assert!(matches!(
            p.validate(),
            Err(ConfigError::FeatureIndex { available: 7, .. })
        ));

        let p = Profile::drift_playground().min_gas(0.8).max_gas(0.2);
        assert!(p.validate().is_err());

        let p = Profile::drift_playground().teleport(TeleportConfig {
            start_offset: Some(1.5),
            ..TeleportConfig::default()
        });
        assert!(p.validate().is_err());

        let p = Profile::drift_playground().termination(TerminationConfig {
            stuck_timeout: 0.0,
            ..TerminationConfig::default()
        });
        assert!(p.validate().is_err());

        let p = Profile::drift_playground().scoring_var(ScoringVar::DriftBonus, f32::NAN);
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_typed_keys() {
        assert_eq!(TuneParam::Turbo1.name(), "TURBO_1");
        assert_eq!(ScoringVar::ObstApproachPenalty.name(), "ObstApproachPenalty");
        let yaml = serde_yaml::to_string(&TuneParam::FinalRatio).unwrap();
        assert!(yaml.contains("FINAL_RATIO"));
    }

    #[test]
    fn test_serde_profile() -> Result<()> {
        let profile = Profile::drift_telemetry()
            .min_gas(0.2)
            .manual_gear(3)
            .tune(TuneParam::FinalRatio, 4.1);

        let dir = TempDir::new("profile")?;
        let path = dir.path().join("profile.yaml");
        profile.save(&path)?;
        let profile_ = Profile::load(&path)?;
        assert_eq!(profile, profile_);
        Ok(())
    }
}
