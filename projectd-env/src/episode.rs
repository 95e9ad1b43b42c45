//! The episode state machine.
use crate::{
    action::ActionMapper,
    car::{CarControls, CarState},
    config::DriftEnvConfig,
    error::{ConfigError, EnvError, SimError},
    observation::ObservationBuilder,
    profile::RewardSource,
    sim::{CarHandle, SimBackend, SimulationHandle},
    termination::{TerminationCheck, TerminationReason},
    viewer::{ViewerAttachment, ViewerBackend},
};
use log::{info, trace, warn};
use projectd_core::{
    record::{Record, RecordValue},
    BoxSpace,
};

const NEUTRAL_ACTION: [f32; 3] = [0.0; 3];

/// Lifecycle state of an [`EpisodeController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Created, `init_sim` not called yet.
    Uninitialized,
    /// The simulator is configured; `reset` and `step` are allowed.
    SimReady,
    /// `init_sim` failed; the controller cannot be used anymore.
    Failed,
    /// `close` was called.
    Closed,
}

/// Result of [`EpisodeController::step`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Observation after the tick.
    pub obs: Vec<f32>,

    /// Reward of the tick, penalties included.
    pub reward: f32,

    /// The episode reached a terminal state.
    pub terminated: bool,

    /// Always `false`: horizons are enforced by a wrapper such as
    /// [`TimeLimit`](projectd_core::TimeLimit).
    pub truncated: bool,

    /// `step_id`, `total_reward` and, on termination, `terminated_by`.
    pub info: Record,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Turns the continuously stepped simulator into an episodic environment.
///
/// # Lifecycle
///
/// ```mermaid
/// stateDiagram-v2
///     [*] --> Uninitialized
///     Uninitialized --> SimReady: init_sim()
///     Uninitialized --> Failed: init_sim() fails
///     SimReady --> SimReady: reset() / step()
///     Uninitialized --> Closed: close()
///     SimReady --> Closed: close()
///     Failed --> Closed: close()
///     Closed --> [*]
/// ```
///
/// While in `SimReady`, the viewer (if enabled) stays detached until
/// `step_id` exceeds the warm-up, then attaches once and renders one frame
/// per tick.
///
/// # Ticks
///
/// Every [`step`](Self::step) is one tick:
///
/// 1. map the action into the reused [`CarControls`] buffer,
/// 2. push the controls and advance physics by exactly `sim_dt`,
/// 3. read the state into the reused [`CarState`] buffer,
/// 4. attach the viewer if the warm-up is over, then render one frame,
/// 5. build the observation and compute the reward minus penalties,
/// 6. accumulate `total_reward` and evaluate termination.
///
/// A failure in the middle of a tick leaves the simulator in an unknown
/// state, so the episode is marked corrupted and `step` is refused with
/// [`EnvError::EpisodeCorrupted`] until the next successful `reset`.
pub struct EpisodeController<B: SimBackend, V: ViewerBackend> {
    config: DriftEnvConfig,
    mapper: ActionMapper,
    observer: ObservationBuilder,
    termination: TerminationCheck,
    action_space: BoxSpace,
    backend: Option<B>,
    sim: Option<SimulationHandle<B>>,
    car: Option<CarHandle>,
    viewer: Option<ViewerAttachment<V>>,
    state: ControllerState,
    car_state: CarState,
    controls: CarControls,
    step_id: usize,
    total_reward: f32,
    corrupted: bool,
}

impl<B: SimBackend, V: ViewerBackend> EpisodeController<B, V> {
    /// Validates `config` and prepares the mappings. The simulator is not touched.
    ///
    /// Fails with [`ConfigError::MissingViewer`] if the viewer is enabled but
    /// `viewer` is `None`.
    pub fn new(config: DriftEnvConfig, backend: B, viewer: Option<V>) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.viewer.enabled && viewer.is_none() {
            return Err(ConfigError::MissingViewer);
        }

        let profile = &config.profile;
        let mapper = ActionMapper::new(profile)?;
        let observer = ObservationBuilder::from_profile(profile)?;
        let termination = TerminationCheck::new(*profile.get_termination());
        let action_space = BoxSpace::uniform(mapper.arity(), -1.0, 1.0).map_err(|e| {
            ConfigError::InvalidSetting {
                name: "action space",
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            config,
            mapper,
            observer,
            termination,
            action_space,
            backend: Some(backend),
            sim: None,
            car: None,
            viewer: viewer.map(ViewerAttachment::new),
            state: ControllerState::Uninitialized,
            car_state: CarState::default(),
            controls: CarControls::default(),
            step_id: 0,
            total_reward: 0.0,
            corrupted: false,
        })
    }

    /// Creates the simulator, loads the track and the car and applies the profile.
    ///
    /// Can run once. A failure leaves the controller in
    /// [`ControllerState::Failed`], releasing whatever was created.
    pub fn init_sim(&mut self) -> Result<(), EnvError> {
        match self.state {
            ControllerState::Uninitialized => {}
            ControllerState::SimReady => return Err(EnvError::AlreadyInitialized),
            ControllerState::Failed => return Err(EnvError::InitFailed),
            ControllerState::Closed => return Err(EnvError::Closed),
        }
        let backend = self.backend.take().ok_or(EnvError::InitFailed)?;
        self.state = ControllerState::Failed;

        let config = &self.config;
        let profile = &config.profile;
        let teleport = profile.get_teleport();

        let mut sim = SimulationHandle::create(backend, &config.asset_root)?;
        sim.load_track(&config.track)?;
        let car = sim.add_car(&config.car_model)?;
        sim.teleport(car, teleport.mode, teleport.start_offset)?;
        sim.set_auto_teleport(car, teleport.on_hit, teleport.off_track, teleport.mode)?;
        sim.set_assists(car, profile.get_assists())?;
        for (param, value) in profile.tunes() {
            sim.set_tune(car, param, value)?;
        }
        for (var, value) in profile.scoring() {
            sim.set_scoring_var(car, var, value)?;
        }

        self.car_state = CarState::default();
        self.controls = CarControls::default();
        self.sim = Some(sim);
        self.car = Some(car);
        self.state = ControllerState::SimReady;
        info!(
            "initialized {} on {} (dt = {})",
            config.car_model, config.track, config.sim_dt
        );
        Ok(())
    }

    fn ensure_ready(&self) -> Result<(), EnvError> {
        match self.state {
            ControllerState::SimReady => Ok(()),
            ControllerState::Uninitialized => Err(EnvError::NotInitialized),
            ControllerState::Failed => Err(EnvError::InitFailed),
            ControllerState::Closed => Err(EnvError::Closed),
        }
    }

    /// Pushes the controls, advances physics and reads the state back.
    fn tick_sim(&mut self) -> Result<(), EnvError> {
        let sim = self.sim.as_mut().ok_or(EnvError::NotInitialized)?;
        let car = self.car.ok_or(EnvError::NotInitialized)?;
        sim.set_controls(car, self.config.smooth_controls, &self.controls)?;
        sim.step(self.config.sim_dt)?;
        sim.get_state(car, &mut self.car_state)?;
        Ok(())
    }

    fn maybe_attach_viewer(&mut self) -> Result<(), EnvError> {
        let viewer_config = &self.config.viewer;
        if !viewer_config.enabled || self.step_id <= viewer_config.warmup_steps {
            return Ok(());
        }
        let viewer = match self.viewer.as_mut() {
            Some(viewer) if !viewer.was_attached() => viewer,
            _ => return Ok(()),
        };
        let sim = self
            .sim
            .as_ref()
            .and_then(|s| s.id())
            .ok_or(SimError::InvalidHandle)?;
        let car = self.car.ok_or(EnvError::NotInitialized)?;
        viewer.attach(&self.config.asset_root, sim, car.id(), viewer_config)
    }

    fn tick_viewer(&mut self) -> Result<(), EnvError> {
        if let Some(viewer) = self.viewer.as_mut() {
            viewer.tick()?;
        }
        Ok(())
    }

    /// Starts a new episode.
    ///
    /// Teleports the car if the profile asks for it, runs one tick with a
    /// neutral action to refresh the state, then zeroes `step_id` and
    /// `total_reward`. The neutral tick is not scored and never attaches
    /// the viewer.
    pub fn reset(&mut self) -> Result<(Vec<f32>, Record), EnvError> {
        self.ensure_ready()?;
        trace!("reset");
        self.corrupted = true;

        let teleport = *self.config.profile.get_teleport();
        if teleport.on_reset {
            let sim = self.sim.as_mut().ok_or(EnvError::NotInitialized)?;
            let car = self.car.ok_or(EnvError::NotInitialized)?;
            sim.teleport(car, teleport.mode, None)?;
        }

        let arity = self.mapper.arity();
        self.mapper.map(&NEUTRAL_ACTION[..arity], &mut self.controls)?;
        self.tick_sim()?;
        self.tick_viewer()?;
        let obs = self.observer.build(&self.car_state)?;

        self.step_id = 0;
        self.total_reward = 0.0;
        self.corrupted = false;
        Ok((obs, Record::empty()))
    }

    /// Applies `action` for one tick.
    ///
    /// Fails with [`ConfigError::ActionArity`] if the action length does not
    /// match the profile; such a call has no effect on the simulator.
    pub fn step(&mut self, action: &[f32]) -> Result<StepOutcome, EnvError> {
        self.ensure_ready()?;
        if self.corrupted {
            return Err(EnvError::EpisodeCorrupted);
        }
        trace!("step {}: action = {:?}", self.step_id + 1, action);
        self.mapper.map(action, &mut self.controls)?;

        self.corrupted = true;
        self.tick_sim()?;
        self.step_id += 1;
        self.maybe_attach_viewer()?;
        self.tick_viewer()?;

        let obs = self.observer.build(&self.car_state)?;
        let raw_reward = match self.config.profile.get_reward_source() {
            RewardSource::StepReward => self.car_state.step_reward,
            RewardSource::DriftReward => self.car_state.drift_reward,
        };
        if !raw_reward.is_finite() {
            return Err(EnvError::NonFiniteState {
                feature: "reward".to_string(),
            });
        }

        let mut verdict = self.termination.evaluate(&self.car_state);
        let reward = raw_reward - verdict.penalty;
        self.total_reward += reward;
        if self.termination.below_floor(self.total_reward) {
            verdict.reasons.push(TerminationReason::RewardFloor);
        }
        let terminated = verdict.is_terminal();
        self.corrupted = false;

        let mut record = Record::from_slice(&[
            ("step_id", RecordValue::Scalar(self.step_id as f32)),
            ("total_reward", RecordValue::Scalar(self.total_reward)),
        ]);
        if terminated {
            let reasons: Vec<&str> = verdict.reasons.iter().map(|r| r.label()).collect();
            info!(
                "episode terminated at step {} by {}, total reward: {}",
                self.step_id,
                reasons.join(", "),
                self.total_reward
            );
            record.insert("terminated_by", RecordValue::String(reasons.join(",")));
        }

        Ok(StepOutcome {
            obs,
            reward,
            terminated,
            truncated: false,
            info: record,
        })
    }

    /// Detaches the viewer and destroys the simulator.
    ///
    /// Calling it again is a no-op. Both releases are attempted even if the
    /// first fails; the first error is returned.
    pub fn close(&mut self) -> Result<(), EnvError> {
        if self.state == ControllerState::Closed {
            return Ok(());
        }
        self.state = ControllerState::Closed;
        let mut first_err: Option<EnvError> = None;

        if let Some(viewer) = self.viewer.as_mut() {
            if let Err(e) = viewer.detach() {
                first_err = Some(e.into());
            }
        }
        if let Some(mut sim) = self.sim.take() {
            if let Err(e) = sim.destroy() {
                if first_err.is_none() {
                    first_err = Some(e.into());
                }
            }
        }
        self.car = None;
        info!("environment closed");

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Number of steps since the last reset.
    pub fn step_id(&self) -> usize {
        self.step_id
    }

    /// Sum of the rewards since the last reset.
    pub fn total_reward(&self) -> f32 {
        self.total_reward
    }

    /// Lifecycle state.
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Returns `true` between a successful `init_sim` and `close`.
    pub fn sim_initialized(&self) -> bool {
        self.state == ControllerState::SimReady
    }

    /// Returns `true` once the viewer attached, until `close`.
    pub fn viewer_initialized(&self) -> bool {
        self.state != ControllerState::Closed
            && self.viewer.as_ref().map_or(false, |v| v.was_attached())
    }

    /// Bounds of the observation vector.
    pub fn observation_space(&self) -> &BoxSpace {
        self.observer.space()
    }

    /// Bounds of the action vector, `[-1, 1]` per component.
    pub fn action_space(&self) -> &BoxSpace {
        &self.action_space
    }

    /// The configuration.
    pub fn config(&self) -> &DriftEnvConfig {
        &self.config
    }

    /// The state read after the last tick.
    pub fn car_state(&self) -> &CarState {
        &self.car_state
    }

    /// The controls pushed on the last tick.
    pub fn controls(&self) -> &CarControls {
        &self.controls
    }
}

impl<B: SimBackend, V: ViewerBackend> Drop for EpisodeController<B, V> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("failed to close the environment: {}", e);
        }
    }
}
