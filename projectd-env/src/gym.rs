//! Adapter from [`EpisodeController`] to the [`Env`] trait.
use crate::{
    config::DriftEnvConfig,
    episode::EpisodeController,
    sim::SimBackend,
    viewer::ViewerBackend,
};
use anyhow::Result;
use log::trace;
use ndarray::Array1;
use projectd_core::{
    record::{Record, RecordValue},
    Act, BoxSpace, Env, Obs, Step,
};
use std::borrow::Cow;

/// Observation of [`DriftEnv`].
#[derive(Clone, Debug, PartialEq)]
pub struct DriftObs(pub Array1<f32>);

impl Obs for DriftObs {
    fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<f32>> for DriftObs {
    fn from(v: Vec<f32>) -> Self {
        Self(Array1::from(v))
    }
}

/// Action of [`DriftEnv`], components in `[-1, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct DriftAct(pub Array1<f32>);

impl Act for DriftAct {
    fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<f32>> for DriftAct {
    fn from(v: Vec<f32>) -> Self {
        Self(Array1::from(v))
    }
}

impl DriftAct {
    fn as_cow(&self) -> Cow<'_, [f32]> {
        match self.0.as_slice() {
            Some(s) => Cow::Borrowed(s),
            None => Cow::Owned(self.0.to_vec()),
        }
    }
}

/// The drift environment as an [`Env`].
///
/// [`Env::build`] creates default-constructed backends, which suits native
/// backends such as `PyProjectD`. To inject prepared backends, build the
/// controller yourself and use [`DriftEnv::new`].
///
/// Episodes never truncate on their own; wrap the environment in
/// [`TimeLimit`](projectd_core::TimeLimit) to bound their length.
pub struct DriftEnv<B: SimBackend, V: ViewerBackend> {
    controller: EpisodeController<B, V>,
}

impl<B: SimBackend, V: ViewerBackend> DriftEnv<B, V> {
    /// Wraps a controller, initializing its simulator if needed.
    pub fn new(mut controller: EpisodeController<B, V>) -> Result<Self> {
        if !controller.sim_initialized() {
            controller.init_sim()?;
        }
        Ok(Self { controller })
    }

    /// Creates the controller from `config` and the given backends.
    pub fn from_backends(config: DriftEnvConfig, backend: B, viewer: Option<V>) -> Result<Self> {
        Self::new(EpisodeController::new(config, backend, viewer)?)
    }

    /// Returns a reference to the controller.
    pub fn controller(&self) -> &EpisodeController<B, V> {
        &self.controller
    }

    /// Returns a mutable reference to the controller.
    pub fn controller_mut(&mut self) -> &mut EpisodeController<B, V> {
        &mut self.controller
    }

    /// Older reset shape returning only the observation.
    pub fn reset_legacy(&mut self) -> Result<DriftObs> {
        let (obs, _) = self.controller.reset()?;
        Ok(obs.into())
    }

    /// Older step shape, `(obs, reward, done, info)`, where `done` is
    /// `terminated || truncated`.
    pub fn step_legacy(&mut self, a: &DriftAct) -> Result<(DriftObs, f32, bool, Record)> {
        let outcome = self.controller.step(&a.as_cow())?;
        let done = outcome.terminated || outcome.truncated;
        Ok((outcome.obs.into(), outcome.reward, done, outcome.info))
    }
}

impl<B, V> Env for DriftEnv<B, V>
where
    B: SimBackend + Default,
    V: ViewerBackend + Default,
{
    type Config = DriftEnvConfig;
    type Obs = DriftObs;
    type Act = DriftAct;
    type Info = Record;

    /// Builds the environment; the simulator does not take a seed, so `_seed` is ignored.
    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        let viewer = if config.viewer.enabled {
            Some(V::default())
        } else {
            None
        };
        Self::from_backends(config.clone(), B::default(), viewer)
    }

    fn reset(&mut self) -> Result<(Self::Obs, Record)> {
        trace!("DriftEnv::reset()");
        let (obs, info) = self.controller.reset()?;
        Ok((obs.into(), info))
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        trace!("DriftEnv::step()");
        let outcome = self.controller.step(&a.as_cow())?;
        let record = Record::from_slice(&[
            ("obs", RecordValue::Array1(outcome.obs.clone())),
            ("act", RecordValue::Array1(a.0.to_vec())),
            ("reward", RecordValue::Scalar(outcome.reward)),
        ]);
        let step = Step::new(
            outcome.obs.into(),
            a.clone(),
            outcome.reward,
            outcome.terminated,
            outcome.truncated,
            outcome.info,
        );
        Ok((step, record))
    }

    fn observation_space(&self) -> BoxSpace {
        self.controller.observation_space().clone()
    }

    fn action_space(&self) -> BoxSpace {
        self.controller.action_space().clone()
    }

    fn close(&mut self) -> Result<()> {
        Ok(self.controller.close()?)
    }
}
