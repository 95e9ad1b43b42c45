//! Step-limit wrapper.
use crate::{
    record::{Record, RecordValue},
    BoxSpace, Env, Step,
};
use anyhow::Result;
use log::debug;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`TimeLimit`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeLimitConfig<C> {
    /// Configuration of the wrapped environment.
    pub env: C,

    /// The number of steps after which an episode is truncated.
    pub max_steps: usize,
}

impl<C> TimeLimitConfig<C> {
    /// Wraps an environment configuration with a step limit.
    pub fn new(env: C, max_steps: usize) -> Self {
        Self { env, max_steps }
    }

    /// Sets the step limit.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }
}

impl<C: Serialize + DeserializeOwned> TimeLimitConfig<C> {
    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves the configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Truncates episodes of the wrapped environment after a fixed number of steps.
///
/// Horizon enforcement lives here rather than in the environment: the wrapped
/// environment never reports truncation on its own. When an episode ends, the
/// step record gains an `episode_length` entry.
pub struct TimeLimit<E: Env> {
    env: E,
    max_steps: usize,
    count_steps: usize,
}

impl<E: Env> TimeLimit<E> {
    /// Wraps `env`.
    pub fn new(env: E, max_steps: usize) -> Self {
        Self {
            env,
            max_steps,
            count_steps: 0,
        }
    }

    /// The number of steps taken in the current episode.
    pub fn count_steps(&self) -> usize {
        self.count_steps
    }

    /// The step limit.
    pub fn limit(&self) -> usize {
        self.max_steps
    }

    /// Returns a reference to the wrapped environment.
    pub fn inner(&self) -> &E {
        &self.env
    }

    /// Returns a mutable reference to the wrapped environment.
    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Unwraps the environment.
    pub fn into_inner(self) -> E {
        self.env
    }
}

impl<E: Env> Env for TimeLimit<E> {
    type Config = TimeLimitConfig<E::Config>;
    type Obs = E::Obs;
    type Act = E::Act;
    type Info = E::Info;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        Ok(Self::new(E::build(&config.env, seed)?, config.max_steps))
    }

    fn reset(&mut self) -> Result<(Self::Obs, Record)> {
        self.count_steps = 0;
        self.env.reset()
    }

    fn reset_with_index(&mut self, ix: usize) -> Result<(Self::Obs, Record)> {
        self.count_steps = 0;
        self.env.reset_with_index(ix)
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        let (step, mut record) = self.env.step(a)?;
        self.count_steps += 1;

        let is_truncated =
            step.is_truncated || (!step.is_terminated && self.count_steps >= self.max_steps);
        if step.is_terminated || is_truncated {
            debug!(
                "episode finished after {} steps (truncated: {})",
                self.count_steps, is_truncated
            );
            record.insert(
                "episode_length",
                RecordValue::Scalar(self.count_steps as f32),
            );
            self.count_steps = 0;
        }

        let step = Step::new(
            step.obs,
            step.act,
            step.reward,
            step.is_terminated,
            is_truncated,
            step.info,
        );
        Ok((step, record))
    }

    fn observation_space(&self) -> BoxSpace {
        self.env.observation_space()
    }

    fn action_space(&self) -> BoxSpace {
        self.env.action_space()
    }

    fn close(&mut self) -> Result<()> {
        self.env.close()
    }
}
