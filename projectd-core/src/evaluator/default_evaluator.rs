//! Default implementation of the [`Evaluator`] trait.
use super::Evaluator;
use crate::{
    record::{Record, RecordValue},
    Env, Policy,
};
use anyhow::Result;
use log::info;

/// Runs a fixed number of episodes and reports the average return.
///
/// Episodes run until the environment reports termination or truncation, so
/// an environment without a natural horizon should be wrapped in
/// [`TimeLimit`](crate::TimeLimit).
///
/// The returned [`Record`] holds `Episode return` and `Episode length`, both
/// averaged over the episodes.
pub struct DefaultEvaluator<E: Env> {
    n_episodes: usize,
    env: E,
}

impl<E: Env> Evaluator<E> for DefaultEvaluator<E> {
    fn evaluate<P>(&mut self, policy: &mut P) -> Result<Record>
    where
        P: Policy<E>,
    {
        let mut r_total = 0f32;
        let mut len_total = 0usize;

        for ix in 0..self.n_episodes {
            let (mut prev_obs, _) = self.env.reset_with_index(ix)?;
            let mut r_episode = 0f32;

            loop {
                let act = policy.sample(&prev_obs);
                let (step, _) = self.env.step(&act)?;
                r_episode += step.reward;
                len_total += 1;
                if step.is_done() {
                    break;
                }
                prev_obs = step.obs;
            }

            info!("episode {}: return = {}", ix, r_episode);
            r_total += r_episode;
        }

        let n = self.n_episodes.max(1) as f32;
        Ok(Record::from_slice(&[
            ("Episode return", RecordValue::Scalar(r_total / n)),
            ("Episode length", RecordValue::Scalar(len_total as f32 / n)),
        ]))
    }
}

impl<E: Env> DefaultEvaluator<E> {
    /// Builds the environment from `config` and creates the evaluator.
    pub fn new(config: &E::Config, seed: i64, n_episodes: usize) -> Result<Self> {
        Ok(Self {
            n_episodes,
            env: E::build(config, seed)?,
        })
    }

    /// Creates an evaluator on an already built environment.
    pub fn from_env(env: E, n_episodes: usize) -> Self {
        Self { n_episodes, env }
    }

    /// Returns the environment, e.g. to close it.
    pub fn into_env(self) -> E {
        self.env
    }
}
