use anyhow::Result;
use projectd_core::{
    record::Record, Act, BoxSpace, DefaultEvaluator, Env, Evaluator as _, Obs, Policy, Step,
    TimeLimit, TimeLimitConfig,
};

#[derive(Clone, Debug)]
struct CounterObs(f32);

impl Obs for CounterObs {
    fn len(&self) -> usize {
        1
    }
}

#[derive(Clone, Debug)]
struct CounterAct(f32);

impl Act for CounterAct {
    fn len(&self) -> usize {
        1
    }
}

/// Pays the action as reward and terminates once the counter reaches `terminal_at`.
struct CounterEnv {
    counter: usize,
    terminal_at: Option<usize>,
}

impl Env for CounterEnv {
    type Config = Option<usize>;
    type Obs = CounterObs;
    type Act = CounterAct;
    type Info = ();

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            counter: 0,
            terminal_at: *config,
        })
    }

    fn reset(&mut self) -> Result<(Self::Obs, Record)> {
        self.counter = 0;
        Ok((CounterObs(0.0), Record::empty()))
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        self.counter += 1;
        let terminated = self.terminal_at.map_or(false, |t| self.counter >= t);
        let step = Step::new(
            CounterObs(self.counter as f32),
            a.clone(),
            a.0,
            terminated,
            false,
            (),
        );
        Ok((step, Record::empty()))
    }

    fn observation_space(&self) -> BoxSpace {
        BoxSpace::uniform(1, 0.0, 1e6).unwrap()
    }

    fn action_space(&self) -> BoxSpace {
        BoxSpace::uniform(1, -1.0, 1.0).unwrap()
    }
}

struct ConstPolicy(f32);

impl<E: Env<Act = CounterAct>> Policy<E> for ConstPolicy {
    fn sample(&mut self, _obs: &E::Obs) -> CounterAct {
        CounterAct(self.0)
    }
}

#[test]
fn test_truncates_at_limit() -> Result<()> {
    let mut env = TimeLimit::<CounterEnv>::build(&TimeLimitConfig::new(None, 3), 0)?;
    env.reset()?;

    for _ in 0..2 {
        let (step, record) = env.step(&CounterAct(1.0))?;
        assert!(!step.is_done());
        assert!(!record.contains_key("episode_length"));
    }
    let (step, record) = env.step(&CounterAct(1.0))?;
    assert!(step.is_truncated);
    assert!(!step.is_terminated);
    assert_eq!(record.get_scalar("episode_length")?, 3.0);
    assert_eq!(env.count_steps(), 0);

    Ok(())
}

#[test]
fn test_termination_is_not_reported_as_truncation() -> Result<()> {
    let mut env = TimeLimit::<CounterEnv>::build(&TimeLimitConfig::new(Some(2), 2), 0)?;
    env.reset()?;
    env.step(&CounterAct(0.0))?;
    let (step, _) = env.step(&CounterAct(0.0))?;
    assert!(step.is_terminated);
    assert!(!step.is_truncated);
    Ok(())
}

#[test]
fn test_default_evaluator_averages_returns() -> Result<()> {
    let config = TimeLimitConfig::new(None, 5);
    let mut evaluator = DefaultEvaluator::<TimeLimit<CounterEnv>>::new(&config, 0, 4)?;
    let record = evaluator.evaluate(&mut ConstPolicy(0.5))?;

    assert_eq!(record.get_scalar("Episode return")?, 2.5);
    assert_eq!(record.get_scalar("Episode length")?, 5.0);
    Ok(())
}

#[test]
fn test_serde_time_limit_config() -> Result<()> {
    let config = TimeLimitConfig::new(Some(7usize), 40000).max_steps(80000);
    let dir = tempdir::TempDir::new("time_limit_config")?;
    let path = dir.path().join("time_limit.yaml");

    config.save(&path)?;
    let config_ = TimeLimitConfig::<Option<usize>>::load(&path)?;
    assert_eq!(config, config_);
    assert_eq!(config_.max_steps, 80000);
    Ok(())
}
