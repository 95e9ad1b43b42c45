use anyhow::Result;
use projectd_core::{
    DefaultEvaluator, Env as _, Evaluator as _, Policy, TimeLimit, TimeLimitConfig,
};
use projectd_env::{
    mock::{MockCall, MockSimulator, MockViewer},
    DriftAct, DriftEnv, DriftEnvConfig, EnvError, Profile,
};

type MockEnv = DriftEnv<MockSimulator, MockViewer>;

struct RandomPolicy {
    n_act: usize,
}

impl<E: projectd_core::Env<Act = DriftAct>> Policy<E> for RandomPolicy {
    fn sample(&mut self, _obs: &E::Obs) -> DriftAct {
        let a: Vec<f32> = (0..self.n_act)
            .map(|_| fastrand::f32() * 2.0 - 1.0)
            .collect();
        a.into()
    }
}

#[test]
fn spaces_follow_profile() -> Result<()> {
    let env = MockEnv::build(&DriftEnvConfig::default(), 0)?;
    assert_eq!(env.action_space().len(), 3);
    assert_eq!(env.action_space().low().to_vec(), vec![-1.0f32; 3]);
    assert_eq!(env.observation_space().len(), 14);

    let config = DriftEnvConfig::default().profile(Profile::drift_telemetry());
    let env = MockEnv::build(&config, 0)?;
    assert_eq!(env.action_space().len(), 2);
    assert_eq!(env.observation_space().len(), 11);
    Ok(())
}

#[test]
fn step_observations_stay_in_bounds() -> Result<()> {
    fastrand::seed(42);
    let sim = MockSimulator::new();
    let world = sim.world();
    let mut env = MockEnv::from_backends(DriftEnvConfig::default(), sim, None)?;
    let space = env.observation_space();

    let (obs, _) = env.reset()?;
    assert!(space.contains(obs.0.as_slice().unwrap()));

    let mut policy = RandomPolicy { n_act: 3 };
    for i in 0..20 {
        {
            let mut w = world.borrow_mut();
            w.state.probes[i % 7] = 80.0 * fastrand::f32();
            w.state.body_vs_track = 2.0 * fastrand::f32() - 1.0;
        }
        let act = Policy::<MockEnv>::sample(&mut policy, &obs);
        let (step, record) = env.step(&act)?;
        assert!(space.contains(step.obs.0.as_slice().unwrap()));
        assert!(!step.is_truncated);
        assert_eq!(record.get_array1("act")?, act.0.to_vec());
        assert_eq!(step.info.get_scalar("step_id")?, (i + 1) as f32);
    }
    Ok(())
}

#[test]
fn time_limit_truncates_and_evaluator_averages() -> Result<()> {
    let config = TimeLimitConfig::new(DriftEnvConfig::default(), 25);
    let env = TimeLimit::<MockEnv>::build(&config, 0)?;
    let mut evaluator = DefaultEvaluator::from_env(env, 3);
    let mut policy = RandomPolicy { n_act: 3 };

    let record = evaluator.evaluate(&mut policy)?;
    assert_eq!(record.get_scalar("Episode length")?, 25.0);
    assert_eq!(record.get_scalar("Episode return")?, 0.0);

    let mut env = evaluator.into_env();
    env.close()?;
    env.close()?;
    Ok(())
}

#[test]
fn legacy_shapes() -> Result<()> {
    let sim = MockSimulator::new();
    let world = sim.world();
    let mut env = MockEnv::from_backends(DriftEnvConfig::default(), sim, None)?;

    let obs = env.reset_legacy()?;
    assert_eq!(obs.0.len(), 14);

    world.borrow_mut().state.out_of_track_flag = 1;
    let (obs, reward, done, info) = env.step_legacy(&vec![0.0, 0.0, 0.0].into())?;
    assert_eq!(obs.0.len(), 14);
    assert_eq!(reward, -100.0);
    assert!(done);
    assert_eq!(info.get_string("terminated_by")?, "offtrack");
    Ok(())
}

#[test]
fn errors_surface_through_anyhow() -> Result<()> {
    let mut env = MockEnv::build(&DriftEnvConfig::default(), 0)?;
    env.reset()?;
    let err = env.step(&vec![0.0].into()).err().expect("arity mismatch");
    assert!(matches!(
        err.downcast_ref::<EnvError>(),
        Some(EnvError::Config(_))
    ));
    Ok(())
}

#[test]
fn close_destroys_once() -> Result<()> {
    let sim = MockSimulator::new();
    let world = sim.world();
    let mut env = MockEnv::from_backends(DriftEnvConfig::default(), sim, None)?;
    env.close()?;
    drop(env);
    assert_eq!(world.borrow().count(|c| matches!(c, MockCall::Destroy)), 1);
    Ok(())
}
