use projectd_env::{
    error::{AssetKind, ConfigError, EnvError, SimError},
    mock::{MockCall, MockSimulator, MockViewer, MockWorld, ViewerLog},
    profile::{Profile, RewardSource, TeleportConfig, TerminationConfig},
    ControllerState, DriftEnvConfig, EpisodeController, TeleportMode, ViewerConfig,
};
use std::{cell::RefCell, rc::Rc};

type Controller = EpisodeController<MockSimulator, MockViewer>;

fn controller(config: DriftEnvConfig) -> (Controller, Rc<RefCell<MockWorld>>) {
    let sim = MockSimulator::new();
    let world = sim.world();
    let mut env = EpisodeController::new(config, sim, None).unwrap();
    env.init_sim().unwrap();
    (env, world)
}

fn with_viewer(
    config: DriftEnvConfig,
) -> (Controller, Rc<RefCell<MockWorld>>, Rc<RefCell<ViewerLog>>) {
    let sim = MockSimulator::new();
    let world = sim.world();
    let viewer = MockViewer::new();
    let log = viewer.log();
    let mut env = EpisodeController::new(config, sim, Some(viewer)).unwrap();
    env.init_sim().unwrap();
    (env, world, log)
}

const ZERO: [f32; 3] = [0.0, 0.0, 0.0];

#[test]
fn init_applies_profile() {
    let (env, world) = controller(DriftEnvConfig::default());
    assert_eq!(env.state(), ControllerState::SimReady);
    assert!(env.sim_initialized());

    let w = world.borrow();
    assert_eq!(w.calls[0], MockCall::Create);
    assert_eq!(w.calls[1], MockCall::LoadTrack("driftplayground".to_string()));
    assert_eq!(
        w.calls[2],
        MockCall::AddCar("ks_toyota_supra_mkiv_drift".to_string())
    );
    assert_eq!(w.calls[3], MockCall::Teleport(TeleportMode::Random, None));
    assert_eq!(
        w.calls[4],
        MockCall::SetAutoTeleport {
            on_hit: false,
            off_track: false,
            mode: TeleportMode::Random
        }
    );
    assert_eq!(w.count(|c| matches!(c, MockCall::SetTune(..))), 6);
    assert_eq!(w.count(|c| matches!(c, MockCall::SetScoringVar(..))), 21);
    assert!(w
        .calls
        .contains(&MockCall::SetScoringVar("OutOfTrackThreshold".to_string(), 0.51)));
}

#[test]
fn init_without_tunes() {
    let profile = Profile::drift_playground().clear_tunes();
    let (_env, world) = controller(DriftEnvConfig::default().profile(profile));
    let w = world.borrow();
    assert_eq!(w.count(|c| matches!(c, MockCall::SetTune(..))), 0);
    assert_eq!(w.count(|c| matches!(c, MockCall::SetScoringVar(..))), 21);
}

#[test]
fn init_uses_spline_offset() {
    let profile = Profile::drift_playground().teleport(TeleportConfig {
        start_offset: Some(0.25),
        ..TeleportConfig::default()
    });
    let (_env, world) = controller(DriftEnvConfig::default().profile(profile));
    assert!(world
        .borrow()
        .calls
        .contains(&MockCall::Teleport(TeleportMode::Random, Some(0.25))));
}

#[test]
fn double_init_fails_fast() {
    let (mut env, world) = controller(DriftEnvConfig::default());
    assert_eq!(env.init_sim(), Err(EnvError::AlreadyInitialized));
    assert_eq!(world.borrow().count(|c| matches!(c, MockCall::Create)), 1);
}

#[test]
fn failed_init_cannot_be_retried() {
    let sim = MockSimulator::new();
    let world = sim.world();
    let config = DriftEnvConfig::default().track("nowhere");
    let mut env: Controller = EpisodeController::new(config, sim, None).unwrap();

    assert_eq!(
        env.init_sim(),
        Err(EnvError::Sim(SimError::AssetNotFound {
            kind: AssetKind::Track,
            name: "nowhere".to_string()
        }))
    );
    assert_eq!(env.state(), ControllerState::Failed);
    assert_eq!(env.init_sim(), Err(EnvError::InitFailed));
    assert_eq!(env.reset().unwrap_err(), EnvError::InitFailed);
    // the partially built simulator was released
    assert_eq!(world.borrow().live_instances(), 0);
}

#[test]
fn reset_before_init_is_refused() {
    let mut env: Controller =
        EpisodeController::new(DriftEnvConfig::default(), MockSimulator::new(), None).unwrap();
    assert_eq!(env.reset().unwrap_err(), EnvError::NotInitialized);
    assert_eq!(env.step(&ZERO).unwrap_err(), EnvError::NotInitialized);
}

#[test]
fn reset_zeroes_counters() {
    let (mut env, world) = controller(DriftEnvConfig::default());
    world.borrow_mut().state.step_reward = 2.0;
    env.reset().unwrap();
    for _ in 0..5 {
        env.step(&ZERO).unwrap();
    }
    assert_eq!(env.step_id(), 5);
    assert_eq!(env.total_reward(), 10.0);

    let (obs, info) = env.reset().unwrap();
    assert_eq!(env.step_id(), 0);
    assert_eq!(env.total_reward(), 0.0);
    assert_eq!(obs.len(), 14);
    assert!(info.is_empty());
}

#[test]
fn reset_teleports_and_ticks_once() {
    let (mut env, world) = controller(DriftEnvConfig::default());
    world.borrow_mut().calls.clear();
    env.reset().unwrap();

    let w = world.borrow();
    assert_eq!(w.calls[0], MockCall::Teleport(TeleportMode::Random, None));
    assert_eq!(w.count(|c| matches!(c, MockCall::Step(_))), 1);
    let controls = w.last_controls().unwrap();
    assert!((controls.gas - 0.55).abs() < 1e-6);
    assert_eq!(controls.steer, 0.0);
    assert_eq!(env.controls(), &controls);
}

#[test]
fn reset_without_teleport() {
    let profile = Profile::drift_playground().teleport(TeleportConfig {
        on_reset: false,
        ..TeleportConfig::default()
    });
    let (mut env, world) = controller(DriftEnvConfig::default().profile(profile));
    world.borrow_mut().calls.clear();
    env.reset().unwrap();
    assert_eq!(
        world.borrow().count(|c| matches!(c, MockCall::Teleport(..))),
        0
    );
}

#[test]
fn every_step_advances_exactly_one_tick() {
    let (mut env, world) = controller(DriftEnvConfig::default().sim_dt(0.01));
    env.reset().unwrap();
    world.borrow_mut().calls.clear();
    for _ in 0..4 {
        env.step(&ZERO).unwrap();
    }
    let w = world.borrow();
    assert_eq!(w.count(|c| *c == MockCall::Step(0.01)), 4);
    assert_eq!(w.count(|c| matches!(c, MockCall::SetControls { smooth: true, .. })), 4);
    assert_eq!(w.count(|c| matches!(c, MockCall::GetState)), 4);
}

#[test]
fn truncated_is_always_false() {
    let (mut env, _world) = controller(DriftEnvConfig::default());
    env.reset().unwrap();
    for _ in 0..50 {
        assert!(!env.step(&ZERO).unwrap().truncated);
    }
}

#[test]
fn collision_penalty_and_termination() {
    let (mut env, world) = controller(DriftEnvConfig::default());
    env.reset().unwrap();
    {
        let mut w = world.borrow_mut();
        w.state.step_reward = 1.5;
        w.state.collision_flag = 1;
    }
    let outcome = env.step(&ZERO).unwrap();
    assert!(outcome.terminated);
    assert_eq!(outcome.reward, 1.5 - 100.0);
    assert_eq!(env.total_reward(), 1.5 - 100.0);
    assert_eq!(outcome.info.get_string("terminated_by").unwrap(), "collision");
    assert_eq!(env.car_state().collision_flag, 1);
}

#[test]
fn disabled_condition_leaves_the_others_active() {
    let off_track_off = TerminationConfig {
        off_track: false,
        ..TerminationConfig::default()
    };
    let collision_off = TerminationConfig {
        on_hit: false,
        ..TerminationConfig::default()
    };
    let cases = [(off_track_off, "collision"), (collision_off, "offtrack")];
    for (termination, label) in cases.iter() {
        let profile = Profile::drift_playground().termination(*termination);
        let (mut env, world) = controller(DriftEnvConfig::default().profile(profile));
        env.reset().unwrap();
        {
            let mut w = world.borrow_mut();
            w.state.collision_flag = 1;
            w.state.out_of_track_flag = 1;
        }
        let outcome = env.step(&ZERO).unwrap();
        assert!(outcome.terminated);
        assert_eq!(outcome.reward, -100.0);
        assert_eq!(outcome.info.get_string("terminated_by").unwrap(), *label);
    }
}

#[test]
fn collision_and_off_track_penalties_add_up() {
    let (mut env, world) = controller(DriftEnvConfig::default());
    env.reset().unwrap();
    {
        let mut w = world.borrow_mut();
        w.state.collision_flag = 1;
        w.state.out_of_track_flag = 1;
    }
    let outcome = env.step(&ZERO).unwrap();
    assert!(outcome.terminated);
    assert_eq!(outcome.reward, -200.0);
    assert_eq!(
        outcome.info.get_string("terminated_by").unwrap(),
        "collision,offtrack"
    );
}

#[test]
fn stuck_car_terminates() {
    let (mut env, world) = controller(DriftEnvConfig::default().sim_dt(1.0));
    env.reset().unwrap();
    world.borrow_mut().auto_progress = false;

    // progress was last seen at the reset tick; 5 s later the car is not stuck yet
    for _ in 0..5 {
        assert!(!env.step(&ZERO).unwrap().terminated);
    }
    let outcome = env.step(&ZERO).unwrap();
    assert!(outcome.terminated);
    assert_eq!(outcome.reward, 0.0);
    assert_eq!(outcome.info.get_string("terminated_by").unwrap(), "stuck");
}

#[test]
fn reward_floor_terminates_without_penalty() {
    let termination = TerminationConfig {
        reward_floor: -10.0,
        ..TerminationConfig::default()
    };
    let profile = Profile::drift_playground().termination(termination);
    let (mut env, world) = controller(DriftEnvConfig::default().profile(profile));
    env.reset().unwrap();
    world.borrow_mut().state.step_reward = -4.0;

    assert!(!env.step(&ZERO).unwrap().terminated);
    assert!(!env.step(&ZERO).unwrap().terminated);
    let outcome = env.step(&ZERO).unwrap();
    assert!(outcome.terminated);
    assert_eq!(outcome.reward, -4.0);
    assert_eq!(env.total_reward(), -12.0);
    assert_eq!(
        outcome.info.get_string("terminated_by").unwrap(),
        "low reward"
    );
}

#[test]
fn drift_reward_source() {
    let config = DriftEnvConfig::default().profile(Profile::drift_telemetry());
    let (mut env, world) = controller(config);
    assert_eq!(
        env.config().profile.get_reward_source(),
        RewardSource::DriftReward
    );
    env.reset().unwrap();
    {
        let mut w = world.borrow_mut();
        w.state.step_reward = 5.0;
        w.state.drift_reward = 0.75;
    }
    let outcome = env.step(&[0.0, 0.0]).unwrap();
    assert_eq!(outcome.reward, 0.75);
    assert_eq!(outcome.obs.len(), 11);
}

#[test]
fn missing_drift_reward_only_fails_drift_profiles() {
    let config = DriftEnvConfig::default().profile(Profile::drift_telemetry());
    let (mut env, world) = controller(config);
    env.reset().unwrap();
    world.borrow_mut().state.drift_reward = f32::NAN;
    assert_eq!(
        env.step(&[0.0, 0.0]).unwrap_err(),
        EnvError::NonFiniteState {
            feature: "reward".to_string()
        }
    );

    let (mut env, world) = controller(DriftEnvConfig::default());
    env.reset().unwrap();
    world.borrow_mut().state.drift_reward = f32::NAN;
    assert!(!env.step(&ZERO).unwrap().terminated);
}

#[test]
fn wrong_action_length_is_a_config_error() {
    let (mut env, world) = controller(DriftEnvConfig::default());
    env.reset().unwrap();
    world.borrow_mut().calls.clear();
    assert_eq!(
        env.step(&[0.0, 0.0]).unwrap_err(),
        EnvError::Config(ConfigError::ActionArity {
            expected: 3,
            got: 2
        })
    );
    assert!(world.borrow().calls.is_empty());
    // nothing was ticked, the episode goes on
    env.step(&ZERO).unwrap();
    assert_eq!(env.step_id(), 1);
}

#[test]
fn state_read_failure_corrupts_episode() {
    let (mut env, world) = controller(DriftEnvConfig::default());
    env.reset().unwrap();
    env.step(&ZERO).unwrap();

    world.borrow_mut().fail_get_state = true;
    assert!(matches!(
        env.step(&ZERO),
        Err(EnvError::Sim(SimError::StateRead(_)))
    ));
    world.borrow_mut().fail_get_state = false;
    assert_eq!(env.step(&ZERO).unwrap_err(), EnvError::EpisodeCorrupted);

    env.reset().unwrap();
    env.step(&ZERO).unwrap();
}

#[test]
fn non_finite_state_is_an_error() {
    let (mut env, world) = controller(DriftEnvConfig::default());
    env.reset().unwrap();
    world.borrow_mut().state.probes[2] = f32::INFINITY;
    assert!(matches!(
        env.step(&ZERO),
        Err(EnvError::NonFiniteState { .. })
    ));
}

#[test]
fn viewer_attaches_on_the_eleventh_step() {
    let config = DriftEnvConfig::default().viewer(ViewerConfig::default().enabled(true));
    let (mut env, _world, log) = with_viewer(config);
    env.reset().unwrap();

    for _ in 0..10 {
        env.step(&ZERO).unwrap();
        assert!(!env.viewer_initialized());
    }
    assert_eq!(log.borrow().inits(), 0);

    env.step(&ZERO).unwrap();
    assert!(env.viewer_initialized());
    assert_eq!(log.borrow().inits(), 1);
    assert_eq!(log.borrow().ticks(), 1);

    for _ in 0..5 {
        env.step(&ZERO).unwrap();
    }
    // resets do not re-attach
    env.reset().unwrap();
    for _ in 0..20 {
        env.step(&ZERO).unwrap();
    }
    assert_eq!(log.borrow().inits(), 1);
    assert_eq!(log.borrow().ticks(), 1 + 5 + 1 + 20);
}

#[test]
fn exited_viewer_is_skipped() {
    let config =
        DriftEnvConfig::default().viewer(ViewerConfig::default().enabled(true).warmup_steps(0));
    let (mut env, world, log) = with_viewer(config);
    env.reset().unwrap();
    env.step(&ZERO).unwrap();
    assert_eq!(log.borrow().ticks(), 1);

    log.borrow_mut().exited = true;
    let steps_before = world.borrow().count(|c| matches!(c, MockCall::Step(_)));
    env.step(&ZERO).unwrap();
    env.step(&ZERO).unwrap();

    assert_eq!(log.borrow().ticks(), 1);
    assert_eq!(log.borrow().shuts(), 1);
    assert_eq!(log.borrow().inits(), 1);
    assert_eq!(
        world.borrow().count(|c| matches!(c, MockCall::Step(_))),
        steps_before + 2
    );
    assert!(env.viewer_initialized());
}

#[test]
fn enabled_viewer_requires_backend() {
    let config = DriftEnvConfig::default().viewer(ViewerConfig::default().enabled(true));
    let err =
        EpisodeController::<MockSimulator, MockViewer>::new(config, MockSimulator::new(), None)
            .err();
    assert_eq!(err, Some(ConfigError::MissingViewer));
}

#[test]
fn invalid_configuration_fails_fast() {
    let err = EpisodeController::<MockSimulator, MockViewer>::new(
        DriftEnvConfig::default().sim_dt(0.0),
        MockSimulator::new(),
        None,
    )
    .err();
    assert!(matches!(err, Some(ConfigError::InvalidSetting { .. })));

    let profile = Profile::drift_playground().min_gas(0.5).max_gas(0.1);
    let err = EpisodeController::<MockSimulator, MockViewer>::new(
        DriftEnvConfig::default().profile(profile),
        MockSimulator::new(),
        None,
    )
    .err();
    assert!(err.is_some());
}

#[test]
fn close_is_idempotent() {
    let config =
        DriftEnvConfig::default().viewer(ViewerConfig::default().enabled(true).warmup_steps(0));
    let (mut env, world, log) = with_viewer(config);
    env.reset().unwrap();
    env.step(&ZERO).unwrap();

    env.close().unwrap();
    env.close().unwrap();
    assert_eq!(env.state(), ControllerState::Closed);
    assert!(!env.sim_initialized());
    assert!(!env.viewer_initialized());
    assert_eq!(env.step(&ZERO).unwrap_err(), EnvError::Closed);
    assert_eq!(env.init_sim(), Err(EnvError::Closed));

    drop(env);
    assert_eq!(world.borrow().count(|c| matches!(c, MockCall::Destroy)), 1);
    assert_eq!(world.borrow().live_instances(), 0);
    assert_eq!(log.borrow().shuts(), 1);
}

#[test]
fn drop_releases_simulator() {
    let (env, world) = controller(DriftEnvConfig::default());
    assert_eq!(world.borrow().live_instances(), 1);
    drop(env);
    assert_eq!(world.borrow().live_instances(), 0);
    assert_eq!(world.borrow().count(|c| matches!(c, MockCall::Destroy)), 1);
}
