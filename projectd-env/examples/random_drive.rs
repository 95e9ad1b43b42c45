use anyhow::Result;
use clap::Parser;
use projectd_core::{
    DefaultEvaluator, Env as _, Evaluator as _, Policy, TimeLimit, TimeLimitConfig,
};
use projectd_env::{
    py::PyProjectD, DriftAct, DriftEnv, DriftEnvConfig, DriftObs, Profile, ViewerConfig,
};
use std::{
    thread,
    time::{Duration, Instant},
};

type Env = TimeLimit<DriftEnv<PyProjectD, PyProjectD>>;

/// Drives the ProjectD car with uniformly random actions
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory holding the simulator's `bin` and `content` folders
    #[arg(long, default_value = ".")]
    asset_root: String,

    /// Environment config in YAML; overrides the other environment flags
    #[arg(long)]
    config: Option<String>,

    /// Use the telemetry profile instead of the playground profile
    #[arg(long, default_value_t = false)]
    telemetry: bool,

    /// Open the viewer
    #[arg(short, long, default_value_t = false)]
    render: bool,

    /// Sleep between steps so the car moves in real time
    #[arg(long, default_value_t = false)]
    realtime: bool,

    /// Steps per episode
    #[arg(long, default_value_t = 3000)]
    max_steps: usize,

    /// Number of episodes
    #[arg(short, long, default_value_t = 3)]
    episodes: usize,
}

struct RandomPolicy {
    n_act: usize,
    dt: Option<Duration>,
    last: Instant,
}

impl Policy<Env> for RandomPolicy {
    fn sample(&mut self, _: &DriftObs) -> DriftAct {
        if let Some(dt) = self.dt {
            let elapsed = self.last.elapsed();
            if elapsed < dt {
                thread::sleep(dt - elapsed);
            }
            self.last = Instant::now();
        }
        let a: Vec<f32> = (0..self.n_act)
            .map(|_| 2. * fastrand::f32() - 1.)
            .collect();
        a.into()
    }
}

fn env_config(args: &Args) -> Result<DriftEnvConfig> {
    if let Some(path) = &args.config {
        return DriftEnvConfig::load(path);
    }
    let profile = if args.telemetry {
        Profile::drift_telemetry()
    } else {
        Profile::drift_playground()
    };
    Ok(DriftEnvConfig::default()
        .asset_root(args.asset_root.as_str())
        .viewer(ViewerConfig::default().enabled(args.render))
        .profile(profile))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    fastrand::seed(42);

    let args = Args::parse();
    let config = TimeLimitConfig::new(env_config(&args)?, args.max_steps);
    let env = Env::build(&config, 0)?;

    let mut policy = RandomPolicy {
        n_act: env.action_space().len(),
        dt: args
            .realtime
            .then(|| Duration::from_secs_f64(config.env.sim_dt)),
        last: Instant::now(),
    };

    let mut evaluator = DefaultEvaluator::from_env(env, args.episodes);
    let record = evaluator.evaluate(&mut policy)?;
    println!(
        "mean return = {}, mean length = {}",
        record.get_scalar("Episode return")?,
        record.get_scalar("Episode length")?
    );

    evaluator.into_env().close()?;
    Ok(())
}
