#![warn(missing_docs)]
//! Core abstractions for reinforcement learning on the ProjectD simulator.
//!
//! The crate defines the framework side of the environment contract:
//!
//! * [`Env`] - an episodic MDP with `reset`/`step` and bounded spaces,
//! * [`Obs`], [`Act`] and [`Info`] - the values exchanged at every step,
//! * [`Step`] - the `(o_t+1, a_t, r_t, terminated, truncated, info)` tuple,
//! * [`BoxSpace`] - paired `(low, high)` bound arrays describing a space,
//! * [`record`] - key-value records used for info mappings and logging.
//!
//! On top of that it provides [`TimeLimit`], the step-limit wrapper owning
//! episode horizons, and [`DefaultEvaluator`] to measure a [`Policy`].
pub mod error;
pub mod record;

mod base;
pub use base::{Act, Env, Info, Obs, Policy, Step};

mod space;
pub use space::BoxSpace;

mod wrapper;
pub use wrapper::{TimeLimit, TimeLimitConfig};

mod evaluator;
pub use evaluator::{DefaultEvaluator, Evaluator};
