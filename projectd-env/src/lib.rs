#![warn(missing_docs)]
//! Episodic reinforcement learning environment over the ProjectD drift simulator.
//!
//! The simulator advances vehicle physics continuously; this crate turns it
//! into a discrete-step environment with the usual reset/step contract.
//!
//! ## Layers
//!
//! * [`sim::SimBackend`] and [`viewer::ViewerBackend`] describe the native
//!   simulator and viewer. [`sim::SimulationHandle`] owns one simulator
//!   instance and [`viewer::ViewerAttachment`] binds the viewer at most once.
//! * [`profile::Profile`] fixes one environment variant: action arity,
//!   observation layout, reward source and termination rules.
//! * [`action::ActionMapper`] and [`observation::ObservationBuilder`] convert
//!   between agent vectors and the simulator's control and state buffers.
//! * [`episode::EpisodeController`] runs the lifecycle and the per-tick logic.
//! * [`gym::DriftEnv`] implements [`projectd_core::Env`] on top of it.
//!
//! ## Example
//!
//! The [`mock`] backends stand in for the simulator, e.g. in tests:
//!
//! ```
//! use projectd_env::{
//!     mock::{MockSimulator, MockViewer},
//!     DriftEnvConfig, EpisodeController,
//! };
//!
//! let config = DriftEnvConfig::default();
//! let mut env: EpisodeController<_, MockViewer> =
//!     EpisodeController::new(config, MockSimulator::new(), None).unwrap();
//! env.init_sim().unwrap();
//!
//! let (obs, _info) = env.reset().unwrap();
//! assert_eq!(obs.len(), env.observation_space().len());
//!
//! let outcome = env.step(&[0.0, 1.0, -1.0]).unwrap();
//! assert!(!outcome.truncated);
//! assert_eq!(env.step_id(), 1);
//! env.close().unwrap();
//! ```
//!
//! With the `pyprojectd` feature, `py::PyProjectD` drives the real
//! simulator through its Python extension module.
pub mod action;
pub mod car;
pub mod config;
pub mod episode;
pub mod error;
pub mod gym;
pub mod mock;
pub mod observation;
pub mod profile;
pub mod sim;
pub mod termination;
pub mod util;
pub mod viewer;

#[cfg(feature = "pyprojectd")]
pub mod py;

pub use car::{CarControls, CarState};
pub use config::{DriftEnvConfig, ViewerConfig};
pub use episode::{ControllerState, EpisodeController, StepOutcome};
pub use error::{ConfigError, EnvError, SimError};
pub use gym::{DriftAct, DriftEnv, DriftObs};
pub use profile::Profile;
pub use sim::{SimBackend, TeleportMode};
pub use viewer::ViewerBackend;
