//! Errors in the environment.
use thiserror::Error;

/// Kind of a simulator asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// A track directory.
    Track,
    /// A car model directory.
    Car,
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetKind::Track => write!(f, "track"),
            AssetKind::Car => write!(f, "car"),
        }
    }
}

/// Failures reported by the simulator or viewer collaborator.
#[derive(Error, Debug, PartialEq)]
pub enum SimError {
    /// The simulator could not be created, e.g. its asset root is incomplete.
    #[error("simulator initialization failed: {0}")]
    Initialization(String),

    /// A track or car identifier is unknown.
    #[error("{kind} asset not found: {name}")]
    AssetNotFound {
        /// Kind of asset.
        kind: AssetKind,
        /// Requested identifier.
        name: String,
    },

    /// The handle was destroyed or never created.
    #[error("invalid simulator handle")]
    InvalidHandle,

    /// The car state could not be read after a tick.
    #[error("failed to read car state: {0}")]
    StateRead(String),

    /// Any other failure inside the simulator.
    #[error("simulator backend error: {0}")]
    Backend(String),

    /// Failure inside the viewer.
    #[error("viewer error: {0}")]
    Viewer(String),
}

/// Programmer errors detected at construction or on first use.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// The action vector does not match the profile's arity.
    #[error("action has {got} components, profile expects {expected}")]
    ActionArity {
        /// Arity of the profile.
        expected: usize,
        /// Length of the given action.
        got: usize,
    },

    /// The bound arrays do not match the observation layout.
    #[error("observation layout has {features} features but {low} low and {high} high bounds")]
    ObservationBounds {
        /// Number of features in the layout.
        features: usize,
        /// Length of the lower bounds.
        low: usize,
        /// Length of the upper bounds.
        high: usize,
    },

    /// A bound pair is not finite or not ordered.
    #[error("invalid bounds for {feature}: [{low}, {high}]")]
    InvalidBounds {
        /// Feature label.
        feature: String,
        /// Lower bound.
        low: f32,
        /// Upper bound.
        high: f32,
    },

    /// Scaling from an empty or inverted input interval.
    #[error("degenerate input range [{x0}, {x1}] in linear scaling")]
    DegenerateRange {
        /// Lower end of the input range.
        x0: f32,
        /// Upper end of the input range.
        x1: f32,
    },

    /// A feature refers to an element the car state does not have.
    #[error("{feature} is out of range, the car state has {available} elements")]
    FeatureIndex {
        /// Feature label.
        feature: String,
        /// Number of elements available.
        available: usize,
    },

    /// The observation layout is empty.
    #[error("observation layout is empty")]
    EmptyObservation,

    /// The viewer is enabled but no viewer backend was provided.
    #[error("viewer is enabled but no viewer backend was provided")]
    MissingViewer,

    /// Any other invalid setting.
    #[error("invalid setting `{name}`: {reason}")]
    InvalidSetting {
        /// Name of the setting.
        name: &'static str,
        /// Why it is rejected.
        reason: String,
    },
}

/// Errors of the episode controller.
#[derive(Error, Debug, PartialEq)]
pub enum EnvError {
    /// Collaborator failure.
    #[error(transparent)]
    Sim(#[from] SimError),

    /// Misconfiguration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// `init_sim` was called on a controller that already ran it.
    #[error("simulator is already initialized")]
    AlreadyInitialized,

    /// `init_sim` failed before; the controller must be discarded.
    #[error("simulator initialization failed previously, create a new controller")]
    InitFailed,

    /// `reset` or `step` before `init_sim`.
    #[error("simulator is not initialized")]
    NotInitialized,

    /// The controller was closed.
    #[error("environment is closed")]
    Closed,

    /// A previous tick failed; the episode must be reset.
    #[error("episode is corrupted by a failed tick, call reset()")]
    EpisodeCorrupted,

    /// An action component is NaN or infinite.
    #[error("action component {index} is not finite")]
    NonFiniteAction {
        /// Index of the component.
        index: usize,
    },

    /// The simulator produced a NaN or infinite value for an observed feature.
    #[error("simulator state value for {feature} is not finite")]
    NonFiniteState {
        /// Feature label.
        feature: String,
    },

    /// The viewer can be attached once per controller lifetime.
    #[error("viewer was already attached once")]
    ViewerAlreadyUsed,
}
