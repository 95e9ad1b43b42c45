//! Core functionalities.
mod env;
mod policy;
mod step;
pub use env::Env;
pub use policy::Policy;
use std::fmt::Debug;
pub use step::{Info, Step};

/// An observation of an environment.
pub trait Obs: Clone + Debug {
    /// Returns the number of elements in the observation vector.
    fn len(&self) -> usize;
}

/// An action applied to an environment.
pub trait Act: Clone + Debug {
    /// Returns the number of elements in the action vector.
    fn len(&self) -> usize;
}
