//! Bounded continuous spaces.
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// A box in `R^n` described by paired lower and upper bound arrays.
///
/// Both arrays always have the same length, every bound is finite and
/// `low[i] <= high[i]` holds for every element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxSpace {
    low: Vec<f32>,
    high: Vec<f32>,
}

impl BoxSpace {
    /// Creates a space from bound arrays, validating their shape and order.
    pub fn new(low: Vec<f32>, high: Vec<f32>) -> Result<Self, CoreError> {
        if low.len() != high.len() {
            return Err(CoreError::SpaceShapeMismatch {
                low: low.len(),
                high: high.len(),
            });
        }
        for (index, (&l, &h)) in low.iter().zip(high.iter()).enumerate() {
            if !l.is_finite() || !h.is_finite() || l > h {
                return Err(CoreError::InvalidSpaceBound {
                    index,
                    low: l,
                    high: h,
                });
            }
        }
        Ok(Self { low, high })
    }

    /// Creates an `n`-dimensional space with the same bounds on every axis.
    pub fn uniform(n: usize, low: f32, high: f32) -> Result<Self, CoreError> {
        Self::new(vec![low; n], vec![high; n])
    }

    /// Lower bounds.
    pub fn low(&self) -> &[f32] {
        &self.low
    }

    /// Upper bounds.
    pub fn high(&self) -> &[f32] {
        &self.high
    }

    /// Number of dimensions.
    pub fn len(&self) -> usize {
        self.low.len()
    }

    /// Returns `true` for a zero-dimensional space.
    pub fn is_empty(&self) -> bool {
        self.low.is_empty()
    }

    /// Returns `true` if `x` has the right length and lies inside the box.
    pub fn contains(&self, x: &[f32]) -> bool {
        x.len() == self.len()
            && x
                .iter()
                .zip(self.low.iter().zip(self.high.iter()))
                .all(|(v, (l, h))| *l <= *v && *v <= *h)
    }

    /// Clips `x` into the box in place. Extra elements beyond the space length are left untouched.
    pub fn clip(&self, x: &mut [f32]) {
        for (v, (l, h)) in x.iter_mut().zip(self.low.iter().zip(self.high.iter())) {
            *v = v.max(*l).min(*h);
        }
    }

    /// Draws a uniformly distributed point with `fastrand`.
    pub fn sample(&self) -> Vec<f32> {
        self.low
            .iter()
            .zip(self.high.iter())
            .map(|(l, h)| l + (h - l) * fastrand::f32())
            .collect()
    }
}
