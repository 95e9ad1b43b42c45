//! Scalar helpers shared by the action and observation mappings.
use crate::error::ConfigError;

/// Clamps `x` into `[a, b]`.
#[inline]
pub fn clamp(x: f32, a: f32, b: f32) -> f32 {
    if x < a {
        a
    } else if x > b {
        b
    } else {
        x
    }
}

/// Maps `x` from `[x0, x1]` onto `[r0, r1]`, clamping `x` into its input range first.
///
/// `x0 < x1` is required; an empty or inverted input range is a
/// configuration error rather than a division by zero.
///
/// ```
/// use projectd_env::util::linscale;
///
/// assert_eq!(linscale(0.0, -1.0, 1.0, 0.0, 1.0).unwrap(), 0.5);
/// assert_eq!(linscale(5.0, -1.0, 1.0, 0.0, 1.0).unwrap(), 1.0);
/// assert!(linscale(0.0, 1.0, 1.0, 0.0, 1.0).is_err());
/// ```
pub fn linscale(x: f32, x0: f32, x1: f32, r0: f32, r1: f32) -> Result<f32, ConfigError> {
    Ok(LinScale::new(x0, x1, r0, r1)?.apply(x))
}

/// A validated linear scaling from `[x0, x1]` onto `[r0, r1]`.
///
/// Validation happens once in [`LinScale::new`], so applying the scale on
/// every tick cannot fail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinScale {
    x0: f32,
    x1: f32,
    r0: f32,
    r1: f32,
}

impl LinScale {
    /// Creates the scale, rejecting `x0 >= x1` and non-finite ends.
    pub fn new(x0: f32, x1: f32, r0: f32, r1: f32) -> Result<Self, ConfigError> {
        // `!(x0 < x1)` also catches NaN
        if !(x0 < x1) || !x0.is_finite() || !x1.is_finite() {
            return Err(ConfigError::DegenerateRange { x0, x1 });
        }
        if !r0.is_finite() || !r1.is_finite() {
            return Err(ConfigError::InvalidSetting {
                name: "linscale output range",
                reason: format!("[{}, {}] is not finite", r0, r1),
            });
        }
        Ok(Self { x0, x1, r0, r1 })
    }

    /// Scales `x`.
    #[inline]
    pub fn apply(&self, x: f32) -> f32 {
        let x = clamp(x, self.x0, self.x1);
        ((self.r1 - self.r0) * (x - self.x0)) / (self.x1 - self.x0) + self.r0
    }

    /// The output range `(r0, r1)`.
    pub fn output(&self) -> (f32, f32) {
        (self.r0, self.r1)
    }
}
