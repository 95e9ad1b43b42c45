//! Agent actions to driver inputs.
use crate::{
    car::CarControls,
    error::{ConfigError, EnvError},
    profile::{ActionArity, Profile},
    util::{clamp, LinScale},
};

/// Maps action vectors in `[-1, 1]` onto [`CarControls`].
///
/// Components are `[steer, gas]` or `[steer, gas, brake]` depending on the
/// profile's arity. Out-of-range values are clamped; NaN and infinities are
/// rejected before anything is written.
#[derive(Debug, Clone)]
pub struct ActionMapper {
    arity: ActionArity,
    gas: LinScale,
    brake: Option<LinScale>,
    auto_clutch: bool,
    manual_gear: Option<u8>,
}

impl ActionMapper {
    /// Creates the mapper, failing if the gas or brake range is unusable.
    pub fn new(profile: &Profile) -> Result<Self, ConfigError> {
        let (min_gas, max_gas) = profile.gas_range();
        let (min_brake, max_brake) = profile.brake_range();
        let arity = profile.get_arity();
        let assists = profile.get_assists();

        Ok(Self {
            arity,
            gas: LinScale::new(-1.0, 1.0, min_gas, max_gas)?,
            brake: match arity {
                ActionArity::Three => Some(LinScale::new(-1.0, 1.0, min_brake, max_brake)?),
                ActionArity::Two => None,
            },
            auto_clutch: assists.auto_clutch,
            manual_gear: if assists.auto_shift {
                None
            } else {
                Some(profile.get_manual_gear())
            },
        })
    }

    /// Length of the action vectors accepted by [`ActionMapper::map`].
    pub fn arity(&self) -> usize {
        self.arity.len()
    }

    /// Writes `action` into `controls`.
    ///
    /// The clutch is written only when auto-clutch is on; otherwise it keeps
    /// whatever the caller left in the buffer.
    pub fn map(&self, action: &[f32], controls: &mut CarControls) -> Result<(), EnvError> {
        if action.len() != self.arity() {
            return Err(ConfigError::ActionArity {
                expected: self.arity(),
                got: action.len(),
            }
            .into());
        }
        if let Some(index) = action.iter().position(|a| !a.is_finite()) {
            return Err(EnvError::NonFiniteAction { index });
        }

        controls.steer = clamp(action[0], -1.0, 1.0);
        controls.gas = self.gas.apply(action[1]);
        controls.brake = match &self.brake {
            Some(brake) => brake.apply(action[2]),
            None => 0.0,
        };
        controls.hand_brake = 0.0;
        if self.auto_clutch {
            controls.clutch = 1.0;
        }
        controls.requested_gear = self.manual_gear;
        Ok(())
    }
}
