//! Car state to bounded observation vectors.
use crate::{
    car::{CarState, Vec3},
    error::{ConfigError, EnvError},
    profile::{Axis, ObsFeature, ObsRanges, Profile},
    util::LinScale,
};
use log::trace;
use projectd_core::BoxSpace;

const RPM_MAX: f32 = 20000.0;

fn axis(v: &Vec3, a: Axis) -> f32 {
    match a {
        Axis::X => v.x,
        Axis::Y => v.y,
        Axis::Z => v.z,
    }
}

/// Builds fixed-length observation vectors from [`CarState`] snapshots.
///
/// The layout and its bounds are checked once at construction. Every
/// produced vector has the layout's length and lies inside its bounds;
/// values outside are clipped.
#[derive(Debug, Clone)]
pub struct ObservationBuilder {
    features: Vec<ObsFeature>,
    space: BoxSpace,
    rpm: LinScale,
}

impl ObservationBuilder {
    /// Derives the bounds of `features` from `ranges`.
    pub fn new(features: &[ObsFeature], ranges: &ObsRanges) -> Result<Self, ConfigError> {
        let (low, high) = features.iter().map(|f| f.bounds(ranges)).unzip();
        Self::from_parts(features.to_vec(), low, high)
    }

    /// Uses the layout and ranges of `profile`.
    pub fn from_profile(profile: &Profile) -> Result<Self, ConfigError> {
        Self::new(profile.get_observation(), profile.get_ranges())
    }

    /// Pairs a layout with explicit bound arrays.
    ///
    /// Fails unless the three sequences have the same length and every bound
    /// pair is finite and ordered.
    pub fn from_parts(
        features: Vec<ObsFeature>,
        low: Vec<f32>,
        high: Vec<f32>,
    ) -> Result<Self, ConfigError> {
        if features.is_empty() {
            return Err(ConfigError::EmptyObservation);
        }
        if features.len() != low.len() || features.len() != high.len() {
            return Err(ConfigError::ObservationBounds {
                features: features.len(),
                low: low.len(),
                high: high.len(),
            });
        }
        for (f, (&l, &h)) in features.iter().zip(low.iter().zip(high.iter())) {
            f.check_index()?;
            if !l.is_finite() || !h.is_finite() || l > h {
                return Err(ConfigError::InvalidBounds {
                    feature: f.label(),
                    low: l,
                    high: h,
                });
            }
        }
        let space = BoxSpace::new(low, high).map_err(|e| ConfigError::InvalidSetting {
            name: "observation bounds",
            reason: e.to_string(),
        })?;

        Ok(Self {
            features,
            space,
            rpm: LinScale::new(0.0, RPM_MAX, 0.0, 1.0)?,
        })
    }

    /// The observation layout.
    pub fn features(&self) -> &[ObsFeature] {
        &self.features
    }

    /// Length of the observation vector.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Always `false`; empty layouts are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Bounds of the observation vector.
    pub fn space(&self) -> &BoxSpace {
        &self.space
    }

    fn raw(&self, feature: ObsFeature, s: &CarState) -> f32 {
        // indices were checked in `from_parts`
        match feature {
            ObsFeature::BodyVsTrack => s.body_vs_track,
            ObsFeature::VelocityVsTrack => s.velocity_vs_track,
            ObsFeature::LookAhead(i) => s.look_ahead[i],
            ObsFeature::Probe(i) => s.probes[i],
            ObsFeature::Velocity(a) => axis(&s.velocity, a),
            ObsFeature::AngularVelocity(a) => axis(&s.angular_velocity, a),
            ObsFeature::TyreSlip(i) => s.tyre_slip[i],
            ObsFeature::EngineRpm => s.engine_rpm,
        }
    }

    /// Reads the layout's features out of `state`.
    ///
    /// Fails with [`EnvError::NonFiniteState`] instead of emitting NaN or infinities.
    pub fn build(&self, state: &CarState) -> Result<Vec<f32>, EnvError> {
        let mut obs = Vec::with_capacity(self.features.len());
        for &f in self.features.iter() {
            let v = self.raw(f, state);
            if !v.is_finite() {
                return Err(EnvError::NonFiniteState { feature: f.label() });
            }
            obs.push(match f {
                ObsFeature::EngineRpm => self.rpm.apply(v),
                _ => v,
            });
        }
        self.space.clip(&mut obs);
        trace!("obs = {:?}", obs);
        Ok(obs)
    }
}
