//! Termination conditions and their penalties.
use crate::{car::CarState, profile::TerminationConfig};

/// Why an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// The car touched an obstacle.
    Collision,
    /// The car left the track.
    OffTrack,
    /// The car reached no new track point within the stuck timeout.
    Stuck,
    /// The accumulated reward fell below the floor.
    RewardFloor,
}

impl TerminationReason {
    /// Short name used in info records and logs.
    pub fn label(self) -> &'static str {
        match self {
            TerminationReason::Collision => "collision",
            TerminationReason::OffTrack => "offtrack",
            TerminationReason::Stuck => "stuck",
            TerminationReason::RewardFloor => "low reward",
        }
    }
}

/// Outcome of checking one car state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Verdict {
    /// Conditions that hold, in check order.
    pub reasons: Vec<TerminationReason>,
    /// Sum of the penalties of `reasons`.
    pub penalty: f32,
}

impl Verdict {
    /// Returns `true` if any condition holds.
    pub fn is_terminal(&self) -> bool {
        !self.reasons.is_empty()
    }
}

/// Evaluates the enabled termination conditions.
///
/// Conditions are independent: each enabled one is checked, and the
/// penalties of all that hold are summed.
#[derive(Debug, Clone)]
pub struct TerminationCheck {
    config: TerminationConfig,
}

impl TerminationCheck {
    /// Creates the check.
    pub fn new(config: TerminationConfig) -> Self {
        Self { config }
    }

    /// Checks the state-based conditions: collision, off-track and stuck.
    pub fn evaluate(&self, state: &CarState) -> Verdict {
        let c = &self.config;
        let mut verdict = Verdict::default();

        if c.on_hit && state.collision_flag != 0 {
            verdict.reasons.push(TerminationReason::Collision);
            verdict.penalty += c.hit_penalty;
        }
        if c.off_track && state.out_of_track_flag != 0 {
            verdict.reasons.push(TerminationReason::OffTrack);
            verdict.penalty += c.off_track_penalty;
        }
        if c.when_stuck && state.last_track_point_timestamp + c.stuck_timeout < state.timestamp {
            verdict.reasons.push(TerminationReason::Stuck);
            verdict.penalty += c.stuck_penalty;
        }
        verdict
    }

    /// Returns `true` if the accumulated reward is below the floor.
    pub fn below_floor(&self, total_reward: f32) -> bool {
        total_reward < self.config.reward_floor
    }
}
