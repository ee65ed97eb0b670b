use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};

pub const DEFAULT_HISTORY_CAPACITY: usize = 30;
pub const LONG_HISTORY_CAPACITY: usize = 60;
pub const DEFAULT_MIN_SEPARATION: f32 = 0.5;

/// How the two slots are filled from a tick's candidate set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentPolicy {
	/// Keep seated identities for as long as they are visible. An empty first slot takes the first
	/// candidate seen; an empty second slot takes the first candidate at least `min_separation`
	/// away from the first slot's raw position. Tolerates candidate-order churn.
	#[default]
	OrderBased,
	/// Re-derive the pair from candidate order every tick: `candidates[0]` is first and the next
	/// candidate with a different identity is second. Fewer than two distinct identities drops the pair.
	/// Histories follow the identity, so a reordered pair keeps its averages.
	PresenceBased,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmootherConfig {
	/// Samples kept per identity (N).
	pub history_capacity: usize,
	/// Minimum distance between the first slot's raw position and a second-slot candidate (D).
	/// Inclusive. Only consulted by [`AssignmentPolicy::OrderBased`].
	pub min_separation: f32,
	pub policy: AssignmentPolicy,
	/// When set, the pair is only ready once both histories hold `history_capacity` samples.
	pub require_full_history: bool,
}

impl Default for SmootherConfig {
	fn default() -> Self {
		Self {
			history_capacity: DEFAULT_HISTORY_CAPACITY,
			min_separation: DEFAULT_MIN_SEPARATION,
			policy: AssignmentPolicy::OrderBased,
			require_full_history: true,
		}
	}
}

impl SmootherConfig {
	/// The 60-sample deployment profile.
	pub fn long_history() -> Self {
		Self {
			history_capacity: LONG_HISTORY_CAPACITY,
			..Self::default()
		}
	}

	/// Pairs whatever two markers are visible and acts on them right away.
	pub fn presence_based() -> Self {
		Self {
			policy: AssignmentPolicy::PresenceBased,
			require_full_history: false,
			..Self::default()
		}
	}

	pub fn validate(&self) -> Result<()> {
		if self.history_capacity == 0 {
			return Err(Error::InvalidConfig("history_capacity must be at least 1"));
		}
		if !self.min_separation.is_finite() || self.min_separation < 0.0 {
			return Err(Error::InvalidConfig("min_separation must be finite and non-negative"));
		}
		Ok(())
	}
}
