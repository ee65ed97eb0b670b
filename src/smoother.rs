use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use nalgebra as na;
use tracing::{debug, trace, warn};

use crate::config::{AssignmentPolicy, SmootherConfig};
use crate::error::{Error, Result};
use crate::history::HistoryBuffer;

/// One of the two roles a tracked marker can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
	First,
	Second,
}

/// Everything a renderer needs to draw the pair: both endpoints, the line midpoint, and its length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairSnapshot {
	pub first: na::Vector3<f32>,
	pub second: na::Vector3<f32>,
	pub midpoint: na::Vector3<f32>,
	pub separation: f32,
}

/// Moving-average smoothing and two-slot pairing over externally tracked markers.
///
/// Drive it once per frame: [`ingest`](Self::ingest) every observation, then
/// [`assign_slots`](Self::assign_slots) with the same set ([`tick`](Self::tick) does both).
/// Holds no locks; a multi-threaded host must serialize access.
#[derive(Debug, Clone)]
pub struct MarkerSmoother<Id> {
	config: SmootherConfig,
	histories: HashMap<Id, HistoryBuffer>,
	first: Option<Id>,
	second: Option<Id>,
}

impl<Id> MarkerSmoother<Id> where Id: Clone + Eq + Hash + Debug {
	pub fn new(config: SmootherConfig) -> Result<Self> {
		config.validate()?;
		Ok(Self {
			config,
			histories: HashMap::new(),
			first: None,
			second: None,
		})
	}

	pub fn config(&self) -> &SmootherConfig {
		&self.config
	}

	/// Record one observation. Non-finite positions are rejected and leave the history untouched.
	pub fn ingest(&mut self, identity: Id, position: na::Vector3<f32>) -> Result<()> {
		if !is_finite(&position) {
			warn!(?identity, ?position, "rejecting non-finite marker sample");
			return Err(Error::InvalidSample { position });
		}
		trace!(?identity, ?position, "ingest");
		let capacity = self.config.history_capacity;
		self.histories.entry(identity).or_insert_with(|| HistoryBuffer::new(capacity)).push(position);
		Ok(())
	}

	/// Update slot membership from the identities visible this tick.
	///
	/// Identities missing from `candidates` lose their slot and their history. Under
	/// [`AssignmentPolicy::OrderBased`] a slot that receives a different identity starts that identity's
	/// average over from zero samples. Under [`AssignmentPolicy::PresenceBased`] slots are re-derived every
	/// tick and the averages follow the identity, so upstream reordering never restarts them.
	pub fn assign_slots(&mut self, candidates: &[(Id, na::Vector3<f32>)]) {
		let visible: HashSet<&Id> = candidates.iter().map(|(id, _)| id).collect();

		for slot in [Slot::First, Slot::Second] {
			let lost = matches!(self.slot_identity(slot), Some(id) if !visible.contains(id));
			if lost {
				debug!(?slot, identity = ?self.slot_identity(slot), "marker lost, releasing slot");
				*self.slot_mut(slot) = None;
			}
		}
		self.histories.retain(|id, _| visible.contains(id));

		let (first, second) = match self.config.policy {
			AssignmentPolicy::OrderBased => self.order_based(candidates),
			AssignmentPolicy::PresenceBased => presence_based(candidates),
		};
		let clear_on_seat = self.config.policy == AssignmentPolicy::OrderBased;
		self.seat(Slot::First, first, clear_on_seat);
		self.seat(Slot::Second, second, clear_on_seat);
	}

	/// Ingest every observation and then assign slots from the same set.
	/// Returns how many samples were rejected; a bad sample never aborts the tick.
	pub fn tick(&mut self, observations: &[(Id, na::Vector3<f32>)]) -> usize {
		let mut rejected = 0;
		for (id, position) in observations {
			if self.ingest(id.clone(), *position).is_err() {
				rejected += 1;
			}
		}
		self.assign_slots(observations);
		rejected
	}

	/// Mean of the slot's history. Zero if the slot is empty or nothing has been recorded yet.
	/// Check [`is_pair_ready`](Self::is_pair_ready) or [`slot_identity`](Self::slot_identity) before trusting it.
	pub fn smoothed_position(&self, slot: Slot) -> na::Vector3<f32> {
		self.slot_history(slot).map(HistoryBuffer::mean).unwrap_or_else(na::Vector3::zeros)
	}

	/// Both slots seated with at least one sample each, and full histories if the config asks for them.
	pub fn is_pair_ready(&self) -> bool {
		let (first, second) = match (self.slot_history(Slot::First), self.slot_history(Slot::Second)) {
			(Some(f), Some(s)) => (f, s),
			_ => return false,
		};
		if self.config.require_full_history {
			first.is_full() && second.is_full()
		} else {
			!first.is_empty() && !second.is_empty()
		}
	}

	pub fn pair_snapshot(&self) -> Option<PairSnapshot> {
		if !self.is_pair_ready() {
			return None;
		}
		let first = self.smoothed_position(Slot::First);
		let second = self.smoothed_position(Slot::Second);
		Some(PairSnapshot {
			first,
			second,
			midpoint: (first + second) * 0.5,
			separation: (second - first).magnitude(),
		})
	}

	pub fn slot_identity(&self, slot: Slot) -> Option<&Id> {
		match slot {
			Slot::First => self.first.as_ref(),
			Slot::Second => self.second.as_ref(),
		}
	}

	pub fn history(&self, identity: &Id) -> Option<&HistoryBuffer> {
		self.histories.get(identity)
	}

	pub fn tracked_identities(&self) -> impl Iterator<Item = &Id> {
		self.histories.keys()
	}

	/// Forget every history and release both slots.
	pub fn reset(&mut self) {
		debug!("resetting marker smoother");
		self.histories.clear();
		self.first = None;
		self.second = None;
	}

	fn order_based(&self, candidates: &[(Id, na::Vector3<f32>)]) -> (Option<Id>, Option<Id>) {
		let mut first = self.first.clone();
		let mut second = self.second.clone();

		if first.is_none() {
			// No preference: whoever shows up first that isn't already holding the other slot.
			first = candidates.iter()
				.find(|(id, p)| Some(id) != second.as_ref() && is_finite(p))
				.map(|(id, _)| id.clone());
		}

		if second.is_none() {
			if let Some(first_id) = first.as_ref() {
				// Compare against the raw position this tick, not the average.
				let anchor = candidates.iter().find(|(id, _)| id == first_id).map(|(_, p)| *p);
				if let Some(anchor) = anchor {
					let min_separation = self.config.min_separation;
					second = candidates.iter()
						.find(|(id, p)| id != first_id && (p - anchor).magnitude() >= min_separation)
						.map(|(id, _)| id.clone());
				}
			}
		}

		(first, second)
	}

	/// Put `identity` in `slot`. With `clear_history`, a newly seated identity's buffer is emptied.
	/// Seating happens after this tick's `ingest`, so that also drops the seating tick's own sample:
	/// a fresh occupant reaches a full history of N samples on the N+1th tick it is seen.
	fn seat(&mut self, slot: Slot, identity: Option<Id>, clear_history: bool) {
		if self.slot_identity(slot) == identity.as_ref() {
			return;
		}
		match identity.as_ref() {
			Some(id) => {
				debug!(?slot, identity = ?id, "seating marker");
				if clear_history {
					if let Some(history) = self.histories.get_mut(id) {
						history.clear();
					}
				}
			}
			None => debug!(?slot, "slot released"),
		}
		*self.slot_mut(slot) = identity;
	}

	fn slot_mut(&mut self, slot: Slot) -> &mut Option<Id> {
		match slot {
			Slot::First => &mut self.first,
			Slot::Second => &mut self.second,
		}
	}

	fn slot_history(&self, slot: Slot) -> Option<&HistoryBuffer> {
		self.slot_identity(slot).and_then(|id| self.histories.get(id))
	}
}

fn presence_based<Id: Clone + Eq>(candidates: &[(Id, na::Vector3<f32>)]) -> (Option<Id>, Option<Id>) {
	let first = match candidates.first() {
		Some((id, _)) => id,
		None => return (None, None),
	};
	// Upstream may report the same marker twice; the pair has to be two different markers.
	match candidates.iter().find(|(id, _)| id != first) {
		Some((second, _)) => (Some(first.clone()), Some(second.clone())),
		None => (None, None),
	}
}

fn is_finite(p: &na::Vector3<f32>) -> bool {
	p.iter().all(|c| c.is_finite())
}
