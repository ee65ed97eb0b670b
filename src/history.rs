use std::collections::VecDeque;
use nalgebra as na;

/// The most recent `capacity` positions of one marker, oldest first.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
	samples: VecDeque<na::Vector3<f32>>,
	capacity: usize,
}

impl HistoryBuffer {
	pub fn new(capacity: usize) -> Self {
		Self {
			samples: VecDeque::with_capacity(capacity),
			capacity,
		}
	}

	/// Append a sample, evicting from the front until we're back within capacity.
	pub fn push(&mut self, position: na::Vector3<f32>) {
		self.samples.push_back(position);
		while self.samples.len() > self.capacity {
			self.samples.pop_front();
		}
	}

	/// Arithmetic mean of everything held. Zero when empty.
	/// Recomputed from scratch on every call; capacity is small enough that a running sum isn't worth the drift.
	pub fn mean(&self) -> na::Vector3<f32> {
		if self.samples.is_empty() {
			return na::Vector3::zeros();
		}
		let sum = self.samples.iter().fold(na::Vector3::zeros(), |acc, p| acc + p);
		sum / self.samples.len() as f32
	}

	pub fn iter(&self) -> impl Iterator<Item = &na::Vector3<f32>> {
		self.samples.iter()
	}

	pub fn len(&self) -> usize {
		self.samples.len()
	}

	pub fn is_empty(&self) -> bool {
		self.samples.is_empty()
	}

	pub fn is_full(&self) -> bool {
		self.samples.len() >= self.capacity
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	pub fn clear(&mut self) {
		self.samples.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_empty_mean_is_zero() {
		let h = HistoryBuffer::new(30);
		assert!(h.is_empty());
		assert_eq!(h.mean(), na::Vector3::zeros());
	}

	#[test]
	fn test_eviction_keeps_newest_in_order() {
		let mut h = HistoryBuffer::new(3);
		for i in 0..5 {
			h.push(na::Vector3::new(i as f32, 0.0, 0.0));
		}
		assert_eq!(h.len(), 3);
		assert!(h.is_full());
		let xs: Vec<f32> = h.iter().map(|p| p.x).collect();
		assert_eq!(xs, vec![2.0, 3.0, 4.0]);
		assert_eq!(h.mean(), na::Vector3::new(3.0, 0.0, 0.0));
	}

	#[test]
	fn test_mean_of_partial_buffer() {
		let mut h = HistoryBuffer::new(60);
		h.push(na::Vector3::new(1.0, 2.0, 3.0));
		h.push(na::Vector3::new(3.0, 4.0, 5.0));
		assert!(!h.is_full());
		assert_eq!(h.mean(), na::Vector3::new(2.0, 3.0, 4.0));
	}

	#[test]
	fn test_clear() {
		let mut h = HistoryBuffer::new(2);
		h.push(na::Vector3::new(1.0, 1.0, 1.0));
		h.push(na::Vector3::new(1.0, 1.0, 1.0));
		assert!(h.is_full());
		h.clear();
		assert!(h.is_empty());
		assert!(!h.is_full());
		assert_eq!(h.capacity(), 2);
		assert_eq!(h.mean(), na::Vector3::zeros());
	}
}
