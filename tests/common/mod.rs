use marker_smoother::{MarkerSmoother, SmootherConfig};
use nalgebra as na;
use rand::prelude::*;

pub type Frame = Vec<(u32, na::Vector3<f32>)>;

pub fn smoother_with_capacity(capacity: usize) -> MarkerSmoother<u32> {
	MarkerSmoother::new(SmootherConfig { history_capacity: capacity, ..SmootherConfig::default() }).unwrap()
}

pub fn random_position(rng: &mut impl Rng, extent: f32) -> na::Vector3<f32> {
	na::Vector3::new(
		rng.random_range(-extent..extent),
		rng.random_range(-extent..extent),
		rng.random_range(-extent..extent),
	)
}

/// Two markers `separation` apart along x with per-frame jitter, listed in a random order.
pub fn jittered_pair(rng: &mut impl Rng, separation: f32, jitter: f32) -> Frame {
	let mut frame = vec![
		(1, na::Vector3::new(0.0, 0.0, 0.0) + random_position(rng, jitter)),
		(2, na::Vector3::new(separation, 0.0, 0.0) + random_position(rng, jitter)),
	];
	frame.shuffle(rng);
	frame
}

pub fn approx_eq(a: &na::Vector3<f32>, b: &na::Vector3<f32>, tolerance: f32) -> bool {
	(a - b).abs().max() <= tolerance
}

#[test]
fn test_approx_eq() {
	assert!(approx_eq(&na::Vector3::new(1.0, 2.0, 3.0), &na::Vector3::new(1.0, 2.0, 3.0005), 1e-3));
	assert!(!approx_eq(&na::Vector3::new(1.0, 2.0, 3.0), &na::Vector3::new(1.0, 2.1, 3.0), 1e-3));
}
