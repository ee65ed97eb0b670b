mod billboard;
mod color;
mod config;
mod error;
mod history;
mod smoother;

pub use billboard::Billboard;
pub use color::{BrightnessConfig, BrightnessCorrector, ColorFade, DEFAULT_FADE_SECONDS, MAX_ROI_SIZE, linear_to_srgb, roi_brightness, srgb_to_linear};
pub use config::{AssignmentPolicy, SmootherConfig, DEFAULT_HISTORY_CAPACITY, DEFAULT_MIN_SEPARATION, LONG_HISTORY_CAPACITY};
pub use error::{Error, Result};
pub use history::HistoryBuffer;
pub use smoother::{MarkerSmoother, PairSnapshot, Slot};

#[cfg(test)]
mod tests {
	use super::*;
	use nalgebra as na;

	#[test]
	fn test_smoother_is_send() {
		fn assert_send<T: Send>() {}
		assert_send::<MarkerSmoother<u64>>();
		assert_send::<MarkerSmoother<String>>();
	}

	#[test]
	fn test_pair_drives_billboard() {
		// A host loop in miniature: smooth two markers, then turn an object at their midpoint toward the camera.
		let mut smoother: MarkerSmoother<u32> = MarkerSmoother::new(SmootherConfig { history_capacity: 2, ..SmootherConfig::default() }).unwrap();
		for _ in 0..3 {
			smoother.tick(&[(1, na::Vector3::new(-1.0, 0.0, 0.0)), (2, na::Vector3::new(1.0, 0.0, 0.0))]);
		}
		let snapshot = smoother.pair_snapshot().unwrap();
		let billboard = Billboard { rotation_speed: 1.0, horizontal_only: true };
		let camera = na::Point3::new(0.0, 1.7, 2.0);
		let q = billboard.step(&na::UnitQuaternion::identity(), &na::Point3::from(snapshot.midpoint), &camera, 1.0);
		assert!(((q * na::Vector3::z()) - na::Vector3::z()).magnitude() < 1e-5);
	}
}
