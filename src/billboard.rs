use nalgebra as na;
use serde::{Deserialize, Serialize};

const SLERP_EPSILON: f32 = 1e-6;

/// Turns an object to face the viewer a little every frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Billboard {
	/// Fraction of the remaining turn covered per second. Higher snaps faster.
	pub rotation_speed: f32,
	/// Only yaw about +y, so the object stays upright.
	pub horizontal_only: bool,
}

impl Default for Billboard {
	fn default() -> Self {
		Self {
			rotation_speed: 5.0,
			horizontal_only: true,
		}
	}
}

impl Billboard {
	/// The rotation after one frame of `dt` seconds. +z is forward and +y is up.
	/// If the camera sits on top of the object (or straight above it in horizontal mode) the rotation is kept.
	pub fn step(&self, rotation: &na::UnitQuaternion<f32>, object: &na::Point3<f32>, camera: &na::Point3<f32>, dt: f32) -> na::UnitQuaternion<f32> {
		let target = match self.look_rotation(object, camera) {
			Some(t) => t,
			None => return *rotation,
		};
		let t = (self.rotation_speed * dt).clamp(0.0, 1.0);
		if !(t > 0.0) {
			return *rotation;
		}
		// Antipodal rotations have no unique slerp path; just take the target.
		rotation.try_slerp(&target, t, SLERP_EPSILON).unwrap_or(target)
	}

	/// The rotation that points +z at the camera.
	pub fn look_rotation(&self, object: &na::Point3<f32>, camera: &na::Point3<f32>) -> Option<na::UnitQuaternion<f32>> {
		let mut direction = camera - object;
		if self.horizontal_only {
			direction.y = 0.0;
		}
		if direction.magnitude_squared() <= f32::EPSILON {
			return None;
		}
		let up = na::Vector3::y();
		if direction.cross(&up).magnitude_squared() <= f32::EPSILON {
			// Straight up or down: any yaw is as good as any other, so pick the one with no yaw.
			return Some(na::UnitQuaternion::rotation_between(&na::Vector3::z(), &direction).unwrap_or_else(na::UnitQuaternion::identity));
		}
		Some(na::UnitQuaternion::face_towards(&direction, &up))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn forward(q: &na::UnitQuaternion<f32>) -> na::Vector3<f32> {
		q * na::Vector3::z()
	}

	#[test]
	fn test_full_step_faces_camera() {
		let b = Billboard { rotation_speed: 1.0, horizontal_only: false };
		let q = b.step(&na::UnitQuaternion::identity(), &na::Point3::origin(), &na::Point3::new(3.0, 0.0, 0.0), 1.0);
		assert!((forward(&q) - na::Vector3::x()).magnitude() < 1e-5);
	}

	#[test]
	fn test_partial_step_turns_part_way() {
		let b = Billboard { rotation_speed: 5.0, horizontal_only: true };
		let start = na::UnitQuaternion::identity();
		let q = b.step(&start, &na::Point3::origin(), &na::Point3::new(1.0, 0.0, 0.0), 0.1);
		// Half of a 90 degree yaw.
		assert!((q.angle() - std::f32::consts::FRAC_PI_4).abs() < 1e-4);
	}

	#[test]
	fn test_horizontal_only_ignores_height() {
		let b = Billboard { rotation_speed: 1.0, horizontal_only: true };
		let q = b.step(&na::UnitQuaternion::identity(), &na::Point3::origin(), &na::Point3::new(0.0, 10.0, -2.0), 1.0);
		let f = forward(&q);
		assert!(f.y.abs() < 1e-5);
		assert!((f - na::Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-5);
	}

	#[test]
	fn test_degenerate_directions_keep_rotation() {
		let b = Billboard::default();
		let start = na::UnitQuaternion::from_euler_angles(0.0, 0.3, 0.0);
		let same_spot = b.step(&start, &na::Point3::new(1.0, 1.0, 1.0), &na::Point3::new(1.0, 1.0, 1.0), 0.016);
		assert_eq!(same_spot, start);
		let overhead = b.step(&start, &na::Point3::origin(), &na::Point3::new(0.0, 4.0, 0.0), 0.016);
		assert_eq!(overhead, start);
		let paused = b.step(&start, &na::Point3::origin(), &na::Point3::new(5.0, 0.0, 0.0), 0.0);
		assert_eq!(paused, start);
	}

	#[test]
	fn test_partial_json() {
		let b: Billboard = serde_json::from_str(r#"{"horizontal_only": false}"#).unwrap();
		assert_eq!(b, Billboard { rotation_speed: 5.0, horizontal_only: false });
	}

	#[test]
	fn test_camera_straight_above_in_full_mode() {
		let b = Billboard { rotation_speed: 1.0, horizontal_only: false };
		let q = b.step(&na::UnitQuaternion::identity(), &na::Point3::origin(), &na::Point3::new(0.0, 2.0, 0.0), 1.0);
		assert!((forward(&q) - na::Vector3::y()).magnitude() < 1e-5);
	}
}
