use nalgebra as na;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
	/// A position with a NaN or infinite component. The sample is skipped.
	#[error("Invalid sample: non-finite position ({}, {}, {})", .position.x, .position.y, .position.z)]
	InvalidSample { position: na::Vector3<f32> },

	#[error("Invalid configuration: {0}")]
	InvalidConfig(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
