use image::{Rgba, RgbImage};
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};

// Rec. 709 luma weights, applied to linear RGB.
const LUMA_R: f32 = 0.2126;
const LUMA_G: f32 = 0.7152;
const LUMA_B: f32 = 0.0722;
const MIN_BRIGHTNESS: f32 = 0.001;

/// Largest accepted sampling window side, in pixels.
pub const MAX_ROI_SIZE: u32 = 64;

pub const DEFAULT_FADE_SECONDS: f32 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrightnessConfig {
	/// Luminance the correction pushes the sample region toward, 0-1.
	pub target_brightness: f32,
	/// Blend between the previous and the new correction factor. 1 means no memory.
	pub correction_smoothing: f32,
	/// Side of the square window averaged for brightness. Even values behave like the next odd one down.
	pub roi_size: u32,
	pub min_correction: f32,
	pub max_correction: f32,
}

impl BrightnessConfig {
	pub fn validate(&self) -> Result<()> {
		if !self.target_brightness.is_finite() || self.target_brightness < 0.0 {
			return Err(Error::InvalidConfig("target_brightness must be finite and non-negative"));
		}
		if !(0.0..=1.0).contains(&self.correction_smoothing) {
			return Err(Error::InvalidConfig("correction_smoothing must be within 0-1"));
		}
		if self.roi_size > MAX_ROI_SIZE {
			return Err(Error::InvalidConfig("roi_size exceeds MAX_ROI_SIZE"));
		}
		if !self.min_correction.is_finite() || !self.max_correction.is_finite() {
			return Err(Error::InvalidConfig("correction bounds must be finite"));
		}
		if self.min_correction > self.max_correction {
			return Err(Error::InvalidConfig("min_correction must not exceed max_correction"));
		}
		Ok(())
	}
}

impl Default for BrightnessConfig {
	fn default() -> Self {
		Self {
			target_brightness: 0.8,
			correction_smoothing: 0.5,
			roi_size: 3,
			min_correction: 0.8,
			max_correction: 1.5,
		}
	}
}

/// Samples a camera frame and scales the result toward a target brightness.
/// The correction factor is smoothed across calls so consecutive picks don't flicker.
#[derive(Debug, Clone)]
pub struct BrightnessCorrector {
	config: BrightnessConfig,
	prev_correction_factor: f32,
}

impl BrightnessCorrector {
	pub fn new(config: BrightnessConfig) -> Result<Self> {
		config.validate()?;
		Ok(Self {
			config,
			prev_correction_factor: 1.0,
		})
	}

	pub fn config(&self) -> &BrightnessConfig {
		&self.config
	}

	pub fn correction_factor(&self) -> f32 {
		self.prev_correction_factor
	}

	/// Pick the pixel at normalized texture coordinates `uv` and return it brightness-corrected.
	/// Coordinates outside 0-1 clamp to the image edge. None if the image has no pixels.
	pub fn sample(&mut self, frame: &RgbImage, uv: (f32, f32)) -> Option<Rgba<f32>> {
		let (width, height) = frame.dimensions();
		if width == 0 || height == 0 {
			return None;
		}
		let x = ((uv.0 * width as f32).round() as i64).clamp(0, width as i64 - 1) as u32;
		let y = ((uv.1 * height as f32).round() as i64).clamp(0, height as i64 - 1) as u32;

		let sampled = to_linear(frame.get_pixel(x, y).0);
		let brightness = roi_brightness(frame, x, y, self.config.roi_size);

		let factor = (self.config.target_brightness / brightness.max(MIN_BRIGHTNESS))
			.clamp(self.config.min_correction, self.config.max_correction);
		self.prev_correction_factor = lerp(self.prev_correction_factor, factor, self.config.correction_smoothing);

		let corrected = sampled.map(|c| linear_to_srgb(c * self.prev_correction_factor).clamp(0.0, 1.0));
		Some(Rgba([corrected[0], corrected[1], corrected[2], 1.0]))
	}
}

impl Default for BrightnessCorrector {
	fn default() -> Self {
		Self {
			config: BrightnessConfig::default(),
			prev_correction_factor: 1.0,
		}
	}
}

/// Mean linear luminance of the `roi_size` square around (x, y), ignoring pixels that fall off the frame.
/// `roi_size` is capped at [`MAX_ROI_SIZE`].
pub fn roi_brightness(frame: &RgbImage, x: u32, y: u32, roi_size: u32) -> f32 {
	let (width, height) = frame.dimensions();
	let half = (roi_size.min(MAX_ROI_SIZE) / 2) as i64;
	let mut sum = 0f32;
	let mut count = 0u32;
	for i in -half..=half {
		for j in -half..=half {
			let xi = x as i64 + i;
			let yj = y as i64 + j;
			if xi < 0 || xi >= width as i64 || yj < 0 || yj >= height as i64 {
				continue;
			}
			let [r, g, b] = to_linear(frame.get_pixel(xi as u32, yj as u32).0);
			sum += LUMA_R * r + LUMA_G * g + LUMA_B * b;
			count += 1;
		}
	}
	if count > 0 { sum / count as f32 } else { 0.0 }
}

pub fn srgb_to_linear(c: f32) -> f32 {
	if c <= 0.04045 {
		c / 12.92
	} else {
		((c + 0.055) / 1.055).powf(2.4)
	}
}

pub fn linear_to_srgb(c: f32) -> f32 {
	if c <= 0.0031308 {
		c * 12.92
	} else {
		1.055 * c.powf(1.0 / 2.4) - 0.055
	}
}

fn to_linear(rgb: [u8; 3]) -> [f32; 3] {
	rgb.map(|c| srgb_to_linear(c as f32 / 255.0))
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
	a + (b - a) * t
}

fn lerp_color(a: &Rgba<f32>, b: &Rgba<f32>, t: f32) -> Rgba<f32> {
	Rgba([0, 1, 2, 3].map(|i| lerp(a.0[i], b.0[i], t)))
}

/// A timed linear blend between two colors, advanced by the host's frame delta.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorFade {
	start: Rgba<f32>,
	target: Rgba<f32>,
	duration: f32,
	elapsed: f32,
}

impl ColorFade {
	pub fn new(start: Rgba<f32>, target: Rgba<f32>, duration: f32) -> Self {
		Self {
			start,
			target,
			duration,
			elapsed: 0.0,
		}
	}

	/// Move the fade forward by `dt` seconds and return the color to display.
	pub fn advance(&mut self, dt: f32) -> Rgba<f32> {
		if dt.is_finite() && dt > 0.0 {
			self.elapsed += dt;
		}
		self.current()
	}

	pub fn current(&self) -> Rgba<f32> {
		if self.is_finished() {
			// Land exactly on the target rather than wherever the last lerp put us.
			return self.target;
		}
		lerp_color(&self.start, &self.target, (self.elapsed / self.duration).clamp(0.0, 1.0))
	}

	pub fn is_finished(&self) -> bool {
		self.duration <= 0.0 || !self.duration.is_finite() || self.elapsed >= self.duration
	}

	pub fn target(&self) -> Rgba<f32> {
		self.target
	}

	/// Start a new fade toward `target` from whatever is showing now.
	pub fn retarget(&mut self, target: Rgba<f32>) {
		self.start = self.current();
		self.target = target;
		self.elapsed = 0.0;
	}
}
