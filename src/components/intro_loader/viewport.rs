//! Startup dimension probing.
//!
//! Some mobile browsers (Android Chrome in particular) briefly report a
//! container taller than the visible viewport while the address bar settles.
//! The probe keeps asking for the container's bounding box until it looks
//! plausible, backing off a little more after every attempt, and finally
//! falls back to the window's inner size.

use super::surface::LogicalSize;

/// Attempts before giving up on the container.
pub const MAX_ATTEMPTS: u32 = 20;

/// What the caller should do after an observation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProbeStep {
	/// The container reported usable dimensions.
	Ready(LogicalSize),
	/// Wait `delay_ms` (after the next animation frame) and measure again.
	Retry { delay_ms: u32 },
	/// Retries exhausted; use the window size instead.
	Fallback(LogicalSize),
}

/// Delay before attempt `attempt + 1`.
pub fn retry_delay_ms(attempt: u32) -> u32 {
	30 + attempt * 10
}

/// Whether a measured container size can be trusted.
///
/// Portrait and near-square boxes (height at least 0.8x width) are accepted
/// outright. Landscape boxes must be within 20% of the expected height.
pub fn is_plausible(measured: LogicalSize, expected_height: f64) -> bool {
	if !measured.is_valid() {
		return false;
	}
	measured.height >= measured.width * 0.8
		|| (measured.height - expected_height).abs() < expected_height * 0.2
}

/// Startup measurement loop for the container size.
#[derive(Clone, Debug)]
pub struct ViewportProbe {
	window: LogicalSize,
	attempt: u32,
}

impl ViewportProbe {
	/// `window` is the window's inner size, already sanitized.
	pub fn new(window: LogicalSize) -> Self {
		Self { window, attempt: 0 }
	}

	/// Window size with unusable values replaced by `screen`, then by a
	/// typical phone size.
	pub fn sanitize_window(inner: LogicalSize, screen: Option<LogicalSize>) -> LogicalSize {
		let pick = |value: f64, screen: Option<f64>, default: f64| {
			if value.is_finite() && value > 0.0 {
				value
			} else {
				screen.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(default)
			}
		};
		LogicalSize::new(
			pick(inner.width, screen.map(|s| s.width), 360.0),
			pick(inner.height, screen.map(|s| s.height), 800.0),
		)
	}

	/// Measurements observed so far.
	pub fn attempts(&self) -> u32 {
		self.attempt
	}

	/// Feed the latest container measurement, if the container exists.
	pub fn observe(&mut self, measured: Option<LogicalSize>) -> ProbeStep {
		if let Some(size) = measured {
			if is_plausible(size, self.window.height) {
				return ProbeStep::Ready(size);
			}
		}
		let attempt = self.attempt;
		self.attempt += 1;
		if self.attempt >= MAX_ATTEMPTS {
			ProbeStep::Fallback(self.window)
		} else {
			ProbeStep::Retry {
				delay_ms: retry_delay_ms(attempt),
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn portrait_and_matching_heights_are_plausible() {
		assert!(is_plausible(LogicalSize::new(390.0, 844.0), 844.0));
		assert!(is_plausible(LogicalSize::new(1440.0, 900.0), 900.0));
		assert!(is_plausible(LogicalSize::new(1000.0, 800.0), 300.0));
		assert!(!is_plausible(LogicalSize::new(1440.0, 400.0), 900.0));
		assert!(!is_plausible(LogicalSize::new(0.0, 0.0), 900.0));
	}

	#[test]
	fn accepts_first_plausible_measurement() {
		let mut probe = ViewportProbe::new(LogicalSize::new(390.0, 844.0));
		assert_eq!(probe.observe(None), ProbeStep::Retry { delay_ms: 30 });
		assert_eq!(
			probe.observe(Some(LogicalSize::new(0.0, 0.0))),
			ProbeStep::Retry { delay_ms: 40 }
		);
		let good = LogicalSize::new(390.0, 800.0);
		assert_eq!(probe.observe(Some(good)), ProbeStep::Ready(good));
	}

	#[test]
	fn falls_back_to_window_after_twenty_attempts() {
		let window = LogicalSize::new(1280.0, 720.0);
		let mut probe = ViewportProbe::new(window);
		let oversized = Some(LogicalSize::new(1280.0, 300.0));
		let mut delays = Vec::new();
		let step = loop {
			match probe.observe(oversized) {
				ProbeStep::Retry { delay_ms } => delays.push(delay_ms),
				other => break other,
			}
		};
		assert_eq!(step, ProbeStep::Fallback(window));
		assert_eq!(probe.attempts(), MAX_ATTEMPTS);
		assert_eq!(delays.len(), 19);
		assert!(delays.windows(2).all(|w| w[1] > w[0]));
	}

	#[test]
	fn window_size_is_sanitized() {
		let screen = Some(LogicalSize::new(412.0, 915.0));
		assert_eq!(
			ViewportProbe::sanitize_window(LogicalSize::new(0.0, f64::NAN), screen),
			LogicalSize::new(412.0, 915.0)
		);
		assert_eq!(
			ViewportProbe::sanitize_window(LogicalSize::new(-1.0, 0.0), None),
			LogicalSize::new(360.0, 800.0)
		);
	}
}
