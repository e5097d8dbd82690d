//! Performance tiers and the responsive settings derived from them.
//!
//! Density, speed and font size all depend on the logical canvas width, the
//! device pixel ratio and the active [`PerformanceTier`]. This module keeps
//! those rules in one place so the engine only ever reads a precomputed
//! [`ResponsiveSettings`] value.
//!
//! # Breakpoints
//!
//! - **Mobile**: logical width below 768 px.
//! - **Tablet**: logical width in `768..1024`.
//! - **Retina**: device pixel ratio of 2 or more.

/// Discrete quality levels, ordered from best looking to cheapest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PerformanceTier {
	/// Full density at native pixel ratio.
	High,
	/// Sparser sampling, ratio capped at 2.
	Medium,
	/// Every other frame skipped.
	Low,
	/// Two of three frames skipped, ratio 1. Forced by reduced motion.
	Minimal,
}

/// Tuning knobs attached to a [`PerformanceTier`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TierProfile {
	/// Multiplier applied to the base pixel sampling stride.
	pub pixel_steps_multiplier: f64,
	/// Frames skipped after every processed frame.
	pub skip_frames: u32,
	/// Upper bound for the device pixel ratio used by the canvas backing store.
	pub dpr_cap: f64,
}

impl PerformanceTier {
	/// All tiers in order, best first.
	pub const ORDERED: [PerformanceTier; 4] = [
		PerformanceTier::High,
		PerformanceTier::Medium,
		PerformanceTier::Low,
		PerformanceTier::Minimal,
	];

	/// Fixed knobs of this tier.
	pub fn profile(self) -> TierProfile {
		match self {
			Self::High => TierProfile {
				pixel_steps_multiplier: 1.0,
				skip_frames: 0,
				dpr_cap: 3.0,
			},
			Self::Medium => TierProfile {
				pixel_steps_multiplier: 1.5,
				skip_frames: 0,
				dpr_cap: 2.0,
			},
			Self::Low => TierProfile {
				pixel_steps_multiplier: 2.5,
				skip_frames: 1,
				dpr_cap: 1.5,
			},
			Self::Minimal => TierProfile {
				pixel_steps_multiplier: 4.0,
				skip_frames: 2,
				dpr_cap: 1.0,
			},
		}
	}

	/// One step cheaper, or `None` at [`PerformanceTier::Minimal`].
	pub fn downgrade(self) -> Option<Self> {
		match self {
			Self::High => Some(Self::Medium),
			Self::Medium => Some(Self::Low),
			Self::Low => Some(Self::Minimal),
			Self::Minimal => None,
		}
	}

	/// One step nicer, or `None` at [`PerformanceTier::High`].
	pub fn upgrade(self) -> Option<Self> {
		match self {
			Self::High => None,
			Self::Medium => Some(Self::High),
			Self::Low => Some(Self::Medium),
			Self::Minimal => Some(Self::Low),
		}
	}

	/// Lowercase name for logs.
	pub fn name(self) -> &'static str {
		match self {
			Self::High => "high",
			Self::Medium => "medium",
			Self::Low => "low",
			Self::Minimal => "minimal",
		}
	}
}

/// Device hints sampled once when the loader mounts.
///
/// Injected into the engine instead of being read ad hoc, so the initial tier
/// heuristic can be exercised without a browser.
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceCapabilities {
	/// `prefers-reduced-motion: reduce` matched.
	pub reduced_motion: bool,
	/// Logical CPU count, if the platform reports one.
	pub hardware_concurrency: Option<u32>,
	/// `window.devicePixelRatio`.
	pub device_pixel_ratio: f64,
	/// Window inner width in CSS pixels.
	pub viewport_width: f64,
}

impl Default for DeviceCapabilities {
	fn default() -> Self {
		Self {
			reduced_motion: false,
			hardware_concurrency: Some(4),
			device_pixel_ratio: 1.0,
			viewport_width: 1920.0,
		}
	}
}

impl DeviceCapabilities {
	/// Device pixel ratio with unusable values replaced by 1.
	pub fn pixel_ratio(&self) -> f64 {
		if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
			self.device_pixel_ratio
		} else {
			1.0
		}
	}

	/// Best guess before any frame has been timed.
	///
	/// Reduced motion forces `Minimal`. Mobile widths, two cores or fewer and
	/// pixel ratios of 3 and up start at `Medium`. Everything else starts at
	/// `High` and relies on the governor to step down.
	pub fn initial_tier(&self) -> PerformanceTier {
		if self.reduced_motion {
			return PerformanceTier::Minimal;
		}
		let cores = self.hardware_concurrency.filter(|&c| c > 0).unwrap_or(4);
		if self.viewport_width < MOBILE_MAX_WIDTH || cores <= 2 || self.pixel_ratio() >= 3.0 {
			return PerformanceTier::Medium;
		}
		PerformanceTier::High
	}

	/// Pixel ratio for the canvas backing store under `tier`.
	pub fn effective_pixel_ratio(&self, tier: PerformanceTier) -> f64 {
		self.pixel_ratio().min(tier.profile().dpr_cap)
	}
}

const MOBILE_MAX_WIDTH: f64 = 768.0;
const TABLET_MAX_WIDTH: f64 = 1024.0;

/// Ratio between a particle's steering force limit and its speed limit.
pub const FORCE_TO_SPEED: f64 = 0.08;

/// Distance (px) below which particles start braking toward their target.
pub const CLOSE_ENOUGH_TARGET: f64 = 100.0;

/// Pre-computed settings for one canvas width and tier.
///
/// Recompute with [`ResponsiveSettings::derive`] after a resize or a tier
/// change; everything else just reads the cached value.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponsiveSettings {
	/// Tier these settings were derived for.
	pub tier: PerformanceTier,
	/// Sampling stride over the rasterized word. Larger means fewer particles.
	pub pixel_steps: usize,
	/// Square side range.
	pub particle_size_min: f64,
	/// Largest square side.
	pub particle_size_max: f64,
	/// Bounds of `max_speed` at spawn.
	pub speed_min: f64,
	/// Upper spawn speed.
	pub speed_max: f64,
	/// Cap on the word font size.
	pub font_size_max: f64,
	/// Font size is `width / divisor` below the cap.
	pub font_size_divisor: f64,
	/// Range of per-particle blend rates.
	pub color_blend_rate_min: f64,
	/// Fastest blend rate.
	pub color_blend_rate_max: f64,
	/// Arrival braking radius.
	pub close_enough_target: f64,
}

impl ResponsiveSettings {
	/// Settings for a canvas `logical_width` wide on this device at `tier`.
	pub fn derive(logical_width: f64, capabilities: &DeviceCapabilities, tier: PerformanceTier) -> Self {
		let is_mobile = logical_width < MOBILE_MAX_WIDTH;
		let is_tablet = !is_mobile && logical_width < TABLET_MAX_WIDTH;
		let is_retina = capabilities.pixel_ratio() >= 2.0;

		let base_steps = if is_mobile || is_tablet {
			6.0
		} else if is_retina {
			8.0
		} else {
			6.0
		};
		let pixel_steps = (base_steps * tier.profile().pixel_steps_multiplier).round().max(1.0) as usize;

		let (particle_size_min, particle_size_max) = if is_mobile {
			(1.5, 2.5)
		} else if is_retina {
			(2.5, 4.0)
		} else {
			(2.0, 3.0)
		};
		let (speed_min, speed_max) = if is_mobile { (6.0, 10.0) } else { (8.0, 12.0) };
		let font_size_max = if is_mobile {
			60.0
		} else if is_tablet {
			80.0
		} else {
			120.0
		};

		Self {
			tier,
			pixel_steps,
			particle_size_min,
			particle_size_max,
			speed_min,
			speed_max,
			font_size_max,
			font_size_divisor: if is_mobile { 6.0 } else { 8.0 },
			color_blend_rate_min: 0.005,
			color_blend_rate_max: 0.015,
			close_enough_target: CLOSE_ENOUGH_TARGET,
		}
	}

	/// Bold sans-serif size used to rasterize words on a canvas this wide.
	pub fn font_size(&self, logical_width: f64) -> f64 {
		(logical_width / self.font_size_divisor).min(self.font_size_max)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn desktop() -> DeviceCapabilities {
		DeviceCapabilities {
			reduced_motion: false,
			hardware_concurrency: Some(8),
			device_pixel_ratio: 1.0,
			viewport_width: 1440.0,
		}
	}

	#[test]
	fn initial_tier_heuristic() {
		assert_eq!(desktop().initial_tier(), PerformanceTier::High);

		let reduced = DeviceCapabilities {
			reduced_motion: true,
			..desktop()
		};
		assert_eq!(reduced.initial_tier(), PerformanceTier::Minimal);

		let phone = DeviceCapabilities {
			viewport_width: 390.0,
			..desktop()
		};
		assert_eq!(phone.initial_tier(), PerformanceTier::Medium);

		let dual_core = DeviceCapabilities {
			hardware_concurrency: Some(2),
			..desktop()
		};
		assert_eq!(dual_core.initial_tier(), PerformanceTier::Medium);

		let dense = DeviceCapabilities {
			device_pixel_ratio: 3.0,
			..desktop()
		};
		assert_eq!(dense.initial_tier(), PerformanceTier::Medium);

		let unknown_cores = DeviceCapabilities {
			hardware_concurrency: None,
			..desktop()
		};
		assert_eq!(unknown_cores.initial_tier(), PerformanceTier::High);
	}

	#[test]
	fn tiers_step_one_at_a_time() {
		for pair in PerformanceTier::ORDERED.windows(2) {
			assert_eq!(pair[0].downgrade(), Some(pair[1]));
			assert_eq!(pair[1].upgrade(), Some(pair[0]));
		}
		assert_eq!(PerformanceTier::Minimal.downgrade(), None);
		assert_eq!(PerformanceTier::High.upgrade(), None);
	}

	#[test]
	fn pixel_steps_follow_tier_multiplier() {
		let caps = desktop();
		let steps: Vec<usize> = PerformanceTier::ORDERED
			.iter()
			.map(|&t| ResponsiveSettings::derive(1440.0, &caps, t).pixel_steps)
			.collect();
		// 6 * [1.0, 1.5, 2.5, 4.0], rounded half away from zero
		assert_eq!(steps, vec![6, 9, 15, 24]);

		let retina = DeviceCapabilities {
			device_pixel_ratio: 2.0,
			..desktop()
		};
		assert_eq!(ResponsiveSettings::derive(1440.0, &retina, PerformanceTier::High).pixel_steps, 8);
		assert_eq!(ResponsiveSettings::derive(400.0, &retina, PerformanceTier::High).pixel_steps, 6);
	}

	#[test]
	fn font_size_is_capped_per_breakpoint() {
		let caps = desktop();
		let mobile = ResponsiveSettings::derive(400.0, &caps, PerformanceTier::High);
		assert_eq!(mobile.font_size(400.0), 60.0);
		assert_eq!(mobile.font_size(300.0), 50.0);

		let tablet = ResponsiveSettings::derive(800.0, &caps, PerformanceTier::High);
		assert_eq!(tablet.font_size(800.0), 80.0);

		let wide = ResponsiveSettings::derive(1920.0, &caps, PerformanceTier::High);
		assert_eq!(wide.font_size(1920.0), 120.0);
		assert_eq!(wide.font_size(1200.0), 120.0);
		assert_eq!(wide.font_size(1024.0), 120.0);
	}

	#[test]
	fn dpr_is_capped_by_tier() {
		let caps = DeviceCapabilities {
			device_pixel_ratio: 2.5,
			..desktop()
		};
		assert_eq!(caps.effective_pixel_ratio(PerformanceTier::High), 2.5);
		assert_eq!(caps.effective_pixel_ratio(PerformanceTier::Low), 1.5);
		assert_eq!(caps.effective_pixel_ratio(PerformanceTier::Minimal), 1.0);

		let broken = DeviceCapabilities {
			device_pixel_ratio: f64::NAN,
			..desktop()
		};
		assert_eq!(broken.effective_pixel_ratio(PerformanceTier::High), 1.0);
	}
}
