//! Frame-rate driven tier selection.
//!
//! The governor keeps a rolling window of instantaneous FPS samples and,
//! every [`CHECK_INTERVAL`] samples, compares the window average against two
//! thresholds. Tiers only ever move one step per evaluation, and the window is
//! cleared after a change so stale samples cannot trigger a second step.

use std::collections::VecDeque;

use super::settings::PerformanceTier;

/// Samples between two evaluations.
pub const CHECK_INTERVAL: u32 = 30;
/// Rolling window length.
pub const HISTORY_LEN: usize = 60;
/// Average FPS below which the tier steps down.
pub const DOWNGRADE_BELOW: f64 = 25.0;
/// Average FPS above which the tier steps up.
pub const UPGRADE_ABOVE: f64 = 55.0;

/// A tier transition decided by the governor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TierChange {
	/// Tier before the change.
	pub from: PerformanceTier,
	/// One step away from `from`.
	pub to: PerformanceTier,
}

/// Rolling FPS window deciding the active [`PerformanceTier`].
#[derive(Clone, Debug)]
pub struct PerformanceGovernor {
	tier: PerformanceTier,
	history: VecDeque<f64>,
	since_check: u32,
	last_frame_ms: Option<f64>,
}

impl PerformanceGovernor {
	/// Empty history, starting at `tier`.
	pub fn new(tier: PerformanceTier) -> Self {
		Self {
			tier,
			history: VecDeque::with_capacity(HISTORY_LEN),
			since_check: 0,
			last_frame_ms: None,
		}
	}

	/// Current tier.
	pub fn tier(&self) -> PerformanceTier {
		self.tier
	}

	/// Samples currently in the rolling window.
	pub fn history_len(&self) -> usize {
		self.history.len()
	}

	/// Mean of the window, `None` while empty.
	pub fn average_fps(&self) -> Option<f64> {
		if self.history.is_empty() {
			None
		} else {
			Some(self.history.iter().sum::<f64>() / self.history.len() as f64)
		}
	}

	/// Record a frame timestamp (milliseconds, monotonic).
	///
	/// The first call only primes the clock. Non-increasing timestamps are
	/// ignored rather than producing infinite or negative FPS.
	pub fn record_frame(&mut self, now_ms: f64) -> Option<TierChange> {
		let previous = self.last_frame_ms.replace(now_ms)?;
		let delta = now_ms - previous;
		if !(delta.is_finite() && delta > 0.0) {
			return None;
		}
		self.record_fps(1000.0 / delta)
	}

	/// Record one instantaneous FPS sample and evaluate if due.
	pub fn record_fps(&mut self, fps: f64) -> Option<TierChange> {
		if !fps.is_finite() {
			return None;
		}
		self.history.push_back(fps);
		if self.history.len() > HISTORY_LEN {
			self.history.pop_front();
		}

		self.since_check += 1;
		if self.since_check < CHECK_INTERVAL || self.history.len() < CHECK_INTERVAL as usize {
			return None;
		}
		self.since_check = 0;

		let average = self.average_fps()?;
		let next = if average < DOWNGRADE_BELOW {
			self.tier.downgrade()
		} else if average > UPGRADE_ABOVE {
			self.tier.upgrade()
		} else {
			None
		};
		let next = next?;

		let change = TierChange {
			from: self.tier,
			to: next,
		};
		self.tier = next;
		self.history.clear();
		Some(change)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn steady_low_fps_steps_down_after_thirty_samples() {
		let mut governor = PerformanceGovernor::new(PerformanceTier::High);
		for _ in 0..29 {
			assert_eq!(governor.record_fps(20.0), None);
		}
		assert_eq!(
			governor.record_fps(20.0),
			Some(TierChange {
				from: PerformanceTier::High,
				to: PerformanceTier::Medium
			})
		);
		assert_eq!(governor.tier(), PerformanceTier::Medium);
		assert_eq!(governor.history_len(), 0);

		// The next window starts empty: 29 more samples do nothing.
		for _ in 0..29 {
			assert_eq!(governor.record_fps(20.0), None);
		}
		assert_eq!(governor.history_len(), 29);
		assert_eq!(governor.record_fps(20.0).map(|c| c.to), Some(PerformanceTier::Low));
	}

	#[test]
	fn one_evaluation_moves_one_step() {
		let mut governor = PerformanceGovernor::new(PerformanceTier::High);
		let mut changes = Vec::new();
		for _ in 0..300 {
			if let Some(change) = governor.record_fps(1.0) {
				changes.push(change);
			}
		}
		assert_eq!(changes.len(), 3);
		for change in &changes {
			assert_eq!(change.from.downgrade(), Some(change.to));
		}
		assert_eq!(governor.tier(), PerformanceTier::Minimal);
	}

	#[test]
	fn high_fps_steps_up_but_not_past_high() {
		let mut governor = PerformanceGovernor::new(PerformanceTier::Low);
		let mut tiers = Vec::new();
		for _ in 0..200 {
			if let Some(change) = governor.record_fps(60.0) {
				tiers.push(change.to);
			}
		}
		assert_eq!(tiers, vec![PerformanceTier::Medium, PerformanceTier::High]);
	}

	#[test]
	fn middle_band_holds_tier() {
		let mut governor = PerformanceGovernor::new(PerformanceTier::Medium);
		for _ in 0..120 {
			assert_eq!(governor.record_fps(40.0), None);
		}
		assert_eq!(governor.history_len(), HISTORY_LEN);
	}

	#[test]
	fn frame_timestamps_become_fps_samples() {
		let mut governor = PerformanceGovernor::new(PerformanceTier::High);
		assert_eq!(governor.record_frame(1000.0), None);
		assert_eq!(governor.history_len(), 0);
		governor.record_frame(1020.0);
		assert_eq!(governor.average_fps(), Some(50.0));

		// Duplicate timestamps are skipped.
		governor.record_frame(1020.0);
		assert_eq!(governor.history_len(), 1);
	}

	#[test]
	fn slow_clock_downgrades_via_timestamps() {
		let mut governor = PerformanceGovernor::new(PerformanceTier::High);
		let mut now = 0.0;
		let mut change = None;
		for _ in 0..31 {
			change = change.or(governor.record_frame(now));
			now += 50.0;
		}
		assert_eq!(change.map(|c| c.to), Some(PerformanceTier::Medium));
	}
}
