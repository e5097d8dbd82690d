//! Overlay lifecycle and exit timing.
//!
//! The loader moves through `Mounted -> Animating -> Exiting -> Unmounted`.
//! `Exiting` can be entered from three independent triggers (minimum display
//! timer, safety-net timer, skip button); whichever arrives first wins and the
//! rest are ignored. The completion callback runs exactly once, a fixed fade
//! delay after the exit began.
//!
//! The state machine itself never reads a clock. Timer callbacks pass the
//! current time to [`Lifecycle::advance`], which fires whichever deadline is
//! due; tests drive the same method with synthetic timestamps.

use std::fmt;

/// Default minimum time the intro stays on screen.
pub const DEFAULT_MIN_DISPLAY_MS: f64 = 2500.0;
/// Delay between the start of the exit and unmounting.
pub const FADE_OUT_MS: f64 = 800.0;
/// Lower bound of the safety-net timer.
pub const SAFETY_NET_FLOOR_MS: f64 = 8000.0;
/// Tolerance when comparing a timer callback's clock against its deadline.
pub const TIMER_SLACK_MS: f64 = 1.0;

/// Where the loader is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
	/// Waiting for the viewport to settle.
	Mounted,
	/// Frame loop running.
	Animating,
	/// Particles dispersing while the overlay fades.
	Exiting,
	/// The completion callback has run.
	Unmounted,
}

/// What started the exit sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitTrigger {
	/// Minimum display time elapsed.
	MinDisplay,
	/// Safety-net deadline reached.
	SafetyNet,
	/// Skip button pressed.
	Skip,
	/// The loader could not start; leave right away.
	Failure,
}

/// Timer deadlines, relative to mount.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExitSchedule {
	/// Automatic exit once the intro has been visible this long.
	pub min_display_ms: f64,
	/// Exit regardless of anything else, `max(min + 1000, 8000)`.
	pub safety_net_ms: f64,
	/// Delay between the start of the exit and unmounting.
	pub fade_out_ms: f64,
}

impl ExitSchedule {
	/// Schedule for a minimum display time. Negative values are clamped to
	/// zero and non-finite ones fall back to the default.
	pub fn new(min_display_ms: f64) -> Self {
		let min_display_ms = if min_display_ms.is_finite() {
			min_display_ms.max(0.0)
		} else {
			DEFAULT_MIN_DISPLAY_MS
		};
		Self {
			min_display_ms,
			safety_net_ms: (min_display_ms + 1000.0).max(SAFETY_NET_FLOOR_MS),
			fade_out_ms: FADE_OUT_MS,
		}
	}
}

impl Default for ExitSchedule {
	fn default() -> Self {
		Self::new(DEFAULT_MIN_DISPLAY_MS)
	}
}

/// Lifecycle transition reported by [`Lifecycle::advance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleEvent {
	/// The exit began.
	ExitStarted(ExitTrigger),
	/// The fade finished and the callback ran.
	Completed,
}

/// Exit state machine with a one-shot completion callback.
pub struct Lifecycle {
	phase: Phase,
	schedule: ExitSchedule,
	mounted_at: f64,
	exit_started_at: Option<f64>,
	on_complete: Option<Box<dyn FnOnce()>>,
}

impl fmt::Debug for Lifecycle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Lifecycle")
			.field("phase", &self.phase)
			.field("schedule", &self.schedule)
			.field("mounted_at", &self.mounted_at)
			.field("exit_started_at", &self.exit_started_at)
			.finish_non_exhaustive()
	}
}

impl Lifecycle {
	/// `mounted_at` is the clock reading the deadlines are measured from.
	pub fn new(schedule: ExitSchedule, mounted_at: f64, on_complete: Option<Box<dyn FnOnce()>>) -> Self {
		Self {
			phase: Phase::Mounted,
			schedule,
			mounted_at,
			exit_started_at: None,
			on_complete,
		}
	}

	/// Current phase.
	pub fn phase(&self) -> Phase {
		self.phase
	}

	/// Deadlines in use.
	pub fn schedule(&self) -> ExitSchedule {
		self.schedule
	}

	/// True from the start of the exit onward.
	pub fn is_exiting(&self) -> bool {
		matches!(self.phase, Phase::Exiting | Phase::Unmounted)
	}

	/// The animation loop is running. Ignored once exiting.
	pub fn start_animating(&mut self) {
		if self.phase == Phase::Mounted {
			self.phase = Phase::Animating;
		}
	}

	/// Enter `Exiting`. Returns `true` only for the call that actually
	/// started the exit.
	pub fn begin_exit(&mut self, trigger: ExitTrigger, now: f64) -> bool {
		if self.is_exiting() {
			return false;
		}
		log::info!("intro: exit started by {trigger:?}");
		self.phase = Phase::Exiting;
		self.exit_started_at = Some(now);
		true
	}

	/// Enter `Unmounted` and run the completion callback. Returns `true` only
	/// for the call that actually finished.
	pub fn finish(&mut self) -> bool {
		if self.phase != Phase::Exiting {
			return false;
		}
		self.phase = Phase::Unmounted;
		if let Some(callback) = self.on_complete.take() {
			callback();
		}
		true
	}

	/// Fire whichever deadline is due at `now`.
	///
	/// At most one transition happens per call; call again to catch up.
	pub fn advance(&mut self, now: f64) -> Option<LifecycleEvent> {
		let elapsed = now - self.mounted_at + TIMER_SLACK_MS;
		match self.phase {
			Phase::Mounted | Phase::Animating => {
				let trigger = if elapsed >= self.schedule.safety_net_ms {
					ExitTrigger::SafetyNet
				} else if elapsed >= self.schedule.min_display_ms {
					ExitTrigger::MinDisplay
				} else {
					return None;
				};
				self.begin_exit(trigger, now)
					.then_some(LifecycleEvent::ExitStarted(trigger))
			}
			Phase::Exiting => {
				let started = self.exit_started_at?;
				(now - started + TIMER_SLACK_MS >= self.schedule.fade_out_ms && self.finish())
					.then_some(LifecycleEvent::Completed)
			}
			Phase::Unmounted => None,
		}
	}
}
