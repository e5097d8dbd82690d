//! The running loader: lifecycle plus the engine once it has started.
//!
//! Every exit path (timers, skip button, startup failure) goes through
//! [`IntroSession::trigger`] or [`IntroSession::advance`], which keep the
//! engine and the lifecycle in step. The host only applies the DOM side of
//! the [`LifecycleEvent`]s they return.

use super::engine::{Frame, IntroEngine};
use super::error::LoaderError;
use super::lifecycle::{ExitTrigger, Lifecycle, LifecycleEvent, Phase};
use super::surface::{LogicalSize, RenderSurface};

struct Stage<S> {
	engine: IntroEngine,
	surface: S,
}

/// Lifecycle state machine driving an engine that may not have started yet.
pub struct IntroSession<S> {
	lifecycle: Lifecycle,
	stage: Option<Stage<S>>,
}

impl<S: RenderSurface> IntroSession<S> {
	/// A session with no engine, in [`Phase::Mounted`].
	pub fn new(lifecycle: Lifecycle) -> Self {
		Self {
			lifecycle,
			stage: None,
		}
	}

	/// The exit state machine.
	pub fn lifecycle(&self) -> &Lifecycle {
		&self.lifecycle
	}

	/// Shorthand for `lifecycle().phase()`.
	pub fn phase(&self) -> Phase {
		self.lifecycle.phase()
	}

	/// The running engine, if one was started and has not been released.
	pub fn engine(&self) -> Option<&IntroEngine> {
		self.stage.as_ref().map(|s| &s.engine)
	}

	/// Hand over a mounted engine and enter [`Phase::Animating`].
	///
	/// Refused (and the engine dropped) once the exit has begun, so a loader
	/// skipped during startup never starts animating.
	pub fn start(&mut self, engine: IntroEngine, surface: S) -> bool {
		if self.lifecycle.is_exiting() {
			return false;
		}
		self.stage = Some(Stage { engine, surface });
		self.lifecycle.start_animating();
		true
	}

	/// Run one animation frame. `Ok(None)` when no engine is running.
	pub fn tick(&mut self, now_ms: f64) -> Result<Option<Frame>, LoaderError> {
		match self.stage.as_mut() {
			Some(stage) => stage.engine.tick(&mut stage.surface, now_ms).map(Some),
			None => Ok(None),
		}
	}

	/// Forward a viewport change to the engine, if running.
	pub fn resize(&mut self, size: LogicalSize) -> Result<(), LoaderError> {
		match self.stage.as_mut() {
			Some(stage) => stage.engine.resize(&mut stage.surface, size),
			None => Ok(()),
		}
	}

	/// Start the exit from an explicit trigger (skip button, failure).
	pub fn trigger(&mut self, trigger: ExitTrigger, now_ms: f64) -> Option<LifecycleEvent> {
		let started = self.lifecycle.begin_exit(trigger, now_ms);
		self.apply(started.then_some(LifecycleEvent::ExitStarted(trigger)))
	}

	/// Fire whichever timer deadline is due at `now_ms`.
	pub fn advance(&mut self, now_ms: f64) -> Option<LifecycleEvent> {
		let event = self.lifecycle.advance(now_ms);
		self.apply(event)
	}

	fn apply(&mut self, event: Option<LifecycleEvent>) -> Option<LifecycleEvent> {
		match event {
			Some(LifecycleEvent::ExitStarted(_)) => {
				if let Some(stage) = self.stage.as_mut() {
					stage.engine.disperse();
				}
			}
			// Unmounted: release the engine and its surface.
			Some(LifecycleEvent::Completed) => self.stage = None,
			None => {}
		}
		event
	}
}
