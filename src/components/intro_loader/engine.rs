//! Headless particle-text engine.
//!
//! [`IntroEngine`] owns every piece of per-loader mutable state: the particle
//! pool, the word cursor, the frame counter and the performance governor. The
//! host calls [`IntroEngine::tick`] once per animation frame with a monotonic
//! timestamp; the engine never schedules anything itself.

use log::debug;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::error::LoaderError;
use super::governor::{PerformanceGovernor, TierChange};
use super::particle::Particle;
use super::raster::{AssignContext, Assignment, TargetField, assign_targets};
use super::render::{self, ColorBuckets};
use super::settings::{DeviceCapabilities, PerformanceTier, ResponsiveSettings};
use super::surface::{LogicalSize, RenderSurface};
use super::theme::Theme;

/// Words shown by the intro, in order: the Cyrillic brand name, then its
/// Latin transliteration.
pub const WORDS: [&str; 2] = ["ЮРАЛЬЯНС", "URALLIANCE"];

/// Static configuration of the engine.
#[derive(Clone, Debug)]
pub struct IntroConfig {
	/// Words cycled by the intro, shown in order with wraparound.
	pub words: Vec<String>,
	/// Processed frames between two word transitions.
	pub frames_per_word: u64,
	/// How far (px) a killed particle must leave the canvas before removal.
	pub kill_margin: f64,
	/// Colors of particles, trail and overlay.
	pub theme: Theme,
}

impl Default for IntroConfig {
	fn default() -> Self {
		Self {
			words: WORDS.iter().map(|w| w.to_string()).collect(),
			frames_per_word: 180,
			kill_margin: 50.0,
			theme: Theme::default(),
		}
	}
}

impl IntroConfig {
	/// Default configuration with a custom word list.
	pub fn with_words<I, S>(words: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			words: words.into_iter().map(Into::into).collect(),
			..Self::default()
		}
	}
}

/// Result of one [`IntroEngine::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frame {
	/// Dropped by the tier's frame skipping; nothing moved or drew.
	Skipped,
	/// Particles moved and were drawn. `word_changed` is set on the frame
	/// that formed the next word.
	Rendered { word_changed: bool },
}

/// Particle pool, word cursor and quality governor for one loader.
pub struct IntroEngine {
	config: IntroConfig,
	capabilities: DeviceCapabilities,
	governor: PerformanceGovernor,
	settings: ResponsiveSettings,
	particles: Vec<Particle>,
	buckets: ColorBuckets,
	size: LogicalSize,
	pixel_ratio: f64,
	word_index: usize,
	frame_count: u64,
	skip_counter: u32,
	dispersing: bool,
	last_assignment: Assignment,
	rng: SmallRng,
}

impl IntroEngine {
	/// Unmounted engine. The initial tier comes from `capabilities`, and `seed`
	/// makes every random choice reproducible.
	pub fn new(config: IntroConfig, capabilities: DeviceCapabilities, seed: u64) -> Self {
		let tier = capabilities.initial_tier();
		let size = LogicalSize::new(capabilities.viewport_width.max(1.0), 1.0);
		Self {
			settings: ResponsiveSettings::derive(size.width, &capabilities, tier),
			pixel_ratio: capabilities.effective_pixel_ratio(tier),
			governor: PerformanceGovernor::new(tier),
			config,
			capabilities,
			particles: Vec::new(),
			buckets: ColorBuckets::default(),
			size,
			word_index: 0,
			frame_count: 0,
			skip_counter: 0,
			dispersing: false,
			last_assignment: Assignment::default(),
			rng: SmallRng::seed_from_u64(seed),
		}
	}

	/// Live particles, including killed ones still on screen.
	pub fn particles(&self) -> &[Particle] {
		&self.particles
	}

	/// Settings for the current size and tier.
	pub fn settings(&self) -> &ResponsiveSettings {
		&self.settings
	}

	/// Configuration the engine was built with.
	pub fn config(&self) -> &IntroConfig {
		&self.config
	}

	/// Active quality tier.
	pub fn tier(&self) -> PerformanceTier {
		self.governor.tier()
	}

	/// Logical canvas size.
	pub fn size(&self) -> LogicalSize {
		self.size
	}

	/// Backing-store pixel ratio after the tier cap.
	pub fn pixel_ratio(&self) -> f64 {
		self.pixel_ratio
	}

	/// Index of the word currently formed.
	pub fn word_index(&self) -> usize {
		self.word_index
	}

	/// Processed (not skipped) frames since mount.
	pub fn frame_count(&self) -> u64 {
		self.frame_count
	}

	/// True after [`IntroEngine::disperse`].
	pub fn is_dispersing(&self) -> bool {
		self.dispersing
	}

	/// Pool changes made by the most recent rasterization.
	pub fn last_assignment(&self) -> Assignment {
		self.last_assignment
	}

	/// Word at [`IntroEngine::word_index`], empty if the list is.
	pub fn current_word(&self) -> &str {
		self.config
			.words
			.get(self.word_index)
			.map(String::as_str)
			.unwrap_or_default()
	}

	/// Size the surface, paint the initial background and form the first word.
	pub fn mount<S: RenderSurface>(&mut self, surface: &mut S, size: LogicalSize) -> Result<(), LoaderError> {
		self.apply_size(surface, size)?;
		render::draw_background(surface, self.size, &self.config.theme);
		self.word_index = 0;
		self.rasterize(surface)
	}

	/// React to a viewport change: resize the surface, recompute settings and
	/// re-form the current word at the new dimensions.
	pub fn resize<S: RenderSurface>(&mut self, surface: &mut S, size: LogicalSize) -> Result<(), LoaderError> {
		self.apply_size(surface, size)?;
		if !self.particles.is_empty() && !self.dispersing {
			self.rasterize(surface)?;
		}
		Ok(())
	}

	/// Advance one animation frame.
	pub fn tick<S: RenderSurface>(&mut self, surface: &mut S, now_ms: f64) -> Result<Frame, LoaderError> {
		let profile = self.governor.tier().profile();
		if let Some(change) = self.governor.record_frame(now_ms) {
			self.apply_tier_change(surface, change)?;
		}

		if profile.skip_frames > 0 {
			self.skip_counter += 1;
			if self.skip_counter <= profile.skip_frames {
				return Ok(Frame::Skipped);
			}
			self.skip_counter = 0;
		}

		render::draw_trail(surface, self.size, &self.config.theme);
		self.update_particles();
		render::draw_particles(surface, &self.particles, &mut self.buckets);

		self.frame_count += 1;
		let word_changed = !self.dispersing
			&& !self.config.words.is_empty()
			&& self.frame_count % self.config.frames_per_word.max(1) == 0;
		if word_changed {
			self.word_index = (self.word_index + 1) % self.config.words.len();
			debug!("intro: switching to word {} ({})", self.word_index, self.current_word());
			self.rasterize(surface)?;
		}
		Ok(Frame::Rendered { word_changed })
	}

	/// Kill every particle so the swarm flies outward, and stop word changes.
	pub fn disperse(&mut self) {
		self.dispersing = true;
		let (w, h) = (self.size.width, self.size.height);
		let background = self.config.theme.palette.background;
		for particle in &mut self.particles {
			particle.kill(&mut self.rng, w, h, background);
		}
	}

	fn apply_size<S: RenderSurface>(&mut self, surface: &mut S, size: LogicalSize) -> Result<(), LoaderError> {
		if !size.is_valid() {
			return Err(LoaderError::InvalidSize {
				width: size.width,
				height: size.height,
			});
		}
		let tier = self.governor.tier();
		self.size = size;
		self.settings = ResponsiveSettings::derive(size.width, &self.capabilities, tier);
		self.pixel_ratio = self.capabilities.effective_pixel_ratio(tier);
		surface.configure(size, self.pixel_ratio)
	}

	fn apply_tier_change<S: RenderSurface>(&mut self, surface: &mut S, change: TierChange) -> Result<(), LoaderError> {
		debug!(
			"intro: performance tier {} -> {}",
			change.from.name(),
			change.to.name()
		);
		// `skip_counter` carries over to the new tier.
		self.settings = ResponsiveSettings::derive(self.size.width, &self.capabilities, change.to);

		let pixel_ratio = self.capabilities.effective_pixel_ratio(change.to);
		if pixel_ratio != self.pixel_ratio {
			self.pixel_ratio = pixel_ratio;
			surface.configure(self.size, pixel_ratio)?;
		}
		Ok(())
	}

	fn rasterize<S: RenderSurface>(&mut self, surface: &S) -> Result<(), LoaderError> {
		let mut field = TargetField::rasterize(surface, self.current_word(), self.size, &self.settings)?;
		field.shuffle(&mut self.rng);
		let cx = AssignContext {
			settings: &self.settings,
			palette: &self.config.theme.palette,
			size: self.size,
			word_index: self.word_index,
		};
		self.last_assignment = assign_targets(&mut self.particles, &field, &cx, &mut self.rng);
		Ok(())
	}

	fn update_particles(&mut self) {
		let (w, h) = (self.size.width, self.size.height);
		let margin = self.config.kill_margin;
		let mut i = 0;
		while i < self.particles.len() {
			let particle = &mut self.particles[i];
			particle.step();
			particle.update_color();
			if particle.is_killed && particle.is_outside(w, h, margin) {
				// The swapped-in particle has not been stepped yet this frame.
				self.particles.swap_remove(i);
				continue;
			}
			i += 1;
		}
	}
}
