//! Turning a word into target coordinates for the particle pool.
//!
//! A word is drawn into an offscreen bitmap the size of the logical canvas,
//! the alpha channel is sampled with a configurable stride, and the lit
//! coordinates are shuffled and handed out to particles.

use glam::DVec2;
use rand::Rng;
use rand::seq::SliceRandom;

use super::error::LoaderError;
use super::particle::Particle;
use super::settings::ResponsiveSettings;
use super::surface::{LogicalSize, RenderSurface, TextBitmap};
use super::theme::BrandPalette;

/// Baseline offset, as a fraction of the font size, that visually centers
/// capital letters on the canvas midline.
const BASELINE_FACTOR: f64 = 0.35;

/// Lit pixel coordinates of a rasterized word, in logical pixels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TargetField {
	/// One point per sampled lit pixel.
	pub points: Vec<DVec2>,
}

impl TargetField {
	/// Rasterize `word` centered on a canvas of `size` and sample it.
	///
	/// Centering is done by hand from the measured advance width instead of
	/// relying on the bitmap's own text alignment. The returned points are in
	/// raster order; call [`TargetField::shuffle`] before assigning them.
	pub fn rasterize<S: RenderSurface>(
		surface: &S,
		word: &str,
		size: LogicalSize,
		settings: &ResponsiveSettings,
	) -> Result<Self, LoaderError> {
		if !size.is_valid() {
			return Err(LoaderError::InvalidSize {
				width: size.width,
				height: size.height,
			});
		}
		let (width, height) = size.pixel_size();
		let font_size = settings.font_size(size.width);
		let mut bitmap = surface.create_bitmap(width, height, font_size)?;

		let text_width = bitmap.measure_text(word)?;
		let x = (size.width - text_width) / 2.0;
		let y = size.height / 2.0 + font_size * BASELINE_FACTOR;
		bitmap.fill_text(word, x, y)?;

		let points = bitmap
			.alpha_mask()?
			.lit_pixels(settings.pixel_steps)
			.into_iter()
			.map(|(x, y)| DVec2::new(x, y))
			.collect();
		Ok(Self { points })
	}

	/// Uniform random permutation, so glyphs do not fill in scan order.
	pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
		self.points.shuffle(rng);
	}

	/// Number of targets.
	pub fn len(&self) -> usize {
		self.points.len()
	}

	/// True when the word produced no lit pixels.
	pub fn is_empty(&self) -> bool {
		self.points.is_empty()
	}
}

/// Counts produced by [`assign_targets`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Assignment {
	/// Existing particles given a new target.
	pub reused: usize,
	/// Particles created for the remaining targets.
	pub spawned: usize,
	/// Surplus particles sent off-screen.
	pub killed: usize,
}

/// Everything [`assign_targets`] needs besides the pool and the field.
pub struct AssignContext<'a> {
	/// Ranges for spawned particles.
	pub settings: &'a ResponsiveSettings,
	/// Word, start and background colors.
	pub palette: &'a BrandPalette,
	/// Spawn and kill radii derive from it.
	pub size: LogicalSize,
	/// Selects the word color.
	pub word_index: usize,
}

/// Hand out the field's coordinates to the pool.
///
/// Existing particles are reused first, in pool order, and revived if they
/// had been killed. Missing particles are spawned off-screen with a random
/// brand start color. Particles beyond the field's length are killed.
pub fn assign_targets<R: Rng + ?Sized>(
	pool: &mut Vec<Particle>,
	field: &TargetField,
	cx: &AssignContext<'_>,
	rng: &mut R,
) -> Assignment {
	let word_color = cx.palette.word_color(cx.word_index);
	let reused = pool.len().min(field.len());

	for (particle, &target) in pool.iter_mut().zip(&field.points) {
		particle.is_killed = false;
		particle.retarget_color(word_color);
		particle.target = target;
	}

	let spawned = field.len() - reused;
	pool.reserve(spawned);
	for &target in &field.points[reused..] {
		let start_color = cx.palette.random_brand(rng.gen_bool(0.5));
		let mut particle = Particle::spawn(
			rng,
			cx.settings,
			cx.size.width,
			cx.size.height,
			start_color,
			word_color,
		);
		particle.target = target;
		pool.push(particle);
	}

	let mut killed = 0;
	for particle in &mut pool[reused + spawned..] {
		particle.kill(rng, cx.size.width, cx.size.height, cx.palette.background);
		killed += 1;
	}

	Assignment {
		reused,
		spawned,
		killed,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::intro_loader::settings::{DeviceCapabilities, PerformanceTier};
	use crate::components::intro_loader::testing::FakeSurface;
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	fn settings(width: f64) -> ResponsiveSettings {
		ResponsiveSettings::derive(width, &DeviceCapabilities::default(), PerformanceTier::High)
	}

	fn field(points: usize) -> TargetField {
		TargetField {
			points: (0..points).map(|i| DVec2::new(i as f64, 2.0 * i as f64)).collect(),
		}
	}

	fn context<'a>(settings: &'a ResponsiveSettings, palette: &'a BrandPalette) -> AssignContext<'a> {
		AssignContext {
			settings,
			palette,
			size: LogicalSize::new(400.0, 300.0),
			word_index: 1,
		}
	}

	#[test]
	fn rasterized_word_is_centered() {
		let surface = FakeSurface::default();
		let size = LogicalSize::new(400.0, 300.0);
		let s = settings(size.width);
		let field = TargetField::rasterize(&surface, "AAA", size, &s).unwrap();
		assert!(!field.is_empty());

		let n = field.len() as f64;
		let mean = field.points.iter().fold(DVec2::ZERO, |acc, p| acc + *p) / n;
		assert!((mean.x - 200.0).abs() < 12.0, "mean x {}", mean.x);
		assert!(field.points.iter().all(|p| p.x >= 0.0 && p.x < 400.0));
		assert!(field.points.iter().all(|p| p.y >= 0.0 && p.y < 300.0));
		assert_eq!(surface.rasterized_words(), vec!["AAA".to_string()]);
	}

	#[test]
	fn larger_stride_yields_fewer_points() {
		let surface = FakeSurface::default();
		let size = LogicalSize::new(1200.0, 800.0);
		let dense = settings(size.width);
		let sparse = ResponsiveSettings::derive(size.width, &DeviceCapabilities::default(), PerformanceTier::Minimal);
		let a = TargetField::rasterize(&surface, "URALLIANCE", size, &dense).unwrap();
		let b = TargetField::rasterize(&surface, "URALLIANCE", size, &sparse).unwrap();
		assert!(b.len() < a.len());
	}

	#[test]
	fn invalid_size_is_rejected() {
		let surface = FakeSurface::default();
		let s = settings(400.0);
		let err = TargetField::rasterize(&surface, "AAA", LogicalSize::new(0.0, 0.0), &s);
		assert!(matches!(err, Err(LoaderError::InvalidSize { .. })));
	}

	#[test]
	fn failed_text_metrics_abort_rasterization() {
		let surface = FakeSurface {
			broken_metrics: true,
			..FakeSurface::default()
		};
		let s = settings(400.0);
		let err = TargetField::rasterize(&surface, "AAA", LogicalSize::new(400.0, 300.0), &s);
		assert!(matches!(err, Err(LoaderError::Bitmap(_))));
		assert!(surface.rasterized_words().is_empty());
	}

	#[test]
	fn shuffle_is_a_permutation() {
		let mut rng = SmallRng::seed_from_u64(1);
		let original = field(500);
		let mut shuffled = original.clone();
		shuffled.shuffle(&mut rng);
		assert_ne!(shuffled, original);

		let key = |p: &DVec2| (p.x as i64, p.y as i64);
		let mut a: Vec<_> = original.points.iter().map(key).collect();
		let mut b: Vec<_> = shuffled.points.iter().map(key).collect();
		a.sort_unstable();
		b.sort_unstable();
		assert_eq!(a, b);
	}

	#[test]
	fn growing_pool_keeps_existing_particles() {
		let mut rng = SmallRng::seed_from_u64(2);
		let s = settings(400.0);
		let palette = BrandPalette::default();
		let cx = context(&s, &palette);

		let mut pool = Vec::new();
		assign_targets(&mut pool, &field(10), &cx, &mut rng);
		for (i, p) in pool.iter_mut().enumerate() {
			p.size = 100.0 + i as f64;
		}

		let result = assign_targets(&mut pool, &field(25), &cx, &mut rng);
		assert_eq!(
			result,
			Assignment {
				reused: 10,
				spawned: 15,
				killed: 0
			}
		);
		assert_eq!(pool.len(), 25);
		for (i, p) in pool.iter().take(10).enumerate() {
			assert_eq!(p.size, 100.0 + i as f64);
		}
		assert!(pool.iter().all(|p| !p.is_killed));
		assert!(pool.iter().all(|p| p.target_color == palette.tech));
	}

	#[test]
	fn shrinking_pool_kills_surplus() {
		let mut rng = SmallRng::seed_from_u64(4);
		let s = settings(400.0);
		let palette = BrandPalette::default();
		let cx = context(&s, &palette);

		let mut pool = Vec::new();
		assign_targets(&mut pool, &field(40), &cx, &mut rng);
		let result = assign_targets(&mut pool, &field(15), &cx, &mut rng);

		assert_eq!(result.killed, 25);
		assert_eq!(pool.len(), 40);
		assert!(pool[..15].iter().all(|p| !p.is_killed));
		assert!(pool[15..].iter().all(|p| p.is_killed));
		assert!(pool[15..].iter().all(|p| p.target_color == palette.background));
	}

	#[test]
	fn reused_particles_are_revived() {
		let mut rng = SmallRng::seed_from_u64(9);
		let s = settings(400.0);
		let palette = BrandPalette::default();
		let cx = context(&s, &palette);

		let mut pool = Vec::new();
		assign_targets(&mut pool, &field(5), &cx, &mut rng);
		assign_targets(&mut pool, &field(2), &cx, &mut rng);
		assert_eq!(pool.iter().filter(|p| p.is_killed).count(), 3);

		assign_targets(&mut pool, &field(5), &cx, &mut rng);
		assert!(pool.iter().all(|p| !p.is_killed));
		assert_eq!(pool[4].target, DVec2::new(4.0, 8.0));
	}

	#[test]
	fn spawned_particles_start_off_screen() {
		let mut rng = SmallRng::seed_from_u64(12);
		let s = settings(400.0);
		let palette = BrandPalette::default();
		let cx = context(&s, &palette);

		let mut pool = Vec::new();
		assign_targets(&mut pool, &field(50), &cx, &mut rng);
		let center = DVec2::new(200.0, 150.0);
		for p in &pool {
			assert!((p.position.distance(center) - 350.0).abs() < 1e-9);
			assert!(p.start_color == palette.legal.to_vec3() || p.start_color == palette.tech.to_vec3());
			assert!((s.speed_min..s.speed_max).contains(&p.max_speed));
			assert!((p.max_force - p.max_speed * 0.08).abs() < 1e-12);
		}
	}
}
