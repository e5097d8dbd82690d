//! Per-frame compositing of the particle pool.
//!
//! Rendering happens in two steps:
//! 1. A translucent background fill fades the previous frame, leaving trails
//! 2. Particles are bucketed by quantized color and drawn bucket by bucket,
//!    so the fill style changes once per bucket instead of once per particle

use super::particle::Particle;
use super::surface::{LogicalSize, RenderSurface};
use super::theme::{Color, Theme};

/// Reusable scratch space for color bucketing.
#[derive(Clone, Debug, Default)]
pub struct ColorBuckets {
	/// `(bucket key, particle index)`, sorted by key before drawing.
	entries: Vec<(u32, u32)>,
}

impl ColorBuckets {
	/// Group `particles` by quantized color. Returns the number of buckets.
	pub fn fill(&mut self, particles: &[Particle]) -> usize {
		self.entries.clear();
		self.entries.extend(
			particles
				.iter()
				.enumerate()
				.map(|(i, p)| (p.current_color.bucket_key(), i as u32)),
		);
		self.entries.sort_unstable();
		self.bucket_count()
	}

	/// Distinct quantized colors found by the last fill.
	pub fn bucket_count(&self) -> usize {
		self.entries
			.chunk_by(|a, b| a.0 == b.0)
			.count()
	}

	/// Visit every bucket as `(color, particle indices)`.
	pub fn for_each(&self, mut f: impl FnMut(Color, &mut dyn Iterator<Item = usize>)) {
		for run in self.entries.chunk_by(|a, b| a.0 == b.0) {
			let color = Color::from_bucket_key(run[0].0);
			f(color, &mut run.iter().map(|&(_, i)| i as usize));
		}
	}
}

/// Paint the trail fill over the whole logical canvas.
pub fn draw_trail<S: RenderSurface>(surface: &mut S, size: LogicalSize, theme: &Theme) {
	surface.fill_rect(theme.trail_color(), 0.0, 0.0, size.width, size.height);
}

/// Paint an opaque background, used once before the first frame.
pub fn draw_background<S: RenderSurface>(surface: &mut S, size: LogicalSize, theme: &Theme) {
	surface.fill_rect(theme.palette.background, 0.0, 0.0, size.width, size.height);
}

/// Draw every particle as a filled square, batched by color.
pub fn draw_particles<S: RenderSurface>(surface: &mut S, particles: &[Particle], buckets: &mut ColorBuckets) {
	buckets.fill(particles);
	buckets.for_each(|color, indices| {
		surface.set_fill(color);
		for i in indices {
			let p = &particles[i];
			surface.draw_square(p.position.x, p.position.y, p.size.max(0.0));
		}
	});
}
