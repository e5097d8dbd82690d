//! Drawing abstraction between the engine and the host canvas.
//!
//! The engine only needs a handful of 2D operations: size the backing store,
//! fill rectangles, and rasterize a word into an offscreen bitmap whose alpha
//! channel can be read back. Keeping these behind [`RenderSurface`] lets the
//! steering, rasterization and tiering logic run in plain unit tests.
//!
//! All coordinates are logical (CSS) pixels. Implementations are responsible
//! for mapping them onto device pixels.

use super::error::LoaderError;
use super::theme::Color;

/// Logical (CSS-pixel) size of the drawing area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogicalSize {
	/// CSS pixels.
	pub width: f64,
	/// CSS pixels.
	pub height: f64,
}

impl LogicalSize {
	/// Size in CSS pixels.
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	/// Both sides finite and positive.
	pub fn is_valid(&self) -> bool {
		self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
	}

	/// Backing-store size in device pixels for `pixel_ratio`.
	pub fn backing_size(&self, pixel_ratio: f64) -> (u32, u32) {
		(
			(self.width * pixel_ratio).round().max(1.0) as u32,
			(self.height * pixel_ratio).round().max(1.0) as u32,
		)
	}

	/// Size of a 1:1 offscreen bitmap covering this area.
	pub fn pixel_size(&self) -> (u32, u32) {
		self.backing_size(1.0)
	}
}

/// Alpha channel of a rasterized bitmap, row-major.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AlphaMask {
	/// Pixels per row.
	pub width: u32,
	/// Rows.
	pub height: u32,
	/// Row-major alpha values.
	pub alpha: Vec<u8>,
}

impl AlphaMask {
	/// Fully transparent mask.
	pub fn new(width: u32, height: u32) -> Self {
		Self {
			width,
			height,
			alpha: vec![0; width as usize * height as usize],
		}
	}

	/// Extract the alpha channel from packed RGBA bytes.
	pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Self {
		Self {
			width,
			height,
			alpha: rgba.chunks_exact(4).map(|px| px[3]).collect(),
		}
	}

	/// Coordinates of every lit pixel visited with stride `step` over the
	/// flattened pixel index.
	///
	/// The stride runs across row boundaries, matching a linear walk of the
	/// image buffer rather than a 2D grid.
	pub fn lit_pixels(&self, step: usize) -> Vec<(f64, f64)> {
		let width = self.width.max(1) as usize;
		self.alpha
			.iter()
			.enumerate()
			.step_by(step.max(1))
			.filter(|&(_, &a)| a > 0)
			.map(|(i, _)| ((i % width) as f64, (i / width) as f64))
			.collect()
	}
}

/// Offscreen bitmap used to rasterize a single word.
pub trait TextBitmap {
	/// Advance width of `text` in the current font.
	fn measure_text(&self, text: &str) -> Result<f64, LoaderError>;

	/// Draw `text` left-aligned with its alphabetic baseline at `(x, y)`.
	fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), LoaderError>;

	/// Read back the alpha channel of the whole bitmap.
	fn alpha_mask(&self) -> Result<AlphaMask, LoaderError>;
}

/// The visible canvas plus a factory for offscreen bitmaps.
pub trait RenderSurface {
	type Bitmap: TextBitmap;

	/// Resize the backing store to `size * pixel_ratio` and reset the
	/// transform so that subsequent drawing uses logical units.
	fn configure(&mut self, size: LogicalSize, pixel_ratio: f64) -> Result<(), LoaderError>;

	/// Fill the rectangle with `color`, honoring its alpha.
	fn fill_rect(&mut self, color: Color, x: f64, y: f64, width: f64, height: f64);

	/// Select the fill color for the following [`RenderSurface::draw_square`] calls.
	fn set_fill(&mut self, color: Color);

	/// Fill an axis-aligned square with the current fill color.
	fn draw_square(&mut self, x: f64, y: f64, side: f64);

	/// A cleared bitmap of `width x height` pixels with a bold sans-serif
	/// font of `font_size` pixels selected.
	fn create_bitmap(&self, width: u32, height: u32, font_size: f64) -> Result<Self::Bitmap, LoaderError>;
}
