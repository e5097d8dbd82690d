//! Headless [`RenderSurface`] for unit tests.
//!
//! Text is rasterized as solid blocks, one per character, which is enough to
//! give words a stable, roughly glyph-shaped footprint.

use std::cell::RefCell;
use std::rc::Rc;

use super::error::LoaderError;
use super::surface::{AlphaMask, LogicalSize, RenderSurface, TextBitmap};
use super::theme::Color;

/// Advance width of one block glyph, relative to the font size.
const ADVANCE: f64 = 0.6;
/// Cap height of one block glyph, relative to the font size.
const CAP_HEIGHT: f64 = 0.7;

#[derive(Clone, Debug, Default)]
pub struct Recording {
	pub configured: Vec<(LogicalSize, f64)>,
	pub words: Vec<String>,
	pub bitmap_sizes: Vec<(u32, u32)>,
	pub fill_rects: Vec<Color>,
	pub fill_styles: Vec<Color>,
	pub squares: usize,
}

#[derive(Clone, Debug, Default)]
pub struct FakeSurface {
	pub log: Rc<RefCell<Recording>>,
	/// Make every `measure_text` on bitmaps from this surface fail.
	pub broken_metrics: bool,
}

impl FakeSurface {
	pub fn rasterized_words(&self) -> Vec<String> {
		self.log.borrow().words.clone()
	}

	pub fn take(&self) -> Recording {
		std::mem::take(&mut *self.log.borrow_mut())
	}
}

pub struct FakeBitmap {
	mask: AlphaMask,
	font_size: f64,
	broken_metrics: bool,
	log: Rc<RefCell<Recording>>,
}

impl TextBitmap for FakeBitmap {
	fn measure_text(&self, text: &str) -> Result<f64, LoaderError> {
		if self.broken_metrics {
			return Err(LoaderError::Bitmap("measureText threw".into()));
		}
		Ok(text.chars().count() as f64 * self.font_size * ADVANCE)
	}

	fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), LoaderError> {
		self.log.borrow_mut().words.push(text.to_string());
		let advance = self.font_size * ADVANCE;
		let top = (y - self.font_size * CAP_HEIGHT).max(0.0) as u32;
		let bottom = (y.max(0.0) as u32).min(self.mask.height);
		for i in 0..text.chars().count() {
			let left = x + advance * i as f64;
			let x0 = (left + advance * 0.1).max(0.0) as u32;
			let x1 = ((left + advance * 0.9).max(0.0) as u32).min(self.mask.width);
			for row in top..bottom {
				for col in x0..x1 {
					self.mask.alpha[(row * self.mask.width + col) as usize] = 255;
				}
			}
		}
		Ok(())
	}

	fn alpha_mask(&self) -> Result<AlphaMask, LoaderError> {
		Ok(self.mask.clone())
	}
}

impl RenderSurface for FakeSurface {
	type Bitmap = FakeBitmap;

	fn configure(&mut self, size: LogicalSize, pixel_ratio: f64) -> Result<(), LoaderError> {
		self.log.borrow_mut().configured.push((size, pixel_ratio));
		Ok(())
	}

	fn fill_rect(&mut self, color: Color, _x: f64, _y: f64, _width: f64, _height: f64) {
		self.log.borrow_mut().fill_rects.push(color);
	}

	fn set_fill(&mut self, color: Color) {
		self.log.borrow_mut().fill_styles.push(color);
	}

	fn draw_square(&mut self, _x: f64, _y: f64, _side: f64) {
		self.log.borrow_mut().squares += 1;
	}

	fn create_bitmap(&self, width: u32, height: u32, font_size: f64) -> Result<FakeBitmap, LoaderError> {
		self.log.borrow_mut().bitmap_sizes.push((width, height));
		Ok(FakeBitmap {
			mask: AlphaMask::new(width, height),
			font_size,
			broken_metrics: self.broken_metrics,
			log: self.log.clone(),
		})
	}
}
