//! [`RenderSurface`] backed by an HTML canvas.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use super::error::LoaderError;
use super::surface::{AlphaMask, LogicalSize, RenderSurface, TextBitmap};
use super::theme::Color;

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, LoaderError> {
	canvas
		.get_context("2d")
		.map_err(|e| LoaderError::ContextUnavailable(LoaderError::js_message(&e)))?
		.ok_or_else(|| LoaderError::ContextUnavailable("getContext returned null".into()))?
		.dyn_into::<CanvasRenderingContext2d>()
		.map_err(|_| LoaderError::ContextUnavailable("not a 2d context".into()))
}

/// The visible full-screen canvas.
pub struct CanvasSurface {
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	document: Document,
}

impl CanvasSurface {
	/// Wrap a mounted canvas. Fails if it has no 2d context or no owner document.
	pub fn new(canvas: HtmlCanvasElement) -> Result<Self, LoaderError> {
		let ctx = context_2d(&canvas)?;
		let document = canvas
			.owner_document()
			.ok_or(LoaderError::CanvasMissing)?;
		Ok(Self {
			canvas,
			ctx,
			document,
		})
	}
}

impl RenderSurface for CanvasSurface {
	type Bitmap = CanvasBitmap;

	fn configure(&mut self, size: LogicalSize, pixel_ratio: f64) -> Result<(), LoaderError> {
		let (w, h) = size.backing_size(pixel_ratio);
		self.canvas.set_width(w);
		self.canvas.set_height(h);
		// Resizing normally resets the context, but not on every browser.
		// Reset explicitly so the scale never compounds.
		self.ctx
			.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
			.map_err(|e| LoaderError::ContextUnavailable(LoaderError::js_message(&e)))?;
		self.ctx
			.scale(pixel_ratio, pixel_ratio)
			.map_err(|e| LoaderError::ContextUnavailable(LoaderError::js_message(&e)))
	}

	fn fill_rect(&mut self, color: Color, x: f64, y: f64, width: f64, height: f64) {
		self.ctx.set_fill_style_str(&color.to_css());
		self.ctx.fill_rect(x, y, width, height);
	}

	fn set_fill(&mut self, color: Color) {
		self.ctx.set_fill_style_str(&color.to_css_rgb());
	}

	fn draw_square(&mut self, x: f64, y: f64, side: f64) {
		self.ctx.fill_rect(x, y, side, side);
	}

	fn create_bitmap(&self, width: u32, height: u32, font_size: f64) -> Result<CanvasBitmap, LoaderError> {
		let canvas: HtmlCanvasElement = self
			.document
			.create_element("canvas")
			.map_err(|e| LoaderError::Bitmap(LoaderError::js_message(&e)))?
			.dyn_into()
			.map_err(|_| LoaderError::Bitmap("created element is not a canvas".into()))?;
		canvas.set_width(width);
		canvas.set_height(height);
		let ctx = context_2d(&canvas).map_err(|e| LoaderError::Bitmap(e.to_string()))?;

		// Full state reset. Some Android builds leak RTL direction or italics
		// into fresh contexts.
		let js = |e| LoaderError::Bitmap(LoaderError::js_message(&e));
		ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0).map_err(js)?;
		ctx.set_global_alpha(1.0);
		ctx.set_global_composite_operation("source-over").map_err(js)?;
		ctx.clear_rect(0.0, 0.0, width as f64, height as f64);
		js_sys::Reflect::set(&ctx, &"direction".into(), &"ltr".into()).map_err(js)?;
		ctx.set_fill_style_str("white");
		ctx.set_font(&format!("normal bold {font_size}px sans-serif"));
		ctx.set_text_align("left");
		ctx.set_text_baseline("alphabetic");

		Ok(CanvasBitmap { ctx, width, height })
	}
}

/// Offscreen canvas holding one rasterized word.
pub struct CanvasBitmap {
	ctx: CanvasRenderingContext2d,
	width: u32,
	height: u32,
}

impl TextBitmap for CanvasBitmap {
	fn measure_text(&self, text: &str) -> Result<f64, LoaderError> {
		self.ctx
			.measure_text(text)
			.map(|m| m.width())
			.map_err(|e| LoaderError::Bitmap(LoaderError::js_message(&e)))
	}

	fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), LoaderError> {
		self.ctx
			.fill_text(text, x, y)
			.map_err(|e| LoaderError::Bitmap(LoaderError::js_message(&e)))
	}

	fn alpha_mask(&self) -> Result<AlphaMask, LoaderError> {
		let image = self
			.ctx
			.get_image_data(0.0, 0.0, self.width as f64, self.height as f64)
			.map_err(|e| LoaderError::PixelReadback(LoaderError::js_message(&e)))?;
		// Row length comes from the image itself, which is authoritative.
		Ok(AlphaMask::from_rgba(image.width(), image.height(), &image.data()))
	}
}
