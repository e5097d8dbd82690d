//! Errors raised while talking to the host canvas.
//!
//! None of these are shown to the user. The component logs them and, if the
//! loader cannot start at all, goes straight to the exit sequence.

use thiserror::Error;

/// Failure of a host operation.
#[derive(Debug, Error)]
pub enum LoaderError {
	/// The canvas is detached from any document.
	#[error("canvas element is not mounted")]
	CanvasMissing,

	/// No 2d context, or its transform could not be set.
	#[error("2d rendering context unavailable: {0}")]
	ContextUnavailable(String),

	/// Offscreen canvas creation, text metrics or text drawing failed.
	#[error("failed to create offscreen bitmap: {0}")]
	Bitmap(String),

	/// `getImageData` threw, usually on an oversized canvas.
	#[error("failed to read back pixels: {0}")]
	PixelReadback(String),

	/// Zero, negative or non-finite logical size.
	#[error("invalid canvas size {width}x{height}")]
	InvalidSize { width: f64, height: f64 },
}

impl LoaderError {
	/// Describe a JS exception thrown by a web API.
	pub fn js_message(value: &wasm_bindgen::JsValue) -> String {
		value
			.as_string()
			.or_else(|| {
				js_sys::Reflect::get(value, &"message".into())
					.ok()
					.and_then(|m| m.as_string())
			})
			.unwrap_or_else(|| format!("{value:?}"))
	}
}
