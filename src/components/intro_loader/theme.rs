//! Brand colors and visual style for the intro loader.
//!
//! Particle colors are blended in RGB space and drawn as opaque fills, so the
//! [`Color`] alpha channel only matters for the translucent trail fill.

use glam::DVec3;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red.
	pub r: u8,
	/// Green.
	pub g: u8,
	/// Blue.
	pub b: u8,
	/// Alpha in `[0, 1]`.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with alpha.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same channels, new alpha.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// RGB channels as floats, for blending without losing precision.
	pub fn to_vec3(self) -> DVec3 {
		DVec3::new(self.r as f64, self.g as f64, self.b as f64)
	}

	/// Opaque color from float channels.
	///
	/// Channels are truncated toward zero, not rounded, and clamped to a
	/// valid byte. NaN becomes 0.
	pub fn from_vec3(rgb: DVec3) -> Self {
		let channel = |v: f64| if v.is_nan() { 0 } else { v.clamp(0.0, 255.0) as u8 };
		Self::rgb(channel(rgb.x), channel(rgb.y), channel(rgb.z))
	}

	/// Round every channel down to a multiple of 8.
	///
	/// Used as the bucket key when batching fills, see [`Color::bucket_key`].
	pub fn quantized(self) -> Self {
		Self {
			r: self.r & !0b111,
			g: self.g & !0b111,
			b: self.b & !0b111,
			a: self.a,
		}
	}

	/// Packed `0xRRGGBB` key of the quantized color.
	pub fn bucket_key(self) -> u32 {
		let q = self.quantized();
		((q.r as u32) << 16) | ((q.g as u32) << 8) | q.b as u32
	}

	/// Inverse of [`Color::bucket_key`].
	pub fn from_bucket_key(key: u32) -> Self {
		Self::rgb((key >> 16) as u8, (key >> 8) as u8, key as u8)
	}

	/// Hex when opaque, `rgba(...)` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}

	/// Compact `rgb(r,g,b)`, ignoring alpha.
	pub fn to_css_rgb(self) -> String {
		format!("rgb({},{},{})", self.r, self.g, self.b)
	}
}

/// Company palette. Each word converges to one of the two brand colors.
#[derive(Clone, Debug)]
pub struct BrandPalette {
	/// Gold, the legal side of the business.
	pub legal: Color,
	/// Cyan, the tech side of the business.
	pub tech: Color,
	/// Primary text color.
	pub text: Color,
	/// Page background. Killed particles fade toward it.
	pub background: Color,
}

impl BrandPalette {
	/// The company palette.
	pub fn uralliance() -> Self {
		Self {
			legal: Color::rgb(212, 175, 55), // #d4af37
			tech: Color::rgb(6, 182, 212),   // #06b6d4
			text: Color::rgb(226, 232, 240), // #e2e8f0
			background: Color::rgb(11, 11, 12),
		}
	}

	/// Solid color a whole word converges to: index 0 is legal, every other
	/// index is tech.
	pub fn word_color(&self, word_index: usize) -> Color {
		if word_index == 0 { self.legal } else { self.tech }
	}

	/// Pick one of the two brand colors with equal probability.
	pub fn random_brand(&self, coin: bool) -> Color {
		if coin { self.legal } else { self.tech }
	}
}

impl Default for BrandPalette {
	fn default() -> Self {
		Self::uralliance()
	}
}

/// Visual style of the loader overlay.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Brand colors.
	pub palette: BrandPalette,
	/// Alpha of the per-frame background fill. Lower values leave longer trails.
	pub trail_alpha: f64,
	/// Strength of the brand-colored radial glows behind the canvas.
	pub glow_alpha: f64,
}

impl Theme {
	/// Translucent background painted every frame.
	pub fn trail_color(&self) -> Color {
		self.palette.background.with_alpha(self.trail_alpha)
	}

	/// CSS `background` for the soft gradient layered over the canvas.
	pub fn overlay_gradient_css(&self) -> String {
		let (l, t) = (self.palette.legal, self.palette.tech);
		format!(
			"radial-gradient(70% 60% at 15% 25%, rgba({}, {}, {}, {a}), transparent 65%), \
			 radial-gradient(70% 60% at 85% 25%, rgba({}, {}, {}, {a}), transparent 65%)",
			l.r,
			l.g,
			l.b,
			t.r,
			t.g,
			t.b,
			a = self.glow_alpha
		)
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self {
			palette: BrandPalette::default(),
			trail_alpha: 0.15,
			glow_alpha: 0.08,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn float_channels_truncate_and_clamp() {
		let mid = Color::rgb(0, 0, 0).to_vec3().lerp(Color::rgb(255, 10, 3).to_vec3(), 0.5);
		assert_eq!(Color::from_vec3(mid), Color::rgb(127, 5, 1));
		assert_eq!(Color::from_vec3(DVec3::new(300.0, -4.0, f64::NAN)), Color::rgb(255, 0, 0));
		assert_eq!(Color::from_vec3(Color::rgb(6, 182, 212).to_vec3()), Color::rgb(6, 182, 212));
	}

	#[test]
	fn bucket_key_rounds_down_to_multiples_of_eight() {
		let c = Color::rgb(212, 175, 55);
		let q = Color::from_bucket_key(c.bucket_key());
		assert_eq!((q.r, q.g, q.b), (208, 168, 48));
		assert_eq!(Color::rgb(7, 7, 7).bucket_key(), 0);
	}

	#[test]
	fn words_map_to_brand_colors() {
		let p = BrandPalette::default();
		assert_eq!(p.word_color(0), p.legal);
		assert_eq!(p.word_color(1), p.tech);
	}

	#[test]
	fn trail_color_is_translucent_background() {
		let theme = Theme::default();
		assert_eq!(theme.trail_color().to_css(), "rgba(11, 11, 12, 0.15)");
	}

	#[test]
	fn overlay_glows_in_both_brand_colors() {
		let css = Theme::default().overlay_gradient_css();
		assert!(css.contains("rgba(212, 175, 55, 0.08)"));
		assert!(css.contains("rgba(6, 182, 212, 0.08)"));
		assert_eq!(css.matches("radial-gradient").count(), 2);
	}
}
