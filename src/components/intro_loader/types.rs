//! Options the host page can pass to the loader.

use serde::Deserialize;

use super::lifecycle::DEFAULT_MIN_DISPLAY_MS;

/// Construction parameters supplied by the page, usually as JSON in a
/// `<script id="intro-config">` element.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LoaderOptions {
	/// Minimum time (ms) the intro stays on screen before exiting on its own.
	pub min_display_time: f64,
}

impl Default for LoaderOptions {
	fn default() -> Self {
		Self {
			min_display_time: DEFAULT_MIN_DISPLAY_MS,
		}
	}
}
