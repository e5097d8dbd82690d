//! uralliance-intro: particle-text intro loader for the Uralliance website.
//!
//! This crate provides a WASM-based overlay that spells the company name in
//! particles while the page loads, then fades out and hands control back to
//! the host page.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::intro_loader::{IntroConfig, IntroEngine, IntroLoader, LoaderError, LoaderOptions};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("uralliance-intro: logging initialized");
}

/// Load loader options from a script element with id="intro-config".
/// Expected format: JSON with { "minDisplayTime": <ms> }
fn load_options() -> Option<LoaderOptions> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("intro-config")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<LoaderOptions>(&json_text) {
		Ok(options) => {
			info!("uralliance-intro: min display time {} ms", options.min_display_time);
			Some(options)
		}
		Err(e) => {
			warn!("uralliance-intro: failed to parse intro config: {}", e);
			None
		}
	}
}

/// Main application component.
/// Reads options from the DOM and shows the intro overlay on top of the page.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let options = load_options().unwrap_or_default();

	view! {
		<Html attr:lang="ru" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="ЮРАЛЬЯНС" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<IntroLoader
			min_display_ms=options.min_display_time
			on_complete=Callback::new(|_| info!("uralliance-intro: intro complete"))
		/>
	}
}
