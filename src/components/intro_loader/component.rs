//! Leptos component wrapping the intro engine in a full-screen overlay.
//!
//! The component probes the container until it reports sane dimensions,
//! mounts the engine on the canvas, and drives it from
//! `requestAnimationFrame`. Two timers (minimum display, safety net) and the
//! skip button race to start the exit. All of them go through the
//! [`IntroSession`], which lets exactly one win; the component only applies
//! the DOM side of the resulting events.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{EventTarget, HtmlCanvasElement, Window};

use super::canvas::CanvasSurface;
use super::engine::{IntroConfig, IntroEngine};
use super::error::LoaderError;
use super::lifecycle::{DEFAULT_MIN_DISPLAY_MS, ExitSchedule, ExitTrigger, Lifecycle, LifecycleEvent, Phase};
use super::session::IntroSession;
use super::settings::DeviceCapabilities;
use super::surface::LogicalSize;
use super::theme::Theme;
use super::viewport::{ProbeStep, ViewportProbe};

/// Body class added when the exit begins, so page chrome can fade in.
pub const COMPLETE_CLASS: &str = "intro-complete";

/// Every outstanding browser callback, so unmount can cancel them all.
#[derive(Default)]
struct Handles {
	frame: Cell<Option<i32>>,
	timers: RefCell<Vec<i32>>,
	listeners: RefCell<Vec<(EventTarget, &'static str, Closure<dyn FnMut()>)>>,
	animate: RefCell<Option<Closure<dyn FnMut()>>>,
	probe: RefCell<Option<Closure<dyn FnMut()>>>,
	torn_down: Cell<bool>,
}

impl Handles {
	fn request_frame(&self, cb: &RefCell<Option<Closure<dyn FnMut()>>>) {
		if self.torn_down.get() {
			return;
		}
		let cb = cb.borrow().as_ref().map(|c| JsValue::clone(c.as_ref()));
		let (Some(window), Some(cb)) = (web_sys::window(), cb) else {
			return;
		};
		if let Ok(id) = window.request_animation_frame(cb.unchecked_ref()) {
			self.frame.set(Some(id));
		}
	}

	fn set_timeout(&self, ms: f64, f: impl FnOnce() + 'static) {
		if self.torn_down.get() {
			return;
		}
		let Some(window) = web_sys::window() else {
			return;
		};
		let cb = Closure::once_into_js(f);
		match window.set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), ms.round() as i32) {
			Ok(id) => self.timers.borrow_mut().push(id),
			Err(e) => warn!("intro: setTimeout failed: {}", LoaderError::js_message(&e)),
		}
	}

	fn listen(&self, target: &EventTarget, event: &'static str, cb: Closure<dyn FnMut()>) {
		match target.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref()) {
			Ok(()) => self.listeners.borrow_mut().push((target.clone(), event, cb)),
			Err(e) => warn!("intro: cannot listen for {event}: {}", LoaderError::js_message(&e)),
		}
	}

	fn teardown(&self) {
		if self.torn_down.replace(true) {
			return;
		}
		if let Some(window) = web_sys::window() {
			if let Some(id) = self.frame.take() {
				let _ = window.cancel_animation_frame(id);
			}
			for id in self.timers.borrow_mut().drain(..) {
				window.clear_timeout_with_handle(id);
			}
		}
		for (target, event, cb) in self.listeners.borrow_mut().drain(..) {
			let _ = target.remove_event_listener_with_callback(event, cb.as_ref().unchecked_ref());
		}
		self.probe.borrow_mut().take();
		// Dropping the frame closure is safe: teardown never runs inside it.
		self.animate.borrow_mut().take();
	}
}

fn now_ms() -> f64 {
	web_sys::window()
		.and_then(|w| w.performance())
		.map(|p| p.now())
		.unwrap_or_else(js_sys::Date::now)
}

fn js_f64(value: Result<JsValue, JsValue>) -> f64 {
	value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
}

fn window_size(window: &Window) -> LogicalSize {
	let inner = LogicalSize::new(js_f64(window.inner_width()), js_f64(window.inner_height()));
	let screen = window.screen().ok().map(|s| {
		LogicalSize::new(
			s.width().unwrap_or(0) as f64,
			s.height().unwrap_or(0) as f64,
		)
	});
	ViewportProbe::sanitize_window(inner, screen)
}

fn detect_capabilities(window: &Window) -> DeviceCapabilities {
	let reduced_motion = window
		.match_media("(prefers-reduced-motion: reduce)")
		.ok()
		.flatten()
		.is_some_and(|m| m.matches());
	let cores = window.navigator().hardware_concurrency();
	DeviceCapabilities {
		reduced_motion,
		hardware_concurrency: (cores.is_finite() && cores >= 1.0).then_some(cores as u32),
		device_pixel_ratio: window.device_pixel_ratio(),
		viewport_width: window_size(window).width,
	}
}

fn random_seed() -> u64 {
	let hi = (js_sys::Math::random() * u32::MAX as f64) as u64;
	let lo = (js_sys::Math::random() * u32::MAX as f64) as u64;
	(hi << 32) | lo
}

fn mark_document_complete() {
	let body = web_sys::window()
		.and_then(|w| w.document())
		.and_then(|d| d.body());
	let Some(body) = body else {
		warn!("intro: no document body to mark {COMPLETE_CLASS}");
		return;
	};
	if let Err(e) = body.class_list().add_1(COMPLETE_CLASS) {
		warn!("intro: cannot add {COMPLETE_CLASS}: {}", LoaderError::js_message(&e));
	}
}

fn start_engine(canvas: &HtmlCanvasElement, size: LogicalSize) -> Result<(IntroEngine, CanvasSurface), LoaderError> {
	let mut surface = CanvasSurface::new(canvas.clone())?;
	let capabilities = web_sys::window()
		.map(|w| detect_capabilities(&w))
		.unwrap_or_default();
	let mut engine = IntroEngine::new(IntroConfig::default(), capabilities, random_seed());
	engine.mount(&mut surface, size)?;
	Ok((engine, surface))
}

/// State shared by every callback of one mounted loader.
struct Loader {
	session: RefCell<IntroSession<CanvasSurface>>,
	handles: Handles,
	fading: RwSignal<bool>,
	visible: RwSignal<bool>,
	container: NodeRef<leptos::html::Div>,
}

impl Loader {
	fn measure(&self) -> Option<LogicalSize> {
		let rect = self.container.get_untracked()?.get_bounding_client_rect();
		Some(LogicalSize::new(rect.width(), rect.height()))
	}
}

fn trigger(loader: &Rc<Loader>, trigger: ExitTrigger) {
	let event = loader.session.borrow_mut().trigger(trigger, now_ms());
	dispatch(loader, event);
}

/// Let the lifecycle fire whatever deadline is due.
fn poll(loader: &Rc<Loader>) {
	let event = loader.session.borrow_mut().advance(now_ms());
	dispatch(loader, event);
}

fn dispatch(loader: &Rc<Loader>, event: Option<LifecycleEvent>) {
	match event {
		Some(LifecycleEvent::ExitStarted(_)) => {
			mark_document_complete();
			loader.fading.set(true);
			let fade_ms = loader.session.borrow().lifecycle().schedule().fade_out_ms;
			let loader_fade = loader.clone();
			loader.handles.set_timeout(fade_ms, move || poll(&loader_fade));
		}
		Some(LifecycleEvent::Completed) => {
			loader.handles.teardown();
			loader.visible.set(false);
			if let Some(el) = loader.container.get_untracked() {
				el.remove();
			}
			info!("intro: finished");
		}
		None => {}
	}
}

/// Full-screen particle intro.
///
/// Shows the brand name as a swarm of particles for at least `min_display_ms`
/// milliseconds (8 seconds at most, unless the minimum is longer), then fades
/// out, removes itself and calls `on_complete`. The skip button starts the
/// exit immediately.
#[component]
pub fn IntroLoader(
	#[prop(optional)] on_complete: Option<Callback<()>>,
	#[prop(default = DEFAULT_MIN_DISPLAY_MS)] min_display_ms: f64,
) -> impl IntoView {
	let container_ref = NodeRef::<leptos::html::Div>::new();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let fading = RwSignal::new(false);
	let visible = RwSignal::new(true);
	let theme = Theme::default();

	let schedule = ExitSchedule::new(min_display_ms);
	let lifecycle = Lifecycle::new(
		schedule,
		now_ms(),
		Some(Box::new(move || {
			if let Some(cb) = on_complete {
				cb.run(());
			}
		})),
	);
	let loader = Rc::new(Loader {
		session: RefCell::new(IntroSession::new(lifecycle)),
		handles: Handles::default(),
		fading,
		visible,
		container: container_ref,
	});

	let loader_init = loader.clone();
	let started = Cell::new(false);
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if started.replace(true) {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			warn!("intro: no window");
			trigger(&loader_init, ExitTrigger::Failure);
			return;
		};
		let handles = &loader_init.handles;

		// Racing exit timers
		let loader_min = loader_init.clone();
		handles.set_timeout(schedule.min_display_ms, move || poll(&loader_min));
		let loader_safety = loader_init.clone();
		handles.set_timeout(schedule.safety_net_ms, move || poll(&loader_safety));

		// Frame loop
		let loader_anim = loader_init.clone();
		*handles.animate.borrow_mut() = Some(Closure::new(move || {
			if loader_anim.session.borrow().phase() == Phase::Unmounted {
				return;
			}
			let result = loader_anim.session.borrow_mut().tick(now_ms());
			if let Err(e) = result {
				warn!("intro: frame failed: {e}");
			}
			loader_anim.handles.request_frame(&loader_anim.handles.animate);
		}));

		// Resize handling for both the window and the visual viewport
		let (loader_resize, window_resize) = (loader_init.clone(), window.clone());
		let on_resize = Rc::new(move || {
			let size = loader_resize
				.measure()
				.filter(LogicalSize::is_valid)
				.unwrap_or_else(|| window_size(&window_resize));
			let result = loader_resize.session.borrow_mut().resize(size);
			if let Err(e) = result {
				warn!("intro: resize failed: {e}");
			}
		});
		let on_window_resize = on_resize.clone();
		handles.listen(&window, "resize", Closure::new(move || on_window_resize()));
		if let Some(viewport) = window.visual_viewport() {
			let on_viewport_resize = on_resize.clone();
			handles.listen(&viewport, "resize", Closure::new(move || on_viewport_resize()));
		}

		// Startup probe: wait for the container to settle, then mount.
		let probe = RefCell::new(ViewportProbe::new(window_size(&window)));
		let loader_probe = loader_init.clone();
		*handles.probe.borrow_mut() = Some(Closure::new(move || {
			if loader_probe.session.borrow().lifecycle().is_exiting() {
				return;
			}
			let step = probe.borrow_mut().observe(loader_probe.measure());
			let size = match step {
				ProbeStep::Ready(size) => size,
				ProbeStep::Fallback(size) => {
					warn!("intro: container never settled, using window size");
					size
				}
				ProbeStep::Retry { delay_ms } => {
					let loader_retry = loader_probe.clone();
					loader_probe.handles.set_timeout(delay_ms as f64, move || {
						loader_retry.handles.request_frame(&loader_retry.handles.probe);
					});
					return;
				}
			};

			match start_engine(&canvas, size) {
				Ok((engine, surface)) => {
					info!(
						"intro: mounted {}x{} at tier {}, {} particles",
						size.width,
						size.height,
						engine.tier().name(),
						engine.particles().len()
					);
					let running = loader_probe.session.borrow_mut().start(engine, surface);
					if running {
						loader_probe.handles.request_frame(&loader_probe.handles.animate);
					}
				}
				Err(e) => {
					warn!("intro: cannot start: {e}");
					trigger(&loader_probe, ExitTrigger::Failure);
				}
			}
		}));
		handles.request_frame(&handles.probe);
	});

	let loader_cleanup = StoredValue::new_local(loader.clone());
	on_cleanup(move || {
		loader_cleanup.try_with_value(|l| l.handles.teardown());
	});

	let on_skip = move |_| trigger(&loader, ExitTrigger::Skip);

	let background = theme.palette.background.to_css();
	let text = theme.palette.text;
	let overlay = theme.overlay_gradient_css();

	view! {
		<div
			node_ref=container_ref
			data-intro-loader=""
			class="intro-loader"
			style:position="fixed"
			style:inset="0"
			style:z-index="99999"
			style:display=move || if visible.get() { "flex" } else { "none" }
			style:align-items="center"
			style:justify-content="center"
			style:transition="opacity 700ms"
			style:opacity=move || if fading.get() { "0" } else { "1" }
			style:background=background
		>
			<canvas
				node_ref=canvas_ref
				style="position: absolute; inset: 0; width: 100%; height: 100%;"
			/>
			<div
				style:pointer-events="none"
				style:position="absolute"
				style:inset="0"
				style:background=overlay
			/>
			<button
				on:click=on_skip
				aria-label="Пропустить"
				style:position="absolute"
				style:right="2rem"
				style:bottom="2rem"
				style:z-index="10"
				style:font-size="0.875rem"
				style:background="none"
				style:border="none"
				style:cursor="pointer"
				style:color=text.with_alpha(0.4).to_css()
			>
				"Пропустить →"
			</button>
		</div>
	}
}
