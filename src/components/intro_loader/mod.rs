//! Particle-text intro loader.
//!
//! Renders the brand name as a swarm of particles steering toward pixels of
//! the rasterized word, alternating between words until the page is ready:
//! - Seek steering with arrival damping and per-particle color blending
//! - Color-bucketed batch drawing over a translucent trail
//! - Adaptive quality tiers driven by measured frame rate
//! - Exit sequence raced between timers and a skip button
//!
//! The simulation ([`IntroEngine`]) draws through the [`RenderSurface`]
//! trait and never touches the DOM, so it runs unchanged under tests.
//!
//! # Example
//!
//! ```ignore
//! view! { <IntroLoader min_display_ms=3000.0 on_complete=Callback::new(|_| ()) /> }
//! ```

mod canvas;
mod component;
pub mod engine;
pub mod error;
pub mod governor;
pub mod lifecycle;
pub mod particle;
pub mod raster;
pub mod render;
pub mod session;
pub mod settings;
pub mod surface;
#[cfg(test)]
mod testing;
pub mod theme;
mod types;
pub mod viewport;

pub use canvas::CanvasSurface;
pub use component::{COMPLETE_CLASS, IntroLoader};
pub use engine::{Frame, IntroConfig, IntroEngine, WORDS};
pub use error::LoaderError;
pub use session::IntroSession;
pub use surface::{LogicalSize, RenderSurface};
pub use theme::Theme;
pub use types::LoaderOptions;
