//! UI components.

pub mod intro_loader;
