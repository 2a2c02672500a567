//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, and forwards size, DPI, visibility
//! and redraw events to the surface layer.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
