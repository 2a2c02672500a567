//! Core engine-facing contracts.
//!
//! This module defines the interface between the window runtime and higher
//! layers (studio, tools). Apps see a per-frame context and the surface, never
//! the event loop.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
