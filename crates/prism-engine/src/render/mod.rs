//! Per-frame access for drawing code.
//!
//! Drawing code never owns device handles; it receives a [`RenderCtx`] for
//! the duration of one frame and issues commands through it.
//!
//! Convention:
//! - 2D coordinates are in device-independent units (top-left origin, +Y down)
//!   and go through `orientation.transform_2d` before reaching the target.
//! - 3D projections are prepended with `orientation.transform_3d`.

mod ctx;

pub use ctx::RenderCtx;
