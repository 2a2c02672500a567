//! Prism engine crate.
//!
//! GPU device and swap-chain lifecycle for a resizable, rotatable surface:
//! device negotiation, DPI- and orientation-driven render target geometry,
//! and transparent recovery from device loss.

pub mod coords;
pub mod core;
pub mod device;
pub mod display;
pub mod imaging;
pub mod logging;
pub mod render;
pub mod surface;
pub mod text;
pub mod window;
