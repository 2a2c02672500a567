//! Swap chain ownership and the size/orientation/device-loss lifecycle.
//!
//! [`SurfaceResources`] receives window, DPI and orientation changes, decides
//! whether anything must be rebuilt, and rebinds the device to a new
//! backbuffer when it must. Device loss reported by the swap chain or found by
//! [`SurfaceResources::validate_device`] is recovered from transparently.

mod resources;
mod state;

pub use resources::SurfaceResources;
pub use state::SurfaceState;
