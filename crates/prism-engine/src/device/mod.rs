//! GPU device management.
//!
//! This module is responsible for:
//! - negotiating a device across capability tiers, with a software fallback
//! - binding render target, depth-stencil and 2D views to a backbuffer
//! - the [`GpuBackend`] seam and its wgpu implementation
//!
//! Swap chain lifetime and device-loss recovery live in [`crate::surface`].

mod backend;
mod context2d;
mod error;
mod gpu;
mod init;
mod manager;
mod notify;
mod surface;

#[cfg(test)]
pub(crate) mod fake;

pub use backend::{
    AdapterId, AdapterKind, CapabilityTier, CreatedDevice, GpuBackend, PresentStatus, SurfaceFault, SwapChainDesc,
};
pub use context2d::{Context2d, TargetBitmap, TextAntialiasMode};
pub use error::{BackbufferStage, InvalidDpi, ResourceCreationError};
pub use gpu::{WgpuBackend, WgpuDevice};
pub use init::WgpuInit;
pub use manager::{GraphicsDeviceManager, DEFAULT_DPI};
pub use notify::DeviceNotify;
pub use surface::WgpuSwapChain;

pub(crate) use error::check_dpi;
