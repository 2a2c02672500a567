use std::fmt;

use anyhow::Result;

use crate::coords::{LogicalSize, PixelSize};
use crate::display::DisplayRotation;

/// Hardware capability tier a device is negotiated against.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CapabilityTier {
    /// Full WebGPU limits on a compliant adapter.
    Full,
    /// Downlevel limits (roughly D3D11 / GLES 3.1 class hardware).
    Downlevel,
    /// WebGL2-compatible limits, the lowest tier.
    Compat,
}

impl CapabilityTier {
    /// Every tier the engine supports, highest first. Order is significant.
    pub const ALL: [CapabilityTier; 3] = [CapabilityTier::Full, CapabilityTier::Downlevel, CapabilityTier::Compat];

    /// Device limits requested for this tier.
    pub fn limits(self) -> wgpu::Limits {
        match self {
            CapabilityTier::Full => wgpu::Limits::default(),
            CapabilityTier::Downlevel => wgpu::Limits::downlevel_defaults(),
            CapabilityTier::Compat => wgpu::Limits::downlevel_webgl2_defaults(),
        }
    }
}

/// Which kind of adapter to request a device from.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AdapterKind {
    Hardware,
    /// Software-emulated fallback adapter.
    Software,
}

/// Identity of a physical adapter, stable across device recreation.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct AdapterId {
    pub backend: String,
    pub vendor: u32,
    pub device: u32,
    pub name: String,
}

impl fmt::Display for AdapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" ({} {:04x}:{:04x})", self.name, self.backend, self.vendor, self.device)
    }
}

/// A device freshly created by a backend.
pub struct CreatedDevice<D> {
    pub device: D,
    pub tier: CapabilityTier,
    pub adapter: AdapterId,
}

/// Parameters for swap chain creation and resize.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SwapChainDesc {
    pub size: PixelSize,
    /// Always 2: double buffered.
    pub buffer_count: u32,
    /// Frames the presentation queue may hold ahead of the display.
    pub max_frame_latency: u32,
}

impl SwapChainDesc {
    pub const BUFFER_COUNT: u32 = 2;

    pub fn new(size: PixelSize) -> Self {
        Self { size, buffer_count: Self::BUFFER_COUNT, max_frame_latency: 1 }
    }
}

/// Failure reported by a swap chain resize or present.
#[derive(Debug)]
pub enum SurfaceFault {
    /// The device was physically removed or its driver was updated.
    DeviceRemoved,
    /// The device was reset by the platform.
    DeviceReset,
    /// Any other failure. Never recovered from.
    Fatal(anyhow::Error),
}

impl SurfaceFault {
    /// Whether recreating the device and swap chain clears the fault.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SurfaceFault::DeviceRemoved | SurfaceFault::DeviceReset)
    }
}

impl fmt::Display for SurfaceFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceFault::DeviceRemoved => write!(f, "device removed"),
            SurfaceFault::DeviceReset => write!(f, "device reset"),
            SurfaceFault::Fatal(e) => write!(f, "surface failure: {e:#}"),
        }
    }
}

impl std::error::Error for SurfaceFault {}

/// Outcome of a successful present call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PresentStatus {
    Presented,
    /// The frame was dropped (surface busy or being reconfigured).
    Skipped,
}

/// Platform operations the device manager and surface resources are built on.
///
/// Every call is synchronous and made from the rendering thread. Handles are
/// owned by the caller; the backend only creates and operates on them.
pub trait GpuBackend {
    /// Device plus its immediate command queue.
    type Device;
    /// A 2D texture (backbuffer or depth-stencil buffer).
    type Texture;
    /// A view over a texture.
    type View;
    /// Presentation surface bound to a window.
    type SwapChain;
    /// Window handle the swap chain presents into.
    type Window;

    /// Creates a device on `adapter`, taking the first of `tiers` it supports.
    fn create_device(&self, adapter: AdapterKind, tiers: &[CapabilityTier]) -> Result<CreatedDevice<Self::Device>>;

    /// Identity of the adapter the system currently considers the default.
    fn default_adapter(&self) -> Result<AdapterId>;

    /// Why the device stopped working, if it has.
    fn removed_reason(&self, device: &Self::Device) -> Option<String>;

    /// Submits any pending work.
    fn flush(&self, device: &Self::Device);

    /// Lets the driver release transient allocations.
    fn trim(&self, device: &Self::Device);

    fn texture_size(&self, texture: &Self::Texture) -> PixelSize;

    fn create_render_target_view(&self, device: &Self::Device, texture: &Self::Texture) -> Result<Self::View>;

    /// Creates a single-sampled depth + stencil buffer of `size` and a view over it.
    fn create_depth_stencil(&self, device: &Self::Device, size: PixelSize) -> Result<(Self::Texture, Self::View)>;

    /// Creates the view the 2D context draws through.
    fn create_bitmap_view(&self, device: &Self::Device, texture: &Self::Texture) -> Result<Self::View>;

    /// Hints that the contents of `view` need not be preserved.
    fn discard_view(&self, device: &Self::Device, view: &Self::View);

    /// Current window bounds in device-independent units.
    fn window_bounds(&self, window: &Self::Window) -> LogicalSize;

    fn create_swap_chain(
        &self,
        device: &Self::Device,
        window: &Self::Window,
        desc: &SwapChainDesc,
    ) -> Result<Self::SwapChain>;

    fn resize_swap_chain(
        &self,
        device: &Self::Device,
        swap_chain: &mut Self::SwapChain,
        desc: &SwapChainDesc,
    ) -> Result<(), SurfaceFault>;

    fn set_rotation(&self, swap_chain: &mut Self::SwapChain, rotation: DisplayRotation) -> Result<()>;

    /// The texture drawing code renders into before present.
    fn backbuffer(&self, device: &Self::Device, swap_chain: &Self::SwapChain) -> Result<Self::Texture>;

    /// Presents the backbuffer, waiting `sync_interval` vertical blanks.
    fn present(
        &self,
        device: &Self::Device,
        swap_chain: &mut Self::SwapChain,
        sync_interval: u32,
    ) -> Result<PresentStatus, SurfaceFault>;
}
