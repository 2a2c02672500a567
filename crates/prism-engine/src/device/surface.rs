use anyhow::{Context, Result};

use crate::coords::PixelSize;
use crate::display::DisplayRotation;

/// Swap chain produced by [`super::WgpuBackend`].
///
/// wgpu hands out a fresh surface texture per frame, so drawing goes to a
/// stable offscreen backbuffer that `present` copies into the acquired frame.
pub struct WgpuSwapChain {
    pub(crate) surface: wgpu::Surface<'static>,
    pub(crate) config: wgpu::SurfaceConfiguration,
    pub(crate) backbuffer: wgpu::Texture,
    pub(crate) rotation: DisplayRotation,
    pub(crate) buffer_count: u32,
}

impl WgpuSwapChain {
    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.config.width, self.config.height)
    }

    /// Rotation drawing code has been told to pre-apply.
    ///
    /// wgpu has no compositor rotation, so this is informational only.
    pub fn rotation(&self) -> DisplayRotation {
        self.rotation
    }

    pub fn buffer_count(&self) -> u32 {
        self.buffer_count
    }
}

/// Picks the swap chain format: BGRA8 first, matching the 2D context, then
/// RGBA8, then whatever the surface lists first.
pub(crate) fn choose_surface_format(caps: &wgpu::SurfaceCapabilities) -> Option<wgpu::TextureFormat> {
    let preferred = [wgpu::TextureFormat::Bgra8Unorm, wgpu::TextureFormat::Rgba8Unorm];
    preferred
        .into_iter()
        .find(|f| caps.formats.contains(f))
        .or_else(|| caps.formats.first().copied())
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: wgpu::CompositeAlphaMode,
) -> wgpu::CompositeAlphaMode {
    Some(requested)
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Rejects sizes wgpu validation would reject, so callers get an error
/// instead of a validation panic.
pub(crate) fn check_texture_size(device: &wgpu::Device, size: PixelSize) -> Result<()> {
    let max = device.limits().max_texture_dimension_2d;
    anyhow::ensure!(!size.is_empty(), "texture size {}x{} is empty", size.width, size.height);
    anyhow::ensure!(
        size.width <= max && size.height <= max,
        "texture size {}x{} exceeds device limit {max}",
        size.width,
        size.height
    );
    Ok(())
}

pub(crate) fn create_backbuffer(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    size: PixelSize,
) -> Result<wgpu::Texture> {
    check_texture_size(device, size).context("invalid backbuffer size")?;

    Ok(device.create_texture(&wgpu::TextureDescriptor {
        label: Some("prism backbuffer"),
        size: wgpu::Extent3d {
            width: size.width,
            height: size.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::COPY_SRC
            | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    }))
}
