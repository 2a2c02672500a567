use std::sync::{Arc, OnceLock};

use anyhow::{anyhow, Context, Result};
use winit::window::Window;

use super::backend::{
    AdapterId, AdapterKind, CapabilityTier, CreatedDevice, GpuBackend, PresentStatus, SurfaceFault, SwapChainDesc,
};
use super::surface::{self, WgpuSwapChain};
use super::WgpuInit;
use crate::coords::{LogicalSize, PixelSize};
use crate::display::DisplayRotation;

/// Device, queue and the adapter they came from.
pub struct WgpuDevice {
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,

    /// Set once by the device-lost callback.
    lost: Arc<OnceLock<String>>,
}

impl WgpuDevice {
    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

/// [`GpuBackend`] over wgpu, presenting into winit windows.
///
/// Adapter/device acquisition is asynchronous under wgpu; this backend blocks
/// on it with `pollster` to keep the lifecycle synchronous.
pub struct WgpuBackend {
    instance: wgpu::Instance,
    init: WgpuInit,
}

impl WgpuBackend {
    pub fn new(init: WgpuInit) -> Self {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            ..Default::default()
        });
        Self { instance, init }
    }

    pub fn instance(&self) -> &wgpu::Instance {
        &self.instance
    }

    fn request_device(
        &self,
        adapter: &wgpu::Adapter,
        tier: CapabilityTier,
    ) -> Result<(wgpu::Device, wgpu::Queue)> {
        let required_features = self.init.required_features & adapter.features();
        if required_features != self.init.required_features {
            log::warn!(
                "adapter lacks requested features {:?}; continuing without them",
                self.init.required_features - required_features
            );
        }

        pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some(self.init.label),
            required_features,
            required_limits: tier.limits(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .with_context(|| format!("failed to create {tier:?} device"))
    }
}

impl Default for WgpuBackend {
    fn default() -> Self {
        Self::new(WgpuInit::default())
    }
}

fn adapter_id(info: &wgpu::AdapterInfo) -> AdapterId {
    AdapterId {
        backend: format!("{:?}", info.backend),
        vendor: info.vendor,
        device: info.device,
        name: info.name.clone(),
    }
}

impl GpuBackend for WgpuBackend {
    type Device = WgpuDevice;
    type Texture = wgpu::Texture;
    type View = wgpu::TextureView;
    type SwapChain = WgpuSwapChain;
    type Window = Arc<Window>;

    fn create_device(&self, kind: AdapterKind, tiers: &[CapabilityTier]) -> Result<CreatedDevice<WgpuDevice>> {
        let adapter = pollster::block_on(self.instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: self.init.power_preference,
            compatible_surface: None,
            force_fallback_adapter: kind == AdapterKind::Software,
        }))
        .with_context(|| format!("no {kind:?} adapter available"))?;

        let info = adapter.get_info();
        let adapter_limits = adapter.limits();
        let compliant = adapter.get_downlevel_capabilities().is_webgpu_compliant();

        let mut last_error = None;
        for &tier in tiers {
            if tier == CapabilityTier::Full && !compliant {
                log::debug!("adapter \"{}\" is not WebGPU compliant; skipping {tier:?}", info.name);
                continue;
            }
            if !tier.limits().check_limits(&adapter_limits) {
                log::debug!("adapter \"{}\" does not meet {tier:?} limits", info.name);
                continue;
            }

            match self.request_device(&adapter, tier) {
                Ok((device, queue)) => {
                    let lost = Arc::new(OnceLock::new());
                    let sink = Arc::clone(&lost);
                    device.set_device_lost_callback(move |reason, message| {
                        if matches!(reason, wgpu::DeviceLostReason::Destroyed) {
                            log::debug!("device destroyed: {message}");
                        } else {
                            log::warn!("device lost ({reason:?}): {message}");
                        }
                        let _ = sink.set(format!("{reason:?}: {message}"));
                    });

                    return Ok(CreatedDevice {
                        device: WgpuDevice { adapter, device, queue, lost },
                        tier,
                        adapter: adapter_id(&info),
                    });
                }
                Err(e) => {
                    log::debug!("{e:#}");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("adapter \"{}\" supports none of {tiers:?}", info.name)))
    }

    fn default_adapter(&self) -> Result<AdapterId> {
        let adapter = pollster::block_on(self.instance.request_adapter(&wgpu::RequestAdapterOptions::default()))
            .context("failed to query the default adapter")?;
        Ok(adapter_id(&adapter.get_info()))
    }

    fn removed_reason(&self, device: &WgpuDevice) -> Option<String> {
        device.lost.get().cloned()
    }

    fn flush(&self, device: &WgpuDevice) {
        device.queue.submit(std::iter::empty());
    }

    fn trim(&self, device: &WgpuDevice) {
        // wgpu has no explicit trim. A submit lets it triage finished work and
        // free what the application already dropped.
        device.queue.submit(std::iter::empty());
        log::debug!("trim requested");
    }

    fn texture_size(&self, texture: &wgpu::Texture) -> PixelSize {
        PixelSize::new(texture.width(), texture.height())
    }

    fn create_render_target_view(&self, _device: &WgpuDevice, texture: &wgpu::Texture) -> Result<wgpu::TextureView> {
        anyhow::ensure!(
            texture.usage().contains(wgpu::TextureUsages::RENDER_ATTACHMENT),
            "texture is not a render attachment"
        );
        Ok(texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("prism render target view"),
            ..Default::default()
        }))
    }

    fn create_depth_stencil(&self, device: &WgpuDevice, size: PixelSize) -> Result<(wgpu::Texture, wgpu::TextureView)> {
        surface::check_texture_size(&device.device, size).context("invalid depth-stencil size")?;

        let texture = device.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("prism depth-stencil"),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth24PlusStencil8,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("prism depth-stencil view"),
            ..Default::default()
        });
        Ok((texture, view))
    }

    fn create_bitmap_view(&self, _device: &WgpuDevice, texture: &wgpu::Texture) -> Result<wgpu::TextureView> {
        Ok(texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("prism 2d target"),
            ..Default::default()
        }))
    }

    fn discard_view(&self, _device: &WgpuDevice, _view: &wgpu::TextureView) {
        // Discards are expressed per pass through `StoreOp::Discard`; wgpu has
        // no out-of-pass equivalent.
    }

    fn window_bounds(&self, window: &Arc<Window>) -> LogicalSize {
        let logical: winit::dpi::LogicalSize<f64> = window.inner_size().to_logical(window.scale_factor());
        LogicalSize::new(logical.width as f32, logical.height as f32)
    }

    fn create_swap_chain(
        &self,
        device: &WgpuDevice,
        window: &Arc<Window>,
        desc: &SwapChainDesc,
    ) -> Result<WgpuSwapChain> {
        let surface = self
            .instance
            .create_surface(Arc::clone(window))
            .context("failed to create wgpu surface")?;
        anyhow::ensure!(
            device.adapter.is_surface_supported(&surface),
            "adapter cannot present to this window"
        );

        let caps = surface.get_capabilities(&device.adapter);
        let format = surface::choose_surface_format(&caps).context("no supported surface formats")?;
        anyhow::ensure!(
            caps.usages.contains(wgpu::TextureUsages::COPY_DST),
            "surface textures cannot be copied into"
        );

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_DST,
            format,
            width: desc.size.width,
            height: desc.size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface::choose_alpha_mode(&caps, wgpu::CompositeAlphaMode::Opaque),
            view_formats: vec![],
            desired_maximum_frame_latency: desc.max_frame_latency,
        };
        surface::check_texture_size(&device.device, desc.size).context("invalid swap chain size")?;
        surface.configure(&device.device, &config);

        let backbuffer = surface::create_backbuffer(&device.device, format, desc.size)?;
        log::info!("swap chain created: {}x{} {format:?}", desc.size.width, desc.size.height);

        Ok(WgpuSwapChain {
            surface,
            config,
            backbuffer,
            rotation: DisplayRotation::Identity,
            buffer_count: desc.buffer_count,
        })
    }

    fn resize_swap_chain(
        &self,
        device: &WgpuDevice,
        swap_chain: &mut WgpuSwapChain,
        desc: &SwapChainDesc,
    ) -> Result<(), SurfaceFault> {
        if device.lost.get().is_some() {
            return Err(SurfaceFault::DeviceRemoved);
        }
        surface::check_texture_size(&device.device, desc.size).map_err(SurfaceFault::Fatal)?;

        swap_chain.config.width = desc.size.width;
        swap_chain.config.height = desc.size.height;
        swap_chain.config.desired_maximum_frame_latency = desc.max_frame_latency;
        swap_chain.buffer_count = desc.buffer_count;
        swap_chain.surface.configure(&device.device, &swap_chain.config);

        swap_chain.backbuffer = surface::create_backbuffer(&device.device, swap_chain.config.format, desc.size)
            .map_err(SurfaceFault::Fatal)?;
        Ok(())
    }

    fn set_rotation(&self, swap_chain: &mut WgpuSwapChain, rotation: DisplayRotation) -> Result<()> {
        swap_chain.rotation = rotation;
        Ok(())
    }

    fn backbuffer(&self, _device: &WgpuDevice, swap_chain: &WgpuSwapChain) -> Result<wgpu::Texture> {
        Ok(swap_chain.backbuffer.clone())
    }

    fn present(
        &self,
        device: &WgpuDevice,
        swap_chain: &mut WgpuSwapChain,
        sync_interval: u32,
    ) -> Result<PresentStatus, SurfaceFault> {
        if device.lost.get().is_some() {
            return Err(SurfaceFault::DeviceRemoved);
        }

        let present_mode = if sync_interval == 0 {
            wgpu::PresentMode::AutoNoVsync
        } else {
            wgpu::PresentMode::Fifo
        };
        if swap_chain.config.present_mode != present_mode {
            swap_chain.config.present_mode = present_mode;
            swap_chain.surface.configure(&device.device, &swap_chain.config);
        }

        let frame = match swap_chain.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost) => return Err(SurfaceFault::DeviceReset),
            Err(wgpu::SurfaceError::Outdated) => {
                swap_chain.surface.configure(&device.device, &swap_chain.config);
                return Ok(PresentStatus::Skipped);
            }
            Err(wgpu::SurfaceError::Timeout) => return Ok(PresentStatus::Skipped),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(SurfaceFault::Fatal(anyhow!("out of memory acquiring surface texture")));
            }
            Err(wgpu::SurfaceError::Other) => {
                return Err(SurfaceFault::Fatal(anyhow!("failed to acquire surface texture")));
            }
        };

        let mut encoder = device
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("prism present"),
            });
        encoder.copy_texture_to_texture(
            swap_chain.backbuffer.as_image_copy(),
            frame.texture.as_image_copy(),
            swap_chain.backbuffer.size(),
        );
        device.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(PresentStatus::Presented)
    }
}
