use anyhow::{Context, Result};

use super::backend::{AdapterId, AdapterKind, CapabilityTier, GpuBackend};
use super::context2d::{Context2d, TargetBitmap, TextAntialiasMode};
use super::error::{BackbufferStage, ResourceCreationError};
use crate::coords::{LogicalSize, PixelSize, Viewport};
use crate::display::OrientationTransform;
use crate::imaging::ImageFactory;
use crate::text::TextFactory;

/// DPI of a standard desktop display; the starting point before a window reports its own.
pub const DEFAULT_DPI: f32 = 96.0;

struct DepthStencil<B: GpuBackend> {
    // Kept alive for as long as the view is bound.
    _texture: B::Texture,
    view: B::View,
    size: PixelSize,
}

/// Owns one device generation and everything bound to its current backbuffer.
///
/// The manager never tears down or creates resources on its own; the surface
/// layer decides when to call [`clear_context`](Self::clear_context) and
/// [`set_backbuffer`](Self::set_backbuffer).
pub struct GraphicsDeviceManager<B: GpuBackend> {
    device: B::Device,
    tier: CapabilityTier,
    adapter_kind: AdapterKind,
    adapter: AdapterId,
    /// System default adapter when this device was created.
    default_adapter: AdapterId,

    render_target_view: Option<B::View>,
    depth_stencil: Option<DepthStencil<B>>,
    viewport: Viewport,

    context_2d: Context2d<B::View>,
    text_factory: TextFactory,
    image_factory: ImageFactory,

    orientation: OrientationTransform,
    dpi: f32,
    logical_size: LogicalSize,
}

impl<B: GpuBackend> GraphicsDeviceManager<B> {
    /// Creates a device on the best hardware tier available, falling back to a
    /// software adapter once. Failure on the software adapter is fatal.
    pub fn new(backend: &B) -> Result<Self> {
        let tiers = CapabilityTier::ALL;

        let (created, adapter_kind) = match backend.create_device(AdapterKind::Hardware, &tiers) {
            Ok(created) => (created, AdapterKind::Hardware),
            Err(e) => {
                log::warn!("hardware device creation failed, falling back to software adapter: {e:#}");
                let created = backend
                    .create_device(AdapterKind::Software, &tiers)
                    .context("failed to create a device on the software adapter")?;
                (created, AdapterKind::Software)
            }
        };

        let default_adapter = backend.default_adapter().context("failed to identify the default adapter")?;

        log::info!(
            "created {:?} device on {} ({adapter_kind:?})",
            created.tier,
            created.adapter
        );

        Ok(Self {
            device: created.device,
            tier: created.tier,
            adapter_kind,
            adapter: created.adapter,
            default_adapter,
            render_target_view: None,
            depth_stencil: None,
            viewport: Viewport::default(),
            context_2d: Context2d::new(DEFAULT_DPI),
            text_factory: TextFactory::new(),
            image_factory: ImageFactory::new(),
            orientation: OrientationTransform::default(),
            dpi: DEFAULT_DPI,
            logical_size: LogicalSize::default(),
        })
    }

    /// Releases every backbuffer-derived view and flushes the device.
    ///
    /// Required before the backbuffer changes size, count or format. Safe to
    /// call when nothing is bound.
    pub fn clear_context(&mut self, backend: &B) {
        self.unbind();
        backend.flush(&self.device);
    }

    fn unbind(&mut self) {
        self.render_target_view = None;
        self.context_2d.take_target();
        self.depth_stencil = None;
    }

    /// Binds the device to `backbuffer`: render target view, a depth-stencil
    /// buffer of the same size, a full viewport and the 2D target bitmap.
    ///
    /// On error nothing is bound.
    pub fn set_backbuffer(&mut self, backend: &B, backbuffer: &B::Texture) -> Result<(), ResourceCreationError> {
        self.unbind();

        let render_target_view = backend
            .create_render_target_view(&self.device, backbuffer)
            .map_err(failed_at(BackbufferStage::RenderTargetView))?;

        let size = backend.texture_size(backbuffer);
        let (texture, view) = backend
            .create_depth_stencil(&self.device, size)
            .map_err(failed_at(BackbufferStage::DepthStencil))?;

        let bitmap_view = backend
            .create_bitmap_view(&self.device, backbuffer)
            .map_err(failed_at(BackbufferStage::Bitmap2d))?;

        self.render_target_view = Some(render_target_view);
        self.depth_stencil = Some(DepthStencil { _texture: texture, view, size });
        self.viewport = Viewport::covering(size);

        self.context_2d.set_target(TargetBitmap::new(bitmap_view, size, self.dpi));
        self.context_2d.set_dpi(self.dpi);
        self.context_2d.set_text_antialias_mode(TextAntialiasMode::Grayscale);

        log::debug!("backbuffer bound: {}x{} at {} dpi", size.width, size.height, self.dpi);
        Ok(())
    }

    /// Tells the driver the bound render target and depth-stencil contents
    /// need not be preserved. Only valid when the next frame overwrites them.
    pub fn discard_view(&self, backend: &B) {
        if let Some(view) = &self.render_target_view {
            backend.discard_view(&self.device, view);
        }
        if let Some(ds) = &self.depth_stencil {
            backend.discard_view(&self.device, &ds.view);
        }
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }

    pub fn tier(&self) -> CapabilityTier {
        self.tier
    }

    pub fn adapter_kind(&self) -> AdapterKind {
        self.adapter_kind
    }

    /// Adapter the device runs on.
    pub fn adapter(&self) -> &AdapterId {
        &self.adapter
    }

    /// System default adapter at creation time; compared against the current
    /// default to detect adapter changes.
    pub fn default_adapter(&self) -> &AdapterId {
        &self.default_adapter
    }

    pub fn render_target_view(&self) -> Option<&B::View> {
        self.render_target_view.as_ref()
    }

    pub fn depth_stencil_view(&self) -> Option<&B::View> {
        self.depth_stencil.as_ref().map(|ds| &ds.view)
    }

    pub fn depth_stencil_size(&self) -> Option<PixelSize> {
        self.depth_stencil.as_ref().map(|ds| ds.size)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn context_2d(&self) -> &Context2d<B::View> {
        &self.context_2d
    }

    pub fn context_2d_mut(&mut self) -> &mut Context2d<B::View> {
        &mut self.context_2d
    }

    pub fn target_bitmap(&self) -> Option<&TargetBitmap<B::View>> {
        self.context_2d.target()
    }

    pub fn text_factory(&self) -> &TextFactory {
        &self.text_factory
    }

    pub fn text_factory_mut(&mut self) -> &mut TextFactory {
        &mut self.text_factory
    }

    pub fn image_factory(&self) -> &ImageFactory {
        &self.image_factory
    }

    pub fn image_factory_mut(&mut self) -> &mut ImageFactory {
        &mut self.image_factory
    }

    pub fn orientation_transform(&self) -> &OrientationTransform {
        &self.orientation
    }

    pub fn set_orientation_transform(&mut self, orientation: OrientationTransform) {
        self.orientation = orientation;
    }

    pub fn dpi(&self) -> f32 {
        self.dpi
    }

    /// Sets the DPI and applies it to the 2D context right away.
    pub fn set_dpi(&mut self, dpi: f32) {
        self.dpi = dpi;
        self.context_2d.set_dpi(dpi);
    }

    pub fn logical_size(&self) -> LogicalSize {
        self.logical_size
    }

    pub fn set_logical_size(&mut self, size: LogicalSize) {
        self.logical_size = size;
    }
}

fn failed_at(stage: BackbufferStage) -> impl FnOnce(anyhow::Error) -> ResourceCreationError {
    move |source| ResourceCreationError { stage, source }
}
