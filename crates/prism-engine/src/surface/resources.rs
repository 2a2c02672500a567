use std::rc::{Rc, Weak};

use anyhow::{bail, Context, Result};

use super::state::SurfaceState;
use crate::coords::{LogicalSize, PixelSize};
use crate::device::{check_dpi, DeviceNotify, GpuBackend, GraphicsDeviceManager, PresentStatus, SurfaceFault, SwapChainDesc};
use crate::display::{
    compute_display_rotation, compute_output_size, orientation_transform, DisplayInfo, DisplayOrientation,
    DisplayRotation, ResourcesConfig,
};
use crate::render::RenderCtx;

/// Vertical blanks `present` waits for. 1 blocks until the next vsync.
const SYNC_INTERVAL: u32 = 1;

/// How a size-dependent rebuild ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum RebuildOutcome {
    Complete,
    /// The swap chain reported device loss; nothing after the resize step ran.
    DeviceLost,
}

/// Owns the swap chain and drives every size-, DPI- and orientation-dependent
/// rebuild of the device's views, including recovery from device loss.
///
/// Every method runs synchronously on the rendering thread. The only blocking
/// call is [`present`](Self::present), which waits for vertical sync.
pub struct SurfaceResources<B: GpuBackend> {
    backend: B,
    config: ResourcesConfig,
    state: SurfaceState,

    device: GraphicsDeviceManager<B>,
    swap_chain: Option<B::SwapChain>,
    window: Option<B::Window>,

    native_orientation: DisplayOrientation,
    current_orientation: DisplayOrientation,

    // Results of the last completed geometry pass.
    effective_dpi: f32,
    output_size: PixelSize,
    render_target_size: PixelSize,
    rotation: DisplayRotation,

    notify: Option<Weak<dyn DeviceNotify>>,

    rebuild_count: u64,
    device_generation: u64,
    recovery_count: u64,
}

impl<B: GpuBackend> SurfaceResources<B> {
    /// Creates the first device. No window is bound yet.
    pub fn new(backend: B, config: ResourcesConfig) -> Result<Self> {
        let device = GraphicsDeviceManager::new(&backend).context("failed to create device resources")?;
        let effective_dpi = device.dpi();

        let mut resources = Self {
            backend,
            config,
            state: SurfaceState::Uninitialized,
            device,
            swap_chain: None,
            window: None,
            native_orientation: DisplayOrientation::Landscape,
            current_orientation: DisplayOrientation::Landscape,
            effective_dpi,
            output_size: PixelSize::new(1, 1),
            render_target_size: PixelSize::new(1, 1),
            rotation: DisplayRotation::Identity,
            notify: None,
            rebuild_count: 0,
            device_generation: 1,
            recovery_count: 0,
        };
        resources.enter(SurfaceState::DeviceReady);
        Ok(resources)
    }

    /// Replaces the device with a freshly negotiated one.
    ///
    /// Views bound to the old device are dropped with it; the caller must
    /// rebuild size-dependent resources afterwards.
    pub fn create_device_resources(&mut self) -> Result<()> {
        self.device = GraphicsDeviceManager::new(&self.backend).context("failed to create device resources")?;
        self.device_generation += 1;
        Ok(())
    }

    /// Rebuilds the swap chain buffers, views and transforms for the current
    /// window size, DPI and orientation.
    ///
    /// A device loss reported by the swap chain resize is handled here: the
    /// device is recovered and the rebuild runs exactly once more as part of
    /// recovery. While an earlier recovery is unfinished, it is resumed
    /// instead of rebuilding on the lost device.
    pub fn create_window_size_dependent_resources(&mut self) -> Result<()> {
        if self.state == SurfaceState::Recovering {
            return self.handle_device_lost();
        }
        match self.rebuild()? {
            RebuildOutcome::Complete => Ok(()),
            RebuildOutcome::DeviceLost => self.handle_device_lost(),
        }
    }

    fn rebuild(&mut self) -> Result<RebuildOutcome> {
        if self.window.is_none() {
            bail!("cannot build window size dependent resources without a window");
        }

        self.device.clear_context(&self.backend);

        let logical = self.device.logical_size();
        let geometry = compute_output_size(logical, self.device.dpi(), &self.config);
        let rotation = compute_display_rotation(self.native_orientation, self.current_orientation)?;
        let render_target_size = if rotation.swaps_dimensions() {
            geometry.output_size.transposed()
        } else {
            geometry.output_size
        };

        self.effective_dpi = geometry.effective_dpi;
        self.output_size = geometry.output_size;
        self.render_target_size = render_target_size;
        self.rotation = rotation;

        let desc = SwapChainDesc::new(render_target_size);

        let swap_chain = match self.swap_chain {
            Some(ref mut swap_chain) => {
                if let Err(fault) = self.backend.resize_swap_chain(self.device.device(), swap_chain, &desc) {
                    if !fault.is_recoverable() {
                        return Err(into_error(fault).context("failed to resize the swap chain"));
                    }
                    log::warn!("{fault} while resizing the swap chain; recovering");
                    return Ok(RebuildOutcome::DeviceLost);
                }
                swap_chain
            }
            None => {
                let window = self.window.as_ref().context("no window bound")?;
                let created = self
                    .backend
                    .create_swap_chain(self.device.device(), window, &desc)
                    .context("failed to create the swap chain")?;
                self.swap_chain.insert(created)
            }
        };

        // The transform pair is updated before the swap chain rotation so
        // drawing code never sees a rotation without its transforms.
        self.device.set_orientation_transform(orientation_transform(rotation, logical));
        self.backend
            .set_rotation(swap_chain, rotation)
            .context("failed to set the swap chain rotation")?;

        let backbuffer = self
            .backend
            .backbuffer(self.device.device(), swap_chain)
            .context("failed to get the swap chain backbuffer")?;
        self.device.set_backbuffer(&self.backend, &backbuffer)?;

        log::debug!(
            "rebuilt surface: logical {}x{}, dpi {} (effective {}), output {}x{}, target {}x{}, {:?}",
            logical.width,
            logical.height,
            self.device.dpi(),
            geometry.effective_dpi,
            geometry.output_size.width,
            geometry.output_size.height,
            render_target_size.width,
            render_target_size.height,
            rotation,
        );

        self.rebuild_count += 1;
        self.enter(SurfaceState::SurfaceReady);
        Ok(RebuildOutcome::Complete)
    }

    /// Recreates the device and every resource bound to it.
    ///
    /// A registered [`DeviceNotify`] sees `on_device_lost` before the old
    /// device goes away and `on_device_restored` once the new one is fully
    /// built. DPI and logical size survive recovery unchanged.
    ///
    /// If an earlier recovery failed to create a device, this retries it
    /// without reporting the loss a second time.
    pub fn handle_device_lost(&mut self) -> Result<()> {
        if self.state == SurfaceState::Recovering {
            log::info!("retrying device recovery (generation {})", self.device_generation);
        } else {
            log::warn!("device lost; recreating device resources (generation {})", self.device_generation);
            self.enter(SurfaceState::Recovering);
            self.swap_chain = None;
            self.notify_target(|n| n.on_device_lost());
        }

        let dpi = self.device.dpi();
        let logical_size = self.device.logical_size();

        self.create_device_resources()?;
        self.device.set_dpi(dpi);
        self.device.set_logical_size(logical_size);
        self.enter(SurfaceState::DeviceReady);

        if self.window.is_some() && self.rebuild()? == RebuildOutcome::DeviceLost {
            // No swap chain existed, so the rebuild could not have resized one.
            bail!("device lost again while recovering");
        }

        self.recovery_count += 1;
        self.notify_target(|n| n.on_device_restored());
        log::info!("device resources restored (generation {})", self.device_generation);
        Ok(())
    }

    /// Checks whether the device is still usable: the system default adapter
    /// must be the one seen at creation, and the device must not be removed.
    /// Otherwise the device is recovered.
    pub fn validate_device(&mut self) -> Result<()> {
        let current = self
            .backend
            .default_adapter()
            .context("failed to query the default adapter")?;

        let adapter_changed = current != *self.device.default_adapter();
        if adapter_changed {
            log::warn!("default adapter changed from {} to {current}", self.device.default_adapter());
        }

        let removed = self.backend.removed_reason(self.device.device());
        if let Some(reason) = &removed {
            log::warn!("device was removed: {reason}");
        }

        if adapter_changed || removed.is_some() {
            self.handle_device_lost()?;
        }
        Ok(())
    }

    /// Binds the surface to `window` and builds everything for it.
    ///
    /// Any swap chain bound to a previous window is released first.
    pub fn set_window(&mut self, window: B::Window, info: DisplayInfo) -> Result<()> {
        let dpi = check_dpi(info.dpi)?;
        anyhow::ensure!(info.logical_size.is_finite(), "window size {:?} is not finite", info.logical_size);

        if self.swap_chain.is_some() {
            self.device.clear_context(&self.backend);
            self.swap_chain = None;
        }

        self.window = Some(window);
        self.device.set_logical_size(info.logical_size);
        self.native_orientation = info.native_orientation;
        self.current_orientation = info.current_orientation;
        self.device.set_dpi(dpi);

        self.create_window_size_dependent_resources()
    }

    /// Records a new window size in device-independent units and rebuilds if
    /// it changed.
    pub fn set_logical_size(&mut self, size: LogicalSize) -> Result<()> {
        anyhow::ensure!(size.is_finite(), "logical size {size:?} is not finite");
        if size == self.device.logical_size() {
            return Ok(());
        }
        self.device.set_logical_size(size);
        self.rebuild_if_bound()
    }

    /// Records a new DPI and rebuilds if it changed.
    ///
    /// The window's size in device-independent units changes with the DPI,
    /// so it is read back from the window first.
    pub fn set_dpi(&mut self, dpi: f32) -> Result<()> {
        let dpi = check_dpi(dpi)?;
        if dpi == self.device.dpi() {
            return Ok(());
        }
        if let Some(window) = &self.window {
            let bounds = self.backend.window_bounds(window);
            self.device.set_logical_size(bounds);
        }
        self.device.set_dpi(dpi);
        self.rebuild_if_bound()
    }

    pub fn set_current_orientation(&mut self, orientation: DisplayOrientation) -> Result<()> {
        if orientation == self.current_orientation {
            return Ok(());
        }
        self.current_orientation = orientation;
        self.rebuild_if_bound()
    }

    fn rebuild_if_bound(&mut self) -> Result<()> {
        if self.window.is_some() {
            self.create_window_size_dependent_resources()
        } else {
            Ok(())
        }
    }

    /// Lets the driver release transient allocations, e.g. when the app is
    /// suspended. Changes no state.
    pub fn trim(&self) {
        self.backend.trim(self.device.device());
    }

    /// Presents the backbuffer, blocking until the next vertical sync.
    ///
    /// Device loss is recovered from and reported as
    /// [`PresentStatus::Skipped`]; any other failure is returned.
    pub fn present(&mut self) -> Result<PresentStatus> {
        let Some(swap_chain) = self.swap_chain.as_mut() else {
            bail!("present called with no swap chain bound");
        };

        let result = self.backend.present(self.device.device(), swap_chain, SYNC_INTERVAL);
        self.device.discard_view(&self.backend);

        match result {
            Ok(status) => {
                log::trace!("present: {status:?}");
                Ok(status)
            }
            Err(fault) if fault.is_recoverable() => {
                log::warn!("{fault} during present; recovering");
                self.handle_device_lost()?;
                Ok(PresentStatus::Skipped)
            }
            Err(fault) => Err(into_error(fault).context("failed to present")),
        }
    }

    /// Registers the target of device-loss callbacks, replacing any previous
    /// one. Only a weak reference is kept; a dropped target is ignored.
    pub fn register_device_notify<N: DeviceNotify + 'static>(&mut self, target: &Rc<N>) {
        let weak: Weak<N> = Rc::downgrade(target);
        self.notify = Some(weak);
    }

    pub fn unregister_device_notify(&mut self) {
        self.notify = None;
    }

    fn notify_target(&self, f: impl FnOnce(&dyn DeviceNotify)) {
        if let Some(target) = self.notify.as_ref().and_then(Weak::upgrade) {
            f(&*target);
        }
    }

    fn enter(&mut self, next: SurfaceState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal surface transition {:?} -> {next:?}",
            self.state
        );
        log::trace!("surface state {:?} -> {next:?}", self.state);
        self.state = next;
    }

    /// Borrows everything drawing code needs for one frame.
    ///
    /// `None` unless the surface is fully built.
    pub fn render_ctx(&self) -> Option<RenderCtx<'_, B>> {
        if !self.state.is_drawable() {
            return None;
        }
        Some(RenderCtx {
            device: self.device.device(),
            swap_chain: self.swap_chain.as_ref()?,
            render_target_view: self.device.render_target_view()?,
            depth_stencil_view: self.device.depth_stencil_view()?,
            viewport: self.device.viewport(),
            context_2d: self.device.context_2d(),
            text_factory: self.device.text_factory(),
            orientation: self.device.orientation_transform(),
            dpi: self.device.dpi(),
            effective_dpi: self.effective_dpi,
            output_size: self.output_size,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &ResourcesConfig {
        &self.config
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn device_manager(&self) -> &GraphicsDeviceManager<B> {
        &self.device
    }

    /// Mutable access for loading fonts and decoding images. Views rebound
    /// through this are replaced by the next rebuild.
    pub fn device_manager_mut(&mut self) -> &mut GraphicsDeviceManager<B> {
        &mut self.device
    }

    pub fn swap_chain(&self) -> Option<&B::SwapChain> {
        self.swap_chain.as_ref()
    }

    pub fn window(&self) -> Option<&B::Window> {
        self.window.as_ref()
    }

    pub fn dpi(&self) -> f32 {
        self.device.dpi()
    }

    pub fn logical_size(&self) -> LogicalSize {
        self.device.logical_size()
    }

    pub fn effective_dpi(&self) -> f32 {
        self.effective_dpi
    }

    /// Pixel size before the rotation swap.
    pub fn output_size(&self) -> PixelSize {
        self.output_size
    }

    /// Swap chain buffer size.
    pub fn render_target_size(&self) -> PixelSize {
        self.render_target_size
    }

    pub fn rotation(&self) -> DisplayRotation {
        self.rotation
    }

    pub fn native_orientation(&self) -> DisplayOrientation {
        self.native_orientation
    }

    pub fn current_orientation(&self) -> DisplayOrientation {
        self.current_orientation
    }

    /// Completed size-dependent rebuilds.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuild_count
    }

    /// Devices created so far, starting at 1.
    pub fn device_generation(&self) -> u64 {
        self.device_generation
    }

    /// Completed device-loss recoveries.
    pub fn recovery_count(&self) -> u64 {
        self.recovery_count
    }
}

fn into_error(fault: SurfaceFault) -> anyhow::Error {
    match fault {
        SurfaceFault::Fatal(e) => e,
        other => anyhow::Error::new(other),
    }
}
