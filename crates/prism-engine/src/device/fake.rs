//! Scriptable in-memory [`GpuBackend`] for lifecycle tests.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use anyhow::{anyhow, Result};

use super::backend::{
    AdapterId, AdapterKind, CapabilityTier, CreatedDevice, GpuBackend, PresentStatus, SurfaceFault, SwapChainDesc,
};
use super::error::BackbufferStage;
use crate::coords::{LogicalSize, PixelSize};
use crate::display::DisplayRotation;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum ViewKind {
    RenderTarget,
    DepthStencil,
    Bitmap2d,
}

#[derive(Debug, Clone)]
pub(crate) struct FakeDevice {
    pub id: u32,
}

#[derive(Debug, Clone)]
pub(crate) struct FakeTexture {
    pub size: PixelSize,
}

#[derive(Debug, Clone)]
pub(crate) struct FakeView {
    pub kind: ViewKind,
    pub size: PixelSize,
}

#[derive(Debug)]
pub(crate) struct FakeSwapChain {
    pub device: u32,
    pub window: u32,
    pub desc: SwapChainDesc,
    pub rotation: Option<DisplayRotation>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct FakeWindow {
    pub id: u32,
}

pub(crate) struct FakeState {
    // Script.
    pub hardware_tiers: Vec<CapabilityTier>,
    pub software_available: bool,
    pub fail_stage: Option<BackbufferStage>,
    pub resize_faults: VecDeque<SurfaceFault>,
    pub present_faults: VecDeque<SurfaceFault>,
    pub fail_swap_chain_creation: bool,
    pub default_adapter: AdapterId,
    pub window_bounds: LogicalSize,
    pub removed: HashSet<u32>,

    // Record.
    pub created_kinds: Vec<AdapterKind>,
    pub devices_created: u32,
    pub flushes: u32,
    pub trims: u32,
    pub discards: u32,
    pub depth_stencils_created: u32,
    pub swap_chains_created: u32,
    pub resizes: Vec<PixelSize>,
    pub presents: u32,
    pub sync_intervals: Vec<u32>,
    /// Ordered call log for sequencing assertions.
    pub calls: Vec<&'static str>,
}

fn adapter(name: &str) -> AdapterId {
    AdapterId { backend: "Fake".into(), vendor: 0x1234, device: 0x0001, name: name.into() }
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            hardware_tiers: CapabilityTier::ALL.to_vec(),
            software_available: true,
            fail_stage: None,
            resize_faults: VecDeque::new(),
            present_faults: VecDeque::new(),
            fail_swap_chain_creation: false,
            default_adapter: adapter("fake gpu"),
            window_bounds: LogicalSize::new(800.0, 600.0),
            removed: HashSet::new(),
            created_kinds: Vec::new(),
            devices_created: 0,
            flushes: 0,
            trims: 0,
            discards: 0,
            depth_stencils_created: 0,
            swap_chains_created: 0,
            resizes: Vec::new(),
            presents: 0,
            sync_intervals: Vec::new(),
            calls: Vec::new(),
        }
    }
}

/// Cloning shares state, so a test keeps a handle after moving one clone
/// into the code under test.
#[derive(Clone, Default)]
pub(crate) struct FakeBackend {
    state: Rc<RefCell<FakeState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Ref<'_, FakeState> {
        self.state.borrow()
    }

    pub fn state_mut(&self) -> RefMut<'_, FakeState> {
        self.state.borrow_mut()
    }

    pub fn texture(&self, size: PixelSize) -> FakeTexture {
        FakeTexture { size }
    }

    /// Marks the most recently created device as removed.
    pub fn remove_current_device(&self) {
        let mut state = self.state_mut();
        let id = state.devices_created;
        state.removed.insert(id);
    }

    pub fn change_default_adapter(&self) {
        self.state_mut().default_adapter = adapter("hot-plugged gpu");
    }

    fn check_stage(&self, stage: BackbufferStage) -> Result<()> {
        if self.state().fail_stage == Some(stage) {
            return Err(anyhow!("scripted {stage:?} failure"));
        }
        Ok(())
    }
}

impl GpuBackend for FakeBackend {
    type Device = FakeDevice;
    type Texture = FakeTexture;
    type View = FakeView;
    type SwapChain = FakeSwapChain;
    type Window = FakeWindow;

    fn create_device(&self, kind: AdapterKind, tiers: &[CapabilityTier]) -> Result<CreatedDevice<FakeDevice>> {
        let mut state = self.state_mut();
        state.created_kinds.push(kind);
        state.calls.push("create_device");

        let tier = match kind {
            AdapterKind::Hardware => tiers.iter().copied().find(|t| state.hardware_tiers.contains(t)),
            AdapterKind::Software => state.software_available.then(|| tiers.last().copied()).flatten(),
        }
        .ok_or_else(|| anyhow!("no {kind:?} device for {tiers:?}"))?;

        state.devices_created += 1;
        Ok(CreatedDevice {
            device: FakeDevice { id: state.devices_created },
            tier,
            adapter: adapter(if kind == AdapterKind::Hardware { "fake gpu" } else { "fake software rasterizer" }),
        })
    }

    fn default_adapter(&self) -> Result<AdapterId> {
        Ok(self.state().default_adapter.clone())
    }

    fn removed_reason(&self, device: &FakeDevice) -> Option<String> {
        self.state().removed.contains(&device.id).then(|| "removed".to_string())
    }

    fn flush(&self, _device: &FakeDevice) {
        let mut state = self.state_mut();
        state.flushes += 1;
        state.calls.push("flush");
    }

    fn trim(&self, _device: &FakeDevice) {
        self.state_mut().trims += 1;
    }

    fn texture_size(&self, texture: &FakeTexture) -> PixelSize {
        texture.size
    }

    fn create_render_target_view(&self, _device: &FakeDevice, texture: &FakeTexture) -> Result<FakeView> {
        self.check_stage(BackbufferStage::RenderTargetView)?;
        Ok(FakeView { kind: ViewKind::RenderTarget, size: texture.size })
    }

    fn create_depth_stencil(&self, _device: &FakeDevice, size: PixelSize) -> Result<(FakeTexture, FakeView)> {
        self.check_stage(BackbufferStage::DepthStencil)?;
        self.state_mut().depth_stencils_created += 1;
        Ok((FakeTexture { size }, FakeView { kind: ViewKind::DepthStencil, size }))
    }

    fn create_bitmap_view(&self, _device: &FakeDevice, texture: &FakeTexture) -> Result<FakeView> {
        self.check_stage(BackbufferStage::Bitmap2d)?;
        Ok(FakeView { kind: ViewKind::Bitmap2d, size: texture.size })
    }

    fn discard_view(&self, _device: &FakeDevice, _view: &FakeView) {
        self.state_mut().discards += 1;
    }

    fn window_bounds(&self, _window: &FakeWindow) -> LogicalSize {
        self.state().window_bounds
    }

    fn create_swap_chain(&self, device: &FakeDevice, window: &FakeWindow, desc: &SwapChainDesc) -> Result<FakeSwapChain> {
        let mut state = self.state_mut();
        state.calls.push("create_swap_chain");
        if state.fail_swap_chain_creation {
            return Err(anyhow!("scripted swap chain failure"));
        }
        state.swap_chains_created += 1;
        Ok(FakeSwapChain { device: device.id, window: window.id, desc: *desc, rotation: None })
    }

    fn resize_swap_chain(
        &self,
        _device: &FakeDevice,
        swap_chain: &mut FakeSwapChain,
        desc: &SwapChainDesc,
    ) -> Result<(), SurfaceFault> {
        let mut state = self.state_mut();
        state.calls.push("resize_swap_chain");
        if let Some(fault) = state.resize_faults.pop_front() {
            return Err(fault);
        }
        state.resizes.push(desc.size);
        swap_chain.desc = *desc;
        Ok(())
    }

    fn set_rotation(&self, swap_chain: &mut FakeSwapChain, rotation: DisplayRotation) -> Result<()> {
        self.state_mut().calls.push("set_rotation");
        swap_chain.rotation = Some(rotation);
        Ok(())
    }

    fn backbuffer(&self, _device: &FakeDevice, swap_chain: &FakeSwapChain) -> Result<FakeTexture> {
        Ok(FakeTexture { size: swap_chain.desc.size })
    }

    fn present(
        &self,
        _device: &FakeDevice,
        _swap_chain: &mut FakeSwapChain,
        sync_interval: u32,
    ) -> Result<PresentStatus, SurfaceFault> {
        let mut state = self.state_mut();
        state.calls.push("present");
        state.sync_intervals.push(sync_interval);
        if let Some(fault) = state.present_faults.pop_front() {
            return Err(fault);
        }
        state.presents += 1;
        Ok(PresentStatus::Presented)
    }
}
