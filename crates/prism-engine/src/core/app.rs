use anyhow::Result;
use winit::event::WindowEvent;
use winit::window::WindowId;

use super::ctx::FrameCtx;
use crate::device::WgpuBackend;
use crate::surface::SurfaceResources;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
pub trait App {
    /// Called once the surface is bound to the window, before the first
    /// frame. Register a [`crate::device::DeviceNotify`] or load fonts here.
    fn on_surface_ready(&mut self, surface: &mut SurfaceResources<WgpuBackend>) -> Result<()> {
        let _ = surface;
        Ok(())
    }

    /// Called for window events, before the runtime handles them.
    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Called once per frame while the surface is drawable. The runtime
    /// presents after this returns.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl;
}
