use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;

use prism_engine::core::{App, AppControl, FrameCtx};
use prism_engine::device::{DeviceNotify, WgpuBackend, WgpuInit};
use prism_engine::display::ResourcesConfig;
use prism_engine::logging::{init_logging, LoggingConfig};
use prism_engine::surface::SurfaceResources;
use prism_engine::window::{Runtime, RuntimeConfig};

/// Logs device-loss callbacks. A real app would drop and rebuild its
/// pipelines and buffers here.
#[derive(Default)]
struct LifecycleLog {
    losses: Cell<u32>,
}

impl DeviceNotify for LifecycleLog {
    fn on_device_lost(&self) {
        self.losses.set(self.losses.get() + 1);
        log::warn!("device lost (#{}); releasing app resources", self.losses.get());
    }

    fn on_device_restored(&self) {
        log::info!("device restored; recreating app resources");
    }
}

struct Studio {
    lifecycle: Rc<LifecycleLog>,
    frame: u64,
}

impl App for Studio {
    fn on_surface_ready(&mut self, surface: &mut SurfaceResources<WgpuBackend>) -> Result<()> {
        surface.register_device_notify(&self.lifecycle);

        let device = surface.device_manager();
        log::info!(
            "surface ready: {:?} tier on {}, target {}x{} at {} dpi",
            device.tier(),
            device.adapter(),
            surface.render_target_size().width,
            surface.render_target_size().height,
            surface.effective_dpi(),
        );
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        self.frame += 1;

        // Slow pulse so dropped frames during recovery are visible.
        let t = (self.frame % 240) as f64 / 240.0;
        let pulse = 0.5 - 0.5 * (t * std::f64::consts::TAU).cos();
        ctx.clear(wgpu::Color { r: 0.05, g: 0.08 + 0.2 * pulse, b: 0.15 + 0.3 * pulse, a: 1.0 });

        AppControl::Continue
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let studio = Studio { lifecycle: Rc::new(LifecycleLog::default()), frame: 0 };

    Runtime::run(
        RuntimeConfig { title: "Prism Studio".to_string(), ..Default::default() },
        WgpuInit::default(),
        ResourcesConfig::default(),
        studio,
    )
}
