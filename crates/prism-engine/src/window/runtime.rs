use std::sync::Arc;

use anyhow::{Context, Result};

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::coords;
use crate::core::{App as CoreApp, AppControl, FrameCtx, WindowCtx};
use crate::device::{WgpuBackend, WgpuInit};
use crate::display::{DisplayInfo, ResourcesConfig};
use crate::surface::SurfaceResources;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "prism".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window, binds a [`SurfaceResources`] to it and drives `app`
    /// until the window closes or a fatal error occurs.
    pub fn run<A>(config: RuntimeConfig, wgpu_init: WgpuInit, resources: ResourcesConfig, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, wgpu_init, resources, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.fatal.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    wgpu_init: WgpuInit,
    resources: ResourcesConfig,
    app: A,

    window: Option<Arc<Window>>,
    surface: Option<SurfaceResources<WgpuBackend>>,

    /// First fatal error; ends the loop and is returned from `run`.
    fatal: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, wgpu_init: WgpuInit, resources: ResourcesConfig, app: A) -> Self {
        Self {
            config,
            wgpu_init,
            resources,
            app,
            window: None,
            surface: None,
            fatal: None,
        }
    }

    fn create_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = Arc::new(event_loop.create_window(attrs).context("failed to create window")?);

        let backend = WgpuBackend::new(self.wgpu_init.clone());
        let mut surface = SurfaceResources::new(backend, self.resources.clone())?;
        surface.set_window(window.clone(), DisplayInfo::from_window(&window))?;
        self.app.on_surface_ready(&mut surface)?;

        window.request_redraw();
        self.window = Some(window);
        self.surface = Some(surface);
        Ok(())
    }

    /// Logs a fatal error and stops the loop.
    fn check(&mut self, event_loop: &ActiveEventLoop, result: Result<()>) {
        if let Err(e) = result {
            log::error!("fatal surface error: {e:#}");
            if self.fatal.is_none() {
                self.fatal = Some(e);
            }
            event_loop.exit();
        }
    }

    fn on_resized(&mut self, size: winit::dpi::PhysicalSize<u32>) -> Result<()> {
        let (Some(window), Some(surface)) = (&self.window, &mut self.surface) else {
            return Ok(());
        };

        let logical: LogicalSize<f64> = size.to_logical(window.scale_factor());
        // A rotated monitor shows up here as a plain resize; the compositor
        // never rotates the surface, so the orientation is left alone.
        surface.set_logical_size(coords::LogicalSize::new(logical.width as f32, logical.height as f32))?;
        window.request_redraw();
        Ok(())
    }

    fn on_redraw(&mut self, window_id: WindowId) -> Result<AppControl> {
        let (Some(window), Some(surface)) = (&self.window, &mut self.surface) else {
            return Ok(AppControl::Continue);
        };

        let control = match surface.render_ctx() {
            Some(render) => {
                let mut ctx = FrameCtx {
                    window: WindowCtx { id: window_id, window },
                    render,
                };
                self.app.on_frame(&mut ctx)
            }
            None => AppControl::Continue,
        };

        window.pre_present_notify();
        surface.present()?;
        Ok(control)
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.surface.is_some() {
            return;
        }

        let result = self.create_surface(event_loop);
        self.check(event_loop, result);
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(surface) = &self.surface {
            surface.trim();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw; present blocks on vsync, which paces the loop.
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if self.fatal.is_some() {
            event_loop.exit();
            return;
        }

        if self.app.on_window_event(window_id, &event) == AppControl::Exit {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.surface = None;
                self.window = None;
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                let result = self.on_resized(size);
                self.check(event_loop, result);
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let result = match &mut self.surface {
                    Some(surface) => surface.set_dpi((scale_factor * 96.0) as f32),
                    None => Ok(()),
                };
                self.check(event_loop, result);
            }

            // Becoming visible again is when a hot-plugged or removed adapter
            // is most likely to be noticed.
            WindowEvent::Occluded(false) => {
                let result = match &mut self.surface {
                    Some(surface) => surface.validate_device(),
                    None => Ok(()),
                };
                self.check(event_loop, result);
            }

            WindowEvent::RedrawRequested => match self.on_redraw(window_id) {
                Ok(AppControl::Continue) => {}
                Ok(AppControl::Exit) => event_loop.exit(),
                Err(e) => self.check(event_loop, Err(e)),
            },

            _ => {}
        }
    }
}
