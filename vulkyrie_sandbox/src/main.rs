//! Vulkyrie sandbox
//!
//! Opens a window, brings up the Vulkan renderer through the application
//! driver and presents frames until the window is closed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use vulkyrie_engine::vulkyrie::render::RendererConfig;
use vulkyrie_engine::vulkyrie::{
    Application, ApplicationConfig, ApplicationManager, Error, Platform, Result, StatusCode,
};
use vulkyrie_engine::{engine_debug, engine_error, engine_info, engine_trace};
use vulkyrie_renderer_vulkan::{create_renderer, WinitSurfaceProvider};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalPosition, LogicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

const SOURCE: &str = "vulkyrie::sandbox";

// ============================================================================
// Platform
// ============================================================================

/// Monotonic clock anchored at sandbox start
struct SystemPlatform {
    origin: Instant,
}

impl SystemPlatform {
    fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Platform for SystemPlatform {
    fn absolute_time(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

// ============================================================================
// Client application
// ============================================================================

#[derive(Default)]
struct SandboxGame {
    elapsed: f32,
    frames: u64,
}

impl Application for SandboxGame {
    fn initialize(&mut self) -> Result<()> {
        engine_info!(SOURCE, "Sandbox game initialized");
        Ok(())
    }

    fn update(&mut self, delta_time: f32) -> Result<()> {
        self.elapsed += delta_time;
        self.frames += 1;
        if self.elapsed >= 5.0 {
            engine_debug!(SOURCE, "{} frames in {:.2}s", self.frames, self.elapsed);
            self.elapsed = 0.0;
            self.frames = 0;
        }
        Ok(())
    }

    fn render(&mut self, _delta_time: f32) -> Result<()> {
        Ok(())
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        engine_trace!(SOURCE, "Sandbox resized to {}x{}", width, height);
    }
}

// ============================================================================
// Event loop
// ============================================================================

struct SandboxRunner {
    config: ApplicationConfig,
    window: Option<Arc<Window>>,
    manager: Option<ApplicationManager>,
    status: StatusCode,
}

impl SandboxRunner {
    fn new(config: ApplicationConfig) -> Self {
        Self {
            config,
            window: None,
            manager: None,
            status: StatusCode::Successful,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title(self.config.name.clone())
            .with_position(LogicalPosition::new(self.config.start_x, self.config.start_y))
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                return Err(Error::status(
                    StatusCode::WindowCreationFailed,
                    format!("failed to create window: {}", e),
                ))
            }
        };

        let mut config = self.config.clone();
        let size = window.inner_size();
        config.width = size.width;
        config.height = size.height;

        let provider = Box::new(WinitSurfaceProvider::new(window.clone()));
        let renderer = create_renderer(config.backend, provider, RendererConfig::default())?;
        let mut manager = ApplicationManager::new(
            config,
            Arc::new(SystemPlatform::new()),
            renderer,
            Box::new(SandboxGame::default()),
        );
        manager.initialize()?;

        self.window = Some(window);
        self.manager = Some(manager);
        Ok(())
    }

    fn stop(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(mut manager) = self.manager.take() {
            manager.request_exit();
            if let Err(e) = manager.shutdown() {
                engine_error!(SOURCE, "Shutdown failed: {}", e);
                self.record(e.status_code());
            }
        }
        self.window = None;
        event_loop.exit();
    }

    fn record(&mut self, status: StatusCode) {
        if self.status.is_success() {
            self.status = status;
        }
    }
}

impl ApplicationHandler for SandboxRunner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.manager.is_some() {
            return;
        }
        event_loop.set_control_flow(ControlFlow::Poll);
        if let Err(e) = self.start(event_loop) {
            engine_error!(SOURCE, "Sandbox failed to start: {}", e);
            self.record(e.status_code());
            self.stop(event_loop);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                engine_info!(SOURCE, "Close requested");
                self.stop(event_loop);
            }
            WindowEvent::Resized(size) => {
                if let Some(manager) = self.manager.as_mut() {
                    manager.on_resize(size.width, size.height);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(manager) = self.manager.as_mut() else {
            return;
        };
        if !manager.is_running() {
            self.stop(event_loop);
            return;
        }
        if let Err(e) = manager.run_frame() {
            self.record(e.status_code());
            self.stop(event_loop);
        }
    }
}

fn main() {
    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            engine_error!(SOURCE, "Failed to create event loop: {}", e);
            std::process::exit(StatusCode::WindowCreationFailed.exit_code());
        }
    };

    let mut runner = SandboxRunner::new(ApplicationConfig {
        name: "Vulkyrie Sandbox".to_string(),
        ..ApplicationConfig::default()
    });

    if let Err(e) = event_loop.run_app(&mut runner) {
        engine_error!(SOURCE, "Event loop terminated: {}", e);
        runner.record(StatusCode::BackendFailure);
    }

    if !runner.status.is_success() {
        std::process::exit(runner.status.exit_code());
    }
}
