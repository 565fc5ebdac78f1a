//! Application driver
//!
//! [`ApplicationManager`] owns the platform, the renderer and the client
//! [`Application`], and runs one frame at a time: clock update, client
//! update and render, renderer begin/end frame, then frame pacing.

use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::error::{Error, Result, StatusCode};
use crate::platform::Platform;
use crate::renderer::{FrameStatus, RenderPacket, Renderer, RendererBackend};
use crate::{engine_debug, engine_error, engine_fatal, engine_info};

const SOURCE: &str = "vulkyrie::app";

/// Window and backend settings for a client application
#[derive(Debug, Clone)]
pub struct ApplicationConfig {
    pub name: String,
    pub start_x: i32,
    pub start_y: i32,
    pub width: u32,
    pub height: u32,
    pub backend: RendererBackend,
    /// Frames per second targeted by frame pacing
    pub target_frame_rate: f64,
    /// Sleep away the unused part of each frame budget
    pub limit_frame_rate: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: "Vulkyrie Application".to_string(),
            start_x: 100,
            start_y: 100,
            width: 1280,
            height: 720,
            backend: RendererBackend::Vulkan,
            target_frame_rate: 60.0,
            limit_frame_rate: true,
        }
    }
}

/// Client application hooks called by the driver
pub trait Application {
    fn initialize(&mut self) -> Result<()>;
    fn update(&mut self, delta_time: f32) -> Result<()>;
    fn render(&mut self, delta_time: f32) -> Result<()>;
    fn on_resize(&mut self, width: u32, height: u32);
}

pub struct ApplicationManager {
    config: ApplicationConfig,
    platform: Arc<dyn Platform>,
    renderer: Box<dyn Renderer>,
    app: Box<dyn Application>,
    clock: Clock,
    initialized: bool,
    running: bool,
    suspended: bool,
    width: u32,
    height: u32,
    last_time: f64,
    frame_count: u64,
}

impl ApplicationManager {
    pub fn new(
        config: ApplicationConfig,
        platform: Arc<dyn Platform>,
        renderer: Box<dyn Renderer>,
        app: Box<dyn Application>,
    ) -> Self {
        let clock = Clock::new(platform.clone());
        Self {
            width: config.width,
            height: config.height,
            config,
            platform,
            renderer,
            app,
            clock,
            initialized: false,
            running: false,
            suspended: true,
            last_time: 0.0,
            frame_count: 0,
        }
    }

    /// Size and initialize the renderer, then the client application
    ///
    /// Any failure is reported once as a FATAL log line carrying the status
    /// code, and leaves the manager uninitialized.
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            engine_error!(SOURCE, "Application has already been initialized");
            return Err(Error::status(
                StatusCode::AppAlreadyInitialized,
                "application has already been initialized",
            ));
        }

        engine_info!(
            SOURCE,
            "Initializing '{}' ({}x{}, {} backend)",
            self.config.name,
            self.width,
            self.height,
            self.config.backend
        );

        self.renderer.on_resize(self.width, self.height);
        if let Err(e) = self.renderer.initialize(&self.config.name) {
            return Err(Self::fatal(e));
        }

        if let Err(e) = self.app.initialize() {
            let _ = self.renderer.shutdown();
            return Err(Self::fatal(Error::status(
                StatusCode::ClientAppInitializationFailed,
                format!("client application failed to initialize: {}", e),
            )));
        }

        self.app.on_resize(self.width, self.height);

        self.clock.start();
        self.clock.update();
        self.last_time = self.clock.elapsed();

        self.initialized = true;
        self.running = true;
        self.suspended = self.width == 0 || self.height == 0;
        Ok(())
    }

    /// Run one frame
    ///
    /// Suspended frames do nothing. Client or renderer failures stop the
    /// manager and are returned after a FATAL log line.
    pub fn run_frame(&mut self) -> Result<()> {
        if !self.initialized {
            engine_error!(SOURCE, "Please initialize the application before running");
            return Err(Error::status(
                StatusCode::AppNotInitialized,
                "application is not initialized",
            ));
        }
        if !self.running || self.suspended {
            return Ok(());
        }

        self.clock.update();
        let current_time = self.clock.elapsed();
        let delta = (current_time - self.last_time) as f32;
        let frame_start = self.platform.absolute_time();

        if let Err(e) = self.app.update(delta) {
            return Err(self.stop_with(StatusCode::ClientAppUpdateFailed, "client update failed", e));
        }
        if let Err(e) = self.app.render(delta) {
            return Err(self.stop_with(StatusCode::ClientAppRenderFailed, "client render failed", e));
        }

        match self.renderer.draw_frame(&RenderPacket { delta_time: delta }) {
            Ok(FrameStatus::Ready) => {}
            Ok(FrameStatus::Skipped) => {
                engine_debug!(SOURCE, "Frame {} skipped by renderer", self.frame_count);
            }
            Err(e) => {
                self.running = false;
                return Err(Self::fatal(e));
            }
        }

        if self.config.limit_frame_rate && self.config.target_frame_rate > 0.0 {
            let target_frame_seconds = 1.0 / self.config.target_frame_rate;
            let frame_elapsed = self.platform.absolute_time() - frame_start;
            let remaining = target_frame_seconds - frame_elapsed;
            if remaining > 0.0 {
                let remaining_ms = (remaining * 1000.0) as u64;
                if remaining_ms > 0 {
                    self.platform.sleep(Duration::from_millis(remaining_ms - 1));
                }
            }
        }

        self.last_time = current_time;
        self.frame_count += 1;
        Ok(())
    }

    /// Forward a framebuffer resize; a zero-sized window suspends frames
    pub fn on_resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height && !self.suspended {
            return;
        }
        self.width = width;
        self.height = height;

        // initialize() forwards the stored size
        if !self.initialized {
            return;
        }

        if width == 0 || height == 0 {
            if !self.suspended {
                engine_info!(SOURCE, "Window minimized, suspending application");
            }
            self.suspended = true;
            return;
        }

        if self.suspended {
            engine_info!(SOURCE, "Window restored, resuming application");
        }
        self.suspended = false;
        self.renderer.on_resize(width, height);
        self.app.on_resize(width, height);
    }

    /// Drive frames until `poll_events` reports that the platform wants to
    /// quit or a frame fails, then shut down
    pub fn run<F: FnMut() -> bool>(&mut self, mut poll_events: F) -> Result<()> {
        if !self.initialized {
            engine_error!(SOURCE, "Please initialize the application before running");
            return Err(Error::status(
                StatusCode::AppNotInitialized,
                "application is not initialized",
            ));
        }

        let mut result = Ok(());
        while self.running {
            if !poll_events() {
                self.running = false;
                break;
            }
            if let Err(e) = self.run_frame() {
                result = Err(e);
                break;
            }
        }

        let shutdown = self.shutdown();
        result.and(shutdown)
    }

    pub fn request_exit(&mut self) {
        self.running = false;
    }

    /// Tear down the renderer and stop the clock
    pub fn shutdown(&mut self) -> Result<()> {
        if !self.initialized {
            return Ok(());
        }
        engine_info!(SOURCE, "Shutting down after {} frames", self.frame_count);
        self.running = false;
        self.initialized = false;
        self.clock.stop();
        self.renderer.shutdown()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    fn stop_with(&mut self, code: StatusCode, context: &str, cause: Error) -> Error {
        self.running = false;
        Self::fatal(Error::status(code, format!("{}: {}", context, cause)))
    }

    fn fatal(error: Error) -> Error {
        engine_fatal!(SOURCE, "[{}] {}", error.status_code(), error);
        error
    }
}

impl Drop for ApplicationManager {
    fn drop(&mut self) {
        if self.initialized {
            let _ = self.shutdown();
        }
    }
}

#[cfg(test)]
#[path = "application_tests.rs"]
mod tests;
