/// Placeholder renderer for backends that are selectable but not written yet

use crate::error::{Error, Result, StatusCode};
use crate::renderer::{FrameStatus, Renderer, RendererBackend};

/// Fails to initialize with `RendererBackendNotImplemented`
pub struct UnimplementedRenderer {
    backend: RendererBackend,
}

impl UnimplementedRenderer {
    pub fn new(backend: RendererBackend) -> Self {
        Self { backend }
    }

    fn not_implemented(&self) -> Error {
        Error::status(
            StatusCode::RendererBackendNotImplemented,
            format!("{} renderer backend is not implemented", self.backend),
        )
    }
}

impl Renderer for UnimplementedRenderer {
    fn backend(&self) -> RendererBackend {
        self.backend
    }

    fn initialize(&mut self, app_name: &str) -> Result<()> {
        crate::engine_error!(
            "vulkyrie::renderer",
            "Cannot initialize '{}': {} backend is not implemented",
            app_name,
            self.backend
        );
        Err(self.not_implemented())
    }

    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }

    fn on_resize(&mut self, _width: u32, _height: u32) {}

    fn begin_frame(&mut self, _delta_time: f32) -> Result<FrameStatus> {
        Err(self.not_implemented())
    }

    fn end_frame(&mut self, _delta_time: f32) -> Result<()> {
        Err(self.not_implemented())
    }

    fn frame_number(&self) -> u64 {
        0
    }

    fn is_initialized(&self) -> bool {
        false
    }
}
