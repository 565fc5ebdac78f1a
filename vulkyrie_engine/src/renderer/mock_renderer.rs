/// Mock Renderer for unit tests (no GPU required)
///
/// Records every call in a shared log so tests can assert on ordering after
/// the renderer has been moved into an `ApplicationManager`.

use std::sync::{Arc, Mutex};

use crate::error::{Error, Result, StatusCode};
use crate::renderer::{FrameStatus, Renderer, RendererBackend};

/// Calls observed by a MockRenderer
#[derive(Debug, Clone, PartialEq)]
pub enum MockRendererCall {
    Initialize(String),
    Shutdown,
    Resize(u32, u32),
    BeginFrame,
    EndFrame,
}

/// Scriptable failures and frame outcomes
#[derive(Debug, Default)]
pub struct MockRendererState {
    pub calls: Vec<MockRendererCall>,
    pub fail_initialize: Option<StatusCode>,
    pub skip_frames: u32,
    pub fail_end_frame: bool,
}

pub struct MockRenderer {
    state: Arc<Mutex<MockRendererState>>,
    initialized: bool,
    frame_number: u64,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockRendererState::default())),
            initialized: false,
            frame_number: 0,
        }
    }

    /// Shared handle to the call log and scripted behavior
    pub fn state(&self) -> Arc<Mutex<MockRendererState>> {
        self.state.clone()
    }

    fn record(&self, call: MockRendererCall) {
        self.state.lock().unwrap().calls.push(call);
    }
}

impl Renderer for MockRenderer {
    fn backend(&self) -> RendererBackend {
        RendererBackend::Vulkan
    }

    fn initialize(&mut self, app_name: &str) -> Result<()> {
        self.record(MockRendererCall::Initialize(app_name.to_string()));
        if let Some(code) = self.state.lock().unwrap().fail_initialize {
            return Err(Error::status(code, "scripted initialize failure"));
        }
        self.initialized = true;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.record(MockRendererCall::Shutdown);
        self.initialized = false;
        Ok(())
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        self.record(MockRendererCall::Resize(width, height));
    }

    fn begin_frame(&mut self, _delta_time: f32) -> Result<FrameStatus> {
        self.record(MockRendererCall::BeginFrame);
        let mut state = self.state.lock().unwrap();
        if state.skip_frames > 0 {
            state.skip_frames -= 1;
            return Ok(FrameStatus::Skipped);
        }
        Ok(FrameStatus::Ready)
    }

    fn end_frame(&mut self, _delta_time: f32) -> Result<()> {
        self.record(MockRendererCall::EndFrame);
        if self.state.lock().unwrap().fail_end_frame {
            return Err(Error::BackendError("scripted end_frame failure".to_string()));
        }
        self.frame_number += 1;
        Ok(())
    }

    fn frame_number(&self) -> u64 {
        self.frame_number
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}
