/// Renderer trait - the frame contract every backend implements

use std::fmt;
use crate::error::Result;

// ============================================================================
// Configuration
// ============================================================================

/// Available renderer backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RendererBackend {
    #[default]
    Vulkan,
    OpenGl,
    DirectX,
}

impl RendererBackend {
    pub fn name(self) -> &'static str {
        match self {
            RendererBackend::Vulkan => "Vulkan",
            RendererBackend::OpenGl => "OpenGL",
            RendererBackend::DirectX => "DirectX",
        }
    }
}

impl fmt::Display for RendererBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which validation messages reach the engine logger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugSeverity {
    ErrorsOnly,
    ErrorsAndWarnings,
    All,
}

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Enable validation/debug layers
    pub enable_validation: bool,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
    /// Engine name reported to the driver
    pub engine_name: String,
    /// Engine version (major, minor, patch)
    pub engine_version: (u32, u32, u32),
    /// Validation message filter (only used with `enable_validation`)
    pub debug_severity: DebugSeverity,
    /// Timeout passed to image acquisition, in nanoseconds
    pub acquire_timeout_ns: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            app_version: (1, 0, 0),
            engine_name: "Vulkyrie".to_string(),
            engine_version: (1, 0, 0),
            debug_severity: DebugSeverity::All,
            acquire_timeout_ns: u64::MAX,
        }
    }
}

// ============================================================================
// Frame types
// ============================================================================

/// Outcome of `begin_frame`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// An image was acquired, recording and `end_frame` may proceed
    Ready,
    /// Nothing to render this frame (swapchain recreated or zero-sized surface)
    Skipped,
}

/// Per-frame data handed to the renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderPacket {
    pub delta_time: f32,
}

// ============================================================================
// Renderer trait
// ============================================================================

/// Main renderer trait
///
/// Implemented by backend renderers (e.g., VulkanRenderer). Every call happens
/// on the main-loop thread.
pub trait Renderer {
    /// Backend this renderer implements
    fn backend(&self) -> RendererBackend;

    /// Create every backend object needed to present frames
    ///
    /// On failure the renderer is left uninitialized with nothing allocated.
    fn initialize(&mut self, app_name: &str) -> Result<()>;

    /// Destroy everything created by `initialize`, in reverse order
    fn shutdown(&mut self) -> Result<()>;

    /// Record the new framebuffer size
    ///
    /// Swapchain recreation is deferred to the next out-of-date or suboptimal
    /// acquire/present.
    fn on_resize(&mut self, width: u32, height: u32);

    /// Begin a new frame
    fn begin_frame(&mut self, delta_time: f32) -> Result<FrameStatus>;

    /// End the current frame and present it
    fn end_frame(&mut self, delta_time: f32) -> Result<()>;

    /// Number of frames presented so far
    fn frame_number(&self) -> u64;

    fn is_initialized(&self) -> bool;

    /// Run a full begin/end cycle for one packet
    fn draw_frame(&mut self, packet: &RenderPacket) -> Result<FrameStatus> {
        let status = self.begin_frame(packet.delta_time)?;
        if status == FrameStatus::Ready {
            self.end_frame(packet.delta_time)?;
        }
        Ok(status)
    }
}
