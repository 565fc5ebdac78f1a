//! Error types for the Vulkyrie engine
//!
//! Every failure that can stop the engine maps onto a [`StatusCode`]. The
//! status code is what the application driver reports in its fatal log line
//! and what the process returns as exit code.

use std::fmt;

/// Result type for Vulkyrie engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Engine-wide status codes
///
/// `Successful` is the only non-failure value. The discriminants are stable
/// and are used directly as process exit codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Successful = 0,

    // Application
    AppNotInitialized = 1,
    AppAlreadyInitialized = 2,
    ClientAppInitializationFailed = 3,
    ClientAppUpdateFailed = 4,
    ClientAppRenderFailed = 5,
    WindowCreationFailed = 6,

    // Renderer
    RendererNotInitialized = 20,
    RendererAlreadyInitialized = 21,
    RendererBackendNotImplemented = 22,

    // Vulkan
    VulkanLibraryLoadFailed = 40,
    VulkanRequiredValidationLayersMissing = 41,
    VulkanInstanceExtensionNotFound = 42,
    VulkanDebugMessengerUnavailable = 43,
    VulkanFailedToCreateSurface = 44,
    VulkanNoDevicesWithVulkanSupport = 45,
    VulkanDiscreteGpuRequired = 46,
    VulkanPhysicalDeviceDoesNotMeetRequirements = 47,
    VulkanSamplerAnisotropyNotSupported = 48,
    VulkanRequiredSwapchainNotSupported = 49,
    VulkanRequiredExtensionNotFound = 50,
    VulkanNoPhysicalDeviceMeetsRequirements = 51,
    VulkanMemoryTypeNotFound = 52,
    VulkanDepthFormatNotSupported = 53,

    // Generic
    BackendFailure = 90,
    OutOfMemory = 91,
    InitializationFailed = 92,
}

impl StatusCode {
    /// Process exit code for this status (0 only for `Successful`)
    pub fn exit_code(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == StatusCode::Successful
    }

    /// Status of a finished operation
    pub fn of<T>(result: &Result<T>) -> StatusCode {
        match result {
            Ok(_) => StatusCode::Successful,
            Err(e) => e.status_code(),
        }
    }

    /// Human readable description
    pub fn description(self) -> &'static str {
        match self {
            StatusCode::Successful => "successful",
            StatusCode::AppNotInitialized => "application not initialized",
            StatusCode::AppAlreadyInitialized => "application already initialized",
            StatusCode::ClientAppInitializationFailed => "client application failed to initialize",
            StatusCode::ClientAppUpdateFailed => "client application update failed",
            StatusCode::ClientAppRenderFailed => "client application render failed",
            StatusCode::WindowCreationFailed => "failed to create window",
            StatusCode::RendererNotInitialized => "renderer not initialized",
            StatusCode::RendererAlreadyInitialized => "renderer already initialized",
            StatusCode::RendererBackendNotImplemented => "renderer backend not implemented",
            StatusCode::VulkanLibraryLoadFailed => "failed to load the Vulkan library",
            StatusCode::VulkanRequiredValidationLayersMissing => "required validation layers missing",
            StatusCode::VulkanInstanceExtensionNotFound => "required instance extension not found",
            StatusCode::VulkanDebugMessengerUnavailable => "debug messenger entry point unavailable",
            StatusCode::VulkanFailedToCreateSurface => "failed to create window surface",
            StatusCode::VulkanNoDevicesWithVulkanSupport => "no devices with Vulkan support",
            StatusCode::VulkanDiscreteGpuRequired => "discrete GPU required",
            StatusCode::VulkanPhysicalDeviceDoesNotMeetRequirements => "physical device does not meet requirements",
            StatusCode::VulkanSamplerAnisotropyNotSupported => "sampler anisotropy not supported",
            StatusCode::VulkanRequiredSwapchainNotSupported => "required swapchain support missing",
            StatusCode::VulkanRequiredExtensionNotFound => "required device extension not found",
            StatusCode::VulkanNoPhysicalDeviceMeetsRequirements => "no physical device meets requirements",
            StatusCode::VulkanMemoryTypeNotFound => "no suitable memory type",
            StatusCode::VulkanDepthFormatNotSupported => "no supported depth format",
            StatusCode::BackendFailure => "backend failure",
            StatusCode::OutOfMemory => "out of memory",
            StatusCode::InitializationFailed => "initialization failed",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.exit_code())
    }
}

/// Vulkyrie engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Failure carrying an explicit status code
    Status(StatusCode, String),

    /// Backend-specific error (Vulkan, DirectX, etc.)
    BackendError(String),

    /// Invalid resource (image, view, handle, etc.)
    InvalidResource(String),
}

impl Error {
    pub fn status(code: StatusCode, message: impl Into<String>) -> Self {
        Error::Status(code, message.into())
    }

    /// Status code this error reports to the application driver
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Status(code, _) => *code,
            Error::BackendError(_) | Error::InvalidResource(_) => StatusCode::BackendFailure,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Status(code, msg) => write!(f, "{}: {}", code.description(), msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
