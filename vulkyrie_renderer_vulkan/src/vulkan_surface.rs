/// Platform surface providers
///
/// A `SurfaceProvider` knows which instance extensions its windowing system
/// needs and how to turn its window into a `vk::SurfaceKHR`.

use ash::vk;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::ffi::CStr;
use std::sync::Arc;
use vulkyrie_engine::engine_status;
use vulkyrie_engine::vulkyrie::{Result, StatusCode};

const SOURCE: &str = "vulkyrie::vulkan::surface";

pub trait SurfaceProvider {
    /// Append the instance extensions the platform needs to `extensions`
    fn add_required_extensions(&self, extensions: &mut Vec<String>) -> Result<()>;

    /// Create a presentation surface for the window
    fn create_surface(&self, entry: &ash::Entry, instance: &ash::Instance) -> Result<vk::SurfaceKHR>;
}

/// Surface provider for any window exposing raw display and window handles
pub struct WindowSurfaceProvider<W> {
    window: Arc<W>,
}

/// Provider for a `winit` window
pub type WinitSurfaceProvider = WindowSurfaceProvider<winit::window::Window>;

impl<W> WindowSurfaceProvider<W> {
    pub fn new(window: Arc<W>) -> Self {
        Self { window }
    }

    pub fn window(&self) -> &Arc<W> {
        &self.window
    }
}

impl<W: HasDisplayHandle + HasWindowHandle> SurfaceProvider for WindowSurfaceProvider<W> {
    fn add_required_extensions(&self, extensions: &mut Vec<String>) -> Result<()> {
        let display_handle = self.window.display_handle().map_err(|e| {
            engine_status!(
                SOURCE,
                StatusCode::VulkanFailedToCreateSurface,
                "Failed to get display handle: {}",
                e
            )
        })?;

        let names = ash_window::enumerate_required_extensions(display_handle.as_raw()).map_err(|e| {
            engine_status!(
                SOURCE,
                StatusCode::VulkanInstanceExtensionNotFound,
                "Windowing system has no Vulkan surface support: {:?}",
                e
            )
        })?;

        for &name in names {
            // ash-window hands out pointers into static NUL-terminated names
            let name = unsafe { CStr::from_ptr(name) };
            extensions.push(name.to_string_lossy().into_owned());
        }
        Ok(())
    }

    fn create_surface(&self, entry: &ash::Entry, instance: &ash::Instance) -> Result<vk::SurfaceKHR> {
        let display_handle = self.window.display_handle().map_err(|e| {
            engine_status!(
                SOURCE,
                StatusCode::VulkanFailedToCreateSurface,
                "Failed to get display handle: {}",
                e
            )
        })?;
        let window_handle = self.window.window_handle().map_err(|e| {
            engine_status!(
                SOURCE,
                StatusCode::VulkanFailedToCreateSurface,
                "Failed to get window handle: {}",
                e
            )
        })?;

        unsafe {
            ash_window::create_surface(
                entry,
                instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            )
        }
        .map_err(|e| {
            engine_status!(
                SOURCE,
                StatusCode::VulkanFailedToCreateSurface,
                "Failed to create window surface: {:?}",
                e
            )
        })
    }
}
