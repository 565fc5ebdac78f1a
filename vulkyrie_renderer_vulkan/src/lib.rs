/*!
# Vulkyrie - Vulkan Renderer Backend

Vulkan implementation of the Vulkyrie renderer contract.

Every Vulkan call goes through the [`VulkanDriver`] trait: [`AshDriver`]
forwards to the system loader through `ash`, while unit tests run the whole
backend against an in-memory mock. Windows reach the backend through a
[`SurfaceProvider`]; [`WinitSurfaceProvider`] covers `winit` windows.

```no_run
use std::sync::Arc;
use vulkyrie_engine::vulkyrie::render::{RendererBackend, RendererConfig};
use vulkyrie_renderer_vulkan::{create_renderer, WinitSurfaceProvider};
# fn demo(window: Arc<winit::window::Window>) -> vulkyrie_engine::vulkyrie::Result<()> {
let provider = Box::new(WinitSurfaceProvider::new(window));
let mut renderer = create_renderer(RendererBackend::Vulkan, provider, RendererConfig::default())?;
renderer.initialize("Sandbox")?;
# Ok(())
# }
```
*/

mod debug;
mod vulkan_ash_driver;
mod vulkan_device;
mod vulkan_device_selector;
mod vulkan_driver;
mod vulkan_image;
mod vulkan_instance;
mod vulkan_renderer;
mod vulkan_renderer_frame;
mod vulkan_surface;
mod vulkan_swapchain;

#[cfg(test)]
mod mock_driver;

pub use vulkan_renderer::{create_renderer, VulkanRenderer, DEFAULT_FRAMEBUFFER_SIZE};
pub use vulkan_renderer_frame::FrameSync;

// Driver seam
pub use vulkan_ash_driver::AshDriver;
pub use vulkan_driver::{
    DeviceDesc, ImageDesc, ImageViewDesc, InstanceDesc, MemoryProperties, PhysicalDeviceInfo,
    SwapchainDesc, VulkanDriver,
};
pub use vulkan_surface::{SurfaceProvider, WindowSurfaceProvider, WinitSurfaceProvider};

// Renderer core
pub use vulkan_instance::{
    create_instance, destroy_instance, required_instance_extensions, GraphicsInstance, API_VERSION,
    VALIDATION_LAYER,
};
pub use vulkan_device_selector::{
    assign_queue_families, select_physical_device, DeviceRequirements, PhysicalDeviceRecord,
    QueueFamilyAssignment,
};
pub use vulkan_device::{
    create_logical_device, destroy_logical_device, detect_depth_format, find_memory_index,
    LogicalDeviceState, DEPTH_FORMAT_CANDIDATES,
};
pub use vulkan_swapchain::{
    choose_present_mode, choose_surface_format, query_swapchain_support, resolve_extent,
    resolve_image_count, PresentableImages, Swapchain, SwapchainSupportInfo, MAX_FRAMES_IN_FLIGHT,
};
pub use vulkan_image::{create_image, create_image_view, destroy_image, GpuImage, ImageSpec};

// Re-export debug utilities
pub use debug::{reset_validation_stats, severity_flags, validation_stats, vulkan_debug_callback, ValidationStats};
