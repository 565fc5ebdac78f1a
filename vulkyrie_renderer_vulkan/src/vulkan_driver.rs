/// VulkanDriver - the seam between the backend and the Vulkan API
///
/// Every Vulkan entry point the backend calls goes through this trait.
/// `AshDriver` forwards to the real loader; tests plug in `MockDriver`.
/// Inputs are plain descriptor structs so that callers never build
/// pointer-carrying `vk::*CreateInfo` values themselves.

use ash::prelude::VkResult;
use ash::vk;
use vulkyrie_engine::vulkyrie::Result;

use crate::vulkan_surface::SurfaceProvider;

/// Instance creation parameters
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceDesc {
    pub app_name: String,
    pub app_version: u32,
    pub engine_name: String,
    pub engine_version: u32,
    pub api_version: u32,
    pub extensions: Vec<String>,
    pub layers: Vec<String>,
}

/// Logical device creation parameters
///
/// `queue_families` holds each family once; one queue at priority 1.0 is
/// created per entry.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceDesc {
    pub queue_families: Vec<u32>,
    pub extensions: Vec<String>,
    pub sampler_anisotropy: bool,
}

#[derive(Debug, Clone)]
pub struct SwapchainDesc {
    pub surface: vk::SurfaceKHR,
    pub min_image_count: u32,
    pub format: vk::SurfaceFormatKHR,
    pub extent: vk::Extent2D,
    pub sharing_mode: vk::SharingMode,
    /// Empty for exclusive sharing
    pub queue_family_indices: Vec<u32>,
    pub pre_transform: vk::SurfaceTransformFlagsKHR,
    pub present_mode: vk::PresentModeKHR,
    pub usage: vk::ImageUsageFlags,
}

/// 2D image, single mip level and array layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageDesc {
    pub image_type: vk::ImageType,
    pub width: u32,
    pub height: u32,
    pub format: vk::Format,
    pub tiling: vk::ImageTiling,
    pub usage: vk::ImageUsageFlags,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageViewDesc {
    pub image: vk::Image,
    pub view_type: vk::ImageViewType,
    pub format: vk::Format,
    pub aspect: vk::ImageAspectFlags,
}

/// Identity and versions of a physical device
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalDeviceInfo {
    pub name: String,
    pub device_type: vk::PhysicalDeviceType,
    pub driver_version: u32,
    pub api_version: u32,
}

/// Memory types and heaps, trimmed to their reported counts
#[derive(Debug, Clone, Default)]
pub struct MemoryProperties {
    pub types: Vec<vk::MemoryType>,
    pub heaps: Vec<vk::MemoryHeap>,
}

pub trait VulkanDriver {
    // ===== INSTANCE =====

    fn instance_extensions(&self) -> VkResult<Vec<String>>;
    fn instance_layers(&self) -> VkResult<Vec<String>>;
    fn create_instance(&mut self, desc: &InstanceDesc) -> VkResult<vk::Instance>;
    fn destroy_instance(&mut self);

    /// Whether `vkCreateDebugUtilsMessengerEXT` resolves on the live instance
    fn debug_messenger_supported(&self) -> bool;
    fn create_debug_messenger(
        &mut self,
        severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    ) -> VkResult<vk::DebugUtilsMessengerEXT>;
    fn destroy_debug_messenger(&mut self, messenger: vk::DebugUtilsMessengerEXT);

    // ===== SURFACE =====

    fn create_surface(&mut self, provider: &dyn SurfaceProvider) -> Result<vk::SurfaceKHR>;
    fn destroy_surface(&mut self, surface: vk::SurfaceKHR);

    // ===== PHYSICAL DEVICES =====

    fn physical_devices(&self) -> VkResult<Vec<vk::PhysicalDevice>>;
    fn physical_device_info(&self, physical_device: vk::PhysicalDevice) -> PhysicalDeviceInfo;
    fn physical_device_features(&self, physical_device: vk::PhysicalDevice) -> vk::PhysicalDeviceFeatures;
    fn memory_properties(&self, physical_device: vk::PhysicalDevice) -> MemoryProperties;
    fn queue_family_properties(&self, physical_device: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties>;
    fn device_extensions(&self, physical_device: vk::PhysicalDevice) -> VkResult<Vec<String>>;
    fn format_properties(&self, physical_device: vk::PhysicalDevice, format: vk::Format) -> vk::FormatProperties;

    fn surface_support(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family: u32,
        surface: vk::SurfaceKHR,
    ) -> VkResult<bool>;
    fn surface_capabilities(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<vk::SurfaceCapabilitiesKHR>;
    fn surface_formats(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::SurfaceFormatKHR>>;
    fn surface_present_modes(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::PresentModeKHR>>;

    // ===== LOGICAL DEVICE =====

    fn create_device(&mut self, physical_device: vk::PhysicalDevice, desc: &DeviceDesc) -> VkResult<vk::Device>;
    fn destroy_device(&mut self);
    fn device_queue(&self, queue_family: u32, queue_index: u32) -> vk::Queue;
    fn device_wait_idle(&self) -> VkResult<()>;

    // ===== SWAPCHAIN =====

    fn create_swapchain(&mut self, desc: &SwapchainDesc) -> VkResult<vk::SwapchainKHR>;
    fn destroy_swapchain(&mut self, swapchain: vk::SwapchainKHR);
    fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>>;

    /// Returns the image index and whether the swapchain is suboptimal
    fn acquire_next_image(
        &self,
        swapchain: vk::SwapchainKHR,
        timeout_ns: u64,
        image_available: vk::Semaphore,
        fence: vk::Fence,
    ) -> VkResult<(u32, bool)>;

    /// Returns whether the swapchain is suboptimal
    fn queue_present(
        &self,
        queue: vk::Queue,
        swapchain: vk::SwapchainKHR,
        image_index: u32,
        render_complete: vk::Semaphore,
    ) -> VkResult<bool>;

    // ===== IMAGES AND MEMORY =====

    fn create_image(&mut self, desc: &ImageDesc) -> VkResult<vk::Image>;
    fn destroy_image(&mut self, image: vk::Image);
    fn image_memory_requirements(&self, image: vk::Image) -> vk::MemoryRequirements;
    fn allocate_memory(&mut self, size: vk::DeviceSize, memory_type_index: u32) -> VkResult<vk::DeviceMemory>;
    fn free_memory(&mut self, memory: vk::DeviceMemory);
    fn bind_image_memory(&self, image: vk::Image, memory: vk::DeviceMemory, offset: vk::DeviceSize) -> VkResult<()>;
    fn create_image_view(&mut self, desc: &ImageViewDesc) -> VkResult<vk::ImageView>;
    fn destroy_image_view(&mut self, view: vk::ImageView);

    // ===== SYNCHRONIZATION =====

    fn create_semaphore(&mut self) -> VkResult<vk::Semaphore>;
    fn destroy_semaphore(&mut self, semaphore: vk::Semaphore);
    fn create_fence(&mut self, signaled: bool) -> VkResult<vk::Fence>;
    fn destroy_fence(&mut self, fence: vk::Fence);
    fn wait_for_fence(&self, fence: vk::Fence, timeout_ns: u64) -> VkResult<()>;
    fn reset_fence(&self, fence: vk::Fence) -> VkResult<()>;

    /// Submit an empty batch that waits `wait` at color output, signals
    /// `signal` and then `fence`
    fn submit_frame(
        &self,
        queue: vk::Queue,
        wait: vk::Semaphore,
        signal: vk::Semaphore,
        fence: vk::Fence,
    ) -> VkResult<()>;
}
