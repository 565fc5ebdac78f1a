/// Mock driver for unit testing without a GPU
///
/// Simulates an instance with scripted physical devices, a surface and a
/// presentation engine. Every call is recorded by name and every created
/// handle is tracked until destroyed, so tests can check call order and
/// leaks. State sits behind `Arc<Mutex<..>>` so a test keeps a handle on it
/// after boxing the driver into a renderer.

use ash::prelude::VkResult;
use ash::vk;
use ash::vk::Handle;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use vulkyrie_engine::vulkyrie::{Error, Result, StatusCode};

use crate::vulkan_driver::{
    DeviceDesc, ImageDesc, ImageViewDesc, InstanceDesc, MemoryProperties, PhysicalDeviceInfo,
    SwapchainDesc, VulkanDriver,
};
use crate::vulkan_surface::SurfaceProvider;

// ============================================================================
// Scripted hardware
// ============================================================================

#[derive(Debug, Clone)]
pub struct MockPhysicalDevice {
    pub name: String,
    pub device_type: vk::PhysicalDeviceType,
    pub sampler_anisotropy: bool,
    pub queue_families: Vec<vk::QueueFlags>,
    /// Surface support per queue family (missing entries mean unsupported)
    pub present_support: Vec<bool>,
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
    pub extensions: Vec<String>,
    /// Formats usable as depth-stencil attachment with optimal tiling
    pub depth_formats: Vec<vk::Format>,
    pub memory_types: Vec<vk::MemoryPropertyFlags>,
}

impl MockPhysicalDevice {
    /// Discrete GPU with a single all-purpose family that can present
    pub fn discrete(name: &str) -> Self {
        Self {
            name: name.to_string(),
            device_type: vk::PhysicalDeviceType::DISCRETE_GPU,
            sampler_anisotropy: true,
            queue_families: vec![vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER],
            present_support: vec![true],
            capabilities: capabilities(1, 3, (400, 400)),
            formats: vec![vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_UNORM,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            }],
            present_modes: vec![vk::PresentModeKHR::FIFO],
            extensions: vec![ash::khr::swapchain::NAME.to_string_lossy().into_owned()],
            depth_formats: vec![vk::Format::D32_SFLOAT],
            memory_types: vec![
                vk::MemoryPropertyFlags::DEVICE_LOCAL,
                vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
            ],
        }
    }
}

/// Surface capabilities with a `[1, 4096]` extent range
pub fn capabilities(min_images: u32, max_images: u32, current: (u32, u32)) -> vk::SurfaceCapabilitiesKHR {
    vk::SurfaceCapabilitiesKHR {
        min_image_count: min_images,
        max_image_count: max_images,
        current_extent: vk::Extent2D { width: current.0, height: current.1 },
        min_image_extent: vk::Extent2D { width: 1, height: 1 },
        max_image_extent: vk::Extent2D { width: 4096, height: 4096 },
        max_image_array_layers: 1,
        supported_transforms: vk::SurfaceTransformFlagsKHR::IDENTITY,
        current_transform: vk::SurfaceTransformFlagsKHR::IDENTITY,
        supported_composite_alpha: vk::CompositeAlphaFlagsKHR::OPAQUE,
        supported_usage_flags: vk::ImageUsageFlags::COLOR_ATTACHMENT,
    }
}

// ============================================================================
// Driver state
// ============================================================================

pub struct MockState {
    pub instance_extensions: Vec<String>,
    pub instance_layers: Vec<String>,
    pub debug_messenger_supported: bool,
    pub devices: Vec<MockPhysicalDevice>,
    pub fail_surface: bool,
    /// Memory type filter reported for every image
    pub memory_type_bits: u32,
    /// Results handed out by acquire, front first; `Ok((0, false))` when empty
    pub acquire_results: VecDeque<VkResult<(u32, bool)>>,
    /// Results handed out by present, front first; `Ok(false)` when empty
    pub present_results: VecDeque<VkResult<bool>>,

    pub calls: Vec<String>,
    pub live: FxHashSet<u64>,
    pub instance: Option<vk::Instance>,
    pub device: Option<vk::Device>,
    pub last_instance: Option<InstanceDesc>,
    pub last_device: Option<DeviceDesc>,
    pub selected_device: Option<vk::PhysicalDevice>,
    pub swapchains: Vec<SwapchainDesc>,
    pub image_views: Vec<vk::ImageView>,
    /// Image each view was created for, in creation order
    pub view_images: Vec<vk::Image>,
    pub allocations: Vec<(vk::DeviceSize, u32)>,
    pub submits: usize,

    next_handle: u64,
    swapchain_images: FxHashMap<u64, Vec<vk::Image>>,
    image_extents: FxHashMap<u64, (u32, u32)>,
}

impl MockState {
    fn new() -> Self {
        Self {
            instance_extensions: vec![
                "VK_KHR_surface".to_string(),
                "VK_KHR_xcb_surface".to_string(),
                "VK_EXT_debug_utils".to_string(),
            ],
            instance_layers: vec!["VK_LAYER_KHRONOS_validation".to_string()],
            debug_messenger_supported: true,
            devices: vec![MockPhysicalDevice::discrete("Mock GPU")],
            fail_surface: false,
            memory_type_bits: u32::MAX,
            acquire_results: VecDeque::new(),
            present_results: VecDeque::new(),
            calls: Vec::new(),
            live: FxHashSet::default(),
            instance: None,
            device: None,
            last_instance: None,
            last_device: None,
            selected_device: None,
            swapchains: Vec::new(),
            image_views: Vec::new(),
            view_images: Vec::new(),
            allocations: Vec::new(),
            submits: 0,
            next_handle: 1000,
            swapchain_images: FxHashMap::default(),
            image_extents: FxHashMap::default(),
        }
    }

    fn record(&mut self, call: &str) {
        self.calls.push(call.to_string());
    }

    fn create<H: Handle>(&mut self, call: &str) -> H {
        self.record(call);
        self.next_handle += 1;
        self.live.insert(self.next_handle);
        H::from_raw(self.next_handle)
    }

    fn destroy<H: Handle>(&mut self, call: &str, handle: H) {
        self.record(call);
        self.live.remove(&handle.as_raw());
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| c.as_str() == call).count()
    }

    pub fn called(&self, call: &str) -> bool {
        self.count(call) > 0
    }

    /// Position of the first occurrence of `call` in the call log
    pub fn position(&self, call: &str) -> Option<usize> {
        self.calls.iter().position(|c| c.as_str() == call)
    }

    pub fn is_live<H: Handle>(&self, handle: H) -> bool {
        self.live.contains(&handle.as_raw())
    }

    fn physical(&self, physical_device: vk::PhysicalDevice) -> Option<&MockPhysicalDevice> {
        (physical_device.as_raw() as usize)
            .checked_sub(1)
            .and_then(|index| self.devices.get(index))
    }
}

#[derive(Clone)]
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::new())),
        }
    }

    /// Shared handle on the driver state
    pub fn state(&self) -> Arc<Mutex<MockState>> {
        self.state.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Provider that only contributes a platform extension; the mock driver
/// creates the surface itself
pub struct MockSurfaceProvider;

impl SurfaceProvider for MockSurfaceProvider {
    fn add_required_extensions(&self, extensions: &mut Vec<String>) -> Result<()> {
        extensions.push("VK_KHR_xcb_surface".to_string());
        Ok(())
    }

    fn create_surface(&self, _entry: &ash::Entry, _instance: &ash::Instance) -> Result<vk::SurfaceKHR> {
        Err(Error::InvalidResource("mock surfaces come from MockDriver".to_string()))
    }
}

// ============================================================================
// VulkanDriver
// ============================================================================

impl VulkanDriver for MockDriver {
    fn instance_extensions(&self) -> VkResult<Vec<String>> {
        let mut state = self.lock();
        state.record("instance_extensions");
        Ok(state.instance_extensions.clone())
    }

    fn instance_layers(&self) -> VkResult<Vec<String>> {
        let mut state = self.lock();
        state.record("instance_layers");
        Ok(state.instance_layers.clone())
    }

    fn create_instance(&mut self, desc: &InstanceDesc) -> VkResult<vk::Instance> {
        let mut state = self.lock();
        state.last_instance = Some(desc.clone());
        let instance: vk::Instance = state.create("create_instance");
        state.instance = Some(instance);
        Ok(instance)
    }

    fn destroy_instance(&mut self) {
        let mut state = self.lock();
        match state.instance.take() {
            Some(instance) => state.destroy("destroy_instance", instance),
            None => state.record("destroy_instance"),
        }
    }

    fn debug_messenger_supported(&self) -> bool {
        self.lock().debug_messenger_supported
    }

    fn create_debug_messenger(
        &mut self,
        _severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    ) -> VkResult<vk::DebugUtilsMessengerEXT> {
        Ok(self.lock().create("create_debug_messenger"))
    }

    fn destroy_debug_messenger(&mut self, messenger: vk::DebugUtilsMessengerEXT) {
        self.lock().destroy("destroy_debug_messenger", messenger);
    }

    fn create_surface(&mut self, _provider: &dyn SurfaceProvider) -> Result<vk::SurfaceKHR> {
        let mut state = self.lock();
        if state.fail_surface {
            state.record("create_surface");
            return Err(Error::status(
                StatusCode::VulkanFailedToCreateSurface,
                "mock surface creation failed",
            ));
        }
        Ok(state.create("create_surface"))
    }

    fn destroy_surface(&mut self, surface: vk::SurfaceKHR) {
        self.lock().destroy("destroy_surface", surface);
    }

    fn physical_devices(&self) -> VkResult<Vec<vk::PhysicalDevice>> {
        let mut state = self.lock();
        state.record("physical_devices");
        Ok((1..=state.devices.len() as u64).map(vk::PhysicalDevice::from_raw).collect())
    }

    fn physical_device_info(&self, physical_device: vk::PhysicalDevice) -> PhysicalDeviceInfo {
        let state = self.lock();
        let device = state.physical(physical_device);
        PhysicalDeviceInfo {
            name: device.map(|d| d.name.clone()).unwrap_or_default(),
            device_type: device.map(|d| d.device_type).unwrap_or(vk::PhysicalDeviceType::OTHER),
            driver_version: vk::make_api_version(0, 535, 0, 0),
            api_version: vk::API_VERSION_1_3,
        }
    }

    fn physical_device_features(&self, physical_device: vk::PhysicalDevice) -> vk::PhysicalDeviceFeatures {
        let state = self.lock();
        let anisotropy = state.physical(physical_device).map(|d| d.sampler_anisotropy).unwrap_or(false);
        vk::PhysicalDeviceFeatures::default().sampler_anisotropy(anisotropy)
    }

    fn memory_properties(&self, physical_device: vk::PhysicalDevice) -> MemoryProperties {
        let state = self.lock();
        let Some(device) = state.physical(physical_device) else {
            return MemoryProperties::default();
        };
        MemoryProperties {
            types: device
                .memory_types
                .iter()
                .map(|&flags| vk::MemoryType { property_flags: flags, heap_index: 0 })
                .collect(),
            heaps: vec![vk::MemoryHeap {
                size: 8 * 1024 * 1024 * 1024,
                flags: vk::MemoryHeapFlags::DEVICE_LOCAL,
            }],
        }
    }

    fn queue_family_properties(&self, physical_device: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties> {
        let state = self.lock();
        state
            .physical(physical_device)
            .map(|d| {
                d.queue_families
                    .iter()
                    .map(|&flags| vk::QueueFamilyProperties {
                        queue_flags: flags,
                        queue_count: 1,
                        ..Default::default()
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn device_extensions(&self, physical_device: vk::PhysicalDevice) -> VkResult<Vec<String>> {
        let state = self.lock();
        Ok(state.physical(physical_device).map(|d| d.extensions.clone()).unwrap_or_default())
    }

    fn format_properties(&self, physical_device: vk::PhysicalDevice, format: vk::Format) -> vk::FormatProperties {
        let state = self.lock();
        let supported = state
            .physical(physical_device)
            .map(|d| d.depth_formats.contains(&format))
            .unwrap_or(false);
        let mut properties = vk::FormatProperties::default();
        if supported {
            properties.optimal_tiling_features = vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT;
        }
        properties
    }

    fn surface_support(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family: u32,
        _surface: vk::SurfaceKHR,
    ) -> VkResult<bool> {
        let state = self.lock();
        Ok(state
            .physical(physical_device)
            .and_then(|d| d.present_support.get(queue_family as usize).copied())
            .unwrap_or(false))
    }

    fn surface_capabilities(
        &self,
        physical_device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> VkResult<vk::SurfaceCapabilitiesKHR> {
        let state = self.lock();
        state
            .physical(physical_device)
            .map(|d| d.capabilities)
            .ok_or(vk::Result::ERROR_SURFACE_LOST_KHR)
    }

    fn surface_formats(
        &self,
        physical_device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::SurfaceFormatKHR>> {
        let state = self.lock();
        Ok(state.physical(physical_device).map(|d| d.formats.clone()).unwrap_or_default())
    }

    fn surface_present_modes(
        &self,
        physical_device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::PresentModeKHR>> {
        let state = self.lock();
        Ok(state.physical(physical_device).map(|d| d.present_modes.clone()).unwrap_or_default())
    }

    fn create_device(&mut self, physical_device: vk::PhysicalDevice, desc: &DeviceDesc) -> VkResult<vk::Device> {
        let mut state = self.lock();
        state.last_device = Some(desc.clone());
        state.selected_device = Some(physical_device);
        let device: vk::Device = state.create("create_device");
        state.device = Some(device);
        Ok(device)
    }

    fn destroy_device(&mut self) {
        let mut state = self.lock();
        state.selected_device = None;
        match state.device.take() {
            Some(device) => state.destroy("destroy_device", device),
            None => state.record("destroy_device"),
        }
    }

    fn device_queue(&self, queue_family: u32, queue_index: u32) -> vk::Queue {
        // Deterministic per family so tests can compare queues
        vk::Queue::from_raw(500 + u64::from(queue_family) * 10 + u64::from(queue_index))
    }

    fn device_wait_idle(&self) -> VkResult<()> {
        self.lock().record("device_wait_idle");
        Ok(())
    }

    fn create_swapchain(&mut self, desc: &SwapchainDesc) -> VkResult<vk::SwapchainKHR> {
        let mut state = self.lock();
        state.swapchains.push(desc.clone());
        let swapchain: vk::SwapchainKHR = state.create("create_swapchain");

        let mut images = Vec::with_capacity(desc.min_image_count as usize);
        for _ in 0..desc.min_image_count {
            state.next_handle += 1;
            images.push(vk::Image::from_raw(state.next_handle));
        }
        state.swapchain_images.insert(swapchain.as_raw(), images);
        Ok(swapchain)
    }

    fn destroy_swapchain(&mut self, swapchain: vk::SwapchainKHR) {
        let mut state = self.lock();
        state.swapchain_images.remove(&swapchain.as_raw());
        state.destroy("destroy_swapchain", swapchain);
    }

    fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>> {
        let state = self.lock();
        state
            .swapchain_images
            .get(&swapchain.as_raw())
            .cloned()
            .ok_or(vk::Result::ERROR_OUT_OF_DATE_KHR)
    }

    fn acquire_next_image(
        &self,
        _swapchain: vk::SwapchainKHR,
        _timeout_ns: u64,
        _image_available: vk::Semaphore,
        _fence: vk::Fence,
    ) -> VkResult<(u32, bool)> {
        let mut state = self.lock();
        state.record("acquire_next_image");
        state.acquire_results.pop_front().unwrap_or(Ok((0, false)))
    }

    fn queue_present(
        &self,
        _queue: vk::Queue,
        _swapchain: vk::SwapchainKHR,
        _image_index: u32,
        _render_complete: vk::Semaphore,
    ) -> VkResult<bool> {
        let mut state = self.lock();
        state.record("queue_present");
        state.present_results.pop_front().unwrap_or(Ok(false))
    }

    fn create_image(&mut self, desc: &ImageDesc) -> VkResult<vk::Image> {
        let mut state = self.lock();
        let image: vk::Image = state.create("create_image");
        state.image_extents.insert(image.as_raw(), (desc.width, desc.height));
        Ok(image)
    }

    fn destroy_image(&mut self, image: vk::Image) {
        let mut state = self.lock();
        state.image_extents.remove(&image.as_raw());
        state.destroy("destroy_image", image);
    }

    fn image_memory_requirements(&self, image: vk::Image) -> vk::MemoryRequirements {
        let state = self.lock();
        let (width, height) = state.image_extents.get(&image.as_raw()).copied().unwrap_or((0, 0));
        vk::MemoryRequirements {
            size: u64::from(width) * u64::from(height) * 4,
            alignment: 256,
            memory_type_bits: state.memory_type_bits,
        }
    }

    fn allocate_memory(&mut self, size: vk::DeviceSize, memory_type_index: u32) -> VkResult<vk::DeviceMemory> {
        let mut state = self.lock();
        state.allocations.push((size, memory_type_index));
        Ok(state.create("allocate_memory"))
    }

    fn free_memory(&mut self, memory: vk::DeviceMemory) {
        self.lock().destroy("free_memory", memory);
    }

    fn bind_image_memory(&self, _image: vk::Image, _memory: vk::DeviceMemory, _offset: vk::DeviceSize) -> VkResult<()> {
        self.lock().record("bind_image_memory");
        Ok(())
    }

    fn create_image_view(&mut self, desc: &ImageViewDesc) -> VkResult<vk::ImageView> {
        let mut state = self.lock();
        let view: vk::ImageView = state.create("create_image_view");
        state.image_views.push(view);
        state.view_images.push(desc.image);
        Ok(view)
    }

    fn destroy_image_view(&mut self, view: vk::ImageView) {
        self.lock().destroy("destroy_image_view", view);
    }

    fn create_semaphore(&mut self) -> VkResult<vk::Semaphore> {
        Ok(self.lock().create("create_semaphore"))
    }

    fn destroy_semaphore(&mut self, semaphore: vk::Semaphore) {
        self.lock().destroy("destroy_semaphore", semaphore);
    }

    fn create_fence(&mut self, _signaled: bool) -> VkResult<vk::Fence> {
        Ok(self.lock().create("create_fence"))
    }

    fn destroy_fence(&mut self, fence: vk::Fence) {
        self.lock().destroy("destroy_fence", fence);
    }

    fn wait_for_fence(&self, _fence: vk::Fence, _timeout_ns: u64) -> VkResult<()> {
        self.lock().record("wait_for_fence");
        Ok(())
    }

    fn reset_fence(&self, _fence: vk::Fence) -> VkResult<()> {
        self.lock().record("reset_fence");
        Ok(())
    }

    fn submit_frame(
        &self,
        _queue: vk::Queue,
        _wait: vk::Semaphore,
        _signal: vk::Semaphore,
        _fence: vk::Fence,
    ) -> VkResult<()> {
        let mut state = self.lock();
        state.record("submit_frame");
        state.submits += 1;
        Ok(())
    }
}
