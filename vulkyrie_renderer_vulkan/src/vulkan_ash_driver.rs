/// AshDriver - VulkanDriver implementation over the `ash` loader
///
/// Owns the loaded library entry plus the instance- and device-level
/// function tables once they exist. Handles passed in are trusted to belong
/// to the live instance/device.

use ash::prelude::VkResult;
use ash::vk;
use std::ffi::{c_char, CStr, CString};
use vulkyrie_engine::vulkyrie::{Error, Result, StatusCode};
use vulkyrie_engine::engine_status;

use crate::vulkan_driver::{
    DeviceDesc, ImageDesc, ImageViewDesc, InstanceDesc, MemoryProperties, PhysicalDeviceInfo,
    SwapchainDesc, VulkanDriver,
};
use crate::vulkan_surface::SurfaceProvider;

const SOURCE: &str = "vulkyrie::vulkan::driver";

pub struct AshDriver {
    entry: ash::Entry,
    instance: Option<ash::Instance>,
    debug_utils: Option<ash::ext::debug_utils::Instance>,
    surface_loader: Option<ash::khr::surface::Instance>,
    device: Option<ash::Device>,
    swapchain_loader: Option<ash::khr::swapchain::Device>,
}

impl AshDriver {
    /// Load the Vulkan library
    pub fn load() -> Result<Self> {
        let entry = unsafe { ash::Entry::load() }.map_err(|e| {
            engine_status!(
                SOURCE,
                StatusCode::VulkanLibraryLoadFailed,
                "Failed to load Vulkan library: {}",
                e
            )
        })?;

        Ok(Self {
            entry,
            instance: None,
            debug_utils: None,
            surface_loader: None,
            device: None,
            swapchain_loader: None,
        })
    }

    fn instance(&self) -> VkResult<&ash::Instance> {
        self.instance.as_ref().ok_or(vk::Result::ERROR_INITIALIZATION_FAILED)
    }

    fn surface_loader(&self) -> VkResult<&ash::khr::surface::Instance> {
        self.surface_loader.as_ref().ok_or(vk::Result::ERROR_INITIALIZATION_FAILED)
    }

    fn device(&self) -> VkResult<&ash::Device> {
        self.device.as_ref().ok_or(vk::Result::ERROR_INITIALIZATION_FAILED)
    }

    fn swapchain_loader(&self) -> VkResult<&ash::khr::swapchain::Device> {
        self.swapchain_loader.as_ref().ok_or(vk::Result::ERROR_INITIALIZATION_FAILED)
    }
}

/// Convert owned names into C strings plus the pointer array Vulkan expects
fn c_names(names: &[String]) -> VkResult<(Vec<CString>, Vec<*const c_char>)> {
    let owned = names
        .iter()
        .map(|n| CString::new(n.as_str()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| vk::Result::ERROR_INITIALIZATION_FAILED)?;
    let pointers = owned.iter().map(|n| n.as_ptr()).collect();
    Ok((owned, pointers))
}

fn c_str_to_string(name: std::result::Result<&CStr, std::ffi::FromBytesUntilNulError>) -> Option<String> {
    name.ok().map(|n| n.to_string_lossy().into_owned())
}

impl VulkanDriver for AshDriver {
    fn instance_extensions(&self) -> VkResult<Vec<String>> {
        let properties = unsafe { self.entry.enumerate_instance_extension_properties(None)? };
        Ok(properties
            .iter()
            .filter_map(|p| c_str_to_string(p.extension_name_as_c_str()))
            .collect())
    }

    fn instance_layers(&self) -> VkResult<Vec<String>> {
        let properties = unsafe { self.entry.enumerate_instance_layer_properties()? };
        Ok(properties
            .iter()
            .filter_map(|p| c_str_to_string(p.layer_name_as_c_str()))
            .collect())
    }

    fn create_instance(&mut self, desc: &InstanceDesc) -> VkResult<vk::Instance> {
        let app_name = CString::new(desc.app_name.as_str()).map_err(|_| vk::Result::ERROR_INITIALIZATION_FAILED)?;
        let engine_name =
            CString::new(desc.engine_name.as_str()).map_err(|_| vk::Result::ERROR_INITIALIZATION_FAILED)?;
        let (_extensions, extension_ptrs) = c_names(&desc.extensions)?;
        let (_layers, layer_ptrs) = c_names(&desc.layers)?;

        let app_info = vk::ApplicationInfo::default()
            .application_name(&app_name)
            .application_version(desc.app_version)
            .engine_name(&engine_name)
            .engine_version(desc.engine_version)
            .api_version(desc.api_version);

        let create_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_layer_names(&layer_ptrs)
            .enabled_extension_names(&extension_ptrs);

        let instance = unsafe { self.entry.create_instance(&create_info, None)? };
        let handle = instance.handle();

        self.surface_loader = Some(ash::khr::surface::Instance::new(&self.entry, &instance));
        self.debug_utils = Some(ash::ext::debug_utils::Instance::new(&self.entry, &instance));
        self.instance = Some(instance);
        Ok(handle)
    }

    fn destroy_instance(&mut self) {
        self.debug_utils = None;
        self.surface_loader = None;
        if let Some(instance) = self.instance.take() {
            unsafe { instance.destroy_instance(None) };
        }
    }

    fn debug_messenger_supported(&self) -> bool {
        match &self.instance {
            Some(instance) => unsafe {
                self.entry
                    .get_instance_proc_addr(instance.handle(), c"vkCreateDebugUtilsMessengerEXT".as_ptr())
                    .is_some()
            },
            None => false,
        }
    }

    fn create_debug_messenger(
        &mut self,
        severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    ) -> VkResult<vk::DebugUtilsMessengerEXT> {
        let debug_utils = self.debug_utils.as_ref().ok_or(vk::Result::ERROR_EXTENSION_NOT_PRESENT)?;

        let debug_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(severity)
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(crate::debug::vulkan_debug_callback));

        unsafe { debug_utils.create_debug_utils_messenger(&debug_info, None) }
    }

    fn destroy_debug_messenger(&mut self, messenger: vk::DebugUtilsMessengerEXT) {
        if let Some(debug_utils) = &self.debug_utils {
            unsafe { debug_utils.destroy_debug_utils_messenger(messenger, None) };
        }
    }

    fn create_surface(&mut self, provider: &dyn SurfaceProvider) -> Result<vk::SurfaceKHR> {
        let instance = self.instance.as_ref().ok_or_else(|| {
            Error::status(
                StatusCode::VulkanFailedToCreateSurface,
                "surface requested before the instance exists",
            )
        })?;
        provider.create_surface(&self.entry, instance)
    }

    fn destroy_surface(&mut self, surface: vk::SurfaceKHR) {
        if let Some(loader) = &self.surface_loader {
            unsafe { loader.destroy_surface(surface, None) };
        }
    }

    fn physical_devices(&self) -> VkResult<Vec<vk::PhysicalDevice>> {
        unsafe { self.instance()?.enumerate_physical_devices() }
    }

    fn physical_device_info(&self, physical_device: vk::PhysicalDevice) -> PhysicalDeviceInfo {
        let Ok(instance) = self.instance() else {
            return PhysicalDeviceInfo {
                name: String::new(),
                device_type: vk::PhysicalDeviceType::OTHER,
                driver_version: 0,
                api_version: 0,
            };
        };
        let properties = unsafe { instance.get_physical_device_properties(physical_device) };
        PhysicalDeviceInfo {
            name: c_str_to_string(properties.device_name_as_c_str()).unwrap_or_default(),
            device_type: properties.device_type,
            driver_version: properties.driver_version,
            api_version: properties.api_version,
        }
    }

    fn physical_device_features(&self, physical_device: vk::PhysicalDevice) -> vk::PhysicalDeviceFeatures {
        match self.instance() {
            Ok(instance) => unsafe { instance.get_physical_device_features(physical_device) },
            Err(_) => vk::PhysicalDeviceFeatures::default(),
        }
    }

    fn memory_properties(&self, physical_device: vk::PhysicalDevice) -> MemoryProperties {
        let Ok(instance) = self.instance() else {
            return MemoryProperties::default();
        };
        let memory = unsafe { instance.get_physical_device_memory_properties(physical_device) };
        MemoryProperties {
            types: memory.memory_types[..memory.memory_type_count as usize].to_vec(),
            heaps: memory.memory_heaps[..memory.memory_heap_count as usize].to_vec(),
        }
    }

    fn queue_family_properties(&self, physical_device: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties> {
        match self.instance() {
            Ok(instance) => unsafe { instance.get_physical_device_queue_family_properties(physical_device) },
            Err(_) => Vec::new(),
        }
    }

    fn device_extensions(&self, physical_device: vk::PhysicalDevice) -> VkResult<Vec<String>> {
        let properties = unsafe { self.instance()?.enumerate_device_extension_properties(physical_device)? };
        Ok(properties
            .iter()
            .filter_map(|p| c_str_to_string(p.extension_name_as_c_str()))
            .collect())
    }

    fn format_properties(&self, physical_device: vk::PhysicalDevice, format: vk::Format) -> vk::FormatProperties {
        match self.instance() {
            Ok(instance) => unsafe { instance.get_physical_device_format_properties(physical_device, format) },
            Err(_) => vk::FormatProperties::default(),
        }
    }

    fn surface_support(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family: u32,
        surface: vk::SurfaceKHR,
    ) -> VkResult<bool> {
        unsafe {
            self.surface_loader()?
                .get_physical_device_surface_support(physical_device, queue_family, surface)
        }
    }

    fn surface_capabilities(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<vk::SurfaceCapabilitiesKHR> {
        unsafe {
            self.surface_loader()?
                .get_physical_device_surface_capabilities(physical_device, surface)
        }
    }

    fn surface_formats(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::SurfaceFormatKHR>> {
        unsafe {
            self.surface_loader()?
                .get_physical_device_surface_formats(physical_device, surface)
        }
    }

    fn surface_present_modes(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::PresentModeKHR>> {
        unsafe {
            self.surface_loader()?
                .get_physical_device_surface_present_modes(physical_device, surface)
        }
    }

    fn create_device(&mut self, physical_device: vk::PhysicalDevice, desc: &DeviceDesc) -> VkResult<vk::Device> {
        let queue_priorities = [1.0f32];
        let queue_create_infos: Vec<vk::DeviceQueueCreateInfo> = desc
            .queue_families
            .iter()
            .map(|&family| {
                vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(family)
                    .queue_priorities(&queue_priorities)
            })
            .collect();

        let (_extensions, extension_ptrs) = c_names(&desc.extensions)?;
        let device_features = vk::PhysicalDeviceFeatures::default()
            .sampler_anisotropy(desc.sampler_anisotropy);

        let device_create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_create_infos)
            .enabled_extension_names(&extension_ptrs)
            .enabled_features(&device_features);

        let instance = self.instance()?;
        let device = unsafe { instance.create_device(physical_device, &device_create_info, None)? };
        let handle = device.handle();

        let swapchain_loader = ash::khr::swapchain::Device::new(instance, &device);
        self.swapchain_loader = Some(swapchain_loader);
        self.device = Some(device);
        Ok(handle)
    }

    fn destroy_device(&mut self) {
        self.swapchain_loader = None;
        if let Some(device) = self.device.take() {
            unsafe { device.destroy_device(None) };
        }
    }

    fn device_queue(&self, queue_family: u32, queue_index: u32) -> vk::Queue {
        match self.device() {
            Ok(device) => unsafe { device.get_device_queue(queue_family, queue_index) },
            Err(_) => vk::Queue::null(),
        }
    }

    fn device_wait_idle(&self) -> VkResult<()> {
        unsafe { self.device()?.device_wait_idle() }
    }

    fn create_swapchain(&mut self, desc: &SwapchainDesc) -> VkResult<vk::SwapchainKHR> {
        let mut create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(desc.surface)
            .min_image_count(desc.min_image_count)
            .image_format(desc.format.format)
            .image_color_space(desc.format.color_space)
            .image_extent(desc.extent)
            .image_array_layers(1)
            .image_usage(desc.usage)
            .image_sharing_mode(desc.sharing_mode)
            .pre_transform(desc.pre_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(desc.present_mode)
            .clipped(true)
            .old_swapchain(vk::SwapchainKHR::null());
        if !desc.queue_family_indices.is_empty() {
            create_info = create_info.queue_family_indices(&desc.queue_family_indices);
        }

        unsafe { self.swapchain_loader()?.create_swapchain(&create_info, None) }
    }

    fn destroy_swapchain(&mut self, swapchain: vk::SwapchainKHR) {
        if let Some(loader) = &self.swapchain_loader {
            unsafe { loader.destroy_swapchain(swapchain, None) };
        }
    }

    fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>> {
        unsafe { self.swapchain_loader()?.get_swapchain_images(swapchain) }
    }

    fn acquire_next_image(
        &self,
        swapchain: vk::SwapchainKHR,
        timeout_ns: u64,
        image_available: vk::Semaphore,
        fence: vk::Fence,
    ) -> VkResult<(u32, bool)> {
        unsafe {
            self.swapchain_loader()?
                .acquire_next_image(swapchain, timeout_ns, image_available, fence)
        }
    }

    fn queue_present(
        &self,
        queue: vk::Queue,
        swapchain: vk::SwapchainKHR,
        image_index: u32,
        render_complete: vk::Semaphore,
    ) -> VkResult<bool> {
        let swapchains = [swapchain];
        let image_indices = [image_index];
        let wait_semaphores = [render_complete];

        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        unsafe { self.swapchain_loader()?.queue_present(queue, &present_info) }
    }

    fn create_image(&mut self, desc: &ImageDesc) -> VkResult<vk::Image> {
        let create_info = vk::ImageCreateInfo::default()
            .image_type(desc.image_type)
            .extent(vk::Extent3D {
                width: desc.width,
                height: desc.height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(1)
            .format(desc.format)
            .tiling(desc.tiling)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .usage(desc.usage)
            .samples(vk::SampleCountFlags::TYPE_1)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        unsafe { self.device()?.create_image(&create_info, None) }
    }

    fn destroy_image(&mut self, image: vk::Image) {
        if let Some(device) = &self.device {
            unsafe { device.destroy_image(image, None) };
        }
    }

    fn image_memory_requirements(&self, image: vk::Image) -> vk::MemoryRequirements {
        match self.device() {
            Ok(device) => unsafe { device.get_image_memory_requirements(image) },
            Err(_) => vk::MemoryRequirements::default(),
        }
    }

    fn allocate_memory(&mut self, size: vk::DeviceSize, memory_type_index: u32) -> VkResult<vk::DeviceMemory> {
        let allocate_info = vk::MemoryAllocateInfo::default()
            .allocation_size(size)
            .memory_type_index(memory_type_index);

        unsafe { self.device()?.allocate_memory(&allocate_info, None) }
    }

    fn free_memory(&mut self, memory: vk::DeviceMemory) {
        if let Some(device) = &self.device {
            unsafe { device.free_memory(memory, None) };
        }
    }

    fn bind_image_memory(&self, image: vk::Image, memory: vk::DeviceMemory, offset: vk::DeviceSize) -> VkResult<()> {
        unsafe { self.device()?.bind_image_memory(image, memory, offset) }
    }

    fn create_image_view(&mut self, desc: &ImageViewDesc) -> VkResult<vk::ImageView> {
        let create_info = vk::ImageViewCreateInfo::default()
            .image(desc.image)
            .view_type(desc.view_type)
            .format(desc.format)
            .components(vk::ComponentMapping {
                r: vk::ComponentSwizzle::IDENTITY,
                g: vk::ComponentSwizzle::IDENTITY,
                b: vk::ComponentSwizzle::IDENTITY,
                a: vk::ComponentSwizzle::IDENTITY,
            })
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: desc.aspect,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });

        unsafe { self.device()?.create_image_view(&create_info, None) }
    }

    fn destroy_image_view(&mut self, view: vk::ImageView) {
        if let Some(device) = &self.device {
            unsafe { device.destroy_image_view(view, None) };
        }
    }

    fn create_semaphore(&mut self) -> VkResult<vk::Semaphore> {
        let create_info = vk::SemaphoreCreateInfo::default();
        unsafe { self.device()?.create_semaphore(&create_info, None) }
    }

    fn destroy_semaphore(&mut self, semaphore: vk::Semaphore) {
        if let Some(device) = &self.device {
            unsafe { device.destroy_semaphore(semaphore, None) };
        }
    }

    fn create_fence(&mut self, signaled: bool) -> VkResult<vk::Fence> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };
        let create_info = vk::FenceCreateInfo::default().flags(flags);
        unsafe { self.device()?.create_fence(&create_info, None) }
    }

    fn destroy_fence(&mut self, fence: vk::Fence) {
        if let Some(device) = &self.device {
            unsafe { device.destroy_fence(fence, None) };
        }
    }

    fn wait_for_fence(&self, fence: vk::Fence, timeout_ns: u64) -> VkResult<()> {
        unsafe { self.device()?.wait_for_fences(&[fence], true, timeout_ns) }
    }

    fn reset_fence(&self, fence: vk::Fence) -> VkResult<()> {
        unsafe { self.device()?.reset_fences(&[fence]) }
    }

    fn submit_frame(
        &self,
        queue: vk::Queue,
        wait: vk::Semaphore,
        signal: vk::Semaphore,
        fence: vk::Fence,
    ) -> VkResult<()> {
        let wait_semaphores = [wait];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let signal_semaphores = [signal];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .signal_semaphores(&signal_semaphores);

        unsafe { self.device()?.queue_submit(queue, &[submit_info], fence) }
    }
}
