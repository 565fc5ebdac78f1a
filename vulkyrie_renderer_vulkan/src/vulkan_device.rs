/// Logical device - device handle, queues and cached physical device data

use ash::vk;
use vulkyrie_engine::vulkyrie::Result;
use vulkyrie_engine::{engine_debug, engine_err, engine_info, engine_warn};

use crate::vulkan_device_selector::{DeviceRequirements, PhysicalDeviceRecord, QueueFamilyAssignment};
use crate::vulkan_driver::{DeviceDesc, MemoryProperties, PhysicalDeviceInfo, VulkanDriver};
use crate::vulkan_swapchain::SwapchainSupportInfo;

const SOURCE: &str = "vulkyrie::vulkan::device";

/// Depth formats tried in order of preference
pub const DEPTH_FORMAT_CANDIDATES: [vk::Format; 3] = [
    vk::Format::D32_SFLOAT,
    vk::Format::D32_SFLOAT_S8_UINT,
    vk::Format::D24_UNORM_S8_UINT,
];

/// The selected GPU and the logical device created on it
#[derive(Debug, Clone)]
pub struct LogicalDeviceState {
    pub physical_device: vk::PhysicalDevice,
    pub handle: vk::Device,
    pub graphics_queue: vk::Queue,
    pub present_queue: vk::Queue,
    pub transfer_queue: vk::Queue,
    pub queue_families: QueueFamilyAssignment,
    pub info: PhysicalDeviceInfo,
    pub features: vk::PhysicalDeviceFeatures,
    pub memory: MemoryProperties,
    /// Support captured at selection time; refreshed before every swapchain creation
    pub swapchain_support: SwapchainSupportInfo,
    /// `UNDEFINED` until the first swapchain detects it
    pub depth_format: vk::Format,
}

impl LogicalDeviceState {
    pub fn graphics_family(&self) -> Option<u32> {
        self.queue_families.graphics
    }

    pub fn present_family(&self) -> Option<u32> {
        self.queue_families.present
    }

    pub fn transfer_family(&self) -> Option<u32> {
        self.queue_families.transfer
    }
}

fn queue_or_null(driver: &dyn VulkanDriver, family: Option<u32>) -> vk::Queue {
    match family {
        Some(family) => driver.device_queue(family, 0),
        None => vk::Queue::null(),
    }
}

/// Create the logical device with one queue per distinct family
pub fn create_logical_device(
    driver: &mut dyn VulkanDriver,
    record: PhysicalDeviceRecord,
    requirements: &DeviceRequirements,
) -> Result<LogicalDeviceState> {
    engine_info!(SOURCE, "Creating logical device...");

    let desc = DeviceDesc {
        queue_families: record.queue_families.unique_families(requirements),
        extensions: requirements.device_extensions.clone(),
        sampler_anisotropy: requirements.sampler_anisotropy,
    };
    let handle = driver
        .create_device(record.handle, &desc)
        .map_err(|e| engine_err!(SOURCE, "Failed to create logical device: {:?}", e))?;
    engine_debug!(SOURCE, "Logical device created");

    let graphics_queue = queue_or_null(driver, record.queue_families.graphics);
    let present_queue = queue_or_null(driver, record.queue_families.present);
    let transfer_queue = queue_or_null(driver, record.queue_families.transfer);
    engine_debug!(SOURCE, "Queues obtained");

    Ok(LogicalDeviceState {
        physical_device: record.handle,
        handle,
        graphics_queue,
        present_queue,
        transfer_queue,
        queue_families: record.queue_families,
        info: record.info,
        features: record.features,
        memory: record.memory,
        swapchain_support: record.swapchain_support,
        depth_format: vk::Format::UNDEFINED,
    })
}

/// Destroy the logical device and forget the physical device
pub fn destroy_logical_device(driver: &mut dyn VulkanDriver, state: &mut LogicalDeviceState) {
    state.graphics_queue = vk::Queue::null();
    state.present_queue = vk::Queue::null();
    state.transfer_queue = vk::Queue::null();

    if state.handle != vk::Device::null() {
        engine_info!(SOURCE, "Destroying logical device...");
        driver.destroy_device();
        state.handle = vk::Device::null();
    }

    state.physical_device = vk::PhysicalDevice::null();
    state.queue_families = QueueFamilyAssignment::default();
    state.swapchain_support = SwapchainSupportInfo::default();
    state.depth_format = vk::Format::UNDEFINED;
}

/// First candidate usable as a depth-stencil attachment in linear or optimal tiling
pub fn detect_depth_format(driver: &dyn VulkanDriver, physical_device: vk::PhysicalDevice) -> Option<vk::Format> {
    let required = vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT;
    DEPTH_FORMAT_CANDIDATES.into_iter().find(|&format| {
        let properties = driver.format_properties(physical_device, format);
        properties.linear_tiling_features.contains(required)
            || properties.optimal_tiling_features.contains(required)
    })
}

/// Index of the first memory type allowed by `type_filter` that has every `flags` bit
pub fn find_memory_index(memory: &MemoryProperties, type_filter: u32, flags: vk::MemoryPropertyFlags) -> Option<u32> {
    let found = memory
        .types
        .iter()
        .enumerate()
        .take(32)
        .find(|(index, memory_type)| {
            type_filter & (1 << index) != 0 && memory_type.property_flags.contains(flags)
        })
        .map(|(index, _)| index as u32);

    if found.is_none() {
        engine_warn!(SOURCE, "Unable to find suitable memory type for {:?}", flags);
    }
    found
}

#[cfg(test)]
#[path = "vulkan_device_tests.rs"]
mod tests;
