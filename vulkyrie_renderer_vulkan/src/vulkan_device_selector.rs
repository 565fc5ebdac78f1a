/// Physical device selection
///
/// Walks every physical device in enumeration order and keeps the first one
/// that satisfies the requirements. Queue families are matched per device:
/// graphics and present prefer to share a family, transfer prefers the
/// family with the fewest graphics/compute capabilities.

use ash::prelude::VkResult;
use ash::vk;
use rustc_hash::FxHashSet;
use vulkyrie_engine::vulkyrie::{Error, Result, StatusCode};
use vulkyrie_engine::{engine_err, engine_info, engine_status, engine_trace, engine_warn};

use crate::vulkan_driver::{MemoryProperties, PhysicalDeviceInfo, VulkanDriver};
use crate::vulkan_swapchain::{query_swapchain_support, SwapchainSupportInfo};

const SOURCE: &str = "vulkyrie::vulkan::device";

/// What a physical device must provide to be selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRequirements {
    pub graphics: bool,
    pub present: bool,
    pub compute: bool,
    pub transfer: bool,
    pub sampler_anisotropy: bool,
    pub discrete_gpu: bool,
    pub device_extensions: Vec<String>,
}

impl Default for DeviceRequirements {
    fn default() -> Self {
        Self {
            graphics: true,
            present: true,
            compute: false,
            transfer: true,
            sampler_anisotropy: true,
            discrete_gpu: true,
            device_extensions: vec![ash::khr::swapchain::NAME.to_string_lossy().into_owned()],
        }
    }
}

/// Queue family chosen for each kind of work
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueFamilyAssignment {
    pub graphics: Option<u32>,
    pub present: Option<u32>,
    pub compute: Option<u32>,
    pub transfer: Option<u32>,
}

impl QueueFamilyAssignment {
    /// Families the logical device needs queues from, each once, ascending
    ///
    /// The compute family only counts when `requirements` asks for compute.
    pub fn unique_families(&self, requirements: &DeviceRequirements) -> Vec<u32> {
        let compute = self.compute.filter(|_| requirements.compute);
        let set: FxHashSet<u32> = [self.graphics, self.present, compute, self.transfer]
            .into_iter()
            .flatten()
            .collect();
        let mut families: Vec<u32> = set.into_iter().collect();
        families.sort_unstable();
        families
    }

    /// Whether every requested capability resolved to a family
    pub fn satisfies(&self, requirements: &DeviceRequirements) -> bool {
        (!requirements.graphics || self.graphics.is_some())
            && (!requirements.present || self.present.is_some())
            && (!requirements.compute || self.compute.is_some())
            && (!requirements.transfer || self.transfer.is_some())
    }
}

/// A physical device that passed selection
#[derive(Debug, Clone)]
pub struct PhysicalDeviceRecord {
    pub handle: vk::PhysicalDevice,
    pub info: PhysicalDeviceInfo,
    pub features: vk::PhysicalDeviceFeatures,
    pub memory: MemoryProperties,
    pub queue_families: QueueFamilyAssignment,
    pub swapchain_support: SwapchainSupportInfo,
}

fn transfer_score(flags: vk::QueueFlags) -> u8 {
    u8::from(flags.contains(vk::QueueFlags::GRAPHICS)) + u8::from(flags.contains(vk::QueueFlags::COMPUTE))
}

/// Match queue families to graphics/present/compute/transfer work
///
/// `supports_present` answers whether a family can present to the surface.
/// It is only consulted for the first graphics family, then for every family
/// in order when that one cannot present.
pub fn assign_queue_families<F>(
    families: &[vk::QueueFamilyProperties],
    mut supports_present: F,
) -> VkResult<QueueFamilyAssignment>
where
    F: FnMut(u32) -> VkResult<bool>,
{
    let mut assignment = QueueFamilyAssignment::default();
    let mut min_transfer_score = u8::MAX;

    for (index, family) in families.iter().enumerate() {
        let index = index as u32;
        let flags = family.queue_flags;

        if assignment.graphics.is_none() && flags.contains(vk::QueueFlags::GRAPHICS) {
            assignment.graphics = Some(index);
            if supports_present(index)? {
                assignment.present = Some(index);
            }
        }

        if assignment.compute.is_none() && flags.contains(vk::QueueFlags::COMPUTE) {
            assignment.compute = Some(index);
        }

        if flags.contains(vk::QueueFlags::TRANSFER) {
            let score = transfer_score(flags);
            // `<=` hands ties to the later family
            if score <= min_transfer_score {
                min_transfer_score = score;
                assignment.transfer = Some(index);
            }
        }
    }

    if assignment.present.is_none() {
        for index in 0..families.len() as u32 {
            if supports_present(index)? {
                assignment.present = Some(index);
                if assignment.graphics != Some(index) {
                    engine_warn!(
                        SOURCE,
                        "Different queue index used for present vs graphics: {}",
                        index
                    );
                }
                break;
            }
        }
    }

    Ok(assignment)
}

/// Check one candidate; on success returns its queue families and swapchain support
fn evaluate_physical_device(
    driver: &dyn VulkanDriver,
    device: vk::PhysicalDevice,
    info: &PhysicalDeviceInfo,
    features: &vk::PhysicalDeviceFeatures,
    surface: vk::SurfaceKHR,
    requirements: &DeviceRequirements,
) -> Result<(QueueFamilyAssignment, SwapchainSupportInfo)> {
    if requirements.discrete_gpu && info.device_type != vk::PhysicalDeviceType::DISCRETE_GPU {
        engine_info!(SOURCE, "Device '{}' is not a discrete GPU, and one is required. Skipping", info.name);
        return Err(Error::status(
            StatusCode::VulkanDiscreteGpuRequired,
            format!("'{}' is not a discrete GPU", info.name),
        ));
    }

    let families = driver.queue_family_properties(device);
    let queues = assign_queue_families(&families, |index| driver.surface_support(device, index, surface))
        .map_err(|e| engine_err!(SOURCE, "Failed to query surface support: {:?}", e))?;

    engine_info!(SOURCE, "Graphics | Present | Compute | Transfer | Name");
    engine_info!(
        SOURCE,
        "       {} |       {} |       {} |        {} | {}",
        u8::from(queues.graphics.is_some()),
        u8::from(queues.present.is_some()),
        u8::from(queues.compute.is_some()),
        u8::from(queues.transfer.is_some()),
        info.name
    );

    if !queues.satisfies(requirements) {
        return Err(Error::status(
            StatusCode::VulkanPhysicalDeviceDoesNotMeetRequirements,
            format!("'{}' lacks a required queue family", info.name),
        ));
    }
    engine_trace!(SOURCE, "Graphics family: {:?}", queues.graphics);
    engine_trace!(SOURCE, "Present family:  {:?}", queues.present);
    engine_trace!(SOURCE, "Transfer family: {:?}", queues.transfer);
    engine_trace!(SOURCE, "Compute family:  {:?}", queues.compute);

    let support = query_swapchain_support(driver, device, surface)
        .map_err(|e| engine_err!(SOURCE, "Failed to query swapchain support: {:?}", e))?;
    if support.formats.is_empty() || support.present_modes.is_empty() {
        engine_info!(SOURCE, "Required swapchain support not present, skipping device");
        return Err(Error::status(
            StatusCode::VulkanRequiredSwapchainNotSupported,
            format!("'{}' has no surface formats or present modes", info.name),
        ));
    }

    if !requirements.device_extensions.is_empty() {
        let available = driver
            .device_extensions(device)
            .map_err(|e| engine_err!(SOURCE, "Failed to enumerate device extensions: {:?}", e))?;
        if let Some(missing) = requirements
            .device_extensions
            .iter()
            .find(|required| !available.contains(required))
        {
            engine_info!(SOURCE, "Required extension not found: '{}', skipping device", missing);
            return Err(Error::status(
                StatusCode::VulkanRequiredExtensionNotFound,
                format!("'{}' lacks extension {}", info.name, missing),
            ));
        }
    }

    if requirements.sampler_anisotropy && features.sampler_anisotropy == vk::FALSE {
        engine_info!(SOURCE, "Device does not support samplerAnisotropy, skipping");
        return Err(Error::status(
            StatusCode::VulkanSamplerAnisotropyNotSupported,
            format!("'{}' lacks sampler anisotropy", info.name),
        ));
    }

    Ok((queues, support))
}

fn device_type_name(device_type: vk::PhysicalDeviceType) -> &'static str {
    match device_type {
        vk::PhysicalDeviceType::INTEGRATED_GPU => "Integrated",
        vk::PhysicalDeviceType::DISCRETE_GPU => "Discrete",
        vk::PhysicalDeviceType::VIRTUAL_GPU => "Virtual",
        vk::PhysicalDeviceType::CPU => "CPU",
        _ => "Unknown",
    }
}

fn log_selected_device(info: &PhysicalDeviceInfo, memory: &MemoryProperties) {
    engine_info!(SOURCE, "Selected device:    {}", info.name);
    engine_info!(SOURCE, "GPU type:           {}", device_type_name(info.device_type));
    engine_info!(
        SOURCE,
        "GPU driver version: {}.{}.{}",
        vk::api_version_major(info.driver_version),
        vk::api_version_minor(info.driver_version),
        vk::api_version_patch(info.driver_version)
    );
    engine_info!(
        SOURCE,
        "Vulkan API version: {}.{}.{}",
        vk::api_version_major(info.api_version),
        vk::api_version_minor(info.api_version),
        vk::api_version_patch(info.api_version)
    );
    for heap in &memory.heaps {
        let gib = heap.size as f64 / 1024.0 / 1024.0 / 1024.0;
        if heap.flags.contains(vk::MemoryHeapFlags::DEVICE_LOCAL) {
            engine_info!(SOURCE, "Local GPU memory:   {:.2} GiB", gib);
        } else {
            engine_info!(SOURCE, "Shared memory:      {:.2} GiB", gib);
        }
    }
}

/// Pick the first physical device meeting `requirements`
pub fn select_physical_device(
    driver: &dyn VulkanDriver,
    surface: vk::SurfaceKHR,
    requirements: &DeviceRequirements,
) -> Result<PhysicalDeviceRecord> {
    let devices = driver
        .physical_devices()
        .map_err(|e| engine_err!(SOURCE, "Failed to enumerate physical devices: {:?}", e))?;

    if devices.is_empty() {
        return Err(engine_status!(
            SOURCE,
            StatusCode::VulkanNoDevicesWithVulkanSupport,
            "No devices which support Vulkan were found"
        ));
    }

    for device in devices {
        let info = driver.physical_device_info(device);
        let features = driver.physical_device_features(device);

        match evaluate_physical_device(driver, device, &info, &features, surface, requirements) {
            Ok((queue_families, swapchain_support)) => {
                let memory = driver.memory_properties(device);
                log_selected_device(&info, &memory);
                return Ok(PhysicalDeviceRecord {
                    handle: device,
                    info,
                    features,
                    memory,
                    queue_families,
                    swapchain_support,
                });
            }
            Err(Error::Status(code, reason)) => {
                engine_trace!(SOURCE, "Rejected device ({}): {}", code, reason);
            }
            Err(other) => return Err(other),
        }
    }

    Err(engine_status!(
        SOURCE,
        StatusCode::VulkanNoPhysicalDeviceMeetsRequirements,
        "No physical devices were found which meet the requirements"
    ))
}

#[cfg(test)]
#[path = "vulkan_device_selector_tests.rs"]
mod tests;
