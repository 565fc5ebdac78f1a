/// GPU image helper - image, bound memory and optional view
///
/// `destroy_image` releases view, memory, then the image, skipping anything
/// already released, so it is safe on partially created images and safe to
/// call twice.

use ash::vk;
use vulkyrie_engine::vulkyrie::{Result, StatusCode};
use vulkyrie_engine::{engine_err, engine_status};

use crate::vulkan_device::find_memory_index;
use crate::vulkan_driver::{ImageDesc, ImageViewDesc, MemoryProperties, VulkanDriver};

const SOURCE: &str = "vulkyrie::vulkan::image";

/// Everything needed to create a [`GpuImage`]
#[derive(Debug, Clone, Copy)]
pub struct ImageSpec {
    pub image_type: vk::ImageType,
    pub width: u32,
    pub height: u32,
    pub format: vk::Format,
    pub tiling: vk::ImageTiling,
    pub usage: vk::ImageUsageFlags,
    pub memory_flags: vk::MemoryPropertyFlags,
    pub create_view: bool,
    pub view_aspect: vk::ImageAspectFlags,
}

impl ImageSpec {
    /// Device-local depth attachment with a depth view
    pub fn depth_attachment(width: u32, height: u32, format: vk::Format) -> Self {
        Self {
            image_type: vk::ImageType::TYPE_2D,
            width,
            height,
            format,
            tiling: vk::ImageTiling::OPTIMAL,
            usage: vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT,
            memory_flags: vk::MemoryPropertyFlags::DEVICE_LOCAL,
            create_view: true,
            view_aspect: vk::ImageAspectFlags::DEPTH,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GpuImage {
    pub handle: Option<vk::Image>,
    pub memory: Option<vk::DeviceMemory>,
    pub view: Option<vk::ImageView>,
    pub width: u32,
    pub height: u32,
}

impl GpuImage {
    /// True once every part has been released
    pub fn is_released(&self) -> bool {
        self.handle.is_none() && self.memory.is_none() && self.view.is_none()
    }
}

/// Create an image, back it with memory and optionally give it a view
///
/// On any failure whatever was already created is released before the error
/// is returned.
pub fn create_image(driver: &mut dyn VulkanDriver, memory: &MemoryProperties, spec: &ImageSpec) -> Result<GpuImage> {
    let mut image = GpuImage {
        width: spec.width,
        height: spec.height,
        ..GpuImage::default()
    };

    if let Err(e) = populate_image(driver, memory, spec, &mut image) {
        destroy_image(driver, &mut image);
        return Err(e);
    }
    Ok(image)
}

fn populate_image(
    driver: &mut dyn VulkanDriver,
    memory: &MemoryProperties,
    spec: &ImageSpec,
    image: &mut GpuImage,
) -> Result<()> {
    let desc = ImageDesc {
        image_type: spec.image_type,
        width: spec.width,
        height: spec.height,
        format: spec.format,
        tiling: spec.tiling,
        usage: spec.usage,
    };
    let handle = driver
        .create_image(&desc)
        .map_err(|e| engine_err!(SOURCE, "Failed to create image: {:?}", e))?;
    image.handle = Some(handle);

    let requirements = driver.image_memory_requirements(handle);
    let Some(memory_type) = find_memory_index(memory, requirements.memory_type_bits, spec.memory_flags) else {
        return Err(engine_status!(
            SOURCE,
            StatusCode::VulkanMemoryTypeNotFound,
            "Required memory type not found, image not valid"
        ));
    };

    let allocation = driver
        .allocate_memory(requirements.size, memory_type)
        .map_err(|e| engine_err!(SOURCE, "Failed to allocate image memory: {:?}", e))?;
    image.memory = Some(allocation);

    driver
        .bind_image_memory(handle, allocation, 0)
        .map_err(|e| engine_err!(SOURCE, "Failed to bind image memory: {:?}", e))?;

    if spec.create_view {
        image.view = Some(create_image_view(driver, handle, spec.format, spec.view_aspect)?);
    }
    Ok(())
}

/// 2D view over the first mip level and array layer
pub fn create_image_view(
    driver: &mut dyn VulkanDriver,
    image: vk::Image,
    format: vk::Format,
    aspect: vk::ImageAspectFlags,
) -> Result<vk::ImageView> {
    let desc = ImageViewDesc {
        image,
        view_type: vk::ImageViewType::TYPE_2D,
        format,
        aspect,
    };
    driver
        .create_image_view(&desc)
        .map_err(|e| engine_err!(SOURCE, "Failed to create image view: {:?}", e))
}

pub fn destroy_image(driver: &mut dyn VulkanDriver, image: &mut GpuImage) {
    if let Some(view) = image.view.take() {
        driver.destroy_image_view(view);
    }
    if let Some(memory) = image.memory.take() {
        driver.free_memory(memory);
    }
    if let Some(handle) = image.handle.take() {
        driver.destroy_image(handle);
    }
}

#[cfg(test)]
#[path = "vulkan_image_tests.rs"]
mod tests;
