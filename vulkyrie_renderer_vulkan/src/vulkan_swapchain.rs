/// Swapchain - presentable images, their views and the depth attachment
///
/// Recreation is a full destroy followed by a fresh create at the given
/// framebuffer size. Image, view and depth handles taken before a
/// recreation are invalid afterwards.

use ash::prelude::VkResult;
use ash::vk;
use vulkyrie_engine::vulkyrie::{Result, StatusCode};
use vulkyrie_engine::{engine_debug, engine_err, engine_fatal, engine_info, engine_status};

use crate::vulkan_device::{detect_depth_format, LogicalDeviceState};
use crate::vulkan_driver::{SwapchainDesc, VulkanDriver};
use crate::vulkan_image::{create_image, create_image_view, destroy_image, GpuImage, ImageSpec};

const SOURCE: &str = "vulkyrie::vulkan::swapchain";

/// Number of frames the CPU may record ahead of the GPU
pub const MAX_FRAMES_IN_FLIGHT: usize = 2;

/// What a surface supports on a given physical device
#[derive(Debug, Clone, Default)]
pub struct SwapchainSupportInfo {
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

pub fn query_swapchain_support(
    driver: &dyn VulkanDriver,
    physical_device: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
) -> VkResult<SwapchainSupportInfo> {
    Ok(SwapchainSupportInfo {
        capabilities: driver.surface_capabilities(physical_device, surface)?,
        formats: driver.surface_formats(physical_device, surface)?,
        present_modes: driver.surface_present_modes(physical_device, surface)?,
    })
}

/// BGRA8 UNORM with sRGB non-linear color space, else the first reported format
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Option<vk::SurfaceFormatKHR> {
    formats
        .iter()
        .find(|f| f.format == vk::Format::B8G8R8A8_UNORM && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR)
        .or_else(|| formats.first())
        .copied()
}

/// Mailbox when available, FIFO otherwise (always supported)
pub fn choose_present_mode(present_modes: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
    if present_modes.contains(&vk::PresentModeKHR::MAILBOX) {
        vk::PresentModeKHR::MAILBOX
    } else {
        vk::PresentModeKHR::FIFO
    }
}

/// Surface extent, or the framebuffer size when the surface leaves it to
/// us, clamped into the supported range
pub fn resolve_extent(capabilities: &vk::SurfaceCapabilitiesKHR, width: u32, height: u32) -> vk::Extent2D {
    let extent = if capabilities.current_extent.width != u32::MAX {
        capabilities.current_extent
    } else {
        vk::Extent2D { width, height }
    };

    let min = capabilities.min_image_extent;
    let max = capabilities.max_image_extent;
    vk::Extent2D {
        width: extent.width.clamp(min.width, max.width.max(min.width)),
        height: extent.height.clamp(min.height, max.height.max(min.height)),
    }
}

/// One more than the minimum, capped by the maximum when there is one
pub fn resolve_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let count = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 && count > capabilities.max_image_count {
        capabilities.max_image_count
    } else {
        count
    }
}

/// Images owned by the presentation engine
///
/// Never destroyed here; they go away with the swapchain handle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresentableImages(Vec<vk::Image>);

impl PresentableImages {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<vk::Image> {
        self.0.get(index).copied()
    }

    pub fn as_slice(&self) -> &[vk::Image] {
        &self.0
    }
}

#[derive(Debug)]
pub struct Swapchain {
    handle: vk::SwapchainKHR,
    surface_format: vk::SurfaceFormatKHR,
    present_mode: vk::PresentModeKHR,
    extent: vk::Extent2D,
    images: PresentableImages,
    views: Vec<vk::ImageView>,
    depth_attachment: GpuImage,
    max_frames_in_flight: usize,
}

impl Swapchain {
    /// Create a swapchain for `surface` sized for a `width` x `height` framebuffer
    ///
    /// Support is re-queried first. On failure everything created so far is
    /// destroyed.
    pub fn create(
        driver: &mut dyn VulkanDriver,
        device: &mut LogicalDeviceState,
        surface: vk::SurfaceKHR,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let support = query_swapchain_support(driver, device.physical_device, surface)
            .map_err(|e| engine_err!(SOURCE, "Failed to query swapchain support: {:?}", e))?;

        let Some(surface_format) = choose_surface_format(&support.formats) else {
            return Err(engine_status!(
                SOURCE,
                StatusCode::VulkanRequiredSwapchainNotSupported,
                "Surface reports no formats"
            ));
        };
        let present_mode = choose_present_mode(&support.present_modes);
        let extent = resolve_extent(&support.capabilities, width, height);
        let image_count = resolve_image_count(&support.capabilities);

        let (sharing_mode, queue_family_indices) = match (device.graphics_family(), device.present_family()) {
            (Some(graphics), Some(present)) if graphics != present => {
                (vk::SharingMode::CONCURRENT, vec![graphics, present])
            }
            _ => (vk::SharingMode::EXCLUSIVE, Vec::new()),
        };

        let desc = SwapchainDesc {
            surface,
            min_image_count: image_count,
            format: surface_format,
            extent,
            sharing_mode,
            queue_family_indices,
            pre_transform: support.capabilities.current_transform,
            present_mode,
            usage: vk::ImageUsageFlags::COLOR_ATTACHMENT,
        };
        device.swapchain_support = support;

        let handle = driver
            .create_swapchain(&desc)
            .map_err(|e| engine_err!(SOURCE, "Failed to create swapchain: {:?}", e))?;

        let mut swapchain = Swapchain {
            handle,
            surface_format,
            present_mode,
            extent,
            images: PresentableImages::default(),
            views: Vec::new(),
            depth_attachment: GpuImage::default(),
            max_frames_in_flight: MAX_FRAMES_IN_FLIGHT,
        };

        if let Err(e) = swapchain.create_attachments(driver, device) {
            swapchain.destroy(driver);
            return Err(e);
        }

        engine_info!(
            SOURCE,
            "Swapchain created: {}x{}, {} image(s), {:?}, {:?}",
            extent.width,
            extent.height,
            swapchain.images.len(),
            surface_format.format,
            present_mode
        );
        Ok(swapchain)
    }

    fn create_attachments(&mut self, driver: &mut dyn VulkanDriver, device: &mut LogicalDeviceState) -> Result<()> {
        let images = driver
            .swapchain_images(self.handle)
            .map_err(|e| engine_err!(SOURCE, "Failed to get swapchain images: {:?}", e))?;
        self.images = PresentableImages(images);

        for &image in self.images.as_slice() {
            let view = create_image_view(driver, image, self.surface_format.format, vk::ImageAspectFlags::COLOR)?;
            self.views.push(view);
        }

        let Some(depth_format) = detect_depth_format(driver, device.physical_device) else {
            device.depth_format = vk::Format::UNDEFINED;
            engine_fatal!(SOURCE, "Failed to find a supported depth format");
            return Err(engine_status!(
                SOURCE,
                StatusCode::VulkanDepthFormatNotSupported,
                "No depth-stencil attachment format is supported"
            ));
        };
        device.depth_format = depth_format;

        self.depth_attachment = create_image(
            driver,
            &device.memory,
            &ImageSpec::depth_attachment(self.extent.width, self.extent.height, depth_format),
        )?;
        Ok(())
    }

    /// Destroy the depth attachment, every view, then the swapchain
    ///
    /// Safe to call more than once.
    pub fn destroy(&mut self, driver: &mut dyn VulkanDriver) {
        destroy_image(driver, &mut self.depth_attachment);

        for view in self.views.drain(..) {
            driver.destroy_image_view(view);
        }
        self.images = PresentableImages::default();

        if self.handle != vk::SwapchainKHR::null() {
            driver.destroy_swapchain(self.handle);
            self.handle = vk::SwapchainKHR::null();
        }
    }

    /// Destroy then create again at `width` x `height`
    pub fn recreate(
        &mut self,
        driver: &mut dyn VulkanDriver,
        device: &mut LogicalDeviceState,
        surface: vk::SurfaceKHR,
        width: u32,
        height: u32,
    ) -> Result<()> {
        engine_debug!(SOURCE, "Recreating swapchain at {}x{}", width, height);
        self.destroy(driver);
        *self = Swapchain::create(driver, device, surface, width, height)?;
        Ok(())
    }

    pub fn handle(&self) -> vk::SwapchainKHR {
        self.handle
    }

    pub fn surface_format(&self) -> vk::SurfaceFormatKHR {
        self.surface_format
    }

    pub fn present_mode(&self) -> vk::PresentModeKHR {
        self.present_mode
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn images(&self) -> &PresentableImages {
        &self.images
    }

    pub fn views(&self) -> &[vk::ImageView] {
        &self.views
    }

    pub fn depth_attachment(&self) -> &GpuImage {
        &self.depth_attachment
    }

    pub fn max_frames_in_flight(&self) -> usize {
        self.max_frames_in_flight
    }
}

#[cfg(test)]
#[path = "vulkan_swapchain_tests.rs"]
mod tests;
