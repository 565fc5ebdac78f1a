/// Frame presentation - per-frame sync objects and the acquire/submit/present cycle

use ash::vk;
use vulkyrie_engine::vulkyrie::render::FrameStatus;
use vulkyrie_engine::vulkyrie::{Error, Result, StatusCode};
use vulkyrie_engine::{engine_debug, engine_err, engine_fatal, engine_trace};

use crate::vulkan_driver::VulkanDriver;
use crate::vulkan_renderer::VulkanRenderer;
use crate::vulkan_swapchain::MAX_FRAMES_IN_FLIGHT;

const SOURCE: &str = "vulkyrie::vulkan::frame";

/// Semaphores and fences for every frame in flight
#[derive(Debug, Default)]
pub struct FrameSync {
    image_available: Vec<vk::Semaphore>,
    render_complete: Vec<vk::Semaphore>,
    in_flight: Vec<vk::Fence>,
}

impl FrameSync {
    /// Fences start signalled so the first wait on each frame returns at once
    pub fn create(driver: &mut dyn VulkanDriver, frames: usize) -> Result<Self> {
        let mut sync = FrameSync::default();
        if let Err(e) = sync.populate(driver, frames) {
            sync.destroy(driver);
            return Err(e);
        }
        engine_debug!(SOURCE, "Created sync objects for {} frame(s) in flight", frames);
        Ok(sync)
    }

    fn populate(&mut self, driver: &mut dyn VulkanDriver, frames: usize) -> Result<()> {
        for _ in 0..frames {
            self.image_available.push(
                driver
                    .create_semaphore()
                    .map_err(|e| engine_err!(SOURCE, "Failed to create semaphore: {:?}", e))?,
            );
            self.render_complete.push(
                driver
                    .create_semaphore()
                    .map_err(|e| engine_err!(SOURCE, "Failed to create semaphore: {:?}", e))?,
            );
            self.in_flight.push(
                driver
                    .create_fence(true)
                    .map_err(|e| engine_err!(SOURCE, "Failed to create fence: {:?}", e))?,
            );
        }
        Ok(())
    }

    pub fn destroy(&mut self, driver: &mut dyn VulkanDriver) {
        for semaphore in self.image_available.drain(..).chain(self.render_complete.drain(..)) {
            driver.destroy_semaphore(semaphore);
        }
        for fence in self.in_flight.drain(..) {
            driver.destroy_fence(fence);
        }
    }

    pub fn frame_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn image_available(&self, frame: usize) -> vk::Semaphore {
        self.image_available.get(frame).copied().unwrap_or_default()
    }

    pub fn render_complete(&self, frame: usize) -> vk::Semaphore {
        self.render_complete.get(frame).copied().unwrap_or_default()
    }

    pub fn in_flight(&self, frame: usize) -> vk::Fence {
        self.in_flight.get(frame).copied().unwrap_or_default()
    }
}

fn not_initialized() -> Error {
    Error::status(StatusCode::RendererNotInitialized, "renderer is not initialized")
}

impl VulkanRenderer {
    /// Acquire the next swapchain image into `image_index`
    ///
    /// Returns `false` when the frame must be skipped because the swapchain
    /// was out of date and has been recreated.
    pub(crate) fn acquire_next_image_index(&mut self, timeout_ns: u64) -> Result<bool> {
        let (Some(swapchain), Some(sync)) = (self.swapchain.as_ref(), self.sync.as_ref()) else {
            return Err(not_initialized());
        };

        let result = self.driver.acquire_next_image(
            swapchain.handle(),
            timeout_ns,
            sync.image_available(self.current_frame),
            vk::Fence::null(),
        );

        match result {
            Ok((index, suboptimal)) => {
                if suboptimal {
                    engine_trace!(SOURCE, "Acquired image {} from a suboptimal swapchain", index);
                }
                self.image_index = index;
                Ok(true)
            }
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                self.recreate_swapchain()?;
                Ok(false)
            }
            Err(e) => {
                engine_fatal!(SOURCE, "Failed to acquire swapchain image: {:?}", e);
                Err(Error::BackendError(format!("Failed to acquire swapchain image: {:?}", e)))
            }
        }
    }

    /// Present `image_index`, recreating the swapchain when it went stale
    pub(crate) fn present(&mut self) -> Result<()> {
        let (Some(device), Some(swapchain), Some(sync)) =
            (self.device.as_ref(), self.swapchain.as_ref(), self.sync.as_ref())
        else {
            return Err(not_initialized());
        };

        let result = self.driver.queue_present(
            device.present_queue,
            swapchain.handle(),
            self.image_index,
            sync.render_complete(self.current_frame),
        );

        match result {
            Ok(false) => Ok(()),
            Ok(true) | Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => self.recreate_swapchain(),
            Err(e) => {
                engine_fatal!(SOURCE, "Failed to present swapchain image: {:?}", e);
                Err(Error::BackendError(format!("Failed to present swapchain image: {:?}", e)))
            }
        }
    }

    /// Wait idle, then rebuild the swapchain at the cached framebuffer size
    pub(crate) fn recreate_swapchain(&mut self) -> Result<()> {
        let (Some(device), Some(swapchain), Some(surface)) =
            (self.device.as_mut(), self.swapchain.as_mut(), self.surface)
        else {
            return Err(not_initialized());
        };

        self.driver
            .device_wait_idle()
            .map_err(|e| engine_err!(SOURCE, "Failed to wait for device idle: {:?}", e))?;
        let result = swapchain.recreate(&mut *self.driver, device, surface, self.width, self.height);
        if result.is_err() {
            // The old swapchain is already destroyed
            self.swapchain = None;
        }
        result
    }

    pub(crate) fn begin_frame_impl(&mut self) -> Result<FrameStatus> {
        if !self.initialized || self.swapchain.is_none() {
            return Err(not_initialized());
        }
        if self.width == 0 || self.height == 0 {
            return Ok(FrameStatus::Skipped);
        }

        let fence = self.sync.as_ref().map(|s| s.in_flight(self.current_frame)).ok_or_else(not_initialized)?;
        self.driver
            .wait_for_fence(fence, u64::MAX)
            .map_err(|e| engine_err!(SOURCE, "Failed to wait for in-flight fence: {:?}", e))?;

        if !self.acquire_next_image_index(self.config.acquire_timeout_ns)? {
            return Ok(FrameStatus::Skipped);
        }

        self.driver
            .reset_fence(fence)
            .map_err(|e| engine_err!(SOURCE, "Failed to reset in-flight fence: {:?}", e))?;
        Ok(FrameStatus::Ready)
    }

    pub(crate) fn end_frame_impl(&mut self) -> Result<()> {
        if self.swapchain.is_none() {
            return Err(not_initialized());
        }
        let (Some(device), Some(sync)) = (self.device.as_ref(), self.sync.as_ref()) else {
            return Err(not_initialized());
        };

        self.driver
            .submit_frame(
                device.graphics_queue,
                sync.image_available(self.current_frame),
                sync.render_complete(self.current_frame),
                sync.in_flight(self.current_frame),
            )
            .map_err(|e| engine_err!(SOURCE, "Failed to submit frame: {:?}", e))?;

        self.present()?;

        self.current_frame = (self.current_frame + 1) % MAX_FRAMES_IN_FLIGHT;
        self.frame_number += 1;
        Ok(())
    }
}

#[cfg(test)]
#[path = "vulkan_renderer_frame_tests.rs"]
mod tests;
