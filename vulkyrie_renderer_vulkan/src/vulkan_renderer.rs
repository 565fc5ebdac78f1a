/// VulkanRenderer - Vulkan implementation of the Renderer trait
///
/// Owns the driver, the surface provider and every object created during
/// initialization: instance, surface, logical device, swapchain and frame
/// sync objects. Initialization is strictly sequential; a failure at any
/// step tears down whatever was already created.

use ash::vk;
use vulkyrie_engine::vulkyrie::render::{
    FrameStatus, RendererBackend, RendererConfig, UnimplementedRenderer,
};
use vulkyrie_engine::vulkyrie::{Error, Renderer, Result, StatusCode};
use vulkyrie_engine::{engine_debug, engine_info, engine_warn};

use crate::debug;
use crate::vulkan_ash_driver::AshDriver;
use crate::vulkan_device::{create_logical_device, destroy_logical_device, LogicalDeviceState};
use crate::vulkan_device_selector::{select_physical_device, DeviceRequirements};
use crate::vulkan_driver::VulkanDriver;
use crate::vulkan_instance::{create_instance, destroy_instance, GraphicsInstance};
use crate::vulkan_renderer_frame::FrameSync;
use crate::vulkan_surface::SurfaceProvider;
use crate::vulkan_swapchain::{Swapchain, MAX_FRAMES_IN_FLIGHT};

const SOURCE: &str = "vulkyrie::vulkan::renderer";

/// Framebuffer size used until the first `on_resize`
pub const DEFAULT_FRAMEBUFFER_SIZE: (u32, u32) = (1280, 720);

pub struct VulkanRenderer {
    pub(crate) driver: Box<dyn VulkanDriver>,
    provider: Box<dyn SurfaceProvider>,
    pub(crate) config: RendererConfig,
    requirements: DeviceRequirements,

    instance: Option<GraphicsInstance>,
    pub(crate) surface: Option<vk::SurfaceKHR>,
    pub(crate) device: Option<LogicalDeviceState>,
    pub(crate) swapchain: Option<Swapchain>,
    pub(crate) sync: Option<FrameSync>,

    pub(crate) current_frame: usize,
    pub(crate) image_index: u32,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) frame_number: u64,
    pub(crate) initialized: bool,
}

impl VulkanRenderer {
    /// Load the system Vulkan library and build a renderer on top of it
    pub fn new(provider: Box<dyn SurfaceProvider>, config: RendererConfig) -> Result<Self> {
        let driver = AshDriver::load()?;
        Ok(Self::with_driver(Box::new(driver), provider, config))
    }

    pub fn with_driver(
        driver: Box<dyn VulkanDriver>,
        provider: Box<dyn SurfaceProvider>,
        config: RendererConfig,
    ) -> Self {
        Self {
            driver,
            provider,
            config,
            requirements: DeviceRequirements::default(),
            instance: None,
            surface: None,
            device: None,
            swapchain: None,
            sync: None,
            current_frame: 0,
            image_index: 0,
            width: DEFAULT_FRAMEBUFFER_SIZE.0,
            height: DEFAULT_FRAMEBUFFER_SIZE.1,
            frame_number: 0,
            initialized: false,
        }
    }

    /// Replace the default physical device requirements
    pub fn with_device_requirements(mut self, requirements: DeviceRequirements) -> Self {
        self.requirements = requirements;
        self
    }

    fn create_objects(&mut self, app_name: &str) -> Result<()> {
        let driver = self.driver.as_mut();

        let instance = create_instance(driver, self.provider.as_ref(), app_name, &self.config)?;
        self.instance = Some(instance);

        let surface = driver.create_surface(self.provider.as_ref())?;
        self.surface = Some(surface);
        engine_debug!(SOURCE, "Vulkan surface created");

        let record = select_physical_device(driver, surface, &self.requirements)?;
        let device = self.device.insert(create_logical_device(driver, record, &self.requirements)?);

        self.swapchain = Some(Swapchain::create(driver, device, surface, self.width, self.height)?);
        self.sync = Some(FrameSync::create(driver, MAX_FRAMES_IN_FLIGHT)?);
        Ok(())
    }

    /// Destroy whatever exists, in reverse creation order
    fn destroy_objects(&mut self) {
        let driver = self.driver.as_mut();

        if let Some(mut sync) = self.sync.take() {
            sync.destroy(driver);
        }
        if let Some(mut swapchain) = self.swapchain.take() {
            swapchain.destroy(driver);
        }
        if let Some(mut device) = self.device.take() {
            destroy_logical_device(driver, &mut device);
        }
        if let Some(surface) = self.surface.take() {
            driver.destroy_surface(surface);
        }
        if let Some(instance) = self.instance.take() {
            destroy_instance(driver, instance);
        }

        self.current_frame = 0;
        self.image_index = 0;
    }

    pub fn swapchain(&self) -> Option<&Swapchain> {
        self.swapchain.as_ref()
    }

    pub fn device(&self) -> Option<&LogicalDeviceState> {
        self.device.as_ref()
    }

    pub fn instance(&self) -> Option<&GraphicsInstance> {
        self.instance.as_ref()
    }

    pub fn surface(&self) -> Option<vk::SurfaceKHR> {
        self.surface
    }

    /// Cached framebuffer size
    pub fn framebuffer_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }
}

impl Renderer for VulkanRenderer {
    fn backend(&self) -> RendererBackend {
        RendererBackend::Vulkan
    }

    fn initialize(&mut self, app_name: &str) -> Result<()> {
        if self.initialized {
            return Err(Error::status(
                StatusCode::RendererAlreadyInitialized,
                "Vulkan renderer is already initialized",
            ));
        }

        engine_info!(SOURCE, "Initializing Vulkan renderer for '{}'", app_name);
        if let Err(e) = self.create_objects(app_name) {
            self.destroy_objects();
            return Err(e);
        }

        self.initialized = true;
        self.frame_number = 0;
        engine_info!(SOURCE, "Vulkan renderer initialized successfully");
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        if !self.initialized {
            return Ok(());
        }

        engine_info!(SOURCE, "Shutting down Vulkan renderer...");
        if let Err(e) = self.driver.device_wait_idle() {
            engine_warn!(SOURCE, "Failed to wait for device idle before shutdown: {:?}", e);
        }
        self.destroy_objects();
        self.initialized = false;

        let stats = debug::validation_stats();
        if stats.total() > 0 {
            engine_info!(
                SOURCE,
                "Validation messages: {} error(s), {} warning(s), {} info, {} verbose",
                stats.errors,
                stats.warnings,
                stats.info,
                stats.verbose
            );
        }
        Ok(())
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        engine_debug!(SOURCE, "Framebuffer resized to {}x{}", width, height);
        self.width = width;
        self.height = height;
    }

    fn begin_frame(&mut self, _delta_time: f32) -> Result<FrameStatus> {
        self.begin_frame_impl()
    }

    fn end_frame(&mut self, _delta_time: f32) -> Result<()> {
        self.end_frame_impl()
    }

    fn frame_number(&self) -> u64 {
        self.frame_number
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl Drop for VulkanRenderer {
    fn drop(&mut self) {
        if self.initialized {
            let _ = self.shutdown();
        }
    }
}

/// Build the renderer for `backend`
///
/// Only Vulkan is real; the other backends get a placeholder that refuses
/// to initialize.
pub fn create_renderer(
    backend: RendererBackend,
    provider: Box<dyn SurfaceProvider>,
    config: RendererConfig,
) -> Result<Box<dyn Renderer>> {
    match backend {
        RendererBackend::Vulkan => Ok(Box::new(VulkanRenderer::new(provider, config)?)),
        RendererBackend::OpenGl | RendererBackend::DirectX => {
            engine_warn!(SOURCE, "{} backend requested but not implemented", backend);
            Ok(Box::new(UnimplementedRenderer::new(backend)))
        }
    }
}

#[cfg(test)]
#[path = "vulkan_renderer_tests.rs"]
mod tests;
