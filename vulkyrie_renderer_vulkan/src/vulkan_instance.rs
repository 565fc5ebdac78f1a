/// Graphics instance - Vulkan instance plus optional debug messenger
///
/// Validation builds request the Khronos validation layer and the debug
/// utils extension, then install a messenger routed to the engine logger.

use ash::vk;
use vulkyrie_engine::vulkyrie::render::RendererConfig;
use vulkyrie_engine::vulkyrie::{Result, StatusCode};
use vulkyrie_engine::{engine_debug, engine_err, engine_info, engine_status};

use crate::debug;
use crate::vulkan_driver::{InstanceDesc, VulkanDriver};
use crate::vulkan_surface::SurfaceProvider;

const SOURCE: &str = "vulkyrie::vulkan::instance";

pub const VALIDATION_LAYER: &str = "VK_LAYER_KHRONOS_validation";
pub const API_VERSION: u32 = vk::API_VERSION_1_3;

/// A live Vulkan instance and what it was created with
#[derive(Debug, Clone)]
pub struct GraphicsInstance {
    pub api_version: u32,
    pub app_name: String,
    pub engine_name: String,
    pub extensions: Vec<String>,
    pub layers: Vec<String>,
    pub handle: vk::Instance,
    pub debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
}

/// Platform extensions, then surface, then debug utils when validating
///
/// Duplicates are dropped, first occurrence wins.
pub fn required_instance_extensions(platform: Vec<String>, enable_validation: bool) -> Vec<String> {
    let mut requested = platform;
    requested.push(ash::khr::surface::NAME.to_string_lossy().into_owned());
    if enable_validation {
        requested.push(ash::ext::debug_utils::NAME.to_string_lossy().into_owned());
    }

    let mut extensions: Vec<String> = Vec::with_capacity(requested.len());
    for name in requested {
        if !extensions.contains(&name) {
            extensions.push(name);
        }
    }
    extensions
}

fn make_version((major, minor, patch): (u32, u32, u32)) -> u32 {
    vk::make_api_version(0, major, minor, patch)
}

/// Create the instance and, in validation builds, the debug messenger
///
/// Nothing is created unless every required extension (and layer) is
/// reported by the driver.
pub fn create_instance(
    driver: &mut dyn VulkanDriver,
    provider: &dyn SurfaceProvider,
    app_name: &str,
    config: &RendererConfig,
) -> Result<GraphicsInstance> {
    let mut platform_extensions = Vec::new();
    provider.add_required_extensions(&mut platform_extensions)?;
    let extensions = required_instance_extensions(platform_extensions, config.enable_validation);

    let available = driver
        .instance_extensions()
        .map_err(|e| engine_err!(SOURCE, "Failed to enumerate instance extensions: {:?}", e))?;
    for required in &extensions {
        engine_debug!(SOURCE, "Searching for required extension: {}", required);
        if !available.iter().any(|a| a == required) {
            return Err(engine_status!(
                SOURCE,
                StatusCode::VulkanInstanceExtensionNotFound,
                "Required extension is missing: {}",
                required
            ));
        }
    }

    let layers = if config.enable_validation {
        engine_debug!(SOURCE, "Validation layers enabled, enumerating");
        let available = driver
            .instance_layers()
            .map_err(|e| engine_err!(SOURCE, "Failed to enumerate instance layers: {:?}", e))?;
        if !available.iter().any(|a| a == VALIDATION_LAYER) {
            return Err(engine_status!(
                SOURCE,
                StatusCode::VulkanRequiredValidationLayersMissing,
                "Required validation layer is missing: {}",
                VALIDATION_LAYER
            ));
        }
        vec![VALIDATION_LAYER.to_string()]
    } else {
        Vec::new()
    };

    let desc = InstanceDesc {
        app_name: app_name.to_string(),
        app_version: make_version(config.app_version),
        engine_name: config.engine_name.clone(),
        engine_version: make_version(config.engine_version),
        api_version: API_VERSION,
        extensions: extensions.clone(),
        layers: layers.clone(),
    };
    let handle = driver
        .create_instance(&desc)
        .map_err(|e| engine_err!(SOURCE, "Failed to create Vulkan instance: {:?}", e))?;
    engine_debug!(SOURCE, "Vulkan instance created with {} extension(s)", extensions.len());

    let debug_messenger = if config.enable_validation {
        if !driver.debug_messenger_supported() {
            driver.destroy_instance();
            return Err(engine_status!(
                SOURCE,
                StatusCode::VulkanDebugMessengerUnavailable,
                "vkCreateDebugUtilsMessengerEXT could not be resolved"
            ));
        }
        debug::reset_validation_stats();
        match driver.create_debug_messenger(debug::severity_flags(config.debug_severity)) {
            Ok(messenger) => {
                engine_info!(SOURCE, "Vulkan debugger created");
                Some(messenger)
            }
            Err(e) => {
                driver.destroy_instance();
                return Err(engine_err!(SOURCE, "Failed to create debug messenger: {:?}", e));
            }
        }
    } else {
        None
    };

    Ok(GraphicsInstance {
        api_version: API_VERSION,
        app_name: app_name.to_string(),
        engine_name: config.engine_name.clone(),
        extensions,
        layers,
        handle,
        debug_messenger,
    })
}

/// Destroy the debug messenger, then the instance
pub fn destroy_instance(driver: &mut dyn VulkanDriver, instance: GraphicsInstance) {
    if let Some(messenger) = instance.debug_messenger {
        engine_debug!(SOURCE, "Destroying Vulkan debugger");
        driver.destroy_debug_messenger(messenger);
    }
    engine_debug!(SOURCE, "Destroying Vulkan instance");
    driver.destroy_instance();
}

#[cfg(test)]
#[path = "vulkan_instance_tests.rs"]
mod tests;
