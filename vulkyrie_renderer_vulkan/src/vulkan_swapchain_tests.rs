//! Unit tests for vulkan_swapchain.rs

use ash::vk::Handle;
use vulkyrie_engine::vulkyrie::StatusCode;

use super::*;
use crate::mock_driver::{capabilities, MockDriver};
use crate::vulkan_device::create_logical_device;
use crate::vulkan_device_selector::{select_physical_device, DeviceRequirements};

fn surface() -> vk::SurfaceKHR {
    vk::SurfaceKHR::from_raw(77)
}

fn format(format: vk::Format, color_space: vk::ColorSpaceKHR) -> vk::SurfaceFormatKHR {
    vk::SurfaceFormatKHR { format, color_space }
}

fn logical_device(driver: &mut MockDriver) -> LogicalDeviceState {
    let record = select_physical_device(&*driver, surface(), &DeviceRequirements::default()).unwrap();
    create_logical_device(driver, record, &DeviceRequirements::default()).unwrap()
}

/// Capabilities that leave the extent to the application, range [64, 4096]
fn flexible_capabilities() -> vk::SurfaceCapabilitiesKHR {
    let mut caps = capabilities(2, 0, (u32::MAX, u32::MAX));
    caps.min_image_extent = vk::Extent2D { width: 64, height: 64 };
    caps.max_image_extent = vk::Extent2D { width: 4096, height: 4096 };
    caps
}

// ============================================================================
// CHOICES
// ============================================================================

#[test]
fn test_choose_surface_format_prefers_bgra8_srgb() {
    let formats = [
        format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        format(vk::Format::B8G8R8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
    ];

    let chosen = choose_surface_format(&formats).unwrap();

    assert_eq!(chosen.format, vk::Format::B8G8R8A8_UNORM);
    assert_eq!(chosen.color_space, vk::ColorSpaceKHR::SRGB_NONLINEAR);
}

#[test]
fn test_choose_surface_format_falls_back_to_first() {
    let formats = [
        format(vk::Format::R16G16B16A16_SFLOAT, vk::ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT),
        format(vk::Format::B8G8R8A8_UNORM, vk::ColorSpaceKHR::DISPLAY_P3_NONLINEAR_EXT),
    ];

    let chosen = choose_surface_format(&formats).unwrap();

    assert_eq!(chosen.format, vk::Format::R16G16B16A16_SFLOAT);
    assert_eq!(chosen.color_space, vk::ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT);
}

#[test]
fn test_choose_surface_format_empty() {
    assert!(choose_surface_format(&[]).is_none());
}

#[test]
fn test_choose_present_mode() {
    let modes = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX];
    assert_eq!(choose_present_mode(&modes), vk::PresentModeKHR::MAILBOX);
    assert_eq!(choose_present_mode(&[vk::PresentModeKHR::IMMEDIATE]), vk::PresentModeKHR::FIFO);
    assert_eq!(choose_present_mode(&[]), vk::PresentModeKHR::FIFO);
}

#[test]
fn test_resolve_extent_uses_current_extent() {
    let caps = capabilities(1, 3, (400, 300));
    let extent = resolve_extent(&caps, 1920, 1080);
    assert_eq!((extent.width, extent.height), (400, 300));
}

#[test]
fn test_resolve_extent_clamps_small_size() {
    let extent = resolve_extent(&flexible_capabilities(), 10, 10);
    assert_eq!((extent.width, extent.height), (64, 64));
}

#[test]
fn test_resolve_extent_clamps_large_size() {
    let extent = resolve_extent(&flexible_capabilities(), 8000, 8000);
    assert_eq!((extent.width, extent.height), (4096, 4096));
}

#[test]
fn test_resolve_extent_keeps_size_in_range() {
    let extent = resolve_extent(&flexible_capabilities(), 1280, 720);
    assert_eq!((extent.width, extent.height), (1280, 720));
}

#[test]
fn test_resolve_image_count() {
    assert_eq!(resolve_image_count(&capabilities(1, 3, (1, 1))), 2);
    assert_eq!(resolve_image_count(&capabilities(3, 3, (1, 1))), 3);
    // No maximum
    assert_eq!(resolve_image_count(&capabilities(2, 0, (1, 1))), 3);
}

// ============================================================================
// CREATE
// ============================================================================

#[test]
fn test_create_swapchain_exclusive() {
    let mut driver = MockDriver::new();
    let state = driver.state();
    let mut device = logical_device(&mut driver);

    let swapchain = Swapchain::create(&mut driver, &mut device, surface(), 400, 400).unwrap();

    assert_eq!(swapchain.image_count(), 2);
    assert_eq!(swapchain.views().len(), 2);
    assert_eq!(swapchain.present_mode(), vk::PresentModeKHR::FIFO);
    assert_eq!(swapchain.surface_format().format, vk::Format::B8G8R8A8_UNORM);
    assert_eq!(swapchain.extent().width, 400);
    assert_eq!(swapchain.max_frames_in_flight(), MAX_FRAMES_IN_FLIGHT);
    assert_eq!(device.depth_format, vk::Format::D32_SFLOAT);

    let depth = swapchain.depth_attachment();
    assert!(depth.handle.is_some() && depth.memory.is_some() && depth.view.is_some());
    assert_eq!((depth.width, depth.height), (400, 400));

    let state = state.lock().unwrap();
    let desc = &state.swapchains[0];
    assert_eq!(desc.min_image_count, 2);
    assert_eq!(desc.sharing_mode, vk::SharingMode::EXCLUSIVE);
    assert!(desc.queue_family_indices.is_empty());
    assert_eq!(desc.pre_transform, vk::SurfaceTransformFlagsKHR::IDENTITY);
    assert_eq!(desc.usage, vk::ImageUsageFlags::COLOR_ATTACHMENT);
    // Depth memory comes from the device-local type
    assert_eq!(state.allocations, vec![(400 * 400 * 4, 0)]);
    // One color view per presentable image, in image order
    assert_eq!(&state.view_images[..2], swapchain.images().as_slice());
}

#[test]
fn test_create_swapchain_concurrent_when_present_differs() {
    let mut driver = MockDriver::new();
    let state = driver.state();
    {
        let mut state = state.lock().unwrap();
        state.devices[0].queue_families = vec![
            vk::QueueFlags::GRAPHICS | vk::QueueFlags::TRANSFER,
            vk::QueueFlags::TRANSFER,
        ];
        state.devices[0].present_support = vec![false, true];
    }
    let mut device = logical_device(&mut driver);

    Swapchain::create(&mut driver, &mut device, surface(), 400, 400).unwrap();

    let state = state.lock().unwrap();
    let desc = &state.swapchains[0];
    assert_eq!(desc.sharing_mode, vk::SharingMode::CONCURRENT);
    assert_eq!(desc.queue_family_indices, vec![0, 1]);
}

#[test]
fn test_create_swapchain_uses_framebuffer_size_when_surface_allows() {
    let mut driver = MockDriver::new();
    let state = driver.state();
    state.lock().unwrap().devices[0].capabilities = flexible_capabilities();
    let mut device = logical_device(&mut driver);

    let swapchain = Swapchain::create(&mut driver, &mut device, surface(), 10, 8000).unwrap();

    assert_eq!((swapchain.extent().width, swapchain.extent().height), (64, 4096));
    assert_eq!(swapchain.image_count(), 3);
}

#[test]
fn test_create_swapchain_refreshes_support() {
    let mut driver = MockDriver::new();
    let state = driver.state();
    let mut device = logical_device(&mut driver);
    state.lock().unwrap().devices[0].present_modes = vec![vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX];

    let swapchain = Swapchain::create(&mut driver, &mut device, surface(), 400, 400).unwrap();

    assert_eq!(swapchain.present_mode(), vk::PresentModeKHR::MAILBOX);
    assert_eq!(device.swapchain_support.present_modes.len(), 2);
}

#[test]
fn test_create_swapchain_without_depth_format_cleans_up() {
    let mut driver = MockDriver::new();
    let state = driver.state();
    let mut device = logical_device(&mut driver);
    state.lock().unwrap().devices[0].depth_formats.clear();
    let device_handle = device.handle;

    let result = Swapchain::create(&mut driver, &mut device, surface(), 400, 400);

    assert_eq!(StatusCode::of(&result), StatusCode::VulkanDepthFormatNotSupported);
    assert_eq!(device.depth_format, vk::Format::UNDEFINED);
    let state = state.lock().unwrap();
    assert_eq!(state.count("destroy_image_view"), 2);
    assert_eq!(state.count("destroy_swapchain"), 1);
    // Only the logical device is left alive
    assert_eq!(state.live.len(), 1);
    assert!(state.is_live(device_handle));
}

#[test]
fn test_create_swapchain_without_formats() {
    let mut driver = MockDriver::new();
    let state = driver.state();
    let mut device = logical_device(&mut driver);
    state.lock().unwrap().devices[0].formats.clear();

    let result = Swapchain::create(&mut driver, &mut device, surface(), 400, 400);

    assert_eq!(StatusCode::of(&result), StatusCode::VulkanRequiredSwapchainNotSupported);
    assert!(!state.lock().unwrap().called("create_swapchain"));
}

// ============================================================================
// DESTROY / RECREATE
// ============================================================================

#[test]
fn test_destroy_order_depth_views_swapchain() {
    let mut driver = MockDriver::new();
    let state = driver.state();
    let mut device = logical_device(&mut driver);
    let mut swapchain = Swapchain::create(&mut driver, &mut device, surface(), 400, 400).unwrap();
    state.lock().unwrap().calls.clear();

    swapchain.destroy(&mut driver);

    assert_eq!(swapchain.handle(), vk::SwapchainKHR::null());
    assert!(swapchain.images().is_empty());
    assert!(swapchain.views().is_empty());
    assert!(swapchain.depth_attachment().is_released());

    let state = state.lock().unwrap();
    assert_eq!(
        state.calls,
        vec![
            "destroy_image_view",
            "free_memory",
            "destroy_image",
            "destroy_image_view",
            "destroy_image_view",
            "destroy_swapchain",
        ]
    );
}

#[test]
fn test_destroy_twice_is_harmless() {
    let mut driver = MockDriver::new();
    let state = driver.state();
    let mut device = logical_device(&mut driver);
    let mut swapchain = Swapchain::create(&mut driver, &mut device, surface(), 400, 400).unwrap();

    swapchain.destroy(&mut driver);
    swapchain.destroy(&mut driver);

    assert_eq!(state.lock().unwrap().count("destroy_swapchain"), 1);
}

#[test]
fn test_recreate_invalidates_old_views() {
    let mut driver = MockDriver::new();
    let state = driver.state();
    let mut device = logical_device(&mut driver);
    let mut swapchain = Swapchain::create(&mut driver, &mut device, surface(), 400, 400).unwrap();
    let old_handle = swapchain.handle();
    let old_views = swapchain.views().to_vec();

    swapchain.recreate(&mut driver, &mut device, surface(), 400, 400).unwrap();

    let new_views = swapchain.views().to_vec();
    assert_eq!(new_views.len(), old_views.len());
    assert!(new_views.iter().all(|view| !old_views.contains(view)));
    assert_ne!(swapchain.handle(), old_handle);

    let state = state.lock().unwrap();
    assert!(!state.is_live(old_handle));
    assert!(old_views.iter().all(|&view| !state.is_live(view)));
    assert_eq!(state.swapchains.len(), 2);
}

#[test]
fn test_presentable_images_accessors() {
    let images = PresentableImages(vec![vk::Image::from_raw(1), vk::Image::from_raw(2)]);

    assert_eq!(images.len(), 2);
    assert!(!images.is_empty());
    assert_eq!(images.get(1), Some(vk::Image::from_raw(2)));
    assert_eq!(images.get(2), None);
    assert_eq!(images.as_slice().len(), 2);
}
