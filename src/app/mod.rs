use anyhow::{anyhow, Result};
use log::*;

use vulkanalia::loader::{LibloadingLoader, LIBRARY};
use vulkanalia::prelude::v1_0::*;
use vulkanalia::vk::{ExtDebugUtilsExtension, KhrSurfaceExtension};
use vulkanalia::window as vk_window;

use winit::window::Window;

use crate::config::Config;
use crate::render::device;
use crate::render::instance;

/// the initialized renderer: an `App` only exists, if every setup step
/// succeeded, and `destroy` returns everything to the driver
#[derive(Debug)]
pub struct App {
    // keeps the loaded Vulkan library alive for the lifetime of the instance
    #[allow(dead_code)]
    entry: Entry,
    instance: Instance,
    data: AppData,
    device: Device,
}

#[derive(Clone, Debug, Default)]
pub struct AppData {
    pub surface: vk::SurfaceKHR,
    // stays null, if debug utils were not enabled
    pub messenger: vk::DebugUtilsMessengerEXT,
    // this will be implicitly destroyed, if the instance is destroyed,
    // so no further handling of this in App::destroy() required
    pub physical_device: vk::PhysicalDevice,

    // queues are created along with the logical device and implicitly
    // cleaned up, when the device is destroyed
    pub graphics_queue: vk::Queue,
    pub present_queue: vk::Queue,
}

impl App {
    /// creates the app
    pub unsafe fn create(window: &Window, config: &Config) -> Result<Self> {
        // LIBRARY is a constant path pointing to the Vulkan library; the loader
        // loads the initial Vulkan commands from it
        let loader = LibloadingLoader::new(LIBRARY)?;
        let entry = Entry::new(loader).map_err(|e| anyhow!("{}", e))?;

        let mut data = AppData::default();
        let instance = instance::create_instance(window, &entry, config, &mut data)?;

        match Self::create_device(window, &instance, config, &mut data) {
            Ok(device) => {
                info!("Renderer initialized");
                Ok(Self {
                    entry,
                    instance,
                    data,
                    device,
                })
            }
            Err(error) => {
                destroy_instance(&instance, &data);
                Err(error)
            }
        }
    }

    unsafe fn create_device(
        window: &Window,
        instance: &Instance,
        config: &Config,
        data: &mut AppData,
    ) -> Result<Device> {
        data.surface = vk_window::create_surface(instance, window)?;

        let requirements = device::DeviceRequirements::new(config);
        device::pick_physical_device(instance, data, &requirements)?;
        device::create_logical_device(instance, config, data)
    }

    /// destroy the app
    pub unsafe fn destroy(&mut self) {
        // None is for allocation callbacks
        self.device.destroy_device(None);
        destroy_instance(&self.instance, &self.data);
        info!("Renderer destroyed");
    }
}

// everything owned by the instance, in reverse order of creation; the debug
// messenger needs to be destroyed, before the instance is destroyed
unsafe fn destroy_instance(instance: &Instance, data: &AppData) {
    if data.surface != vk::SurfaceKHR::null() {
        instance.destroy_surface_khr(data.surface, None);
    }

    if data.messenger != vk::DebugUtilsMessengerEXT::null() {
        instance.destroy_debug_utils_messenger_ext(data.messenger, None);
    }

    instance.destroy_instance(None);
}
