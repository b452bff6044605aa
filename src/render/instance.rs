use anyhow::Result;
use log::*;

use std::ffi::CString;

use vulkanalia::prelude::v1_0::*;
use vulkanalia::vk::ExtDebugUtilsExtension;
use vulkanalia::window as vk_window;

use winit::window::Window;

use super::negotiation;
use super::validation;
use super::API_VERSION;
use crate::app::AppData;
use crate::config::Config;

/// creates a new vulkan instance using entry.create_instance
/// the window parameter is used to enumerate all required extensions
///
/// The 'Instance' returned by this function is not a raw vulkan instance
/// (this would be vk::Instance), it is an abstraction created by vulkanalia,
/// which combines the raw vulkan instance and the loaded commands for that instance
pub unsafe fn create_instance(
    window: &Window,
    entry: &Entry,
    config: &Config,
    data: &mut AppData,
) -> Result<Instance> {
    let application_name = CString::new(config.app_name.as_str())?;
    let application_info = vk::ApplicationInfo::builder()
        .application_name(application_name.as_bytes_with_nul())
        .application_version(vk::make_version(0, 0, 1))
        .engine_name(b"No Engine\0")
        .engine_version(vk::make_version(0, 0, 1))
        .api_version(API_VERSION);

    let available_layers = entry
        .enumerate_instance_layer_properties()?
        .iter()
        .map(|l| l.layer_name)
        .collect::<Vec<_>>();

    let layers = negotiation::requested_layers(config);
    negotiation::validate_layers(&layers, &available_layers)?;

    let available_extensions = entry
        .enumerate_instance_extension_properties(None)?
        .iter()
        .map(|e| e.extension_name)
        .collect::<Vec<_>>();

    let extensions = negotiation::requested_extensions(
        vk_window::get_required_instance_extensions(window),
        config,
    );
    negotiation::validate_extensions(&extensions, &available_extensions)?;

    // vulkan expects null terminated c_strings (*const i8)
    let layer_names = layers.iter().map(|l| l.as_ptr()).collect::<Vec<_>>();
    let extension_names = extensions.iter().map(|e| e.as_ptr()).collect::<Vec<_>>();

    let mut info = vk::InstanceCreateInfo::builder()
        .application_info(&application_info)
        .enabled_layer_names(&layer_names)
        .enabled_extension_names(&extension_names);

    let debug_utils = negotiation::has_debug_utils(&extensions);
    let mut debug_info = validation::messenger_info();

    if debug_utils {
        trace!("Pushing debug_info to InstanceCreateInfo::pnext");
        info = info.push_next(&mut debug_info);
    }

    let instance = entry.create_instance(&info, None)?;
    debug!("Created Vulkan instance for '{}'", config.app_name);

    if debug_utils {
        // the chained debug_info only covers create_instance/destroy_instance,
        // everything in between is reported by this messenger
        match instance.create_debug_utils_messenger_ext(&debug_info, None) {
            Ok(messenger) => data.messenger = messenger,
            Err(error) => {
                instance.destroy_instance(None);
                return Err(error.into());
            }
        }
    }

    Ok(instance)
}
