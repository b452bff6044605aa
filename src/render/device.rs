use anyhow::{anyhow, Result};
use log::*;
use thiserror::Error;

use std::collections::HashSet;

use vulkanalia::prelude::v1_0::*;
use vulkanalia::vk;

use super::queue::QueueFamilyIndices;
use super::validation;
use super::API_VERSION;
use crate::app::AppData;
use crate::config::Config;

// reasons, why a physical device can't be used; these only cause the device
// to be skipped, never the whole setup to fail
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SuitabilityError {
    #[error("Vulkan {found} is older than the required {required}.")]
    ApiVersion { found: String, required: String },
    #[error("Device type {0:?} is not a discrete GPU.")]
    NotDiscrete(vk::PhysicalDeviceType),
    #[error("Missing device extension {0}.")]
    MissingExtension(String),
    #[error("Missing required queue families.")]
    MissingQueueFamilies,
}

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("No devices with Vulkan support found.")]
    NoDevices,
    #[error("No suitable device with Vulkan support found.")]
    NoSuitableDevice,
}

const DEVICE_EXTENSIONS: &[vk::ExtensionName] = &[
    vk::KHR_SWAPCHAIN_EXTENSION.name,
    vk::ExtensionName::from_bytes(b"VK_KHR_spirv_1_4"),
    vk::ExtensionName::from_bytes(b"VK_KHR_synchronization2"),
    vk::ExtensionName::from_bytes(b"VK_KHR_create_renderpass2"),
];

/// what a physical device has to offer to be picked
#[derive(Clone, Debug)]
pub struct DeviceRequirements {
    pub api_version: u32,
    pub discrete_gpu: bool,
    pub extensions: Vec<vk::ExtensionName>,
}

impl DeviceRequirements {
    pub fn new(config: &Config) -> Self {
        Self {
            api_version: API_VERSION,
            discrete_gpu: config.require_discrete_gpu,
            extensions: DEVICE_EXTENSIONS.to_vec(),
        }
    }
}

pub fn version_string(version: u32) -> String {
    format!(
        "{}.{}.{}",
        version >> 22,
        (version >> 12) & 0x3ff,
        version & 0xfff
    )
}

pub fn check_properties(
    properties: &vk::PhysicalDeviceProperties,
    requirements: &DeviceRequirements,
) -> Result<(), SuitabilityError> {
    if properties.api_version < requirements.api_version {
        return Err(SuitabilityError::ApiVersion {
            found: version_string(properties.api_version),
            required: version_string(requirements.api_version),
        });
    }

    if requirements.discrete_gpu && properties.device_type != vk::PhysicalDeviceType::DISCRETE_GPU
    {
        return Err(SuitabilityError::NotDiscrete(properties.device_type));
    }

    Ok(())
}

pub fn check_extensions(
    supported: &HashSet<vk::ExtensionName>,
    requirements: &DeviceRequirements,
) -> Result<(), SuitabilityError> {
    match requirements
        .extensions
        .iter()
        .find(|e| !supported.contains(*e))
    {
        Some(missing) => Err(SuitabilityError::MissingExtension(missing.to_string())),
        None => Ok(()),
    }
}

// we need to check, whether a given physical device
// is suitable to use for our needs
unsafe fn check_physical_device(
    instance: &Instance,
    data: &AppData,
    requirements: &DeviceRequirements,
    physical_device: vk::PhysicalDevice,
    properties: &vk::PhysicalDeviceProperties,
) -> Result<()> {
    check_properties(properties, requirements)?;

    let extensions = instance
        .enumerate_device_extension_properties(physical_device, None)?
        .iter()
        .map(|e| e.extension_name)
        .collect::<HashSet<_>>();
    check_extensions(&extensions, requirements)?;

    QueueFamilyIndices::get(instance, data, physical_device)?;
    Ok(())
}

/// picks the first candidate, which passes `check`; candidates after the
/// picked one are not checked, candidates failing their check are skipped
pub fn select_first<T, F>(
    candidates: impl IntoIterator<Item = T>,
    mut check: F,
) -> Result<T, SelectionError>
where
    F: FnMut(&T) -> Result<()>,
{
    let mut candidates = candidates.into_iter().peekable();
    if candidates.peek().is_none() {
        return Err(SelectionError::NoDevices);
    }

    candidates
        .find(|candidate| check(candidate).is_ok())
        .ok_or(SelectionError::NoSuitableDevice)
}

pub unsafe fn pick_physical_device(
    instance: &Instance,
    data: &mut AppData,
    requirements: &DeviceRequirements,
) -> Result<()> {
    let devices = instance
        .enumerate_physical_devices()?
        .into_iter()
        .map(|device| (device, instance.get_physical_device_properties(device)))
        .collect::<Vec<_>>();

    if !devices.is_empty() {
        info!("Vulkan devices found:");
        for (_, properties) in &devices {
            info!("\t{}", properties.device_name);
        }
    }

    // a failing query is a reason to skip the device, same as a missing feature
    let (device, properties) = select_first(devices, |(device, properties)| {
        let result = check_physical_device(instance, data, requirements, *device, properties);
        if let Err(error) = &result {
            warn!(
                "Skipping physical device ('{}'): {}",
                properties.device_name, error
            );
        }
        result
    })?;

    info!("Selecting physical device ('{}')", properties.device_name);
    data.physical_device = device;
    Ok(())
}

pub unsafe fn create_logical_device(
    instance: &Instance,
    config: &Config,
    data: &mut AppData,
) -> Result<Device> {
    let indices = QueueFamilyIndices::get(instance, data, data.physical_device)?;

    // drivers only allow a small number of queues per family and one is enough
    // for everything we submit
    let queue_priorities = &[1.0];
    let queue_infos = indices
        .unique()
        .iter()
        .map(|i| {
            vk::DeviceQueueCreateInfo::builder()
                .queue_family_index(*i)
                .queue_priorities(queue_priorities)
        })
        .collect::<Vec<_>>();

    // device layers are deprecated, but older loaders still look at them
    let layers = if config.validation_layers {
        vec![validation::LAYER.as_ptr()]
    } else {
        vec![]
    };

    let extensions = DEVICE_EXTENSIONS
        .iter()
        .map(|e| e.as_ptr())
        .collect::<Vec<_>>();

    let features = vk::PhysicalDeviceFeatures::builder();

    let info = vk::DeviceCreateInfo::builder()
        .queue_create_infos(&queue_infos)
        .enabled_layer_names(&layers)
        .enabled_extension_names(&extensions)
        .enabled_features(&features);
    let device = instance.create_device(data.physical_device, &info, None)?;

    data.graphics_queue = device.get_device_queue(indices.graphics, 0);
    data.present_queue = device.get_device_queue(indices.presentation, 0);

    trace!("graphics queue family index: {}", indices.graphics);
    trace!("presentation queue family index: {}", indices.presentation);

    Ok(device)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn properties(
        api_version: u32,
        device_type: vk::PhysicalDeviceType,
    ) -> vk::PhysicalDeviceProperties {
        vk::PhysicalDeviceProperties {
            api_version,
            device_type,
            ..Default::default()
        }
    }

    fn requirements(discrete_gpu: bool) -> DeviceRequirements {
        DeviceRequirements {
            discrete_gpu,
            ..DeviceRequirements::new(&Config::default())
        }
    }

    #[test]
    fn discrete_gpu_with_recent_api_is_accepted() {
        let properties = properties(
            vk::make_version(1, 3, 250),
            vk::PhysicalDeviceType::DISCRETE_GPU,
        );
        assert_eq!(check_properties(&properties, &requirements(true)), Ok(()));
    }

    #[test]
    fn old_api_version_is_rejected() {
        let properties = properties(
            vk::make_version(1, 2, 198),
            vk::PhysicalDeviceType::DISCRETE_GPU,
        );
        assert_eq!(
            check_properties(&properties, &requirements(true)),
            Err(SuitabilityError::ApiVersion {
                found: "1.2.198".to_owned(),
                required: "1.3.0".to_owned(),
            })
        );
    }

    #[test]
    fn integrated_gpu_depends_on_requirements() {
        let properties = properties(
            vk::make_version(1, 3, 0),
            vk::PhysicalDeviceType::INTEGRATED_GPU,
        );
        assert_eq!(
            check_properties(&properties, &requirements(true)),
            Err(SuitabilityError::NotDiscrete(
                vk::PhysicalDeviceType::INTEGRATED_GPU
            ))
        );
        assert_eq!(check_properties(&properties, &requirements(false)), Ok(()));
    }

    #[test]
    fn all_device_extensions_are_required() {
        let mut supported = DEVICE_EXTENSIONS.iter().copied().collect::<HashSet<_>>();
        assert_eq!(check_extensions(&supported, &requirements(true)), Ok(()));

        supported.remove(&vk::ExtensionName::from_bytes(b"VK_KHR_synchronization2"));
        assert_eq!(
            check_extensions(&supported, &requirements(true)),
            Err(SuitabilityError::MissingExtension(
                "VK_KHR_synchronization2".to_owned()
            ))
        );
    }

    #[test]
    fn swapchain_is_among_device_extensions() {
        assert!(DEVICE_EXTENSIONS.contains(&vk::KHR_SWAPCHAIN_EXTENSION.name));
        assert_eq!(DEVICE_EXTENSIONS.len(), 4);
    }

    #[test]
    fn versions_are_formatted() {
        assert_eq!(version_string(vk::make_version(1, 3, 0)), "1.3.0");
        assert_eq!(version_string(API_VERSION), "1.3.0");
        assert_eq!(API_VERSION, vk::make_version(1, 3, 0));
    }

    #[test]
    fn first_suitable_device_wins() {
        let mut checked = Vec::new();
        let picked = select_first(vec!["a", "b", "c"], |name| {
            checked.push(*name);
            Ok(())
        });

        assert_eq!(picked.unwrap(), "a");
        assert_eq!(checked, vec!["a"]);
    }

    #[test]
    fn failing_devices_are_skipped() {
        let picked = select_first(vec!["llvmpipe", "broken", "gpu", "other gpu"], |name| {
            match *name {
                "llvmpipe" => Err(anyhow!(SuitabilityError::NotDiscrete(
                    vk::PhysicalDeviceType::CPU
                ))),
                "broken" => Err(anyhow!(vk::ErrorCode::INITIALIZATION_FAILED)),
                _ => Ok(()),
            }
        });

        assert_eq!(picked.unwrap(), "gpu");
    }

    #[test]
    fn no_suitable_device() {
        let picked = select_first(vec![1, 2], |_| Err(anyhow!("query failed")));
        assert!(matches!(picked, Err(SelectionError::NoSuitableDevice)));
    }

    #[test]
    fn no_devices_at_all() {
        let picked = select_first(Vec::<u32>::new(), |_| Ok(()));
        assert!(matches!(picked, Err(SelectionError::NoDevices)));
    }

    #[test]
    fn selection_errors_read_well() {
        assert_eq!(
            SelectionError::NoDevices.to_string(),
            "No devices with Vulkan support found."
        );
        assert_eq!(
            SelectionError::NoSuitableDevice.to_string(),
            "No suitable device with Vulkan support found."
        );
    }
}
