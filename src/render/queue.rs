use anyhow::{anyhow, Result};

use vulkanalia::prelude::v1_0::*;
use vulkanalia::vk::KhrSurfaceExtension;

use super::device::SuitabilityError;
use crate::app::AppData;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    pub graphics: u32,
    pub presentation: u32,
}

impl QueueFamilyIndices {
    /// gets queue familiy indices for specified vulkan instance and physical device;
    /// can't be constant, because these indices may vary from device to device
    pub unsafe fn get(
        instance: &Instance,
        data: &AppData,
        physical_device: vk::PhysicalDevice,
    ) -> Result<Self> {
        let properties = instance.get_physical_device_queue_family_properties(physical_device);

        Self::find(&properties, |index| {
            Ok(instance.get_physical_device_surface_support_khr(
                physical_device,
                index,
                data.surface,
            )?)
        })
    }

    /// looks for the first queue family with the GRAPHICS flag and the first
    /// one, which can present to the surface (these may be different families)
    pub fn find<F>(
        properties: &[vk::QueueFamilyProperties],
        mut supports_present: F,
    ) -> Result<Self>
    where
        F: FnMut(u32) -> Result<bool>,
    {
        let graphics = properties
            .iter()
            .position(|p| p.queue_flags.contains(vk::QueueFlags::GRAPHICS))
            .map(|i| i as u32);

        let mut presentation = None;
        for index in 0..properties.len() as u32 {
            if supports_present(index)? {
                presentation = Some(index);
                break;
            }
        }

        if let (Some(graphics), Some(presentation)) = (graphics, presentation) {
            Ok(Self {
                graphics,
                presentation,
            })
        } else {
            Err(anyhow!(SuitabilityError::MissingQueueFamilies))
        }
    }

    /// family indices to create queues for; each family may only be listed once
    pub fn unique(&self) -> Vec<u32> {
        if self.graphics == self.presentation {
            vec![self.graphics]
        } else {
            vec![self.graphics, self.presentation]
        }
    }
}
