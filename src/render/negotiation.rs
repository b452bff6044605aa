// negotiation of instance layers and extensions: the names we request are
// checked against what the loader reports before the instance is created
use log::*;
use thiserror::Error;

use std::collections::HashSet;

use vulkanalia::vk;

use super::validation;
use crate::config::Config;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NegotiationError {
    #[error("Requested Vulkan layer {0} not supported.")]
    UnsupportedLayer(String),
    #[error("Requested Vulkan extension {0} not supported.")]
    UnsupportedExtension(String),
}

pub fn requested_layers(config: &Config) -> Vec<vk::ExtensionName> {
    if config.validation_layers {
        vec![validation::LAYER]
    } else {
        Vec::new()
    }
}

/// extensions required by the window system plus the debug utils extension,
/// if it was requested
pub fn requested_extensions(
    window_extensions: &[&vk::ExtensionName],
    config: &Config,
) -> Vec<vk::ExtensionName> {
    let mut extensions = window_extensions
        .iter()
        .map(|e| **e)
        .collect::<Vec<_>>();

    if config.debug_utils && !extensions.contains(&vk::EXT_DEBUG_UTILS_EXTENSION.name) {
        extensions.push(vk::EXT_DEBUG_UTILS_EXTENSION.name);
    }

    extensions
}

pub fn has_debug_utils(extensions: &[vk::ExtensionName]) -> bool {
    extensions.contains(&vk::EXT_DEBUG_UTILS_EXTENSION.name)
}

fn first_missing<'a>(
    requested: &'a [vk::ExtensionName],
    supported: &[vk::ExtensionName],
) -> Option<&'a vk::ExtensionName> {
    let supported = supported.iter().collect::<HashSet<_>>();
    requested.iter().find(|name| !supported.contains(name))
}

/// lines logged for a list of names, in the order the loader enumerated them
pub fn name_listing(title: &str, names: &[vk::ExtensionName]) -> Vec<String> {
    std::iter::once(title.to_owned())
        .chain(names.iter().map(|name| format!("\t{}", name)))
        .collect()
}

fn log_names(title: &str, names: &[vk::ExtensionName]) {
    for line in name_listing(title, names) {
        info!("{}", line);
    }
}

pub fn validate_layers(
    requested: &[vk::ExtensionName],
    supported: &[vk::ExtensionName],
) -> Result<(), NegotiationError> {
    if let Some(missing) = first_missing(requested, supported) {
        return Err(NegotiationError::UnsupportedLayer(missing.to_string()));
    }

    log_names("Requested Vulkan layers:", requested);
    log_names("Supported Vulkan layers:", supported);
    Ok(())
}

pub fn validate_extensions(
    requested: &[vk::ExtensionName],
    supported: &[vk::ExtensionName],
) -> Result<(), NegotiationError> {
    if let Some(missing) = first_missing(requested, supported) {
        return Err(NegotiationError::UnsupportedExtension(missing.to_string()));
    }

    log_names("Requested Vulkan extensions:", requested);
    log_names("Supported Vulkan extensions:", supported);
    Ok(())
}
