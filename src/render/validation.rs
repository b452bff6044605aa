use log::*;

use std::ffi::CStr;
use std::os::raw::c_void;
use vulkanalia::vk::{self, HasBuilder};

pub const LAYER: vk::ExtensionName = vk::ExtensionName::from_bytes(b"VK_LAYER_KHRONOS_validation");

/// maps the severity of a debug message to the log level, it is reported with;
/// verbose driver chatter is reported as info
pub fn severity_level(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> Level {
    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        Level::Error
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        Level::Warn
    } else {
        Level::Info
    }
}

/// human readable message type, e.g. "Validation" or "General|Performance"
pub fn type_name(type_: vk::DebugUtilsMessageTypeFlagsEXT) -> String {
    let names = [
        (vk::DebugUtilsMessageTypeFlagsEXT::GENERAL, "General"),
        (vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION, "Validation"),
        (vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE, "Performance"),
    ]
    .iter()
    .filter(|(flag, _)| type_.contains(*flag))
    .map(|(_, name)| *name)
    .collect::<Vec<_>>();

    if names.is_empty() {
        "Unknown".to_owned()
    } else {
        names.join("|")
    }
}

/// create info for the debug messenger; it is used for the messenger itself
/// and chained into the instance create info, so instance creation and
/// destruction get reported as well
pub fn messenger_info() -> vk::DebugUtilsMessengerCreateInfoEXTBuilder<'static> {
    vk::DebugUtilsMessengerCreateInfoEXT::builder()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .user_callback(Some(debug_callback))
}

/// called from the vulkan library, if a validation layer message is sent
///
/// this function signature needs to match the following function:
/// https://www.khronos.org/registry/vulkan/specs/1.3-extensions/man/html/PFN_vkDebugUtilsMessengerCallbackEXT.html
pub extern "system" fn debug_callback(
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    type_: vk::DebugUtilsMessageTypeFlagsEXT,
    data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _: *mut c_void,
) -> vk::Bool32 {
    if data.is_null() {
        return vk::FALSE;
    }

    let data = unsafe { *data };
    let message = if data.message.is_null() {
        "<no message>".into()
    } else {
        unsafe { CStr::from_ptr(data.message) }.to_string_lossy()
    };

    log!(severity_level(severity), "VK - {}: {}", type_name(type_), message);

    // the return value tells the layer, whether the triggering call should be
    // aborted; that is reserved for layer development
    vk::FALSE
}
