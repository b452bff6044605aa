pub(crate) mod device;
pub(crate) mod instance;
pub(crate) mod negotiation;
mod queue;
pub(crate) mod validation;

/// Vulkan 1.3.0, encoded the way vk::make_version does it; requested for the
/// instance and required from the physical device
pub const API_VERSION: u32 = (1 << 22) | (3 << 12);
