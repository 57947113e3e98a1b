use serde::{Deserialize, Serialize};

use super::device::Device;

/// Cached snapshot of the device constellation.
///
/// The source of truth is the server reached through the backend; this is
/// only what the last refresh saw.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstellationState {
    pub local_device: Option<Device>,
    pub remote_devices: Vec<Device>,
}

impl ConstellationState {
    /// Partition a raw device listing into local and remote devices.
    pub fn from_devices(devices: Vec<Device>) -> Self {
        let (local, remote): (Vec<_>, Vec<_>) =
            devices.into_iter().partition(|d| d.is_current_device);
        Self {
            local_device: local.into_iter().next(),
            remote_devices: remote,
        }
    }
}
