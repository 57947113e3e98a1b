use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::capability::{DeviceCapability, DeviceType};
use super::value_objects::DeviceId;

/// One device in the user's constellation, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub display_name: String,
    pub device_type: DeviceType,
    /// Whether this record describes the local device.
    pub is_current_device: bool,
    pub last_access_time: Option<DateTime<Utc>>,
    pub capabilities: Vec<DeviceCapability>,
    pub push_subscription: Option<DevicePushSubscription>,
    pub subscription_expired: bool,
}

/// Web-push endpoint a device receives commands on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevicePushSubscription {
    pub endpoint: String,
    pub public_key: String,
    pub auth_key: String,
}
