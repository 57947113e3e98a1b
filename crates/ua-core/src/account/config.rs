use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::device::{DeviceCapability, DeviceType};

/// OAuth client configuration for the account backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Base URL of the account server.
    pub content_url: String,
    pub client_id: String,
    pub redirect_uri: String,
}

impl AccountConfig {
    pub fn new(
        content_url: impl Into<String>,
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            content_url: content_url.into(),
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
        }
    }
}

/// How this installation presents itself in the device constellation.
///
/// Supplied once at manager construction; drives the device-record
/// initialization and capability registration that run on sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub name: String,
    pub device_type: DeviceType,
    pub capabilities: BTreeSet<DeviceCapability>,
}

impl DeviceConfig {
    pub fn new(
        name: impl Into<String>,
        device_type: DeviceType,
        capabilities: impl IntoIterator<Item = DeviceCapability>,
    ) -> Self {
        Self {
            name: name.into(),
            device_type,
            capabilities: capabilities.into_iter().collect(),
        }
    }

    pub fn supports_send_tab(&self) -> bool {
        self.capabilities.contains(&DeviceCapability::SendTab)
    }
}
