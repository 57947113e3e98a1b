use serde::{Deserialize, Serialize};

use super::device::Device;

/// A tab delivered through a device command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabEntry {
    pub title: String,
    pub url: String,
}

/// Incoming device command, decrypted and parsed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceEvent {
    TabReceived {
        /// Sending device, when the backend could attribute the command.
        from: Option<Device>,
        entries: Vec<TabEntry>,
    },
}

/// Outgoing device command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceEventOutgoing {
    SendTab { title: String, url: String },
}
