use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::{AccountConfig, Profile};
use crate::device::{
    Device, DeviceCapability, DeviceEvent, DeviceId, DevicePushSubscription, DeviceType,
};

#[derive(Debug, Clone, Error)]
pub enum AccountBackendError {
    #[error("network error: {0}")]
    Network(String),

    #[error("authentication error: {0}")]
    Authentication(String),

    #[error("backend error: {0}")]
    Other(String),
}

/// OAuth access token handed back by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenInfo {
    pub scope: String,
    pub token: String,
    /// Scoped key material, when the scope carries one.
    pub key: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Result of asking the server whether the current session is still valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationStatus {
    pub active: bool,
}

/// Hook the backend invokes after any mutation that changed its persisted
/// state. Implementations must not call back into the backend synchronously.
pub trait BackendStateListener: Send + Sync {
    fn on_state_changed(&self);
}

/// The opaque per-account object of the underlying account library.
///
/// Every call may perform network I/O; the manager only invokes them while
/// holding the serialization gate. Exactly one backend is live per manager.
#[async_trait]
pub trait AccountBackendPort: Send + Sync {
    /// Start an interactive OAuth flow. Returns the URL to present to the
    /// user; its `state` query parameter identifies the flow.
    async fn begin_oauth_flow(&self, scopes: &[&str]) -> Result<String, AccountBackendError>;

    /// Start a pairing flow from a QR-code URL supplied by another device.
    async fn begin_pairing_flow(
        &self,
        pairing_url: &str,
        scopes: &[&str],
    ) -> Result<String, AccountBackendError>;

    /// Exchange the redirect's authorization code for tokens.
    async fn complete_oauth_flow(&self, code: &str, state: &str)
        -> Result<(), AccountBackendError>;

    async fn get_profile(&self) -> Result<Profile, AccountBackendError>;

    async fn get_devices(&self) -> Result<Vec<Device>, AccountBackendError>;

    /// Create or replace this installation's device record.
    async fn initialize_device(
        &self,
        name: &str,
        device_type: DeviceType,
        capabilities: &[DeviceCapability],
    ) -> Result<(), AccountBackendError>;

    /// Re-register capabilities on an existing device record.
    async fn ensure_capabilities(
        &self,
        capabilities: &[DeviceCapability],
    ) -> Result<(), AccountBackendError>;

    async fn set_device_display_name(&self, name: &str) -> Result<(), AccountBackendError>;

    async fn set_push_subscription(
        &self,
        subscription: &DevicePushSubscription,
    ) -> Result<(), AccountBackendError>;

    /// Poll the server for queued device commands.
    async fn poll_device_commands(&self) -> Result<Vec<DeviceEvent>, AccountBackendError>;

    /// Decrypt and parse a raw push payload into device events.
    async fn handle_push_message(&self, payload: &str)
        -> Result<Vec<DeviceEvent>, AccountBackendError>;

    async fn send_single_tab(
        &self,
        target_device_id: &DeviceId,
        title: &str,
        url: &str,
    ) -> Result<(), AccountBackendError>;

    /// Get an access token for `scope`, from cache when possible.
    async fn get_access_token(&self, scope: &str) -> Result<AccessTokenInfo, AccountBackendError>;

    async fn clear_access_token_cache(&self);

    async fn check_authorization_status(&self) -> Result<AuthorizationStatus, AccountBackendError>;

    /// Destroy the session server-side.
    async fn disconnect(&self) -> Result<(), AccountBackendError>;

    /// Serialize the backend's internal state to an opaque blob.
    ///
    /// Must round-trip exactly through [`AccountBackendFactory::restore`].
    async fn to_json(&self) -> Result<String, AccountBackendError>;

    /// Register the persist hook. Replaces any previously registered listener.
    fn register_state_listener(&self, listener: Arc<dyn BackendStateListener>);
}

/// Constructs backend handles, so the manager can replace its handle without
/// knowing the concrete implementation.
pub trait AccountBackendFactory: Send + Sync {
    fn create(
        &self,
        config: &AccountConfig,
    ) -> Result<Arc<dyn AccountBackendPort>, AccountBackendError>;

    /// Restore a backend from a blob produced by
    /// [`AccountBackendPort::to_json`].
    fn restore(
        &self,
        config: &AccountConfig,
        serialized: &str,
    ) -> Result<Arc<dyn AccountBackendPort>, AccountBackendError>;
}
