//! Shared test doubles for the manager and constellation tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use ua_app::observers::{AccountObserver, DeviceConstellationObserver, DeviceEventsObserver};
use ua_core::account::{AccountConfig, AuthType, DeviceConfig, Profile};
use ua_core::device::{
    ConstellationState, Device, DeviceCapability, DeviceEvent, DeviceId, DevicePushSubscription,
    DeviceType,
};
use ua_core::ports::{
    AccessTokenInfo, AccountBackendError, AccountBackendFactory, AccountBackendPort,
    AuthorizationStatus, BackendStateListener, SecretStoreError, SecretStorePort,
};

pub fn test_config() -> AccountConfig {
    AccountConfig::new(
        "https://accounts.example.com",
        "client-1",
        "https://app.example.com/redirect",
    )
}

pub fn test_device_config() -> DeviceConfig {
    DeviceConfig::new("Test Laptop", DeviceType::Desktop, [DeviceCapability::SendTab])
}

pub fn profile(uid: &str, email: &str) -> Profile {
    Profile {
        uid: uid.to_string(),
        email: email.to_string(),
        avatar: None,
        display_name: None,
    }
}

pub fn device(id: &str, name: &str, is_current: bool) -> Device {
    Device {
        id: DeviceId::from(id),
        display_name: name.to_string(),
        device_type: DeviceType::Desktop,
        is_current_device: is_current,
        last_access_time: Some(Utc::now()),
        capabilities: vec![DeviceCapability::SendTab],
        push_subscription: Some(DevicePushSubscription {
            endpoint: format!("https://push.example.com/{id}"),
            public_key: "pub".to_string(),
            auth_key: "auth".to_string(),
        }),
        subscription_expired: false,
    }
}

pub async fn wait_for<F: Fn() -> bool>(what: &str, condition: F) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {what}");
}

// ---------------------------------------------------------------------------
// Backend double
// ---------------------------------------------------------------------------

/// Scripted account backend. Records every call; behavior is driven by the
/// public fields.
pub struct MockBackend {
    /// Identity carried through `to_json` / `restore`.
    pub label: String,
    /// `state` parameter embedded in begin-flow URLs.
    pub auth_state: String,
    pub calls: Mutex<Vec<String>>,
    pub devices: Mutex<Vec<Device>>,
    /// Scripted profile-fetch outcomes; empty means a default profile.
    pub profile_results: Mutex<VecDeque<Result<Profile, AccountBackendError>>>,
    /// Events returned by the next `poll_device_commands`.
    pub queued_commands: Mutex<Vec<DeviceEvent>>,
    /// Events returned by the next `handle_push_message`.
    pub push_events: Mutex<Vec<DeviceEvent>>,
    pub authorization_active: AtomicBool,
    pub authorization_check_fails: AtomicBool,
    pub access_token_fails: AtomicBool,
    pub disconnect_fails: AtomicBool,
    listener: Mutex<Option<Arc<dyn BackendStateListener>>>,
}

impl MockBackend {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            auth_state: format!("state-{}", Uuid::new_v4()),
            calls: Mutex::new(Vec::new()),
            devices: Mutex::new(Vec::new()),
            profile_results: Mutex::new(VecDeque::new()),
            queued_commands: Mutex::new(Vec::new()),
            push_events: Mutex::new(Vec::new()),
            authorization_active: AtomicBool::new(true),
            authorization_check_fails: AtomicBool::new(false),
            access_token_fails: AtomicBool::new(false),
            disconnect_fails: AtomicBool::new(false),
            listener: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    pub fn script_profile(&self, result: Result<Profile, AccountBackendError>) {
        self.profile_results
            .lock()
            .expect("lock poisoned")
            .push_back(result);
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("lock poisoned").push(call);
    }

    /// Mutations that change persisted state fire the listener, like the
    /// real library does.
    fn state_changed(&self) {
        let listener = self.listener.lock().expect("lock poisoned").clone();
        if let Some(listener) = listener {
            listener.on_state_changed();
        }
    }
}

#[async_trait]
impl AccountBackendPort for MockBackend {
    async fn begin_oauth_flow(&self, scopes: &[&str]) -> Result<String, AccountBackendError> {
        self.record(format!("begin_oauth_flow:{}", scopes.join(" ")));
        Ok(format!(
            "https://accounts.example.com/authorize?state={}&action=signin",
            self.auth_state
        ))
    }

    async fn begin_pairing_flow(
        &self,
        pairing_url: &str,
        scopes: &[&str],
    ) -> Result<String, AccountBackendError> {
        self.record(format!(
            "begin_pairing_flow:{pairing_url}:{}",
            scopes.join(" ")
        ));
        Ok(format!(
            "https://accounts.example.com/pair?state={}&action=pairing",
            self.auth_state
        ))
    }

    async fn complete_oauth_flow(
        &self,
        code: &str,
        state: &str,
    ) -> Result<(), AccountBackendError> {
        self.record(format!("complete_oauth_flow:{code}:{state}"));
        self.state_changed();
        Ok(())
    }

    async fn get_profile(&self) -> Result<Profile, AccountBackendError> {
        self.record("get_profile".to_string());
        self.profile_results
            .lock()
            .expect("lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Ok(profile("uid-1", "user@example.com")))
    }

    async fn get_devices(&self) -> Result<Vec<Device>, AccountBackendError> {
        self.record("get_devices".to_string());
        Ok(self.devices.lock().expect("lock poisoned").clone())
    }

    async fn initialize_device(
        &self,
        name: &str,
        _device_type: DeviceType,
        capabilities: &[DeviceCapability],
    ) -> Result<(), AccountBackendError> {
        self.record(format!("initialize_device:{name}:{}", capabilities.len()));
        self.state_changed();
        Ok(())
    }

    async fn ensure_capabilities(
        &self,
        capabilities: &[DeviceCapability],
    ) -> Result<(), AccountBackendError> {
        self.record(format!("ensure_capabilities:{}", capabilities.len()));
        self.state_changed();
        Ok(())
    }

    async fn set_device_display_name(&self, name: &str) -> Result<(), AccountBackendError> {
        self.record(format!("set_device_display_name:{name}"));
        self.state_changed();
        Ok(())
    }

    async fn set_push_subscription(
        &self,
        subscription: &DevicePushSubscription,
    ) -> Result<(), AccountBackendError> {
        self.record(format!("set_push_subscription:{}", subscription.endpoint));
        self.state_changed();
        Ok(())
    }

    async fn poll_device_commands(&self) -> Result<Vec<DeviceEvent>, AccountBackendError> {
        self.record("poll_device_commands".to_string());
        Ok(std::mem::take(
            &mut *self.queued_commands.lock().expect("lock poisoned"),
        ))
    }

    async fn handle_push_message(
        &self,
        payload: &str,
    ) -> Result<Vec<DeviceEvent>, AccountBackendError> {
        self.record(format!("handle_push_message:{payload}"));
        Ok(std::mem::take(
            &mut *self.push_events.lock().expect("lock poisoned"),
        ))
    }

    async fn send_single_tab(
        &self,
        target_device_id: &DeviceId,
        title: &str,
        url: &str,
    ) -> Result<(), AccountBackendError> {
        self.record(format!("send_single_tab:{target_device_id}:{title}:{url}"));
        Ok(())
    }

    async fn get_access_token(&self, scope: &str) -> Result<AccessTokenInfo, AccountBackendError> {
        self.record(format!("get_access_token:{scope}"));
        if self.access_token_fails.load(Ordering::SeqCst) {
            return Err(AccountBackendError::Authentication(
                "token endpoint rejected the session".to_string(),
            ));
        }
        Ok(AccessTokenInfo {
            scope: scope.to_string(),
            token: format!("token-for-{scope}"),
            key: None,
            expires_at: None,
        })
    }

    async fn clear_access_token_cache(&self) {
        self.record("clear_access_token_cache".to_string());
    }

    async fn check_authorization_status(
        &self,
    ) -> Result<AuthorizationStatus, AccountBackendError> {
        self.record("check_authorization_status".to_string());
        if self.authorization_check_fails.load(Ordering::SeqCst) {
            return Err(AccountBackendError::Network(
                "status endpoint unreachable".to_string(),
            ));
        }
        Ok(AuthorizationStatus {
            active: self.authorization_active.load(Ordering::SeqCst),
        })
    }

    async fn disconnect(&self) -> Result<(), AccountBackendError> {
        self.record("disconnect".to_string());
        if self.disconnect_fails.load(Ordering::SeqCst) {
            return Err(AccountBackendError::Network(
                "destroy session failed".to_string(),
            ));
        }
        Ok(())
    }

    async fn to_json(&self) -> Result<String, AccountBackendError> {
        Ok(serde_json::json!({ "account": self.label }).to_string())
    }

    fn register_state_listener(&self, listener: Arc<dyn BackendStateListener>) {
        *self.listener.lock().expect("lock poisoned") = Some(listener);
    }
}

// ---------------------------------------------------------------------------
// Factory double
// ---------------------------------------------------------------------------

/// Hands out prepared backends in order, or default ones when the script
/// runs dry. Restore parses the blob `MockBackend::to_json` wrote.
#[derive(Default)]
pub struct MockFactory {
    pub prepared: Mutex<VecDeque<Arc<MockBackend>>>,
    pub created: Mutex<Vec<Arc<MockBackend>>>,
    pub restore_fails: AtomicBool,
}

impl MockFactory {
    pub fn with_prepared(backends: impl IntoIterator<Item = Arc<MockBackend>>) -> Self {
        Self {
            prepared: Mutex::new(backends.into_iter().collect()),
            created: Mutex::new(Vec::new()),
            restore_fails: AtomicBool::new(false),
        }
    }

    /// The backend the manager is currently holding.
    pub fn last_backend(&self) -> Arc<MockBackend> {
        self.created
            .lock()
            .expect("lock poisoned")
            .last()
            .cloned()
            .expect("no backend created yet")
    }

    fn next_backend(&self, fallback_label: &str) -> Arc<MockBackend> {
        let backend = self
            .prepared
            .lock()
            .expect("lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Arc::new(MockBackend::new(fallback_label)));
        self.created
            .lock()
            .expect("lock poisoned")
            .push(Arc::clone(&backend));
        backend
    }
}

impl AccountBackendFactory for MockFactory {
    fn create(
        &self,
        _config: &AccountConfig,
    ) -> Result<Arc<dyn AccountBackendPort>, AccountBackendError> {
        Ok(self.next_backend("fresh"))
    }

    fn restore(
        &self,
        _config: &AccountConfig,
        serialized: &str,
    ) -> Result<Arc<dyn AccountBackendPort>, AccountBackendError> {
        if self.restore_fails.load(Ordering::SeqCst) {
            return Err(AccountBackendError::Other(
                "stored state rejected".to_string(),
            ));
        }
        let value: serde_json::Value = serde_json::from_str(serialized)
            .map_err(|error| AccountBackendError::Other(error.to_string()))?;
        let label = value["account"]
            .as_str()
            .ok_or_else(|| AccountBackendError::Other("blob missing account field".to_string()))?
            .to_string();
        Ok(self.next_backend(&label))
    }
}

// ---------------------------------------------------------------------------
// Secret store double
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemorySecretStore {
    pub blob: Mutex<Option<String>>,
}

impl MemorySecretStore {
    pub fn with_blob(blob: &str) -> Self {
        Self {
            blob: Mutex::new(Some(blob.to_string())),
        }
    }

    pub fn current(&self) -> Option<String> {
        self.blob.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl SecretStorePort for MemorySecretStore {
    async fn read(&self) -> Result<Option<String>, SecretStoreError> {
        Ok(self.current())
    }

    async fn write(&self, blob: &str) -> Result<(), SecretStoreError> {
        *self.blob.lock().expect("lock poisoned") = Some(blob.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SecretStoreError> {
        *self.blob.lock().expect("lock poisoned") = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Observer doubles
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingAccountObserver {
    pub log: Mutex<Vec<String>>,
}

impl RecordingAccountObserver {
    pub fn entries(&self) -> Vec<String> {
        self.log.lock().expect("lock poisoned").clone()
    }
}

impl AccountObserver for RecordingAccountObserver {
    fn on_authenticated(&self, auth_type: &AuthType) {
        self.log
            .lock()
            .expect("lock poisoned")
            .push(format!("authenticated:{auth_type:?}"));
    }

    fn on_profile_updated(&self, profile: &Profile) {
        self.log
            .lock()
            .expect("lock poisoned")
            .push(format!("profile:{}", profile.email));
    }

    fn on_authentication_problems(&self) {
        self.log
            .lock()
            .expect("lock poisoned")
            .push("problems".to_string());
    }

    fn on_logged_out(&self) {
        self.log
            .lock()
            .expect("lock poisoned")
            .push("logged_out".to_string());
    }
}

#[derive(Default)]
pub struct RecordingDeviceEventsObserver {
    pub batches: Mutex<Vec<Vec<DeviceEvent>>>,
}

impl RecordingDeviceEventsObserver {
    pub fn batches(&self) -> Vec<Vec<DeviceEvent>> {
        self.batches.lock().expect("lock poisoned").clone()
    }
}

impl DeviceEventsObserver for RecordingDeviceEventsObserver {
    fn on_events(&self, events: &[DeviceEvent]) {
        self.batches
            .lock()
            .expect("lock poisoned")
            .push(events.to_vec());
    }
}

#[derive(Default)]
pub struct RecordingConstellationObserver {
    pub states: Mutex<Vec<ConstellationState>>,
}

impl RecordingConstellationObserver {
    pub fn states(&self) -> Vec<ConstellationState> {
        self.states.lock().expect("lock poisoned").clone()
    }
}

impl DeviceConstellationObserver for RecordingConstellationObserver {
    fn on_state_update(&self, state: &ConstellationState) {
        self.states
            .lock()
            .expect("lock poisoned")
            .push(state.clone());
    }
}
