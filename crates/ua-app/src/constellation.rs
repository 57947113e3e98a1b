//! Device constellation: the user's devices as seen through one backend
//! handle.

use std::sync::{Arc, RwLock};

use tracing::{info_span, warn, Instrument};

use ua_core::account::DeviceConfig;
use ua_core::device::{
    ConstellationState, DeviceCapability, DeviceEvent, DeviceEventOutgoing, DeviceId,
    DevicePushSubscription,
};
use ua_core::ports::AccountBackendPort;

use crate::gate::OpGate;
use crate::observers::{
    DeviceConstellationObserver, DeviceEventsObserver, Notification, NotificationDispatcher,
};

/// Local and remote devices associated with the signed-in account.
///
/// Bound to exactly one backend handle; the manager replaces the whole
/// constellation whenever it replaces the handle, so no operation here can
/// reach a superseded handle.
pub struct DeviceConstellation {
    backend: Arc<dyn AccountBackendPort>,
    gate: Arc<OpGate>,
    dispatcher: NotificationDispatcher,
    state: RwLock<Option<ConstellationState>>,
}

impl DeviceConstellation {
    pub(crate) fn new(
        backend: Arc<dyn AccountBackendPort>,
        gate: Arc<OpGate>,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            backend,
            gate,
            dispatcher,
            state: RwLock::new(None),
        }
    }

    /// Cached snapshot; `None` before the first refresh.
    pub fn state(&self) -> Option<ConstellationState> {
        self.state.read().expect("lock poisoned").clone()
    }

    /// Fetch the device list and replace the cached snapshot.
    pub async fn refresh_state(&self) {
        let span = info_span!("constellation.refresh_state");
        async {
            let _permit = self.gate.acquire().await;
            self.refresh_state_inner().await;
        }
        .instrument(span)
        .await
    }

    /// Rename the local device, then refresh so observers see the new name.
    pub async fn set_local_device_name(&self, name: &str) {
        let span = info_span!("constellation.set_local_device_name");
        async {
            let _permit = self.gate.acquire().await;
            if let Err(error) = self.backend.set_device_display_name(name).await {
                warn!(%error, "failed to rename local device");
            }
            self.refresh_state_inner().await;
        }
        .instrument(span)
        .await
    }

    /// Poll the server for queued device commands and route them to the
    /// events observer.
    pub async fn poll_for_events(&self) {
        let span = info_span!("constellation.poll_for_events");
        async {
            let _permit = self.gate.acquire().await;
            self.poll_for_events_inner().await;
        }
        .instrument(span)
        .await
    }

    /// Decrypt and route a raw push payload.
    pub async fn process_raw_incoming_device_event(&self, payload: &str) {
        let span = info_span!("constellation.process_raw_event");
        async {
            let _permit = self.gate.acquire().await;
            match self.backend.handle_push_message(payload).await {
                Ok(events) => self.route_events(events),
                Err(error) => warn!(%error, "failed to process incoming push payload"),
            }
        }
        .instrument(span)
        .await
    }

    /// Send an outgoing command to one of the user's other devices.
    pub async fn send_event_to_device(
        &self,
        target_device_id: DeviceId,
        event: DeviceEventOutgoing,
    ) {
        let span = info_span!("constellation.send_event", device_id = %target_device_id);
        async {
            let _permit = self.gate.acquire().await;
            match event {
                DeviceEventOutgoing::SendTab { title, url } => {
                    if let Err(error) = self
                        .backend
                        .send_single_tab(&target_device_id, &title, &url)
                        .await
                    {
                        warn!(%error, "failed to send tab");
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Forward a new push subscription to the backend.
    pub async fn set_device_push_subscription(&self, subscription: DevicePushSubscription) {
        let _permit = self.gate.acquire().await;
        if let Err(error) = self.backend.set_push_subscription(&subscription).await {
            warn!(%error, "failed to update push subscription");
        }
    }

    pub fn register_device_observer(&self, observer: &Arc<dyn DeviceConstellationObserver>) {
        self.dispatcher.slots().set_constellation(observer);
    }

    pub fn register_device_events_observer(&self, observer: &Arc<dyn DeviceEventsObserver>) {
        self.dispatcher.slots().set_device_events(observer);
    }

    /// Create or replace this installation's device record. Caller holds the
    /// gate.
    pub(crate) async fn init_device(&self, config: &DeviceConfig) {
        let capabilities = capability_list(config);
        if let Err(error) = self
            .backend
            .initialize_device(&config.name, config.device_type, &capabilities)
            .await
        {
            warn!(%error, "failed to initialize device record");
        }
    }

    /// Re-register capabilities on the existing device record. Caller holds
    /// the gate.
    pub(crate) async fn ensure_capabilities(&self, config: &DeviceConfig) {
        let capabilities = capability_list(config);
        if let Err(error) = self.backend.ensure_capabilities(&capabilities).await {
            warn!(%error, "failed to ensure device capabilities");
        }
    }

    /// Refresh without taking the gate. Caller holds it.
    pub(crate) async fn refresh_state_inner(&self) {
        match self.backend.get_devices().await {
            Ok(devices) => {
                let state = ConstellationState::from_devices(devices);
                if let Some(local) = &state.local_device {
                    if local.subscription_expired {
                        warn!(device_id = %local.id, "local device push subscription has expired");
                    }
                }
                *self.state.write().expect("lock poisoned") = Some(state.clone());
                self.dispatcher
                    .post(Notification::ConstellationStateUpdated(state));
            }
            Err(error) => warn!(%error, "device list refresh failed"),
        }
    }

    /// Poll without taking the gate. Caller holds it.
    pub(crate) async fn poll_for_events_inner(&self) {
        match self.backend.poll_device_commands().await {
            Ok(events) => self.route_events(events),
            Err(error) => warn!(%error, "device command poll failed"),
        }
    }

    fn route_events(&self, events: Vec<DeviceEvent>) {
        if events.is_empty() {
            return;
        }
        self.dispatcher.post(Notification::DeviceEvents(events));
    }
}

fn capability_list(config: &DeviceConfig) -> Vec<DeviceCapability> {
    config.capabilities.iter().copied().collect()
}
