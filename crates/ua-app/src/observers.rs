//! Observer registration and the notification dispatch lane.
//!
//! All observer notifications leave the serialization gate through a single
//! ordered channel drained by a dedicated dispatcher task, so observers never
//! run on the gate and never see notifications out of order relative to the
//! state transitions that caused them.
//!
//! Slots hold weak references: destruction of the embedding object silently
//! disables its notifications.

use std::sync::{Arc, Mutex, Weak};

use tokio::sync::mpsc;
use tracing::debug;

use ua_core::account::{AuthType, Profile};
use ua_core::device::{ConstellationState, DeviceEvent};

/// Account lifecycle notifications delivered to the embedding application.
pub trait AccountObserver: Send + Sync {
    fn on_authenticated(&self, auth_type: &AuthType);
    fn on_profile_updated(&self, profile: &Profile);
    fn on_authentication_problems(&self);
    fn on_logged_out(&self);
}

/// Sink for batches of incoming device events.
pub trait DeviceEventsObserver: Send + Sync {
    fn on_events(&self, events: &[DeviceEvent]);
}

/// Notified whenever the cached constellation snapshot is replaced.
pub trait DeviceConstellationObserver: Send + Sync {
    fn on_state_update(&self, state: &ConstellationState);
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Notification {
    Authenticated(AuthType),
    ProfileUpdated(Profile),
    AuthenticationProblems,
    LoggedOut,
    DeviceEvents(Vec<DeviceEvent>),
    ConstellationStateUpdated(ConstellationState),
}

/// Weak single-slot observer registrations, shared between the manager, the
/// constellation, and the dispatcher task.
#[derive(Default)]
pub(crate) struct ObserverSlots {
    account: Mutex<Option<Weak<dyn AccountObserver>>>,
    device_events: Mutex<Option<Weak<dyn DeviceEventsObserver>>>,
    constellation: Mutex<Option<Weak<dyn DeviceConstellationObserver>>>,
}

impl ObserverSlots {
    pub fn set_account(&self, observer: &Arc<dyn AccountObserver>) {
        *self.account.lock().expect("lock poisoned") = Some(Arc::downgrade(observer));
    }

    pub fn set_device_events(&self, observer: &Arc<dyn DeviceEventsObserver>) {
        *self.device_events.lock().expect("lock poisoned") = Some(Arc::downgrade(observer));
    }

    pub fn set_constellation(&self, observer: &Arc<dyn DeviceConstellationObserver>) {
        *self.constellation.lock().expect("lock poisoned") = Some(Arc::downgrade(observer));
    }

    fn account(&self) -> Option<Arc<dyn AccountObserver>> {
        self.account
            .lock()
            .expect("lock poisoned")
            .as_ref()
            .and_then(Weak::upgrade)
    }

    fn device_events(&self) -> Option<Arc<dyn DeviceEventsObserver>> {
        self.device_events
            .lock()
            .expect("lock poisoned")
            .as_ref()
            .and_then(Weak::upgrade)
    }

    fn constellation(&self) -> Option<Arc<dyn DeviceConstellationObserver>> {
        self.constellation
            .lock()
            .expect("lock poisoned")
            .as_ref()
            .and_then(Weak::upgrade)
    }

    fn deliver(&self, notification: Notification) {
        match notification {
            Notification::Authenticated(auth_type) => {
                if let Some(observer) = self.account() {
                    observer.on_authenticated(&auth_type);
                }
            }
            Notification::ProfileUpdated(profile) => {
                if let Some(observer) = self.account() {
                    observer.on_profile_updated(&profile);
                }
            }
            Notification::AuthenticationProblems => {
                if let Some(observer) = self.account() {
                    observer.on_authentication_problems();
                }
            }
            Notification::LoggedOut => {
                if let Some(observer) = self.account() {
                    observer.on_logged_out();
                }
            }
            Notification::DeviceEvents(events) => {
                if let Some(observer) = self.device_events() {
                    observer.on_events(&events);
                }
            }
            Notification::ConstellationStateUpdated(state) => {
                if let Some(observer) = self.constellation() {
                    observer.on_state_update(&state);
                }
            }
        }
    }
}

/// Posting half of the notification lane.
///
/// Cloneable so the constellation can share the manager's lane; all clones
/// feed the same ordered channel.
#[derive(Clone)]
pub(crate) struct NotificationDispatcher {
    tx: mpsc::UnboundedSender<Notification>,
    slots: Arc<ObserverSlots>,
}

impl NotificationDispatcher {
    /// Spawn the dispatcher task. Must be called from within a tokio runtime.
    pub fn spawn() -> Self {
        let slots = Arc::new(ObserverSlots::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let task_slots = Arc::clone(&slots);
        tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                task_slots.deliver(notification);
            }
        });
        Self { tx, slots }
    }

    pub fn post(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            debug!("notification dispatcher stopped; dropping notification");
        }
    }

    pub fn slots(&self) -> &ObserverSlots {
        &self.slots
    }
}
