//! Bridges the backend's persist hook to the secret store.

use std::sync::{Arc, Weak};

use tracing::warn;

use ua_core::ports::{AccountBackendPort, BackendStateListener, SecretStorePort};

/// Listens for "persisted state changed" callbacks from the backend and
/// mirrors the serialized blob into the secret store.
///
/// Writes run on a background task and never fail the operation that
/// triggered them. Holds the backend weakly: the backend owns its listener,
/// so a strong reference here would leak the pair.
pub(crate) struct StatePersister {
    backend: Weak<dyn AccountBackendPort>,
    store: Arc<dyn SecretStorePort>,
}

impl StatePersister {
    /// Register a persister as `backend`'s state listener.
    pub fn install(backend: &Arc<dyn AccountBackendPort>, store: Arc<dyn SecretStorePort>) {
        let persister = Arc::new(Self {
            backend: Arc::downgrade(backend),
            store,
        });
        backend.register_state_listener(persister);
    }
}

impl BackendStateListener for StatePersister {
    fn on_state_changed(&self) {
        let Some(backend) = self.backend.upgrade() else {
            // The handle was replaced; nothing left to persist.
            return;
        };
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            match backend.to_json().await {
                Ok(blob) => {
                    if let Err(error) = store.write(&blob).await {
                        warn!(%error, "failed to persist account state");
                    }
                }
                Err(error) => {
                    warn!(%error, "failed to serialize account state");
                }
            }
        });
    }
}
