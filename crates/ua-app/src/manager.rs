//! The account manager: public surface and state-machine driver.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, info_span, warn, Instrument};

use ua_core::account::{
    scopes, AccountAction, AccountConfig, AccountEvent, AccountState, AccountStateMachine,
    AuthData, AuthType, DeviceConfig, Profile,
};
use ua_core::account::auth::oauth_state_param;
use ua_core::error::AccountManagerError;
use ua_core::ports::{
    AccessTokenInfo, AccountBackendError, AccountBackendFactory, AccountBackendPort,
    SecretStorePort,
};

use crate::constellation::DeviceConstellation;
use crate::gate::OpGate;
use crate::observers::{
    AccountObserver, DeviceEventsObserver, Notification, NotificationDispatcher,
};
use crate::persistence::StatePersister;

/// Drives one user account through authentication, session restore, profile
/// retrieval and the device-messaging lifecycle.
///
/// All backend mutations and state-machine steps run on the serialization
/// gate; observer notifications are delivered on a separate dispatch lane in
/// the order the transitions produced them.
pub struct AccountManager {
    config: AccountConfig,
    device_config: DeviceConfig,
    backend_factory: Arc<dyn AccountBackendFactory>,
    secret_store: Arc<dyn SecretStorePort>,
    gate: Arc<OpGate>,
    dispatcher: NotificationDispatcher,

    // Mutated only while holding a gate permit.
    state: RwLock<AccountState>,
    profile: RwLock<Option<Profile>>,
    latest_auth_state: RwLock<Option<String>>,
    backend: RwLock<Option<Arc<dyn AccountBackendPort>>>,
    constellation: RwLock<Option<Arc<DeviceConstellation>>>,

    initialized: AtomicBool,
}

impl AccountManager {
    /// Must be called from within a tokio runtime (the notification lane is
    /// spawned here).
    pub fn new(
        config: AccountConfig,
        device_config: DeviceConfig,
        backend_factory: Arc<dyn AccountBackendFactory>,
        secret_store: Arc<dyn SecretStorePort>,
    ) -> Self {
        Self {
            config,
            device_config,
            backend_factory,
            secret_store,
            gate: Arc::new(OpGate::new()),
            dispatcher: NotificationDispatcher::spawn(),
            state: RwLock::new(AccountState::Start),
            profile: RwLock::new(None),
            latest_auth_state: RwLock::new(None),
            backend: RwLock::new(None),
            constellation: RwLock::new(None),
            initialized: AtomicBool::new(false),
        }
    }

    /// Restore the persisted session, if any. One-shot; later calls are
    /// ignored with a warning.
    pub async fn initialize(&self) -> Result<(), AccountManagerError> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            warn!("initialize() called more than once; ignoring");
            return Ok(());
        }
        self.process_event(AccountEvent::Initialize).await;
        Ok(())
    }

    pub fn has_account(&self) -> bool {
        self.current_state().has_account()
    }

    pub fn account_needs_reauth(&self) -> bool {
        self.current_state().needs_reauth()
    }

    /// Cached profile, in the states that carry one.
    pub fn account_profile(&self) -> Option<Profile> {
        match self.current_state() {
            AccountState::AuthenticatedWithProfile | AccountState::AuthenticationProblem => {
                self.profile.read().expect("lock poisoned").clone()
            }
            _ => None,
        }
    }

    /// Start an interactive OAuth flow. Returns the URL to present; the
    /// flow's `state` parameter is remembered for `finish_authentication`.
    pub async fn begin_authentication(&self) -> Result<String, AccountManagerError> {
        let span = info_span!("account.begin_authentication");
        async {
            let _permit = self.gate.acquire().await;
            let backend = self.expect_backend();
            let url = backend
                .begin_oauth_flow(&[scopes::PROFILE, scopes::SYNC])
                .await?;
            self.remember_auth_state(&url)?;
            Ok(url)
        }
        .instrument(span)
        .await
    }

    /// Start a pairing flow from another device's QR-code URL.
    pub async fn begin_pairing_authentication(
        &self,
        pairing_url: &str,
    ) -> Result<String, AccountManagerError> {
        let span = info_span!("account.begin_pairing_authentication");
        async {
            let _permit = self.gate.acquire().await;
            let backend = self.expect_backend();
            let url = backend
                .begin_pairing_flow(pairing_url, &[scopes::PROFILE, scopes::SYNC])
                .await?;
            self.remember_auth_state(&url)?;
            Ok(url)
        }
        .instrument(span)
        .await
    }

    /// Complete the flow begun by the last `begin_*` call with the
    /// parameters captured from the redirect.
    pub async fn finish_authentication(
        &self,
        auth_data: AuthData,
    ) -> Result<(), AccountManagerError> {
        let expected = self.latest_auth_state.read().expect("lock poisoned").clone();
        match expected {
            None => Err(AccountManagerError::NoExistingAuthFlow),
            Some(expected) if expected != auth_data.state => {
                Err(AccountManagerError::WrongAuthFlow)
            }
            Some(_) => {
                self.process_event(AccountEvent::Authenticated(auth_data))
                    .await;
                Ok(())
            }
        }
    }

    /// Get an access token for `scope`; backend errors surface verbatim.
    pub async fn get_access_token(
        &self,
        scope: &str,
    ) -> Result<AccessTokenInfo, AccountManagerError> {
        let _permit = self.gate.acquire().await;
        let backend = self.expect_backend();
        Ok(backend.get_access_token(scope).await?)
    }

    /// Re-fetch the profile. A no-op unless a profile fetch is currently
    /// allowed by the lifecycle.
    pub async fn refresh_profile(&self) {
        self.process_event(AccountEvent::FetchProfile).await;
    }

    /// Sign the user out. Always succeeds from the caller's viewpoint;
    /// internal teardown failures are logged.
    pub async fn logout(&self) -> Result<(), AccountManagerError> {
        self.process_event(AccountEvent::Logout).await;
        Ok(())
    }

    /// Inject an authorization failure detected elsewhere in the embedding
    /// application; the manager attempts silent recovery.
    pub async fn handle_authentication_error(&self) {
        self.process_event(AccountEvent::AuthenticationError).await;
    }

    /// The live constellation, or `None` while unauthenticated.
    pub fn device_constellation(&self) -> Option<Arc<DeviceConstellation>> {
        self.constellation.read().expect("lock poisoned").clone()
    }

    pub fn register(&self, observer: &Arc<dyn AccountObserver>) {
        self.dispatcher.slots().set_account(observer);
    }

    pub fn register_for_device_events(&self, observer: &Arc<dyn DeviceEventsObserver>) {
        self.dispatcher.slots().set_device_events(observer);
    }

    // -----------------------------------------------------------------------
    // State-machine driver
    // -----------------------------------------------------------------------

    /// Run the machine to quiescence over `event` and its follow-ups, under
    /// one gate permit, so externally enqueued events cannot interleave.
    async fn process_event(&self, event: AccountEvent) {
        let _permit = self.gate.acquire().await;
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let current = self.current_state();
            debug!(state = ?current, event = ?event, "processing account event");
            let (next, actions) = AccountStateMachine::transition(current, event);
            *self.state.write().expect("lock poisoned") = next;

            for action in actions {
                if let Some(follow_up) = self.execute_action(action).await {
                    queue.push_back(follow_up);
                }
            }
        }
    }

    async fn execute_action(&self, action: AccountAction) -> Option<AccountEvent> {
        match action {
            AccountAction::RestoreFromStorage => self.restore_from_storage().await,
            AccountAction::CreateFreshAccount => {
                self.create_fresh_backend();
                None
            }
            AccountAction::ActivateRestoredAccount => {
                let backend = self.expect_backend();
                StatePersister::install(&backend, Arc::clone(&self.secret_store));
                let constellation = self.attach_constellation(&backend);
                constellation.ensure_capabilities(&self.device_config).await;
                self.dispatcher
                    .post(Notification::Authenticated(AuthType::ExistingAccount));
                self.run_post_auth_hook(&constellation).await;
                Some(AccountEvent::FetchProfile)
            }
            AccountAction::ActivateNewAccount(auth_data) => {
                let backend = self.expect_backend();
                StatePersister::install(&backend, Arc::clone(&self.secret_store));
                if let Err(error) = backend
                    .complete_oauth_flow(&auth_data.code, &auth_data.state)
                    .await
                {
                    warn!(%error, "failed to complete the oauth flow");
                }
                let constellation = self.attach_constellation(&backend);
                constellation.init_device(&self.device_config).await;
                self.dispatcher
                    .post(Notification::Authenticated(auth_data.auth_type));
                self.run_post_auth_hook(&constellation).await;
                Some(AccountEvent::FetchProfile)
            }
            AccountAction::ActivateRecoveredAccount => {
                let backend = self.expect_backend();
                StatePersister::install(&backend, Arc::clone(&self.secret_store));
                let constellation = self.attach_constellation(&backend);
                constellation.init_device(&self.device_config).await;
                self.dispatcher
                    .post(Notification::Authenticated(AuthType::Recovered));
                self.run_post_auth_hook(&constellation).await;
                Some(AccountEvent::FetchProfile)
            }
            AccountAction::FetchProfile => {
                let backend = self.expect_backend();
                match backend.get_profile().await {
                    Ok(profile) => {
                        *self.profile.write().expect("lock poisoned") = Some(profile);
                        Some(AccountEvent::FetchedProfile)
                    }
                    Err(error) => {
                        warn!(%error, "profile fetch failed");
                        Some(AccountEvent::FailedToFetchProfile)
                    }
                }
            }
            AccountAction::NotifyProfileUpdated => {
                if let Some(profile) = self.profile.read().expect("lock poisoned").clone() {
                    self.dispatcher.post(Notification::ProfileUpdated(profile));
                }
                None
            }
            AccountAction::AttemptRecovery => self.attempt_recovery().await,
            AccountAction::LogoutAndReset => {
                self.logout_and_reset().await;
                None
            }
        }
    }

    async fn restore_from_storage(&self) -> Option<AccountEvent> {
        match self.secret_store.read().await {
            Ok(Some(blob)) => match self.backend_factory.restore(&self.config, &blob) {
                Ok(backend) => {
                    self.set_backend(backend);
                    Some(AccountEvent::AccountRestored)
                }
                Err(error) => {
                    warn!(%error, "stored account failed to restore; starting fresh");
                    if let Err(error) = self.secret_store.clear().await {
                        warn!(%error, "failed to clear unusable account blob");
                    }
                    Some(AccountEvent::AccountNotFound)
                }
            },
            Ok(None) => Some(AccountEvent::AccountNotFound),
            Err(error) => {
                warn!(%error, "secret store read failed; starting fresh");
                Some(AccountEvent::AccountNotFound)
            }
        }
    }

    async fn attempt_recovery(&self) -> Option<AccountEvent> {
        let backend = self.expect_backend();
        match backend.check_authorization_status().await {
            Ok(status) if status.active => {
                backend.clear_access_token_cache().await;
                match backend.get_access_token(scopes::PROFILE).await {
                    Ok(_) => Some(AccountEvent::RecoveredFromAuthenticationProblem),
                    Err(error) => {
                        warn!(%error, "token fetch failed after clearing the cache");
                        self.dispatcher.post(Notification::AuthenticationProblems);
                        None
                    }
                }
            }
            Ok(_) => {
                self.dispatcher.post(Notification::AuthenticationProblems);
                None
            }
            Err(error) => {
                warn!(%error, "authorization status check failed");
                self.dispatcher.post(Notification::AuthenticationProblems);
                None
            }
        }
    }

    async fn logout_and_reset(&self) {
        let backend = self.expect_backend();
        if let Err(error) = backend.disconnect().await {
            warn!(%error, "disconnect failed during logout");
        }
        *self.profile.write().expect("lock poisoned") = None;
        *self.constellation.write().expect("lock poisoned") = None;
        if let Err(error) = self.secret_store.clear().await {
            warn!(%error, "failed to clear persisted account state");
        }
        self.create_fresh_backend();
        self.dispatcher.post(Notification::LoggedOut);
    }

    /// After any authenticated entry: devices that can receive tabs want a
    /// fresh constellation snapshot and any commands queued while offline.
    async fn run_post_auth_hook(&self, constellation: &Arc<DeviceConstellation>) {
        if self.device_config.supports_send_tab() {
            constellation.refresh_state_inner().await;
            constellation.poll_for_events_inner().await;
        }
    }

    fn create_fresh_backend(&self) {
        match self.backend_factory.create(&self.config) {
            Ok(backend) => self.set_backend(backend),
            Err(error) => warn!(%error, "failed to create a fresh account backend"),
        }
    }

    /// Replace the handle. The constellation bound to the old handle is
    /// dropped in the same step so it can never reach a superseded handle.
    fn set_backend(&self, backend: Arc<dyn AccountBackendPort>) {
        *self.backend.write().expect("lock poisoned") = Some(backend);
        *self.constellation.write().expect("lock poisoned") = None;
    }

    fn attach_constellation(
        &self,
        backend: &Arc<dyn AccountBackendPort>,
    ) -> Arc<DeviceConstellation> {
        let constellation = Arc::new(DeviceConstellation::new(
            Arc::clone(backend),
            Arc::clone(&self.gate),
            self.dispatcher.clone(),
        ));
        *self.constellation.write().expect("lock poisoned") = Some(Arc::clone(&constellation));
        constellation
    }

    fn remember_auth_state(&self, flow_url: &str) -> Result<(), AccountManagerError> {
        let state = oauth_state_param(flow_url).ok_or_else(|| {
            AccountBackendError::Other("authorization URL carries no state parameter".to_string())
        })?;
        *self.latest_auth_state.write().expect("lock poisoned") = Some(state);
        Ok(())
    }

    fn current_state(&self) -> AccountState {
        *self.state.read().expect("lock poisoned")
    }

    fn expect_backend(&self) -> Arc<dyn AccountBackendPort> {
        self.backend
            .read()
            .expect("lock poisoned")
            .clone()
            .expect("no account backend; initialize() must complete before account operations")
    }
}
