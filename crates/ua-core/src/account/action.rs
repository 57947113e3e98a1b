use crate::account::AuthData;

/// Side effects requested by a state transition.
///
/// Actions are executed by the manager on the serialization gate after the
/// new state has been entered; an executed action may produce a follow-up
/// [`AccountEvent`](crate::account::AccountEvent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountAction {
    /// Read the persisted account blob from the secret store.
    RestoreFromStorage,

    /// Install a fresh, signed-out backend handle.
    CreateFreshAccount,

    /// Wire up a backend restored from storage: persistence hook, device
    /// constellation, ensure device capabilities, notify observers.
    ActivateRestoredAccount,

    /// Wire up a backend after an interactive sign-in: persistence hook,
    /// OAuth completion, device constellation, initialize the device record,
    /// notify observers.
    ActivateNewAccount(AuthData),

    /// Wire up a backend after silent recovery from an auth problem.
    ActivateRecoveredAccount,

    /// Fetch the account profile from the backend.
    FetchProfile,

    /// Notify observers that the cached profile changed.
    NotifyProfileUpdated,

    /// Probe whether the auth problem can be recovered without the user.
    AttemptRecovery,

    /// Tear the account down: disconnect, clear caches and secret store,
    /// install a fresh handle, notify observers.
    LogoutAndReset,
}
