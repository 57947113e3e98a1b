use crate::account::AuthData;

/// Events fed into the account state machine.
///
/// External actors enqueue `Initialize`, `Authenticated`,
/// `AuthenticationError`, `FetchProfile` and `Logout`; the remaining variants
/// are follow-ups produced by executed actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountEvent {
    Initialize,

    // Cold-start results (from RestoreFromStorage)
    AccountNotFound,
    AccountRestored,

    // Sign-in
    Authenticated(AuthData),

    // Auth-problem path
    AuthenticationError,
    RecoveredFromAuthenticationProblem,

    // Profile
    FetchProfile,
    FetchedProfile,
    FailedToFetchProfile,

    Logout,
}
