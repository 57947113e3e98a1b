use serde::Serialize;

/// Lifecycle state of the managed account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccountState {
    /// Nothing has happened yet; waiting for `initialize`.
    Start,

    /// No account is signed in; a fresh backend handle exists.
    NotAuthenticated,

    /// An account is signed in but its profile has not been fetched yet.
    AuthenticatedNoProfile,

    /// An account is signed in and its profile is cached.
    AuthenticatedWithProfile,

    /// Cached tokens are known or believed to be invalid; the user may need
    /// to re-authenticate.
    AuthenticationProblem,
}

impl AccountState {
    /// True when a live, signed-in account exists in this state.
    pub fn has_account(&self) -> bool {
        matches!(
            self,
            AccountState::AuthenticatedNoProfile
                | AccountState::AuthenticatedWithProfile
                | AccountState::AuthenticationProblem
        )
    }

    /// True when the account requires user re-authentication.
    pub fn needs_reauth(&self) -> bool {
        matches!(self, AccountState::AuthenticationProblem)
    }
}
