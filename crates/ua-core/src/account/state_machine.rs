use tracing::warn;

use crate::account::{AccountAction, AccountEvent, AccountState};

pub struct AccountStateMachine;

impl AccountStateMachine {
    /// Advance the account lifecycle by one event.
    ///
    /// Pure transition function: returns the next state and the side effects
    /// to run after entering it. Pairs not listed in the lifecycle table are
    /// ignored with a log and leave the state unchanged.
    pub fn transition(
        state: AccountState,
        event: AccountEvent,
    ) -> (AccountState, Vec<AccountAction>) {
        match (state, event) {
            // 1. Cold start
            (AccountState::Start, AccountEvent::Initialize) => {
                (AccountState::Start, vec![AccountAction::RestoreFromStorage])
            }
            (AccountState::Start, AccountEvent::AccountNotFound) => (
                AccountState::NotAuthenticated,
                vec![AccountAction::CreateFreshAccount],
            ),
            (AccountState::Start, AccountEvent::AccountRestored) => (
                AccountState::AuthenticatedNoProfile,
                vec![AccountAction::ActivateRestoredAccount],
            ),

            // 2. Interactive sign-in
            (AccountState::NotAuthenticated, AccountEvent::Authenticated(auth_data)) => (
                AccountState::AuthenticatedNoProfile,
                vec![AccountAction::ActivateNewAccount(auth_data)],
            ),

            // 3. Profile retrieval
            (AccountState::AuthenticatedNoProfile, AccountEvent::FetchProfile) => (
                AccountState::AuthenticatedNoProfile,
                vec![AccountAction::FetchProfile],
            ),
            (AccountState::AuthenticatedNoProfile, AccountEvent::FetchedProfile) => (
                AccountState::AuthenticatedWithProfile,
                vec![AccountAction::NotifyProfileUpdated],
            ),
            (AccountState::AuthenticatedNoProfile, AccountEvent::FailedToFetchProfile) => {
                (AccountState::AuthenticatedNoProfile, vec![])
            }

            // 4. Auth problems
            (
                AccountState::AuthenticatedNoProfile | AccountState::AuthenticatedWithProfile,
                AccountEvent::AuthenticationError,
            ) => (
                AccountState::AuthenticationProblem,
                vec![AccountAction::AttemptRecovery],
            ),
            (AccountState::AuthenticationProblem, AccountEvent::Authenticated(auth_data)) => (
                AccountState::AuthenticatedNoProfile,
                vec![AccountAction::ActivateNewAccount(auth_data)],
            ),
            (
                AccountState::AuthenticationProblem,
                AccountEvent::RecoveredFromAuthenticationProblem,
            ) => (
                AccountState::AuthenticatedNoProfile,
                vec![AccountAction::ActivateRecoveredAccount],
            ),

            // 5. Logout
            (
                AccountState::AuthenticatedNoProfile
                | AccountState::AuthenticatedWithProfile
                | AccountState::AuthenticationProblem,
                AccountEvent::Logout,
            ) => (
                AccountState::NotAuthenticated,
                vec![AccountAction::LogoutAndReset],
            ),

            // 6. Everything else is ignored
            (state, event) => {
                warn!(?state, ?event, "ignoring event with no transition");
                (state, vec![])
            }
        }
    }
}
