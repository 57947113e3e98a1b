use thiserror::Error;

use crate::ports::AccountBackendError;

/// Errors surfaced to callers of the account manager.
#[derive(Debug, Error)]
pub enum AccountManagerError {
    /// A failure originating in the account backend.
    #[error("account backend failed: {0}")]
    Backend(#[from] AccountBackendError),

    /// `finish_authentication` was called with no flow in progress.
    #[error("no authentication flow is in progress")]
    NoExistingAuthFlow,

    /// The redirect's `state` does not match the flow most recently begun.
    #[error("redirect does not belong to the authentication flow in progress")]
    WrongAuthFlow,
}
