//! Port interfaces for the orchestration layer.
//!
//! Ports define the contract between the account manager and the external
//! collaborators it drives: the opaque account backend (OAuth, devices, push,
//! tokens) and the secret store holding the persisted account blob. The
//! manager never sees a concrete implementation of either.

pub mod account_backend;
pub mod secret_store;

pub use account_backend::{
    AccessTokenInfo, AccountBackendError, AccountBackendFactory, AccountBackendPort,
    AuthorizationStatus, BackendStateListener,
};
pub use secret_store::{SecretStoreError, SecretStorePort};
