//! # ua-core
//!
//! Core domain models and business logic for the UniAccount manager.
//!
//! This crate contains the account lifecycle state machine, the device
//! constellation data model, and the port interfaces for the external
//! collaborators (account backend, secret store). It is pure domain logic
//! without any infrastructure dependencies.

pub mod account;
pub mod device;
pub mod error;
pub mod ports;

// Re-export commonly used types at the crate root
pub use account::{
    AccountAction, AccountConfig, AccountEvent, AccountState, AccountStateMachine, AuthData,
    AuthType, Avatar, DeviceConfig, Profile,
};
pub use device::{
    ConstellationState, Device, DeviceCapability, DeviceEvent, DeviceEventOutgoing, DeviceId,
    DevicePushSubscription, DeviceType, TabEntry,
};
pub use error::AccountManagerError;
