//! # ua-app
//!
//! Orchestration layer for the UniAccount manager: the [`AccountManager`]
//! public surface, the [`DeviceConstellation`], the persistence coordinator
//! bridging the backend's persist hook to the secret store, the
//! serialization gate, and the observer dispatch lane.

pub mod constellation;
pub mod gate;
pub mod manager;
pub mod observers;
pub mod persistence;

pub use constellation::DeviceConstellation;
pub use gate::OpGate;
pub use manager::AccountManager;
pub use observers::{AccountObserver, DeviceConstellationObserver, DeviceEventsObserver};
