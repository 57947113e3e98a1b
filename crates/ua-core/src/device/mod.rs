//! Device constellation domain models.

pub mod capability;
pub mod device;
pub mod event;
pub mod state;
pub mod value_objects;

pub use capability::{DeviceCapability, DeviceType};
pub use device::{Device, DevicePushSubscription};
pub use event::{DeviceEvent, DeviceEventOutgoing, TabEntry};
pub use state::ConstellationState;
pub use value_objects::DeviceId;
