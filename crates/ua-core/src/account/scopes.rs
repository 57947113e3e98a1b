//! Canonical OAuth scopes the manager itself requests.
//!
//! Callers may pass arbitrary scope strings through `get_access_token`.

/// Scope granting read access to the user profile.
pub const PROFILE: &str = "profile";

/// Scope granting access to the sync key material.
pub const SYNC: &str = "sync:keys";
