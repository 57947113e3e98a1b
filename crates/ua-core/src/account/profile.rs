use serde::{Deserialize, Serialize};

/// User profile as reported by the account backend.
///
/// Cached by the manager; present only while the account is in an
/// authenticated-with-profile or authentication-problem state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub uid: String,
    pub email: String,
    pub avatar: Option<Avatar>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Avatar {
    pub url: String,
    pub is_default: bool,
}
