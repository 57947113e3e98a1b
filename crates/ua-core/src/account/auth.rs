use serde::{Deserialize, Serialize};
use url::Url;

/// How a sign-in was reached.
///
/// `ExistingAccount` and `Recovered` are produced internally (cold-start
/// restore and silent recovery); the remaining variants are derived from the
/// OAuth redirect's `action` query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    ExistingAccount,
    Signin,
    Signup,
    Pairing,
    Recovered,
    Other(String),
}

impl AuthType {
    /// Derive the auth type from the redirect's `action` query parameter.
    pub fn from_action(action: &str) -> Self {
        match action {
            "signin" => AuthType::Signin,
            "signup" => AuthType::Signup,
            "pairing" => AuthType::Pairing,
            other => AuthType::Other(other.to_string()),
        }
    }
}

/// Parameters captured from the OAuth redirect by the embedding UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthData {
    pub code: String,
    pub state: String,
    pub auth_type: AuthType,
}

impl AuthData {
    /// Build auth data from the query parameters the embedder captured off
    /// the redirect URL.
    pub fn from_redirect_params(
        code: impl Into<String>,
        state: impl Into<String>,
        action: Option<&str>,
    ) -> Self {
        Self {
            code: code.into(),
            state: state.into(),
            auth_type: action
                .map(AuthType::from_action)
                .unwrap_or_else(|| AuthType::Other(String::new())),
        }
    }
}

/// Extract the `state` query parameter from an OAuth flow URL, verbatim.
///
/// The value is compared byte-for-byte against the redirect later, so no
/// normalization happens here.
pub fn oauth_state_param(flow_url: &str) -> Option<String> {
    let url = Url::parse(flow_url).ok()?;
    url.query_pairs()
        .find(|(name, _)| name == "state")
        .map(|(_, value)| value.into_owned())
}
