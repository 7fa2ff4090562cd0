use oauth2::AccessToken;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Profile object exactly as returned by the provider's user endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawProfile(Map<String, Value>);

impl RawProfile {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Provider-agnostic view of an authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedIdentity {
    pub provider_user_id: String,
    pub nickname: String,
    pub display_name: String,
    pub email: Option<String>,
    pub avatar_url: String,
    pub avatar_original_url: Option<String>,
    pub raw: RawProfile,
}

/// Outcome of a completed authorization-code login.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub identity: NormalizedIdentity,
    pub access_token: AccessToken,
}
