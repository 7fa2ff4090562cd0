use oauth2::url::Url;
use oauth2::AccessToken;
use serde::Deserialize;

pub const GRANT_TYPE: &str = "grant_type";
pub const AUTHORIZATION_CODE: &str = "authorization_code";

/// Ordered set of form or query fields.
///
/// Inserting an existing key replaces its value in place, which gives later layers (the provider)
/// precedence over earlier ones (the host defaults) without reordering the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(String, String)>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(index).1)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Merges `overrides` on top of `self`, overriding values of existing keys.
    pub fn merge<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in overrides {
            self.insert(key, value);
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Fields {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Fields::new().merge(iter)
    }
}

/// Token-exchange request for the authorization-code grant.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenRequest {
    url: Url,
    fields: Fields,
}

impl TokenRequest {
    pub fn new(url: Url, fields: Fields) -> Self {
        Self { url, fields }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn grant_type(&self) -> Option<&str> {
        self.fields.get(GRANT_TYPE)
    }

    pub fn code(&self) -> Option<&str> {
        self.fields.get("code")
    }

    /// Form fields for the POST body.
    pub fn form(&self) -> Vec<(&str, &str)> {
        self.fields.iter().collect()
    }
}

impl std::fmt::Debug for TokenRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.fields.iter().map(|(k, _)| k).collect();
        f.debug_struct("TokenRequest")
            .field("url", &self.url.as_str())
            .field("fields", &fields)
            .finish()
    }
}

/// Successful answer of the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: AccessToken,
    #[serde(default)]
    pub token_type: Option<String>,
}
