use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::identity::{NormalizedIdentity, RawProfile};
use crate::provider::{OAuthProvider, build_auth_url_from_base};
use crate::token::{AUTHORIZATION_CODE, AccessTokenResponse, Fields, GRANT_TYPE, TokenRequest};
use anyhow::Context;
use async_trait::async_trait;
use oauth2::url::Url;
use oauth2::{AccessToken, AuthUrl, AuthorizationCode, CsrfToken, TokenUrl};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::instrument;

/// Base URL of the Pinterest API.
pub const PINTEREST_API_BASE_URL: &str = "https://api.pinterest.com";
const PINTEREST_AUTH_ENDPOINT: &str = "/oauth/";
const PINTEREST_TOKEN_ENDPOINT: &str = "/v1/oauth/token";
const PINTEREST_USER_ENDPOINT: &str = "/v1/me";
/// Profile fields requested from the user endpoint.
pub const PINTEREST_USER_FIELDS: [&str; 7] = [
    "id",
    "username",
    "url",
    "first_name",
    "last_name",
    "bio",
    "image",
];
/// Image size bucket used as the avatar.
const PINTEREST_AVATAR_SIZE: &str = "60x60";

/// [`OAuthProvider`] for Pinterest.
pub struct PinterestProvider {
    config: ProviderConfig,
    client: reqwest::Client,
    auth_url: AuthUrl,
    token_url: TokenUrl,
    user_url: Url,
}

impl PinterestProvider {
    /// Creates a provider talking to the public Pinterest API.
    ///
    /// The default HTTP client imposes no timeout of its own; use [`PinterestProvider::with_timeout`]
    /// or [`PinterestProvider::with_http_client`] to apply the host's policy.
    pub fn new(config: ProviderConfig) -> anyhow::Result<Self> {
        let client = reqwest::ClientBuilder::new()
            .user_agent(crate::APP_USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Self::with_endpoints(config, client, PINTEREST_API_BASE_URL)
    }

    /// Points all endpoints at a different API host, e.g. a staging or test server.
    pub fn with_api_base_url(self, api_base_url: &str) -> anyhow::Result<Self> {
        Self::with_endpoints(self.config, self.client, api_base_url)
    }

    /// Replaces the HTTP client with one provided by the host.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Rebuilds the default HTTP client with a request timeout.
    ///
    /// This replaces the current client, including one set through
    /// [`PinterestProvider::with_http_client`]. Hosts injecting their own client configure the
    /// timeout on that client instead.
    pub fn with_timeout(mut self, timeout: Duration) -> anyhow::Result<Self> {
        self.client = reqwest::ClientBuilder::new()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(self)
    }

    pub fn auth_url(&self) -> &Url {
        self.auth_url.url()
    }

    pub fn token_url(&self) -> &Url {
        self.token_url.url()
    }

    pub fn user_url(&self) -> &Url {
        &self.user_url
    }

    fn with_endpoints(
        config: ProviderConfig,
        client: reqwest::Client,
        api_base_url: &str,
    ) -> anyhow::Result<Self> {
        let api_base_url = api_base_url.trim_end_matches('/');

        let auth_url = AuthUrl::new(format!("{api_base_url}{PINTEREST_AUTH_ENDPOINT}"))
            .context("Invalid auth URL")?;

        let mut token_url = Url::parse(&format!("{api_base_url}{PINTEREST_TOKEN_ENDPOINT}"))
            .context("Invalid token URL")?;
        token_url
            .query_pairs_mut()
            .append_pair(GRANT_TYPE, AUTHORIZATION_CODE);
        let token_url = TokenUrl::from_url(token_url);

        let user_url = Url::parse(&format!("{api_base_url}{PINTEREST_USER_ENDPOINT}"))
            .context("Invalid user URL")?;

        Ok(Self {
            config,
            client,
            auth_url,
            token_url,
            user_url,
        })
    }

    /// Builds the token request on top of host default fields, the Pinterest `grant_type` taking
    /// precedence over any default.
    pub fn token_request_with_defaults(&self, defaults: Fields) -> TokenRequest {
        let fields = defaults.merge([(GRANT_TYPE, AUTHORIZATION_CODE)]);
        TokenRequest::new(self.token_url.url().clone(), fields)
    }

    #[instrument(level = "trace", skip_all, err)]
    async fn read_json(response: reqwest::Response) -> Result<Value, ProviderError> {
        let response = response.error_for_status()?;

        tracing::trace!(content_length = ?response.content_length(), "Parsing response body");
        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|err| ProviderError::malformed(format!("invalid JSON body: {err}")))
    }
}

#[async_trait]
impl OAuthProvider for PinterestProvider {
    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn build_authorization_url(&self, params: Fields, state: &CsrfToken) -> Url {
        build_auth_url_from_base(self.auth_url.url(), params, state)
    }

    fn build_token_request(&self, code: &AuthorizationCode) -> TokenRequest {
        self.token_request_with_defaults(self.token_fields(code))
    }

    #[instrument(level = "debug", skip_all, err)]
    async fn exchange_code(
        &self,
        code: AuthorizationCode,
    ) -> Result<AccessTokenResponse, ProviderError> {
        tracing::trace!("Exchanging OAuth2 code for token");
        let request = self.build_token_request(&code);

        let response = self
            .client
            .post(request.url().clone())
            .form(&request.form())
            .send()
            .await?;

        let body = Self::read_json(response).await?;
        serde_json::from_value(body)
            .map_err(|err| ProviderError::malformed(format!("invalid token response: {err}")))
    }

    #[instrument(level = "debug", skip_all, err)]
    async fn fetch_user(&self, access_token: &AccessToken) -> Result<RawProfile, ProviderError> {
        tracing::trace!("Performing HTTP request");
        let response = self
            .client
            .get(self.user_url.clone())
            .query(&[
                ("access_token", access_token.secret().as_str()),
                ("fields", PINTEREST_USER_FIELDS.join(",").as_str()),
            ])
            .send()
            .await?;

        match Self::read_json(response).await? {
            Value::Object(mut body) => match body.remove("data") {
                Some(Value::Object(data)) => {
                    tracing::debug!(fields = data.len(), "Successfully retrieved user profile");
                    Ok(RawProfile::new(data))
                }
                Some(_) => Err(ProviderError::malformed("`data` is not an object")),
                None => Err(ProviderError::malformed("missing `data` object")),
            },
            _ => Err(ProviderError::malformed("response body is not an object")),
        }
    }

    fn normalize(&self, raw: RawProfile) -> Result<NormalizedIdentity, ProviderError> {
        let user = serde_json::from_value::<PinterestUser>(raw.clone().into_value())
            .map_err(|err| ProviderError::malformed(format!("invalid user profile: {err}")))?;

        let avatar = user.image.get(PINTEREST_AVATAR_SIZE).ok_or_else(|| {
            ProviderError::malformed(format!("missing `{PINTEREST_AVATAR_SIZE}` image"))
        })?;

        Ok(NormalizedIdentity {
            provider_user_id: user.id,
            nickname: user.username,
            display_name: format!("{} {}", user.first_name, user.last_name),
            // Pinterest does not expose email addresses or full size avatars.
            email: None,
            avatar_url: avatar.url.clone(),
            avatar_original_url: None,
            raw,
        })
    }
}

#[derive(Deserialize, Debug)]
struct PinterestUser {
    id: String,
    username: String,
    #[serde(deserialize_with = "null_as_empty")]
    first_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    last_name: String,
    image: HashMap<String, PinterestImage>,
}

#[derive(Deserialize, Debug)]
struct PinterestImage {
    url: String,
}

/// Name parts may be `null` but must be present.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
