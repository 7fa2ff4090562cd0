use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::identity::{NormalizedIdentity, RawProfile};
use crate::provider::{OAuthProvider, build_auth_url_from_base};
use crate::token::{AUTHORIZATION_CODE, AccessTokenResponse, Fields, GRANT_TYPE, TokenRequest};
use async_trait::async_trait;
use oauth2::url::Url;
use oauth2::{AccessToken, AuthorizationCode, CsrfToken};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::instrument;

static MOCK_BASE_URL: LazyLock<Url> =
    LazyLock::new(|| Url::parse("http://localhost/oauth/").expect("valid mock URL"));

/// In-memory [`OAuthProvider`] for host tests.
///
/// Authorization codes map to access tokens, access tokens map to raw profiles. Profiles are
/// normalized by reading `id`, `username` and `name` as plain strings. Unknown codes and tokens are
/// reported as [`ProviderError::MalformedResponse`].
pub struct MockOAuthProvider {
    config: ProviderConfig,
    codes: HashMap<String, String>,
    users: HashMap<String, RawProfile>,
}

impl MockOAuthProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            codes: HashMap::new(),
            users: HashMap::new(),
        }
    }

    pub fn with_code(mut self, code: &str, access_token: &str) -> Self {
        self.codes.insert(code.to_string(), access_token.to_string());
        self
    }

    pub fn with_user(mut self, access_token: &str, profile: RawProfile) -> Self {
        self.users.insert(access_token.to_string(), profile);
        self
    }
}

#[async_trait]
impl OAuthProvider for MockOAuthProvider {
    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn build_authorization_url(&self, params: Fields, state: &CsrfToken) -> Url {
        build_auth_url_from_base(&MOCK_BASE_URL, params, state)
    }

    fn build_token_request(&self, code: &AuthorizationCode) -> TokenRequest {
        TokenRequest::new(
            MOCK_BASE_URL.clone(),
            self.token_fields(code)
                .merge([(GRANT_TYPE, AUTHORIZATION_CODE)]),
        )
    }

    #[instrument(level = "debug", skip_all, err)]
    async fn exchange_code(
        &self,
        code: AuthorizationCode,
    ) -> Result<AccessTokenResponse, ProviderError> {
        let access_token = self
            .codes
            .get(code.secret())
            .ok_or_else(|| ProviderError::malformed("invalid authorization code"))?;

        Ok(AccessTokenResponse {
            access_token: AccessToken::new(access_token.clone()),
            token_type: Some("bearer".to_string()),
        })
    }

    #[instrument(level = "debug", skip_all, err)]
    async fn fetch_user(&self, access_token: &AccessToken) -> Result<RawProfile, ProviderError> {
        self.users
            .get(access_token.secret())
            .cloned()
            .ok_or_else(|| ProviderError::malformed("invalid access token"))
    }

    fn normalize(&self, raw: RawProfile) -> Result<NormalizedIdentity, ProviderError> {
        let field = |key: &str| {
            raw.get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| ProviderError::malformed(format!("missing `{key}`")))
        };

        Ok(NormalizedIdentity {
            provider_user_id: field("id")?,
            nickname: field("username")?,
            display_name: field("name")?,
            email: None,
            avatar_url: field("avatar").unwrap_or_default(),
            avatar_original_url: None,
            raw,
        })
    }
}
