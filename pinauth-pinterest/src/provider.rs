use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::identity::{AuthenticatedUser, NormalizedIdentity, RawProfile};
use crate::token::{AccessTokenResponse, Fields, TokenRequest};
use async_trait::async_trait;
use oauth2::url::Url;
use oauth2::{AccessToken, AuthorizationCode, CsrfToken};
use tracing::instrument;

pub const STATE: &str = "state";

/// Capabilities a host needs from an OAuth2 identity provider to run the authorization-code flow.
///
/// Implementors supply the provider-specific endpoints and profile mapping; the provided methods
/// assemble the host default parameters and chain the individual steps.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    fn config(&self) -> &ProviderConfig;

    /// Separator placed between scopes in the `scope` authorization parameter.
    fn scope_separator(&self) -> &str {
        ","
    }

    /// Base query parameters of the authorization redirect, without `state`.
    fn authorization_params(&self) -> Fields {
        let config = self.config();
        let scope = config
            .scopes
            .iter()
            .map(|scope| scope.as_str())
            .collect::<Vec<_>>()
            .join(self.scope_separator());

        Fields::new()
            .with("client_id", config.client_id.as_str())
            .with("redirect_uri", config.redirect_uri.as_str())
            .with("scope", scope)
            .with("response_type", "code")
    }

    /// Default form fields of the token-exchange request.
    fn token_fields(&self, code: &AuthorizationCode) -> Fields {
        let config = self.config();
        Fields::new()
            .with("client_id", config.client_id.as_str())
            .with("client_secret", config.client_secret.secret().as_str())
            .with("code", code.secret().as_str())
            .with("redirect_uri", config.redirect_uri.as_str())
    }

    fn build_authorization_url(&self, params: Fields, state: &CsrfToken) -> Url;

    fn build_token_request(&self, code: &AuthorizationCode) -> TokenRequest;

    async fn exchange_code(
        &self,
        code: AuthorizationCode,
    ) -> Result<AccessTokenResponse, ProviderError>;

    async fn fetch_user(&self, access_token: &AccessToken) -> Result<RawProfile, ProviderError>;

    fn normalize(&self, raw: RawProfile) -> Result<NormalizedIdentity, ProviderError>;

    /// Fetches and normalizes the user owning `access_token`.
    #[instrument(level = "debug", skip_all, err)]
    async fn user(&self, access_token: &AccessToken) -> Result<NormalizedIdentity, ProviderError> {
        let raw = self.fetch_user(access_token).await?;
        self.normalize(raw)
    }

    /// Completes a login from the authorization code received on the callback.
    #[instrument(level = "debug", skip_all, err)]
    async fn login(&self, code: AuthorizationCode) -> Result<AuthenticatedUser, ProviderError> {
        let token = self.exchange_code(code).await?;
        let identity = self.user(&token.access_token).await?;

        tracing::debug!(provider_user_id = ?identity.provider_user_id, "Login completed");
        Ok(AuthenticatedUser {
            identity,
            access_token: token.access_token,
        })
    }
}

/// Appends `params` and `state` to the query of `base`.
///
/// A `state` contained in `params` is dropped, so the resulting URL carries exactly the given one.
pub fn build_auth_url_from_base(base: &Url, mut params: Fields, state: &CsrfToken) -> Url {
    params.remove(STATE);

    let mut url = base.clone();
    url.query_pairs_mut()
        .extend_pairs(params.iter())
        .append_pair(STATE, state.secret());
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base() -> Url {
        Url::parse("https://api.pinterest.com/oauth/").unwrap()
    }

    #[test]
    fn appends_params_and_state() {
        let params = Fields::new()
            .with("client_id", "client")
            .with("response_type", "code");

        let url = build_auth_url_from_base(&base(), params, &CsrfToken::new("abc".to_string()));

        assert_eq!(
            url.as_str(),
            "https://api.pinterest.com/oauth/?client_id=client&response_type=code&state=abc"
        );
    }

    #[test]
    fn replaces_state_from_params() {
        let params = Fields::new()
            .with(STATE, "forged")
            .with("client_id", "client");

        let url = build_auth_url_from_base(&base(), params, &CsrfToken::new("abc".to_string()));

        let states: Vec<_> = url
            .query_pairs()
            .filter(|(k, _)| k == STATE)
            .map(|(_, v)| v.into_owned())
            .collect();
        assert_eq!(states, vec!["abc".to_string()]);
    }

    #[test]
    fn encodes_state() {
        let url = build_auth_url_from_base(
            &base(),
            Fields::new(),
            &CsrfToken::new("a b&c=d".to_string()),
        );

        assert_eq!(url.query(), Some("state=a+b%26c%3Dd"));
        assert_eq!(
            url.query_pairs().next().map(|(_, v)| v.into_owned()),
            Some("a b&c=d".to_string())
        );
    }
}
