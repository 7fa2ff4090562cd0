use anyhow::Context;
use oauth2::{ClientId, ClientSecret, RedirectUrl, Scope};

/// Client credentials and callback registered with the provider.
///
/// Built once by the host and never modified afterwards, so a single instance can be shared
/// between concurrent logins. The client secret is redacted from the [`Debug`] output.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub client_id: ClientId,
    pub client_secret: ClientSecret,
    pub redirect_uri: RedirectUrl,
    pub scopes: Vec<Scope>,
}

impl ProviderConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            client_id: ClientId::new(client_id.into()),
            client_secret: ClientSecret::new(client_secret.into()),
            redirect_uri: RedirectUrl::new(redirect_uri.into()).context("Invalid redirect URL")?,
            scopes: Vec::new(),
        })
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(|s| Scope::new(s.into())).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_config() -> anyhow::Result<()> {
        let config = ProviderConfig::new("client", "secret", "https://app.example/callback")?
            .with_scopes(["read_public", "write_public"]);

        assert_eq!(config.client_id.as_str(), "client");
        assert_eq!(config.client_secret.secret(), "secret");
        assert_eq!(
            config.redirect_uri.as_str(),
            "https://app.example/callback"
        );
        assert_eq!(
            config.scopes,
            vec![
                Scope::new("read_public".to_string()),
                Scope::new("write_public".to_string())
            ]
        );
        Ok(())
    }

    #[test]
    fn invalid_redirect_uri() {
        let result = ProviderConfig::new("client", "secret", "not a url");

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .chain()
                .any(|e| e.to_string().contains("Invalid redirect URL"))
        );
    }

    #[test]
    fn debug_redacts_secret() -> anyhow::Result<()> {
        let config = ProviderConfig::new("client", "hunter2", "https://app.example/callback")?;

        assert!(!format!("{config:?}").contains("hunter2"));
        Ok(())
    }
}
