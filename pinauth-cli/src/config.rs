use anyhow::Context;
use config::{Config, Environment, File};
use pinauth_pinterest::pinterest::PINTEREST_API_BASE_URL;
use pinauth_pinterest::{PinterestProvider, ProviderConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AppConfig {
    pub pinterest: PinterestConfig,
}

impl AppConfig {
    /// Loads the configuration from the built-in defaults, `/etc/pinauth/config.toml`,
    /// `./config.toml` and `PINAUTH_*` environment variables, later sources taking precedence.
    pub fn parse() -> anyhow::Result<Self> {
        Self::from_config(
            Config::builder()
                .add_source(Config::try_from(&AppConfig::default())?)
                .add_source(
                    File::with_name(config_file_path("config.toml")?.as_str()).required(false),
                )
                .add_source(File::with_name("config.toml").required(false))
                .add_source(
                    Environment::with_prefix("pinauth")
                        .prefix_separator("_")
                        .separator("__")
                        .try_parsing(true),
                )
                .build()
                .context("Failed to build config")?,
        )
    }

    fn from_config(config: Config) -> anyhow::Result<Self> {
        let config = config
            .try_deserialize::<Self>()
            .context("Failed to deserialize config")?;

        if config.pinterest.client_id.is_empty() {
            anyhow::bail!("Pinterest client ID is empty");
        } else if config.pinterest.client_secret.is_empty() {
            anyhow::bail!("Pinterest client secret is empty");
        }

        Ok(config)
    }
}

pub fn config_file_path(file_name: impl AsRef<Path>) -> anyhow::Result<String> {
    Ok(Path::new("/etc")
        .join("pinauth")
        .join(file_name)
        .to_str()
        .context("Failed to build config file path")?
        .to_string())
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PinterestConfig {
    pub api_base_url: String,
    pub redirect_uri: String,
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<String>,
    /// Request timeout, no timeout if unset.
    pub timeout_millis: Option<u64>,
}

impl Default for PinterestConfig {
    fn default() -> Self {
        Self {
            api_base_url: PINTEREST_API_BASE_URL.to_string(),
            redirect_uri: "https://localhost/auth/pinterest/callback".to_string(),
            client_id: "".to_string(),
            client_secret: "".to_string(),
            scopes: vec!["read_public".to_string()],
            timeout_millis: None,
        }
    }
}

impl PinterestConfig {
    pub fn provider(&self) -> anyhow::Result<PinterestProvider> {
        let config = ProviderConfig::new(
            self.client_id.as_str(),
            self.client_secret.as_str(),
            self.redirect_uri.as_str(),
        )?
        .with_scopes(self.scopes.iter().cloned());

        let provider = PinterestProvider::new(config)?.with_api_base_url(&self.api_base_url)?;
        match self.timeout_millis {
            Some(timeout) => provider.with_timeout(Duration::from_millis(timeout)),
            None => Ok(provider),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use pinauth_pinterest::OAuthProvider;
    use pretty_assertions::assert_eq;

    fn load(toml: &str) -> anyhow::Result<AppConfig> {
        AppConfig::from_config(
            Config::builder()
                .add_source(Config::try_from(&AppConfig::default())?)
                .add_source(File::from_str(toml, FileFormat::Toml))
                .build()?,
        )
    }

    #[test]
    fn parse_file() -> anyhow::Result<()> {
        let config = load(
            r#"
            [pinterest]
            client_id = "client1"
            client_secret = "secret1"
            scopes = ["read_public", "write_public"]
            timeout_millis = 2500
            "#,
        )?;

        assert_eq!(config.pinterest.client_id, "client1");
        assert_eq!(config.pinterest.api_base_url, "https://api.pinterest.com");
        assert_eq!(config.pinterest.scopes, vec!["read_public", "write_public"]);
        assert_eq!(config.pinterest.timeout_millis, Some(2500));
        Ok(())
    }

    #[test]
    fn empty_client_id() {
        let result = load("[pinterest]\nclient_secret = \"secret1\"");

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("client ID is empty")
        );
    }

    #[test]
    fn empty_client_secret() {
        let result = load("[pinterest]\nclient_id = \"client1\"");

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("client secret is empty")
        );
    }

    #[test]
    fn build_provider() -> anyhow::Result<()> {
        let config = PinterestConfig {
            api_base_url: "http://localhost:8080".to_string(),
            client_id: "client1".to_string(),
            client_secret: "secret1".to_string(),
            ..Default::default()
        };

        let provider = config.provider()?;

        assert_eq!(provider.user_url().as_str(), "http://localhost:8080/v1/me");
        assert_eq!(provider.config().client_id.as_str(), "client1");
        assert_eq!(provider.config().scopes.len(), 1);
        Ok(())
    }
}
