use anyhow::Context;
use clap::Subcommand;
use oauth2::{AccessToken, AuthorizationCode, CsrfToken};
use pinauth_pinterest::OAuthProvider;
use serde_json::json;
use tracing::instrument;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the authorization URL to redirect the user to
    Authorize {
        /// Anti-forgery state to embed, a random one is generated if omitted
        #[arg(long)]
        state: Option<String>,
    },
    /// Exchange an authorization code for an access token
    Exchange {
        #[arg(long)]
        code: String,
    },
    /// Fetch the normalized profile of an access token's owner
    User {
        #[arg(long)]
        access_token: String,
    },
    /// Exchange an authorization code and fetch the user in one go
    Login {
        #[arg(long)]
        code: String,
    },
}

/// Runs `command` against `provider` and returns the text to print.
#[instrument(level = "debug", skip_all, err)]
pub async fn execute(command: Command, provider: &dyn OAuthProvider) -> anyhow::Result<String> {
    match command {
        Command::Authorize { state } => {
            let state = state.map(CsrfToken::new).unwrap_or_else(CsrfToken::new_random);
            let url = provider.build_authorization_url(provider.authorization_params(), &state);
            Ok(format!("{url}\nstate: {}", state.secret()))
        }
        Command::Exchange { code } => {
            let response = provider
                .exchange_code(AuthorizationCode::new(code))
                .await
                .context("Failed to exchange authorization code")?;
            to_json(&json!({
                "access_token": response.access_token.secret(),
                "token_type": response.token_type,
            }))
        }
        Command::User { access_token } => {
            let identity = provider
                .user(&AccessToken::new(access_token))
                .await
                .context("Failed to fetch user")?;
            to_json(&identity)
        }
        Command::Login { code } => {
            let user = provider
                .login(AuthorizationCode::new(code))
                .await
                .context("Failed to complete login")?;
            to_json(&json!({
                "access_token": user.access_token.secret(),
                "identity": user.identity,
            }))
        }
    }
}

fn to_json(value: &impl serde::Serialize) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinauth_pinterest::mock::MockOAuthProvider;
    use pinauth_pinterest::{ProviderConfig, RawProfile};
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use test_log::test;

    fn provider() -> MockOAuthProvider {
        let profile = match json!({"id": "7", "username": "carol", "name": "Carol White"}) {
            Value::Object(map) => RawProfile::new(map),
            _ => unreachable!(),
        };

        MockOAuthProvider::new(
            ProviderConfig::new("client1", "secret1", "https://app.example/callback")
                .unwrap()
                .with_scopes(["read_public"]),
        )
        .with_code("code1", "access_token1")
        .with_user("access_token1", profile)
    }

    #[test(tokio::test)]
    async fn authorize_with_state() -> anyhow::Result<()> {
        let output = execute(
            Command::Authorize {
                state: Some("state1".to_string()),
            },
            &provider(),
        )
        .await?;

        assert_eq!(
            output,
            "http://localhost/oauth/?client_id=client1\
             &redirect_uri=https%3A%2F%2Fapp.example%2Fcallback\
             &scope=read_public&response_type=code&state=state1\nstate: state1"
        );
        Ok(())
    }

    #[test(tokio::test)]
    async fn authorize_generates_state() -> anyhow::Result<()> {
        let output = execute(Command::Authorize { state: None }, &provider()).await?;

        let state = output
            .lines()
            .nth(1)
            .and_then(|line| line.strip_prefix("state: "))
            .context("missing state line")?;
        assert!(!state.is_empty());
        assert!(output.contains(&format!("&state={state}")));
        Ok(())
    }

    #[test(tokio::test)]
    async fn exchange() -> anyhow::Result<()> {
        let output = execute(
            Command::Exchange {
                code: "code1".to_string(),
            },
            &provider(),
        )
        .await?;

        let value: Value = serde_json::from_str(&output)?;
        assert_eq!(value["access_token"], "access_token1");
        Ok(())
    }

    #[test(tokio::test)]
    async fn user() -> anyhow::Result<()> {
        let output = execute(
            Command::User {
                access_token: "access_token1".to_string(),
            },
            &provider(),
        )
        .await?;

        let value: Value = serde_json::from_str(&output)?;
        assert_eq!(value["provider_user_id"], "7");
        assert_eq!(value["display_name"], "Carol White");
        assert_eq!(value["email"], Value::Null);
        assert_eq!(value["raw"]["username"], "carol");
        Ok(())
    }

    #[test(tokio::test)]
    async fn login_unknown_code() {
        let result = execute(
            Command::Login {
                code: "code2".to_string(),
            },
            &provider(),
        )
        .await;

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to complete login")
        );
    }
}
