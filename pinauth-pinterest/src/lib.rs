//! Pinterest OAuth2 identity provider.
//!
//! [`PinterestProvider`] implements the [`OAuthProvider`] capability trait, which a host
//! application drives through the authorization-code flow: redirect the user to
//! [`OAuthProvider::build_authorization_url`], exchange the returned code using
//! [`OAuthProvider::exchange_code`] and resolve the user with [`OAuthProvider::user`].
//!
//! The host owns the anti-forgery `state` parameter, sessions and routing.

pub mod config;
pub mod error;
pub mod identity;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod pinterest;
pub mod provider;
pub mod token;

pub use config::ProviderConfig;
pub use error::ProviderError;
pub use identity::{AuthenticatedUser, NormalizedIdentity, RawProfile};
pub use pinterest::PinterestProvider;
pub use provider::OAuthProvider;
pub use token::{AccessTokenResponse, TokenRequest};

/// User-Agent string used for all HTTP requests.
static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
