use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The HTTP request failed or the remote API answered with a non-success status.
    #[error("remote API error: {0}")]
    RemoteApi(#[from] reqwest::Error),
    /// The remote API answered, but the body did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse(reason.into())
    }
}
