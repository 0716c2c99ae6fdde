//! Client error types.

/// Errors that can occur when using the portal client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A required pattern was missing from a fetched page; the portal markup changed.
    #[error("could not find {pattern} in {page}")]
    Extraction {
        /// Pattern that was searched for.
        pattern: String,
        /// Page path that was searched.
        page: String,
    },

    /// Login was submitted but did not yield a session.
    #[error("login error: {0}. Please check your username/password")]
    Authentication(String),

    /// Resource calls kept returning non-JSON after re-authenticating.
    #[error("failed refreshing session: {0}")]
    Protocol(String),

    /// The portal reported an application error, or no data was available.
    #[error("API error: {0}")]
    Api(String),

    /// Caller supplied an unusable value.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not valid JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Response JSON did not have the expected shape.
    #[error("unexpected payload: {0}")]
    Payload(#[from] tsme_core::CoreError),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}
