use thiserror::Error;

/// Errors returned by the BMLT Admin API client.
#[derive(Debug, Error)]
pub enum BmltError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid BMLT base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The API answered with a status the endpoint does not expect.
    #[error("unexpected HTTP status {status} from {url}: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    /// Login succeeded at the HTTP level but no token was found in any of
    /// the known envelope shapes.
    #[error("login response did not contain a token")]
    MissingToken,

    /// The login endpoint kept redirecting past the follow limit.
    #[error("login exceeded {limit} redirects")]
    TooManyRedirects { limit: usize },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
