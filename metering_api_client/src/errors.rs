use thiserror::Error;

pub use reqwest::StatusCode;

/// Errors that can occur while talking to the vendor API.
#[derive(Debug, Error)]
pub enum ApiClientError {
    /// Transport-level failure (connect, timeout, body read/decode).
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-success status. `message` carries the
    /// upstream JSON `message` field when the body provided one.
    #[error("Error response {status} while requesting {url}: {message}")]
    Status {
        /// HTTP status of the response.
        status: StatusCode,
        /// Full request URL.
        url: String,
        /// Upstream-provided error message, possibly empty.
        message: String,
    },
}

/// Errors constructing a client.
#[derive(Debug, Error)]
pub enum ClientInitError {
    /// Required credential material is absent from the environment.
    #[error(transparent)]
    Env(#[from] shared_utils::env::EnvVarError),

    /// The API key cannot be encoded into an `Authorization` header.
    #[error("API key is not a valid header value")]
    InvalidApiKey(#[from] reqwest::header::InvalidHeaderValue),

    /// The underlying HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
