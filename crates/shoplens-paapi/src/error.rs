use thiserror::Error;

/// Errors returned by the PAAPI client.
#[derive(Debug, Error)]
pub enum PaapiError {
    /// Network or TLS failure from the underlying HTTP client, including
    /// request timeouts and non-2xx statuses.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned an `Errors` array with a request-level error code.
    #[error("PAAPI error {code}: {message}")]
    Api { code: String, message: String },

    /// The response body could not be deserialized into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
