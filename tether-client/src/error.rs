use thiserror::Error;

/// Transport-level failures talking to the Admin API.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid Admin API URL \"{url}\": {reason}")]
    Url { url: String, reason: String },

    #[error("invalid header \"{0}\"")]
    Header(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),
}
