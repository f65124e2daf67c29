use reqwest::StatusCode;
use reqwest::header::InvalidHeaderValue;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A body was present but did not decode into the expected shape.
    #[error("json decode failed: {0}")]
    Json(#[from] serde_json::Error),
    /// Network or connection failure, including failure to read a response body.
    #[error("http transport failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request failed with status {0}: '{1}'")]
    UnexpectedStatus(StatusCode, String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),
    #[error("access token fetch failed: {0}")]
    TokenFetch(String),
    #[error("access token could not be fetched: {0}")]
    Initialization(#[source] Box<Error>),
    #[error("token refresher is already running")]
    AlreadyRunning,
    /// Background work was requested outside of a tokio runtime.
    #[error("no tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
    #[error("config error: {0}")]
    Config(String),
}
