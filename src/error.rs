use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("cookie string is missing {0}")]
    MissingCookie(&'static str),

    #[error("invalid UID {0:?}: must be digits only, at least 8 characters")]
    InvalidUid(String),
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API request failed: {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}
