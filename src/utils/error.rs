//! The `error` module defines the error types used within `sendqueue`.
//!
//! `ParseError` covers payloads the coalescing rules cannot interpret. It never
//! leaves `SenderQueue::enqueue`; the queue falls back to a plain append.
//! `Error` is what the server binary and the transport layer propagate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("expected a `tile:` command, found `{0}`")]
    NotATile(String),

    #[error("tile descriptor is missing `{0}`")]
    MissingField(&'static str),

    #[error("invalid value `{value}` for tile field `{field}`")]
    InvalidField { field: &'static str, value: String },

    #[error("payload is not valid UTF-8")]
    NotUtf8,

    #[error("payload carries no JSON object")]
    NoJson,

    #[error("malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON payload has no `{0}` field")]
    MissingJsonField(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
