//! Error types for the enrollment API client.
//!
//! # Design
//! `ApiError` is the raw cause of a failed call: transport trouble, a non-2xx
//! status, or an undecodable body. DAOs never hand it out directly; they wrap
//! it in `DaoError`, whose display string is the single human-readable
//! message chosen by `message::extract`. The raw cause stays reachable through
//! `source()` for logging.

use crate::message;

/// Raw failure of a single HTTP round-trip.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, ...).
    #[error("request failed: {0}")]
    Transport(String),

    /// The transport gave up waiting for the backend.
    #[error("request timed out")]
    Timeout,

    /// The backend returned 404.
    #[error("resource not found")]
    NotFound { body: String },

    /// The backend returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be decoded into the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be encoded to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Body the backend sent with an error status, if any.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            ApiError::NotFound { body } | ApiError::Http { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// User-facing failure of a DAO operation.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct DaoError {
    message: String,
    #[source]
    source: ApiError,
}

impl DaoError {
    /// Wrap `source`, picking the message from the backend body when it
    /// carries one and `fallback` otherwise.
    pub fn new(source: ApiError, fallback: &str) -> Self {
        let message = message::extract(source.response_body(), fallback);
        Self { message, source }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> &ApiError {
        &self.source
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.source, ApiError::NotFound { .. })
    }
}
