//! Error types shared across the crate.

use thiserror::Error;

use crate::task::TaskId;

/// A failed gateway call.
///
/// Callers treat every variant the same way ("network/server failure"); the
/// variants only exist so the log line says what went wrong.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {url} returned {status}")]
    Status {
        method: reqwest::Method,
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// A rejected editor transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("the editor is already open")]
    AlreadyOpen,
    #[error("the editor is closed")]
    Closed,
    #[error("a save is already in flight")]
    SaveInFlight,
    #[error("task has no id and cannot be edited as an existing task")]
    MissingId,
    #[error("task #{0} is not in the list")]
    UnknownTask(TaskId),
}

/// Invalid startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("API URL '{0}' must use http or https")]
    UnsupportedScheme(String),
}
