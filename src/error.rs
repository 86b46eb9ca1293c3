//! Error types for the live alerts engine

use thiserror::Error;

#[cfg(test)]
mod tests;

pub type Result<T> = std::result::Result<T, AlertError>;

#[derive(Error, Debug)]
pub enum AlertError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Failed to parse identifier: {0}")]
    InvalidId(#[from] std::num::ParseIntError),

    #[error("Auth token not provided and {env_var} environment variable not set")]
    MissingAuthToken { env_var: String },

    #[error("Invalid value for {name}: {value}")]
    InvalidConfig { name: String, value: String },

    #[error("Live stats source returned no data")]
    NoData,

    #[error("Unknown event kind: {kind}")]
    InvalidEventKind { kind: String },

    #[error("Unknown notification channel: {channel}")]
    InvalidChannel { channel: String },

    #[error("Notification permission denied")]
    PermissionDenied,

    #[error("Notification worker not available at {path}")]
    WorkerUnavailable { path: String },

    #[error("Push subscription error: {message}")]
    Subscription { message: String },

    #[error("Notification delivery failed: {message}")]
    Delivery { message: String },
}
