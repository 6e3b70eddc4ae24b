//! Error types for worksite-core

use thiserror::Error;

/// Top-level error type for worksite-core
#[derive(Error, Debug)]
pub enum WorksiteError {
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors surfaced by resource services and the API client
#[derive(Error, Debug)]
pub enum ServiceError {
    /// No token, or the server rejected it. The token has already been
    /// cleared and the OAuth redirect issued when this is returned.
    #[error("authentication required")]
    AuthRequired,

    /// Non-2xx response other than 401
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The request never produced a response (offline, DNS, TLS)
    #[error("network failure: {0}")]
    Network(#[from] TransportError),

    /// The response body did not have the expected shape
    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ServiceError {
    /// Returns true for the auth-required class of failures
    pub fn is_auth_required(&self) -> bool {
        matches!(self, ServiceError::AuthRequired)
    }

    /// Returns true when the server answered 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Api { status: 404, .. })
    }

    /// HTTP status of the failed response, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Api { status, .. } => Some(*status),
            ServiceError::AuthRequired => Some(401),
            _ => None,
        }
    }

    /// Text suitable for a dismissible banner.
    ///
    /// Server validation messages are shown verbatim; network failures
    /// collapse to a generic message.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Api { message, .. } => message.clone(),
            ServiceError::AuthRequired => "Please sign in to continue".to_string(),
            ServiceError::Network(_) => {
                "Unable to reach the server. Check your connection and retry.".to_string()
            }
            ServiceError::Decode(_) => "The server returned an unexpected response".to_string(),
            ServiceError::InvalidRequest(msg) => msg.clone(),
        }
    }
}

/// Errors from the HTTP transport layer
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("no route for {method} {path}")]
    NoRoute { method: String, path: String },
}

/// Errors from the persisted key/value store
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to read store: {0}")]
    Read(String),

    #[error("failed to write store: {0}")]
    Write(String),

    #[error("failed to encode value for {key}: {message}")]
    Encode { key: String, message: String },
}

/// Errors from loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid base url {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },

    #[error("failed to install log subscriber: {0}")]
    Logging(String),
}
