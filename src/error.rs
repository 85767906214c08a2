//! Error types for the signatures proxy.
//!
//! Defines the main error enum shared by the snapshot script and the HTTP service.

use thiserror::Error;

/// Main error type for signatures proxy operations.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Database connection errors (host unreachable, auth failed, TLS, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution errors (missing tables, type mismatches, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Gist API errors (bad token, unknown gist, non-success status, etc.)
    #[error("Publish error: {0}")]
    Publish(String),

    /// JSON encoding errors.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration errors (invalid config file, missing required fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (I/O, server bootstrap, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a publish error with the given message.
    pub fn publish(msg: impl Into<String>) -> Self {
        Self::Publish(msg.into())
    }

    /// Creates a serialization error with the given message.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Publish(_) => "Publish Error",
            Self::Serialization(_) => "Serialization Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns a stable, identifier-like name for the error kind.
    ///
    /// Used as `error_type` in HTTP error bodies.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Connection(_) => "ConnectionError",
            Self::Query(_) => "QueryError",
            Self::Publish(_) => "PublishError",
            Self::Serialization(_) => "SerializationError",
            Self::Config(_) => "ConfigError",
            Self::Internal(_) => "InternalError",
        }
    }
}

impl From<serde_json::Error> for ProxyError {
    fn from(e: serde_json::Error) -> Self {
        Self::serialization(e.to_string())
    }
}

/// Result type alias using ProxyError.
pub type Result<T> = std::result::Result<T, ProxyError>;
