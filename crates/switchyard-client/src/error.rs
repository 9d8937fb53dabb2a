//! Error types for switchyard-client

use thiserror::Error;

/// Result type alias for switchyard-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur talking to the store or the compute platform.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from switchyard-core
    #[error("Core error: {0}")]
    Core(#[from] switchyard_core::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote service answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Status {
        /// Response status code
        status: u16,
        /// Service-provided message, or the raw body
        message: String,
    },

    /// Reading a local entry file failed
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that could not be read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parse error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configured endpoint is not a usable base URL
    #[error("Invalid endpoint '{endpoint}': {message}")]
    InvalidEndpoint {
        /// Endpoint as configured
        endpoint: String,
        /// Why it was rejected
        message: String,
    },

    /// Entry file has an extension we cannot parse
    #[error("Unsupported entry file format: {0}")]
    UnsupportedFormat(String),
}

impl Error {
    /// Convert into the core error reported by the config store port.
    pub fn into_store_error(self, context: &str) -> switchyard_core::Error {
        match self {
            Error::Core(inner) => inner,
            other => switchyard_core::Error::store_with_source(context, other),
        }
    }

    /// Convert into the core error reported by the compute port.
    pub fn into_invocation_error(self) -> switchyard_core::Error {
        match self {
            Error::Core(inner) => inner,
            other => switchyard_core::Error::invocation(other.to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = Error::Status {
            status: 400,
            message: "ValidationException".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 400: ValidationException");
    }

    #[test]
    fn test_into_store_error_keeps_source() {
        let err = Error::UnsupportedFormat("yaml".to_string()).into_store_error("listing failed");
        assert!(matches!(err, switchyard_core::Error::Store { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_into_invocation_error_unwraps_core() {
        let core = switchyard_core::Error::tool_not_found("x");
        let err = Error::from(core).into_invocation_error();
        assert!(matches!(err, switchyard_core::Error::ToolNotFound { .. }));
    }
}
