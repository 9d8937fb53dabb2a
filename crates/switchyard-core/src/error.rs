//! Error types for switchyard-core.

use crate::model::CapabilityKind;

/// Errors that can occur while building or invoking capabilities.
///
/// Per-entry parse failures ([`Error::ConfigParse`]) are recovered by the
/// classifiers; everything else is surfaced to whoever triggered the work.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A configuration entry's value is malformed or missing required fields.
    #[error("Invalid capability entry '{entry}': {message}")]
    ConfigParse {
        /// Store key of the offending entry
        entry: String,
        /// What went wrong
        message: String,
    },

    /// A declared input schema cannot be used for parameter validation.
    #[error("Unsupported input schema for '{capability}': {message}")]
    Schema {
        /// Capability that declared the schema
        capability: String,
        /// Why the schema was rejected
        message: String,
    },

    /// The protocol server already holds a capability with this name.
    #[error("Duplicate {kind} registration: {name}")]
    RegistrationConflict {
        /// Capability class
        kind: CapabilityKind,
        /// Conflicting name
        name: String,
    },

    /// Caller-supplied arguments do not match the declared parameter shape.
    #[error("Invalid arguments for '{capability}': {message}")]
    InvalidArguments {
        /// Capability being called
        capability: String,
        /// Validation failures, joined
        message: String,
    },

    /// The requested tool cannot be resolved to a compute unit.
    #[error("Tool not found: {name}")]
    ToolNotFound {
        /// Requested tool name (may be empty)
        name: String,
    },

    /// The remote compute platform failed, or its response violated the contract.
    #[error("Invocation error: {message}")]
    Invocation {
        /// Platform or decode failure message
        message: String,
    },

    /// The remote compute unit ran and reported a failure.
    #[error("{message}")]
    ToolExecution {
        /// Message reported by the tool
        message: String,
    },

    /// The configuration store could not be read.
    #[error("Config store error: {message}")]
    Store {
        /// Human-readable error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A prompt template could not be rendered.
    #[error("Template error: {message}")]
    Render {
        /// What went wrong
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience `Result` type alias for Switchyard operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a per-entry parse error.
    pub fn config_parse<E, M>(entry: E, message: M) -> Self
    where
        E: Into<String>,
        M: Into<String>,
    {
        Error::ConfigParse {
            entry: entry.into(),
            message: message.into(),
        }
    }

    /// Creates a schema error for the named capability.
    pub fn schema<C, M>(capability: C, message: M) -> Self
    where
        C: Into<String>,
        M: Into<String>,
    {
        Error::Schema {
            capability: capability.into(),
            message: message.into(),
        }
    }

    /// Creates an argument validation error.
    pub fn invalid_arguments<C, M>(capability: C, message: M) -> Self
    where
        C: Into<String>,
        M: Into<String>,
    {
        Error::InvalidArguments {
            capability: capability.into(),
            message: message.into(),
        }
    }

    /// Creates a tool-not-found error.
    pub fn tool_not_found<S: Into<String>>(name: S) -> Self {
        Error::ToolNotFound { name: name.into() }
    }

    /// Creates an invocation (platform-level) error.
    pub fn invocation<S: Into<String>>(message: S) -> Self {
        Error::Invocation {
            message: message.into(),
        }
    }

    /// Creates a tool execution (application-level) error.
    pub fn tool_execution<S: Into<String>>(message: S) -> Self {
        Error::ToolExecution {
            message: message.into(),
        }
    }

    /// Creates a store error with a message.
    pub fn store<S: Into<String>>(message: S) -> Self {
        Error::Store {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a store error with a message and source error.
    pub fn store_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Store {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a template rendering error.
    pub fn render<S: Into<String>>(message: S) -> Self {
        Error::Render {
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Whether this error belongs to a single request rather than to the
    /// construction of the server.
    pub fn is_invocation_scoped(&self) -> bool {
        matches!(
            self,
            Error::ToolNotFound { .. }
                | Error::InvalidArguments { .. }
                | Error::Invocation { .. }
                | Error::ToolExecution { .. }
                | Error::Render { .. }
        )
    }
}
