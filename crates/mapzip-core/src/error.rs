//! Error types for the mapzip client library.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for all client operations.
#[derive(Error, Debug)]
pub enum MapzipError {
    /// Local input validation errors. These never leave the wizard state
    /// machine in a modified state.
    #[error("Invalid input for field '{field}': {reason}")]
    Validation { field: String, reason: String },
    /// Operation not allowed in the wizard's current step
    #[error("Cannot {action} while the wizard is at the {step} step")]
    InvalidTransition { action: &'static str, step: String },
    /// A submission for the same wizard is already pending
    #[error("A submission is already in progress")]
    SubmissionInFlight,
    /// The owning session went away before the operation completed
    #[error("Operation cancelled")]
    Cancelled,
    /// Transport-level failure talking to a collaborator
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },
    /// Non-success response from a collaborator
    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },
    /// The gateway rejected our credentials
    #[error("Authentication failed ({code}), please log in again")]
    Authentication { code: String },
    /// Update conflicted with the server's copy
    #[error("Conflict: {message}")]
    Conflict { message: String },
    /// Bounded polling gave up
    #[error("Route calculation did not finish after {attempts} attempts")]
    Timeout { attempts: u32 },
    /// A collaborator response could not be decoded
    #[error("Malformed response: {message}")]
    Decode { message: String },
    /// Resource not found
    #[error("Schedule with ID {id} not found")]
    NotFound { id: String },
    /// Local key-value store errors
    #[error("Store error: {message}")]
    Store {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating store errors with optional context.
pub struct StoreErrorBuilder {
    message: String,
}

impl StoreErrorBuilder {
    /// Create a new store error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> MapzipError {
        MapzipError::Store {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct ValidationBuilder {
    field: String,
}

impl ValidationBuilder {
    /// Create a new validation error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> MapzipError {
        MapzipError::Validation {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl MapzipError {
    /// Creates a builder for store errors.
    pub fn store(message: impl Into<String>) -> StoreErrorBuilder {
        StoreErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn validation(field: impl Into<String>) -> ValidationBuilder {
        ValidationBuilder::new(field)
    }

    /// Creates a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Whether this error came from local input validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Whether this error should end the current session.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }
}

impl From<reqwest::Error> for MapzipError {
    fn from(source: reqwest::Error) -> Self {
        if source.is_decode() {
            return Self::Decode {
                message: source.to_string(),
            };
        }
        Self::Network {
            message: source.to_string(),
            source: Some(source),
        }
    }
}

/// Extension trait for Result to attach configuration context.
pub trait ResultExt<T, E> {
    /// Add context to any error type, converting to MapzipError.
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

/// Specialized extension trait for store-related Results.
pub trait StoreResultExt<T> {
    /// Map store errors with a message.
    fn store_context(self, message: &str) -> Result<T>;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| MapzipError::Configuration {
            message: format!("{}: {}", context, e),
        })
    }
}

impl<T> StoreResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn store_context(self, message: &str) -> Result<T> {
        self.map_err(|e| MapzipError::store(message).with_source(e))
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, MapzipError>;
