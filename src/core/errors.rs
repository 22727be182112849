//! Error types for the docalign-rs library.
//!
//! Every fallible operation in the matching pipeline returns [`Result`], with
//! [`DocAlignError`] carrying enough context to tell upstream data problems
//! apart from configuration mistakes and persistence failures.

use std::io;

use thiserror::Error;

/// Main result type for docalign operations.
pub type Result<T> = std::result::Result<T, DocAlignError>;

/// Error type for all docalign operations.
#[derive(Error, Debug)]
pub enum DocAlignError {
    /// I/O related errors (reading inputs, writing results)
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error description
        message: String,
        /// Configuration field that caused the error
        field: Option<String>,
    },

    /// Malformed method, tag or candidate data coming from the extractor
    #[error("Invalid input data in {source_name}: {message}")]
    InputData {
        /// Input the bad record came from (file name or stream label)
        source_name: String,
        /// Error description
        message: String,
    },

    /// Embedding backend errors (table loading, model initialization)
    #[error("Embedding error: {message}")]
    Embedding {
        /// Error description
        message: String,
        /// Word or file involved, if known
        subject: Option<String>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
        /// Data format being handled
        data_type: Option<String>,
        /// Underlying serialization error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors for configuration values and inputs
    #[error("Validation error: {message}")]
    Validation {
        /// Error description
        message: String,
        /// Field or input that failed validation
        field: Option<String>,
    },
}

impl DocAlignError {
    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a new configuration error with field context
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new input data error
    pub fn input(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InputData {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create a new embedding error naming the word or file involved
    pub fn embedding_for(message: impl Into<String>, subject: impl Into<String>) -> Self {
        Self::Embedding {
            message: message.into(),
            subject: Some(subject.into()),
        }
    }

    /// Create a new validation error with field context
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Add context to an existing error; the context is prefixed to its message
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        match &mut self {
            Self::Io { message, .. }
            | Self::Config { message, .. }
            | Self::InputData { message, .. }
            | Self::Embedding { message, .. }
            | Self::Serialization { message, .. }
            | Self::Validation { message, .. } => {
                *message = format!("{}: {}", context.into(), message);
            }
        }
        self
    }
}

impl From<io::Error> for DocAlignError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_json::Error> for DocAlignError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON serialization failed: {err}"),
            data_type: Some("JSON".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for DocAlignError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML serialization failed: {err}"),
            data_type: Some("YAML".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

/// Result extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    /// Add static context to an error result
    fn context(self, msg: &'static str) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<DocAlignError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }

    fn context(self, msg: &'static str) -> Result<T> {
        self.map_err(|e| e.into().with_context(msg))
    }
}
