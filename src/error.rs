//! Error model for the `dockhand` crate.

use thiserror::Error;

use crate::query::ValueKind;

/// Convenience result type.
pub type Result<T> = std::result::Result<T, Error>;

/// High-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A parameter type or converter registry is set up incorrectly.
    Configuration,
    /// A required query parameter was not provided.
    MissingParameter,
    /// A converter plugin rejected or mishandled a value.
    Conversion,
    /// A filter field holds a value outside its allowed set.
    InvalidFilter,
    /// A required argument was not supplied.
    InvalidArgument,
    /// The peer sent a frame that could not be decoded.
    MalformedMessage,
    /// The underlying response body failed.
    Stream,
    /// JSON serialization failure.
    Json,
    /// The caller-supplied transport failed.
    Transport,
    /// The operation was cancelled.
    Cancelled,
}

/// Structured error type.
///
/// Every failure is surfaced to the caller; nothing is logged and dropped
/// internally.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The parameter type cannot be encoded as declared.
    #[error("configuration error: {message}")]
    Configuration {
        /// Human readable message.
        message: String,
    },

    /// A required field was left unset.
    #[error("missing required query parameter: {field}")]
    MissingRequiredParameter {
        /// Name of the source field.
        field: &'static str,
    },

    /// The configured converter cannot handle the field's value type.
    #[error("converter '{converter}' cannot convert a {kind} value (field {field})")]
    UnsupportedConversion {
        /// Name of the source field.
        field: &'static str,
        /// Kind of the value that was read.
        kind: ValueKind,
        /// Converter identifier (`"natural"` when none was configured).
        converter: String,
    },

    /// A converter produced no values.
    #[error("converter '{converter}' produced no values for field {field}")]
    ConverterContractViolation {
        /// Name of the source field.
        field: &'static str,
        /// Converter identifier.
        converter: String,
    },

    /// A constrained filter field holds an illegal value.
    #[error("invalid value '{value}' for filter '{field}' (expected one of: {allowed})")]
    InvalidFilterValue {
        /// Filter field name.
        field: &'static str,
        /// Rejected value.
        value: String,
        /// Comma separated list of accepted values.
        allowed: String,
    },

    /// A required argument was not supplied.
    #[error("invalid argument: {name} is required")]
    InvalidArgument {
        /// Argument name.
        name: &'static str,
    },

    /// A frame in the response body could not be decoded.
    #[error("malformed message after {dispatched} dispatched: {message}")]
    MalformedMessage {
        /// Number of messages delivered before the failure.
        dispatched: usize,
        /// Decoder diagnostic, including the failing path when known.
        message: String,
    },

    /// Reading the response body failed.
    #[error("stream failure: {source}")]
    StreamFailure {
        /// Lower-level error.
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization error.
    #[error("JSON error: {source}")]
    Json {
        /// Lower-level error.
        #[from]
        source: serde_json::Error,
    },

    /// The transport reported a failure.
    #[error("transport error: {message}")]
    Transport {
        /// Human readable message.
        message: String,
    },

    /// The operation was cancelled by the caller.
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// Returns a coarse error classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::MissingRequiredParameter { .. } => ErrorKind::MissingParameter,
            Self::UnsupportedConversion { .. } | Self::ConverterContractViolation { .. } => {
                ErrorKind::Conversion
            }
            Self::InvalidFilterValue { .. } => ErrorKind::InvalidFilter,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::MalformedMessage { .. } => ErrorKind::MalformedMessage,
            Self::StreamFailure { .. } => ErrorKind::Stream,
            Self::Json { .. } => ErrorKind::Json,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Whether the failure came from the network side and a fresh attempt may
    /// succeed.
    ///
    /// Retrying is left to the caller; this crate never retries internally.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Stream | ErrorKind::Transport)
    }

    /// Create a transport error, for use by [`crate::Transport`] implementations.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn malformed(dispatched: usize, message: impl Into<String>) -> Self {
        Self::MalformedMessage {
            dispatched,
            message: message.into(),
        }
    }
}
