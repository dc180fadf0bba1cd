//! Error type definitions for the channel catalog and its Tvheadend projection

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors (SeaORM)
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A referenced catalog row does not exist
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// A requested stream could not be resolved from the provider listing
    #[error("Cannot resolve stream '{stream_name}' in playlist {playlist_id}: {reason}")]
    Resolution {
        playlist_id: i32,
        stream_name: String,
        reason: String,
    },

    /// The external tuner backend failed a call
    #[error("Tvheadend unavailable: {0}")]
    ExternalUnavailable(#[from] TunerError),

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Filesystem errors (playlist cache, config file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failures
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Errors raised by the Tvheadend API client
#[derive(Error, Debug)]
pub enum TunerError {
    /// Connection refused, DNS failure, broken body and friends
    #[error("{operation}: transport error: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The call did not complete in time
    #[error("{operation}: timed out")]
    Timeout { operation: &'static str },

    /// Tvheadend answered with a non-success status
    #[error("{operation}: HTTP {status} - {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// Tvheadend answered 2xx but the payload was not what the API promises
    #[error("{operation}: invalid response - {message}")]
    InvalidResponse {
        operation: &'static str,
        message: String,
    },
}

impl AppError {
    /// Create a not-found error for a catalog resource
    pub fn not_found<R: Into<String>, I: ToString>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    /// Create a resolution error for a stream in a playlist
    pub fn resolution<S: Into<String>, M: Into<String>>(
        playlist_id: i32,
        stream_name: S,
        reason: M,
    ) -> Self {
        Self::Resolution {
            playlist_id,
            stream_name: stream_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the error should be reported to an operator as a rejected request
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Resolution { .. } | Self::Validation { .. }
        )
    }
}

impl TunerError {
    pub fn transport(operation: &'static str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { operation }
        } else {
            Self::Transport { operation, source }
        }
    }

    pub fn invalid_response<M: Into<String>>(operation: &'static str, message: M) -> Self {
        Self::InvalidResponse {
            operation,
            message: message.into(),
        }
    }

    /// Whether retrying the same call later could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Timeout { .. } => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::InvalidResponse { .. } => false,
        }
    }

    /// Tvheadend reported that the addressed node does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}
