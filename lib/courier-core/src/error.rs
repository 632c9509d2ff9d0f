//! Error types for courier.
//!
//! Every failure along a request chain ends up as an [`Error`]. Apart from
//! [`Error::Status`], each variant remembers the method and URL of the
//! request that produced it.

use derive_more::{Display, From};
use url::Url;

use crate::StatusError;

/// Boxed error returned by transports and prepare callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

// ============================================================================
// Error Type
// ============================================================================

/// Main error type for courier request chains.
#[derive(Debug, Display, From)]
pub enum Error {
    /// The request body could not be encoded as JSON.
    #[display("failed to encode body for '{method} {url}': {source}")]
    #[from(skip)]
    Encode {
        /// Request method.
        method: String,
        /// Request URL.
        url: Url,
        /// Serialization error.
        source: serde_json::Error,
    },

    /// A header name or value was rejected.
    #[display("invalid header for '{method} {url}': {message}")]
    #[from(skip)]
    InvalidHeader {
        /// Request method.
        method: String,
        /// Request URL.
        url: Url,
        /// What was wrong with the header.
        message: String,
    },

    /// The outgoing request could not be built from its method and URL.
    #[display("failed to prepare request for '{method} {url}': {message}")]
    #[from(skip)]
    InvalidRequest {
        /// Request method.
        method: String,
        /// Request URL.
        url: Url,
        /// What was wrong with the request.
        message: String,
    },

    /// The prepare callback refused the request.
    #[display("failed to execute the prepare callback for '{method} {url}': {source}")]
    #[from(skip)]
    Prepare {
        /// Request method.
        method: String,
        /// Request URL.
        url: Url,
        /// Error returned by the callback.
        source: BoxError,
    },

    /// The transport failed before any HTTP response was received.
    #[display("non-protocol request error for '{method} {url}': {source}")]
    #[from(skip)]
    Transport {
        /// Request method.
        method: String,
        /// Request URL.
        url: Url,
        /// Error returned by the transport.
        source: BoxError,
    },

    /// The server answered with a 4xx or 5xx status.
    #[display("{_0}")]
    #[from]
    Status(StatusError),

    /// The response body could not be read.
    #[display("failed to read the response body for '{method} {url}': {source}")]
    #[from(skip)]
    Read {
        /// Request method.
        method: String,
        /// Request URL.
        url: Url,
        /// Body stream error.
        source: BoxError,
    },

    /// The response body could not be written to the destination.
    #[display("failed to copy response to destination for '{method} {url}': {source}")]
    #[from(skip)]
    Copy {
        /// Request method.
        method: String,
        /// Request URL.
        url: Url,
        /// Destination I/O error.
        source: std::io::Error,
    },

    /// The response body is not the expected JSON.
    #[display("failed to decode the response body for '{method} {url}' at '{path}': {message}")]
    #[from(skip)]
    Decode {
        /// Request method.
        method: String,
        /// Request URL.
        url: Url,
        /// JSON path to the error (e.g., "user.address.city").
        path: String,
        /// Error message.
        message: String,
    },

    /// No destination was given to decode into.
    #[display("decode destination was missing for '{method} {url}'")]
    #[from(skip)]
    MissingDestination {
        /// Request method.
        method: String,
        /// Request URL.
        url: Url,
    },
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Encode { source, .. } => Some(source),
            Self::Prepare { source, .. } | Self::Transport { source, .. } | Self::Read { source, .. } => {
                Some(source.as_ref())
            }
            Self::Copy { source, .. } => Some(source),
            Self::InvalidHeader { .. }
            | Self::InvalidRequest { .. }
            | Self::Status(_)
            | Self::Decode { .. }
            | Self::MissingDestination { .. } => None,
        }
    }
}

impl Error {
    /// The status error, if the server answered with a 4xx or 5xx status.
    #[must_use]
    pub const fn status_error(&self) -> Option<&StatusError> {
        match self {
            Self::Status(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the HTTP status code if this is a status error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status(err) => Some(err.status_code()),
            _ => None,
        }
    }

    /// Returns `true` if this is a status error with the given code.
    #[must_use]
    pub fn has_status_code(&self, status_code: u16) -> bool {
        self.status() == Some(status_code)
    }

    /// Returns `true` if this error matches `kind` by status code.
    ///
    /// ```
    /// use courier_core::{Error, StatusError};
    ///
    /// let err = Error::from(StatusError::new(404, "no such user"));
    /// assert!(err.is(&StatusError::NOT_FOUND));
    /// ```
    #[must_use]
    pub fn is(&self, kind: &StatusError) -> bool {
        kind.matches(self)
    }

    /// Returns `true` if the transport failed (network, DNS, TLS, ...).
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status_error().is_some_and(StatusError::is_client_error)
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_error().is_some_and(StatusError::is_server_error)
    }
}
