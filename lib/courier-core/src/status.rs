//! Typed HTTP status errors.
//!
//! A [`StatusError`] pairs an HTTP status code with a message. Two status
//! errors *match* when their codes are equal, whatever their messages say,
//! which lets callers classify failures without comparing strings:
//!
//! ```
//! use courier_core::StatusError;
//!
//! let err = StatusError::new(404, "no such user");
//! assert!(StatusError::NOT_FOUND.matches(&err));
//! assert_eq!(err.to_string(), "(404) no such user");
//! ```

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

use derive_more::{Display, Error};

// ============================================================================
// Status Error
// ============================================================================

/// An HTTP status code with a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Error)]
#[display("({status_code}) {message}")]
pub struct StatusError {
    status_code: u16,
    message: Cow<'static, str>,
}

impl StatusError {
    /// 400 Bad Request.
    pub const BAD_REQUEST: Self = Self::from_static(400, "Bad Request");
    /// 401 Unauthorized.
    pub const UNAUTHORIZED: Self = Self::from_static(401, "Unauthorized");
    /// 403 Forbidden.
    pub const FORBIDDEN: Self = Self::from_static(403, "Forbidden");
    /// 404 Not Found.
    pub const NOT_FOUND: Self = Self::from_static(404, "Not Found");
    /// 409 Conflict.
    pub const CONFLICT: Self = Self::from_static(409, "Conflict");
    /// 500 Internal Server Error.
    pub const INTERNAL_SERVER_ERROR: Self = Self::from_static(500, "Internal Server Error");
    /// 501 Not Implemented.
    pub const NOT_IMPLEMENTED: Self = Self::from_static(501, "Not Implemented");
    /// 503 Service Unavailable.
    pub const SERVICE_UNAVAILABLE: Self = Self::from_static(503, "Service Unavailable");

    /// Create a status error.
    ///
    /// Any code is accepted, including non-standard ones.
    #[must_use]
    pub fn new(status_code: u16, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    const fn from_static(status_code: u16, message: &'static str) -> Self {
        Self {
            status_code,
            message: Cow::Borrowed(message),
        }
    }

    /// Same status code, new message.
    ///
    /// ```
    /// use courier_core::StatusError;
    ///
    /// let err = StatusError::CONFLICT.with_message("user already exists");
    /// assert_eq!(err.status_code(), 409);
    /// ```
    #[must_use]
    pub fn with_message(&self, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(self.status_code, message)
    }

    /// Same status code, message built from a format template.
    ///
    /// ```
    /// use courier_core::StatusError;
    ///
    /// let err = StatusError::NOT_FOUND.with_formatted_message(format_args!("user {} not found", 42));
    /// assert_eq!(err.to_string(), "(404) user 42 not found");
    /// ```
    #[must_use]
    pub fn with_formatted_message(&self, args: fmt::Arguments<'_>) -> Self {
        Self::new(self.status_code, args.to_string())
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The status code as an [`http::StatusCode`], when it is a valid one.
    #[must_use]
    pub fn status(&self) -> Option<http::StatusCode> {
        http::StatusCode::from_u16(self.status_code).ok()
    }

    /// Returns `true` if the error carries the given status code.
    #[must_use]
    pub const fn has_status_code(&self, status_code: u16) -> bool {
        self.status_code == status_code
    }

    /// Returns `true` if `err`, or any error in its source chain, is a
    /// status error with the same status code.
    ///
    /// Errors produced by a request chain are looked through, so this works
    /// directly on [`crate::Error`].
    #[must_use]
    pub fn matches(&self, err: &(dyn StdError + 'static)) -> bool {
        let mut current = Some(err);
        while let Some(err) = current {
            let found = err
                .downcast_ref::<Self>()
                .or_else(|| err.downcast_ref::<crate::Error>()?.status_error());
            if found.is_some_and(|other| other.status_code == self.status_code) {
                return true;
            }
            current = err.source();
        }
        false
    }

    /// Status is 4xx.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status_code >= 400 && self.status_code < 500
    }

    /// Status is 5xx.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status_code >= 500 && self.status_code < 600
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::*;

    #[test]
    fn catalogue_uses_reason_phrases() {
        let catalogue = [
            StatusError::BAD_REQUEST,
            StatusError::UNAUTHORIZED,
            StatusError::FORBIDDEN,
            StatusError::NOT_FOUND,
            StatusError::CONFLICT,
            StatusError::INTERNAL_SERVER_ERROR,
            StatusError::NOT_IMPLEMENTED,
            StatusError::SERVICE_UNAVAILABLE,
        ];

        for err in catalogue {
            let reason = err.status().and_then(|s| s.canonical_reason());
            check!(reason == Some(err.message()));
        }
    }

    #[test]
    fn display() {
        insta::assert_snapshot!(StatusError::NOT_FOUND.to_string(), @"(404) Not Found");
        insta::assert_snapshot!(StatusError::new(599, "weird").to_string(), @"(599) weird");
    }

    #[test]
    fn with_message_keeps_code() {
        let err = StatusError::BAD_REQUEST.with_message("missing field `name`");
        check!(err.status_code() == 400);
        check!(err.message() == "missing field `name`");
        // the catalogue entry is untouched
        check!(StatusError::BAD_REQUEST.message() == "Bad Request");
    }

    #[test]
    fn with_formatted_message() {
        let err = StatusError::FORBIDDEN.with_formatted_message(format_args!("{} may not {}", "bob", "delete"));
        check!(err.to_string() == "(403) bob may not delete");
    }

    #[test]
    fn matches_by_code_only() {
        let err = StatusError::new(404, "gone fishing");
        check!(StatusError::NOT_FOUND.matches(&err));
        check!(!StatusError::CONFLICT.matches(&err));
        check!(!StatusError::NOT_FOUND.matches(&std::io::Error::other("boom")));
    }

    #[test]
    fn matches_through_chain_errors() {
        let err = crate::Error::Status(StatusError::new(503, "maintenance"));
        check!(StatusError::SERVICE_UNAVAILABLE.matches(&err));
        check!(!StatusError::INTERNAL_SERVER_ERROR.matches(&err));
    }

    #[test]
    fn has_status_code() {
        check!(StatusError::UNAUTHORIZED.has_status_code(401));
        check!(!StatusError::UNAUTHORIZED.has_status_code(403));
    }

    #[test]
    fn status_classes() {
        check!(StatusError::CONFLICT.is_client_error());
        check!(!StatusError::CONFLICT.is_server_error());
        check!(StatusError::NOT_IMPLEMENTED.is_server_error());
        check!(StatusError::new(42, "?").status().is_none());
    }
}
