//! Errors raised by the default transport.
//!
//! Request chains receive them boxed inside
//! [`Error::Transport`](courier_core::Error::Transport); downcast the source
//! to tell them apart.

use std::time::Duration;

use derive_more::{Display, Error};

/// Failure of [`HyperTransport`](crate::HyperTransport) to obtain a response.
#[derive(Debug, Display, Error)]
pub enum TransportError {
    /// Network/connection errors.
    #[display("connection error: {_0}")]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    Tls(#[error(not(source))] String),

    /// No response within the configured request timeout.
    #[display("request timeout after {}ms", timeout.as_millis())]
    Timeout {
        /// Configured request timeout.
        timeout: Duration,
    },

    /// The request could not be handed to hyper.
    #[display("invalid request: {_0}")]
    InvalidRequest(#[error(not(source))] String),

    /// The request body could not be read before sending.
    #[display("failed to read request body: {_0}")]
    Body(#[error(not(source))] String),
}

impl TransportError {
    #[allow(clippy::needless_pass_by_value)]
    pub(crate) fn from_hyper(err: hyper_util::client::legacy::Error) -> Self {
        let msg = err.to_string();
        // hyper only says "client error (Connect)"; the cause has the details
        let detail = std::error::Error::source(&err).map_or_else(|| msg.clone(), ToString::to_string);

        if err.is_connect() {
            return Self::Connection(format!("{msg}: {detail}"));
        }

        let lowered = detail.to_lowercase();
        if lowered.contains("ssl") || lowered.contains("tls") || lowered.contains("certificate") {
            return Self::Tls(detail);
        }

        Self::Connection(msg)
    }

    /// Returns `true` if the request timed out.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if no connection could be established or it was lost.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}
