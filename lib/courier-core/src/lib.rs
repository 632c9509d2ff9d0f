//! Core types and traits for the courier HTTP request chain.
//!
//! This crate provides the pieces a request chain is made of:
//! - [`Request`] - fluent request builder, sent with [`Request::send`]
//! - [`Outcome`] - response or error, read with a terminal operation
//! - [`Transport`] - the capability that performs the network I/O
//! - [`Body`] - single-read request and response body
//! - [`Error`] and [`Result`] - error handling
//! - [`StatusError`] - HTTP status code with a message, matched by code
//! - [`StatusCode`] - HTTP status codes (re-exported from `http` crate)
//! - [`header`] - HTTP header names (re-exported from `http` crate)
//!
//! The default network transport and the client live in the `courier` crate.

mod body;
mod error;
mod outcome;
pub mod prelude;
mod request;
mod status;
mod transport;

pub use body::{Body, BodyStream, from_json, to_json};
pub use error::{BoxError, Error, Result};
pub use outcome::Outcome;
pub use request::{PrepareFn, Request, RequestContext};
pub use status::StatusError;
pub use transport::{Transport, TransportFn, TransportFuture, transport_fn};

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};
