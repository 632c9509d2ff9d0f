//! Tower middleware for the default transport.
//!
//! Layers wrap the [`BoxedService`](crate::BoxedService) at the heart of
//! [`HyperTransport`](crate::HyperTransport). They see the outgoing
//! `http::Request<Body>` and the `http::Response<Body>` whose body is still
//! streaming.
//!
//! ```
//! use courier::HyperTransport;
//! use courier::middleware::LoggingLayer;
//!
//! let transport = HyperTransport::builder()
//!     .layer(LoggingLayer::debug())
//!     .build();
//! ```
//!
//! Any tower layer with matching request, response and error types fits,
//! e.g. `tower::util::MapRequestLayer` to add headers.

mod logging;

pub use logging::{LogLevel, Logging, LoggingLayer};

// Re-export tower types for convenience
pub use tower::{Layer, ServiceBuilder};
