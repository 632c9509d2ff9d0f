//! The transport capability.
//!
//! A [`Transport`] is anything able to turn an outgoing `http::Request` into
//! an incoming `http::Response`. It is the only thing a request chain needs
//! from the outside world: connection pooling, timeouts, TLS and redirects
//! are all the transport's business.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::{Body, BoxError};

/// Future returned by [`Transport::execute`].
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = std::result::Result<http::Response<Body>, BoxError>> + Send + 'a>>;

/// Core transport trait.
///
/// Implementations perform the network I/O for a single request. An `Err`
/// means no HTTP response was obtained (network, DNS, TLS, ...); any HTTP
/// response, including 4xx and 5xx, is an `Ok`.
pub trait Transport: Send + Sync {
    /// Execute an HTTP request and return the response.
    ///
    /// # Errors
    ///
    /// Returns an error if no response could be obtained.
    fn execute(&self, request: http::Request<Body>) -> TransportFuture<'_>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: http::Request<Body>) -> TransportFuture<'_> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: http::Request<Body>) -> TransportFuture<'_> {
        (**self).execute(request)
    }
}

// ============================================================================
// Function transport
// ============================================================================

/// A [`Transport`] backed by a function, see [`transport_fn`].
#[derive(Clone, Copy)]
pub struct TransportFn<F> {
    f: F,
}

impl<F> std::fmt::Debug for TransportFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportFn")
            .field("f", &std::any::type_name::<F>())
            .finish()
    }
}

/// Build a [`Transport`] from an async function.
///
/// # Example
///
/// ```
/// use courier_core::{Body, BoxError, transport_fn};
///
/// let echo = transport_fn(|request: http::Request<Body>| async move {
///     Ok::<_, BoxError>(http::Response::new(request.into_body()))
/// });
/// ```
pub fn transport_fn<F, Fut>(f: F) -> TransportFn<F>
where
    F: Fn(http::Request<Body>) -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<http::Response<Body>, BoxError>> + Send + 'static,
{
    TransportFn { f }
}

impl<F, Fut> Transport for TransportFn<F>
where
    F: Fn(http::Request<Body>) -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<http::Response<Body>, BoxError>> + Send + 'static,
{
    fn execute(&self, request: http::Request<Body>) -> TransportFuture<'_> {
        Box::pin((self.f)(request))
    }
}
