//! Any tower service as a [`Transport`].

use courier_core::{Body, BoxError, Transport, TransportFuture};
use tower::ServiceExt;
use tower_service::Service;

/// Adapts a tower [`Service`] into a [`Transport`].
///
/// Each call clones the service, waits for it to be ready, then calls it
/// once. Useful to put middleware in front of a custom transport, or to use
/// a `tower::service_fn` as a test double.
///
/// ```
/// use courier::{Body, BoxError, Client, ServiceTransport};
///
/// let echo = courier::tower::service_fn(|request: http::Request<Body>| async move {
///     Ok::<_, BoxError>(http::Response::new(request.into_body()))
/// });
/// let client = Client::with_transport(ServiceTransport::new(echo));
/// ```
#[derive(Debug, Clone)]
pub struct ServiceTransport<S> {
    service: S,
}

impl<S> ServiceTransport<S> {
    /// Wrap `service`.
    pub const fn new(service: S) -> Self {
        Self { service }
    }

    /// The wrapped service.
    pub fn into_inner(self) -> S {
        self.service
    }
}

impl<S> Transport for ServiceTransport<S>
where
    S: Service<http::Request<Body>, Response = http::Response<Body>> + Clone + Send + Sync + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
{
    fn execute(&self, request: http::Request<Body>) -> TransportFuture<'_> {
        let service = self.service.clone();
        Box::pin(async move { service.oneshot(request).await.map_err(Into::into) })
    }
}
