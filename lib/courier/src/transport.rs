//! Default transport using hyper-util.

use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use futures_util::TryStreamExt;
use http_body_util::{BodyStream, Full};
use tower::util::BoxCloneService;
use tower::{Layer, ServiceExt};
use tower_service::Service;

use courier_core::{Body, BoxError, Transport, TransportFuture};

use crate::{
    TransportError,
    config::{PooledClient, TransportConfig},
    middleware::LoggingLayer,
};

// ============================================================================
// Type-Erased Service for Middleware Composition
// ============================================================================

/// Type-erased service for middleware composition.
///
/// Every layer added to a [`HyperTransportBuilder`] wraps one of these.
pub type BoxedService = BoxCloneService<http::Request<Body>, http::Response<Body>, BoxError>;

/// Thread-safe wrapper for `BoxedService`.
///
/// `BoxCloneService` is `Send` but not `Sync`, which [`Transport`] requires.
#[derive(Clone)]
struct SyncService {
    inner: Arc<Mutex<BoxedService>>,
}

impl SyncService {
    fn new(service: BoxedService) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    fn call(&self, request: http::Request<Body>) -> TransportFuture<'static> {
        // Lock, clone the service, and release the lock immediately
        let service = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();

        Box::pin(service.oneshot(request))
    }
}

// ============================================================================
// Raw Transport (innermost service)
// ============================================================================

/// Direct access to the hyper client, below any middleware.
#[derive(Clone)]
struct RawTransport {
    inner: PooledClient,
    timeout: Duration,
}

impl RawTransport {
    fn new(config: &TransportConfig) -> Self {
        Self {
            inner: config.pooled_client(),
            timeout: config.timeout,
        }
    }

    /// Buffer the request body; hyper gets a `Full` body.
    async fn build_hyper_request(
        request: http::Request<Body>,
    ) -> Result<http::Request<Full<Bytes>>, TransportError> {
        let uri = request.uri();
        if uri.scheme().is_none() || uri.authority().is_none() {
            return Err(TransportError::InvalidRequest(format!("URI must be absolute, got '{uri}'")));
        }

        let (parts, body) = request.into_parts();
        let bytes = body
            .collect_bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(http::Request::from_parts(parts, Full::new(bytes)))
    }

    async fn execute(self, request: http::Request<Body>) -> Result<http::Response<Body>, TransportError> {
        let hyper_request = Self::build_hyper_request(request).await?;

        let response = tokio::time::timeout(self.timeout, self.inner.request(hyper_request))
            .await
            .map_err(|_| TransportError::Timeout { timeout: self.timeout })?
            .map_err(TransportError::from_hyper)?;

        // The body is left streaming; dropping it releases the connection.
        let (parts, incoming) = response.into_parts();
        let body = Body::from_stream(
            BodyStream::new(incoming).map_ok(|frame| frame.into_data().unwrap_or_default()),
        );

        Ok(http::Response::from_parts(parts, body))
    }
}

impl Service<http::Request<Body>> for RawTransport {
    type Response = http::Response<Body>;
    type Error = BoxError;
    type Future = TransportFuture<'static>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), BoxError>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: http::Request<Body>) -> Self::Future {
        let transport = self.clone();
        Box::pin(async move { transport.execute(request).await.map_err(Into::into) })
    }
}

// ============================================================================
// Public Transport
// ============================================================================

/// HTTP transport using hyper-util with connection pooling, TLS, and
/// middleware support.
///
/// This is what a [`Client`](crate::Client) uses when it is not given a
/// transport. Request bodies are buffered before sending; response bodies
/// are streamed.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use courier::{Client, HyperTransport};
///
/// let transport = HyperTransport::builder()
///     .timeout(Duration::from_secs(5))
///     .with_logging()
///     .build();
/// let client = Client::with_transport(transport);
/// ```
#[derive(Clone)]
pub struct HyperTransport {
    service: SyncService,
    config: TransportConfig,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperTransport {
    /// Create a new transport with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TransportConfig::default())
    }

    /// Create a new transport with custom configuration (no middleware).
    #[must_use]
    pub fn with_config(config: TransportConfig) -> Self {
        let raw = RawTransport::new(&config);
        Self::with_service(BoxCloneService::new(raw), config)
    }

    fn with_service(service: BoxedService, config: TransportConfig) -> Self {
        Self {
            service: SyncService::new(service),
            config,
        }
    }

    /// Create a new transport builder.
    #[must_use]
    pub fn builder() -> HyperTransportBuilder {
        HyperTransportBuilder::default()
    }

    /// Get the transport configuration.
    #[must_use]
    pub const fn config(&self) -> &TransportConfig {
        &self.config
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HyperTransport {
    fn execute(&self, request: http::Request<Body>) -> TransportFuture<'_> {
        self.service.call(request)
    }
}

// ============================================================================
// Tower Service Implementation
// ============================================================================

impl Service<http::Request<Body>> for HyperTransport {
    type Response = http::Response<Body>;
    type Error = BoxError;
    type Future = TransportFuture<'static>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), BoxError>> {
        // the wrapped service is driven to readiness on each call
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: http::Request<Body>) -> Self::Future {
        self.service.call(request)
    }
}

/// Builder for [`HyperTransport`].
///
/// ```
/// use std::time::Duration;
///
/// use courier::HyperTransport;
/// use courier::tower::util::MapRequestLayer;
///
/// let transport = HyperTransport::builder()
///     .connect_timeout(Duration::from_secs(2))
///     .layer(MapRequestLayer::new(|mut request: http::Request<courier::Body>| {
///         request.headers_mut().insert("x-client", http::HeaderValue::from_static("courier"));
///         request
///     }))
///     .build();
/// ```
#[derive(Default)]
pub struct HyperTransportBuilder {
    config: TransportConfig,
    layers: Vec<Arc<dyn Fn(BoxedService) -> BoxedService + Send + Sync>>,
}

impl std::fmt::Debug for HyperTransportBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransportBuilder")
            .field("config", &self.config)
            .field("layers_count", &self.layers.len())
            .finish()
    }
}

impl HyperTransportBuilder {
    // ========================================================================
    // Core Configuration
    // ========================================================================

    /// Set the request timeout (applied at the connection level, not middleware).
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the maximum idle connections per host.
    #[must_use]
    pub fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.config.pool_idle_per_host = count;
        self
    }

    /// Set the idle connection timeout.
    #[must_use]
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    // ========================================================================
    // Middleware
    // ========================================================================

    /// Add a Tower layer to the transport.
    ///
    /// Layers are applied in order: first added = outermost (processes requests first).
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + Sync + 'static,
        L::Service: Service<http::Request<Body>, Response = http::Response<Body>, Error = BoxError>
            + Clone
            + Send
            + 'static,
        <L::Service as Service<http::Request<Body>>>::Future: Send + 'static,
    {
        self.layers
            .push(Arc::new(move |service| BoxCloneService::new(layer.layer(service))));
        self
    }

    /// Add request/response logging.
    #[must_use]
    pub fn with_logging(self) -> Self {
        self.layer(LoggingLayer::new())
    }

    /// Add debug-level logging (includes headers and more detail).
    #[must_use]
    pub fn with_debug_logging(self) -> Self {
        self.layer(LoggingLayer::debug())
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Build the transport with all configured middleware.
    #[must_use]
    pub fn build(self) -> HyperTransport {
        let mut service: BoxedService = BoxCloneService::new(RawTransport::new(&self.config));

        // Wrap from the innermost layer out, so the first added ends up outermost
        for layer_fn in self.layers.iter().rev() {
            service = layer_fn(service);
        }

        HyperTransport::with_service(service, self.config)
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::*;

    #[test]
    fn transport_default() {
        let transport = HyperTransport::new();
        check!(transport.config().timeout == Duration::from_secs(30));
    }

    #[test]
    fn transport_builder() {
        let transport = HyperTransport::builder()
            .timeout(Duration::from_secs(60))
            .pool_idle_per_host(16)
            .build();

        check!(transport.config().timeout == Duration::from_secs(60));
        check!(transport.config().pool_idle_per_host == 16);
    }

    #[test]
    fn builder_setters_match_config_fields() {
        let expected = TransportConfig {
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            pool_idle_per_host: 0,
            pool_idle_timeout: Duration::from_secs(1),
        };
        let transport = HyperTransport::builder()
            .timeout(expected.timeout)
            .connect_timeout(expected.connect_timeout)
            .pool_idle_per_host(expected.pool_idle_per_host)
            .pool_idle_timeout(expected.pool_idle_timeout)
            .build();

        check!(transport.config() == &expected);
        check!(HyperTransport::builder().build().config() == &TransportConfig::default());
    }

    #[test]
    fn transport_is_debug() {
        let transport = HyperTransport::new();
        let debug = format!("{transport:?}");
        check!(debug.contains("HyperTransport"));

        let builder = HyperTransport::builder().with_logging();
        check!(format!("{builder:?}").contains("layers_count: 1"));
    }

    #[tokio::test]
    async fn relative_uri_is_rejected() {
        let transport = HyperTransport::new();
        let request = http::Request::get("/users").body(Body::empty()).expect("request");

        let_assert!(Err(err) = transport.execute(request).await);
        let_assert!(Some(TransportError::InvalidRequest(message)) = err.downcast_ref::<TransportError>());
        check!(message.contains("/users"));
    }
}
