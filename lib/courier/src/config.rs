//! Settings of the default transport, and the pooled hyper client they build.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::{TokioExecutor, TokioTimer},
};

use crate::connector::https_connector;

/// Pooled hyper client behind [`HyperTransport`](crate::HyperTransport).
pub(crate) type PooledClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Settings for [`HyperTransport`](crate::HyperTransport).
///
/// Set fields directly, or through
/// [`HyperTransportBuilder`](crate::HyperTransportBuilder):
///
/// ```
/// use std::time::Duration;
/// use courier::{HyperTransport, TransportConfig};
///
/// let transport = HyperTransport::with_config(TransportConfig {
///     timeout: Duration::from_secs(5),
///     ..TransportConfig::default()
/// });
/// assert_eq!(transport.config().timeout, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Time allowed between sending a request and receiving its response
    /// head. Reading the body is not covered.
    pub timeout: Duration,
    /// Time allowed to open a TCP connection.
    pub connect_timeout: Duration,
    /// Idle connections kept per host. Zero disables pooling.
    pub pool_idle_per_host: usize,
    /// How long an idle pooled connection stays open.
    pub pool_idle_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

impl TransportConfig {
    /// Build the hyper client these settings describe.
    ///
    /// The request timeout is not part of it; the transport enforces that one
    /// around each call.
    pub(crate) fn pooled_client(&self) -> PooledClient {
        Client::builder(TokioExecutor::new())
            .pool_timer(TokioTimer::new())
            .pool_idle_timeout(self.pool_idle_timeout)
            .pool_max_idle_per_host(self.pool_idle_per_host)
            .build(https_connector(self.connect_timeout))
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::*;

    #[test]
    fn defaults_favor_long_lived_pools() {
        let config = TransportConfig::default();
        check!(config.timeout == Duration::from_secs(30));
        check!(config.connect_timeout == Duration::from_secs(10));
        check!(config.pool_idle_per_host == 32);
        check!(config.pool_idle_timeout == Duration::from_secs(90));
    }

    #[tokio::test]
    async fn pooled_client_accepts_disabled_pooling() {
        let config = TransportConfig {
            pool_idle_per_host: 0,
            pool_idle_timeout: Duration::ZERO,
            ..TransportConfig::default()
        };
        let client = config.pooled_client();
        check!(format!("{client:?}").contains("Client"));
    }
}
