//! The request factory.

use std::fmt;
use std::sync::{Arc, OnceLock};

use courier_core::{Request, Transport};
use url::Url;

use crate::HyperTransport;

/// Creates [`Request`]s bound to a shared transport.
///
/// A client built with [`Client::new`] has no transport until its first
/// request: a default [`HyperTransport`] is created then, once, and shared by
/// every later request, including those made from clones of this client.
/// Concurrent first use is safe.
///
/// # Example
///
/// ```no_run
/// use courier::prelude::*;
///
/// #[derive(Debug, Deserialize)]
/// struct Ip {
///     origin: String,
/// }
///
/// # async fn run() -> courier::Result<()> {
/// let client = Client::new();
/// let url = "https://httpbin.org/ip".parse().expect("valid URL");
/// let ip = client.get(url).send().await.decode_json::<Ip>().await?;
/// println!("{}", ip.body().origin);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct Client {
    transport: Arc<OnceLock<Arc<dyn Transport>>>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("transport", &self.transport.get().map(|_| "..."))
            .finish()
    }
}

impl Client {
    /// Create a client whose transport is chosen on first use.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client that sends every request through `transport`.
    #[must_use]
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self::with_shared_transport(Arc::new(transport))
    }

    /// Create a client that sends every request through a transport shared
    /// with other owners.
    #[must_use]
    pub fn with_shared_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport: Arc::new(OnceLock::from(transport)),
        }
    }

    /// The transport, if one was given or has already been defaulted.
    #[must_use]
    pub fn transport(&self) -> Option<&Arc<dyn Transport>> {
        self.transport.get()
    }

    fn transport_or_default(&self) -> Arc<dyn Transport> {
        let transport = self.transport.get_or_init(|| {
            tracing::debug!("no transport configured, using the default hyper transport");
            Arc::new(HyperTransport::new())
        });
        Arc::clone(transport)
    }

    /// Start a request with any method.
    ///
    /// The method is not validated here; an invalid token fails at
    /// [`Request::send`].
    pub fn new_request(&self, method: impl Into<String>, url: Url) -> Request {
        Request::new(self.transport_or_default(), method, url)
    }

    /// Start a `GET` request.
    pub fn get(&self, url: Url) -> Request {
        self.new_request("GET", url)
    }

    /// Start a `HEAD` request.
    pub fn head(&self, url: Url) -> Request {
        self.new_request("HEAD", url)
    }

    /// Start a `POST` request.
    pub fn post(&self, url: Url) -> Request {
        self.new_request("POST", url)
    }

    /// Start a `PUT` request.
    pub fn put(&self, url: Url) -> Request {
        self.new_request("PUT", url)
    }

    /// Start a `PATCH` request.
    pub fn patch(&self, url: Url) -> Request {
        self.new_request("PATCH", url)
    }

    /// Start a `DELETE` request.
    pub fn delete(&self, url: Url) -> Request {
        self.new_request("DELETE", url)
    }
}
