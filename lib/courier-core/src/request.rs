//! Fluent request building.
//!
//! A [`Request`] accumulates a method, a URL, a body, headers and an optional
//! prepare callback without doing any I/O. [`Request::send`] is the single
//! point where the [`Transport`] is called.
//!
//! The first failing builder step wins: once a request has failed, every
//! later step hands it back unchanged and `send` returns the stored error
//! without reaching the transport.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use courier_core::{Body, BoxError, Request, Transport, transport_fn};
//!
//! # tokio_test_block(async {
//! let transport: Arc<dyn Transport> = Arc::new(transport_fn(|request: http::Request<Body>| async move {
//!     Ok::<_, BoxError>(http::Response::new(request.into_body()))
//! }));
//!
//! let url = "https://api.example.com/users".parse()?;
//! let echoed = Request::new(transport, "POST", url)
//!     .header("Accept", "application/json")
//!     .encode_json(&serde_json::json!({ "name": "Alice" }))
//!     .send()
//!     .await
//!     .raw_bytes()
//!     .await?;
//!
//! assert_eq!(echoed.body().as_ref(), br#"{"name":"Alice"}"#);
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().expect("runtime").block_on(f)
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::HeaderMap;
use url::Url;

use crate::{Body, BoxError, Error, Outcome, Result, Transport, to_json};

/// Callback run on the outgoing request right before dispatch.
pub type PrepareFn = Box<dyn FnOnce(&mut http::Request<Body>) -> std::result::Result<(), BoxError> + Send>;

// ============================================================================
// Request Context
// ============================================================================

/// Immutable snapshot of the method and URL of a request.
///
/// Kept by [`Outcome`] to describe the request it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    method: String,
    url: Url,
}

impl RequestContext {
    /// HTTP method, as given by the caller.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub(crate) fn invalid_request(&self, message: impl fmt::Display) -> Error {
        Error::InvalidRequest {
            method: self.method.clone(),
            url: self.url.clone(),
            message: message.to_string(),
        }
    }

    pub(crate) fn read_error(&self, source: BoxError) -> Error {
        Error::Read {
            method: self.method.clone(),
            url: self.url.clone(),
            source,
        }
    }
}

impl fmt::Display for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

// ============================================================================
// Request
// ============================================================================

/// An HTTP request being built.
///
/// Created by a client (or [`Request::new`]), shaped by chained builder
/// calls and consumed by [`Request::send`].
#[must_use = "a request does nothing until `send` is awaited"]
pub struct Request {
    transport: Arc<dyn Transport>,
    context: RequestContext,
    draft: Draft,
    error: Option<Error>,
}

/// What has been accumulated so far. Frozen once the request fails.
#[derive(Default)]
struct Draft {
    body: Option<Body>,
    headers: HeaderMap,
    prepare: Option<PrepareFn>,
    /// `Content-Type` was set by `encode_json`, not by the caller.
    implicit_json: bool,
}

impl Draft {
    fn drop_implicit_json(&mut self) {
        if std::mem::take(&mut self.implicit_json) {
            self.headers.remove(CONTENT_TYPE);
        }
    }
}

impl Request {
    /// Creates a request bound to `transport`, with no body and no error.
    ///
    /// The method is kept verbatim; it is only validated by [`Request::send`].
    pub fn new(transport: Arc<dyn Transport>, method: impl Into<String>, url: Url) -> Self {
        Self {
            transport,
            context: RequestContext {
                method: method.into(),
                url,
            },
            draft: Draft::default(),
            error: None,
        }
    }

    /// Run a builder step, unless the request has already failed.
    ///
    /// A step must not touch the draft before it knows it succeeds.
    fn step(mut self, f: impl FnOnce(&mut Draft, &RequestContext) -> Result<()>) -> Self {
        if self.error.is_none() {
            self.error = f(&mut self.draft, &self.context).err();
        }
        self
    }

    /// Sets the request body.
    ///
    /// A `Content-Type` added by an earlier [`Request::encode_json`] is
    /// removed; one set with [`Request::header`] is kept.
    pub fn with_request_body(self, body: impl Into<Body>) -> Self {
        let body = body.into();
        self.step(|draft, _| {
            draft.drop_implicit_json();
            draft.body = Some(body);
            Ok(())
        })
    }

    /// Encodes `value` as JSON and uses it as the request body.
    ///
    /// Also sets `Content-Type: application/json`, unless a content type is
    /// already there. If encoding fails, the request fails with
    /// [`Error::Encode`] and the body is left as it was.
    pub fn encode_json<T: serde::Serialize + ?Sized>(self, value: &T) -> Self {
        self.step(|draft, context| {
            let body = to_json(value).map_err(|source| Error::Encode {
                method: context.method.clone(),
                url: context.url.clone(),
                source,
            })?;
            if !draft.headers.contains_key(CONTENT_TYPE) {
                draft
                    .headers
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                draft.implicit_json = true;
            }
            draft.body = Some(body.into());
            Ok(())
        })
    }

    /// Appends a header.
    ///
    /// An invalid name or value fails the request with [`Error::InvalidHeader`].
    pub fn header<K, V>(self, name: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        <K as TryInto<HeaderName>>::Error: Into<http::Error>,
        V: TryInto<HeaderValue>,
        <V as TryInto<HeaderValue>>::Error: Into<http::Error>,
    {
        self.step(|draft, context| {
            let invalid = |err: http::Error| Error::InvalidHeader {
                method: context.method.clone(),
                url: context.url.clone(),
                message: err.to_string(),
            };
            let name: HeaderName = name.try_into().map_err(|e| invalid(e.into()))?;
            let value: HeaderValue = value.try_into().map_err(|e| invalid(e.into()))?;
            if name == CONTENT_TYPE {
                draft.drop_implicit_json();
            }
            draft.headers.append(name, value);
            Ok(())
        })
    }

    /// Appends a query parameter to the URL.
    pub fn query(mut self, name: &str, value: &str) -> Self {
        if self.error.is_none() {
            self.context.url.query_pairs_mut().append_pair(name, value);
        }
        self
    }

    /// Registers a callback invoked on the outgoing request right before it
    /// is handed to the transport.
    ///
    /// The callback runs exactly once, after every other builder step,
    /// wherever it appears in the chain. Registering another callback
    /// replaces this one. An error from the callback fails the request with
    /// [`Error::Prepare`] and nothing is sent.
    pub fn prepare<F, E>(self, callback: F) -> Self
    where
        F: FnOnce(&mut http::Request<Body>) -> std::result::Result<(), E> + Send + 'static,
        E: Into<BoxError>,
    {
        self.step(|draft, _| {
            draft.prepare = Some(Box::new(move |request: &mut http::Request<Body>| {
                callback(request).map_err(Into::into)
            }));
            Ok(())
        })
    }

    /// HTTP method, as given by the caller.
    #[must_use]
    pub fn method(&self) -> &str {
        self.context.method()
    }

    /// Request URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        self.context.url()
    }

    /// The body set so far, if any.
    ///
    /// On a failed request, this is the last body set before the failure.
    #[must_use]
    pub fn body(&self) -> Option<&Body> {
        self.draft.body.as_ref()
    }

    /// The headers set so far.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.draft.headers
    }

    /// The first error met while building, if any.
    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Returns `true` if a builder step has failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Sends the request through the transport.
    ///
    /// A failed request short-circuits without calling the transport.
    /// Otherwise the outgoing request is built, the prepare callback runs,
    /// and the transport is called exactly once.
    pub async fn send(self) -> Outcome {
        let Self {
            transport,
            context,
            draft,
            error,
        } = self;

        let response = match error {
            None => dispatch(transport.as_ref(), &context, draft).await,
            Some(err) => Err(err),
        };

        Outcome::new(context, response)
    }
}

async fn dispatch(
    transport: &dyn Transport,
    context: &RequestContext,
    draft: Draft,
) -> Result<http::Response<Body>> {
    let Draft {
        body,
        headers,
        prepare,
        ..
    } = draft;

    let method =
        http::Method::from_bytes(context.method.as_bytes()).map_err(|e| context.invalid_request(e))?;
    let mut request = http::Request::builder()
        .method(method)
        .uri(context.url.as_str())
        .body(body.unwrap_or_default())
        .map_err(|e| context.invalid_request(e))?;
    *request.headers_mut() = headers;

    if let Some(prepare) = prepare {
        prepare(&mut request).map_err(|source| Error::Prepare {
            method: context.method.clone(),
            url: context.url.clone(),
            source,
        })?;
    }

    transport
        .execute(request)
        .await
        .map_err(|source| Error::Transport {
            method: context.method.clone(),
            url: context.url.clone(),
            source,
        })
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Request");
        debug
            .field("method", &self.context.method)
            .field("url", &self.context.url.as_str())
            .field("headers", &self.draft.headers)
            .field("body", &self.draft.body)
            .field("prepare", &self.draft.prepare.is_some());
        if let Some(err) = &self.error {
            debug.field("error", err);
        }
        debug.finish_non_exhaustive()
    }
}
