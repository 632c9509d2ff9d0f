//! Request and response bodies.
//!
//! A [`Body`] is a single-read byte stream. It is either empty, a buffer
//! already in memory, or a stream of chunks produced by a transport.
//! Dropping a body releases whatever it was reading from.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures_core::Stream;
use futures_util::{StreamExt, TryStreamExt};

use crate::BoxError;

/// A boxed stream of body chunks.
pub type BodyStream = Pin<Box<dyn Stream<Item = std::result::Result<Bytes, BoxError>> + Send>>;

/// HTTP body: empty, buffered, or streamed.
#[derive(Default)]
pub struct Body {
    kind: Kind,
}

#[derive(Default)]
enum Kind {
    #[default]
    Empty,
    Full(Bytes),
    Stream(BodyStream),
}

impl Body {
    /// An empty body.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A body that yields the chunks of `stream`.
    pub fn from_stream<S, E>(stream: S) -> Self
    where
        S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        Self {
            kind: Kind::Stream(Box::pin(stream.map_err(Into::into))),
        }
    }

    /// The buffered content, if this body is held in memory.
    ///
    /// Returns `None` for streamed bodies.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.kind {
            Kind::Empty => Some(&[][..]),
            Kind::Full(bytes) => Some(bytes.as_ref()),
            Kind::Stream(_) => None,
        }
    }

    /// Returns `true` if the body is known to contain no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_some_and(<[u8]>::is_empty)
    }

    /// Read the whole body into memory.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by the underlying stream.
    pub async fn collect_bytes(self) -> std::result::Result<Bytes, BoxError> {
        match self.kind {
            Kind::Empty => Ok(Bytes::new()),
            Kind::Full(bytes) => Ok(bytes),
            Kind::Stream(mut stream) => {
                let mut collected = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    collected.extend_from_slice(&chunk?);
                }
                Ok(collected.freeze())
            }
        }
    }
}

impl Stream for Body {
    type Item = std::result::Result<Bytes, BoxError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match std::mem::take(&mut self.kind) {
            Kind::Empty => Poll::Ready(None),
            Kind::Full(bytes) if bytes.is_empty() => Poll::Ready(None),
            Kind::Full(bytes) => Poll::Ready(Some(Ok(bytes))),
            Kind::Stream(mut stream) => {
                let poll = stream.as_mut().poll_next(cx);
                if !matches!(poll, Poll::Ready(None)) {
                    self.kind = Kind::Stream(stream);
                }
                poll
            }
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Empty => f.write_str("Body(Empty)"),
            Kind::Full(bytes) => f.debug_tuple("Body").field(bytes).finish(),
            Kind::Stream(_) => f.write_str("Body(Stream)"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self {
            kind: Kind::Full(bytes),
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes::from(bytes).into()
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Bytes::from(text).into()
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Bytes::from_static(text.as_bytes()).into()
    }
}

impl From<&'static [u8]> for Body {
    fn from(bytes: &'static [u8]) -> Self {
        Bytes::from_static(bytes).into()
    }
}

// ============================================================================
// JSON helpers
// ============================================================================

/// Serialize a value to JSON bytes.
///
/// # Errors
///
/// Returns the `serde_json` error if serialization fails.
///
/// # Example
///
/// ```
/// use courier_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct User { name: String }
///
/// let user = User { name: "Alice".to_string() };
/// let bytes = to_json(&user).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"name":"Alice"}"#);
/// ```
pub fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> serde_json::Result<Bytes> {
    serde_json::to_vec(value).map(Bytes::from)
}

/// Deserialize JSON bytes with path-aware error reporting.
///
/// On failure returns `(path, message)`, where `path` locates the offending
/// field (e.g. `"user.address.city"`, or `"."` for syntax errors at the root).
///
/// # Example
///
/// ```
/// use courier_core::from_json;
/// use serde::Deserialize;
///
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct User { name: String }
///
/// let user: User = from_json(br#"{"name":"Alice"}"#).expect("deserialize");
/// assert_eq!(user, User { name: "Alice".to_string() });
/// ```
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> std::result::Result<T, (String, String)> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let value = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|e| (e.path().to_string(), e.inner().to_string()))?;
    deserializer
        .end()
        .map_err(|e| (".".to_string(), e.to_string()))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use futures_util::stream;

    use super::*;

    #[tokio::test]
    async fn collect_full_body() {
        let body = Body::from("hello");
        check!(body.as_bytes() == Some(&b"hello"[..]));
        let bytes = body.collect_bytes().await.expect("collect");
        check!(bytes == Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn collect_streamed_body() {
        let chunks = vec![Ok::<_, BoxError>(Bytes::from("hel")), Ok(Bytes::from("lo"))];
        let body = Body::from_stream(stream::iter(chunks));
        check!(body.as_bytes().is_none());
        check!(!body.is_empty());

        let bytes = body.collect_bytes().await.expect("collect");
        check!(bytes == Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn collect_stops_at_first_error() {
        let chunks = vec![Ok::<_, BoxError>(Bytes::from("par")), Err("connection reset".into())];
        let body = Body::from_stream(stream::iter(chunks));

        let_assert!(Err(err) = body.collect_bytes().await);
        check!(err.to_string() == "connection reset");
    }

    #[tokio::test]
    async fn body_as_stream() {
        let mut body = Body::from("chunk");
        check!(body.next().await.map(Result::ok) == Some(Some(Bytes::from("chunk"))));
        check!(body.next().await.is_none());

        let mut empty = Body::empty();
        check!(empty.is_empty());
        check!(empty.next().await.is_none());
    }

    #[test]
    fn body_debug() {
        check!(format!("{:?}", Body::empty()) == "Body(Empty)");
        check!(format!("{:?}", Body::from("a")) == r#"Body(b"a")"#);
    }

    #[test]
    fn to_json_serialize() {
        #[derive(serde::Serialize)]
        struct Payload {
            #[serde(rename = "Val1")]
            val1: u32,
            #[serde(rename = "Val2")]
            val2: String,
        }

        let bytes = to_json(&Payload {
            val1: 1,
            val2: "a".to_string(),
        })
        .expect("serialize");
        check!(bytes.as_ref() == br#"{"Val1":1,"Val2":"a"}"#);
    }

    #[test]
    fn from_json_syntax_error() {
        #[derive(Debug, serde::Deserialize)]
        struct Payload {
            #[allow(dead_code)]
            a: u32,
        }

        let_assert!(Err((_, message)) = from_json::<Payload>(br#"{"a": 1"#));
        check!(message.contains("EOF"));
    }

    #[test]
    fn from_json_trailing_garbage() {
        let result = from_json::<u32>(b"1 2");
        check!(result.is_err());
    }

    #[test]
    fn from_json_missing_field_error_with_path() {
        #[derive(Debug, serde::Deserialize)]
        struct Address {
            #[allow(dead_code)]
            city: String,
        }

        #[derive(Debug, serde::Deserialize)]
        struct User {
            #[allow(dead_code)]
            address: Address,
        }

        let_assert!(Err((path, message)) = from_json::<User>(br#"{"address":{}}"#));
        check!(path == "address");
        check!(message.contains("city"));
    }
}
