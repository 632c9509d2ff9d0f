//! The result of sending a request.
//!
//! An [`Outcome`] holds either the response or the error that prevented it.
//! Its terminal operations consume it, so a response body is read at most
//! once and released on every path.
//!
//! Every terminal operation applies the same rules, in order:
//!
//! 1. an error stored in the outcome is returned as is;
//! 2. a status of 400 or more becomes [`Error::Status`], with the response
//!    body as message;
//! 3. otherwise the operation does its own work.

use bytes::Bytes;
use futures_util::StreamExt;
use http::response::Parts;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use url::Url;

use crate::{Body, Error, RequestContext, Result, StatusError, from_json};

/// Either the response to a request, or the error that prevented it.
#[must_use = "an outcome does nothing unless a terminal operation is awaited"]
#[derive(Debug)]
pub struct Outcome {
    request: RequestContext,
    response: Result<http::Response<Body>>,
}

impl Outcome {
    pub(crate) fn new(request: RequestContext, response: Result<http::Response<Body>>) -> Self {
        Self { request, response }
    }

    /// The request this outcome came from.
    #[must_use]
    pub fn request(&self) -> &RequestContext {
        &self.request
    }

    /// HTTP method of the originating request.
    #[must_use]
    pub fn method(&self) -> &str {
        self.request.method()
    }

    /// URL of the originating request.
    #[must_use]
    pub fn url(&self) -> &Url {
        self.request.url()
    }

    /// Returns `true` if a response was received, whatever its status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.response.is_ok()
    }

    /// The error that prevented a response, if any.
    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        self.response.as_ref().err()
    }

    /// Status of the received response, if any.
    #[must_use]
    pub fn status(&self) -> Option<http::StatusCode> {
        self.response.as_ref().ok().map(http::Response::status)
    }

    /// Returns the response with its body unread.
    ///
    /// # Errors
    ///
    /// Returns the stored error, or [`Error::Status`] for a 4xx/5xx response.
    pub async fn response(self) -> Result<http::Response<Body>> {
        check_status(&self.request, self.response?).await
    }

    /// Reads the whole response body into memory.
    ///
    /// # Errors
    ///
    /// Returns the stored error, [`Error::Status`] for a 4xx/5xx response,
    /// or [`Error::Read`] if the body cannot be read.
    pub async fn raw_bytes(self) -> Result<http::Response<Bytes>> {
        let response = check_status(&self.request, self.response?).await?;
        let (parts, bytes) = read_body(&self.request, response).await?;
        Ok(http::Response::from_parts(parts, bytes))
    }

    /// Copies the response body to `destination`, chunk by chunk, then
    /// flushes it.
    ///
    /// The returned response carries the number of bytes copied. If an error
    /// happens mid-way, `destination` may hold a partial body.
    ///
    /// # Errors
    ///
    /// Returns the stored error, [`Error::Status`] for a 4xx/5xx response,
    /// [`Error::Read`] if the body cannot be read, or [`Error::Copy`] if
    /// `destination` cannot be written.
    pub async fn stream_response<W>(self, destination: &mut W) -> Result<http::Response<u64>>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let response = check_status(&self.request, self.response?).await?;
        let (parts, mut body) = response.into_parts();

        let copy_error = |source| Error::Copy {
            method: self.request.method().to_owned(),
            url: self.request.url().clone(),
            source,
        };

        let mut copied = 0_u64;
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|source| self.request.read_error(source))?;
            destination.write_all(&chunk).await.map_err(copy_error)?;
            copied += chunk.len() as u64;
        }
        destination.flush().await.map_err(copy_error)?;

        Ok(http::Response::from_parts(parts, copied))
    }

    /// Decodes the response body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the stored error, [`Error::Status`] for a 4xx/5xx response,
    /// [`Error::Read`] if the body cannot be read, or [`Error::Decode`] if it
    /// is not a valid `T`.
    pub async fn decode_json<T>(self) -> Result<http::Response<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = check_status(&self.request, self.response?).await?;
        let (parts, value) = read_json(&self.request, response).await?;
        Ok(http::Response::from_parts(parts, value))
    }

    /// Decodes the response body as JSON into `destination`.
    ///
    /// `destination` is only written when decoding succeeds. The status
    /// check comes first, so an error response is reported as such even
    /// when `destination` is `None`.
    ///
    /// # Errors
    ///
    /// Same as [`Outcome::decode_json`], plus [`Error::MissingDestination`]
    /// when `destination` is `None`.
    pub async fn decode_json_into<T>(self, destination: Option<&mut T>) -> Result<http::Response<()>>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = check_status(&self.request, self.response?).await?;
        let Some(destination) = destination else {
            return Err(Error::MissingDestination {
                method: self.request.method().to_owned(),
                url: self.request.url().clone(),
            });
        };

        let (parts, value) = read_json(&self.request, response).await?;
        *destination = value;
        Ok(http::Response::from_parts(parts, ()))
    }
}

/// Turns a 4xx/5xx response into a [`StatusError`] carrying the body.
async fn check_status(request: &RequestContext, response: http::Response<Body>) -> Result<http::Response<Body>> {
    let status = response.status();
    if status.as_u16() < 400 {
        return Ok(response);
    }

    let message = match response.into_body().collect_bytes().await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(err) => format!("failed to read response body for '{request}': {err}"),
    };
    Err(StatusError::new(status.as_u16(), message).into())
}

async fn read_body(request: &RequestContext, response: http::Response<Body>) -> Result<(Parts, Bytes)> {
    let (parts, body) = response.into_parts();
    let bytes = body
        .collect_bytes()
        .await
        .map_err(|source| request.read_error(source))?;
    Ok((parts, bytes))
}

async fn read_json<T>(request: &RequestContext, response: http::Response<Body>) -> Result<(Parts, T)>
where
    T: serde::de::DeserializeOwned,
{
    let (parts, bytes) = read_body(request, response).await?;
    let value = from_json(&bytes).map_err(|(path, message)| Error::Decode {
        method: request.method().to_owned(),
        url: request.url().clone(),
        path,
        message,
    })?;
    Ok((parts, value))
}
