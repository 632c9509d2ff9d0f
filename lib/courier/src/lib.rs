//! Fluent, short-circuiting HTTP request chains.
//!
//! Build a request step by step, send it once, and read the response with a
//! single terminal operation. The first failing step wins: everything after
//! it is skipped and the error comes out at the end of the chain.
//!
//! # Example
//!
//! ```no_run
//! use courier::prelude::*;
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Post {
//!     title: String,
//! }
//!
//! # async fn run() -> courier::Result<()> {
//! let client = Client::new();
//! let url = "https://httpbin.org/anything".parse().expect("valid URL");
//!
//! let mut echoed = serde_json::Value::Null;
//! client
//!     .post(url)
//!     .header("Accept", "application/json")
//!     .encode_json(&Post { title: "hello".to_string() })
//!     .send()
//!     .await
//!     .decode_json_into(Some(&mut echoed))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! Errors can be matched by status code against the [`StatusError`]
//! catalogue:
//!
//! ```no_run
//! # use courier::prelude::*;
//! # async fn run(client: Client, url: courier::url::Url) {
//! match client.get(url).send().await.raw_bytes().await {
//!     Ok(response) => println!("{} bytes", response.body().len()),
//!     Err(err) if err.is(&StatusError::NOT_FOUND) => println!("gone"),
//!     Err(err) => eprintln!("{err}"),
//! }
//! # }
//! ```
//!
//! Requests go through a [`Transport`]. [`Client::new`] uses a
//! [`HyperTransport`] with default settings; [`Client::with_transport`] takes
//! any other one, such as a [`transport_fn`] in tests or a tower service
//! wrapped in a [`ServiceTransport`].

mod client;
mod config;
mod connector;
mod error;
pub mod middleware;
pub mod prelude;
mod service;
mod transport;

// Re-export client and transport types
pub use client::Client;
pub use config::TransportConfig;
pub use error::TransportError;
pub use service::ServiceTransport;
pub use transport::{BoxedService, HyperTransport, HyperTransportBuilder};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use courier_core::{
    Body, BodyStream, BoxError, Error, Outcome, PrepareFn, Request, RequestContext, Result, StatusError,
    Transport, TransportFn, TransportFuture, from_json, to_json, transport_fn,
};

// Re-export http types for status codes and headers
pub use courier_core::{StatusCode, header};

pub use url;
