//! httpbin demo
//!
//! Walks a courier request chain end to end against <https://httpbin.org>,
//! or the server named by `HTTPBIN_URL`. Set `RUST_LOG=debug` to see the
//! transport logs.

// Demo-specific lint allowances
#![allow(missing_docs)]
#![allow(clippy::print_stdout)]

use courier::prelude::*;
use courier::url::Url;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Data Types
// ============================================================================

/// Answer of `/ip`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ip {
    pub origin: String,
}

/// What `/anything` echoes back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub json: Option<serde_json::Value>,
    #[serde(default)]
    pub args: serde_json::Map<String, serde_json::Value>,
}

/// A note sent to `/anything`.
#[derive(Debug, Clone, Serialize)]
pub struct Note {
    pub title: String,
    pub tags: Vec<String>,
}

// ============================================================================
// httpbin client
// ============================================================================

/// A few httpbin endpoints on top of a courier [`Client`].
#[derive(Debug, Clone)]
pub struct HttpBin {
    client: Client,
    base: Url,
}

impl HttpBin {
    pub fn new(client: Client, base: Url) -> Self {
        Self { client, base }
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        url.set_path(path);
        url
    }

    /// The caller's IP address.
    pub async fn ip(&self) -> courier::Result<Ip> {
        let response = self.client.get(self.endpoint("/ip")).send().await.decode_json().await?;
        Ok(response.into_body())
    }

    /// Posts `note` as JSON and returns what the server saw.
    pub async fn post_note(&self, note: &Note) -> courier::Result<Echo> {
        let mut echo = Echo::default();
        self.client
            .post(self.endpoint("/anything"))
            .query("source", "courier")
            .header("Accept", "application/json")
            .encode_json(note)
            .send()
            .await
            .decode_json_into(Some(&mut echo))
            .await?;
        Ok(echo)
    }

    /// Asks the server to answer with `code`; fails for 4xx and 5xx.
    pub async fn status(&self, code: u16) -> courier::Result<StatusCode> {
        let response = self
            .client
            .get(self.endpoint(&format!("/status/{code}")))
            .send()
            .await
            .response()
            .await?;
        Ok(response.status())
    }

    /// Streams `count` random bytes into `sink`, returns how many were copied.
    pub async fn download<W>(&self, count: usize, sink: &mut W) -> courier::Result<u64>
    where
        W: tokio::io::AsyncWrite + Unpin,
    {
        let response = self
            .client
            .get(self.endpoint(&format!("/bytes/{count}")))
            .send()
            .await
            .stream_response(sink)
            .await?;
        Ok(*response.body())
    }
}

// ============================================================================
// Main: Demonstrate usage
// ============================================================================

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // init tracing
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .try_init();

    let base = std::env::var("HTTPBIN_URL").unwrap_or_else(|_| "https://httpbin.org".to_string());
    let base = Url::parse(&base)?;

    let transport = HyperTransport::builder().with_logging().build();
    let httpbin = HttpBin::new(Client::with_transport(transport), base);

    let ip = httpbin.ip().await?;
    println!("Your IP: {}", ip.origin);

    let echo = httpbin
        .post_note(&Note {
            title: "hello".to_string(),
            tags: vec!["rust".to_string(), "http".to_string()],
        })
        .await?;
    println!("Server saw a {} with {:?}", echo.method, echo.json);

    match httpbin.status(418).await {
        Ok(status) => println!("Unexpected success: {status}"),
        Err(err) if err.is_client_error() => println!("Expected failure: {err}"),
        Err(err) => return Err(err.into()),
    }

    let mut sink = Vec::new();
    let copied = httpbin.download(1024, &mut sink).await?;
    info!(copied, "download complete");

    Ok(())
}

// ============================================================================
// Tests using wiremock
// ============================================================================
