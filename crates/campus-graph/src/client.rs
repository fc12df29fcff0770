//! Dgraph connection management and the shared HTTP transport.

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Dgraph connection error: {0}")]
    Connection(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Dgraph returned HTTP {status}: {body}")]
    Server { status: u16, body: String },

    #[error("Dgraph error: {0}")]
    Dgraph(String),

    #[error("Transaction aborted: {0}")]
    Aborted(String),

    #[error("Transaction already committed or discarded")]
    TxnFinished,

    #[error("Read-only transactions cannot mutate or commit")]
    ReadOnly,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GraphError {
    /// Dgraph refused a lookup because the predicate has no index of the
    /// required kind. After a drop-all no index exists, and the graph is empty.
    pub fn is_missing_index(&self) -> bool {
        matches!(self, Self::Dgraph(message) if message.to_lowercase().contains("not indexed"))
    }
}

/// Endpoint used when neither a config file nor the environment names one.
pub const DEFAULT_URI: &str = "localhost:8080";

/// Configuration for connecting to Dgraph.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    /// `host:port` or a full URL of the Dgraph HTTP endpoint.
    #[serde(default = "default_uri")]
    pub uri: String,
}

fn default_uri() -> String {
    DEFAULT_URI.to_string()
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self { uri: default_uri() }
    }
}

impl GraphConfig {
    /// The endpoint as a base URL: scheme defaults to `http`, no trailing slash.
    pub fn base_url(&self) -> String {
        let trimmed = self.uri.trim().trim_end_matches('/');
        if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        }
    }
}

/// Dgraph client shared by every operation in the demo.
///
/// Created once at startup and passed by reference. Clone is cheap
/// (the inner reqwest client is an Arc).
#[derive(Debug, Clone)]
pub struct GraphClient {
    pub(crate) http: Client,
    base_url: String,
}

impl GraphClient {
    /// Build a client without touching the network.
    pub fn new(config: &GraphConfig) -> Result<Self, GraphError> {
        let http = Client::builder()
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url(),
        })
    }

    /// Build a client and verify the server answers its health check.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let client = Self::new(config)?;
        client.health().await?;
        tracing::info!(uri = %client.base_url, "Connected to Dgraph");
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe `/health`; any transport failure or non-2xx status is a
    /// connection error.
    pub async fn health(&self) -> Result<(), GraphError> {
        let response = self
            .http
            .get(self.url("health"))
            .send()
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GraphError::Connection(format!(
                "health check returned HTTP {status}"
            )));
        }
        Ok(())
    }

    /// Release the client. Pooled connections close when the last clone drops.
    pub fn close(self) {
        tracing::info!(uri = %self.base_url, "Released Dgraph client");
    }

    pub(crate) fn url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url)
    }

    /// Send a request and unwrap Dgraph's `{data, errors, extensions}` envelope.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Reply<T>, GraphError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        let envelope: Envelope<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(GraphError::Serialization(e)),
            Err(_) => {
                return Err(GraphError::Server {
                    status: status.as_u16(),
                    body,
                })
            }
        };

        if !envelope.errors.is_empty() {
            let message = envelope
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            tracing::debug!(%status, %message, "Dgraph reported errors");
            return Err(if message.to_lowercase().contains("aborted") {
                GraphError::Aborted(message)
            } else {
                GraphError::Dgraph(message)
            });
        }

        if !status.is_success() {
            return Err(GraphError::Server {
                status: status.as_u16(),
                body,
            });
        }

        Ok(Reply {
            data: envelope.data,
            txn: envelope.extensions.and_then(|ext| ext.txn),
        })
    }
}

// ── Wire envelope ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<ServerMessage>,
    #[serde(default)]
    extensions: Option<Extensions>,
}

#[derive(Debug, Deserialize)]
struct ServerMessage {
    message: String,
}

#[derive(Debug, Deserialize)]
struct Extensions {
    #[serde(default)]
    txn: Option<TxnContext>,
}

/// Transaction bookkeeping Dgraph attaches to query and mutation replies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct TxnContext {
    #[serde(default)]
    pub start_ts: u64,
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub preds: Vec<String>,
}

/// A successful reply: the payload plus any transaction context.
#[derive(Debug)]
pub(crate) struct Reply<T> {
    pub data: Option<T>,
    pub txn: Option<TxnContext>,
}
