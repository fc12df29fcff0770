//! Dgraph transactions over the HTTP API.
//!
//! A [`Txn`] starts lazily: the first query or mutation returns the
//! `start_ts` every later request in the same transaction reuses. Mutations
//! accumulate conflict keys and predicates, which the commit sends back.
//!
//! A write transaction is always committed or discarded. Callers finish it
//! with [`Txn::finish`]; a transaction dropped while still pending schedules
//! an abort on the current tokio runtime.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{GraphClient, GraphError, TxnContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxnState {
    Pending,
    Committed,
    Discarded,
}

/// One Dgraph transaction.
#[derive(Debug)]
pub struct Txn {
    client: GraphClient,
    read_only: bool,
    context: TxnContext,
    state: TxnState,
}

/// A JSON mutation: objects to set and/or objects to delete.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Mutation {
    #[serde(rename = "set", skip_serializing_if = "Option::is_none")]
    set_json: Option<Value>,
    #[serde(rename = "delete", skip_serializing_if = "Option::is_none")]
    delete_json: Option<Value>,
}

impl Mutation {
    /// Create (or add edges to) the nodes described by `value`.
    pub fn set<T: Serialize>(value: &T) -> Result<Self, GraphError> {
        Ok(Self {
            set_json: Some(serde_json::to_value(value)?),
            delete_json: None,
        })
    }

    /// Delete the nodes or edges described by `value`. An object holding only
    /// a `uid` removes every predicate of that node.
    pub fn delete<T: Serialize>(value: &T) -> Result<Self, GraphError> {
        Ok(Self {
            set_json: None,
            delete_json: Some(serde_json::to_value(value)?),
        })
    }
}

/// Outcome of a mutation.
#[derive(Debug, Clone, Default)]
pub struct MutationResult {
    /// Blank-node label (without `_:`) → server-assigned uid.
    pub uids: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct MutationData {
    #[serde(default)]
    uids: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Serialize)]
struct QueryBody<'a> {
    query: &'a str,
    variables: &'a BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct CommitBody<'a> {
    keys: &'a [String],
    preds: &'a [String],
}

impl GraphClient {
    /// Begin a read-write transaction.
    pub fn txn(&self) -> Txn {
        Txn::new(self.clone(), false)
    }

    /// Begin a read-only transaction; it never takes write locks and needs no
    /// commit.
    pub fn read_only_txn(&self) -> Txn {
        Txn::new(self.clone(), true)
    }

    async fn abort(&self, context: &TxnContext) -> Result<(), GraphError> {
        let request = self
            .http
            .post(self.url("commit"))
            .query(&[
                ("startTs", context.start_ts.to_string()),
                ("abort", "true".to_string()),
            ])
            .json(&CommitBody {
                keys: &context.keys,
                preds: &context.preds,
            });

        self.send::<Value>(request).await?;
        Ok(())
    }
}

impl Txn {
    fn new(client: GraphClient, read_only: bool) -> Self {
        Self {
            client,
            read_only,
            context: TxnContext::default(),
            state: TxnState::Pending,
        }
    }

    /// The server timestamp, once the first request has started the
    /// transaction.
    pub fn start_ts(&self) -> Option<u64> {
        (self.context.start_ts != 0).then_some(self.context.start_ts)
    }

    /// Run a query with named variables (`{"$title": "Graph"}`) and return the
    /// `data` tree.
    pub async fn query_with_vars(
        &mut self,
        query: &str,
        vars: &BTreeMap<String, String>,
    ) -> Result<Value, GraphError> {
        self.ensure_pending()?;

        let mut params = self.ts_param();
        if self.read_only {
            params.push(("ro", "true".to_string()));
        }

        let request = self
            .client
            .http
            .post(self.client.url("query"))
            .query(&params)
            .json(&QueryBody {
                query,
                variables: vars,
            });

        tracing::debug!(
            read_only = self.read_only,
            start_ts = self.context.start_ts,
            "Running Dgraph query"
        );
        let reply = self.client.send::<Value>(request).await?;
        self.merge(reply.txn);

        Ok(reply
            .data
            .unwrap_or_else(|| Value::Object(serde_json::Map::new())))
    }

    /// Apply a mutation inside this transaction. Nothing is visible to other
    /// transactions until [`Txn::commit`].
    pub async fn mutate(&mut self, mutation: Mutation) -> Result<MutationResult, GraphError> {
        self.ensure_pending()?;
        if self.read_only {
            return Err(GraphError::ReadOnly);
        }

        let request = self
            .client
            .http
            .post(self.client.url("mutate"))
            .query(&self.ts_param())
            .json(&mutation);

        let reply = self.client.send::<MutationData>(request).await?;
        self.merge(reply.txn);

        let uids = reply.data.and_then(|d| d.uids).unwrap_or_default();
        tracing::debug!(
            start_ts = self.context.start_ts,
            new_nodes = uids.len(),
            "Applied mutation"
        );
        Ok(MutationResult { uids })
    }

    /// Commit the transaction. On failure the transaction stays pending so
    /// that [`Txn::discard`] still aborts it.
    pub async fn commit(&mut self) -> Result<(), GraphError> {
        self.ensure_pending()?;
        if self.read_only {
            return Err(GraphError::ReadOnly);
        }
        if self.context.start_ts == 0 {
            self.state = TxnState::Committed;
            return Ok(());
        }

        let request = self
            .client
            .http
            .post(self.client.url("commit"))
            .query(&self.ts_param())
            .json(&CommitBody {
                keys: &self.context.keys,
                preds: &self.context.preds,
            });

        self.client.send::<Value>(request).await?;
        self.state = TxnState::Committed;
        tracing::info!(start_ts = self.context.start_ts, "Committed transaction");
        Ok(())
    }

    /// Abort the transaction if it is still pending. A no-op after commit.
    pub async fn discard(&mut self) -> Result<(), GraphError> {
        if self.state != TxnState::Pending {
            return Ok(());
        }
        self.state = TxnState::Discarded;

        if self.read_only || self.context.start_ts == 0 {
            return Ok(());
        }

        self.client.abort(&self.context).await?;
        tracing::debug!(start_ts = self.context.start_ts, "Discarded transaction");
        Ok(())
    }

    /// Discard the transaction and hand back `outcome`. The outcome's error
    /// wins over a discard error.
    pub async fn finish<T>(mut self, outcome: Result<T, GraphError>) -> Result<T, GraphError> {
        let discarded = self.discard().await;
        if let (Err(e), Err(_)) = (&discarded, &outcome) {
            tracing::warn!(error = %e, "Discard failed after transaction error");
        }
        let value = outcome?;
        discarded?;
        Ok(value)
    }

    fn ensure_pending(&self) -> Result<(), GraphError> {
        match self.state {
            TxnState::Pending => Ok(()),
            TxnState::Committed | TxnState::Discarded => Err(GraphError::TxnFinished),
        }
    }

    fn ts_param(&self) -> Vec<(&'static str, String)> {
        match self.start_ts() {
            Some(ts) => vec![("startTs", ts.to_string())],
            None => Vec::new(),
        }
    }

    fn merge(&mut self, reply: Option<TxnContext>) {
        let Some(reply) = reply else {
            return;
        };
        if self.context.start_ts == 0 {
            self.context.start_ts = reply.start_ts;
        }
        for key in reply.keys {
            if !self.context.keys.contains(&key) {
                self.context.keys.push(key);
            }
        }
        for pred in reply.preds {
            if !self.context.preds.contains(&pred) {
                self.context.preds.push(pred);
            }
        }
    }
}

impl Drop for Txn {
    fn drop(&mut self) {
        if self.state != TxnState::Pending || self.read_only || self.context.start_ts == 0 {
            return;
        }

        let start_ts = self.context.start_ts;
        tracing::warn!(start_ts, "Transaction dropped while pending, aborting");

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let client = self.client.clone();
        let context = std::mem::take(&mut self.context);
        handle.spawn(async move {
            if let Err(e) = client.abort(&context).await {
                tracing::warn!(start_ts, error = %e, "Failed to abort dropped transaction");
            }
        });
    }
}
