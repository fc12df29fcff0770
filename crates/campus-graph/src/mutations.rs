//! Write operations for the campus graph.
//!
//! Both writes run in a single transaction that is committed on success and
//! discarded on every other path, so a failure never leaves a partial write.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::json;

use campus_core::sample::sample_graph;
use campus_core::Student;

use crate::client::{GraphClient, GraphError};
use crate::txn::Mutation;

/// Instructors rated strictly below this are removed by the cleanup.
pub const LOW_RATING_THRESHOLD: f64 = 4.0;

/// Instructor uids under a rating bound, read inside the deleting transaction.
pub const LOW_RATED_INSTRUCTORS: &str = r#"
query low_rated($max: float) {
    to_delete(func: lt(rating, $max)) @filter(type(Instructor)) {
        uid
    }
}
"#;

#[derive(Debug, Deserialize)]
struct LowRated {
    #[serde(default)]
    to_delete: Vec<UidRecord>,
}

#[derive(Debug, Deserialize)]
struct UidRecord {
    uid: String,
}

impl GraphClient {
    /// Re-apply the schema and load the sample graph.
    ///
    /// Returns blank-node label → uid for every node created.
    pub async fn load_sample_data(&self) -> Result<BTreeMap<String, String>, GraphError> {
        self.set_schema().await?;
        self.load_graph(&sample_graph()).await
    }

    /// Create a nested student graph in one mutation and commit it.
    pub async fn load_graph(&self, root: &Student) -> Result<BTreeMap<String, String>, GraphError> {
        let mutation = Mutation::set(root)?;
        let mut txn = self.txn();

        let outcome = async {
            let result = txn.mutate(mutation).await?;
            txn.commit().await?;
            Ok::<_, GraphError>(result.uids)
        }
        .await;

        let uids = txn.finish(outcome).await?;
        tracing::info!(
            root = %root.uid,
            created = uids.len(),
            "Loaded student graph"
        );
        Ok(uids)
    }

    /// Delete every instructor rated below `max_rating`.
    ///
    /// The matching uids are read in the same transaction that deletes them,
    /// so the delete set comes from one snapshot. If the commit conflicts,
    /// nothing is deleted. Without a `rating` index nothing matches. Returns
    /// the deleted uids.
    pub async fn delete_instructors_below(
        &self,
        max_rating: f64,
    ) -> Result<Vec<String>, GraphError> {
        let vars = BTreeMap::from([("$max".to_string(), max_rating.to_string())]);
        let mut txn = self.txn();

        let outcome = async {
            let data = match txn.query_with_vars(LOW_RATED_INSTRUCTORS, &vars).await {
                Err(e) if e.is_missing_index() => json!({}),
                other => other?,
            };
            let matched: LowRated = serde_json::from_value(data)?;

            let mut deleted = Vec::with_capacity(matched.to_delete.len());
            for record in matched.to_delete {
                txn.mutate(Mutation::delete(&json!({ "uid": &record.uid }))?)
                    .await?;
                deleted.push(record.uid);
            }

            txn.commit().await?;
            Ok::<_, GraphError>(deleted)
        }
        .await;

        let deleted = txn.finish(outcome).await?;
        tracing::info!(max_rating, deleted = deleted.len(), "Deleted low-rated instructors");
        Ok(deleted)
    }
}
