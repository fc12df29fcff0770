//! Schema installation and the drop-all reset.

use serde_json::{json, Value};

use crate::client::{GraphClient, GraphError};

/// Types, predicates and index directives for the campus graph.
///
/// Single-valued uid predicates carry `@reverse` so they can be walked from
/// either endpoint; `coauthor` is a uid list.
pub const SCHEMA: &str = r#"
type Student {
    username
    email
    enrollment_date
    location
    enrolled_in
    submits
    follows
}

type Instructor {
    name
    expertise
    rating
    teaches
    coauthor
}

type Course {
    title
    category
    difficulty_level
    assigned_in
}

type Assignment {
    title
    due_date
    score
}

username: string @index(exact) .
email: string .
enrollment_date: datetime @index(day) .
location: geo @index(geo) .

title: string @index(term) .
category: string .
difficulty_level: string .

name: string @index(exact) .
expertise: string .
rating: float @index(float) .

due_date: datetime @index(hour) .
score: int .

enrolled_in: uid @reverse .
submits: uid @reverse .
follows: uid @reverse .
teaches: uid @reverse .
assigned_in: uid @reverse .
coauthor: [uid] .
"#;

impl GraphClient {
    /// Install [`SCHEMA`]. Applying it again leaves the schema unchanged.
    pub async fn set_schema(&self) -> Result<(), GraphError> {
        self.alter_schema(SCHEMA).await
    }

    /// Send a raw schema alteration. Dgraph rejects malformed directives.
    pub async fn alter_schema(&self, schema: &str) -> Result<(), GraphError> {
        let request = self.http.post(self.url("alter")).body(schema.to_string());
        self.send::<Value>(request).await?;
        tracing::info!(bytes = schema.len(), "Schema applied");
        Ok(())
    }

    /// Irreversibly remove every schema entry and every node.
    pub async fn drop_all(&self) -> Result<(), GraphError> {
        let request = self
            .http
            .post(self.url("alter"))
            .json(&json!({ "drop_all": true }));
        self.send::<Value>(request).await?;
        tracing::warn!("Dropped all schema and data");
        Ok(())
    }
}
