//! Core domain types for the campus knowledge graph.
//!
//! Each struct mirrors one Dgraph type from the schema. Field names are the
//! predicate names, so a value serializes directly into a JSON mutation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Identifiers ───────────────────────────────────────────────────

/// A client-side placeholder (`_:label`) for a node that does not exist yet.
///
/// Dgraph resolves every blank node in a mutation to a fresh uid on commit and
/// reports the mapping keyed by `label`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlankNode(String);

impl BlankNode {
    pub fn new(label: &str) -> Self {
        Self(format!("_:{label}"))
    }

    /// The label without the `_:` prefix, as it appears in the uid map.
    pub fn label(&self) -> &str {
        self.0.strip_prefix("_:").unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A bare reference to a node declared elsewhere in the same mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    pub uid: BlankNode,
}

/// The graph types declared in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Student,
    Instructor,
    Course,
    Assignment,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Instructor => "Instructor",
            Self::Course => "Course",
            Self::Assignment => "Assignment",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Edges ─────────────────────────────────────────────────────────

/// The object of a uid predicate: either a nested node created in place or a
/// reference to a blank node declared elsewhere in the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Link<T> {
    Node(Box<T>),
    Ref(NodeRef),
}

impl<T> Link<T> {
    pub fn node(value: T) -> Self {
        Self::Node(Box::new(value))
    }

    pub fn to(uid: &BlankNode) -> Self {
        Self::Ref(NodeRef { uid: uid.clone() })
    }

    /// The nested node, if this link creates one.
    pub fn as_node(&self) -> Option<&T> {
        match self {
            Self::Node(node) => Some(node),
            Self::Ref(_) => None,
        }
    }

    pub fn as_ref_uid(&self) -> Option<&BlankNode> {
        match self {
            Self::Node(_) => None,
            Self::Ref(r) => Some(&r.uid),
        }
    }
}

// ── Values ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum GeoKind {
    Point,
}

/// A GeoJSON point, stored in a `geo` predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    kind: GeoKind,
    /// `[longitude, latitude]`, GeoJSON axis order.
    coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: GeoKind::Point,
            coordinates: [longitude, latitude],
        }
    }
}

// ── Node Types ────────────────────────────────────────────────────

/// A student enrolled in courses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub uid: BlankNode,
    #[serde(rename = "dgraph.type")]
    pub node_type: NodeType,
    pub username: String,
    pub email: String,
    pub enrollment_date: DateTime<Utc>,
    pub location: GeoPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrolled_in: Option<Link<Course>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submits: Option<Link<Assignment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follows: Option<Link<Instructor>>,
}

/// An instructor who teaches courses and coauthors with other instructors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instructor {
    pub uid: BlankNode,
    #[serde(rename = "dgraph.type")]
    pub node_type: NodeType,
    pub name: String,
    pub expertise: String,
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teaches: Option<Link<Course>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coauthor: Vec<Link<Instructor>>,
}

/// A course; `title` carries the term index used for text search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub uid: BlankNode,
    #[serde(rename = "dgraph.type")]
    pub node_type: NodeType,
    pub title: String,
    pub category: String,
    pub difficulty_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_in: Option<Link<Assignment>>,
}

/// A graded assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub uid: BlankNode,
    #[serde(rename = "dgraph.type")]
    pub node_type: NodeType,
    pub title: String,
    pub due_date: DateTime<Utc>,
    pub score: i64,
}
