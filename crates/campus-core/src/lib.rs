//! campus-core: Domain entities for the campus knowledge graph.
//!
//! This crate provides the typed building blocks that the Dgraph client
//! serializes into mutation payloads:
//! - Node types (Student, Instructor, Course, Assignment)
//! - Blank-node identifiers and cross-links between nodes
//! - The hand-authored sample dataset loaded by the demo

pub mod sample;
pub mod types;

pub use types::{
    Assignment, BlankNode, Course, GeoPoint, Instructor, Link, NodeRef, NodeType, Student,
};
