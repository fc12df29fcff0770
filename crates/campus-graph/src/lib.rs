//! campus-graph: Dgraph client for the campus knowledge graph.
//!
//! Every read and write the demo performs flows through [`GraphClient`]:
//! schema installation, the sample data load, the canned queries and the
//! conditional delete. Writes run inside a [`Txn`] that is always committed
//! or discarded before it goes away.

pub mod client;
pub mod mutations;
pub mod queries;
pub mod schema;
pub mod txn;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use txn::{Mutation, MutationResult, Txn};
