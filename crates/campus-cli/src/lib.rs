//! campus-cli: Interactive menu over the campus knowledge graph.
//!
//! Loads the Dgraph endpoint configuration, then drives the numbered menu
//! that loads the sample graph, runs the canned lookups and resets the
//! database.

pub mod config;
pub mod menu;
