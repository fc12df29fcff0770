//! Configuration for the campus menu.
//!
//! The Dgraph endpoint is resolved from (in priority order):
//! 1. `DGRAPH_URI`
//! 2. `CAMPUS__DGRAPH__URI` and other `CAMPUS__` environment variables
//! 3. The `[dgraph]` section of `campus.toml`, if present
//! 4. `localhost:8080`

use campus_graph::client::DEFAULT_URI;
use campus_graph::GraphConfig;

/// Environment variable naming the Dgraph endpoint.
pub const URI_ENV: &str = "DGRAPH_URI";

/// Config file prefix looked up in the working directory.
pub const CONFIG_FILE: &str = "campus";

/// Load the graph configuration, honouring `DGRAPH_URI`.
pub fn load_graph_config(file_prefix: &str) -> anyhow::Result<GraphConfig> {
    load_graph_config_with(file_prefix, std::env::var(URI_ENV).ok())
}

/// Load the graph configuration with an explicit endpoint override.
pub fn load_graph_config_with(
    file_prefix: &str,
    uri_override: Option<String>,
) -> anyhow::Result<GraphConfig> {
    let cfg = config::Config::builder()
        .set_default("dgraph.uri", DEFAULT_URI)?
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix("CAMPUS")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("dgraph.uri", uri_override)?
        .build()?;

    let graph = cfg.get::<GraphConfig>("dgraph")?;
    tracing::debug!(uri = %graph.uri, "Resolved Dgraph endpoint");
    Ok(graph)
}
