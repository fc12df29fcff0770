//! CLI entry point for the campus graph demo.
//!
//! Connects to Dgraph, installs the schema, then hands stdin/stdout to the
//! interactive menu. Logs go to stderr so stdout carries only the menu and
//! query results.

use std::process::ExitCode;

use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::{fmt, EnvFilter};

use campus_cli::config::{load_graph_config, CONFIG_FILE};
use campus_cli::menu::run_menu;
use campus_graph::GraphClient;

#[derive(Parser)]
#[command(name = "campus")]
#[command(about = "Interactive Dgraph demo over a small campus knowledge graph")]
#[command(version)]
struct Cli {}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let _cli = Cli::parse();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let graph_config = load_graph_config(CONFIG_FILE)?;
    let client = GraphClient::connect(&graph_config).await?;
    client.set_schema().await?;

    let input = BufReader::new(tokio::io::stdin());
    let mut output = std::io::stdout();
    run_menu(client, input, &mut output).await
}
