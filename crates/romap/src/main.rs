//! romap command-line front-end
//!
//! `romap search` geocodes a query and prints the result list as JSON;
//! `romap route` prints a driving route through the given waypoints.

mod telemetry;

use anyhow::Context;
use clap::{Parser, Subcommand};
use romap_common::CorrelationId;
use romap_config::ApplicationConfig;
use romap_config::source::{ConfigurationLoader, EnvironmentSource, TomlFileSource};
use romap_geocoding::{GeocodeService, OsrmRouter, RouteProvider, SearchService, Waypoint};
use std::path::{Path, PathBuf};

/// Romanian road-infrastructure search
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Optional configuration file path (TOML format)
    #[arg(long, short = 'c', global = true)]
    config_file: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Also write logs to a daily-rolling file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search places, roads and highways
    Search {
        /// Free-text query, e.g. "A1" or "Sibiu"
        #[arg(required = true)]
        query: Vec<String>,

        /// Return backend extents as-is, without supplementary queries
        #[arg(long)]
        no_enrich: bool,
    },
    /// Compute a driving route through two or more waypoints
    Route {
        /// Waypoints as LAT,LNG
        #[arg(required = true, num_args = 2..)]
        waypoints: Vec<Waypoint>,
    },
}

fn load_config(config_file: Option<&Path>) -> anyhow::Result<ApplicationConfig> {
    let mut loader = ConfigurationLoader::new();
    if let Some(path) = config_file {
        anyhow::ensure!(path.exists(), "Config file '{}' not found", path.display());
        loader = loader.add_source(Box::new(TomlFileSource::new(path)));
    }
    loader
        .add_source(Box::new(EnvironmentSource))
        .load()
        .context("Invalid configuration")
}

async fn run_search(config: &ApplicationConfig, query: &str) -> anyhow::Result<()> {
    let service = GeocodeService::from_config(config)?;
    let correlation_id = CorrelationId::new();

    // A failed search is shown as no results
    let results = match service.search(query, &correlation_id).await {
        Ok(results) => results,
        Err(e) => {
            tracing::error!(correlation_id = %correlation_id, error = %e, "Search failed");
            Vec::new()
        }
    };

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

async fn run_route(config: &ApplicationConfig, waypoints: &[Waypoint]) -> anyhow::Result<()> {
    let router = OsrmRouter::new(&config.routing)?;
    let correlation_id = CorrelationId::new();

    let plan = router
        .fetch_route(waypoints, &correlation_id)
        .await
        .with_context(|| format!("Route request failed (correlation: {correlation_id})"))?;

    if plan.is_none() {
        tracing::warn!("No route found");
    }
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize environment (load .env, etc.)
    romap_common::initialize_environment();

    let args = Args::parse();

    let mut config = load_config(args.config_file.as_deref())?;

    // Command-line flags override file and environment settings
    if args.json_logs {
        config.telemetry.json_logs = true;
    }
    if let Some(log_dir) = args.log_dir {
        config.telemetry.log_dir = Some(log_dir);
    }

    let _guards = telemetry::init(&config.telemetry)?;
    tracing::debug!(?config, "Configuration loaded");

    match args.command {
        Command::Search { query, no_enrich } => {
            if no_enrich {
                config.enrichment.enabled = false;
            }
            run_search(&config, &query.join(" ")).await
        }
        Command::Route { waypoints } => run_route(&config, &waypoints).await,
    }
}
