//! ReviewPilot
//!
//! Command-line front end to the review intelligence service. Reviews live
//! in memory for the duration of one invocation; `--reviews` seeds them.

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use reviewpilot_core::Review;
use reviewpilot_service::cli::{Cli, Commands};
use reviewpilot_service::{ReviewIntelligence, ServiceConfig};
use serde::Serialize;
use std::path::Path;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    let metrics_handle = init_metrics()?;

    let mut config = ServiceConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if cli.seed.is_some() {
        config.replies.seed = cli.seed;
    }
    info!(config = %cli.config.display(), "Configuration loaded");

    let service = ReviewIntelligence::builder(config).start().await?;

    if let Some(path) = &cli.reviews {
        let summary = service.ingest(read_reviews(path)?).await?;
        info!(ingested = summary.ingested, "Seed reviews loaded");
    }

    let filters = cli.command.filters();
    match cli.command {
        Commands::Health { prometheus } => {
            print_json(&service.health_check())?;
            if prometheus {
                println!("{}", metrics_handle.render());
            }
        }
        Commands::Ingest { file } => {
            print_json(&service.ingest(read_reviews(&file)?).await?)?;
        }
        Commands::Process => {
            print_json(&service.process_reviews().await?)?;
        }
        Commands::Search { query, k } => {
            print_json(&service.search(&query, k)?)?;
        }
        Commands::Analytics => {
            print_json(&service.get_analytics().await?)?;
        }
        Commands::Reply { id } => {
            print_json(&service.suggest_reply(id).await?)?;
        }
        Commands::List {
            page, page_size, ..
        } => {
            let filters = filters.unwrap_or_default();
            print_json(&service.list_reviews(&filters, page, page_size).await?)?;
        }
    }

    service.shutdown();
    Ok(())
}

fn read_reviews(path: &Path) -> Result<Vec<Review>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading reviews from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("parsing reviews from {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("reviewpilot=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reviewpilot=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Install the Prometheus recorder behind the `metrics` facade
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_histogram!(
        "reviewpilot_operation_seconds",
        metrics::Unit::Seconds,
        "Pipeline operation latency in seconds by operation"
    );

    Ok(handle)
}
