mod cli;
mod metrics;

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use trackerhub_core::{
    load_config, validate_config, Category, Config, IndexerAdapter, IndexerRegistry, Release,
    SanitizedConfig, SearchQuery, TracingParseErrorSink,
};

use cli::{Cli, Commands};
use metrics::encode_metrics;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    // Logs go to stderr, stdout carries command output
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli) -> Result<()> {
    info!("Loading configuration from {:?}", cli.config);
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    validate_config(&config).context("Configuration validation failed")?;
    info!(indexers = config.indexers.len(), "Configuration loaded successfully");

    let result = match cli.command {
        Commands::List => list(&config),
        Commands::Check { indexer } => check(&config, indexer.as_deref()).await,
        Commands::Search {
            indexer,
            terms,
            imdb,
            categories,
            season,
            episode,
            limit,
            json,
        } => {
            let mut query = SearchQuery::term(terms.join(" ")).with_categories(categories);
            query.imdb_id = imdb;
            query = match (season, episode) {
                (Some(s), Some(e)) => query.with_episode(s, e),
                (Some(s), None) => query.with_season(s),
                _ => query,
            };
            search(&config, &indexer, &query, limit, json).await
        }
        Commands::Download {
            indexer,
            link,
            output,
        } => download(&config, &indexer, &link, &output).await,
    };

    if cli.metrics {
        print!("{}", encode_metrics()?);
    }

    result
}

fn list(config: &Config) -> Result<()> {
    let sanitized = SanitizedConfig::from(config);
    println!(
        "{}",
        serde_json::to_string_pretty(&sanitized).context("Failed to serialize configuration")?
    );
    Ok(())
}

fn build_registry(config: &Config) -> Result<IndexerRegistry> {
    IndexerRegistry::from_config(config, Arc::new(TracingParseErrorSink))
        .context("Failed to create indexers")
}

fn find_indexer(registry: &IndexerRegistry, id: &str) -> Result<Arc<dyn IndexerAdapter>> {
    registry.get(id).ok_or_else(|| {
        anyhow!(
            "Unknown or disabled indexer '{}' (available: {})",
            id,
            registry.ids().join(", ")
        )
    })
}

async fn check(config: &Config, only: Option<&str>) -> Result<()> {
    let registry = build_registry(config)?;
    let indexers: Vec<Arc<dyn IndexerAdapter>> = match only {
        Some(id) => vec![find_indexer(&registry, id)?],
        None => registry.iter().cloned().collect(),
    };

    let mut failed = 0;
    for indexer in &indexers {
        match indexer.check().await {
            Ok(count) => println!("{}: ok ({} releases)", indexer.id(), count),
            Err(e) => {
                failed += 1;
                println!("{}: FAILED: {}", indexer.id(), e);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} indexers failed the check", failed, indexers.len());
    }
    Ok(())
}

async fn search(
    config: &Config,
    indexer_id: &str,
    query: &SearchQuery,
    limit: usize,
    json: bool,
) -> Result<()> {
    let registry = build_registry(config)?;
    let indexer = find_indexer(&registry, indexer_id)?;

    let mut releases = indexer
        .search(query)
        .await
        .with_context(|| format!("Search on '{}' failed", indexer_id))?;
    releases.truncate(limit);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&releases).context("Failed to serialize releases")?
        );
    } else {
        for release in &releases {
            print_release(release);
        }
        info!(count = releases.len(), "Search finished");
    }
    Ok(())
}

async fn download(config: &Config, indexer_id: &str, link: &Url, output: &Path) -> Result<()> {
    let registry = build_registry(config)?;
    let indexer = find_indexer(&registry, indexer_id)?;

    let bytes = indexer
        .download(link)
        .await
        .with_context(|| format!("Download from '{}' failed", indexer_id))?;
    tokio::fs::write(output, &bytes)
        .await
        .with_context(|| format!("Failed to write {:?}", output))?;

    info!(bytes = bytes.len(), path = ?output, "Download saved");
    Ok(())
}

fn print_release(release: &Release) {
    let categories: Vec<&str> = release.categories.iter().map(|c| Category::name(*c)).collect();
    println!("{}", release.title);
    println!(
        "  {} | S:{} P:{} | DL x{} UL x{} | {} | {}",
        format_size(release.size_bytes),
        release.seeders,
        release.peers,
        release.download_volume_factor,
        release.upload_volume_factor,
        release.publish_date.format("%Y-%m-%d %H:%M"),
        categories.join(", ")
    );
    println!("  {}", release.link);
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
