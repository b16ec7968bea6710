use std::path::PathBuf;

use clap::{Parser, Subcommand};
use url::Url;

use trackerhub_core::Category;

#[derive(Parser, Debug)]
#[command(name = "trackerhub")]
#[command(version, about = "Search private trackers through one canonical interface", long_about = None)]
pub struct Cli {
    /// Configuration file
    #[arg(short, long, env = "TRACKERHUB_CONFIG", default_value = "config.toml")]
    pub config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Print Prometheus metrics after the command
    #[arg(long)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the configured indexers (passwords redacted)
    List,
    /// Log in to each indexer and make sure it returns releases
    Check {
        /// Only check this indexer
        #[arg(short, long)]
        indexer: Option<String>,
    },
    /// Search one indexer
    Search {
        #[arg(short, long)]
        indexer: String,
        /// Free-text terms
        terms: Vec<String>,
        /// IMDb id (e.g. tt0133093); replaces the free text
        #[arg(long)]
        imdb: Option<String>,
        /// Category name (movies_hd) or numeric id (2040); repeatable
        #[arg(short = 'C', long = "category", value_parser = parse_category)]
        categories: Vec<Category>,
        #[arg(long)]
        season: Option<u32>,
        #[arg(long, requires = "season")]
        episode: Option<u32>,
        #[arg(short = 'n', long, default_value = "25")]
        limit: usize,
        /// Print releases as JSON
        #[arg(long)]
        json: bool,
    },
    /// Download the content behind a release link
    Download {
        #[arg(short, long)]
        indexer: String,
        link: Url,
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn parse_category(value: &str) -> Result<Category, String> {
    if let Ok(id) = value.parse::<u32>() {
        return Category::from_id(id).ok_or_else(|| format!("unknown category id {}", id));
    }
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| format!("unknown category '{}'", value))
}
