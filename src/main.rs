use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use matcher_lib::cache::PostgresCacheStore;
use matcher_lib::config::ResolverConfig;
use matcher_lib::index::postgres::PostgresIndex;
use matcher_lib::resolver::Resolver;
use matcher_lib::utils::db_connect;
use matcher_lib::utils::env::load_env;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Batch driver: resolves company names against the reference registry and
/// prints one JSON object per input name.
#[derive(Parser)]
#[command(name = "resolve", about = "Resolve company names against the reference registry")]
struct Cli {
    /// Company names to resolve
    names: Vec<String>,

    /// File with one company name per line, merged after the positional names
    #[arg(long)]
    input: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    load_env();
    let cli = Cli::parse();

    let mut names = cli.names.clone();
    if let Some(path) = &cli.input {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read input file {}", path.display()))?;
        names.extend(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from),
        );
    }
    if names.is_empty() {
        anyhow::bail!("No names given; pass names as arguments or --input FILE");
    }

    let config = ResolverConfig::from_env();
    let pool = db_connect::connect()
        .await
        .context("Failed to connect to database")?;
    info!("Successfully connected to the database");

    let backend = Arc::new(PostgresIndex::new(pool.clone()));
    let cache_store = Arc::new(PostgresCacheStore::new(pool));
    let resolver = Arc::new(Resolver::new(
        backend.clone(),
        backend,
        cache_store,
        config,
    ));

    let pb = ProgressBar::new(names.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("█▉▊▋▌▍▎▏  "),
    );
    pb.set_message("Resolving names...");

    let chunk_size = resolver.config().max_concurrent_lookups.max(1);
    let mut resolved = HashMap::new();
    for chunk in names.chunks(chunk_size) {
        resolved.extend(resolver.resolve_batch(chunk).await);
        pb.inc(chunk.len() as u64);
    }
    pb.finish_with_message("Resolution complete");

    for name in &names {
        let line = match resolved.get(name) {
            Some(company) => serde_json::json!({
                "name": name,
                "result": company.result,
                "metric": company.metric,
            }),
            None => serde_json::json!({
                "name": name,
                "error": "lookup failed",
            }),
        };
        println!("{}", serde_json::to_string(&line)?);
    }

    info!("Resolved {} of {} names", resolved.len(), names.len());
    Ok(())
}
