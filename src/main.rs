//! newsindex main entry point
//!
//! This is the command-line interface for the newsindex NNTP header indexer.

use clap::Parser;
use newsindex::config::{load_config_with_hash, validate, Config};
use newsindex::storage::{SqliteStorage, Storage};
use newsindex::{ClientPool, Indexer, IndexerHandle};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// newsindex: an unattended NNTP header indexer
///
/// newsindex polls the configured newsgroups over a pool of NNTP
/// connections, normalizes every new article's headers, and loads them
/// into a deduplicating SQLite database.
#[derive(Parser, Debug)]
#[command(name = "newsindex")]
#[command(version)]
#[command(about = "An unattended NNTP header indexer", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Number of NNTP connections, overriding the config file
    #[arg(short = 'c', long, value_name = "N")]
    connections: Option<usize>,

    /// Validate config and show what would be indexed without connecting
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(connections) = cli.connections {
        config.server.connections = connections;
        if let Err(e) = validate(&config) {
            tracing::error!("Invalid --connections: {}", e);
            return Err(e.into());
        }
    }

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_index(config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("newsindex=info,warn"),
            1 => EnvFilter::new("newsindex=debug,info"),
            2 => EnvFilter::new("newsindex=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what would be indexed
fn handle_dry_run(config: &Config) {
    println!("=== newsindex Dry Run ===\n");

    println!("Server:");
    println!("  Address: {}", config.addr());
    println!("  TLS: {}", if config.tls() { "yes" } else { "no" });
    match config.username() {
        Some(user) => println!("  Login: {}", user),
        None => println!("  Login: anonymous"),
    }
    println!("  Connections: {}", config.server.connections);
    println!("  Timeout: {}s", config.server.timeout);

    println!("\nStore:");
    println!("  Database: {}", config.database_path());

    println!("\nGroups ({}):", config.index_groups().len());
    for group in config.index_groups() {
        println!(
            "  - {} (every {}s)",
            group,
            config.group_delay(group).as_secs()
        );
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would index {} groups over {} connections",
        config.index_groups().len(),
        config.server.connections
    );
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use newsindex::output::{load_statistics, print_statistics};

    println!("Database: {}\n", config.database_path());

    let storage = SqliteStorage::new(Path::new(config.database_path()))?;
    let stats = load_statistics(&storage, config.index_groups())?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main indexing operation: runs until Ctrl-C
async fn handle_index(config: Config, config_hash: &str) -> Result<(), Box<dyn std::error::Error>> {
    let database_path = Path::new(config.database_path());
    let groups = config.index_groups().to_vec();

    if groups.is_empty() {
        tracing::warn!("No groups configured under [index], nothing to do");
        return Ok(());
    }

    let mut storage = SqliteStorage::new(database_path)?;
    let run_id = storage.create_run(config_hash, &groups)?;
    tracing::info!("Starting run {} for {} groups", run_id, groups.len());

    let client = ClientPool::start(config.server.clone(), config.server.connections);

    let mut indexers: Vec<IndexerHandle> = Vec::with_capacity(groups.len());
    for group in &groups {
        let store = SqliteStorage::new(database_path)?;
        let delay = config.group_delay(group);
        let indexer = Indexer::new(group.as_str(), delay, client.clone(), store);
        indexers.push(indexer.start());
    }

    let pipelines = join_all(indexers);
    tokio::select! {
        _ = pipelines => {
            tracing::warn!("All indexers stopped");
        }
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("Interrupted, shutting down");
        }
    }

    Ok(())
}

/// Waits on every indexer
async fn join_all(indexers: Vec<IndexerHandle>) {
    let mut waiting = tokio::task::JoinSet::new();
    for indexer in indexers {
        waiting.spawn(indexer.join());
    }
    while waiting.join_next().await.is_some() {}
}
