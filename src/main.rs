//! Six Degrees CLI
//!
//! Main entry point for the `sixdegrees` command.

use clap::{ArgAction, Parser, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm};
use sixdegrees::cache::{ConnectionStore, SearchFilter, StoreConfig};
use sixdegrees::config::{OperatingMode, SixDegreesConfig};
use sixdegrees::graph::{GraphProvider, Identity, SnapshotProvider};
use sixdegrees::integrations::NeynarProvider;
use sixdegrees::search::{ConnectionOutcome, ConnectionService, PathFinder, SearchLimits};
use sixdegrees::{Result, SixDegreesError};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

/// Six Degrees - find the shortest follow path between two Farcaster accounts
#[derive(Parser, Debug)]
#[command(name = "sixdegrees")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.config/sixdegrees/config.yaml)
    #[arg(short, long, env = "SIXDEGREES_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file
    Init,

    /// Find the shortest path between two accounts
    Find {
        /// Source account (FID or @handle)
        from: String,

        /// Target account (FID or @handle)
        to: String,

        /// Search an offline JSON snapshot instead of the Neynar API
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Show logged searches, most recent first
    History {
        /// Only searches starting at this FID
        #[arg(long)]
        from: Option<i64>,

        /// Only searches ending at this FID
        #[arg(long)]
        to: Option<i64>,

        /// Maximum number of entries
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// List stored edges touching an account
    Edges {
        /// Account FID
        id: i64,
    },

    /// Show connection store statistics
    Stats,

    /// Clear the connection store (development mode only)
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    if let Err(e) = sixdegrees::logging::init_with_default(level) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init => handle_init_command(cli.config.as_deref()),
        Commands::Find { from, to, snapshot } => {
            let (config, store) = open(cli.config.as_deref()).await?;
            handle_find_command(&config, store, &from, &to, snapshot.as_deref()).await
        }
        Commands::History { from, to, limit } => {
            let (_, store) = open(cli.config.as_deref()).await?;
            handle_history_command(&store, from, to, limit).await
        }
        Commands::Edges { id } => {
            let (_, store) = open(cli.config.as_deref()).await?;
            handle_edges_command(&store, id).await
        }
        Commands::Stats => {
            let (config, store) = open(cli.config.as_deref()).await?;
            handle_stats_command(&config, &store).await
        }
        Commands::Reset { yes } => {
            let (config, store) = open(cli.config.as_deref()).await?;
            handle_reset_command(&config, &store, yes).await
        }
    }
}

/// Load configuration and open the connection store it points at
async fn open(config_path: Option<&Path>) -> Result<(SixDegreesConfig, ConnectionStore)> {
    let config = match config_path {
        Some(path) => SixDegreesConfig::load(path)?,
        None => SixDegreesConfig::load_default()?,
    };
    tracing::info!(mode = %config.mode, "Configuration loaded");

    let store = ConnectionStore::open(StoreConfig::from_settings(&config)).await?;
    Ok((config, store))
}

fn handle_init_command(config_path: Option<&Path>) -> Result<()> {
    let config_file = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(SixDegreesConfig::default_path);

    if config_file.exists() {
        println!("Configuration already exists at {}", config_file.display());
        return Ok(());
    }

    let config = SixDegreesConfig::default();
    config.save(&config_file)?;

    println!("✓ Created configuration at {}", config_file.display());
    println!();
    println!("Next steps:");
    println!("  1. Export your Neynar API key:");
    println!("     export {}=<key>", config.neynar.api_key_env);
    println!();
    println!("  2. Find a connection:");
    println!("     sixdegrees find @alice @bob");
    Ok(())
}

async fn handle_find_command(
    config: &SixDegreesConfig,
    store: ConnectionStore,
    from: &str,
    to: &str,
    snapshot: Option<&Path>,
) -> Result<()> {
    let provider: Arc<dyn GraphProvider> = match snapshot {
        Some(path) => Arc::new(SnapshotProvider::load(path)?),
        None => Arc::new(NeynarProvider::from_settings(&config.neynar)?),
    };

    let limits = SearchLimits::from(&config.search);
    let service = ConnectionService::new(PathFinder::with_limits(provider, store, limits));

    let outcome = service.connect_identifiers(from, to).await;
    println!("{}", outcome.message());

    if let ConnectionOutcome::Connected(path) = &outcome {
        println!();
        for (step, profile) in service.describe_path(path).await.iter().enumerate() {
            println!(
                "  {}. {} ({}) [fid {}]",
                step,
                profile.at_handle(),
                profile.display_name,
                profile.identity
            );
        }
    }
    Ok(())
}

async fn handle_history_command(
    store: &ConnectionStore,
    from: Option<i64>,
    to: Option<i64>,
    limit: usize,
) -> Result<()> {
    let filter = SearchFilter {
        from: from.map(parse_identity).transpose()?,
        to: to.map(parse_identity).transpose()?,
        limit: Some(limit),
    };

    let records = store.recent_searches(filter).await;
    if records.is_empty() {
        println!("No searches recorded.");
        return Ok(());
    }

    for record in records {
        let path = record
            .path()
            .map(|p| format!("{} ({} degrees)", p, p.degree()))
            .unwrap_or_else(|| format!("unreadable path {}", record.path_json));
        println!(
            "#{:<5} {}  {} -> {}  {}",
            record.id,
            record.created_at.format("%Y-%m-%d %H:%M:%S"),
            record.from,
            record.to,
            path
        );
    }
    Ok(())
}

async fn handle_edges_command(store: &ConnectionStore, id: i64) -> Result<()> {
    let identity = parse_identity(id)?;
    let edges = store.edges_from(identity).await;

    if edges.is_empty() {
        println!("No stored edges for {}.", identity);
        return Ok(());
    }

    println!("Stored edges for {} ({}):", identity, edges.len());
    for edge in edges {
        println!(
            "  {} -> {}  (seen {})",
            edge.from,
            edge.to,
            edge.last_updated.format("%Y-%m-%d %H:%M:%S")
        );
    }
    println!();
    let neighbors: Vec<String> = store
        .stored_neighbors(identity)
        .await
        .iter()
        .map(Identity::to_string)
        .collect();
    println!("Neighbors: {}", neighbors.join(", "));
    Ok(())
}

async fn handle_stats_command(config: &SixDegreesConfig, store: &ConnectionStore) -> Result<()> {
    let stats = store.stats().await?;

    println!("Connection store");
    if let Some(path) = store.path() {
        println!("  Path:     {}", path.display());
    }
    println!("  Mode:     {}", config.mode);
    println!("  Edges:    {}", stats.edge_count);
    println!("  Searches: {}", stats.search_count);
    Ok(())
}

async fn handle_reset_command(
    config: &SixDegreesConfig,
    store: &ConnectionStore,
    yes: bool,
) -> Result<()> {
    if config.mode == OperatingMode::Production {
        return Err(SixDegreesError::Forbidden(
            "reset is disabled in production mode".to_string(),
        ));
    }

    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Delete all stored edges and searches?")
            .default(false)
            .interact()
            .unwrap_or(false);
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    store.reset_all().await?;
    println!("✓ Connection store cleared");
    Ok(())
}

fn parse_identity(raw: i64) -> Result<Identity> {
    Identity::new(raw).ok_or_else(|| {
        SixDegreesError::InvalidInput(format!("identity must be positive, got {}", raw))
    })
}
