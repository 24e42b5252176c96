//! Vitamins CLI — inspect and edit the breadcrumb trails and error logs a
//! tracker persisted for one namespace/version.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vitamins_cli::commands::{self, inspect, listen, maintain, record};
use vitamins_core::store::FileStore;
use vitamins_core::TrackerConfig;

/// Vitamins — breadcrumb and error tracker
#[derive(Parser)]
#[command(name = "vitamins", version, about = "Vitamins — breadcrumb and error tracker")]
pub struct Cli {
    /// Store location: a `.db` file (SQLite) or a directory of JSON files
    #[arg(long, env = "VITAMINS_STORE")]
    store: Option<PathBuf>,

    /// Tracker config file (YAML or JSON)
    #[arg(long, env = "VITAMINS_CONFIG")]
    config: Option<PathBuf>,

    /// Tracker namespace (ignored when --config is given)
    #[arg(long, default_value = "default")]
    namespace: String,

    /// Tracker config version (ignored when --config is given)
    #[arg(long = "app-version", default_value = "1.0")]
    app_version: String,

    /// Drop persisted entries older than this many hours
    #[arg(long)]
    ttl_hours: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the trail and the error log
    Show {
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// List errors sharing any of the given tags
    Search {
        /// Tag to match (repeatable)
        #[arg(long = "tag", required = true)]
        tags: Vec<String>,
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a breadcrumb
    Crumb {
        message: String,
        #[arg(long, default_value = "cli")]
        category: String,
        /// Metadata as key=value (repeatable)
        #[arg(long = "meta")]
        metadata: Vec<String>,
    },

    /// Record an error, attaching the current trail
    Send {
        message: String,
        #[arg(long, default_value = "Error")]
        name: String,
        /// HTTP status; also added as a tag
        #[arg(long)]
        status: Option<u16>,
        /// Tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Empty the trail and the error log
    Clear {
        /// Delete the stored keys instead of saving empty sequences
        #[arg(long)]
        purge: bool,
    },

    /// Rewrite the store without expired entries
    Prune,

    /// Read host events (JSON lines) from stdin until EOF or Ctrl-C
    Listen,
}

fn load_config(cli: &Cli) -> Result<TrackerConfig, String> {
    let mut config = match &cli.config {
        Some(path) => TrackerConfig::from_file(path).map_err(|e| e.to_string())?,
        None => TrackerConfig::new(&cli.namespace, &cli.app_version),
    };
    if let Some(ttl) = cli.ttl_hours {
        config.ttl_hours = ttl;
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<(), String> {
    let config = load_config(&cli)?;
    let store_path = cli.store.clone().unwrap_or_else(FileStore::default_dir);
    tracing::debug!("Using store at {}", store_path.display());

    let mut tracker = commands::open_tracker(&store_path, config)?;

    match cli.command {
        Commands::Show { json } => inspect::show(&tracker, json),
        Commands::Search { tags, json } => inspect::search(&tracker, &tags, json),
        Commands::Crumb {
            message,
            category,
            metadata,
        } => record::crumb(&mut tracker, &message, &category, &metadata),
        Commands::Send {
            message,
            name,
            status,
            tags,
        } => record::send(&mut tracker, &message, &name, status, &tags),
        Commands::Clear { purge } => maintain::clear(&mut tracker, purge),
        Commands::Prune => maintain::prune(&mut tracker),
        Commands::Listen => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            listen::listen(tracker, stdin, true).await.map(|_| ())
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
