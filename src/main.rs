use anyhow::Result;
use clap::{Parser, Subcommand};
use explorer::clustering::{run_clustering, run_elbow};
use explorer::config::{AnalyticsConfig, StoreConfig};
use explorer::explorer::{explore, export_page, list_datasets, ExplorerRequest};
use explorer::{init_logging, serve, AnalyticsStore, AppState, DatabaseConnection, MySqlStore, SortDirection};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "explorer")]
#[command(about = "Table explorer and quantile clustering service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        #[arg(short, long, default_value = "50001")]
        port: u16,

        #[arg(short = 'b', long, default_value = "127.0.0.1")]
        host: String,
    },
    /// List datasets with their row counts
    Tables,
    /// Print one page of a table
    Explore {
        #[arg(short, long)]
        table: String,

        #[arg(short, long)]
        query: Option<String>,

        #[arg(short, long)]
        sort: Option<String>,

        #[arg(short, long)]
        dir: Option<String>,

        #[arg(short, long, default_value = "0")]
        page: i64,

        /// Write the page as CSV instead of JSON
        #[arg(long)]
        csv: bool,
    },
    /// Cluster a table into quantile bins
    Cluster {
        #[arg(short, long)]
        table: Option<String>,

        #[arg(short, long, default_value = "3")]
        k: i64,
    },
    /// SSE for k = 2..=8
    Elbow {
        #[arg(short, long)]
        table: Option<String>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    init_logging();

    // Parse command line arguments
    let cli = Cli::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    let store_config = StoreConfig::from_env()?;
    let config = AnalyticsConfig::from_env()?;
    let store = Arc::new(MySqlStore::new(store_config));
    if let Err(e) = store.connect().await {
        // The server can start degraded and report it on /health.
        if !matches!(cli.command, Commands::Serve { .. }) {
            return Err(e.into());
        }
        warn!("Starting without a store connection: {}", e);
    }

    let result = run(cli.command, Arc::clone(&store), config).await;
    if let Err(e) = &result {
        error!("Command failed: {}", e);
    }

    store.disconnect().await?;
    result
}

async fn run(command: Commands, store: Arc<MySqlStore>, config: AnalyticsConfig) -> Result<()> {
    let backend: &dyn AnalyticsStore = store.as_ref();

    match command {
        Commands::Serve { host, port } => {
            info!("Starting API server");
            serve(host, port, AppState::new(store.clone(), config)).await?;
        }
        Commands::Tables => {
            print_json(&list_datasets(backend, &config).await?)?;
        }
        Commands::Explore {
            table,
            query,
            sort,
            dir,
            page,
            csv,
        } => {
            let request = ExplorerRequest {
                table,
                search: query,
                sort,
                direction: SortDirection::parse(dir.as_deref()),
                page,
            };
            if csv {
                let (filename, bytes) = export_page(backend, &config, &request).await?;
                info!("Writing {} to stdout", filename);
                std::io::stdout().write_all(&bytes)?;
            } else {
                print_json(&explore(backend, &config, &request).await?)?;
            }
        }
        Commands::Cluster { table, k } => {
            print_json(&run_clustering(backend, &config, table.as_deref(), k).await?)?;
        }
        Commands::Elbow { table } => {
            print_json(&run_elbow(backend, &config, table.as_deref()).await?)?;
        }
    }

    Ok(())
}
