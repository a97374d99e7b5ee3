//! Billsplit - arithmetic and bill-splitting HTTP service with a persisted
//! audit trail.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use billsplit::audit::{default_db_path, AuditLogger, AuditStore};
use billsplit::config::load_config;
use billsplit::server::ApiServer;

#[derive(Parser)]
#[command(
    name = "billsplit",
    about = "Arithmetic and bill-splitting HTTP service with a persisted audit trail",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server.
    Serve {
        /// Path to a TOML config file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Host address to bind to (overrides config).
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config).
        #[arg(short, long)]
        port: Option<u16>,
        /// Path to the audit database (overrides config).
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Print the mean duration of successful calls for an operation.
    Average {
        /// Operation name (e.g. "add", "splitEqually").
        operation: String,
        /// Path to the audit database.
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Serve {
            config,
            host,
            port,
            db,
        } => serve(config, host, port, db).await,
        Commands::Average { operation, db } => average(&operation, db).await,
    };

    if let Err(error) = result {
        tracing::error!("{error}");
        std::process::exit(1);
    }
}

async fn serve(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    db: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(config_path.as_deref())?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let db_path = db
        .or(config.audit.db_path.clone())
        .unwrap_or_else(default_db_path);
    let store = AuditStore::open(&db_path).await?;
    tracing::info!(db = %db_path.display(), "Audit store opened");

    let audit = AuditLogger::new(store)
        .with_retry_policy(config.audit.retry_policy())
        .with_cache_capacity(config.audit.cache_capacity);

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl-C, shutting down");
            shutdown.cancel();
        }
    });

    ApiServer::new(Arc::new(audit))
        .with_settings(config.server)
        .run(cancel)
        .await?;
    Ok(())
}

async fn average(
    operation: &str,
    db: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let db_path = db.unwrap_or_else(default_db_path);
    let store = AuditStore::open(&db_path).await?;

    match store.average_duration_ms(operation).await? {
        Some(average) => println!("{operation}: {average:.2} ms"),
        None => println!("{operation}: no successful calls recorded"),
    }
    Ok(())
}
