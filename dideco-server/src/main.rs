//! dideco-server - Case-management backend for the DIDECO department
//!
//! Serves the HTTP JSON API used by the desktop client: inventory (with
//! one-shot procurement reconciliation), dashboard metrics, delivery
//! receipts, beneficiaries, professionals, benefit catalog, system users
//! and login/audit.

use anyhow::Result;
use clap::Parser;
use dideco_common::config;
use dideco_server::{build_router, AppState};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "dideco-server", about = "DIDECO social-assistance backend")]
struct Args {
    /// Data folder holding the authoritative database
    #[arg(long)]
    data_folder: Option<String>,

    /// Path to the read-only procurement ledger database
    #[arg(long)]
    procurement_db: Option<String>,

    /// Listen port
    #[arg(long, default_value_t = 3001)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting DIDECO backend (dideco-server) v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let data_folder = config::resolve_data_folder(args.data_folder.as_deref());
    config::ensure_data_folder(&data_folder)?;

    let db_path = config::database_path(&data_folder);
    info!("Database path: {}", db_path.display());

    let pool = dideco_common::db::init_database(&db_path).await?;

    // The procurement ledger belongs to the acquisitions system; without it
    // the inventory simply starts empty and is filled by hand
    let procurement = match config::resolve_procurement_db(args.procurement_db.as_deref()) {
        Some(path) => {
            let ledger = dideco_server::db::connect_procurement(&path).await?;
            info!("Connected to procurement ledger (read-only): {}", path.display());
            Some(ledger)
        }
        None => {
            warn!("No procurement ledger configured; automatic inventory import disabled");
            None
        }
    };

    let state = AppState::new(pool, procurement);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("dideco-server listening on http://127.0.0.1:{}", args.port);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
