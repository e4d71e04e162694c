//! Procurement ledger access
//!
//! The ledger is owned by the acquisitions system; this service only ever
//! reads it, so the connection is opened in read-only mode.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::path::Path;

/// Connect to the procurement ledger database in read-only mode
///
/// mode=ro prevents any write; immutable is NOT set because the
/// acquisitions system keeps writing to this file while we read.
pub async fn connect_procurement(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        anyhow::bail!(
            "Procurement ledger not found: {}\nCheck the --procurement-db path or DIDECO_PROCUREMENT_DB.",
            db_path.display()
        );
    }

    let db_url = format!("sqlite://{}?mode=ro", db_path.display());

    let pool = SqlitePool::connect(&db_url)
        .await
        .context("Failed to connect to procurement ledger in read-only mode")?;

    Ok(pool)
}
