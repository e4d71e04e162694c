//! Inventory reconciliation against the procurement ledger
//!
//! The local inventory table is seeded exactly once: the first read that
//! finds it empty pulls the department's purchase-order lines from the
//! acquisitions ledger and copies them in as AUTO rows. Once seeded (or
//! hand-filled), the local table is authoritative and the ledger is never
//! consulted again.

use dideco_common::db::settings;
use dideco_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool, ValueRef};
use tracing::{info, warn};

/// Seed the local inventory from the procurement ledger if it is empty.
///
/// Returns the number of rows imported (0 when the table was already
/// seeded or no ledger is configured). The whole import is one
/// transaction: either every ledger row lands or none do, so a concurrent
/// reader never observes a half-copied table.
pub async fn ensure_inventory_seeded(
    db: &SqlitePool,
    procurement: Option<&SqlitePool>,
) -> Result<u64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory")
        .fetch_one(db)
        .await?;

    if count > 0 {
        return Ok(0);
    }

    let Some(ledger) = procurement else {
        warn!("Inventory empty and no procurement ledger configured; skipping import");
        return Ok(0);
    };

    let department = settings::inventory_department_filter(db).await?;
    let section = settings::inventory_section_filter(db).await?;

    info!(
        "Inventory empty; importing procurement lines (department {}, section {})",
        department, section
    );

    let mut tx = db.begin().await?;

    // Take the write lock before re-checking the count, so two first reads
    // racing past the empty check above serialize here instead of both
    // importing; the loser re-reads a seeded table and backs out
    sqlx::query("UPDATE settings SET updated_at = CURRENT_TIMESTAMP WHERE key = 'inventory_department_filter'")
        .execute(&mut *tx)
        .await?;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory")
        .fetch_one(&mut *tx)
        .await?;

    if count > 0 {
        tx.rollback().await?;
        return Ok(0);
    }

    let rows = sqlx::query(
        r#"
        SELECT
            pl.product_code, pl.description, pl.department_code,
            pl.quantity, pl.unit_price, pl.purchase_order,
            u.uploaded_at
        FROM procurement_lines AS pl
        INNER JOIN purchase_order_uploads AS u
            ON pl.purchase_order = u.purchase_order
        WHERE pl.department_code IN (?) AND pl.section_code IN (?)
        "#,
    )
    .bind(department)
    .bind(section)
    .fetch_all(ledger)
    .await?;

    info!("Found {} ledger rows to copy", rows.len());

    for row in &rows {
        sqlx::query(
            r#"
            INSERT INTO inventory
                (product_code, name, category_code, quantity, unit_price,
                 purchase_order, uploaded_at, manual_status)
            VALUES (?, ?, ?, ?, ?, ?, ?, 'AUTO')
            "#,
        )
        .bind(coerce_text(row, 0))
        .bind(coerce_text(row, 1))
        .bind(coerce_text(row, 2))
        .bind(coerce_int(row, 3))
        .bind(coerce_int(row, 4))
        .bind(coerce_text(row, 5))
        .bind(row.try_get::<Option<String>, _>(6).unwrap_or(None))
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;
    }

    tx.commit().await?;

    let imported = rows.len() as u64;
    info!("Procurement import finished: {} rows", imported);
    Ok(imported)
}

/// Coerce a ledger column to an integer, treating NULL and non-numeric
/// values as zero rather than rejecting the row.
fn coerce_int(row: &SqliteRow, idx: usize) -> i64 {
    match row.try_get_raw(idx) {
        Ok(val) if val.is_null() => 0,
        Ok(_) => row
            .try_get::<i64, _>(idx)
            .ok()
            .or_else(|| row.try_get::<f64, _>(idx).ok().map(|v| v as i64))
            .or_else(|| {
                row.try_get::<String, _>(idx)
                    .ok()
                    .and_then(|s| s.trim().parse().ok())
            })
            .unwrap_or(0),
        Err(_) => 0,
    }
}

/// Coerce a ledger column to text, stringifying numeric values and
/// mapping NULL to the empty string.
fn coerce_text(row: &SqliteRow, idx: usize) -> String {
    match row.try_get_raw(idx) {
        Ok(val) if val.is_null() => String::new(),
        Ok(_) => row
            .try_get::<String, _>(idx)
            .ok()
            .or_else(|| row.try_get::<i64, _>(idx).ok().map(|v| v.to_string()))
            .or_else(|| row.try_get::<f64, _>(idx).ok().map(|v| v.to_string()))
            .unwrap_or_default(),
        Err(_) => String::new(),
    }
}
