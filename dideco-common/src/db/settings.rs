//! Typed reads over the settings table

use crate::stock::DEFAULT_CRITICAL_THRESHOLD;
use crate::Result;
use sqlx::SqlitePool;

/// Read a setting value, if present and non-NULL
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    Ok(value.flatten())
}

/// Read an integer setting, falling back to a default on absence or a
/// non-numeric stored value
pub async fn get_setting_i64(pool: &SqlitePool, key: &str, default: i64) -> Result<i64> {
    Ok(get_setting(pool, key)
        .await?
        .and_then(|v| v.parse().ok())
        .unwrap_or(default))
}

/// The quantity at or below which an AUTO row counts as critical
pub async fn critical_stock_threshold(pool: &SqlitePool) -> Result<i64> {
    get_setting_i64(pool, "critical_stock_threshold", DEFAULT_CRITICAL_THRESHOLD).await
}

/// Department allow-list value for the procurement import
pub async fn inventory_department_filter(pool: &SqlitePool) -> Result<i64> {
    get_setting_i64(pool, "inventory_department_filter", 24).await
}

/// Section allow-list value for the procurement import
pub async fn inventory_section_filter(pool: &SqlitePool) -> Result<i64> {
    get_setting_i64(pool, "inventory_section_filter", 0).await
}

/// Lowest folio number handed out for delivery receipts
pub async fn folio_start(pool: &SqlitePool) -> Result<i64> {
    get_setting_i64(pool, "folio_start", 1001).await
}
