//! Database initialization
//!
//! Creates the authoritative social-assistance database on first run and
//! opens it on subsequent runs. All DDL is idempotent (`CREATE TABLE IF
//! NOT EXISTS`), so startup is safe to repeat.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL mode allows concurrent readers while one request writes
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_settings_table(&pool).await?;
    create_inventory_table(&pool).await?;
    create_beneficiaries_table(&pool).await?;
    create_professionals_table(&pool).await?;
    create_system_users_table(&pool).await?;
    create_benefit_tables(&pool).await?;
    create_delivery_tables(&pool).await?;
    create_audit_log_table(&pool).await?;

    init_default_settings(&pool).await?;
    seed_benefit_catalog(&pool).await?;

    Ok(pool)
}

/// Create the settings table
///
/// Stores application configuration key-value pairs.
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the internal inventory table
///
/// Rows arrive either from the one-shot procurement import (status AUTO)
/// or from manual entry. Quantity can reach zero but never below.
pub async fn create_inventory_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS inventory (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            product_code TEXT NOT NULL,
            name TEXT NOT NULL,
            category_code TEXT NOT NULL,
            quantity INTEGER NOT NULL DEFAULT 0,
            unit_price INTEGER NOT NULL DEFAULT 0,
            purchase_order TEXT NOT NULL DEFAULT 'S/N',
            uploaded_at TIMESTAMP,
            manual_status TEXT NOT NULL DEFAULT 'AUTO'
                CHECK (manual_status IN ('AUTO', 'NORMAL', 'CRITICO')),
            CHECK (quantity >= 0),
            CHECK (unit_price >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_inventory_name ON inventory(name)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_inventory_quantity ON inventory(quantity)")
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn create_beneficiaries_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS beneficiaries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            rut TEXT NOT NULL UNIQUE,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            address TEXT NOT NULL DEFAULT '',
            phone TEXT NOT NULL DEFAULT '',
            email TEXT NOT NULL DEFAULT '',
            registered_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_beneficiaries_rut ON beneficiaries(rut)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the professionals table
///
/// Professionals are soft-deleted (active flag) so delivery history keeps
/// pointing at a real row.
pub async fn create_professionals_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS professionals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            rut TEXT NOT NULL,
            name TEXT NOT NULL,
            position TEXT NOT NULL DEFAULT '',
            active INTEGER NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the system users table
///
/// Soft-deleted like professionals, to preserve the audit trail.
pub async fn create_system_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS system_users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            rut TEXT NOT NULL DEFAULT '',
            username TEXT NOT NULL UNIQUE,
            first_name TEXT NOT NULL DEFAULT '',
            last_name TEXT NOT NULL DEFAULT '',
            email TEXT NOT NULL DEFAULT '',
            password TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'USER',
            can_create INTEGER NOT NULL DEFAULT 0,
            can_read INTEGER NOT NULL DEFAULT 1,
            can_update INTEGER NOT NULL DEFAULT 0,
            can_delete INTEGER NOT NULL DEFAULT 0,
            active INTEGER NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create a bootstrap administrator if no user exists yet, so the
    // desktop client can always log in on a fresh install
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO system_users
            (id, rut, username, first_name, last_name, email, password, role,
             can_create, can_read, can_update, can_delete, active)
        VALUES (1, '1-9', 'admin', 'Administrador', 'DIDECO', '', 'admin', 'ADMIN',
                1, 1, 1, 1, 1)
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the benefit catalog tables
///
/// Two related tables replace the original free-form category document:
/// categories keyed by name, items hanging off them by foreign key.
pub async fn create_benefit_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS benefit_categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS benefit_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category_id INTEGER NOT NULL REFERENCES benefit_categories(id) ON DELETE CASCADE,
            name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_benefit_items_category ON benefit_items(category_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the delivery header and line tables
///
/// A receipt is one header plus its lines; both are written in a single
/// transaction, never separately.
pub async fn create_delivery_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS deliveries (
            folio INTEGER PRIMARY KEY,
            delivery_date TEXT NOT NULL,
            beneficiary_rut TEXT NOT NULL,
            beneficiary_name TEXT NOT NULL DEFAULT '',
            professional_rut TEXT NOT NULL DEFAULT '',
            professional_name TEXT NOT NULL DEFAULT '',
            receiver_name TEXT NOT NULL DEFAULT '',
            observations TEXT NOT NULL DEFAULT '',
            aid_type TEXT NOT NULL DEFAULT 'General',
            total_value INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS delivery_lines (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            folio INTEGER NOT NULL REFERENCES deliveries(folio) ON DELETE CASCADE,
            category TEXT NOT NULL DEFAULT 'General',
            product TEXT NOT NULL,
            quantity INTEGER NOT NULL,
            unit_value INTEGER NOT NULL DEFAULT 0,
            detail TEXT NOT NULL DEFAULT '',
            CHECK (quantity > 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_delivery_lines_folio ON delivery_lines(folio)")
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn create_audit_log_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS audit_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL,
            module TEXT NOT NULL,
            action TEXT NOT NULL,
            detail TEXT NOT NULL DEFAULT '',
            logged_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Initialize or update default settings
///
/// Business constants live here instead of in code so they can be adjusted
/// without a rebuild.
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    // Procurement import filter (department / section allow-list)
    ensure_setting(pool, "inventory_department_filter", "24").await?;
    ensure_setting(pool, "inventory_section_filter", "0").await?;

    // Stock criticality threshold (AUTO rows with quantity <= threshold)
    ensure_setting(pool, "critical_stock_threshold", "5").await?;

    // First folio handed out for delivery receipts
    ensure_setting(pool, "folio_start", "1001").await?;

    info!("Default settings initialized");
    Ok(())
}

/// Ensure a setting exists with the specified default value
///
/// If the setting doesn't exist, it will be created with the default.
/// If the setting exists but has a NULL value, it will be reset to the default.
pub async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM settings WHERE key = ?)")
        .bind(key)
        .fetch_one(pool)
        .await?;

    if !exists {
        // INSERT OR IGNORE handles two requests racing past the exists check
        sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(default_value)
            .execute(pool)
            .await?;

        info!("Initialized setting '{}' with default value: {}", key, default_value);
        return Ok(());
    }

    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_one(pool)
        .await?;

    if value.is_none() {
        sqlx::query("UPDATE settings SET value = ? WHERE key = ?")
            .bind(default_value)
            .bind(key)
            .execute(pool)
            .await?;

        tracing::warn!("Setting '{}' was NULL, reset to default: {}", key, default_value);
    }

    Ok(())
}

/// Seed the default benefit catalog if none exists yet
///
/// Runs only when benefit_categories is empty; user edits afterwards are
/// never overwritten.
async fn seed_benefit_catalog(pool: &SqlitePool) -> Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM benefit_categories")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        return Ok(());
    }

    let defaults: &[(&str, &[&str])] = &[
        ("Alimentos", &["Caja de mercaderia", "Canasta familiar"]),
        ("Vivienda", &["Plancha de zinc", "Mediagua", "Frazada"]),
        ("Salud", &["Medicamentos", "Panales adulto", "Panales infantil"]),
        ("Servicios", &["Aporte funerario", "Pasaje intercomunal"]),
    ];

    for (category, items) in defaults {
        let category_id: i64 =
            sqlx::query_scalar("INSERT INTO benefit_categories (name) VALUES (?) RETURNING id")
                .bind(category)
                .fetch_one(pool)
                .await?;

        for item in *items {
            sqlx::query("INSERT INTO benefit_items (category_id, name) VALUES (?, ?)")
                .bind(category_id)
                .bind(item)
                .execute(pool)
                .await?;
        }
    }

    info!("Seeded default benefit catalog");
    Ok(())
}
