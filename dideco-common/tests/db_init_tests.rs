//! Unit tests for database initialization, default settings and seed data

use dideco_common::db::init::init_database;
use dideco_common::db::settings;

async fn scratch_db() -> (tempfile::TempDir, sqlx::SqlitePool) {
    let dir = tempfile::tempdir().expect("Should create temp dir");
    let pool = init_database(&dir.path().join("dideco.db"))
        .await
        .expect("Database initialization failed");
    (dir, pool)
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("dideco.db");
    assert!(!db_path.exists());

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("dideco.db");

    let pool1 = init_database(&db_path).await;
    assert!(pool1.is_ok());
    pool1.unwrap().close().await;

    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());
}

#[tokio::test]
async fn test_default_settings_initialized() {
    let (_dir, pool) = scratch_db().await;

    assert_eq!(settings::critical_stock_threshold(&pool).await.unwrap(), 5);
    assert_eq!(settings::inventory_department_filter(&pool).await.unwrap(), 24);
    assert_eq!(settings::inventory_section_filter(&pool).await.unwrap(), 0);
    assert_eq!(settings::folio_start(&pool).await.unwrap(), 1001);
}

#[tokio::test]
async fn test_settings_survive_reinit() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("dideco.db");

    let pool = init_database(&db_path).await.unwrap();
    sqlx::query("UPDATE settings SET value = '9' WHERE key = 'critical_stock_threshold'")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    // Re-running init must not clobber an operator-tuned value
    let pool = init_database(&db_path).await.unwrap();
    assert_eq!(settings::critical_stock_threshold(&pool).await.unwrap(), 9);
}

#[tokio::test]
async fn test_bootstrap_admin_exists() {
    let (_dir, pool) = scratch_db().await;

    let (username, active): (String, bool) = sqlx::query_as(
        "SELECT username, active FROM system_users WHERE username = 'admin'",
    )
    .fetch_one(&pool)
    .await
    .expect("Bootstrap admin should exist");

    assert_eq!(username, "admin");
    assert!(active);
}

#[tokio::test]
async fn test_benefit_catalog_seeded_once() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("dideco.db");

    let pool = init_database(&db_path).await.unwrap();
    let categories: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM benefit_categories")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(categories > 0, "Seed catalog missing");

    // Wipe one category; reinit must not re-seed over user edits
    sqlx::query("DELETE FROM benefit_items WHERE category_id = 1")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    let pool = init_database(&db_path).await.unwrap();
    let orphaned: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM benefit_items WHERE category_id = 1")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(orphaned, 0, "Seed ran again over a non-empty catalog");
}

#[tokio::test]
async fn test_inventory_rejects_unknown_status() {
    let (_dir, pool) = scratch_db().await;

    let result = sqlx::query(
        "INSERT INTO inventory (product_code, name, category_code, manual_status) \
         VALUES ('X', 'X', '24', 'BROKEN')",
    )
    .execute(&pool)
    .await;

    assert!(result.is_err(), "CHECK constraint should reject unknown status");
}

#[tokio::test]
async fn test_delivery_lines_cascade_on_header_delete() {
    let (_dir, pool) = scratch_db().await;

    sqlx::query(
        "INSERT INTO deliveries (folio, delivery_date, beneficiary_rut) VALUES (1001, '2026-01-01', '1-9')",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO delivery_lines (folio, product, quantity) VALUES (1001, 'Frazada', 2)",
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query("DELETE FROM deliveries WHERE folio = 1001")
        .execute(&pool)
        .await
        .unwrap();

    let lines: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM delivery_lines WHERE folio = 1001")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(lines, 0);
}
