//! Dashboard metrics
//!
//! Totals and the low-stock list. Both numbers come from the same pure
//! resolver in `dideco_common::stock`, so the count shown on the
//! dashboard always equals the number of rows flagged in the listing.

use axum::{extract::State, Json};
use dideco_common::api::ApiResponse;
use dideco_common::db::settings;
use dideco_common::stock::{self, ManualStatus};
use serde::Serialize;

use crate::api::ApiError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardMetrics {
    pub total: i64,
    #[serde(rename = "criticalCount")]
    pub critical_count: i64,
    pub critical: Vec<CriticalItem>,
}

#[derive(Debug, Serialize)]
pub struct CriticalItem {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub quantity: i64,
}

/// GET /api/dashboard/metrics
pub async fn metrics(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardMetrics>>, ApiError> {
    let threshold = settings::critical_stock_threshold(&state.db).await?;

    let rows: Vec<(i64, String, String, i64, String)> = sqlx::query_as(
        "SELECT id, product_code, name, quantity, manual_status \
         FROM inventory ORDER BY quantity ASC",
    )
    .fetch_all(&state.db)
    .await?;

    let total = rows.len() as i64;

    let critical: Vec<CriticalItem> = rows
        .into_iter()
        .filter(|(_, _, _, quantity, status)| {
            let status = status.parse().unwrap_or(ManualStatus::Auto);
            stock::is_critical(*quantity, status, threshold)
        })
        .map(|(id, code, name, quantity, _)| CriticalItem {
            id,
            code,
            name,
            quantity,
        })
        .collect();

    Ok(Json(ApiResponse::ok(DashboardMetrics {
        total,
        critical_count: critical.len() as i64,
        critical,
    })))
}
