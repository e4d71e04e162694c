//! Inventory endpoints
//!
//! The list endpoint doubles as the reconciliation trigger: an empty
//! local table is seeded from the procurement ledger before the read
//! (see [`crate::sync`]).

use axum::{
    extract::{Path, State},
    Json,
};
use dideco_common::api::{ok_empty, ApiResponse};
use dideco_common::db::models::InventoryItem;
use dideco_common::stock::ManualStatus;
use serde::Deserialize;

use crate::api::ApiError;
use crate::sync;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub code: Option<String>,
    pub description: String,
    pub department: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<i64>,
    #[serde(rename = "purchaseOrder")]
    pub purchase_order: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub name: String,
    pub quantity: i64,
    pub price: i64,
    #[serde(rename = "purchaseOrder")]
    pub purchase_order: String,
    pub status: String,
}

/// GET /api/inventory
///
/// Seeds the table from the procurement ledger when empty, then returns
/// every row ordered by product name.
pub async fn list_items(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<InventoryItem>>>, ApiError> {
    sync::ensure_inventory_seeded(&state.db, state.procurement.as_ref()).await?;

    let items: Vec<InventoryItem> = sqlx::query_as(
        "SELECT id, product_code, name, category_code, quantity, unit_price, \
                purchase_order, uploaded_at, manual_status \
         FROM inventory ORDER BY name",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(ApiResponse::ok(items)))
}

/// POST /api/inventory
///
/// Manual row entry. Defaults match what the procurement import would
/// have produced for the department.
pub async fn create_item(
    State(state): State<AppState>,
    Json(req): Json<CreateItemRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if req.description.trim().is_empty() {
        return Err(ApiError::Validation("Missing product description".to_string()));
    }

    let status = parse_status(req.status.as_deref())?;

    sqlx::query(
        r#"
        INSERT INTO inventory
            (product_code, name, category_code, quantity, unit_price,
             purchase_order, uploaded_at, manual_status)
        VALUES (?, ?, ?, ?, ?, ?, datetime('now'), ?)
        "#,
    )
    .bind(req.code.unwrap_or_else(|| "MANUAL".to_string()))
    .bind(req.description)
    .bind(req.department.unwrap_or_else(|| "24".to_string()))
    .bind(req.quantity.unwrap_or(0).max(0))
    .bind(req.price.unwrap_or(0).max(0))
    .bind(req.purchase_order.unwrap_or_else(|| "S/N".to_string()))
    .bind(status.as_str())
    .execute(&state.db)
    .await?;

    Ok(Json(ok_empty()))
}

/// PUT /api/inventory/:id
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let status = parse_status(Some(&req.status))?;

    let result = sqlx::query(
        "UPDATE inventory \
         SET name = ?, quantity = ?, unit_price = ?, purchase_order = ?, manual_status = ? \
         WHERE id = ?",
    )
    .bind(req.name)
    .bind(req.quantity.max(0))
    .bind(req.price.max(0))
    .bind(req.purchase_order)
    .bind(status.as_str())
    .bind(id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("Inventory item {}", id)));
    }

    Ok(Json(ok_empty()))
}

/// DELETE /api/inventory/:id
///
/// Hard delete; inventory rows carry no history worth keeping.
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let result = sqlx::query("DELETE FROM inventory WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("Inventory item {}", id)));
    }

    Ok(Json(ok_empty()))
}

fn parse_status(status: Option<&str>) -> Result<ManualStatus, ApiError> {
    match status {
        None => Ok(ManualStatus::Auto),
        Some(s) => s
            .parse()
            .map_err(|_| ApiError::Validation(format!("Unknown manual status: {}", s))),
    }
}
