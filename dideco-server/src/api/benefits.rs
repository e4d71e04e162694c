//! Benefit catalog endpoints
//!
//! Two related tables (categories, items) behind the grouped
//! category -> items map the client renders. Creating an item under a
//! new category name creates the category row on the fly.

use axum::{
    extract::{Path, State},
    Json,
};
use dideco_common::api::{ok_empty, ApiResponse};
use dideco_common::db::models::BenefitItem;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::api::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBenefitRequest {
    pub category: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameBenefitRequest {
    pub name: String,
}

/// GET /api/benefits
///
/// Grouped map: category name -> items, both alphabetically ordered.
pub async fn list_catalog(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<BTreeMap<String, Vec<BenefitItem>>>>, ApiError> {
    let rows: Vec<(String, i64, String)> = sqlx::query_as(
        "SELECT c.name, i.id, i.name \
         FROM benefit_items AS i \
         INNER JOIN benefit_categories AS c ON i.category_id = c.id \
         ORDER BY c.name, i.name",
    )
    .fetch_all(&state.db)
    .await?;

    let mut grouped: BTreeMap<String, Vec<BenefitItem>> = BTreeMap::new();
    for (category, id, name) in rows {
        grouped
            .entry(category)
            .or_default()
            .push(BenefitItem { id, name });
    }

    Ok(Json(ApiResponse::ok(grouped)))
}

/// POST /api/benefits
pub async fn create_item(
    State(state): State<AppState>,
    Json(req): Json<CreateBenefitRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if req.category.trim().is_empty() || req.name.trim().is_empty() {
        return Err(ApiError::Validation("Missing benefit category or name".to_string()));
    }

    // Find-or-create the category, then hang the item off it
    sqlx::query("INSERT OR IGNORE INTO benefit_categories (name) VALUES (?)")
        .bind(&req.category)
        .execute(&state.db)
        .await?;

    let category_id: i64 =
        sqlx::query_scalar("SELECT id FROM benefit_categories WHERE name = ?")
            .bind(&req.category)
            .fetch_one(&state.db)
            .await?;

    sqlx::query("INSERT INTO benefit_items (category_id, name) VALUES (?, ?)")
        .bind(category_id)
        .bind(&req.name)
        .execute(&state.db)
        .await?;

    Ok(Json(ok_empty()))
}

/// PUT /api/benefits/:id
pub async fn rename_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<RenameBenefitRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("Missing benefit name".to_string()));
    }

    let result = sqlx::query("UPDATE benefit_items SET name = ? WHERE id = ?")
        .bind(&req.name)
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("Benefit item {}", id)));
    }

    Ok(Json(ok_empty()))
}

/// DELETE /api/benefits/:id
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let result = sqlx::query("DELETE FROM benefit_items WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("Benefit item {}", id)));
    }

    Ok(Json(ok_empty()))
}
