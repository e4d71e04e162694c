//! Professional staff endpoints
//!
//! Professionals sign delivery receipts, so rows are soft-deleted: the
//! active flag is cleared and the row stays for the audit trail.

use axum::{
    extract::{Path, State},
    Json,
};
use dideco_common::api::{ok_empty, ApiResponse};
use dideco_common::db::models::Professional;
use serde::Deserialize;

use crate::api::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ProfessionalRequest {
    pub rut: String,
    pub name: String,
    #[serde(default)]
    pub position: String,
}

/// GET /api/professionals
///
/// Active rows only; deactivated professionals stay queryable in the
/// table but never show in pickers.
pub async fn list_professionals(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Professional>>>, ApiError> {
    let rows: Vec<Professional> = sqlx::query_as(
        "SELECT id, rut, name, position, active FROM professionals WHERE active = 1 ORDER BY name",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(ApiResponse::ok(rows)))
}

/// POST /api/professionals
pub async fn create_professional(
    State(state): State<AppState>,
    Json(req): Json<ProfessionalRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if req.rut.trim().is_empty() || req.name.trim().is_empty() {
        return Err(ApiError::Validation("Missing professional rut or name".to_string()));
    }

    sqlx::query("INSERT INTO professionals (rut, name, position) VALUES (?, ?, ?)")
        .bind(&req.rut)
        .bind(&req.name)
        .bind(&req.position)
        .execute(&state.db)
        .await?;

    Ok(Json(ok_empty()))
}

/// DELETE /api/professionals/:id
///
/// Soft delete only.
pub async fn delete_professional(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let result = sqlx::query("UPDATE professionals SET active = 0 WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("Professional {}", id)));
    }

    Ok(Json(ok_empty()))
}
