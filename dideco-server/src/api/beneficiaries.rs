//! Beneficiary CRUD
//!
//! The RUT is the natural key: creation collides on duplicates (409) and
//! updates/deletes address rows by it.

use axum::{
    extract::{Path, State},
    Json,
};
use dideco_common::api::{ok_empty, ApiResponse};
use dideco_common::db::models::Beneficiary;
use dideco_common::Error;
use serde::Deserialize;

use crate::api::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BeneficiaryRequest {
    pub rut: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

/// GET /api/beneficiaries
pub async fn list_beneficiaries(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Beneficiary>>>, ApiError> {
    let rows: Vec<Beneficiary> = sqlx::query_as(
        "SELECT id, rut, first_name, last_name, address, phone, email, registered_at \
         FROM beneficiaries ORDER BY registered_at DESC",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(ApiResponse::ok(rows)))
}

/// POST /api/beneficiaries
pub async fn create_beneficiary(
    State(state): State<AppState>,
    Json(req): Json<BeneficiaryRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    validate(&req)?;

    sqlx::query(
        "INSERT INTO beneficiaries (rut, first_name, last_name, address, phone, email) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&req.rut)
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(&req.address)
    .bind(&req.phone)
    .bind(&req.email)
    .execute(&state.db)
    .await
    .map_err(|e| ApiError::from(Error::from_sqlx(e, "Beneficiary")))?;

    Ok(Json(ok_empty()))
}

/// PUT /api/beneficiaries/:rut
pub async fn update_beneficiary(
    State(state): State<AppState>,
    Path(rut): Path<String>,
    Json(req): Json<BeneficiaryRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    validate(&req)?;

    let result = sqlx::query(
        "UPDATE beneficiaries \
         SET first_name = ?, last_name = ?, address = ?, phone = ?, email = ? \
         WHERE rut = ?",
    )
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(&req.address)
    .bind(&req.phone)
    .bind(&req.email)
    .bind(&rut)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("Beneficiary {}", rut)));
    }

    Ok(Json(ok_empty()))
}

/// DELETE /api/beneficiaries/:rut
pub async fn delete_beneficiary(
    State(state): State<AppState>,
    Path(rut): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let result = sqlx::query("DELETE FROM beneficiaries WHERE rut = ?")
        .bind(&rut)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("Beneficiary {}", rut)));
    }

    Ok(Json(ok_empty()))
}

fn validate(req: &BeneficiaryRequest) -> Result<(), ApiError> {
    if req.rut.trim().is_empty() {
        return Err(ApiError::Validation("Missing beneficiary rut".to_string()));
    }
    if req.first_name.trim().is_empty() || req.last_name.trim().is_empty() {
        return Err(ApiError::Validation("Missing beneficiary name".to_string()));
    }
    Ok(())
}
