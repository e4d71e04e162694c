//! System user management
//!
//! Users carry coarse capability flags (create/read/update/delete) that
//! the permission middleware re-checks on every mutating request. Rows
//! are soft-deleted so the audit trail keeps resolving usernames.

use axum::{
    extract::{Path, State},
    Json,
};
use dideco_common::api::{ok_empty, ApiResponse};
use dideco_common::db::models::{Permissions, SystemUser};
use dideco_common::Error;
use serde::Deserialize;

use crate::api::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UserRequest {
    #[serde(default)]
    pub rut: String,
    pub username: String,
    #[serde(rename = "firstName", default)]
    pub first_name: String,
    #[serde(rename = "lastName", default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
    pub permissions: Permissions,
}

/// GET /api/users
///
/// Active users only, capability flags included. The stored password is
/// returned for the admin management screen, matching the legacy client.
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SystemUser>>>, ApiError> {
    let rows: Vec<SystemUser> =
        sqlx::query_as("SELECT * FROM system_users WHERE active = 1 ORDER BY username")
            .fetch_all(&state.db)
            .await?;

    Ok(Json(ApiResponse::ok(rows)))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<UserRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    validate(&req)?;

    sqlx::query(
        r#"
        INSERT INTO system_users
            (rut, username, first_name, last_name, email, password, role,
             can_create, can_read, can_update, can_delete, active)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1)
        "#,
    )
    .bind(&req.rut)
    .bind(&req.username)
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(&req.email)
    .bind(&req.password)
    .bind(req.role.as_deref().unwrap_or("USER"))
    .bind(req.permissions.create)
    .bind(req.permissions.read)
    .bind(req.permissions.update)
    .bind(req.permissions.delete)
    .execute(&state.db)
    .await
    .map_err(|e| ApiError::from(Error::from_sqlx(e, "Username")))?;

    Ok(Json(ok_empty()))
}

/// PUT /api/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UserRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    validate(&req)?;

    let result = sqlx::query(
        r#"
        UPDATE system_users SET
            rut = ?, username = ?, first_name = ?, last_name = ?, email = ?,
            password = ?, role = ?,
            can_create = ?, can_read = ?, can_update = ?, can_delete = ?
        WHERE id = ?
        "#,
    )
    .bind(&req.rut)
    .bind(&req.username)
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(&req.email)
    .bind(&req.password)
    .bind(req.role.as_deref().unwrap_or("USER"))
    .bind(req.permissions.create)
    .bind(req.permissions.read)
    .bind(req.permissions.update)
    .bind(req.permissions.delete)
    .bind(id)
    .execute(&state.db)
    .await
    .map_err(|e| ApiError::from(Error::from_sqlx(e, "Username")))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("User {}", id)));
    }

    Ok(Json(ok_empty()))
}

/// DELETE /api/users/:id
///
/// Soft delete only.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let result = sqlx::query("UPDATE system_users SET active = 0 WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("User {}", id)));
    }

    Ok(Json(ok_empty()))
}

fn validate(req: &UserRequest) -> Result<(), ApiError> {
    if req.username.trim().is_empty() {
        return Err(ApiError::Validation("Missing username".to_string()));
    }
    if req.password.is_empty() {
        return Err(ApiError::Validation("Missing password".to_string()));
    }
    Ok(())
}
