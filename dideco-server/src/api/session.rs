//! Login and audit logging

use axum::{extract::State, Json};
use dideco_common::api::{ok_empty, ApiResponse};
use dideco_common::db::models::{SystemUser, UserProfile};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::api::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AuditRequest {
    pub username: String,
    pub module: String,
    pub action: String,
    #[serde(default)]
    pub detail: String,
}

/// POST /api/login
///
/// Credential check against active users. A successful login is recorded
/// in the audit log; the response carries the profile with permission
/// flags (never the stored password).
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let user: Option<SystemUser> = sqlx::query_as(
        "SELECT * FROM system_users WHERE username = ? AND password = ? AND active = 1",
    )
    .bind(&req.username)
    .bind(&req.password)
    .fetch_optional(&state.db)
    .await?;

    let Some(user) = user else {
        warn!("Failed login attempt for '{}'", req.username);
        return Err(ApiError::Unauthorized(
            "Incorrect username or password".to_string(),
        ));
    };

    write_audit(&state.db, &user.username, "LOGIN", "INGRESO", "Successful sign-in").await?;
    info!("User '{}' logged in", user.username);

    Ok(Json(ApiResponse::ok(user.into())))
}

/// POST /api/audit
///
/// Records a client-side action (module opened, record printed, ...).
pub async fn record_audit(
    State(state): State<AppState>,
    Json(req): Json<AuditRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if req.username.trim().is_empty() || req.action.trim().is_empty() {
        return Err(ApiError::Validation("Missing audit username or action".to_string()));
    }

    write_audit(&state.db, &req.username, &req.module, &req.action, &req.detail).await?;

    Ok(Json(ok_empty()))
}

async fn write_audit(
    db: &SqlitePool,
    username: &str,
    module: &str,
    action: &str,
    detail: &str,
) -> Result<(), ApiError> {
    sqlx::query(
        "INSERT INTO audit_log (username, module, action, detail) VALUES (?, ?, ?, ?)",
    )
    .bind(username)
    .bind(module)
    .bind(action)
    .bind(detail)
    .execute(db)
    .await?;

    Ok(())
}
