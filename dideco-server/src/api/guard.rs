//! Server-side permission enforcement
//!
//! The desktop client gates its buttons on the permission flags it got at
//! login, but those flags are re-checked here against the stored user row
//! on every mutating request. A tampered client gains nothing.
//!
//! Callers identify themselves with an `x-username` header; the flag
//! checked depends on the HTTP method (POST = create, PUT = update,
//! DELETE = delete).

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use dideco_common::db::models::SystemUser;
use tracing::warn;

use crate::api::ApiError;
use crate::AppState;

/// Header naming the acting user
pub const USERNAME_HEADER: &str = "x-username";

/// Permission middleware for mutating routes
pub async fn permission_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let username = request
        .headers()
        .get(USERNAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .ok_or_else(|| {
            ApiError::Unauthorized(format!("Missing {} header", USERNAME_HEADER))
        })?;

    let user: Option<SystemUser> = sqlx::query_as(
        "SELECT * FROM system_users WHERE username = ? AND active = 1",
    )
    .bind(&username)
    .fetch_optional(&state.db)
    .await?;

    let Some(user) = user else {
        warn!("Rejected request from unknown or inactive user '{}'", username);
        return Err(ApiError::Unauthorized("Unknown or inactive user".to_string()));
    };

    let method = request.method();
    let (allowed, capability) = if method == Method::POST {
        (user.can_create, "create")
    } else if method == Method::PUT || method == Method::PATCH {
        (user.can_update, "update")
    } else if method == Method::DELETE {
        (user.can_delete, "delete")
    } else {
        (user.can_read, "read")
    };

    if !allowed {
        warn!("User '{}' lacks the {} permission", username, capability);
        return Err(ApiError::Forbidden(format!(
            "User '{}' does not have {} permission",
            username, capability
        )));
    }

    Ok(next.run(request).await)
}
