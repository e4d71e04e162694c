//! dideco-server library - HTTP service for the DIDECO case-management app
//!
//! Exposes the per-entity CRUD facade, the inventory reconciliation
//! trigger, the dashboard metrics and the login/audit endpoints consumed
//! by the desktop client.

use axum::Router;
use sqlx::SqlitePool;

pub mod api;
pub mod db;
pub mod sync;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Authoritative social-assistance database (read-write)
    pub db: SqlitePool,
    /// External procurement ledger (read-only); absent when not configured
    pub procurement: Option<SqlitePool>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, procurement: Option<SqlitePool>) -> Self {
        Self { db, procurement }
    }
}

/// Build application router
///
/// Mutating routes re-validate the caller's stored permission flags
/// server-side; reads, login and audit logging stay open.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, post, put};
    use tower_http::cors::CorsLayer;
    use tower_http::trace::TraceLayer;

    // Mutating routes (permission check per HTTP method)
    let protected = Router::new()
        .route("/api/inventory", post(api::inventory::create_item))
        .route("/api/inventory/:id", put(api::inventory::update_item))
        .route("/api/inventory/:id", delete(api::inventory::delete_item))
        .route("/api/deliveries", post(api::deliveries::create_delivery))
        .route("/api/beneficiaries", post(api::beneficiaries::create_beneficiary))
        .route("/api/beneficiaries/:rut", put(api::beneficiaries::update_beneficiary))
        .route("/api/beneficiaries/:rut", delete(api::beneficiaries::delete_beneficiary))
        .route("/api/professionals", post(api::professionals::create_professional))
        .route("/api/professionals/:id", delete(api::professionals::delete_professional))
        .route("/api/users", post(api::users::create_user))
        .route("/api/users/:id", put(api::users::update_user))
        .route("/api/users/:id", delete(api::users::delete_user))
        .route("/api/benefits", post(api::benefits::create_item))
        .route("/api/benefits/:id", put(api::benefits::rename_item))
        .route("/api/benefits/:id", delete(api::benefits::delete_item))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::guard::permission_middleware,
        ));

    // Read and session routes (no permission middleware)
    let public = Router::new()
        .route("/api/inventory", get(api::inventory::list_items))
        .route("/api/dashboard/metrics", get(api::dashboard::metrics))
        .route("/api/deliveries", get(api::deliveries::list_deliveries))
        .route("/api/beneficiaries", get(api::beneficiaries::list_beneficiaries))
        .route("/api/professionals", get(api::professionals::list_professionals))
        .route("/api/users", get(api::users::list_users))
        .route("/api/benefits", get(api::benefits::list_catalog))
        .route("/api/login", post(api::session::login))
        .route("/api/audit", post(api::session::record_audit))
        .merge(api::health::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        // The desktop client loads from file:// and sends an Origin header
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
