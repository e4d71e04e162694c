//! Delivery receipt recording
//!
//! One receipt is a header plus its product lines; they are committed in
//! a single transaction so a failure partway never leaves an orphaned
//! header or dangling lines.

use axum::{extract::State, Json};
use dideco_common::api::ApiResponse;
use dideco_common::db::models::{Delivery, DeliveryLine};
use dideco_common::db::settings;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use crate::api::ApiError;
use crate::AppState;

/// Retries when two submissions race to the same folio and the UNIQUE
/// constraint fires on the loser.
const FOLIO_RETRIES: u32 = 3;

#[derive(Debug, Deserialize)]
pub struct CreateDeliveryRequest {
    #[serde(rename = "beneficiaryRut")]
    pub beneficiary_rut: String,
    #[serde(rename = "beneficiaryName", default)]
    pub beneficiary_name: String,
    pub date: String,
    pub items: Vec<DeliveryItemRequest>,
    #[serde(rename = "receiverName", default)]
    pub receiver_name: String,
    #[serde(rename = "professionalRut", default)]
    pub professional_rut: String,
    #[serde(rename = "professionalName", default)]
    pub professional_name: String,
    #[serde(default)]
    pub observations: String,
    #[serde(rename = "aidType", default)]
    pub aid_type: String,
}

#[derive(Debug, Deserialize)]
pub struct DeliveryItemRequest {
    pub name: String,
    pub quantity: i64,
    #[serde(default)]
    pub value: i64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub detail: String,
}

/// Persisted receipt: header plus lines, ready for printing
#[derive(Debug, Serialize)]
pub struct DeliveryRecord {
    #[serde(flatten)]
    pub header: Delivery,
    pub items: Vec<DeliveryLine>,
}

/// POST /api/deliveries
///
/// Validates before any write, then commits header and every line
/// atomically. The folio comes from MAX+1 over existing receipts with a
/// configurable floor; the primary key on `deliveries.folio` is the
/// uniqueness guarantee under concurrent submissions.
pub async fn create_delivery(
    State(state): State<AppState>,
    Json(req): Json<CreateDeliveryRequest>,
) -> Result<Json<ApiResponse<DeliveryRecord>>, ApiError> {
    if req.beneficiary_rut.trim().is_empty() {
        return Err(ApiError::Validation("Missing beneficiary".to_string()));
    }
    if req.items.is_empty() {
        return Err(ApiError::Validation("Delivery has no items".to_string()));
    }
    for item in &req.items {
        if item.name.trim().is_empty() {
            return Err(ApiError::Validation("Delivery item without a name".to_string()));
        }
        if item.quantity <= 0 {
            return Err(ApiError::Validation(format!(
                "Invalid quantity for item '{}'",
                item.name
            )));
        }
    }

    let folio_floor = settings::folio_start(&state.db).await?;

    let mut last_err = None;
    for _ in 0..FOLIO_RETRIES {
        match try_commit_delivery(&state.db, &req, folio_floor).await {
            Ok(record) => {
                info!(
                    "Recorded delivery folio {} for {} ({} items)",
                    record.header.folio,
                    record.header.beneficiary_rut,
                    record.items.len()
                );
                return Ok(Json(ApiResponse::ok(record)));
            }
            Err(e) if is_folio_collision(&e) => {
                last_err = Some(e);
                continue;
            }
            Err(e) => return Err(ApiError::Database(e.to_string())),
        }
    }

    Err(ApiError::Conflict(format!(
        "Delivery folio ({})",
        last_err.map(|e| e.to_string()).unwrap_or_default()
    )))
}

/// GET /api/deliveries
///
/// Full receipt history, newest first, for reprints and reports.
pub async fn list_deliveries(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<DeliveryRecord>>>, ApiError> {
    let headers: Vec<Delivery> = sqlx::query_as(
        "SELECT folio, delivery_date, beneficiary_rut, beneficiary_name, \
                professional_rut, professional_name, receiver_name, \
                observations, aid_type, total_value \
         FROM deliveries ORDER BY folio DESC",
    )
    .fetch_all(&state.db)
    .await?;

    let mut records = Vec::with_capacity(headers.len());
    for header in headers {
        let items: Vec<DeliveryLine> = sqlx::query_as(
            "SELECT category, product, quantity, unit_value, detail \
             FROM delivery_lines WHERE folio = ? ORDER BY id",
        )
        .bind(header.folio)
        .fetch_all(&state.db)
        .await?;
        records.push(DeliveryRecord { header, items });
    }

    Ok(Json(ApiResponse::ok(records)))
}

/// One commit attempt: allocate folio, insert header and lines, commit.
/// Dropping the transaction on any error path rolls everything back.
async fn try_commit_delivery(
    db: &SqlitePool,
    req: &CreateDeliveryRequest,
    folio_floor: i64,
) -> Result<DeliveryRecord, sqlx::Error> {
    let mut tx = db.begin().await?;

    let receiver = if req.receiver_name.trim().is_empty() {
        req.beneficiary_name.clone()
    } else {
        req.receiver_name.clone()
    };

    let total_value: i64 = req.items.iter().map(|i| i.value * i.quantity).sum();

    // Allocating the folio inside the INSERT keeps read and write in one
    // statement, so the first action of the transaction takes the write
    // lock and concurrent submissions serialize on busy_timeout instead
    // of racing a separate MAX query
    let folio: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO deliveries
            (folio, delivery_date, beneficiary_rut, beneficiary_name,
             professional_rut, professional_name, receiver_name,
             observations, aid_type, total_value)
        VALUES (MAX(?, (SELECT COALESCE(MAX(folio) + 1, 0) FROM deliveries)),
                ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING folio
        "#,
    )
    .bind(folio_floor)
    .bind(&req.date)
    .bind(&req.beneficiary_rut)
    .bind(&req.beneficiary_name)
    .bind(&req.professional_rut)
    .bind(&req.professional_name)
    .bind(&receiver)
    .bind(&req.observations)
    .bind(if req.aid_type.is_empty() { "General" } else { &req.aid_type })
    .bind(total_value)
    .fetch_one(&mut *tx)
    .await?;

    let mut items = Vec::with_capacity(req.items.len());
    for item in &req.items {
        let category = if item.category.is_empty() {
            "General".to_string()
        } else {
            item.category.clone()
        };

        sqlx::query(
            r#"
            INSERT INTO delivery_lines (folio, category, product, quantity, unit_value, detail)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(folio)
        .bind(&category)
        .bind(&item.name)
        .bind(item.quantity)
        .bind(item.value)
        .bind(&item.detail)
        .execute(&mut *tx)
        .await?;

        items.push(DeliveryLine {
            category,
            product: item.name.clone(),
            quantity: item.quantity,
            unit_value: item.value,
            detail: item.detail.clone(),
        });
    }

    tx.commit().await?;

    Ok(DeliveryRecord {
        header: Delivery {
            folio,
            delivery_date: req.date.clone(),
            beneficiary_rut: req.beneficiary_rut.clone(),
            beneficiary_name: req.beneficiary_name.clone(),
            professional_rut: req.professional_rut.clone(),
            professional_name: req.professional_name.clone(),
            receiver_name: receiver,
            observations: req.observations.clone(),
            aid_type: if req.aid_type.is_empty() {
                "General".to_string()
            } else {
                req.aid_type.clone()
            },
            total_value,
        },
        items,
    })
}

fn is_folio_collision(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
