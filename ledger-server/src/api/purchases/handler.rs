//! Purchase API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{PaymentMethod, Purchase, PurchaseCreate, PurchaseStatus, PurchaseUpdate};

use crate::core::ServerState;
use crate::db::repository::{RepoError, purchase};
use crate::ledger::PurchaseWrite;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_amount,
    validate_optional_text, validate_positive, validate_required_text, validate_timestamp,
};
use crate::utils::{AppResult, time};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub payment_method: Option<String>,
}

/// GET /api/purchases?status=&payment_method=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Purchase>>> {
    let status = non_empty(query.status.as_deref())
        .map(|s| {
            s.parse::<PurchaseStatus>()
                .map_err(|e| AppError::with_message(ErrorCode::PurchaseInvalidStatus, e.to_string()))
        })
        .transpose()?;
    let payment_method = non_empty(query.payment_method.as_deref())
        .map(|s| {
            s.parse::<PaymentMethod>()
                .map_err(|e| AppError::validation(e.to_string()))
        })
        .transpose()?;

    let purchases = purchase::find_all(&state.pool, status, payment_method).await?;
    Ok(Json(purchases))
}

/// Purchase with its derived attributes
#[derive(Debug, Serialize)]
pub struct PurchaseDetail {
    #[serde(flatten)]
    pub purchase: Purchase,
    pub days_since_purchase: i64,
    pub discount_percentage: f64,
}

/// GET /api/purchases/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<PurchaseDetail>> {
    let found = purchase::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| purchase_not_found(id))?;
    Ok(Json(PurchaseDetail {
        days_since_purchase: found.days_since_purchase(state.now().timestamp_millis()),
        discount_percentage: found.discount_percentage(),
        purchase: found,
    }))
}

/// GET /api/purchases/order/{order_number}
pub async fn get_by_order_number(
    State(state): State<ServerState>,
    Path(order_number): Path<String>,
) -> AppResult<Json<Purchase>> {
    let found = purchase::find_by_order_number(&state.pool, &order_number)
        .await?
        .ok_or_else(|| {
            AppError::new(ErrorCode::PurchaseNotFound)
                .with_detail("order_number", order_number.trim())
        })?;
    Ok(Json(found))
}

/// POST /api/purchases
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PurchaseCreate>,
) -> AppResult<Json<PurchaseWrite>> {
    validate_optional_text(&payload.order_number, "order_number", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(
        &payload.product_description,
        "product_description",
        MAX_NOTE_LEN,
    )?;
    if let Some(purchased_at) = payload.purchased_at {
        validate_timestamp(purchased_at, "purchased_at")?;
    }
    validate_positive(payload.quantity, "quantity")?;
    validate_positive(payload.installments, "installments")?;
    validate_amounts(&[
        (payload.subtotal, "subtotal"),
        (payload.discount, "discount"),
        (payload.taxes, "taxes"),
        (payload.shipping_cost, "shipping_cost"),
        (payload.total, "total"),
    ])?;
    validate_required_text(&payload.delivery_address, "delivery_address", MAX_ADDRESS_LEN)?;
    validate_required_text(&payload.delivery_city, "delivery_city", MAX_NAME_LEN)?;
    validate_optional_date(&payload.estimated_delivery_date)?;
    validate_text_len(&payload.notes, "notes", MAX_NOTE_LEN)?;
    validate_text_len(&payload.tracking_code, "tracking_code", MAX_SHORT_TEXT_LEN)?;
    validate_text_len(&payload.created_by, "created_by", MAX_NAME_LEN)?;

    let customer_id = payload.customer_id;
    let written = state.workflow.create(payload).await.map_err(|e| match e {
        RepoError::NotFound(_) => {
            AppError::new(ErrorCode::CustomerNotFound).with_detail("id", customer_id)
        }
        other => other.into(),
    })?;
    tracing::info!(
        purchase_id = written.purchase.id,
        order_number = %written.purchase.order_number,
        customer_id,
        "Purchase created"
    );
    Ok(Json(written))
}

/// PUT /api/purchases/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<PurchaseUpdate>,
) -> AppResult<Json<PurchaseWrite>> {
    if let Some(description) = &payload.product_description {
        validate_required_text(description, "product_description", MAX_NOTE_LEN)?;
    }
    for (value, field) in [
        (payload.purchased_at, "purchased_at"),
        (payload.delivered_at, "delivered_at"),
    ] {
        if let Some(millis) = value {
            validate_timestamp(millis, field)?;
        }
    }
    if let Some(quantity) = payload.quantity {
        validate_positive(quantity, "quantity")?;
    }
    if let Some(installments) = payload.installments {
        validate_positive(installments, "installments")?;
    }
    let amounts: Vec<(f64, &str)> = [
        (payload.subtotal, "subtotal"),
        (payload.discount, "discount"),
        (payload.taxes, "taxes"),
        (payload.shipping_cost, "shipping_cost"),
        (payload.total, "total"),
    ]
    .into_iter()
    .filter_map(|(value, field)| value.map(|v| (v, field)))
    .collect();
    validate_amounts(&amounts)?;
    validate_optional_text(&payload.delivery_address, "delivery_address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&payload.delivery_city, "delivery_city", MAX_NAME_LEN)?;
    validate_optional_date(&payload.estimated_delivery_date)?;
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.tracking_code, "tracking_code", MAX_SHORT_TEXT_LEN)?;

    let written = state
        .workflow
        .update(id, payload)
        .await
        .map_err(|e| not_found_as_purchase(e, id))?;
    Ok(Json(written))
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StatusChange {
    pub status: PurchaseStatus,
}

/// PUT /api/purchases/{id}/status
pub async fn change_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<StatusChange>,
) -> AppResult<Json<PurchaseWrite>> {
    let written = state
        .workflow
        .change_status(id, payload.status)
        .await
        .map_err(|e| not_found_as_purchase(e, id))?;
    tracing::info!(purchase_id = id, status = %payload.status, "Purchase status changed");
    Ok(Json(written))
}

// ── Helpers ─────────────────────────────────────────────────────────

fn purchase_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::PurchaseNotFound).with_detail("id", id)
}

fn not_found_as_purchase(err: RepoError, id: i64) -> AppError {
    match err {
        RepoError::NotFound(_) => purchase_not_found(id),
        other => other.into(),
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn validate_amounts(amounts: &[(f64, &str)]) -> AppResult<()> {
    for (value, field) in amounts {
        validate_amount(*value, field).map_err(|e| {
            AppError::with_message(ErrorCode::PurchaseInvalidAmount, e.message)
                .with_detail("field", *field)
        })?;
    }
    Ok(())
}

fn validate_optional_date(value: &Option<String>) -> AppResult<()> {
    if let Some(date) = value {
        time::parse_date(date)?;
    }
    Ok(())
}

fn validate_text_len(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.chars().count()
        )));
    }
    Ok(())
}
