//! Customer API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Customer, CustomerCreate, CustomerFilter, CustomerProfile, CustomerUpdate, PurchaseStatus,
    PurchaseSummary,
};

use crate::api::params;
use crate::core::ServerState;
use crate::db::repository::customer::RegisteredRange;
use crate::db::repository::{RepoError, customer, document_type, purchase};
use crate::ledger::{self, CustomerAggregate, LoyaltyCandidate, money};
use crate::reports::{self, RenderedReport, row};
use crate::utils::{AppResult, time};
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_DOCUMENT_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_birth_date,
    validate_email, validate_optional_text, validate_phone, validate_required_text,
};

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

fn customer_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::CustomerNotFound).with_detail("id", id)
}

async fn require_customer(state: &ServerState, id: i64) -> AppResult<Customer> {
    customer::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| customer_not_found(id))
}

/// Read endpoints hide soft-deleted customers
async fn require_active_customer(state: &ServerState, id: i64) -> AppResult<Customer> {
    customer::find_active_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| customer_not_found(id))
}

// ── CRUD ────────────────────────────────────────────────────────────

/// GET /api/customers - active customers, newest registration first unless
/// `order_by` is given
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<CustomerFilter>,
) -> AppResult<Json<Vec<Customer>>> {
    let registered = registered_range(&filter, &state)?;
    let customers = customer::find_all(&state.pool, &filter, registered).await?;
    Ok(Json(customers))
}

/// Inclusive `registered_from` / `registered_to` days as a half-open instant range
fn registered_range(filter: &CustomerFilter, state: &ServerState) -> AppResult<RegisteredRange> {
    let day = |raw: &Option<String>| {
        raw.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(time::parse_date)
            .transpose()
    };
    let from = day(&filter.registered_from)?;
    let to = day(&filter.registered_to)?;
    if let (Some(from), Some(to)) = (from, to)
        && from > to
    {
        return Err(AppError::validation(format!(
            "registered_from {from} is after registered_to {to}"
        )));
    }

    let tz = state.timezone();
    Ok(RegisteredRange {
        from: from.map(|d| time::start_of_day_millis(d, tz)),
        until: to
            .and_then(|d| d.succ_opt())
            .map(|d| time::start_of_day_millis(d, tz)),
    })
}

/// Customer with its derived attributes
#[derive(Debug, Serialize)]
pub struct CustomerDetail {
    #[serde(flatten)]
    pub customer: Customer,
    pub full_name: String,
    pub age: Option<i32>,
}

impl CustomerDetail {
    fn new(customer: Customer, state: &ServerState) -> Self {
        Self {
            full_name: customer.full_name(),
            age: customer.age_on(state.now().date_naive()),
            customer,
        }
    }
}

/// GET /api/customers/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<CustomerDetail>> {
    let customer = require_active_customer(&state, id).await?;
    Ok(Json(CustomerDetail::new(customer, &state)))
}

/// POST /api/customers
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CustomerCreate>,
) -> AppResult<Json<CustomerDetail>> {
    let doc_type = document_type::find_by_id(&state.pool, payload.document_type_id)
        .await?
        .ok_or_else(|| {
            AppError::new(ErrorCode::DocumentTypeNotFound)
                .with_detail("document_type_id", payload.document_type_id)
        })?;
    if !doc_type.is_active {
        return Err(AppError::new(ErrorCode::DocumentTypeInvalid).with_detail("code", doc_type.code));
    }

    validate_required_text(&payload.document_number, "document_number", MAX_DOCUMENT_LEN)?;
    validate_required_text(&payload.first_name, "first_name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.middle_name, "middle_name", MAX_NAME_LEN)?;
    validate_required_text(&payload.last_name, "last_name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.second_last_name, "second_last_name", MAX_NAME_LEN)?;
    validate_email(&payload.email)?;
    validate_phone(&payload.phone)?;
    validate_birth_date(&payload.birth_date, state.now().date_naive())?;
    validate_required_text(&payload.address, "address", MAX_ADDRESS_LEN)?;
    validate_required_text(&payload.city, "city", MAX_NAME_LEN)?;
    validate_required_text(&payload.department, "department", MAX_NAME_LEN)?;
    validate_optional_text(&payload.postal_code, "postal_code", MAX_SHORT_TEXT_LEN)?;

    let created = customer::create(&state.pool, payload).await?;
    tracing::info!(customer_id = created.id, "Customer created");
    Ok(Json(CustomerDetail::new(created, &state)))
}

/// PUT /api/customers/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CustomerUpdate>,
) -> AppResult<Json<CustomerDetail>> {
    require_customer(&state, id).await?;

    for (value, field) in [
        (&payload.first_name, "first_name"),
        (&payload.last_name, "last_name"),
        (&payload.city, "city"),
        (&payload.department, "department"),
    ] {
        if let Some(v) = value {
            validate_required_text(v, field, MAX_NAME_LEN)?;
        }
    }
    validate_optional_text(&payload.middle_name, "middle_name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.second_last_name, "second_last_name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&payload.postal_code, "postal_code", MAX_SHORT_TEXT_LEN)?;
    if let Some(email) = &payload.email {
        validate_email(email)?;
    }
    if let Some(phone) = &payload.phone {
        validate_phone(phone)?;
    }
    if let Some(birth_date) = &payload.birth_date {
        validate_birth_date(birth_date, state.now().date_naive())?;
    }

    let updated = customer::update(&state.pool, id, payload).await?;
    Ok(Json(CustomerDetail::new(updated, &state)))
}

/// DELETE /api/customers/{id} - soft delete
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    if !customer::deactivate(&state.pool, id).await? {
        return Err(customer_not_found(id));
    }
    tracing::info!(customer_id = id, "Customer deactivated");
    Ok(Json(true))
}

/// DELETE /api/customers/{id}/permanent - rejected while purchases exist
pub async fn delete_permanent(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    match customer::delete(&state.pool, id).await {
        Ok(true) => {
            tracing::info!(customer_id = id, "Customer deleted");
            Ok(Json(true))
        }
        Ok(false) => Err(customer_not_found(id)),
        Err(RepoError::Protected(msg)) => {
            Err(AppError::with_message(ErrorCode::CustomerHasPurchases, msg).with_detail("id", id))
        }
        Err(e) => Err(e.into()),
    }
}

// ── Lookups ─────────────────────────────────────────────────────────

/// GET /api/customers/lookup/{document_number} - basic profile
pub async fn lookup(
    State(state): State<ServerState>,
    Path(document_number): Path<String>,
) -> AppResult<Json<CustomerProfile>> {
    let found = customer::find_by_document_number(&state.pool, &document_number)
        .await?
        .ok_or_else(|| {
            AppError::new(ErrorCode::CustomerNotFound)
                .with_detail("document_number", document_number.trim())
        })?;
    Ok(Json(CustomerProfile::from(&found)))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub document_type: Option<String>,
    pub document_number: Option<String>,
}

/// GET /api/customers/search?document_type=CC&document_number=...
pub async fn search(
    State(state): State<ServerState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<CustomerDetail>> {
    let non_empty = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let (Some(code), Some(number)) = (
        non_empty(&query.document_type),
        non_empty(&query.document_number),
    ) else {
        return Err(AppError::validation("Missing required parameters")
            .with_detail("required", "document_type, document_number"));
    };

    let doc_type = document_type::find_by_code(&state.pool, &code)
        .await?
        .ok_or_else(|| {
            AppError::new(ErrorCode::DocumentTypeInvalid).with_detail("document_type", code.clone())
        })?;

    let found = customer::find_by_document(&state.pool, doc_type.id, &number)
        .await?
        .ok_or_else(|| {
            AppError::new(ErrorCode::CustomerNotFound)
                .with_detail("document_type", doc_type.code.clone())
                .with_detail("document_number", number.clone())
        })?;
    Ok(Json(CustomerDetail::new(found, &state)))
}

// ── Purchases and statistics ────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PurchasesQuery {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PurchasePage {
    pub results: Vec<PurchaseSummary>,
    pub count: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

fn parse_status(raw: Option<&str>) -> AppResult<Option<PurchaseStatus>> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<PurchaseStatus>().map_err(|e| {
                AppError::with_message(ErrorCode::PurchaseInvalidStatus, e.to_string())
            })
        })
        .transpose()
}

/// GET /api/customers/{id}/purchases?status=&page=&page_size=
pub async fn purchases(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(query): Query<PurchasesQuery>,
) -> AppResult<Json<PurchasePage>> {
    require_active_customer(&state, id).await?;
    let status = parse_status(query.status.as_deref())?;
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let offset = (page - 1)
        .checked_mul(page_size)
        .ok_or_else(|| AppError::validation(format!("page {page} is out of range")))?;

    let count = purchase::count_by_customer(&state.pool, id, status).await?;
    let rows = purchase::find_by_customer(&state.pool, id, status, page_size, offset).await?;
    let now = state.now().timestamp_millis();

    Ok(Json(PurchasePage {
        results: rows
            .iter()
            .map(|p| PurchaseSummary::from_purchase(p, now))
            .collect(),
        count,
        page,
        page_size,
        total_pages: (count + page_size - 1) / page_size,
    }))
}

#[derive(Debug, Serialize)]
pub struct CustomerStatistics {
    pub customer_id: i64,
    pub full_name: String,
    pub total_purchases: i64,
    pub completed_purchases: i64,
    pub pending_purchases: i64,
    pub lifetime_total: f64,
    pub last_purchase_at: Option<i64>,
    pub most_recent_purchase: Option<PurchaseSummary>,
    pub oldest_purchase: Option<PurchaseSummary>,
}

/// GET /api/customers/{id}/statistics
pub async fn statistics(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<CustomerStatistics>> {
    let found = require_active_customer(&state, id).await?;
    let now = state.now().timestamp_millis();

    let total_purchases = purchase::count_by_customer(&state.pool, id, None).await?;
    let completed_purchases =
        purchase::count_by_customer(&state.pool, id, Some(PurchaseStatus::Completed)).await?;
    let pending_purchases =
        purchase::count_by_customer(&state.pool, id, Some(PurchaseStatus::Pending)).await?;
    let most_recent = purchase::find_by_customer(&state.pool, id, None, 1, 0)
        .await?
        .into_iter()
        .next();
    let oldest = purchase::first_for_customer(&state.pool, id).await?;

    Ok(Json(CustomerStatistics {
        customer_id: id,
        full_name: found.full_name(),
        total_purchases,
        completed_purchases,
        pending_purchases,
        lifetime_total: found.lifetime_total,
        last_purchase_at: found.last_purchase_at,
        most_recent_purchase: most_recent.map(|p| PurchaseSummary::from_purchase(&p, now)),
        oldest_purchase: oldest.map(|p| PurchaseSummary::from_purchase(&p, now)),
    }))
}

/// POST /api/customers/{id}/aggregates/recompute
pub async fn recompute(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<CustomerAggregate>> {
    require_customer(&state, id).await?;
    let aggregate = state.workflow.refresh_customer(id).await?;
    Ok(Json(aggregate))
}

// ── Reports ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoyaltyQuery {
    pub min_amount: Option<String>,
    pub format: Option<String>,
}

fn no_candidates(min_amount: Decimal) -> AppError {
    AppError::with_message(
        ErrorCode::NoLoyaltyCandidates,
        format!(
            "No customers with purchases of at least {} in the last month",
            money::format_currency(min_amount)
        ),
    )
    .with_detail("min_amount", min_amount.to_string())
}

fn loyalty_download(
    state: &ServerState,
    candidates: &[LoyaltyCandidate],
    min_amount: Decimal,
    query: &LoyaltyQuery,
) -> AppResult<RenderedReport> {
    let format = params::report_format(query.format.as_deref())?;
    if candidates.is_empty() {
        return Err(no_candidates(min_amount));
    }
    let now = state.now();
    let table = row::loyalty_table(candidates, min_amount, now);
    let basename = format!("reporte_fidelizacion_{}", now.format("%Y%m%d_%H%M%S"));
    Ok(reports::render(&table, format, &basename)?)
}

/// GET /api/customers/reports/loyalty?min_amount=&format=
pub async fn loyalty_report(
    State(state): State<ServerState>,
    Query(query): Query<LoyaltyQuery>,
) -> AppResult<RenderedReport> {
    let min_amount = params::min_amount(query.min_amount.as_deref(), state.config.loyalty_min_amount);
    let candidates = ledger::find_loyalty_candidates(&state.pool, min_amount, state.now()).await?;
    loyalty_download(&state, &candidates, min_amount, &query)
}

/// GET /api/customers/reports/loyalty/bulk?min_amount=&format=
pub async fn loyalty_report_bulk(
    State(state): State<ServerState>,
    Query(query): Query<LoyaltyQuery>,
) -> AppResult<RenderedReport> {
    let min_amount = params::min_amount(query.min_amount.as_deref(), state.config.loyalty_min_amount);
    let candidates =
        ledger::find_loyalty_candidates_bulk(&state.pool, min_amount, state.now()).await?;
    loyalty_download(&state, &candidates, min_amount, &query)
}

/// GET /api/customers/export/{format}
pub async fn export(
    State(state): State<ServerState>,
    Path(format): Path<String>,
) -> AppResult<RenderedReport> {
    let format = params::report_format(Some(&format))?;
    let customers = customer::find_active(&state.pool).await?;
    if customers.is_empty() {
        return Err(AppError::new(ErrorCode::NoCustomersToExport));
    }
    let now = state.now();
    let table = row::customer_table(&customers, now);
    let basename = format!("clientes_{}", now.format("%Y%m%d_%H%M%S"));
    Ok(reports::render(&table, format, &basename)?)
}
