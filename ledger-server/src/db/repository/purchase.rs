//! Purchase Repository

use super::{RepoError, RepoResult};
use shared::models::{PaymentMethod, Purchase, PurchaseCreate, PurchaseStatus, PurchaseUpdate};
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};

const SELECT: &str = "SELECT id, customer_id, order_number, purchased_at, product_description, quantity, subtotal, discount, taxes, shipping_cost, total, payment_method, installments, sales_channel, delivery_address, delivery_city, status, estimated_delivery_date, delivered_at, notes, tracking_code, created_by, updated_at FROM purchase";

/// SQL list of the counted statuses, e.g. `'COMPLETED','PENDING'`
///
/// Built from static enum names only.
fn counted_statuses_sql() -> String {
    PurchaseStatus::COUNTED
        .iter()
        .map(|s| format!("'{}'", s.as_str()))
        .collect::<Vec<_>>()
        .join(",")
}

/// All purchases, newest first, optionally filtered
pub async fn find_all(
    pool: &SqlitePool,
    status: Option<PurchaseStatus>,
    payment_method: Option<PaymentMethod>,
) -> RepoResult<Vec<Purchase>> {
    let purchases = sqlx::query_as::<_, Purchase>(&format!(
        "{SELECT} WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR payment_method = ?2) ORDER BY purchased_at DESC, id DESC"
    ))
    .bind(status)
    .bind(payment_method)
    .fetch_all(pool)
    .await?;
    Ok(purchases)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<Purchase>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let purchase = sqlx::query_as::<_, Purchase>(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(purchase)
}

pub async fn find_by_order_number(
    pool: &SqlitePool,
    order_number: &str,
) -> RepoResult<Option<Purchase>> {
    let purchase = sqlx::query_as::<_, Purchase>(&format!("{SELECT} WHERE order_number = ?"))
        .bind(order_number.trim())
        .fetch_optional(pool)
        .await?;
    Ok(purchase)
}

/// One page of a customer's purchases, newest first
pub async fn find_by_customer(
    pool: &SqlitePool,
    customer_id: i64,
    status: Option<PurchaseStatus>,
    limit: i64,
    offset: i64,
) -> RepoResult<Vec<Purchase>> {
    let purchases = sqlx::query_as::<_, Purchase>(&format!(
        "{SELECT} WHERE customer_id = ?1 AND (?2 IS NULL OR status = ?2) ORDER BY purchased_at DESC, id DESC LIMIT ?3 OFFSET ?4"
    ))
    .bind(customer_id)
    .bind(status)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(purchases)
}

pub async fn count_by_customer(
    pool: &SqlitePool,
    customer_id: i64,
    status: Option<PurchaseStatus>,
) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM purchase WHERE customer_id = ?1 AND (?2 IS NULL OR status = ?2)",
    )
    .bind(customer_id)
    .bind(status)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// A customer's earliest purchase, any status
pub async fn first_for_customer(pool: &SqlitePool, customer_id: i64) -> RepoResult<Option<Purchase>> {
    let purchase = sqlx::query_as::<_, Purchase>(&format!(
        "{SELECT} WHERE customer_id = ? ORDER BY purchased_at ASC, id ASC LIMIT 1"
    ))
    .bind(customer_id)
    .fetch_optional(pool)
    .await?;
    Ok(purchase)
}

/// `(purchased_at, total)` of a customer's counted purchases
pub async fn counted_for_customer(
    conn: &mut SqliteConnection,
    customer_id: i64,
) -> RepoResult<Vec<(i64, f64)>> {
    let rows = sqlx::query_as::<_, (i64, f64)>(&format!(
        "SELECT purchased_at, total FROM purchase WHERE customer_id = ? AND status IN ({}) ORDER BY id",
        counted_statuses_sql()
    ))
    .bind(customer_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

/// Totals of one customer's counted purchases in `[from, to]`, by id
pub async fn window_totals_for_customer(
    pool: &SqlitePool,
    customer_id: i64,
    from: i64,
    to: i64,
) -> RepoResult<Vec<f64>> {
    let totals = sqlx::query_scalar::<_, f64>(&format!(
        "SELECT total FROM purchase WHERE customer_id = ?1 AND purchased_at >= ?2 AND purchased_at <= ?3 AND status IN ({}) ORDER BY id",
        counted_statuses_sql()
    ))
    .bind(customer_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;
    Ok(totals)
}

/// `(customer_id, total)` of every active customer's counted purchases in
/// `[from, to]`, ordered by customer id then purchase id
pub async fn window_totals(pool: &SqlitePool, from: i64, to: i64) -> RepoResult<Vec<(i64, f64)>> {
    let rows = sqlx::query_as::<_, (i64, f64)>(&format!(
        "SELECT p.customer_id, p.total FROM purchase p JOIN customer c ON c.id = p.customer_id WHERE c.is_active = 1 AND p.purchased_at >= ?1 AND p.purchased_at <= ?2 AND p.status IN ({}) ORDER BY c.id, p.id",
        counted_statuses_sql()
    ))
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Insert a purchase with an already assigned order number
pub async fn insert(
    conn: &mut SqliteConnection,
    order_number: &str,
    data: &PurchaseCreate,
    purchased_at: i64,
) -> RepoResult<Purchase> {
    let now = shared::util::now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO purchase (customer_id, order_number, purchased_at, product_description, quantity, subtotal, discount, taxes, shipping_cost, total, payment_method, installments, sales_channel, delivery_address, delivery_city, status, estimated_delivery_date, delivered_at, notes, tracking_code, created_by, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, NULL, ?18, ?19, ?20, ?21) RETURNING id",
    )
    .bind(data.customer_id)
    .bind(order_number)
    .bind(purchased_at)
    .bind(&data.product_description)
    .bind(data.quantity)
    .bind(data.subtotal)
    .bind(data.discount)
    .bind(data.taxes)
    .bind(data.shipping_cost)
    .bind(data.total)
    .bind(data.payment_method)
    .bind(data.installments)
    .bind(data.sales_channel)
    .bind(&data.delivery_address)
    .bind(&data.delivery_city)
    .bind(data.status)
    .bind(&data.estimated_delivery_date)
    .bind(&data.notes)
    .bind(&data.tracking_code)
    .bind(&data.created_by)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create purchase".into()))
}

/// Patch a purchase; owner and order number are immutable
pub async fn update(
    conn: &mut SqliteConnection,
    id: i64,
    data: &PurchaseUpdate,
) -> RepoResult<Purchase> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE purchase SET purchased_at = COALESCE(?1, purchased_at), product_description = COALESCE(?2, product_description), quantity = COALESCE(?3, quantity), subtotal = COALESCE(?4, subtotal), discount = COALESCE(?5, discount), taxes = COALESCE(?6, taxes), shipping_cost = COALESCE(?7, shipping_cost), total = COALESCE(?8, total), payment_method = COALESCE(?9, payment_method), installments = COALESCE(?10, installments), sales_channel = COALESCE(?11, sales_channel), delivery_address = COALESCE(?12, delivery_address), delivery_city = COALESCE(?13, delivery_city), status = COALESCE(?14, status), estimated_delivery_date = COALESCE(?15, estimated_delivery_date), delivered_at = COALESCE(?16, delivered_at), notes = COALESCE(?17, notes), tracking_code = COALESCE(?18, tracking_code), updated_at = ?19 WHERE id = ?20",
    )
    .bind(data.purchased_at)
    .bind(&data.product_description)
    .bind(data.quantity)
    .bind(data.subtotal)
    .bind(data.discount)
    .bind(data.taxes)
    .bind(data.shipping_cost)
    .bind(data.total)
    .bind(data.payment_method)
    .bind(data.installments)
    .bind(data.sales_channel)
    .bind(&data.delivery_address)
    .bind(&data.delivery_city)
    .bind(data.status)
    .bind(&data.estimated_delivery_date)
    .bind(data.delivered_at)
    .bind(&data.notes)
    .bind(&data.tracking_code)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Purchase {id} not found")));
    }
    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Purchase {id} not found")))
}
