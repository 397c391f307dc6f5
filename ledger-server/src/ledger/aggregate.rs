//! Customer aggregate recompute
//!
//! `last_purchase_at` and `lifetime_total` on a customer are a cache over the
//! purchase ledger. [`recompute_aggregates`] rebuilds both from the counted
//! purchases and is the only code path that writes them.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::SqliteConnection;

use super::money;
use crate::db::repository::{RepoError, RepoResult, customer, purchase};

/// Derived customer fields
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CustomerAggregate {
    pub last_purchase_at: Option<i64>,
    pub lifetime_total: f64,
}

/// Fold `(purchased_at, total)` pairs of counted purchases into the aggregate
///
/// Fails with `Validation` when an amount is not representable or the sum
/// overflows, so the stored total never drifts from the ledger.
pub fn compute_aggregate<I>(counted: I) -> RepoResult<CustomerAggregate>
where
    I: IntoIterator<Item = (i64, f64)>,
{
    let mut last_purchase_at: Option<i64> = None;
    let mut total = Decimal::ZERO;
    for (purchased_at, amount) in counted {
        last_purchase_at = Some(last_purchase_at.map_or(purchased_at, |t| t.max(purchased_at)));
        total = money::try_to_decimal(amount)
            .and_then(|amount| total.checked_add(amount))
            .ok_or_else(|| {
                RepoError::Validation(format!("lifetime total out of range adding {amount}"))
            })?;
    }
    Ok(CustomerAggregate {
        last_purchase_at,
        lifetime_total: money::to_f64(total),
    })
}

/// Rebuild and store a customer's aggregate from the ledger
///
/// Idempotent. Runs on the caller's connection so it can share a
/// transaction with the purchase write that triggered it.
pub async fn recompute_aggregates(
    conn: &mut SqliteConnection,
    customer_id: i64,
) -> RepoResult<CustomerAggregate> {
    let counted = purchase::counted_for_customer(&mut *conn, customer_id).await?;
    let aggregate = compute_aggregate(counted)?;
    customer::update_aggregates(
        &mut *conn,
        customer_id,
        aggregate.last_purchase_at,
        aggregate.lifetime_total,
    )
    .await?;

    tracing::debug!(
        customer_id,
        last_purchase_at = ?aggregate.last_purchase_at,
        lifetime_total = aggregate.lifetime_total,
        "Customer aggregate recomputed"
    );
    Ok(aggregate)
}
