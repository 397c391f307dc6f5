//! Loyalty candidate selection
//!
//! A candidate is an active customer whose counted purchases in the trailing
//! calendar month add up to at least a threshold. Two entry points exist
//! (per-customer queries and one bulk scan); both feed the same grouping
//! routine and therefore return identical results.

use chrono::DateTime;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::Customer;
use sqlx::SqlitePool;
use std::collections::HashMap;

use super::money;
use crate::db::repository::{RepoResult, customer, purchase};
use crate::utils::time;

/// One ranked loyalty candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoyaltyCandidate {
    pub customer: Customer,
    pub total_last_month: f64,
    pub purchase_count_last_month: i64,
    /// Unix millis of the window's lower bound
    pub window_start: i64,
}

/// Trailing window `[start, end]` in Unix millis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoyaltyWindow {
    pub start: i64,
    pub end: i64,
}

impl LoyaltyWindow {
    /// The calendar month ending at `as_of`
    pub fn ending_at(as_of: DateTime<Tz>) -> Self {
        Self {
            start: time::one_month_before(as_of).timestamp_millis(),
            end: as_of.timestamp_millis(),
        }
    }
}

/// Group window purchases per customer, filter by `min_amount`, rank
///
/// `window_purchases` yields `(customer_id, total)` of counted purchases
/// inside the window. Ties keep ascending customer id order.
pub fn group_window_totals<I>(
    mut customers: Vec<Customer>,
    window_purchases: I,
    min_amount: Decimal,
    window: LoyaltyWindow,
) -> Vec<LoyaltyCandidate>
where
    I: IntoIterator<Item = (i64, f64)>,
{
    let mut totals: HashMap<i64, (Decimal, i64)> = HashMap::new();
    for (customer_id, total) in window_purchases {
        let entry = totals.entry(customer_id).or_insert((Decimal::ZERO, 0));
        entry.0 = entry.0.saturating_add(money::to_decimal(total));
        entry.1 += 1;
    }

    customers.sort_by_key(|c| c.id);
    let mut ranked: Vec<(Decimal, LoyaltyCandidate)> = customers
        .into_iter()
        .filter_map(|customer| {
            let (total, count) = totals
                .get(&customer.id)
                .copied()
                .unwrap_or((Decimal::ZERO, 0));
            (total >= min_amount).then(|| {
                (
                    total,
                    LoyaltyCandidate {
                        customer,
                        total_last_month: money::to_f64(total),
                        purchase_count_last_month: count,
                        window_start: window.start,
                    },
                )
            })
        })
        .collect();

    // stable: equal totals stay in id order
    ranked.sort_by(|a, b| b.0.cmp(&a.0));
    ranked.into_iter().map(|(_, candidate)| candidate).collect()
}

/// Per-customer selection: one filtered ledger query per active customer
pub async fn find_loyalty_candidates(
    pool: &SqlitePool,
    min_amount: Decimal,
    as_of: DateTime<Tz>,
) -> RepoResult<Vec<LoyaltyCandidate>> {
    let window = LoyaltyWindow::ending_at(as_of);
    let customers = customer::find_active(pool).await?;

    let mut window_purchases = Vec::new();
    for c in &customers {
        let totals =
            purchase::window_totals_for_customer(pool, c.id, window.start, window.end).await?;
        window_purchases.extend(totals.into_iter().map(|total| (c.id, total)));
    }

    let candidates = group_window_totals(customers, window_purchases, min_amount, window);
    tracing::info!(
        min_amount = %min_amount,
        window_start = window.start,
        candidates = candidates.len(),
        "Loyalty candidates selected"
    );
    Ok(candidates)
}

/// Bulk selection: one joined scan over the window
pub async fn find_loyalty_candidates_bulk(
    pool: &SqlitePool,
    min_amount: Decimal,
    as_of: DateTime<Tz>,
) -> RepoResult<Vec<LoyaltyCandidate>> {
    let window = LoyaltyWindow::ending_at(as_of);
    let customers = customer::find_active(pool).await?;
    let window_purchases = purchase::window_totals(pool, window.start, window.end).await?;

    let candidates = group_window_totals(customers, window_purchases, min_amount, window);
    tracing::info!(
        min_amount = %min_amount,
        window_start = window.start,
        candidates = candidates.len(),
        "Loyalty candidates selected (bulk)"
    );
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support;
    use chrono::TimeZone;
    use shared::models::PurchaseStatus;

    const TZ: Tz = chrono_tz::America::Bogota;

    fn as_of() -> DateTime<Tz> {
        TZ.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).single().unwrap()
    }

    fn millis(y: i32, m: u32, d: u32, h: u32) -> i64 {
        TZ.with_ymd_and_hms(y, m, d, h, 0, 0)
            .single()
            .unwrap()
            .timestamp_millis()
    }

    fn threshold() -> Decimal {
        Decimal::from(5_000_000)
    }

    async fn both(pool: &SqlitePool, min: Decimal) -> Vec<LoyaltyCandidate> {
        let per_customer = find_loyalty_candidates(pool, min, as_of()).await.unwrap();
        let bulk = find_loyalty_candidates_bulk(pool, min, as_of()).await.unwrap();
        assert_eq!(per_customer, bulk, "entry points disagree");
        per_customer
    }

    #[test]
    fn test_window_is_one_calendar_month() {
        let window = LoyaltyWindow::ending_at(as_of());
        assert_eq!(window.start, millis(2024, 2, 29, 12));
        assert_eq!(window.end, millis(2024, 3, 31, 12));

        let jan = TZ.with_ymd_and_hms(2024, 1, 31, 9, 0, 0).single().unwrap();
        assert_eq!(LoyaltyWindow::ending_at(jan).start, millis(2023, 12, 31, 9));
    }

    #[tokio::test]
    async fn test_cancelled_purchase_excluded() {
        let pool = test_support::pool().await;
        let c = test_support::customer(&pool, 1).await;
        let day = millis(2024, 3, 20, 10);
        for (i, total) in [1_000_000.0, 2_000_000.0, 3_000_000.0].into_iter().enumerate() {
            let status = [
                PurchaseStatus::Completed,
                PurchaseStatus::Pending,
                PurchaseStatus::Shipped,
            ][i];
            test_support::raw_purchase(&pool, c.id, &format!("ORD-{i}"), total, status, day).await;
        }
        test_support::raw_purchase(
            &pool,
            c.id,
            "ORD-C",
            10_000_000.0,
            PurchaseStatus::Cancelled,
            day,
        )
        .await;

        let candidates = both(&pool, threshold()).await;
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].customer.id, c.id);
        assert_eq!(candidates[0].total_last_month, 6_000_000.0);
        assert_eq!(candidates[0].purchase_count_last_month, 3);
        assert_eq!(candidates[0].window_start, millis(2024, 2, 29, 12));
    }

    #[tokio::test]
    async fn test_threshold_is_inclusive_and_window_bounded() {
        let pool = test_support::pool().await;
        let exact = test_support::customer(&pool, 1).await;
        let below = test_support::customer(&pool, 2).await;
        let old = test_support::customer(&pool, 3).await;

        // lower bound inclusive
        test_support::raw_purchase(
            &pool,
            exact.id,
            "E-1",
            5_000_000.0,
            PurchaseStatus::Delivered,
            millis(2024, 2, 29, 12),
        )
        .await;
        test_support::raw_purchase(
            &pool,
            below.id,
            "B-1",
            4_999_999.99,
            PurchaseStatus::Completed,
            millis(2024, 3, 30, 0),
        )
        .await;
        // one hour before the window and one hour after as_of
        test_support::raw_purchase(
            &pool,
            old.id,
            "O-1",
            9_000_000.0,
            PurchaseStatus::Completed,
            millis(2024, 2, 29, 11),
        )
        .await;
        test_support::raw_purchase(
            &pool,
            old.id,
            "O-2",
            9_000_000.0,
            PurchaseStatus::Completed,
            millis(2024, 3, 31, 13),
        )
        .await;

        let candidates = both(&pool, threshold()).await;
        let ids: Vec<i64> = candidates.iter().map(|c| c.customer.id).collect();
        assert_eq!(ids, vec![exact.id]);
    }

    #[tokio::test]
    async fn test_sorted_descending_and_stable_on_ties() {
        let pool = test_support::pool().await;
        let day = millis(2024, 3, 15, 10);
        let mut ids = Vec::new();
        for (n, total) in [(1, 6_000_000.0), (2, 8_000_000.0), (3, 6_000_000.0), (4, 7_000_000.0)] {
            let c = test_support::customer(&pool, n).await;
            test_support::raw_purchase(
                &pool,
                c.id,
                &format!("ORD-{n}"),
                total,
                PurchaseStatus::Completed,
                day,
            )
            .await;
            ids.push(c.id);
        }

        let candidates = both(&pool, threshold()).await;
        let order: Vec<i64> = candidates.iter().map(|c| c.customer.id).collect();
        assert_eq!(order, vec![ids[1], ids[3], ids[0], ids[2]]);
        assert!(
            candidates
                .windows(2)
                .all(|w| w[0].total_last_month >= w[1].total_last_month)
        );
    }

    #[tokio::test]
    async fn test_empty_when_no_purchases_in_window() {
        let pool = test_support::pool().await;
        let c = test_support::customer(&pool, 1).await;
        test_support::raw_purchase(
            &pool,
            c.id,
            "ORD-1",
            50_000_000.0,
            PurchaseStatus::Completed,
            millis(2023, 12, 1, 10),
        )
        .await;

        assert!(both(&pool, threshold()).await.is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_threshold_includes_idle_customers() {
        let pool = test_support::pool().await;
        let idle = test_support::customer(&pool, 1).await;
        let inactive = test_support::customer(&pool, 2).await;
        customer::deactivate(&pool, inactive.id).await.unwrap();

        let candidates = both(&pool, Decimal::ZERO).await;
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].customer.id, idle.id);
        assert_eq!(candidates[0].total_last_month, 0.0);
        assert_eq!(candidates[0].purchase_count_last_month, 0);
    }
}
