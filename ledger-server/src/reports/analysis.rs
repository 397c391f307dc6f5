//! Ledger-wide sales analytics
//!
//! Pure functions over customer and purchase snapshots. Month buckets are
//! calendar months in the business timezone, keyed `YYYY-MM`.

use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{Customer, Purchase, PurchaseStatus};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::ledger::money;
use crate::utils::time;

/// Statuses that count as closed sales in the monthly loyalty analysis
pub const CLOSED_SALE_STATUSES: [PurchaseStatus; 2] =
    [PurchaseStatus::Completed, PurchaseStatus::Delivered];

/// How many customers the summary ranks
const TOP_CUSTOMERS: usize = 10;

/// Months averaged by the next-month projection
const PROJECTION_MONTHS: usize = 3;

// ── Sales summary ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentTypeSummary {
    pub document_type: String,
    pub customers: usize,
    pub first_registered_at: i64,
    pub last_registered_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSummary {
    pub status: PurchaseStatus,
    pub total: f64,
    pub mean: f64,
    pub count: usize,
    pub first_purchase_at: i64,
    pub last_purchase_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSummary {
    pub month: String,
    pub total: f64,
    pub mean: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopCustomer {
    pub customer_id: i64,
    pub full_name: String,
    pub document_number: String,
    pub total: f64,
    pub purchases: usize,
    pub first_purchase_at: i64,
    pub last_purchase_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesSummary {
    pub by_document_type: Vec<DocumentTypeSummary>,
    pub by_status: Vec<StatusSummary>,
    pub by_month: Vec<MonthSummary>,
    pub top_customers: Vec<TopCustomer>,
    pub total_customers: usize,
    pub total_purchases: usize,
    pub total_sales: f64,
    pub average_ticket: f64,
}

/// Running sum/count/min/max over a group of purchases
#[derive(Debug, Clone, Copy)]
struct Bucket {
    total: Decimal,
    count: usize,
    first: i64,
    last: i64,
}

impl Bucket {
    fn new(at: i64) -> Self {
        Self {
            total: Decimal::ZERO,
            count: 0,
            first: at,
            last: at,
        }
    }

    fn add(&mut self, amount: f64, at: i64) {
        self.total = self.total.saturating_add(money::to_decimal(amount));
        self.count += 1;
        self.first = self.first.min(at);
        self.last = self.last.max(at);
    }

    fn mean(&self) -> Decimal {
        money::mean(self.total, self.count)
    }
}

/// Overview of customers and every purchase regardless of status
pub fn sales_summary(customers: &[Customer], purchases: &[Purchase], tz: Tz) -> SalesSummary {
    let mut by_type: BTreeMap<&str, (usize, i64, i64)> = BTreeMap::new();
    for c in customers {
        let entry = by_type
            .entry(c.document_type_name.as_str())
            .or_insert((0, c.registered_at, c.registered_at));
        entry.0 += 1;
        entry.1 = entry.1.min(c.registered_at);
        entry.2 = entry.2.max(c.registered_at);
    }

    let mut by_status: BTreeMap<&str, (PurchaseStatus, Bucket)> = BTreeMap::new();
    let mut by_month: BTreeMap<String, Bucket> = BTreeMap::new();
    let mut by_customer: HashMap<i64, Bucket> = HashMap::new();
    let mut total_sales = Decimal::ZERO;

    for p in purchases {
        by_status
            .entry(p.status.as_str())
            .or_insert((p.status, Bucket::new(p.purchased_at)))
            .1
            .add(p.total, p.purchased_at);
        by_month
            .entry(time::month_key(p.purchased_at, tz))
            .or_insert_with(|| Bucket::new(p.purchased_at))
            .add(p.total, p.purchased_at);
        by_customer
            .entry(p.customer_id)
            .or_insert_with(|| Bucket::new(p.purchased_at))
            .add(p.total, p.purchased_at);
        total_sales = total_sales.saturating_add(money::to_decimal(p.total));
    }

    let names: HashMap<i64, &Customer> = customers.iter().map(|c| (c.id, c)).collect();
    let mut ranked: Vec<(i64, Bucket)> = by_customer.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total.cmp(&a.1.total).then(a.0.cmp(&b.0)));
    let top_customers = ranked
        .into_iter()
        .filter_map(|(id, bucket)| {
            names.get(&id).map(|c| TopCustomer {
                customer_id: id,
                full_name: c.full_name(),
                document_number: c.document_number.clone(),
                total: money::to_f64(bucket.total),
                purchases: bucket.count,
                first_purchase_at: bucket.first,
                last_purchase_at: bucket.last,
            })
        })
        .take(TOP_CUSTOMERS)
        .collect();

    SalesSummary {
        by_document_type: by_type
            .into_iter()
            .map(|(name, (count, first, last))| DocumentTypeSummary {
                document_type: name.to_string(),
                customers: count,
                first_registered_at: first,
                last_registered_at: last,
            })
            .collect(),
        by_status: by_status
            .into_values()
            .map(|(status, bucket)| StatusSummary {
                status,
                total: money::to_f64(bucket.total),
                mean: money::to_f64(bucket.mean()),
                count: bucket.count,
                first_purchase_at: bucket.first,
                last_purchase_at: bucket.last,
            })
            .collect(),
        by_month: by_month
            .into_iter()
            .map(|(month, bucket)| MonthSummary {
                month,
                total: money::to_f64(bucket.total),
                mean: money::to_f64(bucket.mean()),
                count: bucket.count,
            })
            .collect(),
        top_customers,
        total_customers: customers.len(),
        total_purchases: purchases.len(),
        total_sales: money::to_f64(total_sales),
        average_ticket: money::to_f64(money::mean(total_sales, purchases.len())),
    }
}

// ── Monthly loyalty ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyLoyaltyEntry {
    pub customer_id: i64,
    pub month: String,
    pub total: f64,
    pub purchases: usize,
    pub first_name: String,
    pub last_name: String,
    pub document_number: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyLoyaltyStats {
    pub loyal_customers: usize,
    pub mean_monthly_total: f64,
    pub max_monthly_total: f64,
    pub min_monthly_total: f64,
    pub mean_monthly_purchases: f64,
    pub active_months: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoyaltyRankingEntry {
    pub customer_id: i64,
    pub full_name: String,
    pub document_number: String,
    pub accumulated_total: f64,
    pub mean_monthly_total: f64,
    pub active_months: usize,
    pub total_purchases: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyLoyaltyAnalysis {
    pub threshold: f64,
    pub entries: Vec<MonthlyLoyaltyEntry>,
    /// `None` when no customer-month clears the threshold
    pub stats: Option<MonthlyLoyaltyStats>,
    pub ranking: Vec<LoyaltyRankingEntry>,
}

/// Customer-months whose closed sales exceed `threshold` (strictly)
pub fn monthly_loyalty(
    customers: &[Customer],
    purchases: &[Purchase],
    threshold: Decimal,
    tz: Tz,
) -> MonthlyLoyaltyAnalysis {
    let names: HashMap<i64, &Customer> = customers.iter().map(|c| (c.id, c)).collect();

    let mut months: BTreeMap<(i64, String), (Decimal, usize)> = BTreeMap::new();
    for p in purchases
        .iter()
        .filter(|p| CLOSED_SALE_STATUSES.contains(&p.status))
        .filter(|p| names.contains_key(&p.customer_id))
    {
        let entry = months
            .entry((p.customer_id, time::month_key(p.purchased_at, tz)))
            .or_insert((Decimal::ZERO, 0));
        entry.0 = entry.0.saturating_add(money::to_decimal(p.total));
        entry.1 += 1;
    }

    let qualifying: Vec<((i64, String), (Decimal, usize))> = months
        .into_iter()
        .filter(|(_, (total, _))| *total > threshold)
        .collect();

    let stats = (!qualifying.is_empty()).then(|| {
        let totals: Vec<Decimal> = qualifying.iter().map(|(_, (t, _))| *t).collect();
        let sum: Decimal = totals.iter().copied().sum();
        let purchases: usize = qualifying.iter().map(|(_, (_, n))| n).sum();
        let customers: HashSet<i64> = qualifying.iter().map(|((id, _), _)| *id).collect();
        let months: HashSet<&str> = qualifying.iter().map(|((_, m), _)| m.as_str()).collect();
        MonthlyLoyaltyStats {
            loyal_customers: customers.len(),
            mean_monthly_total: money::to_f64(money::mean(sum, totals.len())),
            max_monthly_total: money::to_f64(totals.iter().copied().max().unwrap_or_default()),
            min_monthly_total: money::to_f64(totals.iter().copied().min().unwrap_or_default()),
            mean_monthly_purchases: money::to_f64(money::mean(
                Decimal::from(purchases),
                totals.len(),
            )),
            active_months: months.len(),
        }
    });

    let mut per_customer: BTreeMap<i64, (Decimal, usize, usize)> = BTreeMap::new();
    for ((id, _), (total, count)) in &qualifying {
        let entry = per_customer.entry(*id).or_insert((Decimal::ZERO, 0, 0));
        entry.0 += *total;
        entry.1 += 1;
        entry.2 += count;
    }
    let mut ranking: Vec<LoyaltyRankingEntry> = per_customer
        .into_iter()
        .filter_map(|(id, (total, months, count))| {
            names.get(&id).map(|c| LoyaltyRankingEntry {
                customer_id: id,
                full_name: c.full_name(),
                document_number: c.document_number.clone(),
                accumulated_total: money::to_f64(total),
                mean_monthly_total: money::to_f64(money::mean(total, months)),
                active_months: months,
                total_purchases: count,
            })
        })
        .collect();
    ranking.sort_by(|a, b| b.accumulated_total.total_cmp(&a.accumulated_total));

    let entries = qualifying
        .into_iter()
        .filter_map(|((id, month), (total, count))| {
            names.get(&id).map(|c| MonthlyLoyaltyEntry {
                customer_id: id,
                month,
                total: money::to_f64(total),
                purchases: count,
                first_name: c.first_name.clone(),
                last_name: c.last_name.clone(),
                document_number: c.document_number.clone(),
                email: c.email.clone(),
                phone: c.phone.clone(),
            })
        })
        .collect();

    MonthlyLoyaltyAnalysis {
        threshold: money::to_f64(threshold),
        entries,
        stats,
        ranking,
    }
}

// ── Trends ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrend {
    pub month: String,
    pub sales: f64,
    pub average_ticket: f64,
    pub transactions: usize,
    /// Month-over-month change in percent, `None` for the first month or
    /// after a month without sales
    pub sales_growth_pct: Option<f64>,
    pub transactions_growth_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub sales: f64,
    pub average_ticket: f64,
    pub transactions: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesTrends {
    pub history: Vec<MonthlyTrend>,
    /// Mean of the last three months, `None` without history
    pub projection: Option<Projection>,
}

/// Monthly sales history over every purchase and a next-month projection
pub fn sales_trends(purchases: &[Purchase], tz: Tz) -> SalesTrends {
    let mut months: BTreeMap<String, (Decimal, usize)> = BTreeMap::new();
    for p in purchases {
        let entry = months
            .entry(time::month_key(p.purchased_at, tz))
            .or_insert((Decimal::ZERO, 0));
        entry.0 = entry.0.saturating_add(money::to_decimal(p.total));
        entry.1 += 1;
    }

    let mut history: Vec<MonthlyTrend> = Vec::with_capacity(months.len());
    let mut tickets: Vec<Decimal> = Vec::with_capacity(months.len());
    let mut previous: Option<(Decimal, usize)> = None;
    for (month, (sales, count)) in months.iter() {
        let ticket = money::mean(*sales, *count);
        let (sales_growth_pct, transactions_growth_pct) = match previous {
            Some((prev_sales, prev_count)) => (
                money::growth_percentage(prev_sales, *sales).map(money::to_f64),
                money::growth_percentage(Decimal::from(prev_count), Decimal::from(*count))
                    .map(money::to_f64),
            ),
            None => (None, None),
        };
        history.push(MonthlyTrend {
            month: month.clone(),
            sales: money::to_f64(*sales),
            average_ticket: money::to_f64(ticket),
            transactions: *count,
            sales_growth_pct,
            transactions_growth_pct,
        });
        tickets.push(ticket);
        previous = Some((*sales, *count));
    }

    let recent: Vec<(&(Decimal, usize), &Decimal)> = months
        .values()
        .zip(tickets.iter())
        .rev()
        .take(PROJECTION_MONTHS)
        .collect();
    let projection = (!recent.is_empty()).then(|| {
        let n = recent.len();
        let sales: Decimal = recent.iter().map(|((s, _), _)| *s).sum();
        let ticket: Decimal = recent.iter().map(|(_, t)| **t).sum();
        let count: usize = recent.iter().map(|((_, c), _)| *c).sum();
        Projection {
            sales: money::to_f64(money::mean(sales, n)),
            average_ticket: money::to_f64(money::mean(ticket, n)),
            transactions: (count / n) as i64,
        }
    });

    SalesTrends {
        history,
        projection,
    }
}
