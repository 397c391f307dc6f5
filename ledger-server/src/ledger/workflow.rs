//! Purchase write workflow
//!
//! Every purchase create/update runs in one SQLite transaction together with
//! the owning customer's aggregate recompute, so readers never observe a
//! purchase without its matching aggregate. Whether a write triggers the
//! recompute is decided by [`TriggerPolicy`].

use chrono::Utc;
use serde::Serialize;
use shared::models::{Purchase, PurchaseCreate, PurchaseStatus, PurchaseUpdate};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;

use super::aggregate::{CustomerAggregate, recompute_aggregates};
use super::order_number::OrderNumberGenerator;
use crate::db::repository::{RepoError, RepoResult, customer, purchase};

/// When a purchase write refreshes the customer aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerPolicy {
    /// Any write where the old or the new status is counted
    #[default]
    CountedTransitions,
    /// Only writes whose new status is `COMPLETED`
    CompletedOnly,
}

impl TriggerPolicy {
    /// `previous` is `None` on creation
    pub fn should_recompute(self, previous: Option<PurchaseStatus>, current: PurchaseStatus) -> bool {
        match self {
            Self::CountedTransitions => {
                current.is_counted() || previous.is_some_and(PurchaseStatus::is_counted)
            }
            Self::CompletedOnly => current == PurchaseStatus::Completed,
        }
    }
}

impl FromStr for TriggerPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "counted" => Ok(Self::CountedTransitions),
            "completed" => Ok(Self::CompletedOnly),
            other => Err(format!("unknown trigger policy: {other}")),
        }
    }
}

/// Result of a purchase write
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseWrite {
    pub purchase: Purchase,
    /// Present when the write refreshed the customer aggregate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<CustomerAggregate>,
}

/// Purchase writes with transactional aggregate maintenance
#[derive(Clone)]
pub struct PurchaseWorkflow {
    pool: SqlitePool,
    policy: TriggerPolicy,
    order_numbers: Arc<dyn OrderNumberGenerator>,
}

impl PurchaseWorkflow {
    pub fn new(
        pool: SqlitePool,
        policy: TriggerPolicy,
        order_numbers: Arc<dyn OrderNumberGenerator>,
    ) -> Self {
        Self {
            pool,
            policy,
            order_numbers,
        }
    }

    pub fn policy(&self) -> TriggerPolicy {
        self.policy
    }

    /// Create a purchase, assigning an order number when none is given
    pub async fn create(&self, data: PurchaseCreate) -> RepoResult<PurchaseWrite> {
        let mut tx = self.pool.begin().await?;

        if customer::find_by_id(&mut *tx, data.customer_id)
            .await?
            .is_none()
        {
            return Err(RepoError::NotFound(format!(
                "Customer {} not found",
                data.customer_id
            )));
        }

        let now = Utc::now();
        let order_number = match data
            .order_number
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(given) => given.to_string(),
            None => self.order_numbers.next_order_number(now),
        };
        let purchased_at = data.purchased_at.unwrap_or(now.timestamp_millis());

        let created = purchase::insert(&mut tx, &order_number, &data, purchased_at).await?;
        let aggregate = if self.policy.should_recompute(None, created.status) {
            Some(recompute_aggregates(&mut tx, created.customer_id).await?)
        } else {
            None
        };
        tx.commit().await?;

        tracing::info!(
            purchase_id = created.id,
            order_number = %created.order_number,
            customer_id = created.customer_id,
            status = %created.status,
            refreshed = aggregate.is_some(),
            "Purchase created"
        );
        Ok(PurchaseWrite {
            purchase: created,
            aggregate,
        })
    }

    /// Patch a purchase; status changes go through here too
    pub async fn update(&self, id: i64, data: PurchaseUpdate) -> RepoResult<PurchaseWrite> {
        let mut tx = self.pool.begin().await?;

        let before = purchase::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Purchase {id} not found")))?;
        let updated = purchase::update(&mut tx, id, &data).await?;

        let aggregate = if self
            .policy
            .should_recompute(Some(before.status), updated.status)
        {
            Some(recompute_aggregates(&mut tx, updated.customer_id).await?)
        } else {
            None
        };
        tx.commit().await?;

        tracing::info!(
            purchase_id = id,
            from = %before.status,
            to = %updated.status,
            refreshed = aggregate.is_some(),
            "Purchase updated"
        );
        Ok(PurchaseWrite {
            purchase: updated,
            aggregate,
        })
    }

    /// Set only the status
    pub async fn change_status(&self, id: i64, status: PurchaseStatus) -> RepoResult<PurchaseWrite> {
        self.update(
            id,
            PurchaseUpdate {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    /// Explicit aggregate refresh for one customer, in its own transaction
    pub async fn refresh_customer(&self, customer_id: i64) -> RepoResult<CustomerAggregate> {
        let mut tx = self.pool.begin().await?;
        let aggregate = recompute_aggregates(&mut tx, customer_id).await?;
        tx.commit().await?;
        Ok(aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support;
    use crate::ledger::order_number::SequentialOrderNumbers;

    fn workflow(pool: &SqlitePool, policy: TriggerPolicy) -> PurchaseWorkflow {
        PurchaseWorkflow::new(
            pool.clone(),
            policy,
            Arc::new(SequentialOrderNumbers::starting_at(0)),
        )
    }

    async fn stored_total(pool: &SqlitePool, customer_id: i64) -> (f64, Option<i64>) {
        let c = customer::find_by_id(pool, customer_id)
            .await
            .unwrap()
            .unwrap();
        (c.lifetime_total, c.last_purchase_at)
    }

    #[test]
    fn test_policy_decisions() {
        use PurchaseStatus::*;
        let counted = TriggerPolicy::CountedTransitions;
        assert!(counted.should_recompute(None, Pending));
        assert!(!counted.should_recompute(None, Cancelled));
        assert!(counted.should_recompute(Some(Completed), Cancelled));
        assert!(counted.should_recompute(Some(Processing), Delivered));
        assert!(!counted.should_recompute(Some(Cancelled), Returned));

        let completed = TriggerPolicy::CompletedOnly;
        assert!(completed.should_recompute(Some(Processing), Completed));
        assert!(!completed.should_recompute(Some(Completed), Cancelled));
        assert!(!completed.should_recompute(None, Delivered));
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            "Counted".parse::<TriggerPolicy>().unwrap(),
            TriggerPolicy::CountedTransitions
        );
        assert_eq!(
            "completed".parse::<TriggerPolicy>().unwrap(),
            TriggerPolicy::CompletedOnly
        );
        assert!("always".parse::<TriggerPolicy>().is_err());
    }

    #[tokio::test]
    async fn test_completed_only_fires_on_second_save() {
        let pool = test_support::pool().await;
        let c = test_support::customer(&pool, 1).await;
        let wf = workflow(&pool, TriggerPolicy::CompletedOnly);

        let first = wf
            .create(test_support::purchase_payload(
                c.id,
                750_000.0,
                PurchaseStatus::Processing,
                1_000,
            ))
            .await
            .unwrap();
        assert!(first.aggregate.is_none());
        assert_eq!(stored_total(&pool, c.id).await, (0.0, None));

        let second = wf
            .update(
                first.purchase.id,
                PurchaseUpdate {
                    status: Some(PurchaseStatus::Completed),
                    total: Some(800_000.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(second.aggregate.is_some());
        assert_eq!(stored_total(&pool, c.id).await, (800_000.0, Some(1_000)));

        // leaving COMPLETED does not refresh under this policy
        let third = wf
            .change_status(first.purchase.id, PurchaseStatus::Cancelled)
            .await
            .unwrap();
        assert!(third.aggregate.is_none());
        assert_eq!(stored_total(&pool, c.id).await, (800_000.0, Some(1_000)));
    }

    #[tokio::test]
    async fn test_counted_transitions_keeps_cache_exact() {
        let pool = test_support::pool().await;
        let c = test_support::customer(&pool, 1).await;
        let wf = workflow(&pool, TriggerPolicy::default());

        let p = wf
            .create(test_support::purchase_payload(
                c.id,
                100.0,
                PurchaseStatus::Processing,
                5_000,
            ))
            .await
            .unwrap();
        assert_eq!(stored_total(&pool, c.id).await, (100.0, Some(5_000)));

        wf.create(test_support::purchase_payload(
            c.id,
            40.0,
            PurchaseStatus::Delivered,
            2_000,
        ))
        .await
        .unwrap();
        assert_eq!(stored_total(&pool, c.id).await, (140.0, Some(5_000)));

        wf.change_status(p.purchase.id, PurchaseStatus::Returned)
            .await
            .unwrap();
        assert_eq!(stored_total(&pool, c.id).await, (40.0, Some(2_000)));
    }

    #[tokio::test]
    async fn test_generated_order_numbers_are_distinct() {
        let pool = test_support::pool().await;
        let c = test_support::customer(&pool, 1).await;
        let wf = workflow(&pool, TriggerPolicy::default());

        let a = wf
            .create(test_support::purchase_payload(c.id, 1.0, PurchaseStatus::Pending, 0))
            .await
            .unwrap();
        let b = wf
            .create(test_support::purchase_payload(c.id, 1.0, PurchaseStatus::Pending, 0))
            .await
            .unwrap();
        assert_ne!(a.purchase.order_number, b.purchase.order_number);
        assert!(a.purchase.order_number.starts_with("ORD-"));
        assert!(a.purchase.order_number.ends_with("-000000"));
        assert!(b.purchase.order_number.ends_with("-000001"));
    }

    #[tokio::test]
    async fn test_given_order_number_is_kept() {
        let pool = test_support::pool().await;
        let c = test_support::customer(&pool, 1).await;
        let wf = workflow(&pool, TriggerPolicy::default());
        let mut data = test_support::purchase_payload(c.id, 1.0, PurchaseStatus::Pending, 0);
        data.order_number = Some(" WEB-77 ".into());
        let created = wf.create(data.clone()).await.unwrap();
        assert_eq!(created.purchase.order_number, "WEB-77");

        let dup = wf.create(data).await;
        assert!(matches!(dup, Err(RepoError::Duplicate(_))));
        // failed write left the cache untouched
        assert_eq!(stored_total(&pool, c.id).await, (1.0, Some(0)));
    }

    #[tokio::test]
    async fn test_unknown_customer_and_purchase() {
        let pool = test_support::pool().await;
        let wf = workflow(&pool, TriggerPolicy::default());
        let missing = wf
            .create(test_support::purchase_payload(77, 1.0, PurchaseStatus::Pending, 0))
            .await;
        assert!(matches!(missing, Err(RepoError::NotFound(_))));

        let missing = wf.change_status(77, PurchaseStatus::Completed).await;
        assert!(matches!(missing, Err(RepoError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_refresh_customer_repairs_stale_cache() {
        let pool = test_support::pool().await;
        let c = test_support::customer(&pool, 1).await;
        test_support::raw_purchase(&pool, c.id, "ORD-1", 300.0, PurchaseStatus::Completed, 9).await;
        assert_eq!(stored_total(&pool, c.id).await, (0.0, None));

        let wf = workflow(&pool, TriggerPolicy::default());
        let agg = wf.refresh_customer(c.id).await.unwrap();
        assert_eq!(agg.lifetime_total, 300.0);
        assert_eq!(stored_total(&pool, c.id).await, (300.0, Some(9)));
    }
}
