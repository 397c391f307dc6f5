//! Customer Repository

use super::{RepoError, RepoResult};
use shared::models::{
    Customer, CustomerCreate, CustomerFilter, CustomerOrder, CustomerUpdate, SortDirection,
};
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};

const SELECT: &str = "SELECT c.id, c.document_type_id, dt.code AS document_type_code, dt.name AS document_type_name, c.document_number, c.first_name, c.middle_name, c.last_name, c.second_last_name, c.email, c.phone, c.birth_date, c.gender, c.address, c.city, c.department, c.postal_code, c.is_active, c.registered_at, c.updated_at, c.last_purchase_at, c.lifetime_total FROM customer c JOIN document_type dt ON dt.id = c.document_type_id";

/// Registration instant bounds in Unix millis, `[from, until)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisteredRange {
    pub from: Option<i64>,
    pub until: Option<i64>,
}

fn order_clause(filter: &CustomerFilter) -> String {
    let column = match filter.order_by.unwrap_or_default() {
        CustomerOrder::RegisteredAt => "c.registered_at",
        CustomerOrder::FirstName => "LOWER(c.first_name)",
        CustomerOrder::LastName => "LOWER(c.last_name)",
        CustomerOrder::DocumentNumber => "c.document_number",
        CustomerOrder::LifetimeTotal => "c.lifetime_total",
        CustomerOrder::LastPurchaseAt => "c.last_purchase_at",
    };
    let direction = match (filter.order_by, filter.direction) {
        (_, Some(SortDirection::Asc)) => "ASC",
        (_, Some(SortDirection::Desc)) | (None, None) => "DESC",
        (Some(_), None) => "ASC",
    };
    format!("ORDER BY {column} {direction}, c.id {direction}")
}

/// Active customers matching `filter`
///
/// `city` and `department` are substring matches; `search` matches first
/// name, last name, document number, email or phone. All comparisons ignore
/// ASCII case. `document_type` is compared by code.
pub async fn find_all(
    pool: &SqlitePool,
    filter: &CustomerFilter,
    registered: RegisteredRange,
) -> RepoResult<Vec<Customer>> {
    let pattern = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s.to_lowercase()))
    };
    let document_type = filter
        .document_type
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase);
    let customers = sqlx::query_as::<_, Customer>(&format!(
        "{SELECT} WHERE c.is_active = 1 \
         AND (?1 IS NULL OR LOWER(c.city) LIKE ?1) \
         AND (?2 IS NULL OR LOWER(c.department) LIKE ?2) \
         AND (?3 IS NULL OR LOWER(c.first_name) LIKE ?3 OR LOWER(c.last_name) LIKE ?3 \
              OR LOWER(c.document_number) LIKE ?3 OR LOWER(c.email) LIKE ?3 \
              OR c.phone LIKE ?3) \
         AND (?4 IS NULL OR dt.code = ?4) \
         AND (?5 IS NULL OR c.registered_at >= ?5) \
         AND (?6 IS NULL OR c.registered_at < ?6) \
         {}",
        order_clause(filter)
    ))
    .bind(pattern(&filter.city))
    .bind(pattern(&filter.department))
    .bind(pattern(&filter.search))
    .bind(document_type)
    .bind(registered.from)
    .bind(registered.until)
    .fetch_all(pool)
    .await?;
    Ok(customers)
}

/// Active customers in ascending id order
pub async fn find_active(pool: &SqlitePool) -> RepoResult<Vec<Customer>> {
    let customers = sqlx::query_as::<_, Customer>(&format!(
        "{SELECT} WHERE c.is_active = 1 ORDER BY c.id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(customers)
}

/// Every customer, active or not, in ascending id order
pub async fn find_all_with_inactive(pool: &SqlitePool) -> RepoResult<Vec<Customer>> {
    let customers = sqlx::query_as::<_, Customer>(&format!("{SELECT} ORDER BY c.id"))
        .fetch_all(pool)
        .await?;
    Ok(customers)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<Customer>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let customer = sqlx::query_as::<_, Customer>(&format!("{SELECT} WHERE c.id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(customer)
}

/// Active customer by id
pub async fn find_active_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(&format!(
        "{SELECT} WHERE c.id = ? AND c.is_active = 1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(customer)
}

/// Active customer by document number alone
pub async fn find_by_document_number(
    pool: &SqlitePool,
    document_number: &str,
) -> RepoResult<Option<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(&format!(
        "{SELECT} WHERE c.document_number = ? AND c.is_active = 1"
    ))
    .bind(document_number.trim())
    .fetch_optional(pool)
    .await?;
    Ok(customer)
}

/// Active customer by (document type, document number)
pub async fn find_by_document(
    pool: &SqlitePool,
    document_type_id: i64,
    document_number: &str,
) -> RepoResult<Option<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(&format!(
        "{SELECT} WHERE c.document_type_id = ? AND c.document_number = ? AND c.is_active = 1"
    ))
    .bind(document_type_id)
    .bind(document_number.trim())
    .fetch_optional(pool)
    .await?;
    Ok(customer)
}

pub async fn create(pool: &SqlitePool, data: CustomerCreate) -> RepoResult<Customer> {
    let now = shared::util::now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO customer (document_type_id, document_number, first_name, middle_name, last_name, second_last_name, email, phone, birth_date, gender, address, city, department, postal_code, is_active, registered_at, updated_at, last_purchase_at, lifetime_total) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, 1, ?15, ?15, NULL, 0.0) RETURNING id",
    )
    .bind(data.document_type_id)
    .bind(data.document_number.trim())
    .bind(data.first_name.trim())
    .bind(data.middle_name)
    .bind(data.last_name.trim())
    .bind(data.second_last_name)
    .bind(data.email.trim().to_lowercase())
    .bind(data.phone.trim())
    .bind(data.birth_date.trim())
    .bind(data.gender)
    .bind(data.address)
    .bind(data.city)
    .bind(data.department)
    .bind(data.postal_code)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create customer".into()))
}

/// Update profile fields; aggregate fields are never touched here
pub async fn update(pool: &SqlitePool, id: i64, data: CustomerUpdate) -> RepoResult<Customer> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE customer SET first_name = COALESCE(?1, first_name), middle_name = COALESCE(?2, middle_name), last_name = COALESCE(?3, last_name), second_last_name = COALESCE(?4, second_last_name), email = COALESCE(?5, email), phone = COALESCE(?6, phone), birth_date = COALESCE(?7, birth_date), gender = COALESCE(?8, gender), address = COALESCE(?9, address), city = COALESCE(?10, city), department = COALESCE(?11, department), postal_code = COALESCE(?12, postal_code), is_active = COALESCE(?13, is_active), updated_at = ?14 WHERE id = ?15",
    )
    .bind(data.first_name.as_deref().map(str::trim))
    .bind(data.middle_name)
    .bind(data.last_name.as_deref().map(str::trim))
    .bind(data.second_last_name)
    .bind(data.email.map(|e| e.trim().to_lowercase()))
    .bind(data.phone.as_deref().map(str::trim))
    .bind(data.birth_date.as_deref().map(str::trim))
    .bind(data.gender)
    .bind(data.address)
    .bind(data.city)
    .bind(data.department)
    .bind(data.postal_code)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Customer {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Customer {id} not found")))
}

/// Soft delete (is_active = 0)
pub async fn deactivate(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE customer SET is_active = 0, updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Physical delete, rejected while purchases reference the customer
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let purchases: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchase WHERE customer_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if purchases > 0 {
        return Err(RepoError::Protected(format!(
            "Customer {id} has {purchases} purchases and cannot be deleted"
        )));
    }

    let rows = sqlx::query("DELETE FROM customer WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Write the cached aggregate fields
///
/// The only writer of `last_purchase_at` / `lifetime_total`; leaves
/// `updated_at` alone since the profile did not change.
pub async fn update_aggregates(
    conn: &mut SqliteConnection,
    id: i64,
    last_purchase_at: Option<i64>,
    lifetime_total: f64,
) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE customer SET last_purchase_at = ?1, lifetime_total = ?2 WHERE id = ?3",
    )
    .bind(last_purchase_at)
    .bind(lifetime_total)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Customer {id} not found")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support;
    use shared::models::PurchaseStatus;

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = test_support::pool().await;
        let c = test_support::customer(&pool, 1).await;
        assert_eq!(c.document_type_code, "CC");
        assert!(c.is_active);
        assert_eq!(c.lifetime_total, 0.0);
        assert!(c.last_purchase_at.is_none());

        let by_doc = find_by_document_number(&pool, &format!(" {} ", c.document_number))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_doc.id, c.id);

        let by_pair = find_by_document(&pool, c.document_type_id, &c.document_number)
            .await
            .unwrap();
        assert!(by_pair.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_email_and_document_rejected() {
        let pool = test_support::pool().await;
        let doc_type = test_support::cc_type(&pool).await;
        test_support::customer(&pool, 1).await;

        let mut same_email = test_support::customer_payload(doc_type, 2);
        same_email.email = "CLIENTE1@example.com".into();
        let err = create(&pool, same_email).await.unwrap_err();
        assert!(matches!(&err, RepoError::Duplicate(m) if m.contains("customer.email")));

        let mut same_doc = test_support::customer_payload(doc_type, 3);
        same_doc.document_number = test_support::customer_payload(doc_type, 1).document_number;
        let err = create(&pool, same_doc).await.unwrap_err();
        assert!(matches!(&err, RepoError::Duplicate(m) if m.contains("customer.document_number")));
    }

    #[tokio::test]
    async fn test_filters_and_ordering() {
        let pool = test_support::pool().await;
        let doc_type = test_support::cc_type(&pool).await;
        let mut bogota = test_support::customer_payload(doc_type, 1);
        bogota.city = "Bogota".into();
        bogota.department = "Cundinamarca".into();
        create(&pool, bogota).await.unwrap();
        test_support::customer(&pool, 2).await;
        let third = test_support::customer(&pool, 3).await;
        deactivate(&pool, third.id).await.unwrap();

        let all = find_all(&pool, &CustomerFilter::default(), RegisteredRange::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        // newest first
        assert!(all[0].id > all[1].id);

        let filter = CustomerFilter {
            city: Some("bogo".into()),
            ..Default::default()
        };
        let found = find_all(&pool, &filter, RegisteredRange::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].city, "Bogota");

        let filter = CustomerFilter {
            search: Some("CLIENTE2@".into()),
            ..Default::default()
        };
        let found = find_all(&pool, &filter, RegisteredRange::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].first_name, "Cliente2");

        assert_eq!(find_active(&pool).await.unwrap().len(), 2);
        assert_eq!(find_all_with_inactive(&pool).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_registration_range_and_sorting() {
        let pool = test_support::pool().await;
        let mut ids = Vec::new();
        for (n, registered_at, total) in [(1, 1_000, 30.0), (2, 2_000, 10.0), (3, 3_000, 20.0)] {
            let c = test_support::customer(&pool, n).await;
            sqlx::query("UPDATE customer SET registered_at = ?, lifetime_total = ? WHERE id = ?")
                .bind(registered_at)
                .bind(total)
                .bind(c.id)
                .execute(&pool)
                .await
                .unwrap();
            ids.push(c.id);
        }

        let range = RegisteredRange {
            from: Some(2_000),
            until: Some(3_000),
        };
        let found = find_all(&pool, &CustomerFilter::default(), range)
            .await
            .unwrap();
        assert_eq!(found.iter().map(|c| c.id).collect::<Vec<_>>(), vec![ids[1]]);

        let by_total = CustomerFilter {
            order_by: Some(CustomerOrder::LifetimeTotal),
            ..Default::default()
        };
        let found = find_all(&pool, &by_total, RegisteredRange::default())
            .await
            .unwrap();
        assert_eq!(
            found.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![ids[1], ids[2], ids[0]]
        );

        let by_total_desc = CustomerFilter {
            direction: Some(SortDirection::Desc),
            ..by_total
        };
        let found = find_all(&pool, &by_total_desc, RegisteredRange::default())
            .await
            .unwrap();
        assert_eq!(found[0].id, ids[0]);

        let other_type = CustomerFilter {
            document_type: Some("ti".into()),
            ..Default::default()
        };
        let found = find_all(&pool, &other_type, RegisteredRange::default())
            .await
            .unwrap();
        assert!(found.is_empty());
        let cc = CustomerFilter {
            document_type: Some("cc".into()),
            ..Default::default()
        };
        let found = find_all(&pool, &cc, RegisteredRange::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 3);
    }

    #[tokio::test]
    async fn test_find_active_by_id_skips_deactivated() {
        let pool = test_support::pool().await;
        let c = test_support::customer(&pool, 1).await;
        assert!(find_active_by_id(&pool, c.id).await.unwrap().is_some());

        deactivate(&pool, c.id).await.unwrap();
        assert!(find_active_by_id(&pool, c.id).await.unwrap().is_none());
        assert!(find_by_id(&pool, c.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_keeps_aggregates() {
        let pool = test_support::pool().await;
        let c = test_support::customer(&pool, 1).await;
        {
            let mut conn = pool.acquire().await.unwrap();
            update_aggregates(&mut conn, c.id, Some(1_000), 250.5)
                .await
                .unwrap();
        }

        let updated = update(
            &pool,
            c.id,
            CustomerUpdate {
                city: Some("Cali".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.city, "Cali");
        assert_eq!(updated.first_name, c.first_name);
        assert_eq!(updated.last_purchase_at, Some(1_000));
        assert_eq!(updated.lifetime_total, 250.5);

        let missing = update(&pool, 999, CustomerUpdate::default()).await;
        assert!(matches!(missing, Err(RepoError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_protected_by_purchases() {
        let pool = test_support::pool().await;
        let with_purchase = test_support::customer(&pool, 1).await;
        let without = test_support::customer(&pool, 2).await;
        test_support::raw_purchase(
            &pool,
            with_purchase.id,
            "ORD-1",
            100.0,
            PurchaseStatus::Pending,
            1_000,
        )
        .await;

        let err = delete(&pool, with_purchase.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Protected(_)));
        assert!(find_by_id(&pool, with_purchase.id).await.unwrap().is_some());

        assert!(delete(&pool, without.id).await.unwrap());
        assert!(find_by_id(&pool, without.id).await.unwrap().is_none());
    }
}
