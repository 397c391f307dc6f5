//! Repository Module
//!
//! Free functions over SQLite. Single-statement reads are generic over
//! [`sqlx::Executor`] so they run against the pool or inside a transaction;
//! multi-statement writes that take part in a unit of work take
//! `&mut SqliteConnection`.

pub mod customer;
pub mod document_type;
pub mod purchase;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Row is still referenced and cannot be removed
    #[error("Protected: {0}")]
    Protected(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return RepoError::Duplicate(db_err.message().to_string());
            }
            if db_err.is_foreign_key_violation() {
                return RepoError::Validation(db_err.message().to_string());
            }
        }
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Map a SQLite unique-constraint message to the matching business code
fn duplicate_code(message: &str) -> ErrorCode {
    if message.contains("customer.email") {
        ErrorCode::CustomerEmailExists
    } else if message.contains("customer.document_number") {
        ErrorCode::CustomerDocumentExists
    } else if message.contains("purchase.order_number") {
        ErrorCode::OrderNumberExists
    } else if message.contains("document_type.code") {
        ErrorCode::DocumentTypeCodeExists
    } else {
        ErrorCode::AlreadyExists
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => {
                let code = duplicate_code(&msg);
                AppError::new(code).with_detail("constraint", msg)
            }
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Protected(msg) => AppError::conflict(msg),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Repository database error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Fixtures for repository and ledger tests

    use super::*;
    use crate::db::DbService;
    use shared::models::{
        Customer, CustomerCreate, PaymentMethod, Purchase, PurchaseCreate, PurchaseStatus,
        SalesChannel,
    };
    use sqlx::SqlitePool;

    pub async fn pool() -> SqlitePool {
        DbService::in_memory().await.unwrap().pool
    }

    /// Id of the seeded `CC` document type
    pub async fn cc_type(pool: &SqlitePool) -> i64 {
        document_type::find_by_code(pool, "CC")
            .await
            .unwrap()
            .unwrap()
            .id
    }

    pub fn customer_payload(document_type_id: i64, n: u32) -> CustomerCreate {
        CustomerCreate {
            document_type_id,
            document_number: format!("10{n:08}"),
            first_name: format!("Cliente{n}"),
            middle_name: None,
            last_name: "Pérez".into(),
            second_last_name: None,
            email: format!("cliente{n}@example.com"),
            phone: "3001234567".into(),
            birth_date: "1990-01-01".into(),
            gender: None,
            address: "Calle 10 # 20-30".into(),
            city: "Medellín".into(),
            department: "Antioquia".into(),
            postal_code: None,
        }
    }

    pub async fn customer(pool: &SqlitePool, n: u32) -> Customer {
        let doc_type = cc_type(pool).await;
        customer::create(pool, customer_payload(doc_type, n))
            .await
            .unwrap()
    }

    pub fn purchase_payload(
        customer_id: i64,
        total: f64,
        status: PurchaseStatus,
        purchased_at: i64,
    ) -> PurchaseCreate {
        PurchaseCreate {
            customer_id,
            order_number: None,
            purchased_at: Some(purchased_at),
            product_description: "Televisor".into(),
            quantity: 1,
            subtotal: total,
            discount: 0.0,
            taxes: 0.0,
            shipping_cost: 0.0,
            total,
            payment_method: PaymentMethod::CreditCard,
            installments: 1,
            sales_channel: SalesChannel::Web,
            delivery_address: "Calle 10 # 20-30".into(),
            delivery_city: "Medellín".into(),
            status,
            estimated_delivery_date: None,
            notes: String::new(),
            tracking_code: String::new(),
            created_by: "test".into(),
        }
    }

    /// Insert a purchase directly, bypassing the workflow
    pub async fn raw_purchase(
        pool: &SqlitePool,
        customer_id: i64,
        order_number: &str,
        total: f64,
        status: PurchaseStatus,
        purchased_at: i64,
    ) -> Purchase {
        let mut conn = pool.acquire().await.unwrap();
        purchase::insert(
            &mut conn,
            order_number,
            &purchase_payload(customer_id, total, status, purchased_at),
            purchased_at,
        )
        .await
        .unwrap()
    }
}
