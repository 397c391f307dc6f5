//! Purchase Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Purchase lifecycle status
///
/// Transitions are driven from outside; any value may be set at any time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PurchaseStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Completed,
    Cancelled,
    Returned,
}

impl PurchaseStatus {
    pub const ALL: [PurchaseStatus; 7] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Completed,
        Self::Cancelled,
        Self::Returned,
    ];

    /// Statuses that count as real sales for aggregation
    pub const COUNTED: [PurchaseStatus; 5] = [
        Self::Completed,
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
    ];

    pub fn is_counted(self) -> bool {
        Self::COUNTED.contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Returned => "RETURNED",
        }
    }
}

impl fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown enum value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for PurchaseStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant {
                kind: "purchase status",
                value: s.to_string(),
            })
    }
}

/// Payment method
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
    Pse,
    Nequi,
    Daviplata,
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::CreditCard => "CREDIT_CARD",
            Self::DebitCard => "DEBIT_CARD",
            Self::Pse => "PSE",
            Self::Nequi => "NEQUI",
            Self::Daviplata => "DAVIPLATA",
            Self::BankTransfer => "BANK_TRANSFER",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::Cash,
            Self::CreditCard,
            Self::DebitCard,
            Self::Pse,
            Self::Nequi,
            Self::Daviplata,
            Self::BankTransfer,
        ]
        .into_iter()
        .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| UnknownVariant {
            kind: "payment method",
            value: s.to_string(),
        })
    }
}

/// Sales channel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum SalesChannel {
    #[default]
    Web,
    Mobile,
    Phone,
    Store,
    Whatsapp,
}

/// Purchase order entity
///
/// `total` is stored as given and is never reconciled against
/// `subtotal - discount + taxes + shipping_cost`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Purchase {
    pub id: i64,
    pub customer_id: i64,
    pub order_number: String,
    pub purchased_at: i64,
    pub product_description: String,
    pub quantity: i64,
    pub subtotal: f64,
    pub discount: f64,
    pub taxes: f64,
    pub shipping_cost: f64,
    pub total: f64,
    pub payment_method: PaymentMethod,
    pub installments: i64,
    pub sales_channel: SalesChannel,
    pub delivery_address: String,
    pub delivery_city: String,
    pub status: PurchaseStatus,
    /// YYYY-MM-DD
    pub estimated_delivery_date: Option<String>,
    pub delivered_at: Option<i64>,
    pub notes: String,
    pub tracking_code: String,
    pub created_by: String,
    pub updated_at: i64,
}

const MILLIS_PER_DAY: i64 = 86_400_000;

impl Purchase {
    /// Whole days elapsed between the purchase and `now_millis`
    pub fn days_since_purchase(&self, now_millis: i64) -> i64 {
        now_millis
            .saturating_sub(self.purchased_at)
            .div_euclid(MILLIS_PER_DAY)
    }

    /// Discount as a percentage of the subtotal (0 when the subtotal is 0)
    pub fn discount_percentage(&self) -> f64 {
        if self.subtotal > 0.0 {
            self.discount / self.subtotal * 100.0
        } else {
            0.0
        }
    }
}

/// Compact purchase view used in customer listings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseSummary {
    pub id: i64,
    pub order_number: String,
    pub purchased_at: i64,
    pub product_description: String,
    pub total: f64,
    pub status: PurchaseStatus,
    pub payment_method: PaymentMethod,
    pub sales_channel: SalesChannel,
    pub days_since_purchase: i64,
}

impl PurchaseSummary {
    pub fn from_purchase(p: &Purchase, now_millis: i64) -> Self {
        Self {
            id: p.id,
            order_number: p.order_number.clone(),
            purchased_at: p.purchased_at,
            product_description: p.product_description.clone(),
            total: p.total,
            status: p.status,
            payment_method: p.payment_method,
            sales_channel: p.sales_channel,
            days_since_purchase: p.days_since_purchase(now_millis),
        }
    }
}

fn default_quantity() -> i64 {
    1
}

/// Create purchase payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseCreate {
    pub customer_id: i64,
    /// Assigned automatically when absent
    #[serde(default)]
    pub order_number: Option<String>,
    /// Defaults to the creation instant
    #[serde(default)]
    pub purchased_at: Option<i64>,
    pub product_description: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    pub subtotal: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub taxes: f64,
    #[serde(default)]
    pub shipping_cost: f64,
    pub total: f64,
    pub payment_method: PaymentMethod,
    #[serde(default = "default_quantity")]
    pub installments: i64,
    #[serde(default)]
    pub sales_channel: SalesChannel,
    pub delivery_address: String,
    pub delivery_city: String,
    #[serde(default)]
    pub status: PurchaseStatus,
    #[serde(default)]
    pub estimated_delivery_date: Option<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tracking_code: String,
    #[serde(default)]
    pub created_by: String,
}

/// Update purchase payload
///
/// The owning customer and the order number cannot change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurchaseUpdate {
    pub purchased_at: Option<i64>,
    pub product_description: Option<String>,
    pub quantity: Option<i64>,
    pub subtotal: Option<f64>,
    pub discount: Option<f64>,
    pub taxes: Option<f64>,
    pub shipping_cost: Option<f64>,
    pub total: Option<f64>,
    pub payment_method: Option<PaymentMethod>,
    pub installments: Option<i64>,
    pub sales_channel: Option<SalesChannel>,
    pub delivery_address: Option<String>,
    pub delivery_city: Option<String>,
    pub status: Option<PurchaseStatus>,
    pub estimated_delivery_date: Option<String>,
    pub delivered_at: Option<i64>,
    pub notes: Option<String>,
    pub tracking_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counted_statuses() {
        assert!(PurchaseStatus::Completed.is_counted());
        assert!(PurchaseStatus::Pending.is_counted());
        assert!(PurchaseStatus::Delivered.is_counted());
        assert!(!PurchaseStatus::Cancelled.is_counted());
        assert!(!PurchaseStatus::Returned.is_counted());
    }

    #[test]
    fn test_status_parse_and_display() {
        assert_eq!(
            "shipped".parse::<PurchaseStatus>().unwrap(),
            PurchaseStatus::Shipped
        );
        assert_eq!(PurchaseStatus::Returned.to_string(), "RETURNED");
        assert!("LOST".parse::<PurchaseStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&PurchaseStatus::Processing).unwrap(),
            "\"PROCESSING\""
        );
    }

    #[test]
    fn test_days_since_purchase_saturates() {
        let json = r#"{
            "id": 1, "customer_id": 1, "order_number": "ORD-1",
            "purchased_at": -9223372036854775808,
            "product_description": "Laptop", "quantity": 1,
            "subtotal": 0.0, "discount": 0.0, "taxes": 0.0,
            "shipping_cost": 0.0, "total": 0.0,
            "payment_method": "CASH", "installments": 1, "sales_channel": "WEB",
            "delivery_address": "Calle 1", "delivery_city": "Cali",
            "status": "PENDING", "estimated_delivery_date": null,
            "delivered_at": null, "notes": "", "tracking_code": "",
            "created_by": "", "updated_at": 0
        }"#;
        let mut p: Purchase = serde_json::from_str(json).unwrap();
        assert_eq!(p.days_since_purchase(1_000), i64::MAX / MILLIS_PER_DAY);

        p.purchased_at = 0;
        assert_eq!(p.days_since_purchase(3 * MILLIS_PER_DAY + 1), 3);
        assert_eq!(p.days_since_purchase(-1), -1);
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!(
            "credit_card".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::CreditCard
        );
        assert!("BARTER".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_create_payload_defaults() {
        let json = r#"{
            "customer_id": 1,
            "product_description": "Laptop",
            "subtotal": 100.0,
            "total": 119.0,
            "payment_method": "NEQUI",
            "delivery_address": "Calle 1",
            "delivery_city": "Medellín"
        }"#;
        let p: PurchaseCreate = serde_json::from_str(json).unwrap();
        assert_eq!(p.quantity, 1);
        assert_eq!(p.installments, 1);
        assert_eq!(p.status, PurchaseStatus::Pending);
        assert_eq!(p.sales_channel, SalesChannel::Web);
        assert!(p.order_number.is_none());
    }
}
