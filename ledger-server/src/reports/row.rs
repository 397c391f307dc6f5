//! Flat report rows
//!
//! Column titles are in Spanish, the language of the business users.

use chrono::DateTime;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use shared::models::Customer;

use super::{Cell, ReportTable};
use crate::ledger::LoyaltyCandidate;
use crate::ledger::money;
use crate::utils::time;

/// Printed in place of a date for customers without counted purchases
pub const NO_PURCHASES: &str = "Sin compras";

fn status_label(is_active: bool) -> &'static str {
    if is_active { "Activo" } else { "Inactivo" }
}

fn last_purchase_label(last_purchase_at: Option<i64>, tz: Tz) -> String {
    last_purchase_at
        .map(|millis| time::format_date(millis, tz))
        .unwrap_or_else(|| NO_PURCHASES.to_string())
}

/// One line of the loyalty report
#[derive(Debug, Clone, PartialEq)]
pub struct LoyaltyReportRow {
    pub customer_id: i64,
    pub document_type: String,
    pub document_number: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub department: String,
    pub total_last_month: f64,
    pub purchases_last_month: i64,
    pub lifetime_total: f64,
    /// `dd/mm/yyyy` or [`NO_PURCHASES`]
    pub last_purchase: String,
    /// `Activo` / `Inactivo`
    pub status: &'static str,
}

impl LoyaltyReportRow {
    pub const HEADERS: [&'static str; 13] = [
        "ID Cliente",
        "Tipo Documento",
        "Número Documento",
        "Nombre Completo",
        "Email",
        "Teléfono",
        "Ciudad",
        "Departamento",
        "Total Último Mes (COP)",
        "Cantidad Compras Último Mes",
        "Total Histórico (COP)",
        "Última Compra",
        "Estado Cliente",
    ];

    pub fn from_candidate(candidate: &LoyaltyCandidate, tz: Tz) -> Self {
        let c = &candidate.customer;
        Self {
            customer_id: c.id,
            document_type: c.document_type_name.clone(),
            document_number: c.document_number.clone(),
            full_name: c.full_name(),
            email: c.email.clone(),
            phone: c.phone.clone(),
            city: c.city.clone(),
            department: c.department.clone(),
            total_last_month: candidate.total_last_month,
            purchases_last_month: candidate.purchase_count_last_month,
            lifetime_total: c.lifetime_total,
            last_purchase: last_purchase_label(c.last_purchase_at, tz),
            status: status_label(c.is_active),
        }
    }

    pub fn into_cells(self) -> Vec<Cell> {
        vec![
            Cell::Integer(self.customer_id),
            Cell::Text(self.document_type),
            Cell::Text(self.document_number),
            Cell::Text(self.full_name),
            Cell::Text(self.email),
            Cell::Text(self.phone),
            Cell::Text(self.city),
            Cell::Text(self.department),
            Cell::Number(self.total_last_month),
            Cell::Integer(self.purchases_last_month),
            Cell::Number(self.lifetime_total),
            Cell::Text(self.last_purchase),
            Cell::from(self.status),
        ]
    }
}

/// Loyalty report table with the generation/criteria/count footer
pub fn loyalty_table(
    candidates: &[LoyaltyCandidate],
    min_amount: Decimal,
    generated_at: DateTime<Tz>,
) -> ReportTable {
    let tz = generated_at.timezone();
    ReportTable {
        title: "Reporte Fidelización".into(),
        headers: LoyaltyReportRow::HEADERS.iter().map(|h| h.to_string()).collect(),
        rows: candidates
            .iter()
            .map(|c| LoyaltyReportRow::from_candidate(c, tz).into_cells())
            .collect(),
        footer: vec![
            format!("Reporte generado: {}", generated_at.format("%d/%m/%Y")),
            format!(
                "Criterio mínimo: {} COP",
                money::format_currency(min_amount)
            ),
            format!("Total candidatos: {}", candidates.len()),
        ],
    }
}

/// One line of the customer export
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerExportRow {
    pub customer_id: i64,
    pub document_type: String,
    pub document_number: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub department: String,
    pub registered_on: String,
    pub lifetime_total: f64,
    pub last_purchase: String,
    pub status: &'static str,
}

impl CustomerExportRow {
    pub const HEADERS: [&'static str; 13] = [
        "ID Cliente",
        "Tipo Documento",
        "Número Documento",
        "Nombre Completo",
        "Email",
        "Teléfono",
        "Dirección",
        "Ciudad",
        "Departamento",
        "Fecha Registro",
        "Total Histórico (COP)",
        "Última Compra",
        "Estado Cliente",
    ];

    pub fn from_customer(c: &Customer, tz: Tz) -> Self {
        Self {
            customer_id: c.id,
            document_type: c.document_type_name.clone(),
            document_number: c.document_number.clone(),
            full_name: c.full_name(),
            email: c.email.clone(),
            phone: c.phone.clone(),
            address: c.address.clone(),
            city: c.city.clone(),
            department: c.department.clone(),
            registered_on: time::format_date(c.registered_at, tz),
            lifetime_total: c.lifetime_total,
            last_purchase: last_purchase_label(c.last_purchase_at, tz),
            status: status_label(c.is_active),
        }
    }

    pub fn into_cells(self) -> Vec<Cell> {
        vec![
            Cell::Integer(self.customer_id),
            Cell::Text(self.document_type),
            Cell::Text(self.document_number),
            Cell::Text(self.full_name),
            Cell::Text(self.email),
            Cell::Text(self.phone),
            Cell::Text(self.address),
            Cell::Text(self.city),
            Cell::Text(self.department),
            Cell::Text(self.registered_on),
            Cell::Number(self.lifetime_total),
            Cell::Text(self.last_purchase),
            Cell::from(self.status),
        ]
    }
}

/// Customer export table
pub fn customer_table(customers: &[Customer], generated_at: DateTime<Tz>) -> ReportTable {
    let tz = generated_at.timezone();
    ReportTable {
        title: "Clientes".into(),
        headers: CustomerExportRow::HEADERS.iter().map(|h| h.to_string()).collect(),
        rows: customers
            .iter()
            .map(|c| CustomerExportRow::from_customer(c, tz).into_cells())
            .collect(),
        footer: vec![
            format!("Reporte generado: {}", generated_at.format("%d/%m/%Y")),
            format!("Total clientes: {}", customers.len()),
        ],
    }
}
