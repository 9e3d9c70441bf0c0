use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Invoice status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[sqlx(rename = "draft")]
    Draft,
    #[sqlx(rename = "sent")]
    Sent,
    #[sqlx(rename = "paid")]
    Paid,
}

/// Invoice model representing a billed period for a user.
///
/// Created in `draft` status with zero totals, which are back-filled once the
/// line items have been computed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Unique identifier for the invoice
    pub id: Uuid,

    /// ID of the user who owns this invoice
    pub user_id: Uuid,

    /// Human-readable number: prefix + sequence + suffix
    pub invoice_number: String,

    /// Billing period start (start of day, inclusive)
    pub start_date: DateTime<Utc>,

    /// Billing period end (end of day, inclusive)
    pub end_date: DateTime<Utc>,

    /// Payment due date
    pub due_date: DateTime<Utc>,

    /// Sum of line-item amounts
    pub subtotal: Decimal,

    /// Flat tax percentage, if any
    pub tax_rate: Option<Decimal>,

    /// subtotal × tax_rate / 100
    pub tax_amount: Option<Decimal>,

    /// subtotal + tax amount
    pub total: Decimal,

    /// Invoice lifecycle status
    pub status: InvoiceStatus,

    /// Timestamp when the invoice was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the invoice was last updated
    pub updated_at: DateTime<Utc>,
}

/// One billable row on an invoice, derived from one shift.
///
/// Owned exclusively by its invoice (cascade delete); `amount` is computed at
/// creation time and never recomputed automatically.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLineItem {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub project_id: Option<Uuid>,
    pub description: String,

    /// Hours worked
    pub quantity: Decimal,

    /// Hourly rate applied
    pub rate: Decimal,

    /// quantity × rate
    pub amount: Decimal,

    pub created_at: DateTime<Utc>,
}

/// Invoice creation request: the billing period, inclusive on both ends.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Invoice plus its line items, the shape returned after creation and from
/// single-invoice lookups.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceWithLineItems {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub line_items: Vec<InvoiceLineItem>,
}
