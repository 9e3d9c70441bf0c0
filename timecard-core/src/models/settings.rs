use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Business/contact profile, one-to-one with the user.
///
/// These fields flow straight onto the rendered invoice header.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
    pub user_id: Uuid,
    pub company_name: Option<String>,
    pub company_address: Option<String>,
    pub company_email: Option<String>,
    pub company_phone: Option<String>,
    pub country: Option<String>,
    pub tax_id: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-user invoicing defaults and the invoice-number sequence.
///
/// `next_invoice_number` is the only mutable sequence in the system; it only
/// advances through invoice creation, never through the settings upsert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSettings {
    pub user_id: Uuid,
    pub default_hourly_rate: Decimal,
    pub currency: String,
    pub default_due_date_days: i32,
    pub invoice_number_prefix: String,
    pub invoice_number_suffix: Option<String>,
    pub next_invoice_number: i32,
    pub payment_terms: Option<String>,
    pub default_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Upsert payload for the business profile.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfigPayload {
    pub company_name: Option<String>,
    pub company_address: Option<String>,
    pub company_email: Option<String>,
    pub company_phone: Option<String>,
    pub country: Option<String>,
    pub tax_id: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
}

/// Upsert payload for invoicing defaults.
///
/// The settings form always posts the full object, so the upsert is a full
/// replace of every field except the sequence counter.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSettingsPayload {
    pub default_hourly_rate: Decimal,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default = "default_due_days")]
    pub default_due_date_days: i32,

    #[serde(default = "default_prefix")]
    pub invoice_number_prefix: String,

    pub invoice_number_suffix: Option<String>,
    pub payment_terms: Option<String>,
    pub default_notes: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_due_days() -> i32 {
    30
}

fn default_prefix() -> String {
    "INV-".to_string()
}
