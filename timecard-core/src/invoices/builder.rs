use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::invoice::{
    CreateInvoiceRequest, Invoice, InvoiceLineItem, InvoiceWithLineItems,
};
use crate::models::{ClockInRecord, ClockOutRecord};

/// Invoicing defaults pulled while advancing the number sequence.
#[derive(Debug, sqlx::FromRow)]
struct BillingSettings {
    default_hourly_rate: Decimal,
    default_due_date_days: i32,
    invoice_number_prefix: String,
    invoice_number_suffix: Option<String>,
    /// Value AFTER the atomic increment; this invoice consumed the previous one.
    next_invoice_number: i32,
}

/// Builds the human-readable invoice number: prefix + sequence + suffix.
pub fn format_invoice_number(prefix: &str, sequence: i32, suffix: Option<&str>) -> String {
    format!("{}{}{}", prefix, sequence, suffix.unwrap_or(""))
}

/// Normalizes an inclusive date range to start-of-day / end-of-day instants.
pub fn normalize_range(
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(DateTime<Utc>, DateTime<Utc>), ApiError> {
    if start > end {
        return Err(ApiError::invalid("startDate must not be after endDate"));
    }

    let start_dt = start
        .and_hms_opt(0, 0, 0)
        .map(|dt| Utc.from_utc_datetime(&dt))
        .ok_or_else(|| ApiError::invalid("malformed startDate"))?;
    let end_dt = end
        .and_hms_milli_opt(23, 59, 59, 999)
        .map(|dt| Utc.from_utc_datetime(&dt))
        .ok_or_else(|| ApiError::invalid("malformed endDate"))?;

    Ok((start_dt, end_dt))
}

/// Hours between a clock-in/clock-out pair.
pub fn shift_hours(clock_in: DateTime<Utc>, clock_out: DateTime<Utc>) -> f64 {
    (clock_out - clock_in).num_seconds() as f64 / 3600.0
}

/// Monetary amount for a line: hours × rate, rounded to cents.
pub fn line_amount(hours: f64, rate: Decimal) -> Decimal {
    (Decimal::from_f64_retain(hours).unwrap_or_default() * rate).round_dp(2)
}

/// Tax and grand total from a subtotal and optional flat tax percentage.
pub fn compute_totals(subtotal: Decimal, tax_rate: Option<Decimal>) -> (Decimal, Decimal) {
    let tax_amount = tax_rate
        .map(|r| (subtotal * r / Decimal::from(100)).round_dp(2))
        .unwrap_or_default();
    (tax_amount, subtotal + tax_amount)
}

/// Line description, e.g. "Tue, Mar 5: Frontend work (09:00 AM - 01:00 PM)".
///
/// A tagged shift whose project row no longer resolves reads
/// "Unspecified Project"; an untagged shift reads "Work hours".
pub fn line_description(
    clock_in: DateTime<Utc>,
    clock_out: DateTime<Utc>,
    project_id: Option<Uuid>,
    project_name: Option<&str>,
) -> String {
    let label = match (project_id, project_name) {
        (_, Some(name)) => name,
        (Some(_), None) => "Unspecified Project",
        (None, None) => "Work hours",
    };
    format!(
        "{}: {} ({} - {})",
        clock_in.format("%a, %b %-d"),
        label,
        clock_in.format("%I:%M %p"),
        clock_out.format("%I:%M %p"),
    )
}

async fn fetch_events_in_range(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(Vec<ClockInRecord>, Vec<ClockOutRecord>), sqlx::Error> {
    let clock_ins = sqlx::query_as::<_, ClockInRecord>(
        r#"
        SELECT id, user_id, shift_id, project_id, timestamp, created_at
        FROM clock_in_records
        WHERE user_id = $1 AND timestamp BETWEEN $2 AND $3
        ORDER BY timestamp ASC
        "#,
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(&mut **tx)
    .await?;

    let clock_outs = sqlx::query_as::<_, ClockOutRecord>(
        r#"
        SELECT id, user_id, shift_id, project_id, timestamp, created_at
        FROM clock_out_records
        WHERE user_id = $1 AND timestamp BETWEEN $2 AND $3
        "#,
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(&mut **tx)
    .await?;

    Ok((clock_ins, clock_outs))
}

async fn resolve_project_names(
    tx: &mut Transaction<'_, Postgres>,
    ids: &HashSet<Uuid>,
) -> Result<HashMap<Uuid, String>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, (Uuid, String)>(
        "SELECT id, name FROM projects WHERE id = ANY($1)",
    )
    .bind(ids.iter().copied().collect::<Vec<_>>())
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows.into_iter().collect())
}

/// Creates an invoice for the given period.
///
/// The whole flow runs in one transaction: advancing the invoice-number
/// sequence (an atomic increment that doubles as the settings read), the
/// placeholder invoice row, the line items derived from matched shift pairs,
/// and the totals back-fill. Any failure rolls everything back, so no partial
/// invoice, orphaned line item, or consumed sequence number survives.
///
/// A period with zero matched shifts yields an empty, zero-total invoice.
/// Re-submitting the same range creates a second invoice and consumes a
/// second number - creation is not idempotent.
pub async fn create_invoice(
    pool: &PgPool,
    user_id: Uuid,
    req: CreateInvoiceRequest,
) -> Result<InvoiceWithLineItems, ApiError> {
    let (start, end) = normalize_range(req.start_date, req.end_date)?;

    info!(
        "Creating invoice for user {} covering {} - {}",
        user_id, start, end
    );

    let mut tx = pool.begin().await?;

    // Atomic fetch-and-increment of the sequence; also the settings read.
    let settings = sqlx::query_as::<_, BillingSettings>(
        r#"
        UPDATE invoice_settings
        SET next_invoice_number = next_invoice_number + 1, updated_at = now()
        WHERE user_id = $1
        RETURNING default_hourly_rate, default_due_date_days,
                  invoice_number_prefix, invoice_number_suffix, next_invoice_number
        "#,
    )
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(ApiError::SettingsMissing)?;

    let sequence = settings.next_invoice_number - 1;
    let invoice_number = format_invoice_number(
        &settings.invoice_number_prefix,
        sequence,
        settings.invoice_number_suffix.as_deref(),
    );
    let due_date = Utc::now() + Duration::days(i64::from(settings.default_due_date_days));

    // Placeholder row; totals are back-filled after the line items.
    let mut invoice = sqlx::query_as::<_, Invoice>(
        r#"
        INSERT INTO invoices (user_id, invoice_number, start_date, end_date, due_date, status)
        VALUES ($1, $2, $3, $4, $5, 'draft')
        RETURNING id, user_id, invoice_number, start_date, end_date, due_date,
                  subtotal, tax_rate, tax_amount, total, status, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(&invoice_number)
    .bind(start)
    .bind(end)
    .bind(due_date)
    .fetch_one(&mut *tx)
    .await?;

    let (clock_ins, clock_outs) = fetch_events_in_range(&mut tx, user_id, start, end).await?;

    let outs_by_shift: HashMap<Uuid, &ClockOutRecord> =
        clock_outs.iter().map(|o| (o.shift_id, o)).collect();

    let project_ids: HashSet<Uuid> = clock_ins.iter().filter_map(|ci| ci.project_id).collect();
    let project_names = resolve_project_names(&mut tx, &project_ids).await?;

    let mut subtotal = Decimal::ZERO;
    let mut line_items = Vec::new();

    for clock_in in &clock_ins {
        // A clock-in with no matching clock-out in range is skipped; there is
        // no partial-shift billing.
        let Some(clock_out) = outs_by_shift.get(&clock_in.shift_id) else {
            warn!("No matching clock-out for shift {}", clock_in.shift_id);
            continue;
        };

        let hours = shift_hours(clock_in.timestamp, clock_out.timestamp);
        let project_name = clock_in
            .project_id
            .and_then(|pid| project_names.get(&pid))
            .map(String::as_str);
        let rate = settings.default_hourly_rate;
        let amount = line_amount(hours, rate);
        subtotal += amount;

        let item = sqlx::query_as::<_, InvoiceLineItem>(
            r#"
            INSERT INTO invoice_line_items (invoice_id, project_id, description, quantity, rate, amount)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, invoice_id, project_id, description, quantity, rate, amount, created_at
            "#,
        )
        .bind(invoice.id)
        .bind(clock_in.project_id)
        .bind(line_description(
            clock_in.timestamp,
            clock_out.timestamp,
            clock_in.project_id,
            project_name,
        ))
        .bind(Decimal::from_f64_retain(hours).unwrap_or_default().round_dp(4))
        .bind(rate)
        .bind(amount)
        .fetch_one(&mut *tx)
        .await?;

        line_items.push(item);
    }

    let (tax_amount, total) = compute_totals(subtotal, invoice.tax_rate);

    sqlx::query(
        r#"
        UPDATE invoices
        SET subtotal = $1, tax_amount = $2, total = $3, updated_at = now()
        WHERE id = $4
        "#,
    )
    .bind(subtotal)
    .bind(tax_amount)
    .bind(total)
    .bind(invoice.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    invoice.subtotal = subtotal;
    invoice.tax_amount = Some(tax_amount);
    invoice.total = total;

    info!(
        "Created invoice {} ({} line items, total {})",
        invoice.invoice_number,
        line_items.len(),
        invoice.total
    );

    Ok(InvoiceWithLineItems {
        invoice,
        line_items,
    })
}

/// One invoice with its line items; `NotFound` when absent or foreign.
pub async fn get_invoice(
    pool: &PgPool,
    user_id: Uuid,
    invoice_id: Uuid,
) -> Result<InvoiceWithLineItems, ApiError> {
    let invoice = sqlx::query_as::<_, Invoice>(
        r#"
        SELECT id, user_id, invoice_number, start_date, end_date, due_date,
               subtotal, tax_rate, tax_amount, total, status, created_at, updated_at
        FROM invoices
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(invoice_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(ApiError::NotFound("invoice"))?;

    let line_items = sqlx::query_as::<_, InvoiceLineItem>(
        r#"
        SELECT id, invoice_id, project_id, description, quantity, rate, amount, created_at
        FROM invoice_line_items
        WHERE invoice_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(invoice_id)
    .fetch_all(pool)
    .await?;

    Ok(InvoiceWithLineItems {
        invoice,
        line_items,
    })
}

/// All invoices for a user, newest first.
pub async fn list_invoices(pool: &PgPool, user_id: Uuid) -> Result<Vec<Invoice>, ApiError> {
    let invoices = sqlx::query_as::<_, Invoice>(
        r#"
        SELECT id, user_id, invoice_number, start_date, end_date, due_date,
               subtotal, tax_rate, tax_amount, total, status, created_at, updated_at
        FROM invoices
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(invoices)
}
