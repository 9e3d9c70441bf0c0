use axum::extract::State;
use axum::response::Json;
use axum::Extension;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::models::settings::{
    InvoiceSettings, InvoiceSettingsPayload, UserConfig, UserConfigPayload,
};
use crate::AppState;

/// Reads the business profile and invoicing defaults for a user. Either may
/// be absent before first setup.
pub async fn get_user_config(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<(Option<UserConfig>, Option<InvoiceSettings>), ApiError> {
    let config = sqlx::query_as::<_, UserConfig>(
        r#"
        SELECT user_id, company_name, company_address, company_email, company_phone,
               country, tax_id, website, logo_url, created_at, updated_at
        FROM user_config
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let settings = sqlx::query_as::<_, InvoiceSettings>(
        r#"
        SELECT user_id, default_hourly_rate, currency, default_due_date_days,
               invoice_number_prefix, invoice_number_suffix, next_invoice_number,
               payment_terms, default_notes, created_at, updated_at
        FROM invoice_settings
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok((config, settings))
}

/// Upserts the business profile (full replace).
pub async fn upsert_user_config(
    pool: &PgPool,
    user_id: Uuid,
    payload: UserConfigPayload,
) -> Result<(), ApiError> {
    sqlx::query(
        r#"
        INSERT INTO user_config (
            user_id, company_name, company_address, company_email, company_phone,
            country, tax_id, website, logo_url
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (user_id)
        DO UPDATE SET
            company_name = EXCLUDED.company_name,
            company_address = EXCLUDED.company_address,
            company_email = EXCLUDED.company_email,
            company_phone = EXCLUDED.company_phone,
            country = EXCLUDED.country,
            tax_id = EXCLUDED.tax_id,
            website = EXCLUDED.website,
            logo_url = EXCLUDED.logo_url,
            updated_at = now()
        "#,
    )
    .bind(user_id)
    .bind(payload.company_name)
    .bind(payload.company_address)
    .bind(payload.company_email)
    .bind(payload.company_phone)
    .bind(payload.country)
    .bind(payload.tax_id)
    .bind(payload.website)
    .bind(payload.logo_url)
    .execute(pool)
    .await?;

    Ok(())
}

/// Upserts invoicing defaults.
///
/// `next_invoice_number` is deliberately absent from the update set: the
/// sequence only advances through invoice creation.
pub async fn upsert_invoice_settings(
    pool: &PgPool,
    user_id: Uuid,
    payload: InvoiceSettingsPayload,
) -> Result<(), ApiError> {
    sqlx::query(
        r#"
        INSERT INTO invoice_settings (
            user_id, default_hourly_rate, currency, default_due_date_days,
            invoice_number_prefix, invoice_number_suffix, payment_terms, default_notes
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (user_id)
        DO UPDATE SET
            default_hourly_rate = EXCLUDED.default_hourly_rate,
            currency = EXCLUDED.currency,
            default_due_date_days = EXCLUDED.default_due_date_days,
            invoice_number_prefix = EXCLUDED.invoice_number_prefix,
            invoice_number_suffix = EXCLUDED.invoice_number_suffix,
            payment_terms = EXCLUDED.payment_terms,
            default_notes = EXCLUDED.default_notes,
            updated_at = now()
        "#,
    )
    .bind(user_id)
    .bind(payload.default_hourly_rate)
    .bind(payload.currency)
    .bind(payload.default_due_date_days)
    .bind(payload.invoice_number_prefix)
    .bind(payload.invoice_number_suffix)
    .bind(payload.payment_terms)
    .bind(payload.default_notes)
    .execute(pool)
    .await?;

    Ok(())
}

/// Body of `POST /user-config`; both sections are optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfigUpdate {
    pub user_config: Option<UserConfigPayload>,
    pub invoice_settings: Option<InvoiceSettingsPayload>,
}

/// `GET /user-config`
pub async fn user_config_get_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<Value>, ApiError> {
    let (config, settings) = get_user_config(&state.db, user_id).await?;
    Ok(Json(json!({
        "userConfig": config,
        "invoiceSettings": settings,
    })))
}

/// `POST /user-config` - upsert either or both sections, then return the
/// stored state.
pub async fn user_config_post_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(body): Json<UserConfigUpdate>,
) -> Result<Json<Value>, ApiError> {
    if let Some(config) = body.user_config {
        upsert_user_config(&state.db, user_id, config).await?;
    }

    if let Some(settings) = body.invoice_settings {
        upsert_invoice_settings(&state.db, user_id, settings).await?;
    }

    info!("User {} updated configuration", user_id);

    let (config, settings) = get_user_config(&state.db, user_id).await?;
    Ok(Json(json!({
        "userConfig": config,
        "invoiceSettings": settings,
    })))
}
