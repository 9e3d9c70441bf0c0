use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Json, Response};
use axum::Extension;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::invoices::builder;
use crate::models::invoice::CreateInvoiceRequest;
use crate::render::{render_invoice, CompanyProfile};
use crate::settings::get_user_config;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceQuery {
    pub invoice_id: Option<Uuid>,
}

/// `GET /invoices[?invoiceId=]` - list invoices, or fetch one with its line
/// items.
pub async fn invoices_get_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Query(query): Query<InvoiceQuery>,
) -> Result<Json<Value>, ApiError> {
    match query.invoice_id {
        Some(invoice_id) => {
            let invoice = builder::get_invoice(&state.db, user_id, invoice_id).await?;
            Ok(Json(json!({ "invoice": invoice })))
        }
        None => {
            let invoices = builder::list_invoices(&state.db, user_id).await?;
            Ok(Json(json!({ "invoices": invoices })))
        }
    }
}

/// `POST /invoices {startDate, endDate}` - run the invoice builder.
pub async fn invoices_post_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(body): Json<CreateInvoiceRequest>,
) -> Result<Json<Value>, ApiError> {
    let invoice = builder::create_invoice(&state.db, user_id, body).await?;
    Ok(Json(json!({ "invoice": invoice })))
}

/// `GET /invoices/pdf?invoiceId=` - render an invoice as a downloadable PDF.
pub async fn invoice_pdf_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Query(query): Query<InvoiceQuery>,
) -> Result<Response, ApiError> {
    let invoice_id = query
        .invoice_id
        .ok_or_else(|| ApiError::invalid("invoiceId is required"))?;

    let invoice = builder::get_invoice(&state.db, user_id, invoice_id).await?;
    let (config, settings) = get_user_config(&state.db, user_id).await?;
    let profile = CompanyProfile::from_config(config.as_ref(), settings.as_ref());

    let bytes = render_invoice(&invoice.invoice, &invoice.line_items, &profile);

    let filename = format!("invoice-{}.pdf", invoice.invoice.invoice_number);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response())
}
