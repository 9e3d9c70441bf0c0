use axum::extract::{Query, State};
use axum::response::Json;
use axum::Extension;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::periods::aggregator::{aggregate, Granularity};
use crate::timecard::ledger;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    #[serde(default = "default_granularity")]
    pub granularity: Granularity,
}

fn default_granularity() -> Granularity {
    Granularity::Weekly
}

/// `GET /reports?granularity=weekly|biweekly|monthly`
///
/// Aggregates the caller's shifts into billing-period cards. Viewing a report
/// does not require invoice settings; without them the amounts are zero.
pub async fn reports_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Value>, ApiError> {
    let shifts = ledger::list_shifts(&state.db, user_id).await?;

    let rate = sqlx::query_scalar::<_, Decimal>(
        "SELECT default_hourly_rate FROM invoice_settings WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .unwrap_or_default();

    let cards = aggregate(&shifts, query.granularity, rate, Utc::now());
    Ok(Json(json!({ "periods": cards })))
}
