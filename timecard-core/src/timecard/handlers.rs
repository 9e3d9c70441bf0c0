use axum::extract::{Query, State};
use axum::response::Json;
use axum::Extension;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::models::shift::{AssignProjectRequest, EditShiftRequest, TimecardAction};
use crate::timecard::ledger;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimecardQuery {
    pub action: Option<String>,
    pub shift_id: Option<Uuid>,
}

/// `GET /timecard?action=status|shifts`
pub async fn timecard_get_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Query(query): Query<TimecardQuery>,
) -> Result<Json<Value>, ApiError> {
    match query.action.as_deref() {
        Some("status") => {
            let open = ledger::shift_status(&state.db, user_id).await?;
            Ok(Json(json!({
                "isClocked": open.is_some(),
                "lastClockIn": open,
            })))
        }
        Some("shifts") => {
            let shifts = ledger::list_shifts(&state.db, user_id).await?;
            Ok(Json(json!({ "shifts": shifts })))
        }
        _ => Err(ApiError::invalid("action must be 'status' or 'shifts'")),
    }
}

/// `POST /timecard` - clock in or out.
pub async fn timecard_post_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(body): Json<TimecardAction>,
) -> Result<Json<Value>, ApiError> {
    match body.action.as_str() {
        "clockIn" => {
            let shift_id = ledger::clock_in(&state.db, user_id, body.timestamp).await?;
            Ok(Json(json!({ "success": true, "shiftId": shift_id })))
        }
        "clockOut" => {
            let shift_id = body
                .shift_id
                .ok_or_else(|| ApiError::invalid("shiftId is required for clockOut"))?;
            ledger::clock_out(&state.db, user_id, shift_id, body.timestamp).await?;
            Ok(Json(json!({ "success": true })))
        }
        _ => Err(ApiError::invalid("action must be 'clockIn' or 'clockOut'")),
    }
}

/// `PUT /timecard/edit` - overwrite one or both timestamps of a shift.
pub async fn timecard_edit_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(body): Json<EditShiftRequest>,
) -> Result<Json<Value>, ApiError> {
    ledger::edit_shift(
        &state.db,
        user_id,
        body.shift_id,
        body.clock_in_time,
        body.clock_out_time,
    )
    .await?;
    Ok(Json(json!({ "success": true })))
}

/// `DELETE /timecard?shiftId=` - remove both legs of a shift.
pub async fn timecard_delete_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Query(query): Query<TimecardQuery>,
) -> Result<Json<Value>, ApiError> {
    let shift_id = query
        .shift_id
        .ok_or_else(|| ApiError::invalid("shiftId is required"))?;
    ledger::delete_shift(&state.db, user_id, shift_id).await?;
    Ok(Json(json!({ "success": true })))
}

/// `POST /timecard/project` - tag both legs of a shift with a project.
pub async fn timecard_project_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(body): Json<AssignProjectRequest>,
) -> Result<Json<Value>, ApiError> {
    ledger::assign_project(&state.db, user_id, body.shift_id, body.project_id).await?;
    Ok(Json(json!({ "success": true })))
}
