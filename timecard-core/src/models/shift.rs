use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Clock-in event row.
///
/// A shift is the logical pairing of one clock-in and at most one clock-out
/// sharing the same `shift_id`; this table holds the opening leg.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ClockInRecord {
    /// Unique identifier for the event row
    pub id: Uuid,

    /// ID of the user who owns this event
    pub user_id: Uuid,

    /// Identifier shared with the matching clock-out
    pub shift_id: Uuid,

    /// Optional project tag (referenced, never owned)
    pub project_id: Option<Uuid>,

    /// When the user clocked in (UTC)
    pub timestamp: DateTime<Utc>,

    /// Timestamp when the row was created
    pub created_at: DateTime<Utc>,
}

/// Clock-out event row, the closing leg of a shift.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ClockOutRecord {
    /// Unique identifier for the event row
    pub id: Uuid,

    /// ID of the user who owns this event
    pub user_id: Uuid,

    /// Identifier shared with the matching clock-in
    pub shift_id: Uuid,

    /// Optional project tag, kept in step with the clock-in leg
    pub project_id: Option<Uuid>,

    /// When the user clocked out (UTC)
    pub timestamp: DateTime<Utc>,

    /// Timestamp when the row was created
    pub created_at: DateTime<Utc>,
}

/// A joined clock-in/clock-out pair as returned to clients.
///
/// An open shift has no clock-out leg and therefore no duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub shift_id: Uuid,
    pub clock_in: DateTime<Utc>,
    pub clock_out: Option<DateTime<Utc>>,
    pub project_id: Option<Uuid>,
    pub project_name: Option<String>,

    /// Closed-shift length in seconds; `None` while the shift is open
    pub duration_secs: Option<i64>,

    /// Display form of the duration, e.g. "2h 30m"
    pub duration: Option<String>,
}

/// Mutation request for `POST /timecard`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimecardAction {
    /// "clockIn" or "clockOut"
    pub action: String,
    pub timestamp: DateTime<Utc>,

    /// Required for clock-out
    pub shift_id: Option<Uuid>,
}

/// Timestamp overwrite request for `PUT /timecard/edit`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditShiftRequest {
    pub shift_id: Uuid,
    pub clock_in_time: Option<DateTime<Utc>>,
    pub clock_out_time: Option<DateTime<Utc>>,
}

/// Project tagging request for `POST /timecard/project`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignProjectRequest {
    pub shift_id: Uuid,

    /// `None` clears the tag from both legs
    pub project_id: Option<Uuid>,
}
