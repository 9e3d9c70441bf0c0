use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Project model - a named tag that shifts can be associated with.
///
/// Owned by a user; referenced (never owned) by shift events.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique identifier for the project
    pub id: Uuid,

    /// ID of the user who owns this project
    pub user_id: Uuid,

    /// Display name; line items and report buckets merge on this
    pub name: String,

    /// Optional external link
    pub link: Option<String>,

    /// Timestamp when the project was created
    pub created_at: DateTime<Utc>,
}

/// Project creation request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    pub name: String,
    pub link: Option<String>,
}
