use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use thiserror::Error;
use tracing::error;

/// Error taxonomy shared by every handler and flow.
///
/// Validation problems carry a caller-facing message; storage and rendering
/// failures collapse into `Unexpected` and only a generic message leaves the
/// server.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No identity, or the caller tried to touch another user's resources.
    #[error("unauthorized")]
    Unauthorized,

    /// Resource absent or not owned by the caller.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Missing field, malformed date, clock-in at or after clock-out, etc.
    #[error("{0}")]
    InvalidInput(String),

    /// Invoice requested before invoice settings exist.
    #[error("invoice settings not found")]
    SettingsMissing,

    /// Storage or rendering failure.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl ApiError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::SettingsMissing => "settings_missing",
            Self::Unexpected(_) => "unexpected",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidInput(_) | Self::SettingsMissing => StatusCode::BAD_REQUEST,
            Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        Self::Unexpected(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Unexpected(e) => {
                error!("Unexpected error: {:#}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(serde_json::json!({
            "error": self.kind(),
            "message": message,
        }));

        (self.status(), body).into_response()
    }
}
