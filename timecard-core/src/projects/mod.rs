use axum::extract::State;
use axum::response::Json;
use axum::Extension;
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::models::project::{CreateProject, Project};
use crate::AppState;

/// All projects for a user, newest first.
pub async fn list_projects(pool: &PgPool, user_id: Uuid) -> Result<Vec<Project>, ApiError> {
    let projects = sqlx::query_as::<_, Project>(
        r#"
        SELECT id, user_id, name, link, created_at
        FROM projects
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(projects)
}

/// Creates a project and returns the stored row.
pub async fn create_project(
    pool: &PgPool,
    user_id: Uuid,
    req: CreateProject,
) -> Result<Project, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::invalid("project name is required"));
    }

    let project = sqlx::query_as::<_, Project>(
        r#"
        INSERT INTO projects (user_id, name, link)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, name, link, created_at
        "#,
    )
    .bind(user_id)
    .bind(req.name.trim())
    .bind(req.link)
    .fetch_one(pool)
    .await?;

    info!("User {} created project {}", user_id, project.id);
    Ok(project)
}

/// `GET /projects`
pub async fn projects_get_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<Value>, ApiError> {
    let projects = list_projects(&state.db, user_id).await?;
    Ok(Json(json!({ "projects": projects })))
}

/// `POST /projects`
pub async fn projects_post_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(body): Json<CreateProject>,
) -> Result<Json<Project>, ApiError> {
    let project = create_project(&state.db, user_id, body).await?;
    Ok(Json(project))
}
