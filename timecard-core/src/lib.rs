pub mod auth;
pub mod db;
pub mod error;
pub mod invoices;
pub mod models;
pub mod periods;
pub mod projects;
pub mod render;
pub mod settings;
pub mod timecard;

use sqlx::PgPool;

/// Application state containing shared resources.
///
/// This struct holds the database connection pool and other
/// shared state that needs to be accessible to route handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub db: PgPool,
}
