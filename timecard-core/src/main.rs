use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::Json;
use axum::routing::{get, post, put};
use axum::Router;
use dotenv::dotenv;
use timecard_core::{auth, db, invoices, periods, projects, settings, timecard, AppState};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Health check endpoint.
///
/// Returns a simple JSON response indicating the server is running.
/// Useful for monitoring and load balancer health checks.
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "timecard-core",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Database health check endpoint.
///
/// Verifies that the database connection is working by executing
/// a simple query.
async fn db_health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    sqlx::query("SELECT 1")
        .execute(&state.db)
        .await
        .map_err(|e| {
            tracing::error!("Database health check failed: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        })?;

    Ok(Json(serde_json::json!({
        "status": "ok",
        "database": "connected"
    })))
}

/// Creates the main application router.
///
/// Every resource route sits behind the JWT middleware; only the health
/// checks are public.
fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/timecard",
            get(timecard::timecard_get_handler)
                .post(timecard::timecard_post_handler)
                .delete(timecard::timecard_delete_handler),
        )
        .route("/timecard/edit", put(timecard::timecard_edit_handler))
        .route("/timecard/project", post(timecard::timecard_project_handler))
        .route(
            "/projects",
            get(projects::projects_get_handler).post(projects::projects_post_handler),
        )
        .route(
            "/invoices",
            get(invoices::invoices_get_handler).post(invoices::invoices_post_handler),
        )
        .route("/invoices/pdf", get(invoices::invoice_pdf_handler))
        .route(
            "/user-config",
            get(settings::user_config_get_handler).post(settings::user_config_post_handler),
        )
        .route("/reports", get(periods::reports_handler))
        .route_layer(middleware::from_fn(auth::jwt_middleware));

    Router::new()
        .route("/health", get(health_check))
        .route("/health/db", get(db_health_check))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive(LevelFilter::INFO.into());

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    info!("Starting Timecard Core Server...");

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
    let db_pool = db::create_pool(&database_url).await?;
    db::run_migrations(&db_pool).await?;

    let app_state = AppState { db: db_pool };
    let app = create_router(app_state);

    let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("SERVER_PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .map_err(|_| anyhow::anyhow!("Invalid SERVER_PORT"))?;

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}:{}: {}", host, port, e))?;

    info!("Server listening on {}:{}", host, port);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
