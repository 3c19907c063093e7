use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use crate::config::AppConfig;

/// GET /api/health
/// Liveness plus a database round trip
pub async fn health_check(State(config): State<AppConfig>) -> impl IntoResponse {
    let database = match sqlx::query("SELECT 1").execute(&config.database_pool).await {
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!("Health check database ping failed: {}", e);
            "unavailable"
        }
    };

    let status = if database == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "status": if database == "ok" { "ok" } else { "degraded" },
            "service": "storefront_catalog",
            "database": database,
            "timestamp": chrono::Utc::now(),
        })),
    )
}
