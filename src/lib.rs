pub mod config;
pub mod models;
pub mod repositories;
pub mod services;
pub mod handlers;
pub mod middleware;
pub mod utils;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use config::AppConfig;

/// Headroom for multipart boundaries and part headers on top of the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn create_router(config: AppConfig) -> Router {
    use crate::handlers::{
        bulk_import::{bulk_upload, bulk_upload_template},
        catalog::{get_product_by_slug, list_categories, list_products},
        health::health_check,
    };
    use crate::middleware::{admin_middleware, auth_middleware, request_id_middleware};

    let cors_origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(cors_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_credentials(true)
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT, header::COOKIE]);

    let admin = Router::new()
        .route("/products/bulk-upload", post(bulk_upload))
        .route("/products/bulk-upload/template", get(bulk_upload_template))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES))
        // Layers run bottom-up: auth attaches claims before the role check
        .layer(axum_middleware::from_fn(admin_middleware))
        .layer(axum_middleware::from_fn_with_state(config.clone(), auth_middleware));

    Router::new()
        .nest("/api/admin", admin)
        .route("/api/categories", get(list_categories))
        .route("/api/products", get(list_products))
        .route("/api/products/:slug", get(get_product_by_slug))
        .route("/api/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(config)
}
