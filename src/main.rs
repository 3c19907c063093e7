use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_catalog::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO; override with RUST_LOG
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "storefront_catalog=info,tower_http=info,sqlx=warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().await?;

    sqlx::migrate!("./migrations")
        .run(&config.database_pool)
        .await?;
    tracing::info!("Database migrations applied");

    for origin in &config.cors_origins {
        if origin.starts_with("http://") && !origin.contains("localhost") {
            tracing::warn!("Insecure HTTP origin in CORS: {} (use HTTPS in production)", origin);
        }
    }

    let address = config.server_address();
    let app = storefront_catalog::create_router(config);

    tracing::info!("Starting storefront catalog server on http://{}", address);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
