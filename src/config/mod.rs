use std::env;
use anyhow::Result;
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Default upload ceiling for bulk import files (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub ssl_mode: String,
    pub max_connections: u32,
    /// Full connection URL; takes precedence over the individual parts.
    pub url: Option<String>,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        let url = env::var("DATABASE_URL").ok();

        // Individual parts are only required when no DATABASE_URL is given
        let password = match url {
            Some(_) => env::var("DATABASE_PASSWORD").unwrap_or_default(),
            None => env::var("DATABASE_PASSWORD")?,
        };

        Ok(Self {
            host: env::var("DATABASE_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("DATABASE_PORT")
                .unwrap_or_else(|_| "5432".to_string())
                .parse()?,
            username: env::var("DATABASE_USER").unwrap_or_else(|_| "postgres".to_string()),
            password,
            database: env::var("DATABASE_NAME").unwrap_or_else(|_| "storefront".to_string()),
            ssl_mode: env::var("DATABASE_SSL_MODE").unwrap_or_else(|_| "prefer".to_string()),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            url,
        })
    }

    pub fn connection_string(&self) -> String {
        if let Some(ref url) = self.url {
            return url.clone();
        }

        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            self.username, self.password, self.host, self.port, self.database, self.ssl_mode
        )
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub jwt_secret: String,
    pub server_host: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub database_pool: PgPool,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub async fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_config = DatabaseConfig::from_env()?;
        let database_pool = PgPoolOptions::new()
            .max_connections(database_config.max_connections)
            .connect(&database_config.connection_string())
            .await?;

        Ok(Self {
            database: database_config,
            jwt_secret: env::var("JWT_SECRET")?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            cors_origins: parse_cors_origins(
                &env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            ),
            database_pool,
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_cors_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database_config(url: Option<&str>) -> DatabaseConfig {
        DatabaseConfig {
            host: "db".to_string(),
            port: 5433,
            username: "shop".to_string(),
            password: "secret".to_string(),
            database: "storefront".to_string(),
            ssl_mode: "disable".to_string(),
            max_connections: 5,
            url: url.map(str::to_string),
        }
    }

    #[test]
    fn test_connection_string_from_parts() {
        assert_eq!(
            database_config(None).connection_string(),
            "postgres://shop:secret@db:5433/storefront?sslmode=disable"
        );
    }

    #[test]
    fn test_database_url_takes_precedence() {
        let config = database_config(Some("postgres://u:p@elsewhere/shop"));
        assert_eq!(config.connection_string(), "postgres://u:p@elsewhere/shop");
    }

    #[test]
    fn test_cors_origins_split_and_trimmed() {
        assert_eq!(
            parse_cors_origins("http://localhost:3000, https://admin.example.com,"),
            vec!["http://localhost:3000", "https://admin.example.com"]
        );
    }
}
