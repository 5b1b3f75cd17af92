use anyhow::Result;
use sea_orm::Database;

use crate::schemas::AppState;

/// JWT signing configuration, loaded from the environment once at startup.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// HMAC secret for HS256 signing
    pub secret: String,
    /// Access token lifetime in minutes
    pub access_lifetime_minutes: i64,
    /// Refresh token lifetime in days
    pub refresh_lifetime_days: i64,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET")
            .unwrap_or_else(|_| "insecure-dev-secret-change-me".to_string());
        let access_lifetime_minutes = std::env::var("ACCESS_TOKEN_LIFETIME_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(15);
        let refresh_lifetime_days = std::env::var("REFRESH_TOKEN_LIFETIME_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(7);

        Self {
            secret,
            access_lifetime_minutes,
            refresh_lifetime_days,
        }
    }
}

/// Initialize application configuration and state
pub async fn initialize_app_state() -> Result<AppState> {
    dotenvy::dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://coursehub.db".to_string());

    initialize_app_state_with_url(&database_url).await
}

/// Initialize application state against a specific database URL
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    tracing::info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    let auth = AuthConfig::from_env();

    Ok(AppState { db, auth })
}

/// Get bind address from environment or use default
pub fn get_bind_address() -> String {
    std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
}
