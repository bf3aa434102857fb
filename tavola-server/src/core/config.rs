use chrono_tz::Tz;

use crate::auth::{JwtConfig, OAuthCredentials};
use crate::rate_limit::RateLimitConfig;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Purpose |
/// |----------|---------|---------|
/// | DATABASE_PATH | tavola.db | SQLite database file |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | BUSINESS_TIMEZONE | Europe/Athens | Timezone reservation date/time are written in |
/// | PUBLIC_BASE_URL | http://localhost:3000 | Base URL used in emailed links |
/// | GOOGLE_CLIENT_ID / _SECRET / _REDIRECT_URI | (unset) | Google OAuth credentials |
/// | FACEBOOK_CLIENT_ID / _SECRET / _REDIRECT_URI | (unset) | Facebook OAuth credentials |
/// | RATE_LIMIT_POINTS | 5 | Requests allowed per second per client |
///
/// # Example
///
/// ```ignore
/// DATABASE_PATH=/data/tavola.db HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file path
    pub database_path: String,
    /// HTTP API port
    pub http_port: u16,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Timezone reservation date/time columns are interpreted in
    pub business_timezone: Tz,
    /// Base URL for links placed in outbound mail
    pub public_base_url: String,
    /// Google OAuth credentials (empty = provider disabled)
    pub google_oauth: OAuthCredentials,
    /// Facebook OAuth credentials (empty = provider disabled)
    pub facebook_oauth: OAuthCredentials,
    /// Rate limiter tuning
    pub rate_limit: RateLimitConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let business_timezone = std::env::var("BUSINESS_TIMEZONE")
            .ok()
            .and_then(|tz| tz.parse().ok())
            .unwrap_or(chrono_tz::Europe::Athens);

        let mut rate_limit = RateLimitConfig::default();
        if let Some(points) = std::env::var("RATE_LIMIT_POINTS")
            .ok()
            .and_then(|p| p.parse().ok())
        {
            rate_limit.points = points;
        }

        Self {
            database_path: std::env::var("DATABASE_PATH").unwrap_or_else(|_| "tavola.db".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            business_timezone,
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            google_oauth: oauth_from_env("GOOGLE"),
            facebook_oauth: oauth_from_env("FACEBOOK"),
            rate_limit,
        }
    }

    /// Override the parts tests care about
    pub fn with_overrides(database_path: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.database_path = database_path.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn oauth_from_env(prefix: &str) -> OAuthCredentials {
    OAuthCredentials {
        client_id: std::env::var(format!("{prefix}_CLIENT_ID")).unwrap_or_default(),
        client_secret: std::env::var(format!("{prefix}_CLIENT_SECRET")).unwrap_or_default(),
        redirect_uri: std::env::var(format!("{prefix}_REDIRECT_URI")).unwrap_or_default(),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
