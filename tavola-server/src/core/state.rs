use std::sync::Arc;

use chrono_tz::Tz;
use sqlx::SqlitePool;

use crate::auth::{FacebookOAuth, GoogleOAuth, JwtService, OAuthClient, OAuthRegistry};
use crate::core::Config;
use crate::db::DbService;
use crate::rate_limit::{MemoryRateLimitStore, RateLimiter};
use crate::services::{LogMailer, Mailer};

/// Server state holding shared handles to every service
///
/// Cloning is shallow: the pool and all services sit behind `Arc`s (the
/// sqlx pool is internally reference-counted).
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// SQLite connection pool
    pub pool: SqlitePool,
    /// JWT token service
    pub jwt_service: Arc<JwtService>,
    /// Request rate limiter
    pub rate_limiter: Arc<RateLimiter>,
    /// Outbound mail seam
    pub mailer: Arc<dyn Mailer>,
    /// OAuth provider registry
    pub oauth: Arc<OAuthRegistry>,
}

impl ServerState {
    pub fn new(
        config: Config,
        pool: SqlitePool,
        jwt_service: Arc<JwtService>,
        rate_limiter: Arc<RateLimiter>,
        mailer: Arc<dyn Mailer>,
        oauth: Arc<OAuthRegistry>,
    ) -> Self {
        Self {
            config,
            pool,
            jwt_service,
            rate_limiter,
            mailer,
            oauth,
        }
    }

    /// Initialize server state
    ///
    /// Opens the database (running migrations) and wires up the JWT
    /// service, rate limiter, mailer, and configured OAuth providers.
    ///
    /// # Panics
    ///
    /// Panics when the database cannot be opened or migrated.
    pub async fn initialize(config: &Config) -> Self {
        let db_service = DbService::new(&config.database_path)
            .await
            .expect("Failed to initialize database");

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let rate_limiter = Arc::new(RateLimiter::new(
            Arc::new(MemoryRateLimitStore::new()),
            config.rate_limit.clone(),
        ));
        let mailer: Arc<dyn Mailer> = Arc::new(LogMailer);

        let http = reqwest::Client::new();
        let mut oauth_clients: Vec<Arc<dyn OAuthClient>> = Vec::new();
        if config.google_oauth.is_configured() {
            oauth_clients.push(Arc::new(GoogleOAuth::new(
                http.clone(),
                config.google_oauth.clone(),
            )));
        }
        if config.facebook_oauth.is_configured() {
            oauth_clients.push(Arc::new(FacebookOAuth::new(
                http,
                config.facebook_oauth.clone(),
            )));
        }
        let oauth = Arc::new(OAuthRegistry::new(oauth_clients));

        Self::new(
            config.clone(),
            db_service.pool,
            jwt_service,
            rate_limiter,
            mailer,
            oauth,
        )
    }

    /// JWT token service handle
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// Timezone reservation date/time columns are interpreted in
    pub fn business_tz(&self) -> Tz {
        self.config.business_timezone
    }
}
