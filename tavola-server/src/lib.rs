//! Tavola API Server: restaurant discovery & reservation backend
//!
//! # Architecture overview
//!
//! - **HTTP API** (`api`): RESTful routers, one module per resource
//! - **Authentication** (`auth`): JWT session cookies, argon2 passwords,
//!   OAuth code exchange
//! - **Database** (`db`): SQLite pool + repositories (all writes that
//!   span statements run inside transactions)
//! - **Rate limiting** (`rate_limit`): token bucket with escalating bans
//! - **Services** (`services`): outbound mail seam
//!
//! # Module structure
//!
//! ```text
//! tavola-server/src/
//! ├── core/          # config, state, server
//! ├── auth/          # JWT, cookie middleware, passwords, OAuth
//! ├── api/           # HTTP routers and handlers
//! ├── db/            # pool + repositories
//! ├── rate_limit/    # request throttling
//! ├── services/      # mailer seam
//! └── utils/         # errors, pagination, time, validation
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod rate_limit;
pub mod services;
pub mod utils;

// Re-export common types
pub use auth::{CurrentOwner, CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - keeps auth events greppable under one target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Load .env and initialize logging
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_logger();
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
  ______                  __
 /_  __/___ __   ______  / /___ _
  / / / __ `/ | / / __ \/ / __ `/
 / / / /_/ /| |/ / /_/ / / /_/ /
/_/  \__,_/ |___/\____/_/\__,_/
    "#
    );
}
