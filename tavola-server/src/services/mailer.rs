//! Outbound mail seam
//!
//! Actual delivery is an external collaborator; the server only needs
//! a place to hand off verification and reset links. [`LogMailer`]
//! writes them to the log, which is also what tests assert against.

use async_trait::async_trait;

use crate::utils::AppResult;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification(&self, to: &str, verify_url: &str) -> AppResult<()>;

    async fn send_password_reset(&self, to: &str, reset_url: &str) -> AppResult<()>;
}

/// Mailer that logs instead of sending
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification(&self, to: &str, verify_url: &str) -> AppResult<()> {
        tracing::info!(target: "mailer", to = %to, url = %verify_url, "verification email queued");
        Ok(())
    }

    async fn send_password_reset(&self, to: &str, reset_url: &str) -> AppResult<()> {
        tracing::info!(target: "mailer", to = %to, url = %reset_url, "password reset email queued");
        Ok(())
    }
}
