//! OAuth code exchange
//!
//! Each provider is one [`OAuthClient`] implementation turning an
//! authorization code into an [`ExternalProfile`]. HTTP handlers only
//! ever call [`OAuthRegistry::exchange_code_for_profile`]; no provider
//! callback machinery leaks past this module.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::utils::{AppError, AppResult};

/// Supported external identity providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Facebook,
}

impl OAuthProvider {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "google" => Some(OAuthProvider::Google),
            "facebook" => Some(OAuthProvider::Facebook),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Facebook => "facebook",
        }
    }
}

/// Profile returned by a provider after a successful code exchange
#[derive(Debug, Clone)]
pub struct ExternalProfile {
    pub provider: OAuthProvider,
    pub provider_user_id: String,
    pub email: String,
    pub name: String,
}

/// Client credentials for one provider
#[derive(Debug, Clone, Default)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl OAuthCredentials {
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

/// One provider's code-for-profile exchange
#[async_trait]
pub trait OAuthClient: Send + Sync {
    fn provider(&self) -> OAuthProvider;

    async fn exchange_code(&self, code: &str) -> AppResult<ExternalProfile>;
}

/// Registry of configured providers
pub struct OAuthRegistry {
    clients: Vec<Arc<dyn OAuthClient>>,
}

impl OAuthRegistry {
    pub fn new(clients: Vec<Arc<dyn OAuthClient>>) -> Self {
        Self { clients }
    }

    /// Exchange an authorization code for the external profile
    pub async fn exchange_code_for_profile(
        &self,
        provider: OAuthProvider,
        code: &str,
    ) -> AppResult<ExternalProfile> {
        let client = self
            .clients
            .iter()
            .find(|c| c.provider() == provider)
            .ok_or_else(|| {
                AppError::invalid(format!("Provider {} is not configured", provider.as_str()))
            })?;
        client.exchange_code(code).await
    }
}

// ── Google ──────────────────────────────────────────────────────────

pub struct GoogleOAuth {
    http: reqwest::Client,
    credentials: OAuthCredentials,
}

#[derive(Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct GoogleUserInfo {
    id: String,
    email: String,
    name: String,
}

impl GoogleOAuth {
    pub fn new(http: reqwest::Client, credentials: OAuthCredentials) -> Self {
        Self { http, credentials }
    }
}

#[async_trait]
impl OAuthClient for GoogleOAuth {
    fn provider(&self) -> OAuthProvider {
        OAuthProvider::Google
    }

    async fn exchange_code(&self, code: &str) -> AppResult<ExternalProfile> {
        let token: GoogleTokenResponse = self
            .http
            .post("https://oauth2.googleapis.com/token")
            .form(&[
                ("code", code),
                ("client_id", &self.credentials.client_id),
                ("client_secret", &self.credentials.client_secret),
                ("redirect_uri", &self.credentials.redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::internal(format!("Google token request failed: {e}")))?
            .error_for_status()
            .map_err(|_| AppError::invalid("OAuth code exchange rejected"))?
            .json()
            .await
            .map_err(|e| AppError::internal(format!("Google token response malformed: {e}")))?;

        let profile: GoogleUserInfo = self
            .http
            .get("https://www.googleapis.com/oauth2/v2/userinfo")
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| AppError::internal(format!("Google profile request failed: {e}")))?
            .error_for_status()
            .map_err(|_| AppError::invalid("OAuth profile fetch rejected"))?
            .json()
            .await
            .map_err(|e| AppError::internal(format!("Google profile malformed: {e}")))?;

        Ok(ExternalProfile {
            provider: OAuthProvider::Google,
            provider_user_id: profile.id,
            email: profile.email,
            name: profile.name,
        })
    }
}

// ── Facebook ────────────────────────────────────────────────────────

pub struct FacebookOAuth {
    http: reqwest::Client,
    credentials: OAuthCredentials,
}

#[derive(Deserialize)]
struct FacebookTokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct FacebookProfile {
    id: String,
    name: String,
    email: Option<String>,
}

impl FacebookOAuth {
    pub fn new(http: reqwest::Client, credentials: OAuthCredentials) -> Self {
        Self { http, credentials }
    }
}

#[async_trait]
impl OAuthClient for FacebookOAuth {
    fn provider(&self) -> OAuthProvider {
        OAuthProvider::Facebook
    }

    async fn exchange_code(&self, code: &str) -> AppResult<ExternalProfile> {
        let token: FacebookTokenResponse = self
            .http
            .get("https://graph.facebook.com/v12.0/oauth/access_token")
            .query(&[
                ("code", code),
                ("client_id", &self.credentials.client_id),
                ("client_secret", &self.credentials.client_secret),
                ("redirect_uri", &self.credentials.redirect_uri),
            ])
            .send()
            .await
            .map_err(|e| AppError::internal(format!("Facebook token request failed: {e}")))?
            .error_for_status()
            .map_err(|_| AppError::invalid("OAuth code exchange rejected"))?
            .json()
            .await
            .map_err(|e| AppError::internal(format!("Facebook token response malformed: {e}")))?;

        let profile: FacebookProfile = self
            .http
            .get("https://graph.facebook.com/me")
            .query(&[
                ("fields", "id,name,email"),
                ("access_token", &token.access_token),
            ])
            .send()
            .await
            .map_err(|e| AppError::internal(format!("Facebook profile request failed: {e}")))?
            .error_for_status()
            .map_err(|_| AppError::invalid("OAuth profile fetch rejected"))?
            .json()
            .await
            .map_err(|e| AppError::internal(format!("Facebook profile malformed: {e}")))?;

        let email = profile
            .email
            .ok_or_else(|| AppError::invalid("Facebook account has no email address"))?;

        Ok(ExternalProfile {
            provider: OAuthProvider::Facebook,
            provider_user_id: profile.id,
            email,
            name: profile.name,
        })
    }
}
