//! JWT token service
//!
//! Generates, validates, and decodes the signed tokens carried in the
//! session cookie. Users and owners share one signing key; the `kind`
//! claim keeps their sessions apart.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Signing secret (at least 32 bytes)
    pub secret: String,
    /// Session token lifetime (minutes)
    pub expiration_minutes: i64,
    /// Email-verification token lifetime (minutes)
    pub email_token_minutes: i64,
    /// Token issuer
    pub issuer: String,
    /// Token audience
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        let secret = match load_jwt_secret() {
            Ok(secret) => secret,
            Err(e) => {
                #[cfg(debug_assertions)]
                {
                    tracing::warn!("JWT configuration error: {}, generating temporary key", e);
                    generate_printable_secret()
                }
                #[cfg(not(debug_assertions))]
                {
                    panic!("FATAL: JWT_SECRET configuration failed: {}", e);
                }
            }
        };

        Self {
            secret,
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            email_token_minutes: std::env::var("JWT_EMAIL_TOKEN_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(24 * 60),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "tavola-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "tavola-app".to_string()),
        }
    }
}

/// Which kind of account a token belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    User,
    Owner,
}

impl IdentityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityKind::User => "user",
            IdentityKind::Owner => "owner",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(IdentityKind::User),
            "owner" => Some(IdentityKind::Owner),
            _ => None,
        }
    }
}

/// JWT claims stored in the token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account ID (subject)
    pub sub: String,
    /// Account email
    pub email: String,
    /// Account kind: "user" | "owner"
    pub kind: String,
    /// Token type: "access" | "email_verify"
    pub token_type: String,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued-at timestamp
    pub iat: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

/// JWT errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Generate a printable secret for development environments
#[cfg(debug_assertions)]
fn generate_printable_secret() -> String {
    let allowed_chars =
        "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+";

    let rng = SystemRandom::new();
    let mut key = String::new();

    for _ in 0..64 {
        let mut byte = [0u8; 1];
        if rng.fill(&mut byte).is_err() {
            return "TavolaDevelopmentFallbackKeyReplaceMe2026!".to_string();
        }
        let idx = (byte[0] as usize) % allowed_chars.len();
        key.push(allowed_chars.as_bytes()[idx] as char);
    }

    key
}

/// Load the signing secret from the environment
fn load_jwt_secret() -> Result<String, JwtError> {
    match std::env::var("JWT_SECRET") {
        Ok(secret) => {
            if secret.len() < 32 {
                return Err(JwtError::ConfigError(
                    "JWT_SECRET must be at least 32 characters long".to_string(),
                ));
            }
            Ok(secret)
        }
        Err(_) => Err(JwtError::ConfigError(
            "JWT_SECRET environment variable not set".to_string(),
        )),
    }
}

/// JWT token service
#[derive(Debug, Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new() -> Self {
        Self::with_config(JwtConfig::default())
    }

    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Generate a session token for an account
    pub fn generate_token(
        &self,
        id: i64,
        email: &str,
        kind: IdentityKind,
    ) -> Result<String, JwtError> {
        self.generate(id, email, kind, "access", self.config.expiration_minutes)
    }

    /// Generate a short-lived email-verification token
    pub fn generate_email_token(&self, id: i64, email: &str) -> Result<String, JwtError> {
        self.generate(
            id,
            email,
            IdentityKind::User,
            "email_verify",
            self.config.email_token_minutes,
        )
    }

    fn generate(
        &self,
        id: i64,
        email: &str,
        kind: IdentityKind,
        token_type: &str,
        minutes: i64,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(minutes);

        let claims = Claims {
            sub: id.to_string(),
            email: email.to_string(),
            kind: kind.as_str().to_string(),
            token_type: token_type.to_string(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Validate an email-verification token and return the account id
    pub fn validate_email_token(&self, token: &str) -> Result<i64, JwtError> {
        let claims = self.validate_token(token)?;
        if claims.token_type != "email_verify" {
            return Err(JwtError::InvalidToken("Wrong token type".to_string()));
        }
        claims
            .sub
            .parse()
            .map_err(|_| JwtError::InvalidToken("Malformed subject".to_string()))
    }
}

impl Default for JwtService {
    fn default() -> Self {
        Self::new()
    }
}

/// Authenticated user context (decoded from session-cookie claims)
///
/// Created by the auth middleware and injected into request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
}

/// Authenticated owner context
#[derive(Debug, Clone)]
pub struct CurrentOwner {
    pub id: i64,
    pub email: String,
}

impl Claims {
    /// Interpret access-token claims as the expected identity kind
    pub fn identity(&self, expected: IdentityKind) -> Result<(i64, String), JwtError> {
        if self.token_type != "access" {
            return Err(JwtError::InvalidToken("Wrong token type".to_string()));
        }
        if IdentityKind::parse(&self.kind) != Some(expected) {
            return Err(JwtError::InvalidToken("Wrong account kind".to_string()));
        }
        let id = self
            .sub
            .parse()
            .map_err(|_| JwtError::InvalidToken("Malformed subject".to_string()))?;
        Ok((id, self.email.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> JwtService {
        JwtService::with_config(JwtConfig {
            secret: "test-secret-test-secret-test-secret!".to_string(),
            expiration_minutes: 30,
            email_token_minutes: 60,
            issuer: "tavola-server".to_string(),
            audience: "tavola-app".to_string(),
        })
    }

    #[test]
    fn test_generate_and_validate_user_token() {
        let service = test_service();
        let token = service
            .generate_token(42, "maria@example.com", IdentityKind::User)
            .expect("Failed to generate token");

        let claims = service.validate_token(&token).expect("Failed to validate");
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "maria@example.com");
        assert_eq!(claims.kind, "user");

        let (id, email) = claims.identity(IdentityKind::User).unwrap();
        assert_eq!(id, 42);
        assert_eq!(email, "maria@example.com");
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let service = test_service();
        let token = service
            .generate_token(7, "owner@example.com", IdentityKind::Owner)
            .unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert!(claims.identity(IdentityKind::User).is_err());
        assert!(claims.identity(IdentityKind::Owner).is_ok());
    }

    #[test]
    fn test_email_token_round_trip() {
        let service = test_service();
        let token = service.generate_email_token(9, "nick@example.com").unwrap();
        assert_eq!(service.validate_email_token(&token).unwrap(), 9);

        // A session token must not pass as an email token
        let session = service
            .generate_token(9, "nick@example.com", IdentityKind::User)
            .unwrap();
        assert!(service.validate_email_token(&session).is_err());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = test_service();
        let token = service
            .generate_token(1, "a@example.com", IdentityKind::User)
            .unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        assert!(service.validate_token(&tampered).is_err());
    }
}
