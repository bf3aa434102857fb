//! Session cookie helpers
//!
//! Identity travels in an HTTP-only cookie holding the signed token.
//! These helpers keep the cookie attributes in one place so login,
//! logout, and the 401 path all agree on them.

use axum::http::HeaderMap;
use axum::http::header;

/// Cookie name carrying the signed session token
pub const AUTH_COOKIE: &str = "token";

/// Build the Set-Cookie value for a fresh session token
pub fn auth_cookie(token: &str, max_age_secs: i64) -> String {
    format!("{AUTH_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age_secs}")
}

/// Build the Set-Cookie value that clears the session cookie
pub fn clear_auth_cookie() -> String {
    format!("{AUTH_COOKIE}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0")
}

/// Extract the session token from the Cookie header(s), if present
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        for pair in raw.split(';') {
            let pair = pair.trim();
            if let Some(token) = pair.strip_prefix("token=")
                && !token.is_empty()
            {
                return Some(token.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; token=abc.def.ghi; lang=el"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_missing_or_empty_token() {
        let mut headers = HeaderMap::new();
        assert!(token_from_headers(&headers).is_none());

        headers.insert(header::COOKIE, HeaderValue::from_static("token="));
        assert!(token_from_headers(&headers).is_none());
    }

    #[test]
    fn test_cookie_round_trip() {
        let set = auth_cookie("abc", 3600);
        assert!(set.contains("HttpOnly"));
        assert!(set.starts_with("token=abc;"));
        assert!(clear_auth_cookie().contains("Max-Age=0"));
    }
}
