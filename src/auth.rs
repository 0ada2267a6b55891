//! Sign-in and session tokens.
//!
//! The platform issues a JWT from `POST /api/auth/signin` (HTTP Basic). Tokens
//! live only as long as the process: [`SessionStore`] is an in-memory
//! [`TokenStore`].

use crate::error::DashboardError;
use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use log::{debug, info};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// A bearer token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().trim_matches('"').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(<{} bytes>)", self.0.len())
    }
}

pub trait TokenStore {
    fn get_token(&self) -> Option<Token>;
    fn set_token(&mut self, token: Token);
    fn clear(&mut self);
}

/// Token storage scoped to the current process.
#[derive(Debug, Default)]
pub struct SessionStore {
    token: Option<Token>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for SessionStore {
    fn get_token(&self) -> Option<Token> {
        self.token.clone()
    }

    fn set_token(&mut self, token: Token) {
        self.token = Some(token);
    }

    fn clear(&mut self) {
        self.token = None;
    }
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<f64>,
}

/// Expiry instant from the JWT payload, if it carries a readable `exp`.
pub fn expires_at(token: &Token) -> Option<DateTime<Utc>> {
    let mut parts = token.as_str().split('.');
    let (_header, payload, _sig) = (parts.next()?, parts.next()?, parts.next()?);
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.exp.filter(|e| e.is_finite())?;
    DateTime::from_timestamp_millis((exp * 1000.0) as i64)
}

/// `true` once `now` is past `exp`. Malformed tokens count as expired.
pub fn is_expired(token: &Token, now: DateTime<Utc>) -> bool {
    match expires_at(token) {
        Some(at) => at < now,
        None => true,
    }
}

/// Client for the sign-in endpoint.
#[derive(Debug, Clone)]
pub struct AuthClient {
    pub signin_url: String,
    http: HttpClient,
}

impl AuthClient {
    pub fn for_domain(domain: &str) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("xpboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        Ok(Self {
            signin_url: format!("https://{}/api/auth/signin", domain.trim_end_matches('/')),
            http,
        })
    }

    /// Exchange a login (username or email) and password for a token.
    pub fn login(&self, identifier: &str, secret: &str) -> Result<Token> {
        debug!("POST {}", self.signin_url);
        let resp = self
            .http
            .post(&self.signin_url)
            .basic_auth(identifier, Some(secret))
            .send()
            .with_context(|| format!("POST {}", self.signin_url))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(DashboardError::InvalidCredentials.into());
        }
        if !status.is_success() {
            return Err(DashboardError::Http {
                status: status.as_u16(),
            }
            .into());
        }

        let body = resp.text().context("read signin response")?;
        let token = parse_signin_body(&body).ok_or(DashboardError::InvalidCredentials)?;
        info!("signed in as {identifier}");
        Ok(token)
    }
}

/// The endpoint answers with a JSON string; tolerate a bare token too.
fn parse_signin_body(body: &str) -> Option<Token> {
    let raw = match serde_json::from_str::<String>(body) {
        Ok(s) => s,
        Err(_) => body.trim().to_string(),
    };
    let token = Token::new(raw);
    (!token.as_str().is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt_with(payload: &str) -> Token {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.as_bytes());
        Token::new(format!("{header}.{body}.sig"))
    }

    #[test]
    fn expiry_is_read_from_payload() {
        let t = jwt_with(r#"{"sub":"1","exp":1700000000}"#);
        let at = expires_at(&t).unwrap();
        assert_eq!(at.timestamp(), 1_700_000_000);

        let before = DateTime::from_timestamp(1_699_999_999, 0).unwrap();
        let after = DateTime::from_timestamp(1_700_000_001, 0).unwrap();
        assert!(!is_expired(&t, before));
        assert!(is_expired(&t, after));
    }

    #[test]
    fn malformed_tokens_are_expired() {
        let now = Utc::now();
        assert!(is_expired(&Token::new("not-a-jwt"), now));
        assert!(is_expired(&Token::new("a.%%%.c"), now));
        assert!(is_expired(&jwt_with(r#"{"sub":"1"}"#), now));
        assert!(is_expired(&jwt_with("\"just a string\""), now));
    }

    #[test]
    fn session_store_round_trip() {
        let mut store = SessionStore::new();
        assert!(store.get_token().is_none());
        store.set_token(Token::new("abc"));
        assert_eq!(store.get_token().unwrap().as_str(), "abc");
        store.clear();
        assert!(store.get_token().is_none());
    }

    #[test]
    fn signin_body_accepts_json_string_or_bare() {
        assert_eq!(parse_signin_body("\"x.y.z\"").unwrap().as_str(), "x.y.z");
        assert_eq!(parse_signin_body("x.y.z\n").unwrap().as_str(), "x.y.z");
        assert!(parse_signin_body("  ").is_none());
    }

    #[test]
    fn debug_hides_secret() {
        let t = Token::new("secret.token.value");
        assert!(!format!("{t:?}").contains("secret"));
    }
}
