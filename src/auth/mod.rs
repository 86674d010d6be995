use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(email: impl Into<String>, name: Option<String>, expiry_hours: u64) -> Result<Self, JwtError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(JwtError::InvalidExpiry(expiry_hours))?;

        Ok(Self {
            email: email.into(),
            name,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        })
    }
}

/// Authenticated identity of the caller
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.email,
            name: claims.name,
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("token expiry of {0} hours is out of range")]
    InvalidExpiry(u64),
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    Ok(encode(&Header::default(), claims, &encoding_key)?)
}

/// Verifies HS256 session tokens carried by a request.
///
/// The token is read from `Authorization: Bearer` first, then from the
/// session cookie. Any failure yields `None`; the reason is only logged.
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    session_cookie: String,
}

impl TokenVerifier {
    pub fn new(secret: &str, session_cookie: impl Into<String>) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
            session_cookie: session_cookie.into(),
        })
    }

    pub fn verify(&self, headers: &HeaderMap) -> Option<Principal> {
        let token = match self.extract_token(headers) {
            Ok(token) => token,
            Err(reason) => {
                debug!("No session token: {}", reason);
                return None;
            }
        };
        self.verify_token(&token)
    }

    pub fn verify_token(&self, token: &str) -> Option<Principal> {
        let claims = match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                debug!("Rejected session token: {}", e);
                return None;
            }
        };

        if claims.email.trim().is_empty() {
            debug!("Rejected session token: empty email claim");
            return None;
        }

        Some(claims.into())
    }

    fn extract_token(&self, headers: &HeaderMap) -> Result<String, &'static str> {
        if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
            let auth_str = auth_header
                .to_str()
                .map_err(|_| "invalid Authorization header format")?;
            let token = auth_str
                .strip_prefix("Bearer ")
                .ok_or("Authorization header must use Bearer token format")?
                .trim();
            if token.is_empty() {
                return Err("empty bearer token");
            }
            return Ok(token.to_string());
        }

        self.session_cookie_value(headers)
            .ok_or("no Authorization header or session cookie")
    }

    fn session_cookie_value(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, value)| *name == self.session_cookie && !value.is_empty())
            .map(|(_, value)| value.to_string())
    }
}
