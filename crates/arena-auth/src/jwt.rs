//! JWT (JSON Web Token) handling

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token type accepted by the API middleware
pub const SESSION_TOKEN_TYPE: &str = "session";

/// JWT claims for an authenticated arena principal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    /// Subject (principal id issued by the identity provider)
    pub sub: String,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Custom: principal given name
    #[serde(default)]
    pub first_name: String,
    /// Custom: principal family name
    #[serde(default)]
    pub last_name: String,
    /// Custom: token type ("session" for API access)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl SessionClaims {
    pub fn new(user_id: String, issuer: String, audience: String, validity: Duration) -> Self {
        let now = Utc::now();
        let exp = now + validity;

        Self {
            sub: user_id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: issuer,
            aud: audience,
            first_name: String::new(),
            last_name: String::new(),
            token_type: None,
        }
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    /// Mark this token as an API session token
    pub fn session(mut self) -> Self {
        self.token_type = Some(SESSION_TOKEN_TYPE.to_string());
        self
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    pub fn is_session(&self) -> bool {
        self.token_type.as_deref() == Some(SESSION_TOKEN_TYPE)
    }

    pub fn exp_formatted(&self) -> String {
        use chrono::{DateTime, Local};
        let dt = DateTime::<Utc>::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now);
        let local: DateTime<Local> = dt.into();
        local.format("%Y-%m-%d %H:%M:%S %Z").to_string()
    }
}

/// JWT errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT encoding error: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,
}

/// JWT validator
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    /// Create a new JWT validator using HMAC-SHA256 (symmetric secret)
    ///
    /// Validates signature and expiration only. Issuer and audience are
    /// checked when configured with [`with_issuer`](Self::with_issuer) and
    /// [`with_audience`](Self::with_audience).
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.validate_nbf = false;

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn with_audience(mut self, audience: String) -> Self {
        self.validation.set_audience(&[audience]);
        self
    }

    pub fn with_issuer(mut self, issuer: String) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }

    pub fn validate(&self, token: &str) -> Result<SessionClaims, JwtError> {
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)?;

        if token_data.claims.is_expired() {
            return Err(JwtError::TokenExpired);
        }

        if token_data.claims.sub.trim().is_empty() {
            return Err(JwtError::InvalidToken);
        }

        Ok(token_data.claims)
    }

    /// Encode JWT using HMAC-SHA256 (symmetric secret)
    pub fn encode(secret: &[u8], claims: &SessionClaims) -> Result<String, JwtError> {
        let header = Header::new(Algorithm::HS256);
        let encoding_key = EncodingKey::from_secret(secret);

        Ok(encode(&header, claims, &encoding_key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &[u8] = b"test_secret_key_1234567890";

    #[test]
    fn test_jwt_encode_decode() {
        let claims = SessionClaims::new(
            "user-123".to_string(),
            "test-issuer".to_string(),
            "test-audience".to_string(),
            Duration::hours(1),
        )
        .with_name("Ada", "Lovelace")
        .session();

        let token = JwtValidator::encode(TEST_SECRET, &claims).unwrap();

        let validator = JwtValidator::new(TEST_SECRET)
            .with_issuer("test-issuer".to_string())
            .with_audience("test-audience".to_string());

        let decoded = validator.validate(&token).unwrap();

        assert_eq!(decoded.sub, "user-123");
        assert_eq!(decoded.first_name, "Ada");
        assert_eq!(decoded.last_name, "Lovelace");
        assert!(decoded.is_session());
    }

    #[test]
    fn test_expired_token() {
        let claims = SessionClaims::new(
            "user-789".to_string(),
            "issuer".to_string(),
            "audience".to_string(),
            Duration::seconds(-120), // Already expired, beyond default leeway
        );

        assert!(claims.is_expired());

        let token = JwtValidator::encode(TEST_SECRET, &claims).unwrap();

        let validator = JwtValidator::new(TEST_SECRET);
        assert!(validator.validate(&token).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let claims = SessionClaims::new(
            "user-1".to_string(),
            "issuer".to_string(),
            "audience".to_string(),
            Duration::hours(1),
        );
        let token = JwtValidator::encode(b"another-secret", &claims).unwrap();

        let validator = JwtValidator::new(TEST_SECRET);
        assert!(validator.validate(&token).is_err());
    }

    #[test]
    fn test_blank_subject_rejected() {
        let claims = SessionClaims::new(
            "   ".to_string(),
            "issuer".to_string(),
            "audience".to_string(),
            Duration::hours(1),
        )
        .session();
        let token = JwtValidator::encode(TEST_SECRET, &claims).unwrap();

        let validator = JwtValidator::new(TEST_SECRET);
        assert!(matches!(
            validator.validate(&token),
            Err(JwtError::InvalidToken)
        ));
    }

    #[test]
    fn test_token_without_type_is_not_session() {
        let claims = SessionClaims::new(
            "user-1".to_string(),
            "issuer".to_string(),
            "audience".to_string(),
            Duration::hours(1),
        );
        assert!(!claims.is_session());
        assert!(claims.clone().session().is_session());
    }
}
