//! JWT access/refresh token issuance.

use authkit_common::TokenPair;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::auth::{generate_secure_token, TokenIssuer};
use crate::config::JwtSettings;
use crate::error::AppError;
use crate::storage::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Access => f.write_str("access"),
            TokenType::Refresh => f.write_str("refresh"),
        }
    }
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub token_type: TokenType,
    /// Expiry, unix seconds
    pub exp: u64,
    /// Issued at, unix seconds
    pub iat: u64,
    /// Unique token id
    pub jti: String,
    /// Id of the user the token was issued for
    pub user_id: String,
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("expected {expected} token, got {found}")]
    WrongType { expected: TokenType, found: TokenType },

    #[error("{token_type} token lifetime of {ttl}s overflows the expiry")]
    ExpiryOverflow { token_type: TokenType, ttl: u64 },
}

/// HS256 token issuer
pub struct JwtIssuer {
    secret: Zeroizing<String>,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
}

impl JwtIssuer {
    pub fn new(secret: String, access_ttl_secs: u64, refresh_ttl_secs: u64) -> Self {
        Self {
            secret: Zeroizing::new(secret),
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    /// Build from settings, generating a throwaway secret when none is configured
    pub fn from_settings(settings: &JwtSettings) -> Self {
        let secret = match &settings.secret {
            Some(secret) => secret.clone(),
            None => {
                warn!("no JWT secret configured; tokens will not survive a restart");
                generate_secure_token()
            },
        };
        Self::new(secret, settings.access_ttl_secs, settings.refresh_ttl_secs)
    }

    fn sign(&self, token_type: TokenType, user_id: &str, now: u64) -> Result<String, TokenError> {
        let ttl = match token_type {
            TokenType::Access => self.access_ttl_secs,
            TokenType::Refresh => self.refresh_ttl_secs,
        };
        let claims = Claims {
            token_type,
            exp: now
                .checked_add(ttl)
                .ok_or(TokenError::ExpiryOverflow { token_type, ttl })?,
            iat: now,
            jti: Uuid::new_v4().simple().to_string(),
            user_id: user_id.to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;
        Ok(token)
    }

    /// Validate signature, expiry and token type
    pub fn decode(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )?;
        if data.claims.token_type != expected {
            return Err(TokenError::WrongType {
                expected,
                found: data.claims.token_type,
            });
        }
        Ok(data.claims)
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue_for(&self, user: &User) -> Result<TokenPair, AppError> {
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
        let user_id = user.id.to_string();

        let access = self.sign(TokenType::Access, &user_id, now)?;
        let refresh = self.sign(TokenType::Refresh, &user_id, now)?;
        debug!(user_id = %user.id, "issued token pair");

        Ok(TokenPair { access, refresh })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::User;

    const SECRET: &str = "mY$uP3r$tr0nG_jWt_k3Y_f0r_unit_t3sts!@#";

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: String::new(),
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_decode() {
        let issuer = JwtIssuer::new(SECRET.to_string(), 300, 86_400);
        let user = user();
        let pair = issuer.issue_for(&user).unwrap();

        let access = issuer.decode(&pair.access, TokenType::Access).unwrap();
        assert_eq!(access.user_id, user.id.to_string());
        assert_eq!(access.exp - access.iat, 300);

        let refresh = issuer.decode(&pair.refresh, TokenType::Refresh).unwrap();
        assert_eq!(refresh.user_id, user.id.to_string());
        assert_eq!(refresh.exp - refresh.iat, 86_400);
        assert_ne!(access.jti, refresh.jti);
    }

    #[test]
    fn test_pairs_are_never_reused() {
        let issuer = JwtIssuer::new(SECRET.to_string(), 300, 86_400);
        let user = user();
        let first = issuer.issue_for(&user).unwrap();
        let second = issuer.issue_for(&user).unwrap();
        assert_ne!(first.access, second.access);
        assert_ne!(first.refresh, second.refresh);
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let issuer = JwtIssuer::new(SECRET.to_string(), 300, 86_400);
        let pair = issuer.issue_for(&user()).unwrap();
        let err = issuer.decode(&pair.refresh, TokenType::Access).unwrap_err();
        assert!(matches!(
            err,
            TokenError::WrongType {
                expected: TokenType::Access,
                found: TokenType::Refresh
            }
        ));
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let issuer = JwtIssuer::new(SECRET.to_string(), 300, 86_400);
        let other = JwtIssuer::new("another-secret-of-sufficient-length!!".to_string(), 300, 86_400);
        let pair = other.issue_for(&user()).unwrap();
        assert!(matches!(
            issuer.decode(&pair.access, TokenType::Access),
            Err(TokenError::Jwt(_))
        ));
        assert!(issuer.decode("invalid", TokenType::Access).is_err());
    }

    #[test]
    fn test_unbounded_lifetime_is_an_error() {
        let issuer = JwtIssuer::new(SECRET.to_string(), 300, u64::MAX);
        let err = issuer.issue_for(&user()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Token(TokenError::ExpiryOverflow {
                token_type: TokenType::Refresh,
                ttl: u64::MAX
            })
        ));
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_ephemeral_secret_when_unconfigured() {
        let issuer = JwtIssuer::from_settings(&JwtSettings::default());
        let pair = issuer.issue_for(&user()).unwrap();
        assert!(issuer.decode(&pair.access, TokenType::Access).is_ok());
    }
}
