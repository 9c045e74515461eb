// src/services/token_services.rs
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use uuid::Uuid;

use crate::config::TokenSettings;
use crate::models::token::{ACCESS, BlacklistedToken, JwtClaims, REFRESH};
use crate::repositories::{RepoError, TokenRepository};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token is invalid or expired")]
    Invalid,
    #[error("Token has wrong type")]
    WrongType,
    #[error("Token is blacklisted")]
    Blacklisted,
    #[error("token encoding: {0}")]
    Encode(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

/// Issues, validates and revokes the HS256 tokens handed to clients.
/// Revocation applies to refresh tokens only; access tokens simply expire.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    rotate_refresh: bool,
    blacklist: Arc<dyn TokenRepository>,
}

impl TokenService {
    pub fn new(settings: &TokenSettings, blacklist: Arc<dyn TokenRepository>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding: DecodingKey::from_secret(settings.secret.as_bytes()),
            access_ttl: settings.access_ttl,
            refresh_ttl: settings.refresh_ttl,
            rotate_refresh: settings.rotate_refresh,
            blacklist,
        }
    }

    pub fn rotates_refresh_tokens(&self) -> bool {
        self.rotate_refresh
    }

    pub fn issue_pair(&self, user_id: i64) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            refresh: self.sign(REFRESH, user_id, self.refresh_ttl)?,
            access: self.sign(ACCESS, user_id, self.access_ttl)?,
        })
    }

    pub fn issue_access(&self, user_id: i64) -> Result<String, TokenError> {
        self.sign(ACCESS, user_id, self.access_ttl)
    }

    pub fn validate_access(&self, token: &str) -> Result<JwtClaims, TokenError> {
        self.decode_typed(token, ACCESS)
    }

    /// Signature, expiry, type and blacklist checks.
    pub async fn validate_refresh(&self, token: &str) -> Result<JwtClaims, TokenError> {
        let claims = self.decode_typed(token, REFRESH)?;
        if self.blacklist.is_blacklisted(claims.jti).await? {
            return Err(TokenError::Blacklisted);
        }
        Ok(claims)
    }

    /// Blacklists a refresh token so it can no longer mint access tokens.
    pub async fn revoke(&self, token: &str) -> Result<JwtClaims, TokenError> {
        let claims = self.validate_refresh(token).await?;
        self.revoke_claims(&claims).await?;
        Ok(claims)
    }

    pub async fn revoke_claims(&self, claims: &JwtClaims) -> Result<(), TokenError> {
        let record = BlacklistedToken {
            jti: claims.jti,
            user_id: claims.user_id,
            expires_at: timestamp(claims.exp),
            blacklisted_at: Utc::now(),
        };
        match self.blacklist.blacklist(record).await {
            Ok(()) => Ok(()),
            // lost a race with a concurrent logout of the same token
            Err(RepoError::Conflict(_)) => Err(TokenError::Blacklisted),
            Err(e) => Err(e.into()),
        }
    }

    fn sign(&self, token_type: &str, user_id: i64, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = JwtClaims {
            token_type: token_type.to_string(),
            user_id,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    fn decode_typed(&self, token: &str, expected: &str) -> Result<JwtClaims, TokenError> {
        let data = decode::<JwtClaims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|_| TokenError::Invalid)?;
        if data.claims.token_type != expected {
            return Err(TokenError::WrongType);
        }
        Ok(data.claims)
    }
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_else(Utc::now)
}
