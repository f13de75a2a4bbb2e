//! Password hashing and bearer token handling.

use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, web};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash as ParsedHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::types::{PasswordHash, UserId};
use crate::services::errors::ServiceError;

/// Failures of the credential helpers.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("token encoding failed: {0}")]
    Encode(String),
}

/// Hash a raw password with Argon2id and a random salt.
pub fn hash_password(password: &str) -> Result<PasswordHash, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    PasswordHash::new(hash.to_string()).map_err(|e| AuthError::Hash(e.to_string()))
}

/// Check `password` against a stored hash. A malformed hash never verifies.
pub fn verify_password(password: &str, hash: &PasswordHash) -> bool {
    match ParsedHash::new(hash.as_str()) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::warn!("Stored password hash is malformed: {e}");
            false
        }
    }
}

/// Access token payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User id as a decimal string.
    pub sub: String,
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Option<UserId> {
        self.sub.parse::<i32>().ok().and_then(|id| UserId::new(id).ok())
    }
}

/// HS256 keys and lifetime used to issue and verify access tokens.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, expire_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
            lifetime: Duration::minutes(expire_minutes),
        }
    }

    /// Issue a token for `user_id` valid for the configured lifetime.
    pub fn issue(&self, user_id: UserId, is_admin: bool) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            is_admin,
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::Encode(e.to_string()))
    }

    /// Decode and validate a token, including its expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

/// Optional `Authorization: Bearer <token>` credential of a request.
///
/// A missing header yields `BearerToken(None)`. A header that is present but
/// malformed, expired or wrongly signed rejects the request with 401.
#[derive(Debug, Clone)]
pub struct BearerToken(pub Option<Claims>);

fn credentials_error() -> ServiceError {
    ServiceError::Unauthenticated("Could not validate credentials".to_string())
}

impl FromRequest for BearerToken {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let Some(value) = req.headers().get(header::AUTHORIZATION) else {
            return ready(Ok(Self(None)));
        };

        let Some(keys) = req.app_data::<web::Data<TokenKeys>>() else {
            log::error!("Token keys are not registered as application data");
            return ready(Err(ServiceError::Internal));
        };

        let token = value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let result = match token {
            Some(token) => keys.verify(token).map(|claims| Self(Some(claims))).map_err(|e| {
                log::debug!("Rejected bearer token: {e}");
                credentials_error()
            }),
            None => Err(credentials_error()),
        };
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_and_verifies_passwords() {
        let hash = hash_password("correct horse").unwrap();
        assert_ne!(hash.as_str(), "correct horse");
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("battery staple", &hash));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        let hash = PasswordHash::new("not-a-phc-string").unwrap();
        assert!(!verify_password("anything", &hash));
    }

    #[test]
    fn issued_token_verifies() {
        let keys = TokenKeys::new("secret", 30);
        let token = keys.issue(UserId::new(7).unwrap(), true).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.user_id(), Some(UserId::new(7).unwrap()));
        assert!(claims.is_admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn rejects_foreign_and_expired_tokens() {
        let keys = TokenKeys::new("secret", 30);
        let other = TokenKeys::new("other-secret", 30);
        let token = other.issue(UserId::new(1).unwrap(), false).unwrap();
        assert!(keys.verify(&token).is_err());

        let expired = TokenKeys::new("secret", -5)
            .issue(UserId::new(1).unwrap(), false)
            .unwrap();
        assert!(keys.verify(&expired).is_err());
    }
}
