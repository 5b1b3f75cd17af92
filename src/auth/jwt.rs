use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use model::entities::user;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::claims::{AccessClaims, RefreshClaims, TOKEN_USE_ACCESS, TOKEN_USE_REFRESH};
use crate::config::AuthConfig;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token is invalid")]
    Invalid,
    #[error("wrong token type for this operation")]
    WrongTokenUse,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        }
    }
}

/// Issue an access token for a user. HS256, claims-only.
pub fn create_access_token(user: &user::Model, config: &AuthConfig) -> Result<String, TokenError> {
    let now = Utc::now();
    let claims = AccessClaims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role,
        token_use: TOKEN_USE_ACCESS.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::minutes(config.access_lifetime_minutes)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(TokenError::from)
}

/// Issue a refresh token. Returns the encoded token together with its jti
/// and expiry so the rotation path can record a revocation later.
pub fn create_refresh_token(
    user: &user::Model,
    config: &AuthConfig,
) -> Result<(String, RefreshClaims), TokenError> {
    let now = Utc::now();
    let claims = RefreshClaims {
        sub: user.id,
        jti: Uuid::new_v4().to_string(),
        token_use: TOKEN_USE_REFRESH.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::days(config.refresh_lifetime_days)).timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;

    Ok((token, claims))
}

/// Decode and validate an access token.
pub fn verify_access_token(token: &str, config: &AuthConfig) -> Result<AccessClaims, TokenError> {
    let data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;

    if data.claims.token_use != TOKEN_USE_ACCESS {
        return Err(TokenError::WrongTokenUse);
    }
    Ok(data.claims)
}

/// Decode and validate a refresh token.
pub fn verify_refresh_token(token: &str, config: &AuthConfig) -> Result<RefreshClaims, TokenError> {
    let data = decode::<RefreshClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;

    if data.claims.token_use != TOKEN_USE_REFRESH {
        return Err(TokenError::WrongTokenUse);
    }
    Ok(data.claims)
}

/// Minimal claim set for the verify endpoint, which accepts either token
/// kind and only needs to know whether a refresh jti has to be checked
/// against the blacklist.
#[derive(Debug, Deserialize)]
pub struct AnyClaims {
    #[allow(dead_code)]
    pub sub: i32,
    pub jti: Option<String>,
    pub token_use: Option<String>,
    #[allow(dead_code)]
    pub exp: i64,
}

/// Decode any signed, unexpired token issued by this service.
pub fn verify_any_token(token: &str, config: &AuthConfig) -> Result<AnyClaims, TokenError> {
    let data = decode::<AnyClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}
