use model::entities::user::UserRole;
use serde::{Deserialize, Serialize};

/// Claims carried by a short-lived access token.
///
/// Everything the authorization policy needs (identity and role) travels in
/// the token, so request handling stays stateless.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User id
    pub sub: i32,
    pub email: String,
    pub role: UserRole,
    /// Always "access"; rejects refresh tokens handed to API endpoints
    pub token_use: String,
    /// Issued-at, seconds since epoch
    pub iat: i64,
    /// Expiry, seconds since epoch
    pub exp: i64,
}

/// Claims carried by a refresh token. The `jti` is what the rotation
/// blacklist records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// User id
    pub sub: i32,
    /// Unique token id, revoked on rotation
    pub jti: String,
    /// Always "refresh"
    pub token_use: String,
    pub iat: i64,
    pub exp: i64,
}

pub const TOKEN_USE_ACCESS: &str = "access";
pub const TOKEN_USE_REFRESH: &str = "refresh";
