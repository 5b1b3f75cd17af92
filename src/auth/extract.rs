use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::Json,
};
use model::entities::user::UserRole;
use tracing::debug;

use crate::auth::jwt;
use crate::schemas::{AppState, ErrorResponse};

/// The authenticated actor behind a request, reconstructed from the access
/// token alone. No database round trip: identity and role are claims.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i32,
    pub email: String,
    pub role: UserRole,
}

fn unauthorized(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new(message, "AUTHENTICATION_REQUIRED")),
    )
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("Missing Authorization header"))?;

        let token = header_value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| unauthorized("Authorization header must be a Bearer token"))?;

        let claims = jwt::verify_access_token(token, &state.auth).map_err(|err| {
            debug!("Rejected access token: {}", err);
            match err {
                jwt::TokenError::Expired => unauthorized("Access token has expired"),
                _ => unauthorized("Invalid access token"),
            }
        })?;

        Ok(CurrentUser {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}
