use axum::{
    extract::State,
    http::StatusCode,
    response::{Json, Response},
};
use chrono::{DateTime, Utc};
use model::entities::{revoked_token, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

use super::error_response;
use crate::auth::claims::TOKEN_USE_REFRESH;
use crate::auth::jwt;
use crate::auth::password::verify_password;
use crate::schemas::{AppState, ErrorResponse, is_unique_violation};

/// Credentials for obtaining a token pair
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Access + refresh token pair
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

/// Body for refresh-token rotation
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Body for token verification
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct VerifyRequest {
    pub token: String,
}

fn invalid_credentials() -> Response {
    error_response(
        StatusCode::UNAUTHORIZED,
        "No active account found with the given credentials",
        "INVALID_CREDENTIALS",
    )
}

fn invalid_token() -> Response {
    error_response(
        StatusCode::UNAUTHORIZED,
        "Token is invalid or expired",
        "INVALID_TOKEN",
    )
}

/// Log in with email and password, receiving an access/refresh pair
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = TokenPairResponse),
        (status = 401, description = "Unknown email, wrong password or inactive account", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenPairResponse>, Response> {
    debug!("Login attempt for email: {}", request.email);

    let user_model = match user::Entity::find_by_email(&request.email).one(&state.db).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!("Login failed: unknown email {}", request.email);
            return Err(invalid_credentials());
        }
        Err(db_error) => {
            error!("Login lookup failed: {}", db_error);
            return Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error during login",
                "DATABASE_ERROR",
            ));
        }
    };

    // Inactive accounts cannot authenticate; same response as a bad
    // password so the account state is not disclosed
    if !user_model.is_active || !verify_password(&user_model.password_hash, &request.password) {
        warn!("Login failed for email {}", request.email);
        return Err(invalid_credentials());
    }

    if !user_model.flags_consistent() {
        warn!(
            "User {} has staff/superuser flags inconsistent with role",
            user_model.id
        );
    }

    let access = jwt::create_access_token(&user_model, &state.auth)
        .map_err(|e| token_issue_error("access", e))?;
    let (refresh, _claims) = jwt::create_refresh_token(&user_model, &state.auth)
        .map_err(|e| token_issue_error("refresh", e))?;

    info!("User {} logged in", user_model.id);
    Ok(Json(TokenPairResponse { access, refresh }))
}

fn token_issue_error(kind: &str, err: jwt::TokenError) -> Response {
    error!("Failed to issue {} token: {}", kind, err);
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error during token issuing",
        "TOKEN_ERROR",
    )
}

/// Rotate a refresh token: revoke the presented one, return a fresh pair.
///
/// Revocation and issuance happen in one transaction, with the unique jti
/// column rejecting a replay of a just-rotated token.
#[utoipa::path(
    post,
    path = "/api/token/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair issued", body = TokenPairResponse),
        (status = 401, description = "Refresh token invalid, expired or already used", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenPairResponse>, Response> {
    let claims = jwt::verify_refresh_token(&request.refresh, &state.auth).map_err(|err| {
        debug!("Refresh rejected: {}", err);
        invalid_token()
    })?;

    let txn = state.db.begin().await.map_err(|db_error| {
        error!("Failed to open transaction: {}", db_error);
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error during token refresh",
            "DATABASE_ERROR",
        )
    })?;

    // Revoke first. A second use of the same token races into the unique
    // jti constraint and is turned away before any new pair exists.
    let revocation = revoked_token::ActiveModel {
        jti: Set(claims.jti.clone()),
        user_id: Set(claims.sub),
        expires_at: Set(DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now)),
        revoked_at: Set(Utc::now()),
        ..Default::default()
    };
    if let Err(db_error) = revocation.insert(&txn).await {
        let _ = txn.rollback().await;
        if is_unique_violation(&db_error) {
            warn!("Replay of rotated refresh token for user {}", claims.sub);
            return Err(invalid_token());
        }
        error!("Failed to record token revocation: {}", db_error);
        return Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error during token refresh",
            "DATABASE_ERROR",
        ));
    }

    let user_model = match user::Entity::find_by_id(claims.sub).one(&txn).await {
        Ok(Some(u)) if u.is_active => u,
        Ok(_) => {
            let _ = txn.rollback().await;
            warn!("Refresh rejected: user {} missing or inactive", claims.sub);
            return Err(invalid_token());
        }
        Err(db_error) => {
            let _ = txn.rollback().await;
            error!("Refresh user lookup failed: {}", db_error);
            return Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error during token refresh",
                "DATABASE_ERROR",
            ));
        }
    };

    let access = jwt::create_access_token(&user_model, &state.auth)
        .map_err(|e| token_issue_error("access", e))?;
    let (refresh, _claims) = jwt::create_refresh_token(&user_model, &state.auth)
        .map_err(|e| token_issue_error("refresh", e))?;

    txn.commit().await.map_err(|db_error| {
        error!("Failed to commit token rotation: {}", db_error);
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error during token refresh",
            "DATABASE_ERROR",
        )
    })?;

    info!("Rotated refresh token for user {}", user_model.id);
    Ok(Json(TokenPairResponse { access, refresh }))
}

/// Check whether a token is currently valid
#[utoipa::path(
    post,
    path = "/api/token/verify",
    tag = "auth",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Token is valid"),
        (status = 401, description = "Token is invalid, expired or revoked", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn verify_token(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Result<StatusCode, Response> {
    let claims = jwt::verify_any_token(&request.token, &state.auth).map_err(|err| {
        debug!("Verify rejected: {}", err);
        invalid_token()
    })?;

    // A rotated refresh token is signed and unexpired but no longer valid
    if claims.token_use.as_deref() == Some(TOKEN_USE_REFRESH) {
        if let Some(jti) = claims.jti {
            let revoked = revoked_token::Entity::find()
                .filter(revoked_token::Column::Jti.eq(jti))
                .one(&state.db)
                .await
                .map_err(|db_error| {
                    error!("Blacklist lookup failed: {}", db_error);
                    error_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error during token verification",
                        "DATABASE_ERROR",
                    )
                })?;
            if revoked.is_some() {
                return Err(invalid_token());
            }
        }
    }

    Ok(StatusCode::OK)
}
