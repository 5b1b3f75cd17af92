use axum::{
    extract::State,
    http::StatusCode,
    response::{Json, Response},
};
use chrono::Utc;
use model::entities::user::{self, UserRole};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use super::{error_response, validation_response};
use crate::auth::password::{hash_password, is_valid_phone_number, validate_password_strength};
use crate::schemas::{ApiResponse, AppState, ErrorResponse, ValidationErrorResponse, is_unique_violation};

/// Request body for the public registration endpoint
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 3, max = 150, message = "Username must be 3 to 150 characters."))]
    pub username: String,
    pub password: String,
    /// Confirmation; must match `password`
    pub password2: String,
    /// student | teacher; admin accounts cannot self-register
    #[schema(value_type = Option<String>, example = "student")]
    pub role: Option<UserRole>,
    pub phone_number: Option<String>,
}

/// Public view of a registered user. Never carries the password or hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisteredUserResponse {
    pub id: i32,
    pub email: String,
    pub username: String,
    #[schema(value_type = String)]
    pub role: UserRole,
}

/// Register a new user account
#[utoipa::path(
    post,
    path = "/api/users/register",
    tag = "users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = ApiResponse<RegisteredUserResponse>),
        (status = 400, description = "Validation failed", body = ValidationErrorResponse),
        (status = 409, description = "Email, username or phone already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisteredUserResponse>>), Response> {
    debug!("Registration attempt for email: {}", request.email);

    let mut errors = ValidationErrorResponse::new("VALIDATION_ERROR");

    if let Err(field_errors) = request.validate() {
        for (field, messages) in field_errors.field_errors() {
            for message in messages {
                let text = message
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {field}."));
                errors.add(field, text);
            }
        }
    }

    if request.password != request.password2 {
        errors.add("password", "Passwords do not match.");
    }
    for message in
        validate_password_strength(&request.password, &request.email, &request.username)
    {
        errors.add("password", message);
    }

    if let Some(phone) = request.phone_number.as_deref() {
        if !is_valid_phone_number(phone) {
            errors.add(
                "phone_number",
                "Phone number must be in the format: '+8801234567890'. Up to 15 digits allowed.",
            );
        }
    }

    // Only the superuser bootstrap path may mint admins
    let role = request.role.unwrap_or(UserRole::Student);
    if role == UserRole::Admin {
        errors.add("role", "Cannot self-register as admin.");
    }

    // Pre-check uniqueness for friendlier field errors; the DB constraints
    // still back this up under races.
    match user::Entity::find()
        .filter(user::Column::Email.eq(request.email.as_str()))
        .one(&state.db)
        .await
    {
        Ok(Some(_)) => errors.add("email", "Email is already registered."),
        Ok(None) => {}
        Err(db_error) => {
            error!("Registration lookup failed: {}", db_error);
            return Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error during registration",
                "DATABASE_ERROR",
            ));
        }
    }
    match user::Entity::find()
        .filter(user::Column::Username.eq(request.username.as_str()))
        .one(&state.db)
        .await
    {
        Ok(Some(_)) => errors.add("username", "Username is already taken."),
        Ok(None) => {}
        Err(db_error) => {
            error!("Registration lookup failed: {}", db_error);
            return Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error during registration",
                "DATABASE_ERROR",
            ));
        }
    }

    if !errors.is_empty() {
        warn!(
            "Registration rejected for {}: {:?}",
            request.email,
            errors.errors.keys()
        );
        return Err(validation_response(errors));
    }

    let password_hash = hash_password(&request.password).map_err(|e| {
        error!("Password hashing failed: {}", e);
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error during registration",
            "HASHING_ERROR",
        )
    })?;

    let new_user = user::ActiveModel {
        email: Set(request.email.clone()),
        username: Set(request.username.clone()),
        role: Set(role),
        phone_number: Set(request.phone_number.clone()),
        password_hash: Set(password_hash),
        is_active: Set(true),
        is_staff: Set(false),
        is_superuser: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    match new_user.insert(&state.db).await {
        Ok(user_model) => {
            info!(
                "User registered with ID: {}, email: {}",
                user_model.id, user_model.email
            );
            let response = ApiResponse {
                data: RegisteredUserResponse {
                    id: user_model.id,
                    email: user_model.email,
                    username: user_model.username,
                    role: user_model.role,
                },
                message: "User registered successfully.".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to register user '{}': {}", request.email, db_error);
            if is_unique_violation(&db_error) {
                Err(error_response(
                    StatusCode::CONFLICT,
                    "Email, username or phone number is already registered",
                    "USER_ALREADY_EXISTS",
                ))
            } else {
                Err(error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error during registration",
                    "DATABASE_ERROR",
                ))
            }
        }
    }
}
