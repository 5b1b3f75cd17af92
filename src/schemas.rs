use std::collections::BTreeMap;

use sea_orm::{DatabaseConnection, DbErr, RuntimeErr};
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use crate::config::AuthConfig;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// JWT signing configuration
    pub auth: AuthConfig,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            success: false,
        }
    }
}

/// Field-scoped validation errors, keyed by field name
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ValidationErrorResponse {
    /// Messages per offending field
    pub errors: BTreeMap<String, Vec<String>>,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

impl ValidationErrorResponse {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            errors: BTreeMap::new(),
            code: code.into(),
            success: false,
        }
    }

    pub fn with_field(field: &str, message: impl Into<String>) -> Self {
        let mut response = Self::new("VALIDATION_ERROR");
        response.add(field, message);
        response
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// Whether a database error is a unique-constraint violation. SeaORM does
/// not expose the violated constraint uniformly across backends, so this
/// falls back to message inspection like the rest of the handler layer.
pub fn is_unique_violation(err: &DbErr) -> bool {
    let message = match err {
        DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e)) => {
            e.to_string()
        }
        other => other.to_string(),
    };
    let message = message.to_lowercase();
    message.contains("unique") || message.contains("duplicate")
}

/// Registers the `bearer_auth` scheme the protected paths reference, so
/// Swagger UI's Authorize flow can attach access tokens.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::login,
        crate::handlers::auth::refresh_token,
        crate::handlers::auth::verify_token,
        crate::handlers::users::register,
        crate::handlers::courses::create_course,
        crate::handlers::courses::get_courses,
        crate::handlers::courses::get_course,
        crate::handlers::courses::update_course,
        crate::handlers::courses::delete_course,
        crate::handlers::courses::publish_course,
        crate::handlers::categories::get_categories,
        crate::handlers::categories::get_category,
        crate::handlers::lessons::create_lesson,
        crate::handlers::lessons::get_lessons,
        crate::handlers::lessons::get_lesson,
        crate::handlers::lessons::update_lesson,
        crate::handlers::lessons::delete_lesson,
    ),
    components(
        schemas(
            ApiResponse<crate::handlers::users::RegisteredUserResponse>,
            ApiResponse<crate::handlers::courses::CourseResponse>,
            ApiResponse<Vec<crate::handlers::courses::CourseResponse>>,
            ApiResponse<crate::handlers::categories::CategoryResponse>,
            ApiResponse<Vec<crate::handlers::categories::CategoryResponse>>,
            ApiResponse<crate::handlers::lessons::LessonResponse>,
            ApiResponse<Vec<crate::handlers::lessons::LessonResponse>>,
            ApiResponse<String>,
            crate::handlers::users::RegisteredUserResponse,
            ErrorResponse,
            ValidationErrorResponse,
            HealthResponse,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::TokenPairResponse,
            crate::handlers::auth::RefreshRequest,
            crate::handlers::auth::VerifyRequest,
            crate::handlers::users::RegisterRequest,
            crate::handlers::courses::CreateCourseRequest,
            crate::handlers::courses::UpdateCourseRequest,
            crate::handlers::courses::CourseResponse,
            crate::handlers::categories::CategoryResponse,
            crate::handlers::lessons::CreateLessonRequest,
            crate::handlers::lessons::UpdateLessonRequest,
            crate::handlers::lessons::LessonResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Login, token refresh and verification"),
        (name = "users", description = "User registration"),
        (name = "courses", description = "Course catalog CRUD and publishing"),
        (name = "categories", description = "Category read-only endpoints"),
        (name = "lessons", description = "Lessons nested under courses"),
    ),
    info(
        title = "CourseHub API",
        description = "Online course platform backend - courses, lessons and role-based access",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::ApiDoc;
    use utoipa::OpenApi;

    #[test]
    fn openapi_document_defines_the_bearer_scheme() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();

        let scheme = &doc["components"]["securitySchemes"]["bearer_auth"];
        assert_eq!(scheme["type"], "http");
        assert_eq!(scheme["scheme"], "bearer");

        // A protected path must reference the registered scheme
        let requirement = &doc["paths"]["/api/courses"]["post"]["security"][0]["bearer_auth"];
        assert!(requirement.is_array());
    }
}
