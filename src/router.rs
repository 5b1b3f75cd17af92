use crate::handlers::{
    auth::{login, refresh_token, verify_token},
    categories::{get_categories, get_category},
    courses::{
        create_course, delete_course, get_course, get_courses, publish_course, update_course,
    },
    health::health_check,
    lessons::{create_lesson, delete_lesson, get_lesson, get_lessons, update_lesson},
    users::register,
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Authentication
        .route("/api/login", post(login))
        .route("/api/token/refresh", post(refresh_token))
        .route("/api/token/verify", post(verify_token))
        // Registration
        .route("/api/users/register", post(register))
        // Course CRUD routes
        .route("/api/courses", post(create_course))
        .route("/api/courses", get(get_courses))
        .route("/api/courses/:course_id", get(get_course))
        .route("/api/courses/:course_id", put(update_course))
        .route("/api/courses/:course_id", patch(update_course))
        .route("/api/courses/:course_id", delete(delete_course))
        .route("/api/courses/:course_id/publish", patch(publish_course))
        // Lessons are only reachable through their course
        .route("/api/courses/:course_id/lessons", post(create_lesson))
        .route("/api/courses/:course_id/lessons", get(get_lessons))
        .route("/api/courses/:course_id/lessons/:lesson_id", get(get_lesson))
        .route("/api/courses/:course_id/lessons/:lesson_id", put(update_lesson))
        .route("/api/courses/:course_id/lessons/:lesson_id", patch(update_lesson))
        .route("/api/courses/:course_id/lessons/:lesson_id", delete(delete_lesson))
        // Category routes (admin read only)
        .route("/api/categories", get(get_categories))
        .route("/api/categories/:category_id", get(get_category))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
