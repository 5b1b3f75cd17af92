use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Json, Response},
};
use chrono::Utc;
use model::entities::course::{self, CourseLevel, CourseType, validate_pricing};
use model::entities::{category, user};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::{IntoParams, ToSchema};

use super::{error_response, policy_response, validation_response};
use crate::auth::CurrentUser;
use crate::policy::{Action, authorize_course};
use crate::schemas::{ApiResponse, AppState, ErrorResponse, ValidationErrorResponse, is_unique_violation};

/// Request structure for creating a new course
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: String,
    /// Price as a decimal string; must agree with `type`
    #[schema(value_type = String, example = "0.00")]
    pub price: Option<Decimal>,
    /// beginner | intermediate | advanced
    #[schema(value_type = String, example = "beginner")]
    pub level: Option<CourseLevel>,
    /// free | paid
    #[serde(rename = "type")]
    #[schema(value_type = String, example = "free")]
    pub course_type: Option<CourseType>,
    /// Ordered list of tags
    pub tags: Option<Vec<String>>,
    pub prerequisites: Option<String>,
    pub syllabus: Option<String>,
    /// Approximate total duration in hours
    pub duration: Option<i32>,
    /// Owning category; delete-protected reference
    pub category: i32,
    /// Instructing teacher; defaults to the acting teacher
    pub instructor: Option<i32>,
}

/// Request structure for updating an existing course; all fields optional
#[derive(Debug, Deserialize, Serialize, Default, ToSchema)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = String)]
    pub price: Option<Decimal>,
    #[schema(value_type = String)]
    pub level: Option<CourseLevel>,
    #[serde(rename = "type")]
    #[schema(value_type = String)]
    pub course_type: Option<CourseType>,
    pub tags: Option<Vec<String>>,
    pub prerequisites: Option<String>,
    pub syllabus: Option<String>,
    pub duration: Option<i32>,
    pub category: Option<i32>,
}

/// Response structure for course operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CourseResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    #[schema(value_type = String)]
    pub level: CourseLevel,
    #[serde(rename = "type")]
    #[schema(value_type = String)]
    pub course_type: CourseType,
    pub tags: Vec<String>,
    pub prerequisites: Option<String>,
    pub syllabus: Option<String>,
    pub duration: i32,
    pub is_active: bool,
    pub category: i32,
    pub instructor: i32,
}

impl From<course::Model> for CourseResponse {
    fn from(model: course::Model) -> Self {
        let tags = model.tag_list();
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            price: model.price,
            level: model.level,
            course_type: model.course_type,
            tags,
            prerequisites: model.prerequisites,
            syllabus: model.syllabus,
            duration: model.duration,
            is_active: model.is_active,
            category: model.category_id,
            instructor: model.instructor_id,
        }
    }
}

/// Query parameters for listing courses
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListCoursesQuery {
    /// Also return unpublished courses (default false)
    pub include_inactive: Option<bool>,
}

/// Validate the submitted (type, price) pair. Runs on every write path
/// before any persistence attempt.
fn check_pricing(
    course_type: CourseType,
    price: Decimal,
    errors: &mut ValidationErrorResponse,
) {
    if price < Decimal::ZERO {
        errors.add("price", "Price must not be negative.");
        return;
    }
    if let Err(message) = validate_pricing(course_type, price) {
        errors.add("price", message);
    }
}

async fn check_category_exists(
    state: &AppState,
    category_id: i32,
    errors: &mut ValidationErrorResponse,
) -> Result<(), Response> {
    match category::Entity::find_by_id(category_id).one(&state.db).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => {
            errors.add("category", format!("Category {category_id} does not exist."));
            Ok(())
        }
        Err(db_error) => {
            error!("Failed to look up category {}: {}", category_id, db_error);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error while validating category",
                "DATABASE_ERROR",
            ))
        }
    }
}

async fn check_instructor_is_teacher(
    state: &AppState,
    instructor_id: i32,
    errors: &mut ValidationErrorResponse,
) -> Result<(), Response> {
    match user::Entity::find_by_id(instructor_id).one(&state.db).await {
        Ok(Some(u)) if u.role == user::UserRole::Teacher => Ok(()),
        Ok(Some(_)) => {
            errors.add("instructor", "Instructor must be a user with the teacher role.");
            Ok(())
        }
        Ok(None) => {
            errors.add("instructor", format!("User {instructor_id} does not exist."));
            Ok(())
        }
        Err(db_error) => {
            error!("Failed to look up instructor {}: {}", instructor_id, db_error);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error while validating instructor",
                "DATABASE_ERROR",
            ))
        }
    }
}

/// Create a new course
#[utoipa::path(
    post,
    path = "/api/courses",
    tag = "courses",
    request_body = CreateCourseRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Course created successfully", body = ApiResponse<CourseResponse>),
        (status = 400, description = "Validation failed", body = ValidationErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not a teacher or admin", body = ErrorResponse),
        (status = 409, description = "Duplicate title for this instructor", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_course(
    State(state): State<AppState>,
    actor: CurrentUser,
    Json(request): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CourseResponse>>), Response> {
    debug!("Creating course '{}' for actor {}", request.title, actor.id);

    authorize_course(Some(&actor), Action::Write, None).map_err(policy_response)?;

    let price = request.price.unwrap_or(Decimal::ZERO);
    let level = request.level.unwrap_or(CourseLevel::Beginner);
    let course_type = request.course_type.unwrap_or(CourseType::Free);
    let duration = request.duration.unwrap_or(0);

    // A teacher creates courses they instruct; an admin must say whose
    // course it is.
    let instructor_id = match (request.instructor, actor.role) {
        (Some(id), _) => id,
        (None, user::UserRole::Teacher) => actor.id,
        (None, _) => {
            return Err(validation_response(ValidationErrorResponse::with_field(
                "instructor",
                "An instructor is required.",
            )));
        }
    };

    let mut errors = ValidationErrorResponse::new("VALIDATION_ERROR");
    check_pricing(course_type, price, &mut errors);
    if duration < 0 {
        errors.add("duration", "Duration must not be negative.");
    }
    check_category_exists(&state, request.category, &mut errors).await?;
    check_instructor_is_teacher(&state, instructor_id, &mut errors).await?;

    if !errors.is_empty() {
        warn!("Course creation rejected: {:?}", errors.errors.keys());
        return Err(validation_response(errors));
    }

    let now = Utc::now();
    let new_course = course::ActiveModel {
        title: Set(request.title.clone()),
        description: Set(request.description),
        price: Set(price),
        level: Set(level),
        course_type: Set(course_type),
        tags: Set(serde_json::json!(request.tags.unwrap_or_default())),
        prerequisites: Set(request.prerequisites),
        syllabus: Set(request.syllabus),
        duration: Set(duration),
        // New courses start unpublished; the publish action flips this
        is_active: Set(false),
        category_id: Set(request.category),
        instructor_id: Set(instructor_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    match new_course.insert(&state.db).await {
        Ok(course_model) => {
            info!(
                "Course created with ID: {}, title: '{}'",
                course_model.id, course_model.title
            );
            let response = ApiResponse {
                data: CourseResponse::from(course_model),
                message: "Course created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create course '{}': {}", request.title, db_error);
            if is_unique_violation(&db_error) {
                Err(error_response(
                    StatusCode::CONFLICT,
                    "This instructor already has a course with that title",
                    "COURSE_ALREADY_EXISTS",
                ))
            } else {
                Err(error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error while creating course",
                    "DATABASE_ERROR",
                ))
            }
        }
    }
}

/// List courses, newest first
#[utoipa::path(
    get,
    path = "/api/courses",
    tag = "courses",
    params(ListCoursesQuery),
    responses(
        (status = 200, description = "Courses retrieved successfully", body = ApiResponse<Vec<CourseResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_courses(
    State(state): State<AppState>,
    Query(query): Query<ListCoursesQuery>,
) -> Result<Json<ApiResponse<Vec<CourseResponse>>>, Response> {
    let include_inactive = query.include_inactive.unwrap_or(false);
    debug!("Listing courses, include_inactive={}", include_inactive);

    match course::Entity::find_filtered(include_inactive).all(&state.db).await {
        Ok(courses) => {
            let count = courses.len();
            let data: Vec<CourseResponse> = courses.into_iter().map(CourseResponse::from).collect();
            info!("Retrieved {} courses", count);
            Ok(Json(ApiResponse {
                data,
                message: "Courses retrieved successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to retrieve courses: {}", db_error);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error while listing courses",
                "DATABASE_ERROR",
            ))
        }
    }
}

/// Fetch a course row or produce the appropriate error response.
pub(crate) async fn load_course(state: &AppState, course_id: i32) -> Result<course::Model, Response> {
    match course::Entity::find_by_id(course_id).one(&state.db).await {
        Ok(Some(course_model)) => Ok(course_model),
        Ok(None) => {
            warn!("Course with ID {} not found", course_id);
            Err(error_response(
                StatusCode::NOT_FOUND,
                "Course not found",
                "COURSE_NOT_FOUND",
            ))
        }
        Err(db_error) => {
            error!("Failed to retrieve course {}: {}", course_id, db_error);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error while loading course",
                "DATABASE_ERROR",
            ))
        }
    }
}

/// Get a specific course by ID
#[utoipa::path(
    get,
    path = "/api/courses/{course_id}",
    tag = "courses",
    params(("course_id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course retrieved successfully", body = ApiResponse<CourseResponse>),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_course(
    Path(course_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CourseResponse>>, Response> {
    let course_model = load_course(&state, course_id).await?;
    Ok(Json(ApiResponse {
        data: CourseResponse::from(course_model),
        message: "Course retrieved successfully".to_string(),
        success: true,
    }))
}

/// Update a course (full or partial; absent fields keep their value)
#[utoipa::path(
    put,
    path = "/api/courses/{course_id}",
    tag = "courses",
    params(("course_id" = i32, Path, description = "Course ID")),
    request_body = UpdateCourseRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Course updated successfully", body = ApiResponse<CourseResponse>),
        (status = 400, description = "Validation failed", body = ValidationErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the owning teacher or an admin", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 409, description = "Duplicate title for this instructor", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_course(
    Path(course_id): Path<i32>,
    State(state): State<AppState>,
    actor: CurrentUser,
    Json(request): Json<UpdateCourseRequest>,
) -> Result<Json<ApiResponse<CourseResponse>>, Response> {
    debug!("Updating course {} as actor {}", course_id, actor.id);

    let existing = load_course(&state, course_id).await?;
    authorize_course(Some(&actor), Action::Write, Some(&existing)).map_err(policy_response)?;

    // The invariant is re-checked against the effective pair, whichever of
    // the two fields the caller chose to send.
    let effective_type = request.course_type.unwrap_or(existing.course_type);
    let effective_price = request.price.unwrap_or(existing.price);

    let mut errors = ValidationErrorResponse::new("VALIDATION_ERROR");
    check_pricing(effective_type, effective_price, &mut errors);
    if let Some(duration) = request.duration {
        if duration < 0 {
            errors.add("duration", "Duration must not be negative.");
        }
    }
    if let Some(category_id) = request.category {
        check_category_exists(&state, category_id, &mut errors).await?;
    }
    if !errors.is_empty() {
        warn!("Course update rejected: {:?}", errors.errors.keys());
        return Err(validation_response(errors));
    }

    let mut active: course::ActiveModel = existing.into();
    if let Some(title) = request.title {
        active.title = Set(title);
    }
    if let Some(description) = request.description {
        active.description = Set(description);
    }
    if let Some(price) = request.price {
        active.price = Set(price);
    }
    if let Some(level) = request.level {
        active.level = Set(level);
    }
    if let Some(course_type) = request.course_type {
        active.course_type = Set(course_type);
    }
    if let Some(tags) = request.tags {
        active.tags = Set(serde_json::json!(tags));
    }
    if let Some(prerequisites) = request.prerequisites {
        active.prerequisites = Set(Some(prerequisites));
    }
    if let Some(syllabus) = request.syllabus {
        active.syllabus = Set(Some(syllabus));
    }
    if let Some(duration) = request.duration {
        active.duration = Set(duration);
    }
    if let Some(category_id) = request.category {
        active.category_id = Set(category_id);
    }
    active.updated_at = Set(Utc::now());

    match active.update(&state.db).await {
        Ok(updated) => {
            info!("Course {} updated", course_id);
            Ok(Json(ApiResponse {
                data: CourseResponse::from(updated),
                message: "Course updated successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to update course {}: {}", course_id, db_error);
            if is_unique_violation(&db_error) {
                Err(error_response(
                    StatusCode::CONFLICT,
                    "This instructor already has a course with that title",
                    "COURSE_ALREADY_EXISTS",
                ))
            } else {
                Err(error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error while updating course",
                    "DATABASE_ERROR",
                ))
            }
        }
    }
}

/// Delete a course; its lessons go with it
#[utoipa::path(
    delete,
    path = "/api/courses/{course_id}",
    tag = "courses",
    params(("course_id" = i32, Path, description = "Course ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Course deleted successfully", body = ApiResponse<String>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the owning teacher or an admin", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_course(
    Path(course_id): Path<i32>,
    State(state): State<AppState>,
    actor: CurrentUser,
) -> Result<Json<ApiResponse<String>>, Response> {
    debug!("Deleting course {} as actor {}", course_id, actor.id);

    let existing = load_course(&state, course_id).await?;
    authorize_course(Some(&actor), Action::Write, Some(&existing)).map_err(policy_response)?;

    match course::Entity::delete_by_id(course_id).exec(&state.db).await {
        Ok(result) if result.rows_affected > 0 => {
            info!("Course {} deleted", course_id);
            Ok(Json(ApiResponse {
                data: format!("Course {course_id} deleted"),
                message: "Course deleted successfully".to_string(),
                success: true,
            }))
        }
        Ok(_) => Err(error_response(
            StatusCode::NOT_FOUND,
            "Course not found",
            "COURSE_NOT_FOUND",
        )),
        Err(db_error) => {
            error!("Failed to delete course {}: {}", course_id, db_error);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error while deleting course",
                "DATABASE_ERROR",
            ))
        }
    }
}

/// Publish a course: set is_active and nothing else. Idempotent.
#[utoipa::path(
    patch,
    path = "/api/courses/{course_id}/publish",
    tag = "courses",
    params(("course_id" = i32, Path, description = "Course ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Course is published", body = ApiResponse<CourseResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the owning teacher or an admin", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn publish_course(
    Path(course_id): Path<i32>,
    State(state): State<AppState>,
    actor: CurrentUser,
) -> Result<Json<ApiResponse<CourseResponse>>, Response> {
    debug!("Publishing course {} as actor {}", course_id, actor.id);

    let existing = load_course(&state, course_id).await?;
    authorize_course(Some(&actor), Action::Write, Some(&existing)).map_err(policy_response)?;

    if existing.is_active {
        // Already published; succeed without touching the row
        return Ok(Json(ApiResponse {
            data: CourseResponse::from(existing),
            message: "Course is already published".to_string(),
            success: true,
        }));
    }

    let mut active: course::ActiveModel = existing.into();
    active.is_active = Set(true);
    active.updated_at = Set(Utc::now());

    match active.update(&state.db).await {
        Ok(published) => {
            info!("Course {} published", course_id);
            Ok(Json(ApiResponse {
                data: CourseResponse::from(published),
                message: "Course published successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to publish course {}: {}", course_id, db_error);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error while publishing course",
                "DATABASE_ERROR",
            ))
        }
    }
}
