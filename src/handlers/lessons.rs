use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Json, Response},
};
use chrono::Utc;
use model::entities::lesson;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

use super::courses::load_course;
use super::{error_response, policy_response, validation_response};
use crate::auth::CurrentUser;
use crate::policy::{Action, authorize_course};
use crate::schemas::{ApiResponse, AppState, ErrorResponse, ValidationErrorResponse};

/// Request structure for creating a lesson.
///
/// There is intentionally no course field: the owning course comes from the
/// request path, and any course value in the body is ignored by serde.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateLessonRequest {
    pub title: String,
    pub content: Option<String>,
    /// Display position within the course
    pub order: Option<i32>,
    pub is_preview: Option<bool>,
}

/// Request structure for updating a lesson; all fields optional
#[derive(Debug, Deserialize, Serialize, Default, ToSchema)]
pub struct UpdateLessonRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub order: Option<i32>,
    pub is_preview: Option<bool>,
}

/// Response structure for lesson operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LessonResponse {
    pub id: i32,
    pub course: i32,
    pub title: String,
    pub content: String,
    pub order: i32,
    pub is_preview: bool,
}

impl From<lesson::Model> for LessonResponse {
    fn from(model: lesson::Model) -> Self {
        Self {
            id: model.id,
            course: model.course_id,
            title: model.title,
            content: model.content,
            order: model.order,
            is_preview: model.is_preview,
        }
    }
}

/// Fetch a lesson within the path-scoped course. A lesson id belonging to a
/// different course is indistinguishable from a missing one.
async fn load_scoped_lesson(
    state: &AppState,
    course_id: i32,
    lesson_id: i32,
) -> Result<lesson::Model, Response> {
    match lesson::Entity::find_by_id(lesson_id)
        .filter(lesson::Column::CourseId.eq(course_id))
        .one(&state.db)
        .await
    {
        Ok(Some(lesson_model)) => Ok(lesson_model),
        Ok(None) => {
            warn!("Lesson {} not found in course {}", lesson_id, course_id);
            Err(error_response(
                StatusCode::NOT_FOUND,
                "Lesson not found",
                "LESSON_NOT_FOUND",
            ))
        }
        Err(db_error) => {
            error!("Failed to retrieve lesson {}: {}", lesson_id, db_error);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error while loading lesson",
                "DATABASE_ERROR",
            ))
        }
    }
}

/// Create a lesson under a course
#[utoipa::path(
    post,
    path = "/api/courses/{course_id}/lessons",
    tag = "lessons",
    params(("course_id" = i32, Path, description = "Owning course ID")),
    request_body = CreateLessonRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Lesson created successfully", body = ApiResponse<LessonResponse>),
        (status = 400, description = "Validation failed", body = ValidationErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the owning teacher or an admin", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_lesson(
    Path(course_id): Path<i32>,
    State(state): State<AppState>,
    actor: CurrentUser,
    Json(request): Json<CreateLessonRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LessonResponse>>), Response> {
    debug!("Creating lesson in course {} as actor {}", course_id, actor.id);

    let course_model = load_course(&state, course_id).await?;
    // Writing a lesson is a write on its course
    authorize_course(Some(&actor), Action::Write, Some(&course_model)).map_err(policy_response)?;

    let order = request.order.unwrap_or(0);
    if order < 0 {
        return Err(validation_response(ValidationErrorResponse::with_field(
            "order",
            "Order must not be negative.",
        )));
    }

    // The course binding is forced from the path, never from the body
    let new_lesson = lesson::ActiveModel {
        course_id: Set(course_model.id),
        title: Set(request.title),
        content: Set(request.content.unwrap_or_default()),
        order: Set(order),
        is_preview: Set(request.is_preview.unwrap_or(false)),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    match new_lesson.insert(&state.db).await {
        Ok(lesson_model) => {
            info!(
                "Lesson created with ID: {} in course {}",
                lesson_model.id, course_id
            );
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse {
                    data: LessonResponse::from(lesson_model),
                    message: "Lesson created successfully".to_string(),
                    success: true,
                }),
            ))
        }
        Err(db_error) => {
            error!("Failed to create lesson in course {}: {}", course_id, db_error);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error while creating lesson",
                "DATABASE_ERROR",
            ))
        }
    }
}

/// List lessons of a course in display order
#[utoipa::path(
    get,
    path = "/api/courses/{course_id}/lessons",
    tag = "lessons",
    params(("course_id" = i32, Path, description = "Owning course ID")),
    responses(
        (status = 200, description = "Lessons retrieved successfully", body = ApiResponse<Vec<LessonResponse>>),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_lessons(
    Path(course_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<LessonResponse>>>, Response> {
    let course_model = load_course(&state, course_id).await?;

    match lesson::Entity::find_in_course(course_model.id).all(&state.db).await {
        Ok(lessons) => {
            debug!("Retrieved {} lessons for course {}", lessons.len(), course_id);
            let data: Vec<LessonResponse> = lessons.into_iter().map(LessonResponse::from).collect();
            Ok(Json(ApiResponse {
                data,
                message: "Lessons retrieved successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to list lessons for course {}: {}", course_id, db_error);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error while listing lessons",
                "DATABASE_ERROR",
            ))
        }
    }
}

/// Get a specific lesson within a course
#[utoipa::path(
    get,
    path = "/api/courses/{course_id}/lessons/{lesson_id}",
    tag = "lessons",
    params(
        ("course_id" = i32, Path, description = "Owning course ID"),
        ("lesson_id" = i32, Path, description = "Lesson ID"),
    ),
    responses(
        (status = 200, description = "Lesson retrieved successfully", body = ApiResponse<LessonResponse>),
        (status = 404, description = "Lesson not found in this course", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_lesson(
    Path((course_id, lesson_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<LessonResponse>>, Response> {
    let lesson_model = load_scoped_lesson(&state, course_id, lesson_id).await?;
    Ok(Json(ApiResponse {
        data: LessonResponse::from(lesson_model),
        message: "Lesson retrieved successfully".to_string(),
        success: true,
    }))
}

/// Update a lesson within a course
#[utoipa::path(
    put,
    path = "/api/courses/{course_id}/lessons/{lesson_id}",
    tag = "lessons",
    params(
        ("course_id" = i32, Path, description = "Owning course ID"),
        ("lesson_id" = i32, Path, description = "Lesson ID"),
    ),
    request_body = UpdateLessonRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Lesson updated successfully", body = ApiResponse<LessonResponse>),
        (status = 400, description = "Validation failed", body = ValidationErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the owning teacher or an admin", body = ErrorResponse),
        (status = 404, description = "Lesson not found in this course", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_lesson(
    Path((course_id, lesson_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
    actor: CurrentUser,
    Json(request): Json<UpdateLessonRequest>,
) -> Result<Json<ApiResponse<LessonResponse>>, Response> {
    debug!("Updating lesson {} in course {}", lesson_id, course_id);

    let course_model = load_course(&state, course_id).await?;
    authorize_course(Some(&actor), Action::Write, Some(&course_model)).map_err(policy_response)?;
    let existing = load_scoped_lesson(&state, course_id, lesson_id).await?;

    if matches!(request.order, Some(order) if order < 0) {
        return Err(validation_response(ValidationErrorResponse::with_field(
            "order",
            "Order must not be negative.",
        )));
    }

    let mut active: lesson::ActiveModel = existing.into();
    if let Some(title) = request.title {
        active.title = Set(title);
    }
    if let Some(content) = request.content {
        active.content = Set(content);
    }
    if let Some(order) = request.order {
        active.order = Set(order);
    }
    if let Some(is_preview) = request.is_preview {
        active.is_preview = Set(is_preview);
    }

    match active.update(&state.db).await {
        Ok(updated) => {
            info!("Lesson {} updated", lesson_id);
            Ok(Json(ApiResponse {
                data: LessonResponse::from(updated),
                message: "Lesson updated successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to update lesson {}: {}", lesson_id, db_error);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error while updating lesson",
                "DATABASE_ERROR",
            ))
        }
    }
}

/// Delete a lesson within a course
#[utoipa::path(
    delete,
    path = "/api/courses/{course_id}/lessons/{lesson_id}",
    tag = "lessons",
    params(
        ("course_id" = i32, Path, description = "Owning course ID"),
        ("lesson_id" = i32, Path, description = "Lesson ID"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Lesson deleted successfully", body = ApiResponse<String>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the owning teacher or an admin", body = ErrorResponse),
        (status = 404, description = "Lesson not found in this course", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_lesson(
    Path((course_id, lesson_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
    actor: CurrentUser,
) -> Result<Json<ApiResponse<String>>, Response> {
    debug!("Deleting lesson {} in course {}", lesson_id, course_id);

    let course_model = load_course(&state, course_id).await?;
    authorize_course(Some(&actor), Action::Write, Some(&course_model)).map_err(policy_response)?;
    let existing = load_scoped_lesson(&state, course_id, lesson_id).await?;

    match lesson::Entity::delete_by_id(existing.id).exec(&state.db).await {
        Ok(result) if result.rows_affected > 0 => {
            info!("Lesson {} deleted", lesson_id);
            Ok(Json(ApiResponse {
                data: format!("Lesson {lesson_id} deleted"),
                message: "Lesson deleted successfully".to_string(),
                success: true,
            }))
        }
        Ok(_) => Err(error_response(
            StatusCode::NOT_FOUND,
            "Lesson not found",
            "LESSON_NOT_FOUND",
        )),
        Err(db_error) => {
            error!("Failed to delete lesson {}: {}", lesson_id, db_error);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error while deleting lesson",
                "DATABASE_ERROR",
            ))
        }
    }
}
