use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Json, Response},
};
use model::entities::category;
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};
use utoipa::{IntoParams, ToSchema};

use super::{error_response, policy_response};
use crate::auth::CurrentUser;
use crate::policy::authorize_category_read;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Response structure for category operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub is_active: bool,
}

impl From<category::Model> for CategoryResponse {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            slug: model.slug,
            is_active: model.is_active,
        }
    }
}

/// Query parameters for listing categories
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListCategoriesQuery {
    /// Also return inactive categories (default false)
    pub include_inactive: Option<bool>,
}

/// List categories, ordered by title. Admin only.
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "categories",
    params(ListCategoriesQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Categories retrieved successfully", body = ApiResponse<Vec<CategoryResponse>>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_categories(
    State(state): State<AppState>,
    actor: CurrentUser,
    Query(query): Query<ListCategoriesQuery>,
) -> Result<Json<ApiResponse<Vec<CategoryResponse>>>, Response> {
    authorize_category_read(&actor).map_err(policy_response)?;

    let include_inactive = query.include_inactive.unwrap_or(false);
    debug!("Listing categories, include_inactive={}", include_inactive);

    match category::Entity::find_filtered(include_inactive).all(&state.db).await {
        Ok(categories) => {
            let data: Vec<CategoryResponse> =
                categories.into_iter().map(CategoryResponse::from).collect();
            Ok(Json(ApiResponse {
                data,
                message: "Categories retrieved successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to retrieve categories: {}", db_error);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error while listing categories",
                "DATABASE_ERROR",
            ))
        }
    }
}

/// Get a specific category by ID. Admin only.
#[utoipa::path(
    get,
    path = "/api/categories/{category_id}",
    tag = "categories",
    params(("category_id" = i32, Path, description = "Category ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Category retrieved successfully", body = ApiResponse<CategoryResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_category(
    Path(category_id): Path<i32>,
    State(state): State<AppState>,
    actor: CurrentUser,
) -> Result<Json<ApiResponse<CategoryResponse>>, Response> {
    authorize_category_read(&actor).map_err(policy_response)?;

    match category::Entity::find_by_id(category_id).one(&state.db).await {
        Ok(Some(category_model)) => Ok(Json(ApiResponse {
            data: CategoryResponse::from(category_model),
            message: "Category retrieved successfully".to_string(),
            success: true,
        })),
        Ok(None) => {
            warn!("Category with ID {} not found", category_id);
            Err(error_response(
                StatusCode::NOT_FOUND,
                "Category not found",
                "CATEGORY_NOT_FOUND",
            ))
        }
        Err(db_error) => {
            error!("Failed to retrieve category {}: {}", category_id, db_error);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error while loading category",
                "DATABASE_ERROR",
            ))
        }
    }
}
