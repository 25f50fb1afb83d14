//! User administration handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use shared::{Action, PaginatedResponse, Pagination, Resource};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::{check_permission, AuthUser};
use crate::models::User;
use crate::services::user::{CreateUserInput, UpdateUserInput};
use crate::services::UserService;
use crate::AppState;

pub async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<User>>> {
    check_permission(&user, Resource::User, Action::View)?;
    let service = UserService::new(state.db.clone());
    Ok(Json(service.list_users(&pagination).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<User>> {
    check_permission(&user, Resource::User, Action::View)?;
    let service = UserService::new(state.db.clone());
    Ok(Json(service.get_user(user_id).await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<CreateUserInput>,
) -> AppResult<(StatusCode, Json<User>)> {
    check_permission(&user, Resource::User, Action::Create)?;
    let service = UserService::new(state.db.clone());
    let created = service.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    Json(input): Json<UpdateUserInput>,
) -> AppResult<Json<User>> {
    check_permission(&user, Resource::User, Action::Edit)?;
    let service = UserService::new(state.db.clone());
    Ok(Json(service.update_user(user_id, input).await?))
}

/// Deactivate a user (accounts are never hard-deleted)
pub async fn deactivate_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    check_permission(&user, Resource::User, Action::Delete)?;
    if user_id == user.user_id {
        return Err(AppError::conflict("user", "You cannot deactivate your own account"));
    }
    let service = UserService::new(state.db.clone());
    service.deactivate_user(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
