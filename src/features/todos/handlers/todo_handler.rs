use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::todos::dtos::{
    CreateTodoDto, DeleteTodoResponseDto, TodoResponseDto, UpdateTodoDto,
};
use crate::features::todos::services::TodoService;
use crate::shared::types::{ApiResponse, Meta};

/// List the caller's todos, newest first
#[utoipa::path(
    get,
    path = "/api/todos",
    tag = "todos",
    responses(
        (status = 200, description = "Todos retrieved successfully", body = ApiResponse<Vec<TodoResponseDto>>),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_todos(
    user: AuthenticatedUser,
    State(service): State<Arc<TodoService>>,
) -> Result<Json<ApiResponse<Vec<TodoResponseDto>>>> {
    let todos = service.list(&user.sub).await?;
    let total = todos.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(todos),
        None,
        Some(Meta { total }),
    )))
}

/// Create a new todo
#[utoipa::path(
    post,
    path = "/api/todos",
    tag = "todos",
    request_body = CreateTodoDto,
    responses(
        (status = 201, description = "Todo created successfully", body = ApiResponse<TodoResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_todo(
    user: AuthenticatedUser,
    State(service): State<Arc<TodoService>>,
    AppJson(dto): AppJson<CreateTodoDto>,
) -> Result<(StatusCode, Json<ApiResponse<TodoResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let todo = service.create(&user.sub, dto).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(todo), None, None)),
    ))
}

/// Fetch one todo by id
#[utoipa::path(
    get,
    path = "/api/todos/{id}",
    tag = "todos",
    params(
        ("id" = Uuid, Path, description = "Todo id")
    ),
    responses(
        (status = 200, description = "Todo retrieved successfully", body = ApiResponse<TodoResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Todo not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_todo(
    user: AuthenticatedUser,
    State(service): State<Arc<TodoService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TodoResponseDto>>> {
    let todo = service.get_by_id(id, &user.sub).await?;
    Ok(Json(ApiResponse::success(Some(todo), None, None)))
}

/// Update a todo
///
/// Partial update: only supplied fields change. A body carrying only
/// `completed` is the toggle shorthand and flips the stored value.
#[utoipa::path(
    put,
    path = "/api/todos/{id}",
    tag = "todos",
    params(
        ("id" = Uuid, Path, description = "Todo id")
    ),
    request_body = UpdateTodoDto,
    responses(
        (status = 200, description = "Todo updated successfully", body = ApiResponse<TodoResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Todo not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_todo(
    user: AuthenticatedUser,
    State(service): State<Arc<TodoService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateTodoDto>,
) -> Result<Json<ApiResponse<TodoResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let todo = service.update(id, &user.sub, dto).await?;
    Ok(Json(ApiResponse::success(Some(todo), None, None)))
}

/// Delete a todo
///
/// Removes the attached file (blob and record) best-effort before deleting
/// the todo itself.
#[utoipa::path(
    delete,
    path = "/api/todos/{id}",
    tag = "todos",
    params(
        ("id" = Uuid, Path, description = "Todo id")
    ),
    responses(
        (status = 200, description = "Todo deleted successfully", body = ApiResponse<DeleteTodoResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Todo not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_todo(
    user: AuthenticatedUser,
    State(service): State<Arc<TodoService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeleteTodoResponseDto>>> {
    service.delete(id, &user.sub).await?;

    Ok(Json(ApiResponse::success(
        Some(DeleteTodoResponseDto {
            message: "Todo deleted successfully".to_string(),
        }),
        None,
        None,
    )))
}
