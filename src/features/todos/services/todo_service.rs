use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::files::services::FileService;
use crate::features::todos::dtos::{CreateTodoDto, TodoResponseDto, UpdateTodoDto};
use crate::features::todos::models::Todo;

const TODO_COLUMNS: &str =
    "id, user_id, title, description, completed, file_url, created_at, updated_at";

/// Service for todo operations.
///
/// Every query is scoped to the owner; a todo that exists but belongs to
/// someone else produces the same NotFound as a missing one.
pub struct TodoService {
    pool: PgPool,
    file_service: Arc<FileService>,
}

impl TodoService {
    pub fn new(pool: PgPool, file_service: Arc<FileService>) -> Self {
        Self { pool, file_service }
    }

    /// Trim a caller-supplied title, rejecting whitespace-only values
    fn normalize_title(raw: &str) -> Result<String> {
        let title = raw.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Title must not be empty".to_string()));
        }
        Ok(title.to_string())
    }

    /// List the caller's todos, newest first
    pub async fn list(&self, user_id: &str) -> Result<Vec<TodoResponseDto>> {
        let todos = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list todos: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(todos.into_iter().map(|t| t.into()).collect())
    }

    /// Create a new todo.
    ///
    /// `completed` always starts false regardless of caller input and the
    /// description defaults to an empty string.
    pub async fn create(&self, user_id: &str, dto: CreateTodoDto) -> Result<TodoResponseDto> {
        let title = Self::normalize_title(&dto.title)?;
        let description = dto.description.unwrap_or_default();

        let todo = sqlx::query_as::<_, Todo>(&format!(
            "INSERT INTO todos (user_id, title, description) \
             VALUES ($1, $2, $3) \
             RETURNING {TODO_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&title)
        .bind(&description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create todo: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Todo created: id={}, user={}", todo.id, user_id);

        Ok(todo.into())
    }

    /// Fetch one todo by id
    pub async fn get_by_id(&self, id: Uuid, user_id: &str) -> Result<TodoResponseDto> {
        let todo = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get todo by id: {:?}", e);
            AppError::Database(e)
        })?;

        todo.map(|t| t.into())
            .ok_or_else(|| AppError::NotFound("Todo not found".to_string()))
    }

    /// Apply a partial update.
    ///
    /// A body carrying only `completed` is the toggle shorthand and flips
    /// the stored value instead of writing the literal. `created_at` and
    /// the owner never change.
    pub async fn update(
        &self,
        id: Uuid,
        user_id: &str,
        dto: UpdateTodoDto,
    ) -> Result<TodoResponseDto> {
        if dto.is_toggle_shorthand() {
            return self.toggle(id, user_id).await;
        }

        let title = match dto.title.as_deref() {
            Some(raw) => Some(Self::normalize_title(raw)?),
            None => None,
        };

        let todo = sqlx::query_as::<_, Todo>(&format!(
            "UPDATE todos SET \
                title = COALESCE($3, title), \
                description = COALESCE($4, description), \
                completed = COALESCE($5, completed), \
                updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {TODO_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(title)
        .bind(dto.description)
        .bind(dto.completed)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update todo: {:?}", e);
            AppError::Database(e)
        })?;

        todo.map(|t| t.into())
            .ok_or_else(|| AppError::NotFound("Todo not found".to_string()))
    }

    /// Flip the completion flag in a single atomic statement.
    ///
    /// Concurrent toggles on the same id serialize at the database row, so
    /// two of them always net out to the original value.
    pub async fn toggle(&self, id: Uuid, user_id: &str) -> Result<TodoResponseDto> {
        let todo = sqlx::query_as::<_, Todo>(&format!(
            "UPDATE todos SET completed = NOT completed, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {TODO_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to toggle todo: {:?}", e);
            AppError::Database(e)
        })?;

        todo.map(|t| t.into())
            .ok_or_else(|| AppError::NotFound("Todo not found".to_string()))
    }

    /// Delete a todo, cleaning up its attachment first.
    ///
    /// Attachment cleanup is best-effort: a failure to remove the blob or
    /// its record leaves an inconsistency that is logged, while the todo
    /// deletion itself stays authoritative and propagates.
    pub async fn delete(&self, id: Uuid, user_id: &str) -> Result<()> {
        let todo = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch todo for deletion: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("Todo not found".to_string()))?;

        if let Some(file_url) = &todo.file_url {
            if let Err(e) = self.file_service.delete_by_url(file_url, user_id).await {
                tracing::warn!(
                    "Attachment cleanup for todo {} left inconsistent state: {}",
                    id,
                    e
                );
            }
        }

        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete todo: {:?}", e);
                AppError::Database(e)
            })?;

        // A concurrent delete may have won the race since the fetch above
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Todo not found".to_string()));
        }

        tracing::info!("Todo deleted: id={}, user={}", id, user_id);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_title_trims() {
        assert_eq!(
            TodoService::normalize_title("  Buy milk  ").unwrap(),
            "Buy milk"
        );
    }

    #[test]
    fn test_normalize_title_rejects_blank() {
        assert!(TodoService::normalize_title("").is_err());
        assert!(TodoService::normalize_title("   ").is_err());
    }
}
