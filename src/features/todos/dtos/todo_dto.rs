use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::todos::models::Todo;

/// Request DTO for creating a todo
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTodoDto {
    /// Title of the todo (required, non-empty)
    #[validate(length(min = 1, max = 500, message = "Title must be 1-500 characters"))]
    pub title: String,

    /// Optional description, defaults to empty
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,
}

/// Request DTO for updating a todo.
///
/// All fields are optional; only the supplied ones change. A body carrying
/// `completed` alone is the toggle shorthand: the stored value is flipped
/// and the literal is ignored.
#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateTodoDto {
    #[validate(length(min = 1, max = 500, message = "Title must be 1-500 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    pub completed: Option<bool>,
}

impl UpdateTodoDto {
    /// An update body containing only `completed` means "flip", not "set"
    pub fn is_toggle_shorthand(&self) -> bool {
        self.completed.is_some() && self.title.is_none() && self.description.is_none()
    }
}

/// Response DTO for todo items
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TodoResponseDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub completed: bool,
    /// Public URL of the attached file, if any
    pub file_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Todo> for TodoResponseDto {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title,
            description: todo.description,
            completed: todo.completed,
            file_url: todo.file_url,
            created_at: todo.created_at,
            updated_at: todo.updated_at,
        }
    }
}

/// Response DTO for todo deletion
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteTodoResponseDto {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::lorem::en::Sentence;
    use fake::Fake;

    #[test]
    fn test_create_dto_accepts_valid_title() {
        let dto = CreateTodoDto {
            title: Sentence(1..8).fake(),
            description: None,
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_create_dto_rejects_empty_title() {
        let dto = CreateTodoDto {
            title: String::new(),
            description: Some("details".to_string()),
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_toggle_shorthand_detection() {
        let toggle = UpdateTodoDto {
            completed: Some(true),
            ..Default::default()
        };
        assert!(toggle.is_toggle_shorthand());

        let full_update = UpdateTodoDto {
            title: Some("Buy milk".to_string()),
            completed: Some(true),
            ..Default::default()
        };
        assert!(!full_update.is_toggle_shorthand());

        let no_completed = UpdateTodoDto {
            description: Some("now with oat milk".to_string()),
            ..Default::default()
        };
        assert!(!no_completed.is_toggle_shorthand());
    }
}
