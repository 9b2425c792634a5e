use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::todos::handlers::{
    create_todo, delete_todo, get_todo, list_todos, update_todo,
};
use crate::features::todos::services::TodoService;

/// Create routes for the todos feature
pub fn routes(todo_service: Arc<TodoService>) -> Router {
    Router::new()
        .route("/api/todos", get(list_todos).post(create_todo))
        .route(
            "/api/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .with_state(todo_service)
}
