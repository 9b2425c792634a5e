mod todo_dto;

pub use todo_dto::{CreateTodoDto, DeleteTodoResponseDto, TodoResponseDto, UpdateTodoDto};
