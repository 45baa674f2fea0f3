use crate::model::{NewTodo, Todo, TodoId};
use anyhow::Result;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("todo {id} not found")]
    NotFound { id: TodoId },
}

/// Persistence for the todo table. Implementations must be safe to share
/// across concurrent requests without external locking.
#[async_trait::async_trait]
pub trait TodoStore: Send + Sync {
    async fn get_todo(&self, id: TodoId) -> Result<Option<Todo>>;
    /// All todos ordered by id.
    async fn list_todos(&self) -> Result<Vec<Todo>>;
    /// Insert and return the store-assigned id.
    async fn create_todo(&self, todo: NewTodo) -> Result<TodoId>;
    /// Returns whether a row matched.
    async fn update_todo(&self, id: TodoId, todo: NewTodo) -> Result<bool>;
    /// Returns whether a row matched.
    async fn delete_todo(&self, id: TodoId) -> Result<bool>;
}
