use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

use crate::model::{NewTodo, Todo, TodoId};
use crate::store::traits::TodoStore;

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Run the embedded database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }
}

fn todo_from_row(row: &sqlx::postgres::PgRow) -> Todo {
    Todo {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
    }
}

#[async_trait::async_trait]
impl TodoStore for PostgresStore {
    async fn get_todo(&self, id: TodoId) -> Result<Option<Todo>> {
        let row = sqlx::query("SELECT id, title, description FROM todo WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch todo")?;

        Ok(row.as_ref().map(todo_from_row))
    }

    async fn list_todos(&self) -> Result<Vec<Todo>> {
        let rows = sqlx::query("SELECT id, title, description FROM todo ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list todos")?;

        Ok(rows.iter().map(todo_from_row).collect())
    }

    async fn create_todo(&self, todo: NewTodo) -> Result<TodoId> {
        let id: TodoId = sqlx::query_scalar("INSERT INTO todo (title, description) VALUES ($1, $2) RETURNING id")
            .bind(todo.title)
            .bind(todo.description)
            .fetch_one(&self.pool)
            .await
            .context("Failed to create todo")?;

        Ok(id)
    }

    async fn update_todo(&self, id: TodoId, todo: NewTodo) -> Result<bool> {
        let result = sqlx::query("UPDATE todo SET title = $2, description = $3 WHERE id = $1")
            .bind(id)
            .bind(todo.title)
            .bind(todo.description)
            .execute(&self.pool)
            .await
            .context("Failed to update todo")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_todo(&self, id: TodoId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM todo WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete todo")?;

        Ok(result.rows_affected() > 0)
    }
}
