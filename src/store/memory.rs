use std::collections::BTreeMap;

use anyhow::Result;
use parking_lot::Mutex;

use crate::model::{NewTodo, Todo, TodoId};
use crate::store::traits::TodoStore;

#[derive(Debug)]
struct MemoryState {
    next_id: TodoId,
    todos: BTreeMap<TodoId, Todo>,
}

/// In-process store with the same semantics as the todo table: ids start at
/// 1, are never reused, and listing is ordered by id.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                next_id: 1,
                todos: BTreeMap::new(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.state.lock().todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TodoStore for MemoryStore {
    async fn get_todo(&self, id: TodoId) -> Result<Option<Todo>> {
        Ok(self.state.lock().todos.get(&id).cloned())
    }

    async fn list_todos(&self) -> Result<Vec<Todo>> {
        Ok(self.state.lock().todos.values().cloned().collect())
    }

    async fn create_todo(&self, todo: NewTodo) -> Result<TodoId> {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.todos.insert(id, todo.into_todo(id));
        Ok(id)
    }

    async fn update_todo(&self, id: TodoId, todo: NewTodo) -> Result<bool> {
        let mut state = self.state.lock();
        match state.todos.get_mut(&id) {
            Some(existing) => {
                existing.title = todo.title;
                existing.description = todo.description;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_todo(&self, id: TodoId) -> Result<bool> {
        Ok(self.state.lock().todos.remove(&id).is_some())
    }
}
