use axum::{
    routing::{get, MethodFilter},
    Router,
};

use crate::api::adapter::handle;
use crate::api::context::AppState;
use crate::logic::todos;
use crate::store::traits::TodoStore;

pub fn create_router<S: TodoStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        // Health check
        .route("/healthz", get(health_check))
        // Todo CRUD
        .route("/todos", handle(MethodFilter::GET, todos::list_todos::<S>))
        .route("/todos", handle(MethodFilter::POST, todos::create_todo::<S>))
        .route("/todos/:id", handle(MethodFilter::GET, todos::get_todo::<S>))
        .route("/todos/:id", handle(MethodFilter::PUT, todos::update_todo::<S>))
        .route("/todos/:id", handle(MethodFilter::DELETE, todos::delete_todo::<S>))
}

pub async fn health_check() -> &'static str {
    "OK"
}
