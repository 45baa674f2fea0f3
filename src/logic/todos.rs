use anyhow::Result;

use crate::api::context::RequestContext;
use crate::model::{
    CreateRequest, CreateResponse, DeleteRequest, DeleteResponse, GetRequest, GetResponse,
    ListRequest, ListResponse, NewTodo, UpdateRequest, UpdateResponse,
};
use crate::store::traits::{StoreError, TodoStore};

pub async fn get_todo<S: TodoStore>(ctx: RequestContext<S>, req: GetRequest) -> Result<GetResponse> {
    let todo = ctx
        .store()
        .get_todo(req.id)
        .await?
        .ok_or(StoreError::NotFound { id: req.id })?;

    Ok(GetResponse { todo })
}

pub async fn list_todos<S: TodoStore>(
    ctx: RequestContext<S>,
    _req: ListRequest,
) -> Result<ListResponse> {
    let data = ctx.store().list_todos().await?;
    Ok(ListResponse { data })
}

pub async fn create_todo<S: TodoStore>(
    ctx: RequestContext<S>,
    req: CreateRequest,
) -> Result<CreateResponse> {
    let id = ctx.store().create_todo(NewTodo::from(req)).await?;
    log::debug!("Created todo {}", id);
    Ok(CreateResponse { id })
}

/// Updating an id with no row still succeeds.
pub async fn update_todo<S: TodoStore>(
    ctx: RequestContext<S>,
    req: UpdateRequest,
) -> Result<UpdateResponse> {
    let matched = ctx
        .store()
        .update_todo(req.id, NewTodo::new(req.title, req.description))
        .await?;
    if !matched {
        log::debug!("Update of todo {} matched no row", req.id);
    }
    Ok(UpdateResponse {})
}

/// Deleting an id with no row still succeeds.
pub async fn delete_todo<S: TodoStore>(
    ctx: RequestContext<S>,
    req: DeleteRequest,
) -> Result<DeleteResponse> {
    let matched = ctx.store().delete_todo(req.id).await?;
    if !matched {
        log::debug!("Delete of todo {} matched no row", req.id);
    }
    Ok(DeleteResponse {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use axum::http::{HeaderMap, Method, Uri};
    use std::sync::Arc;

    fn ctx(store: &Arc<MemoryStore>) -> RequestContext<MemoryStore> {
        RequestContext::new(store.clone(), Method::GET, Uri::from_static("/todos"), HeaderMap::new())
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = Arc::new(MemoryStore::new());
        let created = create_todo(
            ctx(&store),
            CreateRequest {
                title: "write tests".to_string(),
                description: "for the store".to_string(),
            },
        )
        .await
        .unwrap();

        let fetched = get_todo(ctx(&store), GetRequest { id: created.id })
            .await
            .unwrap();
        assert_eq!(fetched.todo.id, created.id);
        assert_eq!(fetched.todo.title, "write tests");
        assert_eq!(fetched.todo.description, "for the store");
    }

    #[tokio::test]
    async fn get_missing_todo_fails() {
        let store = Arc::new(MemoryStore::new());
        let err = get_todo(ctx(&store), GetRequest { id: 7 }).await.unwrap_err();
        assert_eq!(err.to_string(), "todo 7 not found");
    }

    #[tokio::test]
    async fn list_empty_store_is_empty_not_null() {
        let store = Arc::new(MemoryStore::new());
        let listed = list_todos(ctx(&store), ListRequest::default()).await.unwrap();
        assert!(listed.data.is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_id_succeed() {
        let store = Arc::new(MemoryStore::new());
        let update = UpdateRequest {
            id: 3,
            title: "t".to_string(),
            description: "d".to_string(),
        };
        assert_eq!(update_todo(ctx(&store), update).await.unwrap(), UpdateResponse {});
        assert_eq!(
            delete_todo(ctx(&store), DeleteRequest { id: 3 }).await.unwrap(),
            DeleteResponse {}
        );
        assert!(store.is_empty());
    }
}
