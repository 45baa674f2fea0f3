use serde::{Deserialize, Serialize};

use crate::api::binder::{
    assign, BindError, BindRequest, Binder, Field, JsonBinder, NoOpBinder, RequestParts, TagBinder,
    TaggedFields, Tags,
};
use crate::logic::validate::{Rules, Validate};

pub type TodoId = i64;

pub const TITLE_MAX_LEN: usize = 255;
pub const DESCRIPTION_MAX_LEN: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub description: String,
}

/// Column values of a todo without its store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
}

impl NewTodo {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn into_todo(self, id: TodoId) -> Todo {
        Todo {
            id,
            title: self.title,
            description: self.description,
        }
    }
}

fn validate_content(rules: &mut Rules, title: &str, description: &str) {
    rules
        .max_len("title", title, TITLE_MAX_LEN)
        .max_len("description", description, DESCRIPTION_MAX_LEN);
}

/// Parse the `{id}` route variable.
fn todo_id(parts: &RequestParts) -> Result<TodoId, BindError> {
    let raw = parts
        .route_var("id")
        .ok_or_else(|| BindError::custom("missing todo id"))?;
    raw.parse()
        .map_err(|_| BindError::custom("invalid todo id"))
}

// GET /todos/{id}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRequest {
    pub id: TodoId,
}

impl TaggedFields for GetRequest {
    const FIELDS: &'static [Field<Self>] = &[Field {
        name: "id",
        tags: Tags::route_var("id"),
        assign: |req, raw| assign(&mut req.id, raw),
    }];
}

impl BindRequest for GetRequest {
    type Binder = TagBinder;
}

impl Validate for GetRequest {
    fn validate(&self, _rules: &mut Rules) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetResponse {
    #[serde(flatten)]
    pub todo: Todo,
}

// GET /todos

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {}

impl BindRequest for ListRequest {
    type Binder = NoOpBinder;
}

impl Validate for ListRequest {
    fn validate(&self, _rules: &mut Rules) {}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    pub data: Vec<Todo>,
}

// POST /todos

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl BindRequest for CreateRequest {
    type Binder = JsonBinder;
}

impl Validate for CreateRequest {
    fn validate(&self, rules: &mut Rules) {
        validate_content(rules, &self.title, &self.description);
    }
}

impl From<CreateRequest> for NewTodo {
    fn from(req: CreateRequest) -> Self {
        NewTodo::new(req.title, req.description)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateResponse {
    pub id: TodoId,
}

// PUT /todos/{id}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    #[serde(skip)]
    pub id: TodoId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl Binder<UpdateRequest> for UpdateRequest {
    fn bind(parts: &RequestParts) -> Result<Self, BindError> {
        let id = todo_id(parts)?;
        let mut req: UpdateRequest = parts.decode_body()?;
        // the route is authoritative for the id
        req.id = id;
        Ok(req)
    }
}

impl BindRequest for UpdateRequest {
    type Binder = Self;
}

impl Validate for UpdateRequest {
    fn validate(&self, rules: &mut Rules) {
        validate_content(rules, &self.title, &self.description);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResponse {}

// DELETE /todos/{id}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteRequest {
    pub id: TodoId,
}

impl Binder<DeleteRequest> for DeleteRequest {
    fn bind(parts: &RequestParts) -> Result<Self, BindError> {
        Ok(DeleteRequest { id: todo_id(parts)? })
    }
}

impl BindRequest for DeleteRequest {
    type Binder = Self;
}

impl Validate for DeleteRequest {
    fn validate(&self, _rules: &mut Rules) {}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {}
