//! Generic handler adapter: turns a typed business function into an axum
//! handler running bind, validate, invoke and respond in that order.

use std::collections::HashMap;
use std::future::Future;

use axum::{
    body::{Body, Bytes},
    extract::{rejection::PathRejection, Path, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{on, MethodFilter, MethodRouter},
};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde::Serialize;

use crate::api::binder::{BindError, BindRequest, RequestParts};
use crate::api::context::{AppState, RequestContext};
use crate::api::error::ApiError;
use crate::api::response::write_json;
use crate::logic::validate::Validate;
use crate::store::traits::TodoStore;

/// Request bodies larger than this are rejected before binding.
pub const MAX_BODY_BYTES: usize = 1 << 20;

/// Route `op` for the methods in `filter`.
///
/// `op` receives the per-request context and the bound, validated request
/// and returns the response value. Bind and validation failures become 400,
/// a failing `op` becomes 500; either way with a `{"Msg": ...}` body.
pub fn handle<S, Req, Resp, F, Fut>(filter: MethodFilter, op: F) -> MethodRouter<AppState<S>>
where
    S: TodoStore + 'static,
    Req: BindRequest + Validate + Send + 'static,
    Resp: Serialize + Send + 'static,
    F: Fn(RequestContext<S>, Req) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Resp>> + Send + 'static,
{
    on(
        filter,
        move |State(state): State<AppState<S>>,
              route_vars: Result<Path<HashMap<String, String>>, PathRejection>,
              request: Request| {
            let op = op.clone();
            async move {
                let result = match route_vars_from(route_vars) {
                    Ok(route_vars) => dispatch(&state, route_vars, request, op).await,
                    Err(e) => Err(ApiError::from(e)),
                };
                match result {
                    Ok(response) => response,
                    Err(err) => err.into_response(),
                }
            }
        },
    )
}

/// Routes without captures have no variables; any other rejection means a
/// variable was present but could not be decoded.
fn route_vars_from(
    extracted: Result<Path<HashMap<String, String>>, PathRejection>,
) -> Result<HashMap<String, String>, BindError> {
    match extracted {
        Ok(Path(vars)) => Ok(vars),
        Err(PathRejection::MissingPathParams(_)) => Ok(HashMap::new()),
        Err(rejection) => Err(BindError::RouteVars(rejection.body_text())),
    }
}

async fn dispatch<S, Req, Resp, F, Fut>(
    state: &AppState<S>,
    route_vars: HashMap<String, String>,
    request: Request,
    op: F,
) -> Result<Response, ApiError>
where
    S: TodoStore + 'static,
    Req: BindRequest + Validate,
    Resp: Serialize,
    F: Fn(RequestContext<S>, Req) -> Fut,
    Fut: Future<Output = anyhow::Result<Resp>>,
{
    let (parts, body) = request.into_parts();
    let body = read_body(body, MAX_BODY_BYTES).await?;

    let parts = RequestParts::new(parts, route_vars, body);
    let req = Req::from_parts(&parts)?;
    state.validator.validate(&req)?;

    let ctx = RequestContext::new(
        state.store.clone(),
        parts.method,
        parts.uri,
        parts.headers.clone(),
    );

    let resp = op(ctx, req).await.map_err(ApiError::Operation)?;
    Ok(write_json(
        StatusCode::OK,
        &resp,
        state.gzip.as_deref(),
        &parts.headers,
    ))
}

/// Collect the body, failing once more than `limit` bytes have arrived.
async fn read_body(body: Body, limit: usize) -> Result<Bytes, BindError> {
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(BindError::BodyTooLarge { limit }),
        Err(e) => Err(BindError::Body(e.to_string())),
    }
}
