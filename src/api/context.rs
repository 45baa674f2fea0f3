use std::sync::Arc;

use axum::http::{HeaderMap, Method, Uri};

use crate::api::response::GzipPool;
use crate::logic::validate::Validator;
use crate::store::traits::TodoStore;

/// Process-wide capabilities, built once at startup and shared with every
/// request through the router state.
pub struct AppState<S> {
    pub store: Arc<S>,
    pub validator: Arc<Validator>,
    pub gzip: Option<Arc<GzipPool>>,
}

impl<S: TodoStore> AppState<S> {
    pub fn new(store: Arc<S>, validator: Validator) -> Self {
        Self {
            store,
            validator: Arc::new(validator),
            gzip: None,
        }
    }

    /// Gzip success bodies for clients that accept it.
    pub fn with_compression(mut self, pool: GzipPool) -> Self {
        self.gzip = Some(Arc::new(pool));
        self
    }
}

// Manual impl: deriving would require `S: Clone`.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            validator: Arc::clone(&self.validator),
            gzip: self.gzip.clone(),
        }
    }
}

/// What a business function sees of one request: the database handle plus
/// the transport request's method, URI and headers. Owned by a single
/// request and never mutated after it is handed over.
pub struct RequestContext<S> {
    store: Arc<S>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
}

impl<S> RequestContext<S> {
    pub fn new(store: Arc<S>, method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self {
            store,
            method,
            uri,
            headers,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

impl<S> std::fmt::Debug for RequestContext<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .finish_non_exhaustive()
    }
}
