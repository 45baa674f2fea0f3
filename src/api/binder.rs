//! Request binding strategies.
//!
//! A binder turns the transport-level pieces of an HTTP request (method,
//! headers, query string, route variables and the size-capped body) into a
//! typed request value. Each request type picks its strategy statically via
//! [`BindRequest::Binder`]:
//!
//! - [`NoOpBinder`]: `T::default()`, for endpoints without input
//! - [`JsonBinder`]: the whole body decoded as JSON
//! - [`TagBinder`]: fields filled from route variables, headers or query
//!   parameters as declared in [`TaggedFields::FIELDS`], with the JSON body
//!   layered on top for `POST` and `PUT`
//! - the request type itself, implementing [`Binder<Self>`] by hand

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::Query,
    http::{request::Parts, HeaderMap, Method, Uri},
};
use serde::{de::DeserializeOwned, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("request body is empty")]
    EmptyBody,
    #[error("request body too large: limit is {limit} bytes")]
    BodyTooLarge { limit: usize },
    #[error("failed to read request body: {0}")]
    Body(String),
    #[error("invalid route variables: {0}")]
    RouteVars(String),
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value {value:?} for field '{field}': {reason}")]
    Field {
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("{0}")]
    Custom(String),
}

impl BindError {
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}

/// The parts of an incoming request a binder may look at.
#[derive(Debug, Clone)]
pub struct RequestParts {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub route_vars: HashMap<String, String>,
    pub body: Bytes,
}

impl RequestParts {
    pub fn new(parts: Parts, route_vars: HashMap<String, String>, body: Bytes) -> Self {
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            route_vars,
            body,
        }
    }

    pub fn route_var(&self, name: &str) -> Option<&str> {
        self.route_vars.get(name).map(String::as_str)
    }

    /// First value of the header, if present and valid visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// First value of the query parameter. A query string that fails to
    /// decode is treated as carrying no parameters.
    pub fn query_param(&self, name: &str) -> Option<String> {
        let Ok(Query(pairs)) = Query::<Vec<(String, String)>>::try_from_uri(&self.uri) else {
            return None;
        };
        pairs
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// `POST` and `PUT` carry a JSON body that binders decode.
    pub fn is_mutation(&self) -> bool {
        self.method == Method::POST || self.method == Method::PUT
    }

    pub fn decode_body<T: DeserializeOwned>(&self) -> Result<T, BindError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Err(BindError::EmptyBody);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }
}

pub trait Binder<T> {
    fn bind(parts: &RequestParts) -> Result<T, BindError>;
}

/// A request type and the binder that produces it.
pub trait BindRequest: Sized {
    type Binder: Binder<Self>;

    fn from_parts(parts: &RequestParts) -> Result<Self, BindError> {
        <Self::Binder as Binder<Self>>::bind(parts)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpBinder;

impl<T: Default> Binder<T> for NoOpBinder {
    fn bind(_parts: &RequestParts) -> Result<T, BindError> {
        Ok(T::default())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBinder;

impl<T: DeserializeOwned> Binder<T> for JsonBinder {
    fn bind(parts: &RequestParts) -> Result<T, BindError> {
        parts.decode_body()
    }
}

/// Where a tagged field takes its value from. When several sources are
/// declared only the highest-priority one is consulted: route variable,
/// then header, then query parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tags {
    pub route_var: Option<&'static str>,
    pub header: Option<&'static str>,
    pub query: Option<&'static str>,
}

impl Tags {
    pub const NONE: Tags = Tags {
        route_var: None,
        header: None,
        query: None,
    };

    pub const fn route_var(name: &'static str) -> Self {
        Self {
            route_var: Some(name),
            ..Self::NONE
        }
    }

    pub const fn header(name: &'static str) -> Self {
        Self {
            header: Some(name),
            ..Self::NONE
        }
    }

    pub const fn query(name: &'static str) -> Self {
        Self {
            query: Some(name),
            ..Self::NONE
        }
    }

    /// `None` when no tag is declared; otherwise the value of the first
    /// declared source, which may itself be absent.
    fn resolve(&self, parts: &RequestParts) -> Option<Option<String>> {
        if let Some(name) = self.route_var {
            return Some(parts.route_var(name).map(str::to_string));
        }
        if let Some(name) = self.header {
            return Some(parts.header(name).map(str::to_string));
        }
        self.query.map(|name| parts.query_param(name))
    }
}

/// One entry of a request type's field table.
pub struct Field<T> {
    pub name: &'static str,
    pub tags: Tags,
    pub assign: fn(&mut T, &str) -> Result<(), String>,
}

/// Static field table consumed by [`TagBinder`].
pub trait TaggedFields: Sized + 'static {
    const FIELDS: &'static [Field<Self>];
}

/// Conversion from a raw route/header/query string into a field value.
pub trait FromTagValue: Sized {
    fn from_tag_value(raw: &str) -> Result<Self, String>;
}

impl FromTagValue for String {
    fn from_tag_value(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }
}

impl FromTagValue for bool {
    fn from_tag_value(raw: &str) -> Result<Self, String> {
        match raw {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            _ => Err("invalid boolean".to_string()),
        }
    }
}

macro_rules! impl_from_tag_value_parse {
    ($($ty:ty),*) => {
        $(
            impl FromTagValue for $ty {
                fn from_tag_value(raw: &str) -> Result<Self, String> {
                    raw.parse::<$ty>().map_err(|e| e.to_string())
                }
            }
        )*
    };
}

impl_from_tag_value_parse!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Helper for field tables: `assign: |req, raw| assign(&mut req.id, raw)`.
pub fn assign<V: FromTagValue>(slot: &mut V, raw: &str) -> Result<(), String> {
    *slot = V::from_tag_value(raw)?;
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TagBinder;

impl<T> Binder<T> for TagBinder
where
    T: TaggedFields + Default + Serialize + DeserializeOwned,
{
    fn bind(parts: &RequestParts) -> Result<T, BindError> {
        let mut value = T::default();

        for field in T::FIELDS {
            let Some(Some(raw)) = field.tags.resolve(parts) else {
                continue;
            };
            if raw.is_empty() {
                continue;
            }
            (field.assign)(&mut value, &raw).map_err(|reason| BindError::Field {
                field: field.name,
                value: raw.clone(),
                reason,
            })?;
        }

        if parts.is_mutation() {
            value = overlay_body(value, parts)?;
        }

        Ok(value)
    }
}

/// Decode the JSON body over an already populated value. Keys present in
/// the body replace the current field values, absent keys keep them.
fn overlay_body<T>(value: T, parts: &RequestParts) -> Result<T, BindError>
where
    T: Serialize + DeserializeOwned,
{
    let body: serde_json::Value = parts.decode_body()?;
    let mut merged = serde_json::to_value(&value)?;

    match (merged.as_object_mut(), body) {
        (Some(current), serde_json::Value::Object(incoming)) => current.extend(incoming),
        (_, other) => merged = other,
    }

    Ok(serde_json::from_value(merged)?)
}
