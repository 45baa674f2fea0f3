use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::binder::BindError;
use crate::api::response::write_error;
use crate::logic::validate::ValidationErrors;

/// Every way a request can fail once it reaches the handler adapter.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Bind(#[from] BindError),
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    /// The business function failed. Not-found, conflicts and transient
    /// store failures all land here.
    #[error("{0:#}")]
    Operation(anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Bind(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Operation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            log::error!("Request failed: {}", message);
        } else {
            log::warn!("Rejected request: {}", message);
        }
        write_error(status, &message)
    }
}
