//! HTTP error envelope

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mirror_core::{ErrorBody, MirrorError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    /// Store or upstream failure; the message is what the client sees
    #[error("{message}")]
    Internal {
        message: &'static str,
        #[source]
        source: MirrorError,
    },
}

impl ApiError {
    pub fn route_not_found() -> Self {
        ApiError::NotFound("Route not found")
    }

    pub fn internal(message: &'static str) -> impl FnOnce(MirrorError) -> Self {
        move |source| ApiError::Internal { message, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal { message, source } => {
                tracing::error!("{}: {}", message, source);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
