//! Error responses for the HTTP API.
//!
//! Every failure is rendered as `{"message": ..., "error": ...}`, where
//! `error` is only present when there is an underlying cause to report.

use crate::song_store::query::InvalidTopBy;
use crate::song_store::ValidationError;
use axum::extract::rejection::JsonRejection;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The body could not be read as JSON (syntax, content type, size).
    #[error("Invalid request body")]
    Body(#[from] JsonRejection),

    #[error("Song not found")]
    NotFound,

    #[error("Invalid ID")]
    InvalidId,

    #[error(transparent)]
    InvalidParameter(#[from] InvalidTopBy),

    #[error("{message}")]
    Store {
        message: &'static str,
        cause: anyhow::Error,
    },
}

impl ApiError {
    /// Wraps a store failure under a fixed, client facing message.
    pub fn store(message: &'static str) -> impl FnOnce(anyhow::Error) -> ApiError {
        move |cause| ApiError::Store { message, cause }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidId | ApiError::InvalidParameter(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Body(rejection) => rejection.status(),
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn cause(&self) -> Option<String> {
        match self {
            ApiError::Body(rejection) => Some(rejection.body_text()),
            ApiError::Store { cause, .. } => Some(format!("{:#}", cause)),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Store { message, cause } = &self {
            error!("{}: {:?}", message, cause);
        }

        let mut body = json!({ "message": self.to_string() });
        if let Some(cause) = self.cause() {
            body["error"] = json!(cause);
        }

        (self.status(), Json(body)).into_response()
    }
}
