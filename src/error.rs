//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Failure reported by a [`crate::store::ProductStore`]. Any in-flight
/// transaction has already been rolled back when this is returned.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] sqlx::Error),
    #[error("{0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] StoreError),
    #[error("{0}")]
    PayloadTooLarge(String),
}

impl AppError {
    pub fn product_not_found(id: impl std::fmt::Display) -> Self {
        AppError::NotFound(format!("Product {} not found", id))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::Storage(_) => "storage_error",
            AppError::PayloadTooLarge(_) => "payload_too_large",
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.category(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
