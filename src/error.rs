use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt::Display;

use crate::compose::ComposeError;
use crate::outreach::OutreachError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "resource not found")
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal<E: Display>(error: E) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status;
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (status, body).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl From<OutreachError> for AppError {
    fn from(value: OutreachError) -> Self {
        let message = value.to_string();
        match value {
            OutreachError::NoSession | OutreachError::SessionGone | OutreachError::UnknownDraft(_) => {
                AppError::new(StatusCode::NOT_FOUND, message)
            }
            OutreachError::DraftingInProgress
            | OutreachError::DraftLocked(_)
            | OutreachError::InvalidStep(_) => AppError::conflict(message),
            OutreachError::EmptySelection
            | OutreachError::NoTemplateSelected
            | OutreachError::UnknownTemplate(_)
            | OutreachError::NothingToSend => AppError::bad_request(message),
        }
    }
}

impl From<ComposeError> for AppError {
    fn from(value: ComposeError) -> Self {
        AppError::bad_request(value.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        AppError::internal(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        AppError::internal(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        AppError::bad_request(value.to_string())
    }
}
