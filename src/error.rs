// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::validation::FieldErrors;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// One or more submitted race fields broke a rule.
    #[error("Invalid race fields: {0:?}")]
    Validation(FieldErrors),

    /// Fields were individually valid but do not form a real instant.
    #[error("Invalid race date or time")]
    InvalidDateTime,

    #[error("Failed to schedule race")]
    ScheduleFailed,

    #[error("Failed to list races")]
    ListFailed,

    #[error("Identity provider error: {0}")]
    IdentityProvider(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub const INVALID_DATA: &'static str = "Dados inválidos";
    pub const INVALID_DATE_TIME: &'static str = "Data ou hora inválida";
    pub const SCHEDULE_FAILED: &'static str = "Falha ao agendar a corrida";
    pub const LIST_FAILED: &'static str = "Falha ao buscar as corridas";

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) | AppError::Validation(_) | AppError::InvalidDateTime => {
                StatusCode::BAD_REQUEST
            }
            AppError::IdentityProvider(_) => StatusCode::BAD_GATEWAY,
            AppError::ScheduleFailed
            | AppError::ListFailed
            | AppError::Database(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the person using the app.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "Você precisa estar autenticado.",
            AppError::BadRequest(_) => "Requisição inválida.",
            AppError::Validation(_) => Self::INVALID_DATA,
            AppError::InvalidDateTime => Self::INVALID_DATE_TIME,
            AppError::ScheduleFailed => Self::SCHEDULE_FAILED,
            AppError::ListFailed => Self::LIST_FAILED,
            AppError::IdentityProvider(_) => "Falha ao entrar com o Google.",
            AppError::Database(_) | AppError::Internal(_) => "Erro interno.",
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let details = match &self {
            AppError::BadRequest(msg) => Some(serde_json::Value::String(msg.clone())),
            AppError::Validation(fields) => Some(serde_json::json!({ "fieldErrors": fields })),
            AppError::IdentityProvider(msg) => {
                tracing::warn!(error = %msg, "Identity provider error");
                None
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                None
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                None
            }
            _ => None,
        };

        let body = ErrorResponse {
            error: self.user_message().to_string(),
            details,
        };

        (self.status_code(), Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
