// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use kart_scheduler::error::AppError;
use kart_scheduler::validation::FieldErrors;

mod common;

#[tokio::test]
async fn test_validation_error_body() {
    let mut fields = FieldErrors::new();
    fields.insert(
        "pricePerPerson".to_string(),
        vec!["O preço por pessoa deve ser um número positivo.".to_string()],
    );

    let response = AppError::Validation(fields).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = common::body_json(response).await;
    assert_eq!(json["error"], "Dados inválidos");
    assert_eq!(
        json["details"]["fieldErrors"]["pricePerPerson"][0],
        "O preço por pessoa deve ser um número positivo."
    );
}

#[tokio::test]
async fn test_internal_details_are_not_exposed() {
    let response = AppError::Database("connection refused to 10.0.0.5".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = common::body_text(response).await;
    assert!(!body.contains("10.0.0.5"));
    assert!(body.contains("Erro interno."));
}

#[test]
fn test_status_codes() {
    assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::InvalidDateTime.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        AppError::ScheduleFailed.status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        AppError::IdentityProvider("timeout".to_string()).status_code(),
        StatusCode::BAD_GATEWAY
    );
}

#[test]
fn test_user_messages() {
    assert_eq!(AppError::InvalidDateTime.user_message(), "Data ou hora inválida");
    assert_eq!(
        AppError::ScheduleFailed.user_message(),
        "Falha ao agendar a corrida"
    );
    assert_eq!(
        AppError::ListFailed.user_message(),
        "Falha ao buscar as corridas"
    );
}
